/*!
    link members of the levitation pod

    each member owns its domain state and declares which of it crosses the link in which direction. The same definitions are used on the master and on the slave.
*/

mod airgap;
mod lpu;
mod communications;

pub use airgap::Airgap;
pub use lpu::{Lpu, LpuState, LpuFlags};
pub use communications::{Communications, OrderState};

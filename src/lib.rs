/*!
    duplex frame engine for master/slave control boards

    A fixed set of link members expose the fields of their state that cross the link. At initialization a [frame::DuplexFrame] flattens them into one transfer buffer per direction, and builds the scatter-gather descriptor chains moving each field between its owner and the buffers. Every control cycle only the prebuilt chains are handed to the transfer engine: no allocation, no per-field code.

    On top of it, the [members::Communications] member carries the command/acknowledgment handshake the master uses to give orders to the slave.
*/
#![no_std]
#[cfg(feature = "std")]
extern crate std;

mod utils;

pub mod shared;
pub mod layout;
pub mod descriptor;
pub mod transport;
pub mod frame;
pub mod command;
pub mod members;
pub mod config;
#[cfg(feature = "spi")]
pub mod link;

pub use packbytes;
pub use bilge;

pub use frame::{DuplexFrame, FrameStorage};
pub use layout::{LinkMember, Master, Slave};

use thiserror::Error;


/// error building or running a duplex frame
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{needed} descriptors needed, only {capacity} slots")]
    DescriptorCapacity {needed: usize, capacity: usize},
    #[error("frame of {needed} bytes does not fit {capacity} bytes transfer buffers")]
    BufferCapacity {needed: usize, capacity: usize},
    #[error("too many fields for a link member")]
    MemberFields,
    #[error("packet framing mismatch")]
    Framing(#[from] command::FramingError),
    #[error("transfer engine failed")]
    Transport,
    #[error("physical link failed")]
    Link,
}

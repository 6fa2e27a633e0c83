use bilge::prelude::*;

use crate::{
    pack_bits,
    shared::Shared,
    layout::{LinkMember, MemberLayout, Layout, Fields, fields_of},
    };


/// state of a levitation power unit
#[bitsize(8)]
#[derive(Copy, Clone, Default, FromBits, Debug, PartialEq)]
pub enum LpuState {
    #[default]
    Ready = 0,
    Running = 1,
    Fault = 2,
    #[fallback]
    Unknown = 255,
}
pack_bits!(LpuState, u8);

/// switches set by the master on a levitation power unit
#[bitsize(8)]
#[derive(Copy, Clone, FromBits, DebugBits, PartialEq, DefaultBits)]
pub struct LpuFlags {
    /// allow the power stage to switch
    pub enable: bool,
    /// leave the fault state at next update
    pub reset_fault: bool,
    reserved: u6,
}
pack_bits!(LpuFlags, u8);


/**
    levitation power unit

    its flags go down to the slave driving it, its battery and shunt voltages (V) and state go up to the master
*/
#[derive(Debug, Default)]
pub struct Lpu {
    flags: Shared<LpuFlags>,
    vbat: Shared<f32>,
    shunt: Shared<f32>,
    state: Shared<LpuState>,
}
impl Lpu {
    pub fn new() -> Self {Self::default()}

    pub fn flags(&self) -> LpuFlags {self.flags.get()}
    pub fn set_flags(&self, flags: LpuFlags) {self.flags.set(flags)}
    pub fn set_enable(&self, enable: bool) {
        self.flags.update(|flags| flags.set_enable(enable))
    }
    pub fn set_reset_fault(&self, reset: bool) {
        self.flags.update(|flags| flags.set_reset_fault(reset))
    }

    pub fn vbat(&self) -> f32 {self.vbat.get()}
    pub fn set_vbat(&self, volts: f32) {self.vbat.set(volts)}
    pub fn shunt(&self) -> f32 {self.shunt.get()}
    pub fn set_shunt(&self, volts: f32) {self.shunt.set(volts)}
    pub fn state(&self) -> LpuState {self.state.get()}
    pub fn set_state(&self, state: LpuState) {self.state.set(state)}
}
// SAFETY: all fields are `Shared` cells of the member
unsafe impl LinkMember for Lpu {
    fn downlink_fields(&self) -> Fields {
        fields_of([self.flags.field()])
    }
    fn uplink_fields(&self) -> Fields {
        fields_of([
            self.vbat.field(),
            self.shunt.field(),
            self.state.field(),
            ])
    }
}
impl MemberLayout for Lpu {
    const DOWNLINK: Layout = Layout::of::<LpuFlags>();
    const UPLINK: Layout = Layout::of::<f32>()
        .then(Layout::of::<f32>())
        .then(Layout::of::<LpuState>());
}

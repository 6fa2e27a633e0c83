use crate::{
    shared::Shared,
    layout::{LinkMember, MemberLayout, Layout, Fields, fields_of, no_fields},
    };


/// airgap sensor, its measure (mm) goes up to the master
#[derive(Debug, Default)]
pub struct Airgap {
    airgap: Shared<f32>,
}
impl Airgap {
    pub fn new() -> Self {Self::default()}
    pub fn airgap(&self) -> f32 {self.airgap.get()}
    pub fn set_airgap(&self, value: f32) {self.airgap.set(value)}
}
// SAFETY: all fields are `Shared` cells of the member
unsafe impl LinkMember for Airgap {
    fn downlink_fields(&self) -> Fields {
        no_fields()
    }
    fn uplink_fields(&self) -> Fields {
        fields_of([self.airgap.field()])
    }
}
impl MemberLayout for Airgap {
    const DOWNLINK: Layout = Layout::EMPTY;
    const UPLINK: Layout = Layout::of::<f32>();
}

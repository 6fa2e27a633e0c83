/*!
    composition of the pod link

    both boards build their frame from [Pod::members], so they agree on the layout. The storage is sized at compile time from the members' layouts.
*/

use crate::{
    utils::max,
    descriptor::capacity,
    frame::FrameStorage,
    layout::{LinkMember, MemberLayout, Layout},
    members::{Communications, Lpu, Airgap},
    };


/// number of levitation power units
pub const LPUS: usize = 2;
/// number of airgap sensors
pub const AIRGAPS: usize = 4;
/// number of link members of the pod
pub const MEMBERS: usize = 1 + LPUS + AIRGAPS;

/// master to slave layout of the pod
pub const DOWNLINK: Layout = Communications::DOWNLINK
    .then(Lpu::DOWNLINK.times(LPUS))
    .then(Airgap::DOWNLINK.times(AIRGAPS));
/// slave to master layout of the pod
pub const UPLINK: Layout = Communications::UPLINK
    .then(Lpu::UPLINK.times(LPUS))
    .then(Airgap::UPLINK.times(AIRGAPS));
/// size of each transfer buffer, also the number of bytes exchanged per cycle
pub const FRAME_BYTES: usize = max(DOWNLINK.bytes, UPLINK.bytes);

/// frame storage fitting exactly the pod link
pub type PodStorage = FrameStorage<{capacity(DOWNLINK.fields)}, {capacity(UPLINK.fields)}, FRAME_BYTES>;


/// link members of the pod, identical on master and slave
#[derive(Debug, Default)]
pub struct Pod {
    pub communications: Communications,
    pub lpus: [Lpu; LPUS],
    pub airgaps: [Airgap; AIRGAPS],
}
impl Pod {
    pub fn new() -> Self {Self::default()}

    /// members in link declaration order
    pub fn members(&self) -> heapless::Vec<&dyn LinkMember, MEMBERS> {
        let mut members = heapless::Vec::<&dyn LinkMember, MEMBERS>::new();
        members.extend(
            core::iter::once(&self.communications as &dyn LinkMember)
            .chain(self.lpus.iter().map(|lpu| lpu as &dyn LinkMember))
            .chain(self.airgaps.iter().map(|airgap| airgap as &dyn LinkMember))
            );
        members
    }
}

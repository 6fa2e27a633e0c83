/*!
    the duplex frame engine

    [FrameStorage] holds everything the engine needs, sized at compile time: a transfer buffer and a descriptor arena for each physical direction. [DuplexFrame::initialize] deduces the layout of the link members and builds both descriptor chains in it once; each cycle [DuplexFrame::update_outgoing] and [DuplexFrame::update_incoming] only hand the prebuilt chains to the transport.

    The storage stays borrowed by the frame and the members stay borrowed by the frame, so nothing the descriptors point to can move or vanish while the frame exists, and a frame cannot be updated before being initialized.
*/

use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    sync::atomic::{fence, Ordering},
    };
use log::*;

use crate::{
    Error,
    descriptor::{Arena, Chain, Slots},
    layout::{Direction, FrameLayout, LinkMember, Role, Stream, deduce},
    transport::Transport,
    };


/// contiguous bytes a direction is serialized into, aligned for bulk transfers
#[repr(C, align(32))]
pub struct TransferBuffer<const BYTES: usize> {
    bytes: UnsafeCell<[u8; BYTES]>,
}
impl<const BYTES: usize> TransferBuffer<BYTES> {
    pub const fn new() -> Self {
        Self {bytes: UnsafeCell::new([0; BYTES])}
    }
    fn cell(&self) -> &UnsafeCell<[u8]> {
        &self.bytes
    }
}
impl<const BYTES: usize> Default for TransferBuffer<BYTES> {
    fn default() -> Self {Self::new()}
}

/// buffer and descriptor slots for one physical direction
pub struct Lane<const NODES: usize, const BYTES: usize> {
    buffer: TransferBuffer<BYTES>,
    nodes: Arena<NODES>,
}
impl<const NODES: usize, const BYTES: usize> Lane<NODES, BYTES> {
    pub const fn new() -> Self {
        Self {
            buffer: TransferBuffer::new(),
            nodes: Arena::new(),
        }
    }
    fn view(&self) -> LaneView<'_> {
        LaneView {
            buffer: self.buffer.cell(),
            slots: self.nodes.slots(),
        }
    }
}
impl<const NODES: usize, const BYTES: usize> Default for Lane<NODES, BYTES> {
    fn default() -> Self {Self::new()}
}

/**
    memory of a duplex frame

    - `DOWN` descriptor slots for master to slave fields
    - `UP` descriptor slots for slave to master fields
    - `BYTES` bytes of each transfer buffer, at least the largest direction

    The same storage type serves both ends of the link, see [crate::descriptor::capacity] to size it from layouts.
*/
pub struct FrameStorage<const DOWN: usize, const UP: usize, const BYTES: usize> {
    downlink: Lane<DOWN, BYTES>,
    uplink: Lane<UP, BYTES>,
}
impl<const DOWN: usize, const UP: usize, const BYTES: usize> FrameStorage<DOWN, UP, BYTES> {
    pub const fn new() -> Self {
        Self {
            downlink: Lane::new(),
            uplink: Lane::new(),
        }
    }
    fn lane(&self, stream: Stream) -> LaneView<'_> {
        match stream {
            Stream::Downlink => self.downlink.view(),
            Stream::Uplink => self.uplink.view(),
        }
    }
}
impl<const DOWN: usize, const UP: usize, const BYTES: usize> Default for FrameStorage<DOWN, UP, BYTES> {
    fn default() -> Self {Self::new()}
}

/// lane with its sizes erased
struct LaneView<'s> {
    buffer: &'s UnsafeCell<[u8]>,
    slots: Slots<'s>,
}


/**
    duplex frame engine of one end of the link

    `R` is the role of the local processor, deciding which member fields are outgoing and which are incoming.
*/
pub struct DuplexFrame<'s, R: Role, T: Transport> {
    transport: T,
    layout: FrameLayout,
    outgoing: &'s UnsafeCell<[u8]>,
    incoming: &'s UnsafeCell<[u8]>,
    outgoing_chain: Option<Chain<'s>>,
    incoming_chain: Option<Chain<'s>>,
    role: PhantomData<R>,
}
impl<'s, R: Role, T: Transport> DuplexFrame<'s, R, T> {
    /**
        deduce the layout of `members` and build the descriptor chains of both directions

        `members` must be listed in the same order on both peers. They stay borrowed as long as the frame lives, their fields are read and written in place by the transport.
    */
    pub fn initialize<const DOWN: usize, const UP: usize, const BYTES: usize>(
        storage: &'s mut FrameStorage<DOWN, UP, BYTES>,
        transport: T,
        members: &[&'s dyn LinkMember],
        ) -> Result<Self, Error>
    {
        let storage: &'s FrameStorage<DOWN, UP, BYTES> = storage;
        let side = R::SIDE;
        let layout = FrameLayout::measure(side, members);
        debug!("initializing {:?} frame: {} members, {:?}", side, members.len(), layout);

        let needed = layout.frame_len();
        if needed > BYTES {
            return Err(Error::BufferCapacity {needed, capacity: BYTES});
        }
        let outgoing = storage.lane(side.stream(Direction::Outgoing));
        let incoming = storage.lane(side.stream(Direction::Incoming));
        for (direction, lane) in [(Direction::Outgoing, &outgoing), (Direction::Incoming, &incoming)] {
            let needed = layout.direction(direction).fields;
            if needed > lane.slots.capacity() {
                return Err(Error::DescriptorCapacity {needed, capacity: lane.slots.capacity()});
            }
        }

        // SAFETY:
        // - buffers are BYTES long, build checks every field against it
        // - fields belong to members borrowed for 's, as `LinkMember` implementors guarantee
        // - storage is exclusively borrowed for 's, so no previous chain built in it is alive
        let outgoing_chain = unsafe {outgoing.slots.build(
            Direction::Outgoing,
            outgoing.buffer.get().cast::<u8>(),
            BYTES,
            deduce(side, members, Direction::Outgoing),
            )}?;
        let incoming_chain = unsafe {incoming.slots.build(
            Direction::Incoming,
            incoming.buffer.get().cast::<u8>(),
            BYTES,
            deduce(side, members, Direction::Incoming),
            )}?;

        Ok(Self {
            transport,
            layout,
            outgoing: outgoing.buffer,
            incoming: incoming.buffer,
            outgoing_chain,
            incoming_chain,
            role: PhantomData,
        })
    }

    /**
        copy the current value of every outgoing field into the outgoing buffer

        does nothing if there is no outgoing field
    */
    pub fn update_outgoing(&mut self) -> Result<(), Error> {
        let Some(chain) = self.outgoing_chain
            else {return Ok(())};
        // members' writes must be visible to the transfer engine
        fence(Ordering::Release);
        self.transport.execute(chain) .map_err(|err| {
            error!("outgoing transfer failed: {:?}", err);
            Error::Transport
            })
    }

    /**
        copy the incoming buffer, as received from the peer, into every incoming field

        incoming fields hold this cycle's values once it returns. Does nothing if there is no incoming field.
    */
    pub fn update_incoming(&mut self) -> Result<(), Error> {
        let Some(chain) = self.incoming_chain
            else {return Ok(())};
        self.transport.execute(chain) .map_err(|err| {
            error!("incoming transfer failed: {:?}", err);
            Error::Transport
            })?;
        // the transfer engine's writes must be visible to members
        fence(Ordering::Acquire);
        Ok(())
    }

    /// layout deduced at initialization
    pub fn layout(&self) -> FrameLayout {self.layout}
    /// number of bytes exchanged with the peer each cycle
    pub fn frame_len(&self) -> usize {self.layout.frame_len()}

    /// outgoing chain, `None` if nothing is sent
    pub fn outgoing_chain(&self) -> Option<Chain<'s>> {self.outgoing_chain}
    /// incoming chain, `None` if nothing is received
    pub fn incoming_chain(&self) -> Option<Chain<'s>> {self.incoming_chain}

    /// bytes to send to the peer, as left by the last outgoing update
    pub fn outgoing(&self) -> &[u8] {
        // SAFETY: the buffer is only written by the transport during `update_outgoing`, which needs `&mut self`
        unsafe {&(&*self.outgoing.get())[.. self.frame_len()]}
    }
    /// where to put the bytes received from the peer before the next incoming update
    pub fn incoming_mut(&mut self) -> &mut [u8] {
        let len = self.frame_len();
        // SAFETY: the frame has exclusive access to its storage, and the transport only reads this buffer during `update_incoming`
        unsafe {&mut (&mut *self.incoming.get())[.. len]}
    }
    /// both transfer buffers at once, for full-duplex links
    pub fn buffers_mut(&mut self) -> (&[u8], &mut [u8]) {
        let len = self.frame_len();
        // SAFETY: outgoing and incoming buffers are distinct lanes of the storage, see `outgoing` and `incoming_mut`
        unsafe {(
            &(&*self.outgoing.get())[.. len],
            &mut (&mut *self.incoming.get())[.. len],
        )}
    }

    pub fn transport(&self) -> &T {&self.transport}
    pub fn transport_mut(&mut self) -> &mut T {&mut self.transport}
}

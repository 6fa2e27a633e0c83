/*!
    deduction of the byte layout of both transfer directions from the link members

    Each link member declares, in a fixed order, which of its fields go master to slave (downlink) and which go slave to master (uplink). Concatenating these lists in member declaration order gives the layout of each direction. Both peers deduce it independently from the same declarations, so no schema is ever exchanged: fields are never reordered.
*/

use crate::{
    Error,
    shared::{Wire, wire_size},
    };


/// maximum number of fields a single link member can expose in one direction
pub const MEMBER_FIELDS: usize = 16;

/// ordered fields a link member exposes for one direction
pub type Fields = heapless::Vec<Field, MEMBER_FIELDS>;


/// region of a link member's memory transferred as a whole
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Field {
    address: *mut u8,
    size: usize,
}
impl Field {
    /**
        field of `size` bytes at `address`

        # Safety
        the bytes must be valid for reads and writes by the transfer engine as long as a frame built with this field exists, and must not overlap a transfer buffer. [crate::shared::Shared::field] is the safe way to get one.
    */
    pub const unsafe fn new(address: *mut u8, size: usize) -> Self {
        Self {address, size}
    }
    /// first byte of the field in its owner's memory
    pub const fn address(&self) -> *mut u8 {self.address}
    /// number of bytes transferred
    pub const fn size(&self) -> usize {self.size}
}

/**
    participant of the link, contributing fields to each physical direction

    the lists must be identical in order and sizes on both peers

    # Safety
    every field returned must be memory owned by the member itself, valid as long as the member is borrowed. A frame copies these bytes without further check apart from the buffer bounds.
*/
pub unsafe trait LinkMember {
    /// fields sent from master to slave
    fn downlink_fields(&self) -> Fields;
    /// fields sent from slave to master
    fn uplink_fields(&self) -> Fields;

    fn fields(&self, stream: Stream) -> Fields {
        match stream {
            Stream::Downlink => self.downlink_fields(),
            Stream::Uplink => self.uplink_fields(),
        }
    }
}

/// compile-time knowledge of what a link member type exposes, used to size storage
pub trait MemberLayout {
    const DOWNLINK: Layout;
    const UPLINK: Layout;
}


/// physical direction on the link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stream {
    /// master to slave
    Downlink,
    /// slave to master
    Uplink,
}
/// direction relative to the local processor
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// from local members to the link
    Outgoing,
    /// from the link to local members
    Incoming,
}
/// end of the link the local processor is
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Master,
    Slave,
}
impl Side {
    /// physical direction of a local direction
    pub const fn stream(self, direction: Direction) -> Stream {
        match (self, direction) {
            (Side::Master, Direction::Outgoing) => Stream::Downlink,
            (Side::Master, Direction::Incoming) => Stream::Uplink,
            (Side::Slave, Direction::Outgoing) => Stream::Uplink,
            (Side::Slave, Direction::Incoming) => Stream::Downlink,
        }
    }
}

/// compile-time role of the local processor
pub trait Role {
    const SIDE: Side;
}
/// marker for the processor issuing orders
#[derive(Copy, Clone, Debug, Default)]
pub struct Master;
/// marker for the processor executing orders
#[derive(Copy, Clone, Debug, Default)]
pub struct Slave;
impl Role for Master {
    const SIDE: Side = Side::Master;
}
impl Role for Slave {
    const SIDE: Side = Side::Slave;
}


/// number of fields and bytes of a transfer direction, or part of it
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    pub fields: usize,
    pub bytes: usize,
}
impl Layout {
    pub const EMPTY: Self = Self {fields: 0, bytes: 0};

    /// layout of a single field of type `T`
    pub const fn of<T: Wire>() -> Self {
        Self {fields: 1, bytes: wire_size::<T>()}
    }
    /// layout of `self` followed by `next`
    pub const fn then(self, next: Self) -> Self {
        Self {
            fields: self.fields + next.fields,
            bytes: self.bytes + next.bytes,
        }
    }
    /// layout of `count` consecutive copies of `self`
    pub const fn times(self, count: usize) -> Self {
        Self {
            fields: self.fields * count,
            bytes: self.bytes * count,
        }
    }
    /// layout of some fields
    pub fn from_fields(fields: impl IntoIterator<Item=Field>) -> Self {
        fields.into_iter().fold(Self::EMPTY, |layout, field| Self {
            fields: layout.fields + 1,
            bytes: layout.bytes + field.size(),
        })
    }
}

/// layouts of both directions as seen by one end of the link
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLayout {
    pub outgoing: Layout,
    pub incoming: Layout,
}
impl FrameLayout {
    /// deduce the layout of both directions
    pub fn measure(side: Side, members: &[&dyn LinkMember]) -> Self {
        Self {
            outgoing: Layout::from_fields(deduce(side, members, Direction::Outgoing)),
            incoming: Layout::from_fields(deduce(side, members, Direction::Incoming)),
        }
    }
    /// layout of a direction
    pub fn direction(&self, direction: Direction) -> Layout {
        match direction {
            Direction::Outgoing => self.outgoing,
            Direction::Incoming => self.incoming,
        }
    }
    /**
        bytes exchanged on the link each cycle

        both transfer buffers have this size: a full-duplex exchange always moves as many bytes in each direction
    */
    pub fn frame_len(&self) -> usize {
        self.outgoing.bytes.max(self.incoming.bytes)
    }
}


/// fields of all members for the given direction, in declaration order
pub fn deduce<'a>(side: Side, members: &'a [&'a dyn LinkMember], direction: Direction) -> impl Iterator<Item=Field> + 'a {
    let stream = side.stream(direction);
    members.iter().flat_map(move |member| member.fields(stream))
}

/// fields of all members for the given direction, with their offset in the transfer buffer
pub fn offsets<'a>(side: Side, members: &'a [&'a dyn LinkMember], direction: Direction) -> impl Iterator<Item=(Field, usize)> + 'a {
    deduce(side, members, direction).scan(0, |offset, field| {
        let start = *offset;
        *offset += field.size();
        Some((field, start))
    })
}

/// collect fields into a member's field list
pub fn fields(list: impl IntoIterator<Item=Field>) -> Result<Fields, Error> {
    let mut fields = Fields::new();
    for field in list {
        fields.push(field) .map_err(|_| Error::MemberFields)?;
    }
    Ok(fields)
}

/// field list of a member exposing nothing in a direction
pub fn no_fields() -> Fields {
    Fields::new()
}

/// field list from fields known to fit
pub(crate) fn fields_of<const N: usize>(list: [Field; N]) -> Fields {
    const {assert!(N <= MEMBER_FIELDS, "too many fields for a link member")};
    let mut fields = Fields::new();
    fields.extend(list);
    fields
}

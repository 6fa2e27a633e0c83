/*!
    scatter-gather descriptor chains, executed by the transfer engine every cycle

    A chain is built once per direction, in a fixed arena of descriptor slots. Each descriptor moves one field between its owner's memory and its offset in the direction's transfer buffer.
*/

use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    ptr,
    };
use log::*;

use crate::{
    Error,
    layout::{Direction, Field},
    };


/// maximum of `count` and 1, the arena size needed for `count` descriptors
pub const fn capacity(count: usize) -> usize {
    if count > 0 {count} else {1}
}


/**
    one copy in a chain, in the usual shape of linked-list DMA nodes

    `next` is null on the last descriptor of a chain
*/
#[repr(C)]
#[derive(Debug)]
pub struct Descriptor {
    source: *const u8,
    destination: *mut u8,
    size: usize,
    next: *const Descriptor,
}
impl Descriptor {
    /// unlinked descriptor copying nothing
    pub const EMPTY: Self = Self {
        source: ptr::null(),
        destination: ptr::null_mut(),
        size: 0,
        next: ptr::null(),
    };

    pub fn source(&self) -> *const u8 {self.source}
    pub fn destination(&self) -> *mut u8 {self.destination}
    /// number of bytes to copy
    pub fn size(&self) -> usize {self.size}
    /// raw link to the next descriptor, null at the end of the chain
    pub fn next_ptr(&self) -> *const Descriptor {self.next}
    /// next descriptor of the chain
    pub fn next(&self) -> Option<&Descriptor> {
        // SAFETY: descriptors are only linked to descriptors of the same arena, which outlives any borrow of them
        unsafe {self.next.as_ref()}
    }
}


/// fixed number of descriptor slots, filled once
pub struct Arena<const N: usize> {
    nodes: UnsafeCell<[Descriptor; N]>,
}
impl<const N: usize> Arena<N> {
    pub const fn new() -> Self {
        Self {nodes: UnsafeCell::new([Descriptor::EMPTY; N])}
    }
    pub const fn capacity(&self) -> usize {N}
    pub(crate) fn slots(&self) -> Slots<'_> {
        Slots {
            base: self.nodes.get().cast::<Descriptor>(),
            capacity: N,
            life: PhantomData,
        }
    }
}
impl<const N: usize> Default for Arena<N> {
    fn default() -> Self {Self::new()}
}

/// type-erased view of an arena
#[derive(Copy, Clone)]
pub(crate) struct Slots<'s> {
    base: *mut Descriptor,
    capacity: usize,
    life: PhantomData<&'s UnsafeCell<[Descriptor]>>,
}
impl<'s> Slots<'s> {
    pub(crate) fn capacity(&self) -> usize {self.capacity}
    /**
        fill the slots with a chain moving `fields` between their owners and `buffer`

        offsets in the buffer start at 0 and follow the fields order. Outgoing descriptors scatter fields into the buffer, incoming descriptors gather the buffer into fields.
        Returns `None` if there is no field: nothing to transfer in this direction.
        Fails if the fields overflow the slots or the `len` bytes of the buffer.

        # Safety
        `buffer` must be valid for reads and writes of `len` bytes for `'s`, each field must be valid for reads and writes for `'s`, and no chain previously built in these slots may still be in use.
    */
    pub(crate) unsafe fn build(
        self,
        direction: Direction,
        buffer: *mut u8,
        len: usize,
        fields: impl Iterator<Item=Field>,
        ) -> Result<Option<Chain<'s>>, Error>
    {
        let mut offset = 0;
        let mut count = 0;
        for field in fields {
            if count >= self.capacity {
                return Err(Error::DescriptorCapacity {needed: count + 1, capacity: self.capacity});
            }
            let end = offset + field.size();
            if end > len {
                return Err(Error::BufferCapacity {needed: end, capacity: len});
            }
            // SAFETY: offset + size <= len checked above
            let at = unsafe {buffer.add(offset)};
            let (source, destination) = match direction {
                Direction::Outgoing => (field.address().cast_const(), at),
                Direction::Incoming => (at.cast_const(), field.address()),
            };
            // SAFETY: count < capacity, and slots are not borrowed during build
            unsafe {
                let node = self.base.add(count);
                node.write(Descriptor {
                    source,
                    destination,
                    size: field.size(),
                    next: ptr::null(),
                    });
                if count > 0 {
                    (*self.base.add(count - 1)).next = node;
                }
            }
            trace!("{:?} descriptor {}: {} bytes at offset {}", direction, count, field.size(), offset);
            offset += field.size();
            count += 1;
        }
        if count == 0 {
            return Ok(None);
        }
        debug!("{:?} chain built: {} descriptors, {} bytes", direction, count, offset);
        Ok(Some(Chain {
            // SAFETY: slot 0 was written above and is never written again while 's lasts
            head: unsafe {&*self.base},
            len: count,
            }))
    }
}


/**
    built descriptor chain, handed to the transport each cycle

    it can only be obtained from an initialized frame, so every descriptor points to live memory
*/
#[derive(Copy, Clone, Debug)]
pub struct Chain<'s> {
    head: &'s Descriptor,
    len: usize,
}
impl<'s> Chain<'s> {
    /// first descriptor, to hand to hardware following `next` links
    pub fn head(&self) -> &'s Descriptor {self.head}
    /// number of descriptors
    pub fn len(&self) -> usize {self.len}
    /// total bytes moved by the chain
    pub fn bytes(&self) -> usize {
        self.iter().map(Descriptor::size).sum()
    }
    pub fn iter(&self) -> ChainIter<'s> {
        ChainIter {next: Some(self.head)}
    }
}
impl<'s> IntoIterator for Chain<'s> {
    type Item = &'s Descriptor;
    type IntoIter = ChainIter<'s>;
    fn into_iter(self) -> Self::IntoIter {self.iter()}
}

/// walk along a chain following its links
pub struct ChainIter<'s> {
    next: Option<&'s Descriptor>,
}
impl<'s> Iterator for ChainIter<'s> {
    type Item = &'s Descriptor;
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next();
        Some(current)
    }
}

/*!
    cells holding the link members' state that crosses the link

    A [Shared] value is owned by its link member but its memory is also written by the transfer engine while executing descriptor chains, so it is never borrowed: every access copies the value in or out with a volatile access.
*/

use core::{
    cell::UnsafeCell,
    marker::PhantomData,
    mem::size_of,
    ptr,
    fmt,
    };
use packbytes::{FromBytes, ToBytes, ByteArray};

use crate::layout::Field;


/// value that can be put on the link as its packed byte image
pub trait Wire: Copy + FromBytes + ToBytes {}
impl<T: Copy + FromBytes + ToBytes> Wire for T {}

/// number of bytes a value takes on the link
pub const fn wire_size<T: Wire>() -> usize {
    size_of::<<T as ToBytes>::Bytes>()
}


/**
    link member field, storing the little endian byte image of a `T`

    The bytes are what the descriptors point to: whatever the peer wrote there, reading it back decodes to some `T`, so packed enums must have a fallback variant.
*/
pub struct Shared<T: Wire> {
    bytes: UnsafeCell<<T as ToBytes>::Bytes>,
    ty: PhantomData<T>,
}
impl<T: Wire> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            bytes: UnsafeCell::new(value.to_le_bytes()),
            ty: PhantomData,
        }
    }
    /// current value, as last written by the owner or by an incoming transfer
    pub fn get(&self) -> T {
        // SAFETY: the cell is never borrowed, only copied in and out, and `Shared` is not `Sync`
        let src = unsafe {ptr::read_volatile(self.bytes.get())};
        let mut dst = <T as FromBytes>::Bytes::zeroed();
        dst.as_mut().copy_from_slice(src.as_ref());
        T::from_le_bytes(dst)
    }
    /// overwrite the value, the next outgoing transfer will carry it
    pub fn set(&self, value: T) {
        // SAFETY: same as `get`
        unsafe {ptr::write_volatile(self.bytes.get(), value.to_le_bytes())}
    }
    /// read-modify-write of the value
    pub fn update(&self, change: impl FnOnce(&mut T)) {
        let mut value = self.get();
        change(&mut value);
        self.set(value);
    }
    /// location and size of the byte image, for building descriptors
    pub fn field(&self) -> Field {
        // SAFETY: the bytes live in this cell, which is never borrowed across accesses
        unsafe {Field::new(self.bytes.get().cast::<u8>(), wire_size::<T>())}
    }
}
impl<T: Wire + Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
impl<T: Wire + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.get()).finish()
    }
}

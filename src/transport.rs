/*!
    boundary with the transfer engine executing descriptor chains

    On the pod boards this is the MDMA linked-list mode; [Memcpy] does the same copies with the CPU, for hosts, tests, and boards without a suitable DMA.
*/

use core::{
    convert::Infallible,
    fmt::Debug,
    ptr,
    };

use crate::descriptor::Chain;


/**
    engine executing descriptor chains

    for each descriptor from the head, copy `size` bytes from `source` to `destination`, then follow `next` until null.

    An implementation may return before the copies are done (the hardware proceeds concurrently), but must complete them before the next call on the same frame.
*/
pub trait Transport {
    type Error: Debug;
    fn execute(&mut self, chain: Chain<'_>) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;
    fn execute(&mut self, chain: Chain<'_>) -> Result<(), Self::Error> {
        (**self).execute(chain)
    }
}


/// synchronous transport copying with the CPU
#[derive(Copy, Clone, Debug, Default)]
pub struct Memcpy;

impl Transport for Memcpy {
    type Error = Infallible;
    fn execute(&mut self, chain: Chain<'_>) -> Result<(), Infallible> {
        for descriptor in chain {
            // SAFETY: chains are only built by frames over live fields and their own transfer buffer, a field never overlaps a buffer
            unsafe {ptr::copy_nonoverlapping(descriptor.source(), descriptor.destination(), descriptor.size())};
        }
        Ok(())
    }
}

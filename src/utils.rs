/**
    implement [packbytes::FromBytes] and [packbytes::ToBytes] for a `bilge` type, through the integer it is backed by

    the packed image has the size of that integer, so bitfield structs and enums cross the link as plain integers
*/
#[macro_export]
macro_rules! pack_bits {
    ($t:ty, $int:ty) => {

        impl $crate::packbytes::ToBytes for $t {
            type Bytes = [u8; core::mem::size_of::<$int>()];

            fn to_le_bytes(self) -> Self::Bytes {
                <$int>::from(self).to_le_bytes()
            }
            fn to_be_bytes(self) -> Self::Bytes {
                <$int>::from(self).to_be_bytes()
            }
        }
        impl $crate::packbytes::FromBytes for $t {
            type Bytes = [u8; core::mem::size_of::<$int>()];

            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from(<$int>::from_le_bytes(bytes))
            }
            fn from_be_bytes(bytes: Self::Bytes) -> Self {
                <$t>::from(<$int>::from_be_bytes(bytes))
            }
        }
    };
}

/// largest of two sizes, usable in constants
pub const fn max(a: usize, b: usize) -> usize {
    if a > b {a} else {b}
}

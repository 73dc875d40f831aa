//! Typed identifiers for the entities in the problem description.
//!
//! Kept as thin newtypes over `u32` rather than packed 64-bit integers so they hash and display
//! legibly and so a typo cannot silently mix a chooser id with a choice id.

use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(pub u32);

        impl $name {
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(value: usize) -> Self {
                Self(value as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(ChoiceId);
id_type!(ChooserId);
id_type!(SlotId);

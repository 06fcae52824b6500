//! Style objects: mutable [`StatefulStyle`] chains and immutable
//! [`SealedStyle`] values.

mod entries;
pub mod sealed;
pub mod stateful;

pub use entries::{StateEntry, shadows};
pub use sealed::{SealedStyle, StyleBuilder};
pub use stateful::{StatefulStyle, StyleChange};

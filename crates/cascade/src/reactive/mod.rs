//! Single-threaded reactive primitives.
//!
//! - [`Signal`]: a shared value that notifies listeners when it changes.
//! - [`EventStream`]: listeners for discrete events that are not values.
//! - [`Computed`]: a value derived from signals through a [`Tracker`],
//!   recomputed eagerly and synchronously on the same turn as the change.
//! - [`Subscription`]: RAII handle; dropping it unsubscribes.
//!
//! ## Invariants
//!
//! 1. Listeners run in registration order.
//! 2. Setting a value equal to the current one notifies nobody.
//! 3. A dropped subscription is skipped even by a notification pass that is
//!    already in progress.
//! 4. A computed value owns the subscriptions to its inputs; nothing has to
//!    be unsubscribed by hand.

mod computed;
mod signal;
mod subscription;

pub use computed::{Computed, Tracker};
pub use signal::{EventStream, Signal};
pub use subscription::Subscription;

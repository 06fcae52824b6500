use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle to a registered listener.
///
/// Dropping the handle unsubscribes. The listener is deactivated before it is
/// removed, so a notification pass that is already running skips it too.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription to a source that will never fire again.
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Returns true if this handle is not attached to any listener list.
    pub fn is_noop(&self) -> bool {
        self.cancel.is_none()
    }

    /// Explicit form of `drop(subscription)`.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("noop", &self.is_noop())
            .finish()
    }
}

struct Slot<E> {
    active: Cell<bool>,
    callback: Box<dyn Fn(&E)>,
}

/// Ordered listener list shared by signals and event streams.
pub(crate) struct Listeners<E> {
    slots: RefCell<Vec<Rc<Slot<E>>>>,
}

impl<E: 'static> Listeners<E> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            slots: RefCell::new(Vec::new()),
        })
    }

    pub(crate) fn add(self: &Rc<Self>, callback: impl Fn(&E) + 'static) -> Subscription {
        let slot = Rc::new(Slot {
            active: Cell::new(true),
            callback: Box::new(callback),
        });
        self.slots.borrow_mut().push(Rc::clone(&slot));

        let list: Weak<Self> = Rc::downgrade(self);
        let slot = Rc::downgrade(&slot);
        Subscription::new(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            slot.active.set(false);
            if let Some(list) = list.upgrade() {
                // Release the borrow before the callback (and whatever it owns) is dropped.
                let removed = {
                    let mut slots = list.slots.borrow_mut();
                    slots
                        .iter()
                        .position(|s| Rc::ptr_eq(s, &slot))
                        .map(|idx| slots.remove(idx))
                };
                drop(removed);
            }
        })
    }

    pub(crate) fn notify(&self, event: &E) {
        let snapshot: Vec<Rc<Slot<E>>> = self.slots.borrow().clone();
        for slot in snapshot {
            if slot.active.get() {
                (slot.callback)(event);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().len()
    }
}

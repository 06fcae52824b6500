use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::subscription::{Listeners, Subscription};

/// A stream of discrete events with ordered listeners.
///
/// Cloning the stream shares the listener list.
pub struct EventStream<E> {
    listeners: Rc<Listeners<E>>,
}

impl<E: 'static> EventStream<E> {
    pub fn new() -> Self {
        Self {
            listeners: Listeners::new(),
        }
    }

    /// Delivers `event` to every active listener, in registration order.
    pub fn emit(&self, event: &E) {
        self.listeners.notify(event);
    }

    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        self.listeners.add(callback)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: 'static> Default for EventStream<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventStream<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: Rc::clone(&self.listeners),
        }
    }
}

impl<E> fmt::Debug for EventStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

struct SignalInner<T> {
    value: RefCell<T>,
    changes: EventStream<T>,
}

/// A shared, observable value.
///
/// Setting a value equal to the current one is a no-op: nothing is stored and
/// no listener runs. Clones share the same cell.
///
/// # Example
///
/// ```
/// use cascade::reactive::Signal;
/// use std::{cell::Cell, rc::Rc};
///
/// let opacity = Signal::new(1.0);
/// let seen = Rc::new(Cell::new(0.0));
/// let sink = Rc::clone(&seen);
/// let _sub = opacity.subscribe(move |v| sink.set(*v));
///
/// opacity.set(0.5);
/// assert_eq!(seen.get(), 0.5);
/// ```
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                changes: EventStream::new(),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Stores `value` and notifies listeners. Returns false when unchanged.
    pub fn set(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        self.inner.value.replace(value.clone());
        self.inner.changes.emit(&value);
        true
    }

    /// Applies `f` to a copy of the value and stores the result.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> bool {
        let mut value = self.get();
        f(&mut value);
        self.set(value)
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.changes.subscribe(callback)
    }

    pub fn listener_count(&self) -> usize {
        self.inner.changes.listener_count()
    }
}

impl<T> Signal<T> {
    /// Identity of the underlying cell, shared by all clones.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal")
            .field(&*self.inner.value.borrow())
            .finish()
    }
}

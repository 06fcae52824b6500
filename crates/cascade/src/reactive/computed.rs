use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use super::signal::Signal;
use super::subscription::Subscription;

pub(crate) trait Invalidate {
    fn invalidate(&self);
}

/// Records the inputs read by a computation.
///
/// A tracker handed out by [`Computed`] subscribes to every signal read
/// through it; an untracked one only reads, which lets snapshot queries share
/// code with the reactive ones.
pub struct Tracker {
    target: Option<Weak<dyn Invalidate>>,
    seen: HashSet<usize>,
    subscriptions: Vec<Subscription>,
}

impl Tracker {
    fn new(target: Weak<dyn Invalidate>) -> Self {
        Self {
            target: Some(target),
            seen: HashSet::new(),
            subscriptions: Vec::new(),
        }
    }

    /// A tracker that records nothing.
    pub fn untracked() -> Self {
        Self {
            target: None,
            seen: HashSet::new(),
            subscriptions: Vec::new(),
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.target.is_some()
    }

    /// Reads `signal`, subscribing the running computation to it.
    pub fn track<T: Clone + PartialEq + 'static>(&mut self, signal: &Signal<T>) -> T {
        self.watch(signal);
        signal.get()
    }

    /// Like [`track`](Self::track) without cloning the value.
    pub fn track_with<T, R>(&mut self, signal: &Signal<T>, f: impl FnOnce(&T) -> R) -> R
    where
        T: Clone + PartialEq + 'static,
    {
        self.watch(signal);
        signal.with(f)
    }

    pub fn track_computed<T: Clone + PartialEq + 'static>(&mut self, computed: &Computed<T>) -> T {
        self.track(computed.signal())
    }

    fn watch<T: Clone + PartialEq + 'static>(&mut self, signal: &Signal<T>) {
        let Some(target) = &self.target else {
            return;
        };
        if !self.seen.insert(signal.id()) {
            return;
        }
        let target = target.clone();
        self.subscriptions.push(signal.subscribe(move |_| {
            if let Some(target) = target.upgrade() {
                target.invalidate();
            }
        }));
    }

    fn into_subscriptions(self) -> Vec<Subscription> {
        self.subscriptions
    }
}

struct ComputedInner<T> {
    this: Weak<ComputedInner<T>>,
    output: Signal<T>,
    compute: Box<dyn Fn(&mut Tracker) -> T>,
    sources: RefCell<Vec<Subscription>>,
    running: Cell<bool>,
    stale: Cell<bool>,
}

impl<T: Clone + PartialEq + 'static> Invalidate for ComputedInner<T> {
    fn invalidate(&self) {
        if self.running.get() {
            // An input fired while we were computing; run once more afterwards.
            self.stale.set(true);
            return;
        }
        self.running.set(true);
        let value = loop {
            self.stale.set(false);
            let target: Weak<dyn Invalidate> = self.this.clone();
            let mut tracker = Tracker::new(target);
            let value = (self.compute)(&mut tracker);
            let previous = self.sources.replace(tracker.into_subscriptions());
            drop(previous);
            if !self.stale.get() {
                break value;
            }
        };
        self.running.set(false);
        self.output.set(value);
    }
}

/// A value derived from other signals, recomputed eagerly when they change.
///
/// Inputs are whatever the closure reads through its [`Tracker`]; the set is
/// rebuilt on every run, so branches that stop being taken stop being
/// watched. The computed value owns its upstream subscriptions: dropping the
/// last handle tears the whole derivation down.
///
/// # Example
///
/// ```
/// use cascade::reactive::{Computed, Signal};
///
/// let width = Signal::new(10);
/// let source = width.clone();
/// let doubled = Computed::new(move |cx| cx.track(&source) * 2);
///
/// width.set(21);
/// assert_eq!(doubled.get(), 42);
/// ```
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T: Clone + PartialEq + 'static> Computed<T> {
    pub fn new(compute: impl Fn(&mut Tracker) -> T + 'static) -> Self {
        let inner = Rc::new_cyclic(|this: &Weak<ComputedInner<T>>| {
            let target: Weak<dyn Invalidate> = this.clone();
            let mut tracker = Tracker::new(target);
            let value = compute(&mut tracker);
            ComputedInner {
                this: this.clone(),
                output: Signal::new(value),
                compute: Box::new(compute),
                sources: RefCell::new(tracker.into_subscriptions()),
                running: Cell::new(false),
                stale: Cell::new(false),
            }
        });
        Self { inner }
    }

    /// A computed value with no inputs.
    pub fn constant(value: T) -> Self {
        Self::new(move |_| value.clone())
    }

    pub fn get(&self) -> T {
        self.inner.output.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.output.with(f)
    }

    /// Subscribes to changes of the derived value. Nothing is delivered
    /// until the value actually changes; call [`get`](Self::get) for the
    /// current one.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.output.subscribe(callback)
    }

    pub fn signal(&self) -> &Signal<T> {
        &self.inner.output
    }

    /// Derives a new value from this one. The result keeps `self` alive.
    pub fn map<U: Clone + PartialEq + 'static>(
        &self,
        f: impl Fn(&T) -> U + 'static,
    ) -> Computed<U> {
        let source = self.clone();
        Computed::new(move |cx| {
            cx.watch(source.signal());
            source.with(&f)
        })
    }

    /// Number of inputs the last run subscribed to.
    pub fn source_count(&self) -> usize {
        self.inner.sources.borrow().len()
    }
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Computed").field(&self.inner.output).finish()
    }
}

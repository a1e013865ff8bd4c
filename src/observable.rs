use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`Observable::subscribe`], unique across all observables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }
}

type Observer<T> = Box<dyn FnMut(&T)>;

/// A value that notifies its observers every time it is set.
///
/// Observers run synchronously, in subscription order, on whichever thread
/// calls [`Observable::set`]. A new observer is handed the current value as
/// soon as it subscribes.
pub struct Observable<T> {
    value: T,
    observers: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            observers: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify observers, even if it did not change
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.notify();
    }

    /// Mutate the value in place, then notify observers
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.notify();
    }

    pub fn subscribe(&mut self, mut observer: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId::next();
        observer(&self.value);
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed here
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.value);
        }
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("observers", &self.observers.len())
            .finish()
    }
}

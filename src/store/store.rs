use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::{Result, StoreError};
use crate::lock;
use crate::store::observer::{observer_fn, same_observer, ObserverRef};

/// An observable state container.
///
/// `Store` is a handle: cloning it shares the same state and observer list.
/// State never leaks out by reference. [`get`](Store::get) returns a clone,
/// [`update`](Store::update) hands the updater a clone, and values coming in
/// are moved, so no caller can alias the stored value.
///
/// No lock is held while updaters or observers run, so an observer may call
/// `set` again on this or any other store. Nothing stops an observer cycle
/// from recursing forever; that is on the caller.
///
/// # Examples
///
/// ```
/// use islet::{observer_fn, Store};
///
/// let store = Store::new(vec![1, 2]);
/// store.attach(observer_fn(|s: &Store<Vec<i32>>| println!("{:?}", s.get()))).unwrap();
///
/// store.update(|mut items| {
///     items.push(3);
///     items
/// }).unwrap();
/// assert_eq!(store.get(), vec![1, 2, 3]);
/// ```
pub struct Store<T> {
    state: Arc<RwLock<T>>,
    observers: Arc<RwLock<Vec<ObserverRef<T>>>>,
}

impl<T: Clone> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            observers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        lock::read(&self.state).clone()
    }

    /// Alias of [`get`](Store::get).
    pub fn state(&self) -> T {
        self.get()
    }

    /// Read state in place without copying it.
    ///
    /// The lock is held for the duration of `f`; do not touch this store
    /// from inside it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = lock::read(&self.state);
        f(&*state)
    }

    /// Replace the state and notify observers.
    pub fn set(&self, new_state: T) -> Result<()> {
        *lock::write(&self.state) = new_state;
        self.notify()
    }

    /// Compute the next state from a copy of the current one, then notify.
    ///
    /// The updater owns its argument, so whatever it does to it cannot reach
    /// the stored value or any earlier snapshot.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(T) -> T,
    {
        let next = f(self.get());
        self.set(next)
    }

    /// Mutate a copy of the current state in place, then store it and notify.
    pub fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        self.update(|mut state| {
            f(&mut state);
            state
        })
    }

    /// Attach an observer.
    ///
    /// Fails with [`StoreError::DuplicateObserver`] if this exact handle is
    /// already attached.
    pub fn attach(&self, observer: ObserverRef<T>) -> Result<()> {
        let mut observers = lock::write(&self.observers);
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return Err(StoreError::DuplicateObserver);
        }
        observers.push(observer);
        Ok(())
    }

    /// Detach an observer.
    ///
    /// Fails with [`StoreError::UnknownObserver`] if it is not attached.
    pub fn detach(&self, observer: &ObserverRef<T>) -> Result<()> {
        let mut observers = lock::write(&self.observers);
        let index = observers
            .iter()
            .position(|o| same_observer(o, observer))
            .ok_or(StoreError::UnknownObserver)?;
        observers.remove(index);
        Ok(())
    }

    /// Subscribe a closure to state changes.
    ///
    /// Returns the handle so the subscription can later be detached.
    pub fn subscribe<F>(&self, callback: F) -> Result<ObserverRef<T>>
    where
        T: 'static,
        F: Fn(&Store<T>) + Send + Sync + 'static,
    {
        let observer = observer_fn(callback);
        self.attach(Arc::clone(&observer))?;
        Ok(observer)
    }

    /// Notify all observers of a state change.
    ///
    /// Observers run in attachment order against the list as it stood when
    /// notification began. The first error stops the round; later observers
    /// are not called.
    pub fn notify(&self) -> Result<()> {
        let observers = lock::read(&self.observers).clone();
        tracing::trace!(observers = observers.len(), "notifying store observers");
        for observer in &observers {
            observer.update(self).map_err(StoreError::Observer)?;
        }
        Ok(())
    }

    pub fn observer_count(&self) -> usize {
        lock::read(&self.observers).len()
    }

    pub fn has_observer(&self, observer: &ObserverRef<T>) -> bool {
        lock::read(&self.observers)
            .iter()
            .any(|o| same_observer(o, observer))
    }
}

impl<T> Store<T> {
    /// Whether both handles point at the same store.
    pub fn same_store(&self, other: &Store<T>) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &*lock::read(&self.state))
            .field("observers", &lock::read(&self.observers).len())
            .finish()
    }
}

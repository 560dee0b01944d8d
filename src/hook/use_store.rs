use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::stack::{AllocOptions, Pointer, StoreStack};
use crate::store::{observer_fn, ObserverRef, Store};

type ChangeCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// What [`use_store_with`] does when attaching an observer fails.
///
/// The default swallows the failure silently, so independent call sites can
/// all call `use_store_with` on the same pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ErrorHandling {
    /// Log each failure as a warning.
    pub verbose: bool,
    /// Return the first failure instead of carrying on.
    pub stop_on_error: bool,
}

impl ErrorHandling {
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            stop_on_error: false,
        }
    }

    pub fn stop_on_error() -> Self {
        Self {
            verbose: false,
            stop_on_error: true,
        }
    }

    fn handle(&self, pointer: &Pointer, err: StoreError) -> Result<()> {
        if self.verbose {
            tracing::warn!(%pointer, %err, "use_store could not attach observer");
        }
        if self.stop_on_error {
            Err(err)
        } else {
            Ok(())
        }
    }
}

/// Options for [`use_store_with`].
pub struct UseStoreOptions<T> {
    /// Slot to use; a fresh one is generated when unset.
    pub pointer: Option<Pointer>,
    /// Called with a snapshot of the new state after every change.
    pub on_change: Option<ChangeCallback<T>>,
    /// Extra observers, attached before the `on_change` one.
    pub observers: Vec<ObserverRef<T>>,
    /// Replace whatever store is at the pointer instead of joining it.
    pub override_existing: bool,
    pub error_handling: ErrorHandling,
}

impl<T> UseStoreOptions<T> {
    pub fn new() -> Self {
        Self {
            pointer: None,
            on_change: None,
            observers: Vec::new(),
            override_existing: false,
            error_handling: ErrorHandling::default(),
        }
    }

    pub fn pointer(mut self, pointer: impl Into<Pointer>) -> Self {
        self.pointer = Some(pointer.into());
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(callback));
        self
    }

    pub fn observer(mut self, observer: ObserverRef<T>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn observers(mut self, observers: impl IntoIterator<Item = ObserverRef<T>>) -> Self {
        self.observers.extend(observers);
        self
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn error_handling(mut self, error_handling: ErrorHandling) -> Self {
        self.error_handling = error_handling;
        self
    }
}

impl<T> Default for UseStoreOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for UseStoreOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UseStoreOptions")
            .field("pointer", &self.pointer)
            .field("on_change", &self.on_change.is_some())
            .field("observers", &self.observers.len())
            .field("override_existing", &self.override_existing)
            .field("error_handling", &self.error_handling)
            .finish()
    }
}

impl StoreStack {
    /// Allocate a new store holding `initial` and return its pointer.
    pub fn use_store<T>(&self, initial: T) -> Pointer
    where
        T: Clone + Send + Sync + 'static,
    {
        self.add_store(Store::new(initial))
    }

    /// Join or create the store at a pointer.
    ///
    /// Without `override_existing` this is an upsert: the first caller's
    /// `initial` wins and later callers only add their observers. With it,
    /// a new store replaces whatever was there.
    ///
    /// Returns the pointer. Observer failures are handled per
    /// [`ErrorHandling`]; only `stop_on_error` ever yields `Err`.
    pub fn use_store_with<T>(&self, initial: T, options: UseStoreOptions<T>) -> Result<Pointer>
    where
        T: Clone + Send + Sync + 'static,
    {
        let UseStoreOptions {
            pointer,
            on_change,
            mut observers,
            override_existing,
            error_handling,
        } = options;

        let pointer = pointer.unwrap_or_else(Pointer::generate);
        let on_change: ChangeCallback<T> = on_change.unwrap_or_else(|| Arc::new(|_: T| {}));
        observers.push(observer_fn(move |store: &Store<T>| on_change(store.get())));

        if override_existing {
            let store = Store::new(initial);
            for observer in observers {
                if let Err(err) = store.attach(observer) {
                    error_handling.handle(&pointer, err)?;
                }
            }
            self.add_store_at_pointer(store, &pointer, AllocOptions::overriding())?;
        } else if let Err(err) = self.upsert(initial, &pointer, observers) {
            error_handling.handle(&pointer, err)?;
        }

        Ok(pointer)
    }
}

/// Allocate a new store on the current [`StoreStack`] and return its pointer.
///
/// # Example
///
/// ```
/// use islet::{use_store, StoreStack};
///
/// let pointer = use_store("A".to_string());
/// let store = StoreStack::current().get::<String>(&pointer).unwrap();
/// store.set("B".to_string()).unwrap();
/// assert_eq!(store.get(), "B");
/// ```
pub fn use_store<T>(initial: T) -> Pointer
where
    T: Clone + Send + Sync + 'static,
{
    StoreStack::current().use_store(initial)
}

/// Join or create a store on the current [`StoreStack`].
///
/// See [`StoreStack::use_store_with`].
///
/// # Example
///
/// ```
/// use islet::{use_store_with, StoreStack, UseStoreOptions};
///
/// StoreStack::scope(|| {
///     let first = use_store_with(0, UseStoreOptions::new().pointer("cart")).unwrap();
///     let second = use_store_with(1, UseStoreOptions::new().pointer("cart")).unwrap();
///
///     assert_eq!(first, second);
///     assert_eq!(StoreStack::current().get::<i32>("cart").unwrap().get(), 0);
/// });
/// ```
pub fn use_store_with<T>(initial: T, options: UseStoreOptions<T>) -> Result<Pointer>
where
    T: Clone + Send + Sync + 'static,
{
    StoreStack::current().use_store_with(initial, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn plain_use_store_always_allocates() {
        let stack = StoreStack::new();
        let a = stack.use_store(1);
        let b = stack.use_store(1);

        assert_ne!(a, b);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn generates_pointer_when_unset() {
        let stack = StoreStack::new();
        let pointer = stack
            .use_store_with(5, UseStoreOptions::new())
            .unwrap();

        assert_eq!(stack.get::<i32>(&pointer).unwrap().get(), 5);
    }

    #[test]
    fn on_change_gets_new_state() {
        let stack = StoreStack::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let pointer = stack
            .use_store_with(
                0,
                UseStoreOptions::new()
                    .pointer("counter")
                    .on_change(move |n| seen_clone.lock().unwrap().push(n)),
            )
            .unwrap();

        let store = stack.get::<i32>(&pointer).unwrap();
        store.set(1).unwrap();
        store.modify(|n| *n += 1).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn later_callers_join_existing_store() {
        let stack = StoreStack::new();
        let options = || UseStoreOptions::new().pointer("fixed");

        assert_eq!(stack.use_store_with(0, options()).unwrap(), "fixed");
        assert_eq!(stack.use_store_with(1, options()).unwrap(), "fixed");

        let store = stack.get::<i32>("fixed").unwrap();
        assert_eq!(store.get(), 0);
        // One synthesized on_change observer per call.
        assert_eq!(store.observer_count(), 2);
    }

    #[test]
    fn override_replaces_existing_store() {
        let stack = StoreStack::new();
        stack
            .use_store_with(0, UseStoreOptions::new().pointer("p"))
            .unwrap();
        stack
            .use_store_with(7, UseStoreOptions::new().pointer("p").override_existing(true))
            .unwrap();

        let store = stack.get::<i32>("p").unwrap();
        assert_eq!(store.get(), 7);
        assert_eq!(store.observer_count(), 1);
    }

    #[test]
    fn duplicate_observers_are_swallowed_by_default() {
        let stack = StoreStack::new();
        let observer = observer_fn(|_: &Store<i32>| {});
        let options = || {
            UseStoreOptions::new()
                .pointer("p")
                .observer(Arc::clone(&observer))
        };

        stack.use_store_with(0, options()).unwrap();
        let pointer = stack
            .use_store_with(0, options().error_handling(ErrorHandling::verbose()))
            .unwrap();

        assert_eq!(pointer, "p");
        // The duplicate stopped the upsert before the second on_change observer.
        assert_eq!(stack.get::<i32>("p").unwrap().observer_count(), 2);
    }

    #[test]
    fn stop_on_error_propagates() {
        let stack = StoreStack::new();
        let observer = observer_fn(|_: &Store<i32>| {});

        stack
            .use_store_with(0, UseStoreOptions::new().pointer("p").observer(Arc::clone(&observer)))
            .unwrap();
        let err = stack
            .use_store_with(
                0,
                UseStoreOptions::new()
                    .pointer("p")
                    .observer(Arc::clone(&observer))
                    .error_handling(ErrorHandling::stop_on_error()),
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateObserver));
    }

    #[test]
    fn override_with_stop_on_error_leaves_slot_alone() {
        let stack = StoreStack::new();
        stack.use_store_with(1, UseStoreOptions::new().pointer("p")).unwrap();

        let observer = observer_fn(|_: &Store<i32>| {});
        let err = stack
            .use_store_with(
                2,
                UseStoreOptions::new()
                    .pointer("p")
                    .observers([Arc::clone(&observer), Arc::clone(&observer)])
                    .override_existing(true)
                    .error_handling(ErrorHandling::stop_on_error()),
            )
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateObserver));
        assert_eq!(stack.get::<i32>("p").unwrap().get(), 1);
    }

    #[test]
    fn override_swallows_duplicates_and_registers() {
        let stack = StoreStack::new();
        let observer = observer_fn(|_: &Store<i32>| {});

        stack
            .use_store_with(
                2,
                UseStoreOptions::new()
                    .pointer("p")
                    .observers([Arc::clone(&observer), Arc::clone(&observer)])
                    .override_existing(true),
            )
            .unwrap();

        let store = stack.get::<i32>("p").unwrap();
        assert_eq!(store.get(), 2);
        assert_eq!(store.observer_count(), 2);
    }

    #[test]
    fn type_mismatch_follows_policy() {
        let stack = StoreStack::new();
        stack.use_store_with(0_i32, UseStoreOptions::new().pointer("p")).unwrap();

        assert!(stack
            .use_store_with(String::new(), UseStoreOptions::new().pointer("p"))
            .is_ok());
        let err = stack
            .use_store_with(
                String::new(),
                UseStoreOptions::new()
                    .pointer("p")
                    .error_handling(ErrorHandling::stop_on_error()),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
    }
}

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{Result, StoreError};
use crate::lock;
use crate::stack::{AllocOptions, Pointer, RemoveOptions};
use crate::store::{ObserverRef, Store};

/// A type-erased store handle plus the name of its state type.
struct Slot {
    store: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Slot {
    fn new<T>(store: Store<T>) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        Self {
            store: Box::new(store),
            type_name: type_name::<T>(),
        }
    }

    fn downcast<T: 'static>(&self, pointer: &str) -> Result<Store<T>> {
        self.store
            .downcast_ref::<Store<T>>()
            .cloned()
            .ok_or_else(|| StoreError::TypeMismatch {
                pointer: Pointer::from(pointer),
                expected: type_name::<T>(),
                found: self.type_name,
            })
    }
}

/// A pointer-keyed registry of stores.
///
/// Stores of any state type share one registry; lookups name the type they
/// expect and get nothing back when it does not match.
///
/// Most code uses the process-wide stack through [`StoreStack::current`].
/// Tests and embedders can build their own with [`StoreStack::new`] or run
/// code against a throwaway one with [`StoreStack::scope`].
///
/// # Examples
///
/// ```
/// use islet::{AllocOptions, Store, StoreStack};
///
/// let stack = StoreStack::new();
/// let pointer = stack.add_store(Store::new(String::from("hello")));
///
/// let store = stack.get::<String>(&pointer).unwrap();
/// assert_eq!(store.get(), "hello");
///
/// // Taken slots are only replaced on request.
/// assert!(stack
///     .add_store_at_pointer(Store::new(String::new()), &pointer, AllocOptions::default())
///     .is_err());
/// ```
pub struct StoreStack {
    stores: RwLock<HashMap<Pointer, Slot>>,
}

// Thread-local stack of scoped registries
thread_local! {
    static STACK_SCOPES: RefCell<Vec<Arc<StoreStack>>> = const { RefCell::new(Vec::new()) };
}

impl StoreStack {
    /// Create an empty, independent registry.
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Get or lazily create the process-wide registry.
    ///
    /// Idempotent: every call returns the same instance, which lives until
    /// the process exits.
    pub fn configure() -> Arc<Self> {
        static STACK: OnceLock<Arc<StoreStack>> = OnceLock::new();
        Arc::clone(STACK.get_or_init(|| {
            tracing::debug!("process-wide store stack created");
            Arc::new(StoreStack::new())
        }))
    }

    /// Alias of [`configure`](StoreStack::configure).
    pub fn global() -> Arc<Self> {
        Self::configure()
    }

    /// The registry in effect on this thread: the innermost scoped one, or
    /// the process-wide one if no scope is active.
    pub fn current() -> Arc<Self> {
        STACK_SCOPES.with(|scopes| {
            scopes
                .borrow()
                .last()
                .cloned()
                .unwrap_or_else(Self::configure)
        })
    }

    /// Run a function against a fresh, isolated registry.
    ///
    /// The registry and every store only it references are dropped when
    /// `f` returns.
    ///
    /// ```
    /// use islet::{use_store, StoreStack};
    ///
    /// StoreStack::scope(|| {
    ///     let pointer = use_store(0);
    ///     assert_eq!(StoreStack::current().len(), 1);
    ///     assert!(StoreStack::global().get::<i32>(&pointer).is_none());
    /// });
    /// ```
    pub fn scope<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::with_stack(Arc::new(Self::new()), f)
    }

    /// Run a function with `stack` as the current registry.
    ///
    /// `use_store` and `use_store_with` called inside `f` allocate on
    /// `stack`. The previous registry is restored even if `f` panics.
    pub fn with_stack<F, R>(stack: Arc<Self>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        STACK_SCOPES.with(|scopes| {
            scopes.borrow_mut().push(stack);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        STACK_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    /// Register a store under a freshly generated pointer.
    pub fn add_store<T>(&self, store: Store<T>) -> Pointer
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut stores = lock::write(&self.stores);
        let mut pointer = Pointer::generate();
        while stores.contains_key(&pointer) {
            pointer = Pointer::generate();
        }
        stores.insert(pointer.clone(), Slot::new(store));
        tracing::debug!(%pointer, state = type_name::<T>(), "store allocated");
        pointer
    }

    /// Register a store at a caller-chosen pointer.
    ///
    /// An unallocated pointer is always taken. An allocated one is replaced
    /// only with [`AllocOptions::override_existing`]; otherwise this fails
    /// with [`StoreError::MemoryAllocation`] and leaves the slot alone.
    pub fn add_store_at_pointer<T>(
        &self,
        store: Store<T>,
        pointer: impl Into<Pointer>,
        options: AllocOptions,
    ) -> Result<()>
    where
        T: Clone + Send + Sync + 'static,
    {
        let pointer = pointer.into();
        let replaced = {
            let mut stores = lock::write(&self.stores);
            if stores.contains_key(&pointer) && !options.override_existing {
                if options.verbose {
                    tracing::warn!(
                        %pointer,
                        "pointer is already allocated; set override_existing to replace its store"
                    );
                }
                return Err(StoreError::MemoryAllocation { pointer });
            }
            stores.insert(pointer.clone(), Slot::new(store))
        };

        tracing::debug!(
            %pointer,
            state = type_name::<T>(),
            replaced = replaced.is_some(),
            "store allocated"
        );
        Ok(())
    }

    /// Insert-if-absent, then attach observers.
    ///
    /// When the pointer is free a store holding `default` is created there;
    /// otherwise `default` is dropped and the existing state is kept. Every
    /// observer is then attached in order. The first
    /// [`StoreError::DuplicateObserver`] stops the rest; those attached
    /// before it stay attached.
    pub fn upsert<T, I>(&self, default: T, pointer: impl Into<Pointer>, observers: I) -> Result<Store<T>>
    where
        T: Clone + Send + Sync + 'static,
        I: IntoIterator<Item = ObserverRef<T>>,
    {
        let pointer = pointer.into();
        let store = match lock::write(&self.stores).entry(pointer) {
            Entry::Occupied(entry) => entry.get().downcast::<T>(entry.key())?,
            Entry::Vacant(entry) => {
                let store = Store::new(default);
                tracing::debug!(pointer = %entry.key(), state = type_name::<T>(), "store allocated by upsert");
                entry.insert(Slot::new(store.clone()));
                store
            }
        };

        for observer in observers {
            store.attach(observer)?;
        }
        Ok(store)
    }

    /// Drop the store at a pointer from the registry.
    ///
    /// Handles to it held elsewhere keep working; they are just no longer
    /// reachable through this registry. Fails with
    /// [`StoreError::NullPointer`] if nothing is allocated there.
    pub fn remove_store(&self, pointer: &str, options: RemoveOptions) -> Result<()> {
        let removed = lock::write(&self.stores).remove(pointer);
        match removed {
            Some(_) => {
                tracing::debug!(pointer, "store removed");
                Ok(())
            }
            None => {
                if options.verbose {
                    tracing::warn!(pointer, "cannot remove store: pointer is not allocated");
                }
                Err(StoreError::NullPointer {
                    pointer: Pointer::from(pointer),
                })
            }
        }
    }

    /// Look up the store at a pointer.
    ///
    /// Returns `None` when the pointer is unallocated or holds a different
    /// state type. Use [`try_get`](StoreStack::try_get) to tell those apart.
    pub fn get<T: 'static>(&self, pointer: &str) -> Option<Store<T>> {
        self.try_get(pointer).unwrap_or_else(|err| {
            tracing::debug!(%err, "store lookup type mismatch");
            None
        })
    }

    /// Look up the store at a pointer, reporting a state type mismatch as
    /// [`StoreError::TypeMismatch`].
    pub fn try_get<T: 'static>(&self, pointer: &str) -> Result<Option<Store<T>>> {
        lock::read(&self.stores)
            .get(pointer)
            .map(|slot| slot.downcast::<T>(pointer))
            .transpose()
    }

    pub fn contains(&self, pointer: &str) -> bool {
        lock::read(&self.stores).contains_key(pointer)
    }

    /// Name of the state type stored at a pointer.
    pub fn type_name_of(&self, pointer: &str) -> Option<&'static str> {
        lock::read(&self.stores)
            .get(pointer)
            .map(|slot| slot.type_name)
    }

    pub fn pointers(&self) -> Vec<Pointer> {
        lock::read(&self.stores).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock::read(&self.stores).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every store from the registry.
    pub fn clear(&self) {
        let stores = std::mem::take(&mut *lock::write(&self.stores));
        tracing::debug!(removed = stores.len(), "store stack cleared");
    }
}

impl Default for StoreStack {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StoreStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stores = lock::read(&self.stores);
        f.debug_map()
            .entries(stores.iter().map(|(pointer, slot)| (pointer.as_str(), slot.type_name)))
            .finish()
    }
}

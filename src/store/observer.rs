use std::sync::Arc;

use crate::error::ObserverError;
use crate::store::Store;

/// Something that wants to hear about state changes on a [`Store`].
///
/// `update` receives the store itself; call [`Store::get`] on it for a
/// snapshot of the new state. Returning `Err` stops the notification round
/// and surfaces as [`StoreError::Observer`](crate::StoreError::Observer)
/// from the `set` that triggered it.
pub trait Observer<T>: Send + Sync {
    fn update(&self, subject: &Store<T>) -> Result<(), ObserverError>;
}

/// Shared observer handle. Identity is the allocation, not the contents:
/// two handles are the same observer only if one was cloned from the other.
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

struct FnObserver<F>(F);

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(&Store<T>) + Send + Sync,
{
    fn update(&self, subject: &Store<T>) -> Result<(), ObserverError> {
        (self.0)(subject);
        Ok(())
    }
}

/// Wrap an infallible closure into an observer handle.
///
/// # Example
///
/// ```
/// use islet::{observer_fn, Store};
///
/// let store = Store::new(1);
/// let logger = observer_fn(|store: &Store<i32>| println!("now {}", store.get()));
/// store.attach(logger.clone()).unwrap();
/// store.detach(&logger).unwrap();
/// ```
pub fn observer_fn<T, F>(f: F) -> ObserverRef<T>
where
    T: 'static,
    F: Fn(&Store<T>) + Send + Sync + 'static,
{
    Arc::new(FnObserver(f))
}

pub(crate) fn same_observer<T>(a: &ObserverRef<T>, b: &ObserverRef<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

//! Error types for stores and the store stack.

use thiserror::Error;

use crate::stack::Pointer;

/// Error an observer may return from [`Observer::update`](crate::Observer::update).
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by [`Store`](crate::Store) and [`StoreStack`](crate::StoreStack) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The observer is already attached to the target store.
    #[error("observer is already attached to this store")]
    DuplicateObserver,

    /// The observer is not attached to the target store.
    #[error("observer is not attached to this store")]
    UnknownObserver,

    /// The pointer is already allocated and no override was requested.
    #[error("pointer {pointer} is already allocated")]
    MemoryAllocation { pointer: Pointer },

    /// The pointer has no store allocated.
    #[error("no store is allocated at pointer {pointer}")]
    NullPointer { pointer: Pointer },

    /// The store at the pointer holds a different state type.
    #[error("store at pointer {pointer} holds `{found}`, not `{expected}`")]
    TypeMismatch {
        pointer: Pointer,
        expected: &'static str,
        found: &'static str,
    },

    /// An observer failed during notification.
    #[error("observer failed: {0}")]
    Observer(#[source] ObserverError),
}

/// Payload-free discriminant of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateObserver,
    UnknownObserver,
    MemoryAllocation,
    NullPointer,
    TypeMismatch,
    Observer,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::DuplicateObserver => ErrorKind::DuplicateObserver,
            StoreError::UnknownObserver => ErrorKind::UnknownObserver,
            StoreError::MemoryAllocation { .. } => ErrorKind::MemoryAllocation,
            StoreError::NullPointer { .. } => ErrorKind::NullPointer,
            StoreError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            StoreError::Observer(_) => ErrorKind::Observer,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

//! Poison-tolerant lock access.
//!
//! Updaters and observers never run under one of these guards. Only
//! `Store::read` closures, `T::clone` and `T::drop` do, and none of them may
//! re-enter the store. Only a write guard can poison, and every write is a
//! single assignment or push, so a poisoned lock still holds whole data.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

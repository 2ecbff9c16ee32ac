//! Lock helpers that recover from poisoning.
//!
//! A panicking probe or tick must not wedge the monitor, so every lock in the
//! crate is taken through these helpers: a poisoned guard is logged and used
//! as-is.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|poison_error| {
        tracing::warn!(
            error = %poison_error,
            lock = what,
            "Locking poisoned mutex, using recovered data"
        );
        poison_error.into_inner()
    })
}

/// Read-lock an `RwLock`, recovering the data if a writer panicked.
pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poison_error| {
        tracing::warn!(
            error = %poison_error,
            lock = what,
            "Reading from poisoned lock, using recovered data"
        );
        poison_error.into_inner()
    })
}

/// Write-lock an `RwLock`, recovering the data if a writer panicked.
pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poison_error| {
        tracing::warn!(
            error = %poison_error,
            lock = what,
            "Writing to poisoned lock, using recovered data"
        );
        poison_error.into_inner()
    })
}

//! Poison-aware lock helpers
//!
//! std locks report poisoning when a thread panicked while holding them. The
//! aggregator and the connection pool turn that into their own error types
//! through these helpers instead of unwrapping.

use std::sync::{LockResult, RwLockReadGuard, RwLockWriteGuard};

/// Convert a poisoned `Mutex::lock()` result into a domain error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use orderstats::core::sync::handle_mutex_poison;
/// use orderstats::aggregator::AggregateError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |msg| AggregateError::Poisoned {
///     user_id: "u1".to_string(),
///     message: msg,
/// })
/// .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "mutex poisoned (a panic occurred while the lock was held): {}",
            poison_err
        ))
    })
}

/// Convert a poisoned `RwLock::read()` result into a domain error
pub fn handle_rwlock_read<T, E>(
    result: LockResult<RwLockReadGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "RwLock read poisoned (a writer panicked while holding it): {}",
            poison_err
        ))
    })
}

/// Convert a poisoned `RwLock::write()` result into a domain error
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "RwLock write poisoned (a panic occurred while the lock was held): {}",
            poison_err
        ))
    })
}

//! The lock gate: the single critical section around registry mutation and
//! the emit pipeline.
//!
//! An optional user callback decides whether the gate may be entered (a
//! failing acquire means *busy*). The shared state itself always sits behind a
//! [`Mutex`] so the crate stays sound without a user lock; the callback is
//! what gives callers control over blocking and contention.

use crate::error::{Result, UlogError};
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Two-state lock callback: `call(true)` acquires, `call(false)` releases.
///
/// Closures of type `Fn(bool) -> Result<()>` implement it directly; any
/// context they need is captured.
pub trait LockFn: Send + Sync {
    fn call(&self, acquire: bool) -> Result<()>;
}

impl<F> LockFn for F
where
    F: Fn(bool) -> Result<()> + Send + Sync,
{
    fn call(&self, acquire: bool) -> Result<()> {
        self(acquire)
    }
}

thread_local! {
    // Gates currently held by this thread, keyed by address.
    static HELD_GATES: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

pub(crate) struct Gate<T> {
    lock_fn: RwLock<Option<Arc<dyn LockFn>>>,
    state: Mutex<T>,
}

impl<T> Gate<T> {
    pub(crate) fn new(state: T) -> Self {
        Self {
            lock_fn: RwLock::new(None),
            state: Mutex::new(state),
        }
    }

    /// Installs (`Some`) or clears (`None`) the lock callback.
    pub(crate) fn set_lock(&self, lock_fn: Option<Arc<dyn LockFn>>) {
        *self.lock_fn.write().unwrap_or_else(PoisonError::into_inner) = lock_fn;
    }

    pub(crate) fn has_lock(&self) -> bool {
        self.lock_fn
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Enters the gate. Fails with [`UlogError::Busy`] when the callback
    /// refuses, or when this thread already holds this gate (a handler
    /// logging into its own logger) instead of deadlocking.
    pub(crate) fn acquire(&self) -> Result<GateGuard<'_, T>> {
        let key = self as *const Self as usize;
        let reentered = HELD_GATES
            .try_with(|held| held.borrow().contains(&key))
            .unwrap_or(false);
        if reentered {
            return Err(UlogError::Busy);
        }

        let lock_fn = self
            .lock_fn
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(lock_fn) = &lock_fn {
            lock_fn.call(true).map_err(|_| UlogError::Busy)?;
        }

        let _ = HELD_GATES.try_with(|held| held.borrow_mut().push(key));
        let release = Release { lock_fn, key };
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(GateGuard {
            state,
            _release: release,
        })
    }
}

/// Access to the gated state. Dropping it unlocks the state first, then
/// releases the user lock.
pub(crate) struct GateGuard<'a, T> {
    state: MutexGuard<'a, T>,
    _release: Release,
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.state
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.state
    }
}

struct Release {
    lock_fn: Option<Arc<dyn LockFn>>,
    key: usize,
}

impl Drop for Release {
    fn drop(&mut self) {
        let _ = HELD_GATES.try_with(|held| {
            let mut held = held.borrow_mut();
            if let Some(pos) = held.iter().rposition(|key| *key == self.key) {
                held.remove(pos);
            }
        });
        if let Some(lock_fn) = &self.lock_fn {
            if let Err(e) = lock_fn.call(false) {
                tracing::warn!(target: "ulog", "lock release failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        released: AtomicUsize,
        refuse: AtomicBool,
    }

    fn counting_lock(counters: Arc<Counters>) -> Arc<dyn LockFn> {
        Arc::new(move |acquire: bool| {
            if acquire {
                if counters.refuse.load(Ordering::SeqCst) {
                    return Err(UlogError::error("held elsewhere"));
                }
                counters.acquired.fetch_add(1, Ordering::SeqCst);
            } else {
                counters.released.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        })
    }

    #[test]
    fn test_gate_without_lock_is_open() {
        let gate = Gate::new(5u32);
        assert!(!gate.has_lock());
        let mut guard = gate.acquire().unwrap();
        *guard += 1;
        drop(guard);
        assert_eq!(*gate.acquire().unwrap(), 6);
    }

    #[test]
    fn test_acquire_and_release_are_paired() {
        let counters = Arc::new(Counters::default());
        let gate = Gate::new(());
        gate.set_lock(Some(counting_lock(counters.clone())));

        for _ in 0..3 {
            let _guard = gate.acquire().unwrap();
        }
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 3);
        assert_eq!(counters.released.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_refused_acquire_is_busy_without_release() {
        let counters = Arc::new(Counters::default());
        counters.refuse.store(true, Ordering::SeqCst);
        let gate = Gate::new(());
        gate.set_lock(Some(counting_lock(counters.clone())));

        assert!(matches!(gate.acquire(), Err(UlogError::Busy)));
        assert_eq!(counters.released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reentrant_acquire_is_busy() {
        let gate = Gate::new(());
        let _outer = gate.acquire().unwrap();
        assert!(matches!(gate.acquire(), Err(UlogError::Busy)));
    }

    #[test]
    fn test_clearing_lock() {
        let counters = Arc::new(Counters::default());
        let gate = Gate::new(());
        gate.set_lock(Some(counting_lock(counters.clone())));
        gate.set_lock(None);
        let _guard = gate.acquire().unwrap();
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 0);
    }
}

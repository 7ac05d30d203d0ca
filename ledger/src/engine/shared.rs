//! # Shared Ledger Handle
//!
//! A [`Ledger`] takes `&mut self` for every mutation, which makes single
//! ownership trivially correct but leaves multi-threaded hosts to arrange
//! their own locking. [`SharedLedger`] is that arrangement, done once:
//! `Arc<parking_lot::Mutex<Ledger>>` with a closure-scoped critical
//! section, so a read-compute-write sequence inside one operation can never
//! interleave with a concurrent operation on the same user or the global
//! counters.
//!
//! The granularity is one closure, one lock acquisition. Run one ledger
//! operation per closure and the serial-execution contract of the engine
//! carries over to threads unchanged.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::custody::TokenCustody;

use super::ledger::Ledger;

/// A cloneable, thread-safe handle to a ledger.
pub struct SharedLedger<C: TokenCustody> {
    inner: Arc<Mutex<Ledger<C>>>,
}

impl<C: TokenCustody> SharedLedger<C> {
    /// Wraps a ledger for shared use.
    pub fn new(ledger: Ledger<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Runs `f` inside the ledger's critical section.
    ///
    /// Everything the closure does is atomic relative to every other
    /// `with` call on any clone of this handle. Keep closures short --
    /// one ledger operation each -- and never call `with` re-entrantly
    /// from inside a closure (parking_lot mutexes are not re-entrant).
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger<C>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Unwraps the ledger if this is the last handle, or hands the handle
    /// back otherwise.
    pub fn try_into_inner(self) -> Result<Ledger<C>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => Ok(mutex.into_inner()),
            Err(inner) => Err(Self { inner }),
        }
    }
}

impl<C: TokenCustody> Clone for SharedLedger<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

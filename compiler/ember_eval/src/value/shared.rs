//! Shared, lock-protected storage for mutable aggregates.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Reference-counted, read/write-locked cell.
///
/// Arrays, maps, sets and instance property maps live behind one of these:
/// cloning a `Value` clones the handle, not the contents, and any number of
/// tasks may hold it at once. Readers proceed concurrently; a writer
/// excludes everyone.
///
/// Never hold a guard across a call into user code: the callee may lock the
/// same cell.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Shared(Arc::new(RwLock::new(value)))
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable address, used for identity hashing and cycle detection.
    #[inline]
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T: Clone> Shared<T> {
    /// Copy of the contents, taken under a read lock.
    pub fn snapshot(&self) -> T {
        self.0.read().clone()
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&*self.0.read()).finish()
    }
}

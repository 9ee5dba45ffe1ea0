//! ConcurrentVec: a growable sequence guarded end-to-end by one lock strategy
//!
//! Every operation is a single critical section on the instance's lock:
//! mutations take the lock exclusively, reads take it shared. The lock
//! strategy is a type parameter, so the same container runs unsynchronized
//! (`NullLock`), on the platform rwlock (`OsRwLock`, the default), or on a
//! spinning lock (`SpinRwLock`) without changing the logical interface.

use crate::error::{check_bounds, check_range, Result, StripeVecError};
use crate::sync::{ExclusiveGuard, OsRwLock, RawSharedLock, SharedGuard};
use std::cell::UnsafeCell;
use std::fmt;

/// Growable sequence guarded by a single pluggable lock
///
/// All operations are linearizable with respect to each other: each one holds
/// the instance lock (exclusive for mutation, shared for reads) for its whole
/// critical section, and no mutating operation leaves a partially-updated
/// state visible to other threads.
///
/// # Examples
///
/// ```rust
/// use stripevec::ConcurrentVec;
///
/// let vec: ConcurrentVec<u64> = ConcurrentVec::new();
/// vec.push(42);
/// vec.push(84);
/// assert_eq!(vec.len(), 2);
/// assert_eq!(vec.get(0).unwrap(), 42);
/// ```
pub struct ConcurrentVec<T, L: RawSharedLock = OsRwLock> {
    lock: L,
    data: UnsafeCell<Vec<T>>,
}

// SAFETY: the sequence is only touched under `lock` (see the RawSharedLock
// contract); moving the container moves exclusive ownership of both.
unsafe impl<T: Send, L: RawSharedLock> Send for ConcurrentVec<T, L> {}

// SAFETY: shared references only reach the sequence through the lock's
// shared/exclusive sections. With `NullLock` the exclusion obligation is the
// caller's; see `NullLock`.
unsafe impl<T: Send + Sync, L: RawSharedLock> Sync for ConcurrentVec<T, L> {}

impl<T, L: RawSharedLock> ConcurrentVec<T, L> {
    /// Create a new empty vector with a default-constructed lock
    pub fn new() -> Self {
        Self {
            lock: L::default(),
            data: UnsafeCell::new(Vec::new()),
        }
    }

    /// Create a new empty vector with space for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lock: L::default(),
            data: UnsafeCell::new(Vec::with_capacity(capacity)),
        }
    }

    /// Shared access to the sequence
    ///
    /// # Safety
    ///
    /// Caller must hold the lock (shared or exclusive) for the returned
    /// borrow's lifetime.
    #[inline]
    unsafe fn data_ref(&self) -> &Vec<T> {
        // SAFETY: per method contract, the lock is held.
        unsafe { &*self.data.get() }
    }

    /// Exclusive access to the sequence
    ///
    /// # Safety
    ///
    /// Caller must hold the lock exclusively for the returned borrow's
    /// lifetime.
    #[inline]
    #[allow(clippy::mut_from_ref)]
    unsafe fn data_mut(&self) -> &mut Vec<T> {
        // SAFETY: per method contract, the exclusive lock is held.
        unsafe { &mut *self.data.get() }
    }

    /// Append an element
    pub fn push(&self, value: T) {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        unsafe { self.data_mut() }.push(value);
    }

    /// Append an element without blocking
    ///
    /// Attempts a non-blocking exclusive acquisition. On contention the
    /// sequence is left untouched and the value is handed back in `Err` (the
    /// would-block outcome), so it can be retried once the writer releases.
    pub fn try_push(&self, value: T) -> std::result::Result<(), T> {
        match ExclusiveGuard::try_new(&self.lock) {
            Some(_g) => {
                // SAFETY: exclusive guard held.
                unsafe { self.data_mut() }.push(value);
                Ok(())
            }
            None => Err(value),
        }
    }

    /// Append every element of `iter` as one atomic batch
    ///
    /// The whole batch lands in a single critical section: shared readers see
    /// either none or all of it, and lock overhead is amortized versus
    /// repeated [`push`](Self::push). The iterator runs under the exclusive
    /// lock; it must not touch this container.
    pub fn extend<I: IntoIterator<Item = T>>(&self, iter: I) {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        unsafe { self.data_mut() }.extend(iter);
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held.
        unsafe { self.data_ref() }.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite the element at `index`
    ///
    /// Fails with `OutOfBounds` when `index >= len`.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        let data = unsafe { self.data_mut() };
        check_bounds(index, data.len())?;
        data[index] = value;
        Ok(())
    }

    /// Remove the element at `index`, shifting the tail down one position
    ///
    /// Returns the removed element, or `None` when `index >= len` (a no-op,
    /// not an error).
    pub fn remove(&self, index: usize) -> Option<T> {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        let data = unsafe { self.data_mut() };
        if index >= data.len() {
            return None;
        }
        Some(data.remove(index))
    }

    /// Remove the half-open range `[first, last)` as one atomic batch
    ///
    /// Returns the number of elements removed. A malformed range
    /// (`first >= last` or `last > len`) is a reported `InvalidRange` error
    /// rather than a silent no-op, and removes nothing.
    pub fn remove_range(&self, first: usize, last: usize) -> Result<usize> {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        let data = unsafe { self.data_mut() };
        check_range(first, last, data.len())?;
        data.drain(first..last);
        Ok(last - first)
    }

    /// Empty the sequence
    pub fn clear(&self) {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        unsafe { self.data_mut() }.clear();
    }

    /// Index of the first element matching `pred`, scanning in index order
    pub fn find_if<P: FnMut(&T) -> bool>(&self, pred: P) -> Option<usize> {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held.
        unsafe { self.data_ref() }.iter().position(pred)
    }

    /// Apply `f` to every element in index order under one shared section
    ///
    /// The shared lock is held for the whole traversal; `f` must not re-enter
    /// this container (the lock is not reentrant).
    pub fn for_each<F: FnMut(&T)>(&self, mut f: F) {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held.
        for item in unsafe { self.data_ref() } {
            f(item);
        }
    }

    /// Check-then-act without interleaved mutation
    ///
    /// Evaluates `pred` over the whole sequence and, only if it returns true,
    /// applies `action`, all inside one exclusive section. No other mutation
    /// can interleave between the check and the action. Returns whether the
    /// action ran.
    pub fn conditional_action<P, A>(&self, pred: P, action: A) -> bool
    where
        P: FnOnce(&[T]) -> bool,
        A: FnOnce(&mut Vec<T>),
    {
        let _g = ExclusiveGuard::new(&self.lock);
        // SAFETY: exclusive guard held.
        let data = unsafe { self.data_mut() };
        if pred(data.as_slice()) {
            action(data);
            true
        } else {
            false
        }
    }

    /// Exchange the contents of two vectors atomically
    ///
    /// Both instance locks are taken exclusively, in address order, so two
    /// call sites swapping the same pair concurrently cannot deadlock.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        let (first, second) = if (self as *const Self) < (other as *const Self) {
            (self, other)
        } else {
            (other, self)
        };
        let _g1 = ExclusiveGuard::new(&first.lock);
        let _g2 = ExclusiveGuard::new(&second.lock);
        // SAFETY: both exclusive guards held.
        unsafe { std::mem::swap(self.data_mut(), other.data_mut()) }
    }
}

impl<T: Clone, L: RawSharedLock> ConcurrentVec<T, L> {
    /// Copy of the element at `index`
    ///
    /// Fails with `OutOfBounds` when `index >= len` at the instant the shared
    /// lock is held.
    pub fn get(&self, index: usize) -> Result<T> {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held.
        let data = unsafe { self.data_ref() };
        check_bounds(index, data.len())?;
        Ok(data[index].clone())
    }

    /// Copy of the element at `index`, without blocking
    ///
    /// Fails with `WouldBlock` when the shared lock cannot be taken
    /// immediately, or `OutOfBounds` like [`get`](Self::get).
    pub fn try_get(&self, index: usize) -> Result<T> {
        let _g = SharedGuard::try_new(&self.lock)
            .ok_or_else(|| StripeVecError::would_block("concurrent vec shared lock"))?;
        // SAFETY: shared guard held.
        let data = unsafe { self.data_ref() };
        check_bounds(index, data.len())?;
        Ok(data[index].clone())
    }

    /// Copy of the element at `index` with no bounds check
    ///
    /// The performance-oriented unchecked read: still a shared critical
    /// section, but the index is not validated.
    ///
    /// # Safety
    ///
    /// `index` must be less than the length at the instant the shared lock is
    /// held; callers opting into this accept that an out-of-range index is
    /// undefined behavior.
    pub unsafe fn get_unchecked(&self, index: usize) -> T {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held; index validity is the caller's contract.
        unsafe { self.data_ref().get_unchecked(index) }.clone()
    }

    /// Independent copy of the full sequence
    ///
    /// Taken under one shared section; safe to use after the lock is
    /// released.
    pub fn snapshot(&self) -> Vec<T> {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held.
        unsafe { self.data_ref() }.clone()
    }
}

impl<T: PartialEq, L: RawSharedLock> ConcurrentVec<T, L> {
    /// Index of the first element equal to `value`, scanning in index order
    pub fn find(&self, value: &T) -> Option<usize> {
        self.find_if(|item| item == value)
    }
}

impl<T, L: RawSharedLock> Default for ConcurrentVec<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L: RawSharedLock> FromIterator<T> for ConcurrentVec<T, L> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            lock: L::default(),
            data: UnsafeCell::new(iter.into_iter().collect()),
        }
    }
}

impl<T: fmt::Debug, L: RawSharedLock> fmt::Debug for ConcurrentVec<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _g = SharedGuard::new(&self.lock);
        // SAFETY: shared guard held.
        f.debug_list().entries(unsafe { self.data_ref() }.iter()).finish()
    }
}

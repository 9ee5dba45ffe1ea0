//! Striping adapter over an array of independent locks
//!
//! [`StripedLock`] owns N independent underlying locks and exposes them by
//! stripe index. It deliberately does NOT implement
//! [`RawSharedLock`](super::RawSharedLock): the adapter is not a lock, and
//! treating it as one global lock would defeat the striping. Callers that
//! need every stripe (e.g. a full clear) acquire them one by one in ascending
//! stripe order.

use crate::error::{Result, StripeVecError};
use crate::sync::RawSharedLock;
use crossbeam_utils::CachePadded;

/// Default stripe count: two stripes per logical CPU, at least one
pub fn default_stripe_count() -> usize {
    (num_cpus::get() * 2).max(1)
}

/// An array of independent locks indexed by stripe
///
/// Each stripe lives on its own cache line (`CachePadded`) so contended
/// acquisitions on neighboring stripes do not false-share.
///
/// # Examples
///
/// ```rust
/// use stripevec::sync::{SharedGuard, SpinRwLock, StripedLock};
///
/// let lock: StripedLock<SpinRwLock> = StripedLock::new(8).unwrap();
/// assert_eq!(lock.stripe_count(), 8);
/// let _g = SharedGuard::new(lock.stripe(13)); // 13 % 8 == stripe 5
/// ```
pub struct StripedLock<L> {
    stripes: Box<[CachePadded<L>]>,
}

impl<L: RawSharedLock> StripedLock<L> {
    /// Create a striped lock with `stripe_count` independent stripes
    ///
    /// Returns a `Configuration` error when `stripe_count` is zero. The count
    /// is fixed for the lifetime of the adapter.
    pub fn new(stripe_count: usize) -> Result<Self> {
        if stripe_count == 0 {
            return Err(StripeVecError::configuration("stripe count must be > 0"));
        }
        Ok(Self {
            stripes: (0..stripe_count)
                .map(|_| CachePadded::new(L::default()))
                .collect(),
        })
    }

    /// Create a striped lock sized for the current machine
    ///
    /// Uses [`default_stripe_count`], which is always at least one.
    pub fn with_default_stripes() -> Self {
        Self {
            stripes: (0..default_stripe_count())
                .map(|_| CachePadded::new(L::default()))
                .collect(),
        }
    }

    /// Number of stripes, fixed at construction
    #[inline]
    pub fn stripe_count(&self) -> usize {
        self.stripes.len()
    }

    /// Get the `(i % stripe_count)`-th underlying lock
    #[inline]
    pub fn stripe(&self, i: usize) -> &L {
        &*self.stripes[i % self.stripes.len()]
    }
}

impl<L: RawSharedLock> std::fmt::Debug for StripedLock<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripedLock")
            .field("stripe_count", &self.stripe_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{ExclusiveGuard, OsRwLock, SharedGuard, SpinRwLock};

    #[test]
    fn test_zero_stripes_rejected() {
        let result = StripedLock::<SpinRwLock>::new(0);
        assert!(matches!(
            result,
            Err(StripeVecError::Configuration { .. })
        ));
    }

    #[test]
    fn test_stripe_index_wraps() {
        let lock: StripedLock<SpinRwLock> = StripedLock::new(4).unwrap();
        assert_eq!(lock.stripe_count(), 4);

        // stripe(i) and stripe(i + n) are the same lock: holding one
        // exclusively makes the other unavailable.
        let _g = ExclusiveGuard::new(lock.stripe(1));
        assert!(ExclusiveGuard::try_new(lock.stripe(5)).is_none());
        assert!(ExclusiveGuard::try_new(lock.stripe(2)).is_some());
    }

    #[test]
    fn test_stripes_are_independent() {
        let lock: StripedLock<OsRwLock> = StripedLock::new(2).unwrap();
        let _w = ExclusiveGuard::new(lock.stripe(0));
        // The other stripe is unaffected by the exclusive holder.
        let _r = SharedGuard::new(lock.stripe(1));
        assert!(ExclusiveGuard::try_new(lock.stripe(0)).is_none());
        assert!(SharedGuard::try_new(lock.stripe(1)).is_some());
    }

    #[test]
    fn test_default_stripes_nonzero() {
        let lock: StripedLock<SpinRwLock> = StripedLock::with_default_stripes();
        assert!(lock.stripe_count() >= 1);
    }
}

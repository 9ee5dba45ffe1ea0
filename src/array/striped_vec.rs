//! StripedVec: a logical sequence partitioned across independently-locked
//! segments
//!
//! Writes spread across N segments to cut contention; reads reconstruct a
//! single logical ordering from the physically sharded storage. The logical
//! array is the concatenation of segments in stripe-index order, which is NOT
//! insertion-time order across threads: two pushes issued at the same time by
//! different threads may land in different segments in either relative order.
//!
//! ## Consistency model
//!
//! There is no cross-segment linearization point. A read that observes all
//! segments (`get`, `len`) composes independently-taken atomic snapshots and
//! may reflect a state that never existed as a single global instant. This is
//! a deliberate throughput-over-strict-consistency trade: fixing it with a
//! global lock would defeat the striping. Within one segment, operations are
//! linearizable. Index validity is defined relative to the logical snapshot
//! taken at the start of the call; callers requiring strict consistency must
//! externally synchronize (quiescent or append-only workloads keep `get`
//! consistent).

use crate::error::{Result, StripeVecError};
use crate::sync::{ExclusiveGuard, OsRwLock, RawSharedLock, SharedGuard, StripedLock};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// One independently-locked partition of the backing storage
///
/// Mutated only by a thread holding the matching stripe's exclusive lock,
/// read only under that stripe's shared or exclusive lock.
struct Segment<T>(UnsafeCell<Vec<T>>);

// SAFETY: the segment's Vec is only touched under the matching stripe lock;
// Send/Sync forward the element's requirements for cross-thread access.
unsafe impl<T: Send> Send for Segment<T> {}
unsafe impl<T: Send + Sync> Sync for Segment<T> {}

/// Growable sequence partitioned into independently-locked segments
///
/// Offers the same external contract as
/// [`ConcurrentVec`](crate::ConcurrentVec) for append-heavy workloads, with
/// higher write throughput under many threads at the cost of the weaker
/// cross-segment consistency documented at the module level, and no total
/// insertion-order guarantee. Segments are created once at construction with
/// a fixed stripe count; they grow by append and shrink only via
/// [`clear`](Self::clear).
///
/// # Examples
///
/// ```rust
/// use stripevec::StripedVec;
///
/// let vec: StripedVec<u64> = StripedVec::with_stripes(4).unwrap();
/// for i in 0..16 {
///     vec.push(i);
/// }
/// assert_eq!(vec.len(), 16);
/// assert!(vec.get(15).is_ok());
/// assert!(vec.get(16).is_err());
/// ```
pub struct StripedVec<T, L: RawSharedLock = OsRwLock> {
    lock: StripedLock<L>,
    segments: Box<[Segment<T>]>,
    /// Per-segment element counts, each updated by the single writer holding
    /// that segment's exclusive lock; advisory data, hence Relaxed.
    segment_lens: Box<[CachePadded<AtomicUsize>]>,
    /// Round-robin segment selection for writes. Owned by the instance, so
    /// independent arrays never share selection state.
    next_stripe: AtomicUsize,
    /// Cached aggregate of `segment_lens`, valid while `len_dirty` is false
    cached_len: AtomicUsize,
    len_dirty: AtomicBool,
}

impl<T, L: RawSharedLock> StripedVec<T, L> {
    /// Create a striped vector sized for the current machine
    ///
    /// Stripe count defaults to
    /// [`default_stripe_count`](crate::sync::default_stripe_count).
    pub fn new() -> Self {
        Self::build(StripedLock::with_default_stripes())
    }

    /// Create a striped vector with `stripe_count` segments
    ///
    /// Returns a `Configuration` error when `stripe_count` is zero. The count
    /// is fixed for the lifetime of the array.
    pub fn with_stripes(stripe_count: usize) -> Result<Self> {
        Ok(Self::build(StripedLock::new(stripe_count)?))
    }

    fn build(lock: StripedLock<L>) -> Self {
        let n = lock.stripe_count();
        Self {
            lock,
            segments: (0..n).map(|_| Segment(UnsafeCell::new(Vec::new()))).collect(),
            segment_lens: (0..n).map(|_| CachePadded::new(AtomicUsize::new(0))).collect(),
            next_stripe: AtomicUsize::new(0),
            cached_len: AtomicUsize::new(0),
            len_dirty: AtomicBool::new(false),
        }
    }

    /// Number of segments, fixed at construction
    #[inline]
    pub fn stripe_count(&self) -> usize {
        self.lock.stripe_count()
    }

    /// Pick the target segment for the next write
    ///
    /// Best-effort load balancing, not a correctness requirement: a
    /// monotonically increasing instance counter, taken Relaxed, gives an
    /// approximately uniform spread under many concurrent writers with no
    /// ordering promise relative to logical index.
    #[inline]
    fn next_segment(&self) -> usize {
        self.next_stripe.fetch_add(1, Ordering::Relaxed) % self.stripe_count()
    }

    /// Append an element to the next round-robin segment
    pub fn push(&self, value: T) {
        let idx = self.next_segment();
        let _g = ExclusiveGuard::new(self.lock.stripe(idx));
        // SAFETY: stripe `idx` exclusive guard held.
        unsafe { &mut *self.segments[idx].0.get() }.push(value);
        self.segment_lens[idx].fetch_add(1, Ordering::Relaxed);
        self.len_dirty.store(true, Ordering::Relaxed);
    }

    /// Append every element of `iter` into one segment as one atomic batch
    ///
    /// The batch lands contiguously in a single segment under a single
    /// exclusive acquisition, amortizing lock overhead versus repeated
    /// [`push`](Self::push). The iterator runs under the segment lock; it
    /// must not touch this container.
    pub fn extend<I: IntoIterator<Item = T>>(&self, iter: I) {
        let idx = self.next_segment();
        let _g = ExclusiveGuard::new(self.lock.stripe(idx));
        // SAFETY: stripe `idx` exclusive guard held.
        let segment = unsafe { &mut *self.segments[idx].0.get() };
        let before = segment.len();
        segment.extend(iter);
        let added = segment.len() - before;
        self.segment_lens[idx].fetch_add(added, Ordering::Relaxed);
        self.len_dirty.store(true, Ordering::Relaxed);
    }

    /// Total element count across all segments
    ///
    /// Fast path: a cached aggregate, valid while no mutation has completed
    /// since it was computed. Slow path: re-sums every segment's count and
    /// refreshes the cache. Eventually consistent under concurrent writers;
    /// exact when the array is quiescent.
    pub fn len(&self) -> usize {
        if !self.len_dirty.load(Ordering::Relaxed) {
            return self.cached_len.load(Ordering::Relaxed);
        }
        let total = self.sum_segment_lens();
        self.cached_len.store(total, Ordering::Relaxed);
        self.len_dirty.store(false, Ordering::Relaxed);
        total
    }

    /// Whether no segment holds any element
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn sum_segment_lens(&self) -> usize {
        self.segment_lens
            .iter()
            .map(|len| len.load(Ordering::Relaxed))
            .sum()
    }

    /// Snapshot each segment's count individually
    ///
    /// A non-atomic multi-read: the snapshot may be torn relative to a
    /// concurrent writer. Everything downstream of it treats the result as
    /// the logical state of the call.
    fn snapshot_segment_lens(&self) -> Vec<usize> {
        self.segment_lens
            .iter()
            .map(|len| len.load(Ordering::Relaxed))
            .collect()
    }

    /// Empty every segment
    ///
    /// Acquires each segment's exclusive lock in ascending stripe order (the
    /// fixed order that keeps multi-stripe acquisition deadlock-free), clears
    /// the segment, zeroes its count, and invalidates the cached total.
    pub fn clear(&self) {
        for i in 0..self.stripe_count() {
            let _g = ExclusiveGuard::new(self.lock.stripe(i));
            // SAFETY: stripe `i` exclusive guard held.
            unsafe { &mut *self.segments[i].0.get() }.clear();
            self.segment_lens[i].store(0, Ordering::Relaxed);
        }
        self.len_dirty.store(true, Ordering::Relaxed);
    }
}

impl<T: Clone, L: RawSharedLock> StripedVec<T, L> {
    /// Copy of the element at global logical `index`
    ///
    /// Resolution: snapshot every segment's count, sum for the total, fail
    /// with `OutOfBounds` when `index >= total`, binary-search the prefix
    /// sums for the owning `(segment, offset)`, then read under that
    /// segment's shared lock. Index validity is defined relative to the
    /// snapshot taken at the start of the call; under concurrent mutation the
    /// result is only guaranteed consistent against a quiescent array or
    /// append-only writers.
    pub fn get(&self, index: usize) -> Result<T> {
        let mut prefix = self.snapshot_segment_lens();
        let mut acc = 0usize;
        for len in prefix.iter_mut() {
            acc += *len;
            *len = acc;
        }
        let total = acc;
        if index >= total {
            return Err(StripeVecError::out_of_bounds(index, total));
        }

        // First segment whose prefix sum exceeds `index` owns it.
        let segment = prefix.partition_point(|&p| p <= index);
        let offset = index - if segment == 0 { 0 } else { prefix[segment - 1] };

        let _g = SharedGuard::new(self.lock.stripe(segment));
        // SAFETY: stripe `segment` shared guard held.
        let data = unsafe { &*self.segments[segment].0.get() };
        // A concurrent clear between the snapshot and this lock can shrink
        // the segment; the stale snapshot then reports out of bounds.
        data.get(offset)
            .cloned()
            .ok_or_else(|| StripeVecError::out_of_bounds(index, total))
    }
}

impl<T: Send + Sync, L: RawSharedLock> StripedVec<T, L> {
    /// Apply `f` to every element, one parallel worker per segment
    ///
    /// Each worker takes its own segment's shared lock independently and
    /// walks that segment. Workers run with no ordering relationship to each
    /// other or to global logical index: this is a concurrency-parallel
    /// traversal that trades global ordering for parallel throughput, not an
    /// ordered iteration. `f` must not re-enter this container.
    pub fn for_each_concurrent<F>(&self, f: F)
    where
        F: Fn(&T) + Sync,
    {
        std::thread::scope(|scope| {
            for (i, segment) in self.segments.iter().enumerate() {
                let f = &f;
                let lock = &self.lock;
                scope.spawn(move || {
                    let _g = SharedGuard::new(lock.stripe(i));
                    // SAFETY: stripe `i` shared guard held.
                    for item in unsafe { &*segment.0.get() } {
                        f(item);
                    }
                });
            }
        });
    }
}

impl<T, L: RawSharedLock> Default for StripedVec<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L: RawSharedLock> fmt::Debug for StripedVec<T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripedVec")
            .field("stripe_count", &self.stripe_count())
            .field("len", &self.sum_segment_lens())
            .finish()
    }
}

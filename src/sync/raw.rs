//! Raw lock strategies and RAII guards
//!
//! A lock strategy is a minimal exclusive/shared capability set behind the
//! [`RawSharedLock`] trait. The containers in this crate are generic over the
//! strategy, so the same container code runs unsynchronized ([`NullLock`]),
//! on the platform read/write lock ([`OsRwLock`]), or on a spinning lock
//! optimized for short critical sections ([`SpinRwLock`]).

use parking_lot::lock_api::RawRwLock as _;
use std::sync::atomic::{AtomicU32, Ordering};

/// Minimal exclusive/shared locking capability
///
/// Every implementation provides blocking exclusive and shared acquisition,
/// non-blocking `try_` variants, and the matching releases. Acquire/release
/// pairs must be properly nested: a thread must not re-acquire a lock it
/// already holds on the same instance within one logical operation.
///
/// # Safety
///
/// Implementors vouch for the exclusion semantics the containers rely on: an
/// exclusive holder excludes all other holders, and shared holders exclude
/// exclusive ones, with acquire/release ordering so writes made under the
/// exclusive lock are visible to later holders. [`NullLock`] deliberately
/// provides no exclusion and shifts that obligation to the caller; see its
/// documentation.
pub unsafe trait RawSharedLock: Default + Send + Sync {
    /// Acquire the lock exclusively, blocking until available
    fn lock_exclusive(&self);

    /// Try to acquire the lock exclusively without blocking
    fn try_lock_exclusive(&self) -> bool;

    /// Release an exclusive acquisition
    ///
    /// # Safety
    ///
    /// The calling thread must hold an exclusive acquisition on this lock.
    unsafe fn unlock_exclusive(&self);

    /// Acquire the lock shared, blocking until available
    fn lock_shared(&self);

    /// Try to acquire the lock shared without blocking
    fn try_lock_shared(&self) -> bool;

    /// Release a shared acquisition
    ///
    /// # Safety
    ///
    /// The calling thread must hold a shared acquisition on this lock.
    unsafe fn unlock_shared(&self);
}

/// No-op lock strategy for single-threaded use
///
/// Every acquisition succeeds immediately and nothing is excluded. A
/// container built on `NullLock` performs zero synchronization: it is valid
/// only when the caller independently guarantees single-writer / no
/// concurrent-mutation discipline. Violating that discipline while sharing
/// the container across threads is undefined behavior, exactly as it would be
/// for an unsynchronized `Vec`.
#[derive(Debug, Default)]
pub struct NullLock;

// SAFETY: provides no exclusion by design; the caller assumes the exclusion
// obligation (see type-level docs).
unsafe impl RawSharedLock for NullLock {
    #[inline]
    fn lock_exclusive(&self) {}

    #[inline]
    fn try_lock_exclusive(&self) -> bool {
        true
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {}

    #[inline]
    fn lock_shared(&self) {}

    #[inline]
    fn try_lock_shared(&self) -> bool {
        true
    }

    #[inline]
    unsafe fn unlock_shared(&self) {}
}

/// Platform read/write lock strategy backed by `parking_lot`
///
/// The default strategy: full blocking correctness with adaptive spinning and
/// OS parking under contention. Prefer this unless profiling shows the
/// critical sections are short enough for [`SpinRwLock`] to pay off.
pub struct OsRwLock {
    raw: parking_lot::RawRwLock,
}

impl Default for OsRwLock {
    fn default() -> Self {
        Self {
            raw: <parking_lot::RawRwLock as parking_lot::lock_api::RawRwLock>::INIT,
        }
    }
}

impl std::fmt::Debug for OsRwLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsRwLock").finish_non_exhaustive()
    }
}

// SAFETY: defers exclusion entirely to parking_lot's raw rwlock.
unsafe impl RawSharedLock for OsRwLock {
    #[inline]
    fn lock_exclusive(&self) {
        self.raw.lock_exclusive();
    }

    #[inline]
    fn try_lock_exclusive(&self) -> bool {
        self.raw.try_lock_exclusive()
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {
        // SAFETY: caller holds an exclusive acquisition per the trait contract.
        unsafe { self.raw.unlock_exclusive() }
    }

    #[inline]
    fn lock_shared(&self) {
        self.raw.lock_shared();
    }

    #[inline]
    fn try_lock_shared(&self) -> bool {
        self.raw.try_lock_shared()
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        // SAFETY: caller holds a shared acquisition per the trait contract.
        unsafe { self.raw.unlock_shared() }
    }
}

/// Spinning exclusive/shared lock for short critical sections
///
/// One word of state: the high bit marks an exclusive holder, the remaining
/// bits count shared holders. Waiters spin with a bounded number of
/// `spin_loop` hints and then yield to the scheduler, so a waiter never
/// busy-waits indefinitely on a single core. Writer preference is not
/// provided; starvation under pathological scheduling is possible but bounded
/// by the periodic yielding.
///
/// Lower latency than [`OsRwLock`] when hold times are tens of nanoseconds,
/// at the cost of burning CPU while waiting.
pub struct SpinRwLock {
    state: AtomicU32,
}

const WRITER: u32 = 1 << 31;

/// Spins between scheduler yields while waiting for a lock transition
const SPINS_BEFORE_YIELD: u32 = 64;

impl Default for SpinRwLock {
    fn default() -> Self {
        Self {
            state: AtomicU32::new(0),
        }
    }
}

impl std::fmt::Debug for SpinRwLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpinRwLock")
            .field("state", &self.state.load(Ordering::Relaxed))
            .finish()
    }
}

impl SpinRwLock {
    #[inline]
    fn spin_or_yield(&self, spins: &mut u32) {
        *spins += 1;
        if *spins < SPINS_BEFORE_YIELD {
            std::hint::spin_loop();
        } else {
            std::thread::yield_now();
            *spins = 0;
        }
    }
}

// SAFETY: the writer bit excludes everyone, the reader count excludes
// writers; all successful acquisitions use Acquire and releases use Release.
unsafe impl RawSharedLock for SpinRwLock {
    fn lock_exclusive(&self) {
        let mut spins = 0u32;
        loop {
            if self
                .state
                .compare_exchange_weak(0, WRITER, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
            self.spin_or_yield(&mut spins);
        }
    }

    #[inline]
    fn try_lock_exclusive(&self) -> bool {
        self.state
            .compare_exchange(0, WRITER, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {
        self.state.store(0, Ordering::Release);
    }

    fn lock_shared(&self) {
        let mut spins = 0u32;
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            if current & WRITER != 0 {
                self.spin_or_yield(&mut spins);
                current = self.state.load(Ordering::Relaxed);
                continue;
            }
            match self.state.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => current = actual,
            }
        }
    }

    #[inline]
    fn try_lock_shared(&self) -> bool {
        let current = self.state.load(Ordering::Relaxed);
        current & WRITER == 0
            && self
                .state
                .compare_exchange(current, current + 1, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        self.state.fetch_sub(1, Ordering::Release);
    }
}

/// RAII exclusive acquisition of a [`RawSharedLock`]
///
/// Acquired on construction, released on drop. The containers never call the
/// raw unlock methods directly.
pub struct ExclusiveGuard<'a, L: RawSharedLock> {
    lock: &'a L,
}

impl<'a, L: RawSharedLock> ExclusiveGuard<'a, L> {
    /// Acquire `lock` exclusively, blocking until available
    #[inline]
    pub fn new(lock: &'a L) -> Self {
        lock.lock_exclusive();
        Self { lock }
    }

    /// Try to acquire `lock` exclusively; `None` if it would block
    #[inline]
    pub fn try_new(lock: &'a L) -> Option<Self> {
        if lock.try_lock_exclusive() {
            Some(Self { lock })
        } else {
            None
        }
    }
}

impl<L: RawSharedLock> Drop for ExclusiveGuard<'_, L> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: this guard holds the exclusive acquisition it is releasing.
        unsafe { self.lock.unlock_exclusive() }
    }
}

/// RAII shared acquisition of a [`RawSharedLock`]
pub struct SharedGuard<'a, L: RawSharedLock> {
    lock: &'a L,
}

impl<'a, L: RawSharedLock> SharedGuard<'a, L> {
    /// Acquire `lock` shared, blocking until available
    #[inline]
    pub fn new(lock: &'a L) -> Self {
        lock.lock_shared();
        Self { lock }
    }

    /// Try to acquire `lock` shared; `None` if it would block
    #[inline]
    pub fn try_new(lock: &'a L) -> Option<Self> {
        if lock.try_lock_shared() {
            Some(Self { lock })
        } else {
            None
        }
    }
}

impl<L: RawSharedLock> Drop for SharedGuard<'_, L> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: this guard holds the shared acquisition it is releasing.
        unsafe { self.lock.unlock_shared() }
    }
}

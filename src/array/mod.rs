//! Concurrently-accessible growable arrays
//!
//! Two container families over the same logical interface:
//!
//! - **[`ConcurrentVec<T, L>`]** - one sequence guarded end-to-end by a
//!   single lock-strategy instance; every operation is one critical section
//! - **[`StripedVec<T, L>`]** - the sequence partitioned across
//!   independently-locked segments; higher write throughput under many
//!   threads, weaker cross-segment consistency
//!
//! Both are generic over the [`RawSharedLock`](crate::sync::RawSharedLock)
//! strategy, defaulting to the platform rwlock.

mod concurrent_vec;
mod striped_vec;

pub use concurrent_vec::ConcurrentVec;
pub use striped_vec::StripedVec;

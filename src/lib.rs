//! # StripeVec: Concurrent Growable Arrays with Pluggable Locking
//!
//! This crate provides generic, growable, concurrently-accessible array types
//! whose locking strategy is a type parameter, letting callers trade
//! contention, ordering, and safety guarantees without changing the
//! container's logical interface.
//!
//! ## Key Features
//!
//! - **Pluggable Lock Strategies**: no-op ([`NullLock`]), platform rwlock
//!   ([`OsRwLock`]), and spinning ([`SpinRwLock`]) implementations of one
//!   exclusive/shared capability set
//! - **Single-Lock Arrays**: [`ConcurrentVec`] guards one sequence end-to-end
//!   with one lock; every operation is a single linearizable critical section
//! - **Striped Arrays**: [`StripedVec`] partitions storage across
//!   independently-locked, cache-padded segments for write throughput,
//!   resolving global logical indices from per-segment atomic counts
//! - **Non-Blocking Variants**: `try_` operations report a would-block
//!   outcome instead of waiting
//! - **Deadlock-Free Multi-Lock Operations**: address-ordered `swap`,
//!   ascending-stripe `clear`
//!
//! ## Choosing a strategy
//!
//! | Strategy | Trade |
//! |----------|-------|
//! | [`NullLock`] | No synchronization; caller guarantees single-writer / no concurrent mutation |
//! | [`OsRwLock`] | Full blocking correctness (default) |
//! | [`SpinRwLock`] | Lower latency for short critical sections, burns CPU while waiting |
//! | [`StripedVec`] | Higher write throughput under many threads, weaker cross-segment consistency, no total insertion-order guarantee |
//!
//! ## Quick Start
//!
//! ```rust
//! use stripevec::{ConcurrentVec, StripedVec, SpinRwLock};
//!
//! // Single-lock array on the default platform rwlock
//! let vec: ConcurrentVec<u64> = ConcurrentVec::new();
//! vec.push(42);
//! vec.extend([43, 44]);
//! assert_eq!(vec.get(2).unwrap(), 44);
//! assert_eq!(vec.find(&43), Some(1));
//!
//! // Same interface on a spinning lock
//! let spinning: ConcurrentVec<u64, SpinRwLock> = ConcurrentVec::new();
//! spinning.push(1);
//!
//! // Striped array: four independently-locked segments
//! let striped: StripedVec<u64> = StripedVec::with_stripes(4).unwrap();
//! for i in 0..100 {
//!     striped.push(i);
//! }
//! assert_eq!(striped.len(), 100);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array;
pub mod error;
pub mod sync;

pub use array::{ConcurrentVec, StripedVec};
pub use error::{Result, StripeVecError};
pub use sync::{NullLock, OsRwLock, RawSharedLock, SpinRwLock, StripedLock};

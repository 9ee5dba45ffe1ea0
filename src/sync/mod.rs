//! Lock strategies and the striping adapter
//!
//! This module provides the pluggable locking layer the containers are built
//! on:
//!
//! - **[`RawSharedLock`]** - the exclusive/shared capability set every
//!   strategy implements
//! - **[`NullLock`]** - no-op strategy for single-threaded use
//! - **[`OsRwLock`]** - platform read/write lock backed by `parking_lot`
//! - **[`SpinRwLock`]** - spinning lock for short critical sections
//! - **[`StripedLock`]** - N independent stripes, addressable by index
//! - **[`ExclusiveGuard`] / [`SharedGuard`]** - RAII acquisitions

mod raw;
mod striped;

pub use raw::{ExclusiveGuard, NullLock, OsRwLock, RawSharedLock, SharedGuard, SpinRwLock};
pub use striped::{default_stripe_count, StripedLock};

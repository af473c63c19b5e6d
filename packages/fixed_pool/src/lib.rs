//! A fixed-capacity object pool that recycles preconstructed instances through
//! move-only RAII lease handles.
//!
//! This crate provides [`FixedPool`], an arena of slots that each hold a live
//! instance of a single type for the pool's whole lifetime. Acquiring replaces
//! a free slot's value in place and hands out a [`Pooled<T>`] handle; dropping
//! the handle returns the slot for reuse. The point is to pay the allocator
//! once, at [`resize()`](FixedPool::resize), instead of on every use of a
//! short-lived, frequently recreated object.
//!
//! # Key features
//!
//! - **Fixed capacity**: slot storage is built only by an explicit `resize`;
//!   an exhausted pool fails fast rather than growing or blocking
//! - **Placement reconstruction**: acquiring drops the slot's current value
//!   and moves the new one into the same storage - no per-acquire allocation
//! - **Move-only handles**: [`Pooled<T>`] cannot be copied or cloned, so no
//!   two handles ever reference one slot, and each slot is returned exactly
//!   once
//! - **LIFO reuse**: the most recently released slot is handed out first,
//!   favoring storage locality
//! - **Strong exception guarantee on resize**: the replacement arena is built
//!   completely before the pool adopts it; on any failure the pool's
//!   observable state is untouched
//! - **Failure-safe acquire**: if a value constructor fails or panics, the
//!   claimed slot index goes back on the free stack before the error
//!   propagates
//! - **Stable slot addresses**: handles point directly into the arena, which
//!   never relocates while leases are outstanding (resize is rejected with
//!   [`Error::ItemsInUse`] instead)
//!
//! # Concurrency
//!
//! A pool is single-threaded: [`FixedPool`] and [`Pooled<T>`] are neither
//! [`Send`] nor [`Sync`], and no operation blocks or suspends. Wrap an owned
//! pool in your own synchronization if you need cross-thread sharing.
//!
//! # Example
//!
//! ```rust
//! use fixed_pool::{Error, FixedPool};
//!
//! let pool = FixedPool::<String>::new();
//! pool.resize(2).unwrap();
//!
//! let a = pool.acquire("first".to_string()).unwrap();
//! let b = pool.acquire("second".to_string()).unwrap();
//!
//! // Capacity is fixed: a third acquire fails instead of allocating.
//! assert!(matches!(
//!     pool.acquire("third".to_string()),
//!     Err(Error::Exhausted { capacity: 2 })
//! ));
//!
//! // Returning a lease makes its slot available again, most recent first.
//! drop(b);
//! let reused = pool.acquire("fourth".to_string()).unwrap();
//! assert_eq!(&*reused, "fourth");
//!
//! drop(a);
//! drop(reused);
//! assert!(pool.is_full());
//! ```
//!
//! # Fallible construction
//!
//! ```rust
//! use fixed_pool::{FixedPool, TryAcquireError};
//!
//! let pool = FixedPool::<u32>::new();
//! pool.resize(1).unwrap();
//!
//! let ok = pool.try_acquire_with(|| "7".parse::<u32>()).unwrap();
//! assert_eq!(*ok, 7);
//! drop(ok);
//!
//! let err = pool.try_acquire_with(|| "oops".parse::<u32>());
//! assert!(matches!(err, Err(TryAcquireError::Construct(_))));
//!
//! // The failed attempt returned its slot to the pool.
//! assert_eq!(pool.available(), 1);
//! ```

mod arena;
mod error;
mod pool;
mod pooled;

pub(crate) use arena::*;
pub use error::{Error, TryAcquireError};
pub(crate) use error::Result;
pub use pool::FixedPool;
pub use pooled::Pooled;

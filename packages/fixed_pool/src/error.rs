use thiserror::Error;

/// Errors that can occur when operating a [`FixedPool`][crate::FixedPool].
///
/// Every error is reported synchronously to the immediate caller. The pool never
/// retries internally - if you want retry behavior (e.g. growing the pool and
/// acquiring again), implement it at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An acquire operation was attempted while no free slot exists.
    ///
    /// The pool does not block and does not grow on demand. Call
    /// [`resize()`][crate::FixedPool::resize] to change capacity, or release an
    /// outstanding [`Pooled`][crate::Pooled] handle to free up a slot.
    #[error("all {capacity} slots of the pool are already in use")]
    Exhausted {
        /// Total number of slots in the pool at the time of the call.
        capacity: usize,
    },

    /// The pool could not obtain storage for the requested capacity.
    ///
    /// The pool's observable state is left exactly as it was before the call.
    #[error("could not allocate storage for a pool of {requested} slots")]
    AllocationFailed {
        /// The capacity that was requested.
        requested: usize,
    },

    /// A resize was attempted while acquired items are still outstanding.
    ///
    /// Rebuilding the arena relocates slot storage, which would invalidate the
    /// slot references held by live [`Pooled`][crate::Pooled] handles. Return
    /// every handle to the pool before resizing.
    #[error("cannot resize the pool while {in_use} acquired items remain outstanding")]
    ItemsInUse {
        /// Number of slots owned by live handles at the time of the call.
        in_use: usize,
    },
}

/// Errors returned by [`try_acquire_with()`][crate::FixedPool::try_acquire_with],
/// which combines slot bookkeeping failures with the caller's own value
/// construction failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TryAcquireError<E> {
    /// No free slot exists; the constructor closure was never invoked.
    #[error("all {capacity} slots of the pool are already in use")]
    Exhausted {
        /// Total number of slots in the pool at the time of the call.
        capacity: usize,
    },

    /// The constructor closure returned an error.
    ///
    /// The claimed slot index was returned to the free stack before this error
    /// was surfaced, so the pool's bookkeeping is unaffected and the slot's
    /// previous value remains in place.
    #[error("the value constructor failed")]
    Construct(#[source] E),
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn exhausted_is_error() {
        let error = Error::Exhausted { capacity: 4 };

        // Verify it is a valid Error that can be used in Result context.
        let result: Result<()> = Err(error);
        assert!(result.is_err());
    }

    #[test]
    fn messages_name_the_counts() {
        assert_eq!(
            Error::Exhausted { capacity: 3 }.to_string(),
            "all 3 slots of the pool are already in use"
        );
        assert_eq!(
            Error::AllocationFailed { requested: 9 }.to_string(),
            "could not allocate storage for a pool of 9 slots"
        );
        assert_eq!(
            Error::ItemsInUse { in_use: 2 }.to_string(),
            "cannot resize the pool while 2 acquired items remain outstanding"
        );
    }

    #[test]
    fn construct_error_exposes_source() {
        use std::error::Error as _;

        let inner = std::io::Error::other("nope");
        let error = TryAcquireError::Construct(inner);

        assert!(error.source().is_some());
        assert_eq!(error.to_string(), "the value constructor failed");
    }
}

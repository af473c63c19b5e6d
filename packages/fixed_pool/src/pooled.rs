use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use crate::FixedPool;

/// An exclusive lease on one slot of a [`FixedPool`].
///
/// The handle is the only owner of its slot: it cannot be copied or cloned,
/// so no two handles ever reference the same slot. Moving the handle moves
/// the lease with it; the moved-from binding is statically unusable, and
/// assigning a fresh handle over an existing binding drops the old lease
/// (returning its slot) before the new one takes its place.
///
/// When the handle is dropped, its slot index is pushed back onto the pool's
/// free stack - exactly once - and the slot becomes eligible for reuse. The
/// leased value itself stays in the slot untouched until a later acquire
/// replaces it.
///
/// The handle holds a clone of the pool facade, so the pool's storage stays
/// alive even if every user-held [`FixedPool`] value is dropped first.
///
/// # Example
///
/// ```rust
/// use fixed_pool::FixedPool;
///
/// let pool = FixedPool::<String>::new();
/// pool.resize(1).unwrap();
///
/// let mut message = pool.acquire("hello".to_string()).unwrap();
///
/// // Access the value through dereferencing, mutation included.
/// message.push_str(", world");
/// assert_eq!(&*message, "hello, world");
///
/// // Dropping the handle returns the slot.
/// drop(message);
/// assert_eq!(pool.available(), 1);
/// ```
pub struct Pooled<T> {
    /// Points at the leased slot inside the pool's arena. Stays valid because
    /// the `pool` field keeps the arena alive and the arena never relocates
    /// its storage while this index is claimed.
    ptr: NonNull<T>,

    index: usize,

    /// Keeps the shared pool state alive and is the channel through which the
    /// slot is returned on drop.
    pool: FixedPool<T>,
}

impl<T> Pooled<T> {
    /// Creates a handle for a freshly claimed slot.
    ///
    /// This is an internal constructor used by the acquire methods on
    /// [`FixedPool`]; the caller must have exclusive claim over `index`.
    #[must_use]
    pub(crate) fn new(ptr: NonNull<T>, index: usize, pool: FixedPool<T>) -> Self {
        Self { ptr, index, pool }
    }

    /// The position of the leased slot within the pool.
    ///
    /// Indices are stable for the lifetime of the lease and are reused by the
    /// pool after the handle is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<u32>::new();
    /// pool.resize(2).unwrap();
    ///
    /// let first = pool.acquire(1).unwrap();
    /// let second = pool.acquire(2).unwrap();
    ///
    /// assert_ne!(first.index(), second.index());
    /// ```
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a pointer to the leased value.
    ///
    /// This provides direct access to the value stored in the pool. The caller
    /// must ensure that Rust's aliasing rules are respected when using this
    /// pointer, and must not use it after the handle is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<u64>::new();
    /// pool.resize(1).unwrap();
    ///
    /// let value = pool.acquire(42).unwrap();
    /// let ptr = value.ptr();
    ///
    /// // SAFETY: The pointer is valid and the handle is still alive.
    /// assert_eq!(unsafe { ptr.read() }, 42);
    /// ```
    #[must_use]
    #[inline]
    pub fn ptr(&self) -> NonNull<T> {
        self.ptr
    }
}

impl<T> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: The slot holds a live value for as long as this handle
        // exists, and this handle is the slot's only owner.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: As above; exclusive access follows from holding `&mut self`
        // on the only handle.
        unsafe { self.ptr.as_mut() }
    }
}

impl<T> Drop for Pooled<T> {
    /// Returns the slot to the pool's free stack.
    ///
    /// The leased value is not dropped here; it remains in the slot until a
    /// future acquire replaces it or the pool itself is dropped.
    fn drop(&mut self) {
        self.pool.release(self.index);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Pooled<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pooled")
            .field("index", &self.index)
            .field("value", &**self)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_not_impl_any;

    use super::*;

    assert_not_impl_any!(Pooled<u32>: Send, Sync, Clone, Copy);

    #[test]
    fn deref_reads_and_writes_the_leased_value() {
        let pool = FixedPool::<String>::new();
        pool.resize(1).unwrap();

        let mut handle = pool.acquire("abc".to_string()).unwrap();

        assert_eq!(handle.len(), 3);
        handle.push('d');
        assert_eq!(&*handle, "abcd");
    }

    #[test]
    fn handle_keeps_the_pool_alive() {
        let pool = FixedPool::<u32>::new();
        pool.resize(1).unwrap();

        let handle = pool.acquire(77).unwrap();

        // Dropping the last user-held facade must not free the arena while
        // the lease is still out.
        drop(pool);

        assert_eq!(*handle, 77);
        drop(handle);
    }

    #[test]
    fn moved_handle_still_points_at_its_slot() {
        let pool = FixedPool::<u32>::new();
        pool.resize(1).unwrap();

        let handle = pool.acquire(5).unwrap();
        let ptr_before = handle.ptr();

        let moved = Box::new(handle);

        assert_eq!(moved.ptr(), ptr_before);
        assert_eq!(**moved, 5);
        assert_eq!(pool.in_use(), 1);
    }

    #[test]
    fn debug_names_the_slot_and_value() {
        let pool = FixedPool::<u32>::new();
        pool.resize(1).unwrap();

        let handle = pool.acquire(12).unwrap();
        let rendered = format!("{handle:?}");

        assert!(rendered.contains("index: 0"));
        assert!(rendered.contains("value: 12"));
    }
}

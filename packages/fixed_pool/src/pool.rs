use std::cell::RefCell;
use std::convert::Infallible;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::{Arena, Error, Pooled, Result, TryAcquireError};

/// A fixed-capacity object pool that recycles preconstructed instances of `T`
/// through move-only RAII lease handles.
///
/// The pool owns an arena of `capacity()` slots, each holding a live instance
/// of `T` at all times. [`acquire()`][1] claims a free slot, replaces its value
/// in place and returns a [`Pooled<T>`] handle; dropping the handle returns the
/// slot to the pool for reuse. No allocation happens on the acquire/release
/// path - only [`resize()`][2] touches the allocator.
///
/// Slots are reused in LIFO order: the most recently released slot is handed
/// out first, which favors storage locality and cache reuse.
///
/// This type is a cloneable handle to shared pool state. Clones refer to the
/// same pool, and the pool stays alive as long as any facade clone or any
/// outstanding [`Pooled<T>`] handle exists. Because the shared state sits
/// behind a reference-counted cell, the facade itself may be moved or cloned
/// freely without disturbing the slot storage that handles point into.
///
/// # Single-threaded design
///
/// This type is designed for single-threaded use and is neither [`Send`] nor
/// [`Sync`]. Callers that want to share a pool across threads must supply
/// their own synchronization around an owned pool.
///
/// # Example
///
/// ```rust
/// use fixed_pool::FixedPool;
///
/// let pool = FixedPool::<String>::new();
/// pool.resize(4).unwrap();
///
/// let greeting = pool.acquire("hello".to_string()).unwrap();
/// assert_eq!(&*greeting, "hello");
/// assert_eq!(pool.in_use(), 1);
///
/// drop(greeting);
/// assert_eq!(pool.in_use(), 0);
/// ```
///
/// [1]: Self::acquire
/// [2]: Self::resize
#[derive(Debug)]
pub struct FixedPool<T> {
    /// The shared pool state protected by a `RefCell` for single-threaded
    /// interior mutability.
    inner: Rc<RefCell<PoolCore<T>>>,
}

impl<T> Clone for FixedPool<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// The ground truth of the pool: the arena plus the free-index stack.
///
/// Invariant: the free stack and the set of indices owned by live handles are
/// disjoint, and together cover every index below the arena's capacity.
#[derive(Debug)]
struct PoolCore<T> {
    arena: Arena<T>,

    /// Indices of slots not currently owned by any live handle. Treated
    /// strictly as a stack so that the most recently released slot is the
    /// first to be reused.
    free: Vec<usize>,
}

impl<T> PoolCore<T> {
    /// Pops a free index and hands out a pointer to its slot, or `None` if
    /// every slot is claimed. The caller becomes responsible for eventually
    /// passing the index back to `release()`.
    fn claim(&mut self) -> Option<(NonNull<T>, usize)> {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let index = self.free.pop()?;
        Some((self.arena.slot_ptr(index), index))
    }

    /// Returns a claimed index to the free stack.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds for the current arena.
    fn release(&mut self, index: usize) {
        assert!(
            index < self.arena.capacity(),
            "released index {index} out of bounds for a pool of {} slots",
            self.arena.capacity()
        );
        debug_assert!(
            !self.free.contains(&index),
            "released index {index} was already on the free stack"
        );

        self.free.push(index);
    }

    fn in_use(&self) -> usize {
        self.arena
            .capacity()
            .checked_sub(self.free.len())
            .expect("free stack can never hold more indices than the arena has slots")
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        assert!(
            self.free.len() <= self.arena.capacity(),
            "free stack holds more indices than the arena has slots"
        );

        for &index in &self.free {
            assert!(
                index < self.arena.capacity(),
                "free stack contains out-of-bounds index {index}"
            );
        }
    }
}

impl<T> FixedPool<T> {
    /// Creates a new pool with zero capacity.
    ///
    /// A fresh pool holds no slots, so every acquire fails with
    /// [`Error::Exhausted`] until [`resize()`][Self::resize] is called.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<u32>::new();
    ///
    /// assert_eq!(pool.capacity(), 0);
    /// assert!(pool.acquire(42).is_err());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    #[must_use]
    pub fn new() -> Self {
        assert!(
            size_of::<T>() > 0,
            "FixedPool must have non-zero item size"
        );

        Self {
            inner: Rc::new(RefCell::new(PoolCore {
                arena: Arena::empty(),
                free: Vec::new(),
            })),
        }
    }

    /// Rebuilds the arena to hold exactly `capacity` slots, every one filled
    /// with `T::default()`, and resets the free stack to cover all of them.
    ///
    /// The operation carries the strong exception guarantee: the new arena and
    /// free stack are built completely before the pool adopts them, so if
    /// allocation fails or a `T::default()` call panics partway through, the
    /// pool's observable state is exactly what it was before the call.
    ///
    /// Acquisition after a resize proceeds in index order (`0, 1, 2, …`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemsInUse`] if any acquired item is still outstanding -
    /// rebuilding would pull the storage out from under its handle - and
    /// [`Error::AllocationFailed`] if storage for the requested capacity cannot
    /// be obtained.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<String>::new();
    /// pool.resize(3).unwrap();
    ///
    /// assert_eq!(pool.capacity(), 3);
    /// assert_eq!(pool.available(), 3);
    /// assert_eq!(pool.in_use(), 0);
    ///
    /// // Growing (or shrinking) again is fine while nothing is acquired.
    /// pool.resize(1).unwrap();
    /// assert_eq!(pool.capacity(), 1);
    /// ```
    pub fn resize(&self, capacity: usize) -> Result<()>
    where
        T: Default,
    {
        let mut core = self.inner.borrow_mut();

        let in_use = core.in_use();
        if in_use > 0 {
            return Err(Error::ItemsInUse { in_use });
        }

        // Build the complete replacement state off to the side first. Only
        // once every fallible step has succeeded does the pool adopt it.
        let arena = Arena::new(capacity)?;

        let mut free = Vec::new();
        free.try_reserve_exact(capacity)
            .map_err(|_| Error::AllocationFailed {
                requested: capacity,
            })?;
        // Reversed so that popping yields 0, 1, 2, ... on a fresh arena.
        free.extend((0..capacity).rev());

        // Adoption is two plain moves; the old arena (and every default value
        // in it) is dropped here, after the new state is fully built.
        core.arena = arena;
        core.free = free;

        Ok(())
    }

    /// Claims a free slot and moves `value` into it, returning the exclusive
    /// lease handle.
    ///
    /// The slot's previous value is dropped in place and replaced within the
    /// same storage; no allocation occurs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] if no free slot exists, in which case
    /// `value` is dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<String>::new();
    /// pool.resize(2).unwrap();
    ///
    /// let first = pool.acquire("one".to_string()).unwrap();
    /// let second = pool.acquire("two".to_string()).unwrap();
    ///
    /// assert_eq!(&*first, "one");
    /// assert_eq!(&*second, "two");
    /// assert!(pool.acquire("three".to_string()).is_err());
    /// ```
    pub fn acquire(&self, value: T) -> Result<Pooled<T>> {
        self.try_acquire_with(|| Ok::<_, Infallible>(value))
            .map_err(Error::from)
    }

    /// Claims a free slot, then runs `make` to build the value that replaces
    /// the slot's current contents.
    ///
    /// This is the lazy counterpart of [`acquire()`][Self::acquire]: the value
    /// is only constructed once a slot is secured, so an exhausted pool costs
    /// nothing. If `make` panics, the claimed slot is returned to the free
    /// stack (its previous value intact) before the panic continues to unwind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] if no free slot exists; `make` is not
    /// invoked in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<Vec<u8>>::new();
    /// pool.resize(1).unwrap();
    ///
    /// let buffer = pool.acquire_with(|| vec![0; 4096]).unwrap();
    /// assert_eq!(buffer.len(), 4096);
    /// ```
    pub fn acquire_with(&self, make: impl FnOnce() -> T) -> Result<Pooled<T>> {
        self.try_acquire_with(|| Ok::<_, Infallible>(make()))
            .map_err(Error::from)
    }

    /// Claims a free slot, then runs a fallible constructor for the
    /// replacement value.
    ///
    /// If `make` returns an error (or panics), the claimed slot index is
    /// pushed back onto the free stack before the failure propagates, so the
    /// index is neither lost nor double-counted and the slot's previous value
    /// stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`TryAcquireError::Exhausted`] if no free slot exists (`make`
    /// is not invoked), or [`TryAcquireError::Construct`] carrying the error
    /// `make` produced.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::{FixedPool, TryAcquireError};
    ///
    /// let pool = FixedPool::<u32>::new();
    /// pool.resize(1).unwrap();
    ///
    /// let parsed = pool.try_acquire_with(|| "17".parse::<u32>()).unwrap();
    /// assert_eq!(*parsed, 17);
    /// drop(parsed);
    ///
    /// let result = pool.try_acquire_with(|| "not a number".parse::<u32>());
    /// assert!(matches!(result, Err(TryAcquireError::Construct(_))));
    ///
    /// // The failed attempt returned its slot; the pool is whole.
    /// assert_eq!(pool.available(), 1);
    /// ```
    pub fn try_acquire_with<E>(
        &self,
        make: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<Pooled<T>, TryAcquireError<E>> {
        let (slot_ptr, index) = {
            let mut core = self.inner.borrow_mut();

            match core.claim() {
                Some(claimed) => claimed,
                None => {
                    return Err(TryAcquireError::Exhausted {
                        capacity: core.arena.capacity(),
                    });
                }
            }
        };

        // The constructor runs with the pool unborrowed, so it is free to call
        // back into this pool. If it fails or unwinds, the claimed index goes
        // back on the free stack.
        let rollback = scopeguard::guard((), |()| {
            self.inner.borrow_mut().release(index);
        });

        let value = make().map_err(TryAcquireError::Construct)?;

        // The replacement value exists, so the claim is final from here on.
        // Disarming before touching the slot means that a panicking Drop of
        // the old value leaks the slot instead of re-issuing destroyed storage.
        let () = scopeguard::ScopeGuard::into_inner(rollback);

        // SAFETY: `claim()` granted exclusive use of this slot and the slot
        // holds a live value; nothing else reads or writes it until the handle
        // returns the index.
        unsafe {
            slot_ptr.drop_in_place();
        }
        // SAFETY: Same exclusive claim; the storage is properly aligned and
        // was just vacated.
        unsafe {
            slot_ptr.write(value);
        }

        Ok(Pooled::new(slot_ptr, index, self.clone()))
    }

    /// The total number of slots in the pool, free and claimed alike.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<u8>::new();
    /// assert_eq!(pool.capacity(), 0);
    ///
    /// pool.resize(8).unwrap();
    /// assert_eq!(pool.capacity(), 8);
    /// ```
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.borrow().arena.capacity()
    }

    /// The number of slots currently free to be acquired.
    #[must_use]
    pub fn available(&self) -> usize {
        self.inner.borrow().free.len()
    }

    /// The number of slots currently owned by live [`Pooled<T>`] handles.
    ///
    /// Always equals `capacity() - available()`.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.inner.borrow().in_use()
    }

    /// Whether the pool has nothing left to hand out (`available() == 0`).
    ///
    /// Note that this is about free slots, not stored items: a pool whose
    /// every slot is claimed is *empty* in this sense. A zero-capacity pool is
    /// simultaneously empty and [full][Self::is_full].
    ///
    /// # Example
    ///
    /// ```rust
    /// use fixed_pool::FixedPool;
    ///
    /// let pool = FixedPool::<u32>::new();
    /// pool.resize(1).unwrap();
    /// assert!(!pool.is_empty());
    ///
    /// let item = pool.acquire(9).unwrap();
    /// assert!(pool.is_empty());
    ///
    /// drop(item);
    /// assert!(!pool.is_empty());
    /// ```
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Whether every slot is at rest in the pool (`available() == capacity()`).
    #[must_use]
    pub fn is_full(&self) -> bool {
        let core = self.inner.borrow();
        core.free.len() == core.arena.capacity()
    }

    /// Returns a claimed index to the free stack.
    ///
    /// This is an internal method used by [`Pooled<T>`] when it is dropped.
    pub(crate) fn release(&self, index: usize) {
        self.inner.borrow_mut().release(index);
    }
}

impl<T> Default for FixedPool<T> {
    /// Creates a new pool with zero capacity.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    fn default() -> Self {
        Self::new()
    }
}

impl From<TryAcquireError<Infallible>> for Error {
    fn from(error: TryAcquireError<Infallible>) -> Self {
        match error {
            TryAcquireError::Exhausted { capacity } => Self::Exhausted { capacity },
            TryAcquireError::Construct(impossible) => match impossible {},
        }
    }
}

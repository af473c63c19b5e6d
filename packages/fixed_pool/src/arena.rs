use std::alloc::{Layout, alloc, dealloc};
use std::any::type_name;
use std::ptr::NonNull;

use crate::{Error, Result};

/// The backing storage of a `FixedPool`: a heap allocation of `capacity` slots,
/// every one of which holds a live instance of `T` for the arena's entire
/// lifetime. Slot addresses are stable - the arena never relocates its storage,
/// so a pointer to a slot remains valid until the arena itself is dropped.
///
/// The arena knows nothing about which slots are claimed; that bookkeeping
/// lives in the pool's free stack. It only guarantees that every slot within
/// `capacity` is initialized, which is what makes replace-in-place legal.
///
/// # Out of band access
///
/// The arena does not keep references to the slots or create new references
/// unless asked to, so it is valid for the pool's lease handles to read and
/// write slot values through raw pointers even while the arena is behind a
/// `RefCell` borrow elsewhere, as long as no two parties touch the same slot.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    first_slot_ptr: NonNull<T>,

    capacity: usize,

    /// How many slots hold a live value. Only ever less than `capacity` while
    /// the constructing loop in `new()` is still running (or has unwound).
    initialized: usize,
}

impl<T> Arena<T> {
    /// Creates an arena with zero slots and no heap allocation.
    #[must_use]
    pub(crate) fn empty() -> Self {
        Self {
            first_slot_ptr: NonNull::dangling(),
            capacity: 0,
            initialized: 0,
        }
    }

    /// Allocates storage for exactly `capacity` slots and default-constructs
    /// every one of them.
    ///
    /// If allocation fails, returns [`Error::AllocationFailed`] without side
    /// effects. If a `T::default()` call panics partway through, the slots
    /// built so far are dropped and the storage is released before the panic
    /// continues to unwind - the caller observes no partial arena either way.
    pub(crate) fn new(capacity: usize) -> Result<Self>
    where
        T: Default,
    {
        assert!(size_of::<T>() > 0, "Arena must have non-zero item size");

        if capacity == 0 {
            return Ok(Self::empty());
        }

        let layout = Self::layout(capacity)?;

        // SAFETY: The layout is valid for `capacity` items of `T` and is not
        // zero-sized (capacity > 0, item size > 0 per the assertion above).
        let first_slot_ptr = NonNull::new(unsafe { alloc(layout).cast::<T>() })
            .ok_or(Error::AllocationFailed {
                requested: capacity,
            })?;

        let mut arena = Self {
            first_slot_ptr,
            capacity,
            initialized: 0,
        };

        // If T::default() panics here, dropping `arena` cleans up the
        // `initialized` prefix and the allocation.
        for index in 0..capacity {
            let slot_ptr = arena.slot_ptr(index);

            // SAFETY: In-bounds write into freshly allocated, properly aligned
            // storage that holds no live value yet.
            unsafe {
                slot_ptr.write(T::default());
            }

            arena.initialized = arena
                .initialized
                .checked_add(1)
                .expect("bounded by capacity, which fits in usize");
        }

        Ok(arena)
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_| Error::AllocationFailed {
            requested: capacity,
        })
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the slot at `index`. The pointee is a live `T`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub(crate) fn slot_ptr(&self, index: usize) -> NonNull<T> {
        assert!(
            index < self.capacity,
            "slot index {index} out of bounds in arena of {}",
            type_name::<T>()
        );

        // SAFETY: Guarded by the bounds check above; all slots within capacity
        // were allocated in `new()`.
        unsafe { self.first_slot_ptr.add(index) }
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        for index in 0..self.initialized {
            // SAFETY: `slot_ptr` stays in bounds because `initialized` never
            // exceeds `capacity`; every slot below `initialized` holds a live
            // value that has not been dropped elsewhere.
            unsafe {
                self.slot_ptr(index).drop_in_place();
            }
        }

        if self.capacity > 0 {
            let layout = Self::layout(self.capacity)
                .expect("layout was computable when this arena was allocated");

            // SAFETY: The pointer came from `alloc` with this same layout.
            unsafe {
                dealloc(self.first_slot_ptr.as_ptr().cast(), layout);
            }
        }
    }
}

// SAFETY: The raw pointer is an implementation detail of ownership, not of
// sharing; the arena exclusively owns its slots, so it is as thread-mobile
// as the item type itself.
unsafe impl<T: Send> Send for Arena<T> {}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn new_constructs_defaults() {
        let arena = Arena::<u32>::new(3).unwrap();

        assert_eq!(arena.capacity(), 3);

        for index in 0..3 {
            // SAFETY: All slots hold live values after construction; nobody
            // else is touching them in this test.
            let value = unsafe { arena.slot_ptr(index).read() };
            assert_eq!(value, 0);
        }
    }

    #[test]
    fn empty_arena_allocates_nothing() {
        let arena = Arena::<u64>::empty();

        assert_eq!(arena.capacity(), 0);
    }

    #[test]
    fn zero_capacity_via_new_is_empty() {
        let arena = Arena::<u64>::new(0).unwrap();

        assert_eq!(arena.capacity(), 0);
    }

    #[test]
    #[should_panic]
    fn slot_ptr_oob_panics() {
        let arena = Arena::<u32>::new(2).unwrap();

        _ = arena.slot_ptr(2);
    }

    #[test]
    fn absurd_capacity_is_allocation_error() {
        // Layout computation overflows long before the allocator is consulted.
        let result = Arena::<u64>::new(usize::MAX / 2);

        assert!(matches!(
            result,
            Err(Error::AllocationFailed {
                requested
            }) if requested == usize::MAX / 2
        ));
    }

    #[test]
    fn drop_runs_destructors_for_every_slot() {
        #[derive(Default)]
        struct Tracked;

        thread_local! {
            static DROPS: Cell<usize> = const { Cell::new(0) };
        }

        impl Drop for Tracked {
            fn drop(&mut self) {
                DROPS.with(|d| d.set(d.get() + 1));
            }
        }

        DROPS.with(|d| d.set(0));

        drop(Arena::<Tracked>::new(5).unwrap());

        assert_eq!(DROPS.with(Cell::get), 5);
    }

    #[test]
    fn panicking_default_cleans_up_prefix() {
        struct Flaky {
            _occupied: u8,
        }

        thread_local! {
            static LIVE: Cell<usize> = const { Cell::new(0) };
            static BUILT: Cell<usize> = const { Cell::new(0) };
        }

        impl Default for Flaky {
            fn default() -> Self {
                let built = BUILT.with(|b| {
                    b.set(b.get() + 1);
                    b.get()
                });

                assert!(built <= 3, "the fourth construction fails");

                LIVE.with(|l| l.set(l.get() + 1));
                Self { _occupied: 0 }
            }
        }

        impl Drop for Flaky {
            fn drop(&mut self) {
                LIVE.with(|l| l.set(l.get() - 1));
            }
        }

        BUILT.with(|b| b.set(0));
        LIVE.with(|l| l.set(0));

        let result = std::panic::catch_unwind(|| Arena::<Flaky>::new(10));
        assert!(result.is_err());

        // The three successfully built values were dropped during unwinding.
        assert_eq!(LIVE.with(Cell::get), 0);
    }
}

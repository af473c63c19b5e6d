//! Error handling with `fixed_pool`:
//!
//! * Reacting to pool exhaustion by growing and retrying.
//! * Fallible value construction with `try_acquire_with`.

use fixed_pool::{Error, FixedPool, TryAcquireError};

fn main() {
    let pool = FixedPool::<u32>::new();
    pool.resize(1).expect("a one-slot pool fits in memory");

    let held = pool.acquire(1).expect("the pool is fresh");

    // The pool never grows by itself; exhaustion is reported immediately and
    // retry policy belongs to the caller.
    match pool.acquire(2) {
        Err(Error::Exhausted { capacity }) => {
            println!("All {capacity} slots busy; growing the pool");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }

    // Resizing requires every lease to be back home first.
    drop(held);
    pool.resize(2).expect("a two-slot pool fits in memory");

    let _first = pool.acquire(1).expect("capacity was just doubled");
    let _second = pool.acquire(2).expect("capacity was just doubled");

    // Construction failures surface through try_acquire_with, and the claimed
    // slot is returned before the error reaches us.
    drop(_first);
    drop(_second);

    match pool.try_acquire_with(|| "twelve".parse::<u32>()) {
        Err(TryAcquireError::Construct(parse_error)) => {
            println!("Constructor failed ({parse_error}); pool still has {} free slots", pool.available());
        }
        other => panic!("expected a construction failure, got {other:?}"),
    }

    let recovered = pool
        .try_acquire_with(|| "12".parse::<u32>())
        .expect("this constructor succeeds");
    println!("Recovered with value {}", *recovered);
}

//! Example that demonstrates the exact usage shown in the README.md file.
//!
//! This shows how to use `FixedPool` for allocation-free object reuse.

use fixed_pool::FixedPool;

fn main() {
    println!("=== Fixed Pool README Example ===");

    let pool = FixedPool::<String>::new();
    pool.resize(2).unwrap();

    // Acquiring replaces a free slot's value in place - no allocation for
    // the slot itself - and returns a move-only lease handle.
    let first = pool.acquire("hello".to_string()).unwrap();
    println!("Leased: {}", *first);

    // Capacity is fixed: with every slot leased out, acquire fails fast.
    let second = pool.acquire("world".to_string()).unwrap();
    assert!(pool.acquire("overflow".to_string()).is_err());
    println!("Also leased: {}", *second);

    // Dropping a lease returns its slot; the most recently returned slot is
    // the first to be reused.
    drop(second);
    let reused = pool.acquire("again".to_string()).unwrap();
    println!("Reused slot {}: {}", reused.index(), *reused);

    println!("README example completed successfully!");
}

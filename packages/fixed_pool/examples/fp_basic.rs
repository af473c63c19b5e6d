//! Basic usage of the `fixed_pool` crate:
//!
//! * Sizing the pool.
//! * Acquiring leases.
//! * Observing the pool state.
//! * Returning leases by dropping them.

use fixed_pool::FixedPool;

fn main() {
    let pool = FixedPool::<String>::new();

    // Storage is built exactly once, up front. Every slot starts out holding
    // a default-constructed value that the first acquire replaces.
    pool.resize(3).expect("a three-slot pool fits in memory");

    println!(
        "Pool ready: {} slots, {} available, {} in use",
        pool.capacity(),
        pool.available(),
        pool.in_use()
    );

    let alice = pool.acquire("Alice".to_string()).expect("slots are free");
    let bob = pool.acquire("Bob".to_string()).expect("slots are free");

    println!("Leased: {} and {}", *alice, *bob);
    println!("{} of {} slots in use", pool.in_use(), pool.capacity());

    {
        // A lease returns its slot when it goes out of scope.
        let charlie = pool.acquire("Charlie".to_string()).expect("one slot left");
        println!("Leased the last slot: {}", *charlie);
        println!("Pool exhausted? {}", pool.is_empty());
    }

    // Charlie's slot is back; the next acquire reuses it (LIFO).
    let dana = pool.acquire("Dana".to_string()).expect("a slot was returned");
    println!("Reused slot {} for {}", dana.index(), *dana);

    // Leases can be mutated in place, like any exclusively owned value.
    let mut greeting = dana;
    greeting.push_str(" the Recycled");
    println!("Modified in place: {}", *greeting);
}

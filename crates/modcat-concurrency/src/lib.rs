//! Bounded, order-preserving concurrent fan-out (component C1).
//!
//! The pipeline uses two independent tiers of this mapper: the outer tier
//! (repositories, default cap 20) and the inner tier (releases per
//! repository, default cap 100). Nesting them — the inner mapper runs
//! inside one outer worker — bounds total concurrency to
//! `outer_cap * inner_cap` without either tier knowing about the other.
//!
//! Work is dispatched in fixed-size chunks of at most `cap` items using
//! `std::thread::scope`: each chunk's items run on their own scoped thread,
//! and the whole chunk is joined before the next one starts. Because every
//! handle corresponds 1:1 to an input in its original position, collecting
//! `handle.join()` results in handle order reconstructs the input order
//! regardless of which thread actually finished first.

use tracing::instrument;

/// Map every item in `items` through `f`, running at most `cap` invocations
/// concurrently, preserving input order in the output. `f` must not panic.
#[instrument(level = "debug", skip_all, fields(total = items.len(), cap))]
pub fn bounded_map<T, R, F>(items: Vec<T>, cap: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let cap = cap.max(1);
    let mut items = items;
    let mut results = Vec::with_capacity(items.len());
    let f = &f;

    while !items.is_empty() {
        let take = cap.min(items.len());
        let chunk: Vec<T> = items.drain(0..take).collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .into_iter()
                .map(|item| scope.spawn(move || f(item)))
                .collect();

            for handle in handles {
                results.push(handle.join().expect("bounded_map worker panicked"));
            }
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn bounded_map_preserves_order() {
        let items: Vec<i32> = (0..257).collect();
        let results = bounded_map(items.clone(), 20, |x| x * 2);
        let expected: Vec<i32> = items.iter().map(|x| x * 2).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn bounded_map_never_exceeds_cap_in_flight() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let cap = 4;

        let items: Vec<usize> = (0..50).collect();
        let in_flight2 = Arc::clone(&in_flight);
        let max_seen2 = Arc::clone(&max_seen);

        bounded_map(items, cap, move |x| {
            let now = in_flight2.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen2.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(2));
            in_flight2.fetch_sub(1, Ordering::SeqCst);
            x
        });

        assert!(max_seen.load(Ordering::SeqCst) <= cap);
    }

    proptest::proptest! {
        #[test]
        fn bounded_map_order_preservation_property(items: Vec<i32>, cap in 1usize..8) {
            let results = bounded_map(items.clone(), cap, |x| x);
            proptest::prop_assert_eq!(results, items);
        }
    }
}

// ==============================================
// END-TO-END MEMOIZATION (integration)
// ==============================================
//
// Drives the memoized-recursion contract through both backends via the
// unified builder, plus the cached range-aggregate workflow the LRU backend
// exists for: compute span sums through the cache, mutate the underlying
// array, invalidate every span covering the mutated index, recompute.

use memokit::builder::{CacheBuilder, CachePolicy};
use memokit::memo::{Memoizer, Recurrence};
use memokit::policy::lru::BoundedLruCache;
use memokit::policy::splay::SplayCache;
use memokit::traits::MemoCache;

struct Fibonacci;

impl Recurrence<u64, u64> for Fibonacci {
    fn base(&self, key: &u64) -> Option<u64> {
        (*key < 2).then_some(*key)
    }

    fn dependencies(&self, key: &u64) -> Vec<u64> {
        vec![key - 1, key - 2]
    }

    fn combine(&self, _key: &u64, deps: &[u64]) -> u64 {
        deps.iter().sum()
    }
}

#[test]
fn fibonacci_identical_across_backends() {
    let policies = [CachePolicy::Splay, CachePolicy::Lru { capacity: 64 }];

    for policy in policies {
        let cache = CacheBuilder::new(policy.clone()).build::<u64, u64>();
        let mut memo = Memoizer::new(cache, Fibonacci);

        assert_eq!(memo.compute(10), 55, "wrong fib(10) for {policy:?}");
        assert_eq!(
            memo.cache().len(),
            11,
            "expected keys 0..=10 for {policy:?}"
        );
        assert_eq!(memo.compute(20), 6765);
        assert_eq!(memo.cache().len(), 21);
    }
}

#[test]
fn splay_keeps_last_computed_key_at_root() {
    let mut memo = Memoizer::new(SplayCache::new(), Fibonacci);
    memo.compute(10);

    // compute(10) finishes by inserting key 10, which is splayed to root.
    assert_eq!(memo.cache().root_key(), Some(&10));
    memo.cache().check_invariants().unwrap();
}

#[test]
fn deep_chain_through_both_backends() {
    let mut splay_memo = Memoizer::new(SplayCache::new(), Fibonacci);
    let mut lru_memo = Memoizer::new(BoundedLruCache::new(128), Fibonacci);

    // fib(90) = 2880067194370816120 fits in u64.
    assert_eq!(splay_memo.compute(90), 2_880_067_194_370_816_120);
    assert_eq!(lru_memo.compute(90), 2_880_067_194_370_816_120);
    assert_eq!(splay_memo.cache().len(), 91);
    assert_eq!(lru_memo.cache().len(), 91);
}

// ----------------------------------------------
// Cached range sums with invalidation
// ----------------------------------------------

fn span_sum(array: &[i64], l: usize, r: usize) -> i64 {
    array[l..=r].iter().sum()
}

fn cached_span_sum(
    array: &[i64],
    l: usize,
    r: usize,
    cache: &mut BoundedLruCache<(usize, usize), i64>,
) -> i64 {
    if let Some(&sum) = cache.get(&(l, r)) {
        return sum;
    }
    let sum = span_sum(array, l, r);
    cache.insert((l, r), sum);
    sum
}

fn update_with_invalidation(
    array: &mut [i64],
    index: usize,
    value: i64,
    cache: &mut BoundedLruCache<(usize, usize), i64>,
) {
    array[index] = value;
    cache.invalidate(|&(l, r)| l <= index && index <= r);
}

#[test]
fn range_sums_stay_correct_across_updates() {
    let mut array: Vec<i64> = (1..=10).collect();
    let mut cache = BoundedLruCache::new(16);

    assert_eq!(cached_span_sum(&array, 0, 4, &mut cache), 15);
    assert_eq!(cached_span_sum(&array, 2, 6, &mut cache), 25);
    assert_eq!(cached_span_sum(&array, 7, 9, &mut cache), 27);
    assert_eq!(cache.len(), 3);

    // Second reads are cache hits with the same answers.
    assert_eq!(cached_span_sum(&array, 0, 4, &mut cache), 15);
    assert_eq!(cache.len(), 3);

    // Mutate index 3: spans (0,4) and (2,6) cover it, (7,9) does not.
    update_with_invalidation(&mut array, 3, 100, &mut cache);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&(7, 9)));

    // Recomputed sums reflect the mutation.
    assert_eq!(cached_span_sum(&array, 0, 4, &mut cache), 111);
    assert_eq!(cached_span_sum(&array, 2, 6, &mut cache), 121);
    assert_eq!(cached_span_sum(&array, 7, 9, &mut cache), 27);
}

#[test]
fn stale_spans_never_served_after_update() {
    let mut array = vec![1i64; 32];
    let mut cache = BoundedLruCache::new(64);

    for l in 0..8 {
        for r in l..8 {
            cached_span_sum(&array, l, r, &mut cache);
        }
    }

    update_with_invalidation(&mut array, 4, 50, &mut cache);

    for l in 0..8 {
        for r in l..8 {
            let expected = span_sum(&array, l, r);
            assert_eq!(
                cached_span_sum(&array, l, r, &mut cache),
                expected,
                "stale sum for span ({l}, {r})"
            );
        }
    }
}

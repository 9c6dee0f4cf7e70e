use memokit::policy::lru::BoundedLruCache;

fn cached_span_sum(
    array: &[i64],
    l: usize,
    r: usize,
    cache: &mut BoundedLruCache<(usize, usize), i64>,
) -> i64 {
    if let Some(&sum) = cache.get(&(l, r)) {
        return sum;
    }
    let sum = array[l..=r].iter().sum();
    cache.insert((l, r), sum);
    sum
}

fn main() {
    let mut array: Vec<i64> = (1..=10).collect();
    let mut cache = BoundedLruCache::new(100);

    println!("sum(0..=4) = {}", cached_span_sum(&array, 0, 4, &mut cache));
    println!("sum(2..=6) = {}", cached_span_sum(&array, 2, 6, &mut cache));
    println!("cached spans: {}", cache.len());

    // Mutate index 3 and drop every cached span covering it.
    array[3] = 100;
    let removed = cache.invalidate(|&(l, r)| l <= 3 && 3 <= r);
    println!("spans invalidated: {removed}");

    println!("sum(0..=4) = {}", cached_span_sum(&array, 0, 4, &mut cache));
}

// Expected output:
// sum(0..=4) = 15
// sum(2..=6) = 25
// cached spans: 2
// spans invalidated: 2
// sum(0..=4) = 111
//
// Explanation: both cached spans cover index 3, so the update invalidates
// both; the recomputed sum reflects the new value at index 3.

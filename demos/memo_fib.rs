use memokit::memo::{Memoizer, Recurrence};
use memokit::policy::lru::BoundedLruCache;
use memokit::policy::splay::SplayCache;

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

fn main() {
    let mut splay_memo = Memoizer::new(SplayCache::new(), Fibonacci);
    println!("fib(10) via splay = {}", splay_memo.compute(10));
    println!("splay entries: {}", splay_memo.cache().len());
    println!("splay root key: {:?}", splay_memo.cache().root_key());

    let mut lru_memo = Memoizer::new(BoundedLruCache::new(64), Fibonacci);
    println!("fib(10) via lru = {}", lru_memo.compute(10));
    println!("lru entries: {}", lru_memo.cache().len());
}

// Expected output:
// fib(10) via splay = 55
// splay entries: 11
// splay root key: Some(10)
// fib(10) via lru = 55
// lru entries: 11
//
// Explanation: both backends memoize the same 11 keys (0..=10). The splay
// tree additionally leaves the last-inserted key at the root.

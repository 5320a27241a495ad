use super::rng::make_generator;

/// Pick `target` items out of `items`, driven by a generator seeded with `seed`.
///
/// Collections that already fit in `target` are returned as-is, in their original order.
/// Larger collections go through a bounded Fisher-Yates partial shuffle: only the first
/// `target` slots are drawn, so the cost is `O(target)` swaps on top of the copy.
pub fn select_trending<T: Clone>(items: &[T], target: usize, seed: &str) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }

    if items.len() <= target {
        return items.to_vec();
    }

    let mut rng = make_generator(seed);
    let mut pool: Vec<&T> = items.iter().collect();
    let len = pool.len();

    for i in 0..target {
        let remaining = len - i;
        let offset = ((rng.next_f64() * remaining as f64) as usize).min(remaining - 1);
        pool.swap(i, i + offset);
    }

    pool.into_iter().take(target).cloned().collect()
}

//! Unbiased in-place shuffling.

/// Shuffle `items` in place with Fisher-Yates.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// chosen slot at or below it, so every permutation is equally likely.
pub fn fisher_yates<T>(items: &mut [T], rng: &mut fastrand::Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.usize(..=i);
        items.swap(i, j);
    }
}

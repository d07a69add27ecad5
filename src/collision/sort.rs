//! Spatial sorting of bodies by bounding-box min X.
//!
//! Two interchangeable sorters feed the sweep: an in-place Lomuto quicksort
//! and a parallel LSB radix sort over order-preserving integer keys.

use rayon::prelude::*;

use crate::{
    config::{SortAlgorithm, RADIX_PARALLEL_THRESHOLD},
    core::Body,
    error::{CollisionError, Result},
    utils::logging::ScopedTimer,
};

const RADIX_BITS: u32 = 8;
const RADIX_SIZE: usize = 1 << RADIX_BITS;
const RADIX_MASK: u64 = (RADIX_SIZE - 1) as u64;
const SIGN_BIT: u64 = 1 << 63;

/// Maps an `f64` to a `u64` whose unsigned order matches the float order:
/// negative values have every bit inverted, the rest get the sign bit set.
pub fn sortable_key(value: f64) -> u64 {
    let bits = value.to_bits();
    if bits & SIGN_BIT != 0 {
        !bits
    } else {
        bits | SIGN_BIT
    }
}

/// Sorts `bodies` in place by min X with the selected algorithm, then checks
/// the result.
pub fn sort_bodies(bodies: &mut [Body], algorithm: SortAlgorithm) -> Result<()> {
    let _timer = ScopedTimer::new("sort", bodies.len());
    match algorithm {
        SortAlgorithm::QuickSort => quick_sort_by_key(bodies, Body::sort_key),
        SortAlgorithm::Radix => radix_sort_by_key(bodies, Body::sort_key),
    }
    check_sorted_by_key(bodies, Body::sort_key)
}

/// Fails with [`CollisionError::NotSorted`] at the first descent.
pub fn check_sorted_by_key<T, F>(items: &[T], key: F) -> Result<()>
where
    F: Fn(&T) -> f64,
{
    for (index, window) in items.windows(2).enumerate() {
        let previous = key(&window[0]);
        let current = key(&window[1]);
        if previous > current {
            return Err(CollisionError::NotSorted {
                index: index + 1,
                previous,
                current,
            });
        }
    }
    Ok(())
}

/// Quicksort with a Lomuto partition around the last element.
///
/// Already sorted input is the quadratic worst case. Recursion always takes
/// the smaller side, so stack depth stays logarithmic.
pub fn quick_sort_by_key<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> f64,
{
    quick_sort_slice(items, &key);
}

fn quick_sort_slice<T, F>(mut items: &mut [T], key: &F)
where
    F: Fn(&T) -> f64,
{
    while items.len() > 1 {
        let pivot = partition(items, key);
        let (left, right) = std::mem::take(&mut items).split_at_mut(pivot);
        let right = &mut right[1..];
        if left.len() < right.len() {
            quick_sort_slice(left, key);
            items = right;
        } else {
            quick_sort_slice(right, key);
            items = left;
        }
    }
}

fn partition<T, F>(items: &mut [T], key: &F) -> usize
where
    F: Fn(&T) -> f64,
{
    let high = items.len() - 1;
    let pivot = key(&items[high]);
    let mut store = 0;
    for j in 0..high {
        if key(&items[j]) <= pivot {
            items.swap(store, j);
            store += 1;
        }
    }
    items.swap(store, high);
    store
}

#[derive(Debug, Clone, Copy, Default)]
struct SortItem {
    key: u64,
    index: usize,
}

#[inline]
fn digit(key: u64, shift: u32) -> usize {
    ((key >> shift) & RADIX_MASK) as usize
}

/// LSB radix sort: 8 stable counting passes over 8-bit digits of
/// [`sortable_key`]. Uses the rayon pool for key extraction, histograms and
/// copy-back once the input is large enough.
pub fn radix_sort_by_key<T, F>(items: &mut [T], key: F)
where
    T: Sync,
    F: Fn(&T) -> f64 + Sync,
{
    if items.len() <= 1 {
        return;
    }

    let workers = rayon::current_num_threads();
    let mut keys: Vec<SortItem> = items
        .par_iter()
        .enumerate()
        .map(|(index, item)| SortItem {
            key: sortable_key(key(item)),
            index,
        })
        .collect();
    let mut temp = vec![SortItem::default(); keys.len()];

    for shift in (0..u64::BITS).step_by(RADIX_BITS as usize) {
        parallel_counting_sort(&mut keys, &mut temp, shift, workers);
    }

    let order = keys.into_iter().map(|item| item.index).collect();
    apply_permutation(items, order);
}

fn counting_sort(items: &mut [SortItem], temp: &mut [SortItem], shift: u32) {
    let mut count = histogram(items, shift);
    for i in 1..RADIX_SIZE {
        count[i] += count[i - 1];
    }
    scatter(items, temp, &mut count, shift);
    items.copy_from_slice(temp);
}

fn parallel_counting_sort(
    items: &mut [SortItem],
    temp: &mut [SortItem],
    shift: u32,
    workers: usize,
) {
    let n = items.len();
    if n <= RADIX_PARALLEL_THRESHOLD || workers <= 1 {
        counting_sort(items, temp, shift);
        return;
    }

    let chunk_size = n.div_ceil(workers);
    let local_counts: Vec<[usize; RADIX_SIZE]> = items
        .par_chunks(chunk_size)
        .map(|chunk| histogram(chunk, shift))
        .collect();

    let mut global = [0usize; RADIX_SIZE];
    for local in &local_counts {
        for (total, count) in global.iter_mut().zip(local.iter()) {
            *total += count;
        }
    }
    for i in 1..RADIX_SIZE {
        global[i] += global[i - 1];
    }

    scatter(items, temp, &mut global, shift);

    items
        .par_chunks_mut(chunk_size)
        .zip(temp.par_chunks(chunk_size))
        .for_each(|(dst, src)| dst.copy_from_slice(src));
}

fn histogram(items: &[SortItem], shift: u32) -> [usize; RADIX_SIZE] {
    let mut count = [0usize; RADIX_SIZE];
    for item in items {
        count[digit(item.key, shift)] += 1;
    }
    count
}

/// Back-to-front placement keeps equal digits in input order.
fn scatter(
    items: &[SortItem],
    temp: &mut [SortItem],
    prefix: &mut [usize; RADIX_SIZE],
    shift: u32,
) {
    for item in items.iter().rev() {
        let bucket = digit(item.key, shift);
        prefix[bucket] -= 1;
        temp[prefix[bucket]] = *item;
    }
}

/// Rearranges `items` so that position `i` holds what was at `order[i]`.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..items.len() {
        if order[start] == start {
            continue;
        }
        let mut current = start;
        loop {
            let next = order[current];
            order[current] = current;
            if next == start {
                break;
            }
            items.swap(current, next);
            current = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_preserves_order_across_sign() {
        let values = [
            f64::NEG_INFINITY,
            -1.0e300,
            -2.5,
            -f64::MIN_POSITIVE,
            -0.0,
            0.0,
            f64::MIN_POSITIVE,
            1.0,
            3.75,
            f64::INFINITY,
        ];
        for pair in values.windows(2) {
            assert!(
                sortable_key(pair[0]) <= sortable_key(pair[1]),
                "{} vs {}",
                pair[0],
                pair[1]
            );
        }
        assert!(sortable_key(-0.0) < sortable_key(0.0));
        assert_eq!(sortable_key(0.0), SIGN_BIT);
    }

    #[test]
    fn quick_sort_orders_floats() {
        let mut values = vec![3.0, -1.0, 2.0, 2.0, -7.5, 0.0];
        quick_sort_by_key(&mut values, |v| *v);
        assert_eq!(values, vec![-7.5, -1.0, 0.0, 2.0, 2.0, 3.0]);
    }

    #[test]
    fn quick_sort_handles_sorted_input_without_deep_recursion() {
        let mut values: Vec<f64> = (0..5_000).map(f64::from).collect();
        quick_sort_by_key(&mut values, |v| *v);
        assert!(check_sorted_by_key(&values, |v| *v).is_ok());
    }

    #[test]
    fn radix_sort_is_stable() {
        let mut values = vec![(1.0, 'a'), (-1.0, 'b'), (1.0, 'c'), (-1.0, 'd'), (0.5, 'e')];
        radix_sort_by_key(&mut values, |(k, _)| *k);
        let tags: String = values.iter().map(|(_, tag)| *tag).collect();
        assert_eq!(tags, "bdeac");
    }

    #[test]
    fn radix_sort_large_input_takes_parallel_path() {
        let n = RADIX_PARALLEL_THRESHOLD * 3 + 17;
        let mut values: Vec<f64> = (0..n)
            .map(|i| ((i * 7919) % 10_007) as f64 - 5_000.0)
            .collect();
        radix_sort_by_key(&mut values, |v| *v);
        assert!(check_sorted_by_key(&values, |v| *v).is_ok());
    }

    #[test]
    fn permutation_follows_cycles() {
        let mut items = vec!['a', 'b', 'c', 'd', 'e'];
        apply_permutation(&mut items, vec![2, 0, 1, 4, 3]);
        assert_eq!(items, vec!['c', 'a', 'b', 'e', 'd']);
    }

    #[test]
    fn check_reports_first_descent() {
        let err = check_sorted_by_key(&[1.0, 2.0, 1.5], |v| *v).unwrap_err();
        assert_eq!(
            err,
            CollisionError::NotSorted {
                index: 2,
                previous: 2.0,
                current: 1.5,
            }
        );
    }
}

/// Items sortable by a 64-bit key
pub trait SortKey {
    /// The key to order by
    fn sort_key(&self) -> u64;
}

/// Stable recursive merge sort. `scratch` must be at least as long as `data`.
pub fn merge_sort<T: Copy + SortKey>(data: &mut [T], scratch: &mut [T]) {
    debug_assert!(scratch.len() >= data.len());

    let n = data.len();
    if n < 2 {
        return;
    }

    let mid = n / 2;
    merge_sort(&mut data[..mid], scratch);
    merge_sort(&mut data[mid..], scratch);
    merge_halves(data, mid, &mut scratch[..n]);
}

// Merges the sorted runs `data[..mid]` and `data[mid..]` through `buffer`
fn merge_halves<T: Copy + SortKey>(data: &mut [T], mid: usize, buffer: &mut [T]) {
    let (mut i, mut j, mut k) = (0, mid, 0);

    while i < mid && j < data.len() {
        // `<=` takes from the left run on ties, which keeps the sort stable
        if data[i].sort_key() <= data[j].sort_key() {
            buffer[k] = data[i];
            i += 1;
        } else {
            buffer[k] = data[j];
            j += 1;
        }
        k += 1;
    }

    let left_rest = mid - i;
    buffer[k..k + left_rest].copy_from_slice(&data[i..mid]);
    k += left_rest;
    let right_rest = data.len() - j;
    buffer[k..k + right_rest].copy_from_slice(&data[j..]);

    data.copy_from_slice(buffer);
}

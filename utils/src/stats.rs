//! Weighted percentiles for block statistics.

/// Number of percentile marks reported per block.
pub const NUM_PERCENTILES: usize = 5;

/// The percentile marks, in ascending order.
pub const PERCENTILE_MARKS: [i64; NUM_PERCENTILES] = [10, 25, 50, 75, 90];

/// Compute the 10th/25th/50th/75th/90th weighted percentiles of `entries`.
///
/// `entries` are `(value, weight)` pairs sorted ascending by value. Mark `p`
/// resolves to the value of the first entry at which the cumulative weight
/// reaches `p%` of `total_weight`; one heavy entry may satisfy several marks.
/// Marks left unsatisfied once the entries run out (because `total_weight`
/// exceeds their sum) take the last value.
///
/// Returns all zeros for empty input or a non-positive `total_weight`.
pub fn calculate_percentiles_by_weight(
    entries: &[(i64, i64)],
    total_weight: i64,
) -> [i64; NUM_PERCENTILES] {
    let mut result = [0; NUM_PERCENTILES];
    let Some(&(last_value, _)) = entries.last() else {
        return result;
    };
    if total_weight <= 0 {
        return result;
    }

    let total = i128::from(total_weight);
    let mut next_mark = 0;
    let mut cumulative: i128 = 0;
    for &(value, weight) in entries {
        cumulative += i128::from(weight);
        while next_mark < NUM_PERCENTILES
            && cumulative * 100 >= total * i128::from(PERCENTILE_MARKS[next_mark])
        {
            result[next_mark] = value;
            next_mark += 1;
        }
    }

    for slot in result.iter_mut().skip(next_mark) {
        *slot = last_value;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_equal_halves() {
        let mut entries = vec![(1, 1); 100];
        entries.extend(std::iter::repeat((2, 1)).take(100));
        assert_eq!(calculate_percentiles_by_weight(&entries, 200), [1, 1, 1, 2, 2]);
    }

    #[test]
    fn entries_spanning_two_marks() {
        let entries = [(1, 9), (2, 16), (4, 50), (5, 10), (9, 15)];
        assert_eq!(calculate_percentiles_by_weight(&entries, 100), [2, 2, 4, 4, 9]);
    }

    #[test]
    fn split_entry_gives_same_marks() {
        let entries = [(1, 9), (2, 11), (2, 5), (4, 50), (5, 10), (9, 15)];
        assert_eq!(calculate_percentiles_by_weight(&entries, 100), [2, 2, 4, 4, 9]);
    }

    #[test]
    fn one_entry_spanning_every_mark() {
        let entries = [(1, 100), (2, 1), (3, 1), (3, 1), (999_999, 1)];
        assert_eq!(calculate_percentiles_by_weight(&entries, 104), [1; NUM_PERCENTILES]);
    }

    #[test]
    fn empty_or_weightless_input_is_all_zero() {
        assert_eq!(calculate_percentiles_by_weight(&[], 100), [0; NUM_PERCENTILES]);
        assert_eq!(calculate_percentiles_by_weight(&[(5, 1)], 0), [0; NUM_PERCENTILES]);
    }

    #[test]
    fn unreached_marks_take_the_last_value() {
        // Only 40% of the declared weight is present.
        let entries = [(3, 20), (7, 20)];
        assert_eq!(calculate_percentiles_by_weight(&entries, 100), [3, 7, 7, 7, 7]);
    }

    #[test]
    fn input_is_left_untouched() {
        let entries = vec![(1, 9), (2, 16), (4, 50)];
        let before = entries.clone();
        let _ = calculate_percentiles_by_weight(&entries, 75);
        assert_eq!(entries, before);
    }
}

use std::iter::FusedIterator;

/// Largest input [`subsets`] accepts; `2^n` must fit in `usize`.
pub const MAX_SUBSET_ITEMS: usize = usize::BITS as usize - 1;

/// Lazy enumeration of every subset of a slice, the empty one first.
///
/// Subset `i` holds the items whose position bit is set in `i`, in their
/// original order, for `i` ascending over `0..2^n`.
#[derive(Debug, Clone)]
pub struct Subsets<'a, T> {
    items: &'a [T],
    next: usize,
    end: usize,
}

/// Enumerate the subsets of `items` without materialising them.
///
/// # Panics
///
/// Panics when `items` has more than [`MAX_SUBSET_ITEMS`] elements.
pub fn subsets<T>(items: &[T]) -> Subsets<'_, T> {
    assert!(
        items.len() <= MAX_SUBSET_ITEMS,
        "cannot enumerate subsets of {} items",
        items.len()
    );
    Subsets {
        items,
        next: 0,
        end: 1 << items.len(),
    }
}

/// Every subset of `items` (not permutations), `2^n` in total.
///
/// `[]` yields `[[]]`; `[1, 2, 3]` yields
/// `[[], [1], [2], [1, 2], [3], [1, 3], [2, 3], [1, 2, 3]]`.
///
/// # Panics
///
/// Panics when `items` has more than [`MAX_SUBSET_ITEMS`] elements.
pub fn array_combinate<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    subsets(items).collect()
}

impl<T: Clone> Iterator for Subsets<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let mask = self.next;
        self.next += 1;

        Some(
            self.items
                .iter()
                .enumerate()
                .filter(|(position, _)| mask & (1 << position) != 0)
                .map(|(_, item)| item.clone())
                .collect(),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for Subsets<'_, T> {}

impl<T: Clone> FusedIterator for Subsets<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_only_empty_subset() {
        let empty: [i32; 0] = [];
        assert_eq!(array_combinate(&empty), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn three_items_follow_bitmask_order() {
        assert_eq!(
            array_combinate(&[1, 2, 3]),
            vec![
                vec![],
                vec![1],
                vec![2],
                vec![1, 2],
                vec![3],
                vec![1, 3],
                vec![2, 3],
                vec![1, 2, 3],
            ]
        );
    }

    #[test]
    fn iterator_reports_exact_length() {
        let items = ["a", "b", "c", "d"];
        let mut iter = subsets(&items);
        assert_eq!(iter.len(), 16);
        iter.next();
        assert_eq!(iter.len(), 15);
        assert_eq!(iter.last(), Some(vec!["a", "b", "c", "d"]));
    }

    #[test]
    fn largest_input_is_accepted_lazily() {
        let items = vec![0u8; MAX_SUBSET_ITEMS];
        let mut iter = subsets(&items);
        assert_eq!(iter.next(), Some(Vec::new()));
        assert_eq!(iter.next(), Some(vec![0u8]));
    }

    #[test]
    #[should_panic(expected = "cannot enumerate subsets")]
    fn oversized_input_panics() {
        let items = vec![0u8; MAX_SUBSET_ITEMS + 1];
        let _ = subsets(&items);
    }

    #[test]
    fn duplicates_are_kept_positionally() {
        let subsets = array_combinate(&["x", "x"]);
        assert_eq!(subsets, vec![vec![], vec!["x"], vec!["x"], vec!["x", "x"]]);
    }
}

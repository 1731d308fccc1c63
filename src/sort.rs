//! Sort state of a table view.
//!
//! A [`SortManager`] owns the records of one view in the order they were
//! received and keeps a row mapping (view row -> record index) that reflects
//! the current [`SortState`]. Sorting is stable in both directions: records
//! with equal keys always keep their input order.
//!
//! Values are compared as follows:
//! * numbers numerically, using a total order (`-0.0` equals `0.0`, every
//!   `NaN` is equal to every other `NaN` and sorts after `+inf`),
//! * strings case-sensitively by byte order (`"Zeta" < "alpha"`),
//! * a string that contains a digit and parses as a number is compared as
//!   that number, and numbers sort before all other strings,
//! * number series element-wise, then by length, after all scalar values.

use std::cmp::Ordering;
use tracing::trace;

use crate::record::{SortValue, Sortable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

/// Header styling of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    NotActive,
    ActiveAscending,
    ActiveDescending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub active_key: Option<K>,
    pub direction: Direction,
}

impl<K> Default for SortState<K> {
    fn default() -> Self {
        SortState {
            active_key: None,
            direction: Direction::Ascending,
        }
    }
}

impl<K: Copy + Eq> SortState<K> {
    /// Applies a sort request: a new key starts ascending, the active key toggles.
    pub fn request(&mut self, key: K) {
        if self.active_key == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.active_key = Some(key);
            self.direction = Direction::Ascending;
        }
    }

    pub fn class_for_column(&self, key: K) -> ColumnClass {
        match (self.active_key, self.direction) {
            (Some(active), Direction::Ascending) if active == key => ColumnClass::ActiveAscending,
            (Some(active), Direction::Descending) if active == key => {
                ColumnClass::ActiveDescending
            }
            _ => ColumnClass::NotActive,
        }
    }
}

// Canonical form of a SortValue. Ordering over this enum is total.
#[derive(Debug)]
enum SortKey<'a> {
    Numeric(f64),
    Text(&'a str),
    Series(&'a [f64]),
}

impl<'a> From<SortValue<'a>> for SortKey<'a> {
    fn from(value: SortValue<'a>) -> Self {
        match value {
            SortValue::Number(n) => SortKey::Numeric(canonical(n)),
            SortValue::Text(s) => match parse_numeric(s) {
                Some(n) => SortKey::Numeric(canonical(n)),
                None => SortKey::Text(s),
            },
            SortValue::Series(s) => SortKey::Series(s),
        }
    }
}

// Folds the values total_cmp would tell apart but that are numerically equal
fn canonical(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else if n.is_nan() {
        f64::NAN.copysign(1.0)
    } else {
        n
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok()
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Numeric(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Series(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Numeric(a), SortKey::Numeric(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Series(a), SortKey::Series(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| canonical(*x).total_cmp(&canonical(*y)))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Records of one view together with their sort state.
#[derive(Debug, Clone)]
pub struct SortManager<R: Sortable> {
    items: Vec<R>,
    rows: Vec<usize>, // Mapping of view row index to item index
    state: SortState<R::Key>,
}

impl<R: Sortable> SortManager<R> {
    pub fn new(items: Vec<R>) -> Self {
        let rows = (0..items.len()).collect();
        SortManager {
            items,
            rows,
            state: SortState::default(),
        }
    }

    /// Sorts by `key`, or flips the direction if `key` is already active.
    pub fn request_sort(&mut self, key: R::Key) {
        self.state.request(key);
        trace!("Sort request {:?} => {:?}", key, self.state.direction);
        self.resort();
    }

    /// Replaces the records and reorders them by the current sort state.
    pub fn replace_items(&mut self, items: Vec<R>) {
        self.items = items;
        self.resort();
    }

    pub fn state(&self) -> SortState<R::Key> {
        self.state
    }

    pub fn class_for_column(&self, key: R::Key) -> ColumnClass {
        self.state.class_for_column(key)
    }

    /// Records in their original input order.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    /// Records in sorted order.
    pub fn sorted_items(&self) -> impl DoubleEndedIterator<Item = &R> + ExactSizeIterator + '_ {
        self.rows.iter().map(|&idx| &self.items[idx])
    }

    /// Record shown at `row` of the sorted view.
    pub fn get(&self, row: usize) -> Option<&R> {
        self.rows.get(row).map(|&idx| &self.items[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn resort(&mut self) {
        let mut rows: Vec<usize> = (0..self.items.len()).collect();
        if let Some(key) = self.state.active_key {
            let keys: Vec<SortKey<'_>> = self
                .items
                .iter()
                .map(|item| SortKey::from(item.sort_value(key)))
                .collect();
            // slice::sort_by is stable, ties keep their input order
            match self.state.direction {
                Direction::Ascending => rows.sort_by(|&a, &b| keys[a].compare(&keys[b])),
                Direction::Descending => rows.sort_by(|&a, &b| keys[b].compare(&keys[a])),
            }
        }
        self.rows = rows;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        v: f64,
        label: &'static str,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        Id,
        V,
        Label,
    }

    impl Sortable for Row {
        type Key = Key;

        fn sort_value(&self, key: Key) -> SortValue<'_> {
            match key {
                Key::Id => SortValue::Number(self.id as f64),
                Key::V => SortValue::Number(self.v),
                Key::Label => SortValue::Text(self.label),
            }
        }
    }

    fn row(id: u32, v: f64) -> Row {
        Row { id, v, label: "" }
    }

    fn ids(manager: &SortManager<Row>) -> Vec<u32> {
        manager.sorted_items().map(|r| r.id).collect()
    }

    fn compare_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
        SortKey::from(a).compare(&SortKey::from(b))
    }

    fn sample() -> Vec<Row> {
        vec![
            row(1, 4.0),
            row(2, -1.0),
            row(3, 4.0),
            row(4, 10.5),
            row(5, -1.0),
            row(6, 0.0),
            row(7, 4.0),
        ]
    }

    #[test]
    fn without_active_key_items_pass_through() {
        let manager = SortManager::new(sample());
        assert_eq!(manager.state().active_key, None);
        assert_eq!(
            manager.sorted_items().cloned().collect::<Vec<_>>(),
            sample()
        );
        assert_eq!(manager.items(), sample().as_slice());
    }

    #[test]
    fn ties_keep_input_order() {
        let mut manager = SortManager::new(vec![row(1, 5.0), row(2, 3.0), row(3, 3.0)]);

        manager.request_sort(Key::V);
        assert_eq!(ids(&manager), vec![2, 3, 1]);

        manager.request_sort(Key::V);
        assert_eq!(manager.state().direction, Direction::Descending);
        assert_eq!(ids(&manager), vec![1, 2, 3]);
    }

    #[test]
    fn ascending_is_non_decreasing_and_stable() {
        let mut manager = SortManager::new(sample());
        manager.request_sort(Key::V);

        let sorted: Vec<&Row> = manager.sorted_items().collect();
        assert!(sorted.windows(2).all(|w| w[0].v <= w[1].v));
        assert_eq!(ids(&manager), vec![2, 5, 6, 1, 3, 7, 4]);
    }

    #[test]
    fn descending_is_non_increasing_and_stable() {
        let mut manager = SortManager::new(sample());
        manager.request_sort(Key::V);
        manager.request_sort(Key::V);

        let sorted: Vec<&Row> = manager.sorted_items().collect();
        assert!(sorted.windows(2).all(|w| w[0].v >= w[1].v));
        // Equal values stay in input order in both directions
        assert_eq!(ids(&manager), vec![4, 1, 3, 7, 6, 2, 5]);
    }

    #[test]
    fn toggle_reverses_when_keys_are_unique() {
        let mut manager = SortManager::new(sample());
        manager.request_sort(Key::Id);
        let ascending = ids(&manager);
        manager.request_sort(Key::Id);
        let mut descending = ids(&manager);
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn new_key_restarts_ascending() {
        let mut manager = SortManager::new(sample());
        manager.request_sort(Key::V);
        manager.request_sort(Key::V);
        manager.request_sort(Key::Id);
        let state = manager.state();
        assert_eq!(state.active_key, Some(Key::Id));
        assert_eq!(state.direction, Direction::Ascending);
        assert_eq!(ids(&manager), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn class_for_column_marks_only_active_key() {
        let mut manager = SortManager::new(sample());
        assert_eq!(manager.class_for_column(Key::V), ColumnClass::NotActive);

        manager.request_sort(Key::V);
        assert_eq!(manager.class_for_column(Key::V), ColumnClass::ActiveAscending);
        assert_eq!(manager.class_for_column(Key::Id), ColumnClass::NotActive);
        assert_eq!(manager.class_for_column(Key::Label), ColumnClass::NotActive);

        manager.request_sort(Key::V);
        assert_eq!(manager.class_for_column(Key::V), ColumnClass::ActiveDescending);
        assert_eq!(manager.class_for_column(Key::Id), ColumnClass::NotActive);
    }

    #[test]
    fn text_compares_case_sensitive() {
        let rows = vec![
            Row { id: 1, v: 0.0, label: "alpha" },
            Row { id: 2, v: 0.0, label: "Zeta" },
            Row { id: 3, v: 0.0, label: "beta" },
            Row { id: 4, v: 0.0, label: "Alpha" },
        ];
        let mut manager = SortManager::new(rows);
        manager.request_sort(Key::Label);
        assert_eq!(ids(&manager), vec![4, 2, 1, 3]);
    }

    #[test]
    fn numeric_text_is_coerced() {
        let rows = vec![
            Row { id: 1, v: 0.0, label: "10" },
            Row { id: 2, v: 0.0, label: "abc" },
            Row { id: 3, v: 0.0, label: "9" },
            Row { id: 4, v: 0.0, label: " 9.5 " },
            Row { id: 5, v: 0.0, label: "NaN" },
        ];
        let mut manager = SortManager::new(rows);
        manager.request_sort(Key::Label);
        // Numbers first, non-numeric text afterwards by byte order
        assert_eq!(ids(&manager), vec![3, 4, 1, 5, 2]);
    }

    #[test]
    fn mixed_values_compare_by_coercion_rule() {
        use SortValue::*;
        assert_eq!(compare_values(Number(3.0), Text("3")), Ordering::Equal);
        assert_eq!(compare_values(Number(3.0), Text("10")), Ordering::Less);
        assert_eq!(compare_values(Number(1e9), Text("abc")), Ordering::Less);
        assert_eq!(compare_values(Text("abc"), Number(1.0)), Ordering::Greater);
        assert_eq!(
            compare_values(Series(&[1.0, 2.0]), Series(&[1.0, 3.0])),
            Ordering::Less
        );
        assert_eq!(
            compare_values(Series(&[1.0, 2.0]), Series(&[1.0])),
            Ordering::Greater
        );
        assert_eq!(compare_values(Series(&[]), Text("zzz")), Ordering::Greater);
        assert_eq!(compare_values(Number(f64::NAN), Number(f64::INFINITY)), Ordering::Greater);
        assert_eq!(compare_values(Number(-0.0), Number(0.0)), Ordering::Equal);
        assert_eq!(compare_values(Text("-0"), Number(0.0)), Ordering::Equal);
        assert_eq!(
            compare_values(Series(&[-0.0, 1.0]), Series(&[0.0, 1.0])),
            Ordering::Equal
        );
    }

    #[test]
    fn signed_zeros_are_ties() {
        let mut manager = SortManager::new(vec![row(1, 0.0), row(2, -0.0), row(3, -1.0)]);

        manager.request_sort(Key::V);
        assert_eq!(ids(&manager), vec![3, 1, 2]);

        manager.request_sort(Key::V);
        assert_eq!(ids(&manager), vec![1, 2, 3]);
    }

    #[test]
    fn nan_sorts_last_whatever_its_sign() {
        let negative_nan = -f64::NAN;
        let mut manager = SortManager::new(vec![
            row(1, negative_nan),
            row(2, f64::NEG_INFINITY),
            row(3, f64::NAN),
            row(4, f64::INFINITY),
        ]);
        manager.request_sort(Key::V);
        assert_eq!(ids(&manager), vec![2, 4, 1, 3]);

        manager.request_sort(Key::V);
        assert_eq!(ids(&manager), vec![1, 3, 4, 2]);
    }

    #[test]
    fn replace_items_keeps_sort_state() {
        let mut manager = SortManager::new(sample());
        manager.request_sort(Key::V);
        manager.request_sort(Key::V);

        manager.replace_items(vec![row(10, 1.0), row(11, 3.0), row(12, 2.0)]);
        assert_eq!(manager.state().direction, Direction::Descending);
        assert_eq!(ids(&manager), vec![11, 12, 10]);
        assert_eq!(manager.get(0).map(|r| r.id), Some(11));
        assert_eq!(manager.get(3), None);
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn empty_input_is_total() {
        let mut manager: SortManager<Row> = SortManager::new(Vec::new());
        manager.request_sort(Key::V);
        assert!(manager.is_empty());
        assert_eq!(manager.sorted_items().count(), 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn value() -> impl Strategy<Value = f64> {
            prop_oneof![
                Just(0.0),
                Just(-0.0),
                (-3i32..3).prop_map(f64::from),
                -1e6f64..1e6,
            ]
        }

        // Ids are input positions, so input order among ties is id order
        fn rows(values: &[f64]) -> Vec<Row> {
            values
                .iter()
                .enumerate()
                .map(|(idx, &v)| row(idx as u32, v))
                .collect()
        }

        fn sorted(values: &[f64], requests: usize) -> Vec<Row> {
            let mut manager = SortManager::new(rows(values));
            for _ in 0..requests {
                manager.request_sort(Key::V);
            }
            manager.sorted_items().cloned().collect()
        }

        proptest! {
            #[test]
            fn prop_unsorted_view_passes_through(
                values in prop::collection::vec(value(), 0..40)
            ) {
                prop_assert_eq!(sorted(&values, 0), rows(&values));
            }

            #[test]
            fn prop_ascending_is_ordered_and_stable(
                values in prop::collection::vec(value(), 0..40)
            ) {
                let result = sorted(&values, 1);
                prop_assert_eq!(result.len(), values.len());
                for pair in result.windows(2) {
                    prop_assert!(pair[0].v <= pair[1].v, "{} > {}", pair[0].v, pair[1].v);
                    if pair[0].v == pair[1].v {
                        prop_assert!(pair[0].id < pair[1].id);
                    }
                }
            }

            #[test]
            fn prop_descending_is_ordered_and_stable(
                values in prop::collection::vec(value(), 0..40)
            ) {
                let result = sorted(&values, 2);
                prop_assert_eq!(result.len(), values.len());
                for pair in result.windows(2) {
                    prop_assert!(pair[0].v >= pair[1].v, "{} < {}", pair[0].v, pair[1].v);
                    if pair[0].v == pair[1].v {
                        prop_assert!(pair[0].id < pair[1].id);
                    }
                }
            }

            #[test]
            fn prop_toggle_reverses_groups_of_ties(
                values in prop::collection::vec(value(), 0..40)
            ) {
                let ascending = sorted(&values, 1);
                let expected: Vec<u32> = ascending
                    .chunk_by(|a, b| a.v == b.v)
                    .rev()
                    .flatten()
                    .map(|r| r.id)
                    .collect();
                let descending: Vec<u32> = sorted(&values, 2).iter().map(|r| r.id).collect();
                prop_assert_eq!(descending, expected);
                prop_assert_eq!(sorted(&values, 3), ascending);
            }
        }
    }
}

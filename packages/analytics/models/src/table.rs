//! Frequency and cross-tabulation tables.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

/// Sort order of a [`FrequencyTable`]. A table never mixes the two.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TableOrder {
    /// Highest count first; equal counts by ascending key.
    CountDescending,
    /// Ascending key (chronological / ordinal).
    KeyAscending,
}

/// One `(key, count)` row. A `None` key is the "unknown" bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyEntry<K> {
    /// Group key, `None` when the grouped field was absent.
    pub key: Option<K>,
    /// Number of records in the group.
    pub count: u64,
}

/// Ordered result of a group-by-count query.
///
/// Keys are unique. The unknown bucket (`None`) sorts before every known
/// key, both in ascending tables and as a tie-break in ranked ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyTable<K> {
    order: TableOrder,
    entries: Vec<FrequencyEntry<K>>,
}

impl<K: Ord> FrequencyTable<K> {
    /// Builds a table in the given order.
    ///
    /// `counts` must not repeat a key.
    #[must_use]
    pub fn sorted(
        order: TableOrder,
        counts: impl IntoIterator<Item = (Option<K>, u64)>,
    ) -> Self {
        let mut entries: Vec<FrequencyEntry<K>> = counts
            .into_iter()
            .map(|(key, count)| FrequencyEntry { key, count })
            .collect();

        match order {
            TableOrder::CountDescending => {
                entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
            }
            TableOrder::KeyAscending => entries.sort_by(|a, b| a.key.cmp(&b.key)),
        }

        Self { order, entries }
    }

    /// Builds a table ordered by descending count, ties broken by
    /// ascending key.
    #[must_use]
    pub fn ranked(counts: impl IntoIterator<Item = (Option<K>, u64)>) -> Self {
        Self::sorted(TableOrder::CountDescending, counts)
    }

    /// Builds a table ordered by ascending key.
    #[must_use]
    pub fn ordinal(counts: impl IntoIterator<Item = (Option<K>, u64)>) -> Self {
        Self::sorted(TableOrder::KeyAscending, counts)
    }
}

impl<K> FrequencyTable<K> {
    /// Sort order of this table.
    #[must_use]
    pub const fn order(&self) -> TableOrder {
        self.order
    }

    /// Rows in table order.
    #[must_use]
    pub fn entries(&self) -> &[FrequencyEntry<K>] {
        &self.entries
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = Option<&K>> {
        self.entries.iter().map(|e| e.key.as_ref())
    }

    /// Count for `key`, zero when the key was never observed.
    #[must_use]
    pub fn count_of<Q>(&self, key: Option<&Q>) -> u64
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.entries
            .iter()
            .find(|e| e.key.as_ref().map(Borrow::<Q>::borrow) == key)
            .map_or(0, |e| e.count)
    }

    /// Keeps only the first `n` rows.
    pub fn truncate(&mut self, n: usize) {
        self.entries.truncate(n);
    }

    /// Converts every key, keeping row order.
    ///
    /// `f` must preserve key ordering for the table order to stay valid
    /// (e.g. borrowed-to-owned conversions).
    #[must_use]
    pub fn map_keys<U>(self, mut f: impl FnMut(K) -> U) -> FrequencyTable<U> {
        FrequencyTable {
            order: self.order,
            entries: self
                .entries
                .into_iter()
                .map(|e| FrequencyEntry {
                    key: e.key.map(&mut f),
                    count: e.count,
                })
                .collect(),
        }
    }
}

/// Composite `(report hour, crime category)` key.
///
/// Orders by hour first, then category with the unknown category first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCategory<C = String> {
    /// Report hour (0-23).
    pub hour: u32,
    /// Crime category, `None` for the unknown bucket.
    pub category: Option<C>,
}

/// Dense count matrix over a fixed row domain and column domain.
///
/// Every `(row, column)` pair has a cell; pairs never observed hold zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossTable {
    row_labels: Vec<Option<String>>,
    column_labels: Vec<u32>,
    cells: Vec<Vec<u64>>,
}

impl CrossTable {
    /// Creates an all-zero matrix.
    #[must_use]
    pub fn zeroed(row_labels: Vec<Option<String>>, column_labels: Vec<u32>) -> Self {
        let cells = vec![vec![0; column_labels.len()]; row_labels.len()];
        Self {
            row_labels,
            column_labels,
            cells,
        }
    }

    /// Row labels (`None` is the unknown category).
    #[must_use]
    pub fn row_labels(&self) -> &[Option<String>] {
        &self.row_labels
    }

    /// Column labels.
    #[must_use]
    pub fn column_labels(&self) -> &[u32] {
        &self.column_labels
    }

    /// Matrix rows in row-label order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u64>] {
        &self.cells
    }

    /// Cell at `(row, column)` by position.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<u64> {
        self.cells.get(row)?.get(column).copied()
    }

    /// Cell by labels. `None` when either label is outside the domain.
    #[must_use]
    pub fn cell(&self, row_label: Option<&str>, column_label: u32) -> Option<u64> {
        let row = self
            .row_labels
            .iter()
            .position(|l| l.as_deref() == row_label)?;
        let column = self.column_labels.iter().position(|&c| c == column_label)?;
        self.get(row, column)
    }

    /// Overwrites the cell at `(row, column)`. Out-of-range positions are
    /// ignored.
    pub fn set(&mut self, row: usize, column: usize, count: u64) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = count;
        }
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }
}

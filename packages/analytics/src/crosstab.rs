//! Crime-type × hour cross-tabulation.
//!
//! Densifies the sparse `(hour, category)` counts into a matrix whose rows
//! are a pre-selected list of top categories and whose columns are the 24
//! hours. Categories outside that list are dropped, so row totals
//! undercount the full data set; the matrix is a visualization aid, not a
//! total-preserving aggregate.

use std::collections::HashMap;

use crime_stats_analytics_models::{CrossTable, FrequencyTable, HOURS_PER_DAY, HourCategory};

/// Builds the dense top-category × hour matrix.
///
/// Row `i` is the `i`-th key of `top_categories`; column `h` is hour `h`.
/// Combinations absent from `composite` stay zero.
#[must_use]
pub fn cross_tabulate(
    composite: &FrequencyTable<HourCategory>,
    top_categories: &FrequencyTable<String>,
) -> CrossTable {
    let row_labels: Vec<Option<String>> = top_categories
        .keys()
        .map(Option::<&String>::cloned)
        .collect();
    let rows: HashMap<Option<String>, usize> = row_labels
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, label)| (label, i))
        .collect();

    let mut table = CrossTable::zeroed(row_labels, (0..HOURS_PER_DAY).collect());
    let mut dropped: u64 = 0;

    for entry in composite.entries() {
        let Some(key) = &entry.key else {
            continue;
        };
        match rows.get(&key.category) {
            Some(&row) if key.hour < HOURS_PER_DAY => {
                table.set(row, key.hour as usize, entry.count);
            }
            _ => dropped += entry.count,
        }
    }

    if dropped > 0 {
        log::debug!("Cross-tabulation left out {dropped} record(s) outside the top categories");
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite(rows: &[(u32, Option<&str>, u64)]) -> FrequencyTable<HourCategory> {
        FrequencyTable::ranked(rows.iter().map(|(hour, category, count)| {
            (
                Some(HourCategory {
                    hour: *hour,
                    category: category.map(str::to_owned),
                }),
                *count,
            )
        }))
    }

    fn categories(keys: &[(Option<&str>, u64)]) -> FrequencyTable<String> {
        FrequencyTable::ranked(keys.iter().map(|(k, c)| (k.map(str::to_owned), *c)))
    }

    #[test]
    fn places_counts_by_category_rank_and_hour() {
        let table = cross_tabulate(
            &composite(&[(14, Some("Theft"), 2), (9, Some("Assault"), 1)]),
            &categories(&[(Some("Theft"), 2), (Some("Assault"), 1)]),
        );

        assert_eq!(table.row_labels().len(), 2);
        assert_eq!(table.column_labels().len(), 24);
        assert_eq!(table.get(0, 14), Some(2));
        assert_eq!(table.get(1, 9), Some(1));
        assert_eq!(table.cell(Some("Theft"), 14), Some(2));
        assert_eq!(table.cell(Some("Assault"), 9), Some(1));
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn categories_outside_top_list_are_dropped() {
        let table = cross_tabulate(
            &composite(&[(3, Some("Theft"), 4), (3, Some("Arson"), 10)]),
            &categories(&[(Some("Theft"), 4)]),
        );
        assert_eq!(table.row_labels(), &[Some("Theft".to_owned())]);
        assert_eq!(table.total(), 4);
        assert_eq!(table.cell(Some("Arson"), 3), None);
    }

    #[test]
    fn unknown_category_can_be_a_row() {
        let table = cross_tabulate(
            &composite(&[(0, None, 5)]),
            &categories(&[(None, 5)]),
        );
        assert_eq!(table.cell(None, 0), Some(5));
    }

    #[test]
    fn empty_inputs_give_empty_matrix() {
        let table = cross_tabulate(&composite(&[]), &categories(&[]));
        assert!(table.rows().is_empty());
        assert_eq!(table.column_labels().len(), 24);
    }

    #[test]
    fn top_rows_without_hour_data_are_all_zero() {
        let table = cross_tabulate(&composite(&[]), &categories(&[(Some("Theft"), 3)]));
        assert_eq!(table.rows(), &[vec![0_u64; 24]]);
    }
}

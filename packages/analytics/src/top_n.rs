//! Top-N selection over count-ranked tables.

use crime_stats_analytics_models::{FrequencyTable, TableOrder};

use crate::AnalyticsError;

/// Keeps the `n` highest-count rows of a count-ranked table.
///
/// A table with `n` or fewer rows is returned unchanged.
///
/// # Errors
///
/// Returns [`AnalyticsError::UnrankedTable`] if `table` is ordered by key;
/// truncating it would keep the lowest keys, not the largest counts.
pub fn top_n<K>(mut table: FrequencyTable<K>, n: usize) -> Result<FrequencyTable<K>, AnalyticsError> {
    if table.order() != TableOrder::CountDescending {
        return Err(AnalyticsError::UnrankedTable {
            order: table.order(),
        });
    }
    table.truncate(n);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(len: u64) -> FrequencyTable<u64> {
        FrequencyTable::ranked((0..len).map(|k| (Some(k), k % 7 + 1)))
    }

    #[test]
    fn short_table_is_unchanged() {
        let original = table(15);
        assert_eq!(top_n(original.clone(), 15).unwrap(), original);
        let original = table(3);
        assert_eq!(top_n(original.clone(), 15).unwrap(), original);
    }

    #[test]
    fn long_table_keeps_largest_counts() {
        let original = table(40);
        let top = top_n(original.clone(), 15).unwrap();
        assert_eq!(top.len(), 15);

        let min_kept = top.entries().iter().map(|e| e.count).min().unwrap();
        let max_dropped = original.entries()[15..].iter().map(|e| e.count).max().unwrap();
        assert!(min_kept >= max_dropped);
    }

    #[test]
    fn ordinal_table_is_rejected() {
        let ordinal = FrequencyTable::ordinal([(Some(1), 5), (Some(2), 9)]);
        assert!(matches!(
            top_n(ordinal, 1),
            Err(AnalyticsError::UnrankedTable {
                order: TableOrder::KeyAscending
            })
        ));
    }
}

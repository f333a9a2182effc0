//! Percentage share of ranked entries.

use crime_stats_analytics_models::{FrequencyTable, ShareEntry};

/// Each row's percentage of the table total.
///
/// Applied to a top-N table this is the share of the top-N total, not of
/// all records. A zero total yields no rows.
#[must_use]
pub fn shares(table: &FrequencyTable<String>) -> Vec<ShareEntry> {
    let total = table.total();
    if total == 0 {
        return Vec::new();
    }

    table
        .entries()
        .iter()
        .map(|e| ShareEntry {
            key: e.key.clone(),
            count: e.count,
            #[allow(clippy::cast_precision_loss)]
            percent: e.count as f64 / total as f64 * 100.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_one_hundred() {
        let table = FrequencyTable::ranked([
            (Some("North".to_owned()), 3),
            (Some("South".to_owned()), 1),
        ]);
        let shares = shares(&table);
        assert_eq!(shares.len(), 2);
        assert!((shares[0].percent - 75.0).abs() < 1e-9);
        assert!((shares[1].percent - 25.0).abs() < 1e-9);
        let sum: f64 = shares.iter().map(|s| s.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_table_has_no_shares() {
        assert!(shares(&FrequencyTable::<String>::ranked([])).is_empty());
    }
}

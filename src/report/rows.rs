//! Combining grouped query results into report rows.

use std::collections::HashMap;

use serde::Serialize;

use crate::money::Pence;

/// The label used for rows that have no label.
pub const DEFAULT_LABEL: &str = "Unknown";

/// The label used for donations with no recorded channel.
pub const DEFAULT_CHANNEL_LABEL: &str = "UNSPECIFIED";

/// One row of a grouped query, before merging.
///
/// Every column may be missing: a `GROUP BY` over a nullable column yields a
/// `NULL` label and `SUM` over no rows yields `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReportRow {
    /// The group the row totals, `None` when the column was NULL.
    pub label: Option<String>,
    /// The summed amount, `None` when the group summed no rows.
    pub amount_pence: Option<Pence>,
    /// The number of donations in the group.
    pub count: Option<i64>,
}

/// A labelled total in a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// The display name of the group.
    pub label: String,
    /// The amount raised for the group.
    pub amount_pence: Pence,
    /// The number of donations in the group.
    pub count: i64,
}

impl From<ReportRow> for RawReportRow {
    fn from(row: ReportRow) -> Self {
        Self {
            label: Some(row.label),
            amount_pence: Some(row.amount_pence),
            count: Some(row.count),
        }
    }
}

/// Merge `rows` from any number of grouped queries into one row per label.
///
/// Missing or blank labels are replaced with `default_label`, and missing
/// amounts and counts count as zero. The result is sorted by amount, largest
/// first. Rows with the same amount keep the order their labels were first seen in.
pub fn merge_rows(
    rows: impl IntoIterator<Item = RawReportRow>,
    default_label: &str,
) -> Vec<ReportRow> {
    let mut merged: Vec<ReportRow> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let label = row
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| default_label.to_owned());
        let amount_pence = row.amount_pence.unwrap_or(0);
        let count = row.count.unwrap_or(0);

        match index_by_label.get(&label) {
            Some(&index) => {
                merged[index].amount_pence += amount_pence;
                merged[index].count += count;
            }
            None => {
                index_by_label.insert(label.clone(), merged.len());
                merged.push(ReportRow {
                    label,
                    amount_pence,
                    count,
                });
            }
        }
    }

    // `sort_by` is stable, so ties stay in first-seen order.
    merged.sort_by(|a, b| b.amount_pence.cmp(&a.amount_pence));

    merged
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_CHANNEL_LABEL, DEFAULT_LABEL, RawReportRow, ReportRow, merge_rows};

    fn raw(label: Option<&str>, amount_pence: Option<i64>, count: Option<i64>) -> RawReportRow {
        RawReportRow {
            label: label.map(str::to_owned),
            amount_pence,
            count,
        }
    }

    fn row(label: &str, amount_pence: i64, count: i64) -> ReportRow {
        ReportRow {
            label: label.to_owned(),
            amount_pence,
            count,
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(merge_rows(Vec::new(), DEFAULT_LABEL), Vec::new());
    }

    #[test]
    fn merges_rows_with_the_same_label() {
        let got = merge_rows(
            vec![
                raw(Some("ZAKAT"), Some(5_000), Some(2)),
                raw(Some("GENERAL"), Some(1_000), Some(1)),
                raw(Some("ZAKAT"), Some(2_500), Some(1)),
            ],
            DEFAULT_LABEL,
        );

        assert_eq!(got, vec![row("ZAKAT", 7_500, 3), row("GENERAL", 1_000, 1)]);
    }

    #[test]
    fn missing_and_blank_labels_use_default() {
        let got = merge_rows(
            vec![
                raw(None, Some(300), Some(1)),
                raw(Some(""), Some(200), Some(1)),
                raw(Some("  "), Some(100), Some(1)),
                raw(Some("WEBSITE"), Some(50), Some(1)),
            ],
            DEFAULT_CHANNEL_LABEL,
        );

        assert_eq!(
            got,
            vec![row("UNSPECIFIED", 600, 3), row("WEBSITE", 50, 1)]
        );
    }

    #[test]
    fn missing_amounts_and_counts_are_zero() {
        let got = merge_rows(
            vec![
                raw(Some("CASH"), None, None),
                raw(Some("CASH"), Some(1_200), None),
                raw(Some("CARD"), None, Some(4)),
            ],
            DEFAULT_LABEL,
        );

        assert_eq!(got, vec![row("CASH", 1_200, 0), row("CARD", 0, 4)]);
    }

    #[test]
    fn sorts_by_amount_descending() {
        let got = merge_rows(
            vec![
                raw(Some("a"), Some(1), Some(1)),
                raw(Some("b"), Some(3), Some(1)),
                raw(Some("c"), Some(2), Some(1)),
            ],
            DEFAULT_LABEL,
        );

        let labels: Vec<_> = got.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "c", "a"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let got = merge_rows(
            vec![
                raw(Some("ORPHANS"), Some(500), Some(1)),
                raw(Some("WATER_WELL"), Some(900), Some(1)),
                raw(Some("HAFIZ"), Some(500), Some(1)),
                raw(Some("FAMILIES"), Some(500), Some(1)),
            ],
            DEFAULT_LABEL,
        );

        let labels: Vec<_> = got.iter().map(|row| row.label.as_str()).collect();
        assert_eq!(labels, vec!["WATER_WELL", "ORPHANS", "HAFIZ", "FAMILIES"]);
    }

    #[test]
    fn default_label_merges_with_explicit_default() {
        let got = merge_rows(
            vec![raw(Some("Unknown"), Some(10), Some(1)), raw(None, Some(5), Some(1))],
            DEFAULT_LABEL,
        );

        assert_eq!(got, vec![row("Unknown", 15, 2)]);
    }
}

//! Monthly aggregation
//!
//! Groups transactions by calendar month and assigns each month an index
//! counted from the earliest month present. Months without transactions are
//! left out of the output, but the index still counts them, so Jan and Mar
//! become 0 and 2.
//!
//! The index is re-based on every call: adding an older transaction shifts
//! every index.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{MonthlyTotal, TrainingPoint, Transaction, YearMonth};

/// Aggregate transactions into per-month totals, ordered by month
pub fn aggregate_monthly(transactions: &[Transaction]) -> Vec<MonthlyTotal> {
    let mut by_month: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    for tx in transactions {
        let entry = by_month.entry(tx.month()).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    // BTreeMap iterates in chronological order, so the first key is the minimum
    let Some(&min_month) = by_month.keys().next() else {
        return Vec::new();
    };

    let totals: Vec<MonthlyTotal> = by_month
        .into_iter()
        .map(|(month, (amount, transaction_count))| MonthlyTotal {
            month,
            amount,
            month_index: month.months_since(min_month),
            transaction_count,
        })
        .collect();

    debug!(
        "Aggregated {} transactions into {} months starting {}",
        transactions.len(),
        totals.len(),
        min_month
    );

    totals
}

/// Project monthly totals onto forecaster inputs
pub fn training_points(totals: &[MonthlyTotal]) -> Vec<TrainingPoint> {
    totals
        .iter()
        .map(|t| TrainingPoint {
            month_index: t.month_index,
            amount: t.amount,
        })
        .collect()
}

/// Number of distinct calendar months in the transaction set
pub fn distinct_months(transactions: &[Transaction]) -> usize {
    let mut months: Vec<YearMonth> = transactions.iter().map(Transaction::month).collect();
    months.sort_unstable();
    months.dedup();
    months.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::tx;

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(aggregate_monthly(&[]).is_empty());
    }

    #[test]
    fn test_single_month_has_index_zero() {
        let totals = aggregate_monthly(&[
            tx("2024-05-02", 10.0, "Groceries"),
            tx("2024-05-20", 15.5, "Transport"),
        ]);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].month_index, 0);
        assert_eq!(totals[0].amount, 25.5);
        assert_eq!(totals[0].transaction_count, 2);
    }

    #[test]
    fn test_gap_months_keep_true_distance() {
        let totals = aggregate_monthly(&[
            tx("2024-01-10", 100.0, "Rent"),
            tx("2024-03-10", 300.0, "Rent"),
        ]);
        let indices: Vec<i64> = totals.iter().map(|t| t.month_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_index_spans_year_boundary() {
        let totals = aggregate_monthly(&[
            tx("2023-11-30", 1.0, "Other"),
            tx("2024-02-01", 1.0, "Other"),
        ]);
        assert_eq!(totals[0].month.to_string(), "2023-11");
        assert_eq!(totals[1].month_index, 3);
    }

    #[test]
    fn test_order_independent() {
        let ordered = vec![
            tx("2024-01-05", 10.0, "Groceries"),
            tx("2024-02-05", 20.0, "Groceries"),
            tx("2024-02-25", 5.0, "Utilities"),
            tx("2024-06-01", 40.0, "Rent"),
        ];
        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        assert_eq!(aggregate_monthly(&ordered), aggregate_monthly(&shuffled));
    }

    #[test]
    fn test_indices_strictly_increasing() {
        let totals = aggregate_monthly(&[
            tx("2024-09-01", 1.0, "Other"),
            tx("2023-12-01", 1.0, "Other"),
            tx("2024-01-15", 1.0, "Other"),
            tx("2024-09-30", 1.0, "Other"),
        ]);
        let indices: Vec<i64> = totals.iter().map(|t| t.month_index).collect();
        assert_eq!(indices, vec![0, 1, 9]);
        for pair in totals.windows(2) {
            assert!(pair[0].month_index < pair[1].month_index);
        }
    }

    #[test]
    fn test_adding_older_month_rebases_index() {
        let mut transactions = vec![
            tx("2024-03-01", 1.0, "Other"),
            tx("2024-04-01", 1.0, "Other"),
        ];
        assert_eq!(aggregate_monthly(&transactions)[0].month_index, 0);

        transactions.push(tx("2024-01-01", 1.0, "Other"));
        let totals = aggregate_monthly(&transactions);
        let indices: Vec<i64> = totals.iter().map(|t| t.month_index).collect();
        assert_eq!(indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_training_points_projection() {
        let totals = aggregate_monthly(&[
            tx("2024-01-01", 100.0, "Other"),
            tx("2024-02-01", 200.0, "Other"),
        ]);
        let points = training_points(&totals);
        let expected: Vec<TrainingPoint> = vec![(0, 100.0).into(), (1, 200.0).into()];
        assert_eq!(points, expected);
    }

    #[test]
    fn test_distinct_months() {
        assert_eq!(distinct_months(&[]), 0);
        assert_eq!(
            distinct_months(&[
                tx("2024-01-01", 1.0, "Other"),
                tx("2024-01-31", 1.0, "Other"),
                tx("2025-01-01", 1.0, "Other"),
            ]),
            2
        );
    }
}

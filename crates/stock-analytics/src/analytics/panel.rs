//! Price and returns panels
//!
//! A panel is a time-indexed table with one column per symbol. Prices are
//! aligned on the union of all timestamps (outer join).

use std::collections::BTreeSet;

use crate::analytics::series::PriceSeries;
use crate::data::payload::ObservationKey;

/// Time-indexed table of optional values, one column per symbol
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    columns: Vec<String>,
    index: Vec<ObservationKey>,
    rows: Vec<Vec<Option<f64>>>,
}

impl Panel {
    /// Build a panel from raw parts, dropping rows that are entirely missing
    ///
    /// Every row must have one cell per column.
    pub fn from_rows(
        columns: Vec<String>,
        index: Vec<ObservationKey>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(index.len(), rows.len());
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));

        let (index, rows): (Vec<_>, Vec<_>) = index
            .into_iter()
            .zip(rows)
            .filter(|(_, row)| row.iter().any(Option::is_some))
            .unzip();

        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[ObservationKey] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// True when the panel has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of column `j`, missing included
    pub fn column(&self, j: usize) -> Vec<Option<f64>> {
        self.rows.iter().map(|row| row[j]).collect()
    }

    /// Non-missing values of column `j` in row order
    pub fn valid_values(&self, j: usize) -> Vec<f64> {
        self.rows.iter().filter_map(|row| row[j]).collect()
    }

    /// Row-over-row simple returns, `value[t] / value[t-1] - 1`
    ///
    /// A missing value on either side, or a zero previous value, gives a
    /// missing return. Nothing is forward-filled. The first row has no
    /// predecessor, and rows where every return is missing are dropped.
    pub fn pct_change(&self) -> Panel {
        let mut index = Vec::with_capacity(self.rows.len().saturating_sub(1));
        let mut rows = Vec::with_capacity(index.capacity());

        for (t, pair) in self.rows.windows(2).enumerate() {
            let (prev, cur) = (&pair[0], &pair[1]);
            let row = prev
                .iter()
                .zip(cur)
                .map(|(p, c)| match (p, c) {
                    (Some(p), Some(c)) if *p != 0.0 => Some(c / p - 1.0),
                    _ => None,
                })
                .collect();
            index.push(self.index[t + 1]);
            rows.push(row);
        }

        Panel::from_rows(self.columns.clone(), index, rows)
    }
}

/// Collects per-symbol series into a price panel
///
/// Columns keep the order in which symbols were first inserted. Inserting a
/// series whose name is already present replaces the earlier data in place.
#[derive(Debug, Default)]
pub struct PanelBuilder {
    series: Vec<PriceSeries>,
}

impl PanelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series, keyed by its name
    pub fn insert(&mut self, series: PriceSeries) -> &mut Self {
        match self.series.iter_mut().find(|s| s.name() == series.name()) {
            Some(slot) => *slot = series,
            None => self.series.push(series),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Outer-join every series on the union of their timestamps
    pub fn build(&self) -> Panel {
        let index: BTreeSet<ObservationKey> = self
            .series
            .iter()
            .flat_map(|s| s.points().iter().map(|(k, _)| *k))
            .collect();
        let index: Vec<ObservationKey> = index.into_iter().collect();

        let rows: Vec<Vec<Option<f64>>> = index
            .iter()
            .map(|key| self.series.iter().map(|s| s.get(key)).collect())
            .collect();
        let columns: Vec<String> = self.series.iter().map(|s| s.name().to_string()).collect();

        Panel::from_rows(columns, index, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> ObservationKey {
        ObservationKey::Time(
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn series(name: &str, values: &[(u32, Option<f64>)]) -> PriceSeries {
        PriceSeries::new(name, values.iter().map(|(d, v)| (day(*d), *v)))
    }

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-12)
    }

    #[test]
    fn test_outer_join_aligns_on_union() {
        let mut builder = PanelBuilder::new();
        builder
            .insert(series("AAA", &[(1, Some(10.0)), (2, Some(11.0))]))
            .insert(series("BBB", &[(2, Some(20.0)), (3, Some(21.0))]));
        let panel = builder.build();

        assert_eq!(panel.columns(), ["AAA", "BBB"]);
        assert_eq!(panel.index(), [day(1), day(2), day(3)]);
        assert_eq!(panel.column(0), vec![Some(10.0), Some(11.0), None]);
        assert_eq!(panel.column(1), vec![None, Some(20.0), Some(21.0)]);
    }

    #[test]
    fn test_all_missing_rows_dropped() {
        let mut builder = PanelBuilder::new();
        builder
            .insert(series("AAA", &[(1, Some(10.0)), (2, None)]))
            .insert(series("BBB", &[(1, Some(20.0)), (2, None)]));
        let panel = builder.build();

        assert_eq!(panel.n_rows(), 1);
        assert_eq!(panel.index(), [day(1)]);
    }

    #[test]
    fn test_duplicate_symbol_collapses_to_one_column() {
        let mut builder = PanelBuilder::new();
        builder
            .insert(series("AAA", &[(1, Some(1.0))]))
            .insert(series("BBB", &[(1, Some(2.0))]))
            .insert(series("AAA", &[(1, Some(3.0))]));
        let panel = builder.build();

        assert_eq!(panel.columns(), ["AAA", "BBB"]);
        assert_eq!(panel.column(0), vec![Some(3.0)]);
    }

    #[test]
    fn test_empty_builder_gives_empty_panel() {
        let panel = PanelBuilder::new().build();
        assert!(panel.is_empty());
        assert_eq!(panel.n_columns(), 0);
        assert!(panel.pct_change().is_empty());
    }

    #[test]
    fn test_pct_change_simple() {
        let mut builder = PanelBuilder::new();
        builder.insert(series("AAPL", &[(1, Some(100.0)), (2, Some(102.0)), (3, Some(101.0))]));
        let returns = builder.build().pct_change();

        assert_eq!(returns.index(), [day(2), day(3)]);
        let col = returns.column(0);
        assert!(approx(col[0], 0.02));
        assert!(approx(col[1], 101.0 / 102.0 - 1.0));
    }

    #[test]
    fn test_pct_change_gaps_propagate_without_fill() {
        // BBB is missing on day 2: both its day-2 and day-3 returns are missing
        // even though day 1 and day 3 prices exist.
        let mut builder = PanelBuilder::new();
        builder
            .insert(series("AAA", &[(1, Some(10.0)), (2, Some(11.0)), (3, Some(12.1))]))
            .insert(series("BBB", &[(1, Some(20.0)), (3, Some(22.0))]));
        let returns = builder.build().pct_change();

        assert_eq!(returns.n_rows(), 2);
        assert_eq!(returns.column(1), vec![None, None]);
        assert!(approx(returns.column(0)[1], 0.1));
    }

    #[test]
    fn test_pct_change_drops_rows_with_no_returns() {
        let mut builder = PanelBuilder::new();
        builder
            .insert(series("AAA", &[(1, Some(10.0)), (3, Some(11.0)), (4, Some(12.0))]))
            .insert(series("BBB", &[(2, Some(5.0)), (4, Some(6.0))]));
        let returns = builder.build().pct_change();

        // Day 2 and day 3 rows each straddle a gap in both columns.
        assert_eq!(returns.index(), [day(4)]);
        assert!(approx(returns.column(0)[0], 12.0 / 11.0 - 1.0));
        assert_eq!(returns.column(1), vec![None]);
    }

    #[test]
    fn test_pct_change_zero_previous_is_missing() {
        let mut builder = PanelBuilder::new();
        builder.insert(series("AAA", &[(1, Some(0.0)), (2, Some(1.0)), (3, Some(2.0))]));
        let returns = builder.build().pct_change();

        assert_eq!(returns.index(), [day(3)]);
        assert!(approx(returns.column(0)[0], 1.0));
    }

    #[test]
    fn test_valid_values_skip_missing() {
        let panel = Panel::from_rows(
            vec!["A".to_string()],
            vec![day(1), day(2), day(3)],
            vec![vec![Some(1.0)], vec![None], vec![Some(3.0)]],
        );
        // The all-missing middle row is dropped on construction.
        assert_eq!(panel.n_rows(), 2);
        assert_eq!(panel.valid_values(0), vec![1.0, 3.0]);
        assert_eq!(panel.column_index("A"), Some(0));
        assert_eq!(panel.column_index("B"), None);
    }
}

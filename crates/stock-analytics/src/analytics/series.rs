//! Series normalization

use std::collections::BTreeMap;

use crate::data::payload::{ObservationKey, RawSeries};

/// One symbol's prices in ascending time order with unique timestamps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    name: String,
    points: Vec<(ObservationKey, Option<f64>)>,
}

impl PriceSeries {
    /// Build a series from points in any order
    ///
    /// Points are sorted ascending; on duplicate timestamps the last one wins.
    pub fn new(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (ObservationKey, Option<f64>)>,
    ) -> Self {
        let unique: BTreeMap<ObservationKey, Option<f64>> = points.into_iter().collect();
        Self {
            name: name.into(),
            points: unique.into_iter().collect(),
        }
    }

    /// Normalize a validated payload, named after its symbol tag
    pub fn normalize(raw: RawSeries) -> Self {
        Self::new(
            raw.symbol.unwrap_or_default(),
            raw.points.into_iter().map(|p| (p.key, p.close)),
        )
    }

    /// Rename the series
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[(ObservationKey, Option<f64>)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `key`, `None` when absent or missing
    pub fn get(&self, key: &ObservationKey) -> Option<f64> {
        self.points
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .and_then(|i| self.points[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::payload::RawSeriesPoint;
    use chrono::NaiveDate;

    fn day(d: u32) -> ObservationKey {
        ObservationKey::Time(
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_empty_payload_gives_empty_series() {
        let series = PriceSeries::normalize(RawSeries::default());
        assert!(series.is_empty());
        assert_eq!(series.name(), "");
    }

    #[test]
    fn test_descending_input_is_sorted() {
        let raw = RawSeries {
            symbol: Some("AAPL".to_string()),
            points: vec![
                RawSeriesPoint { key: day(3), close: Some(3.0) },
                RawSeriesPoint { key: day(2), close: None },
                RawSeriesPoint { key: day(1), close: Some(1.0) },
            ],
        };
        let series = PriceSeries::normalize(raw);

        assert_eq!(series.name(), "AAPL");
        let keys: Vec<_> = series.points().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![day(1), day(2), day(3)]);
        assert_eq!(series.get(&day(2)), None);
        assert_eq!(series.get(&day(3)), Some(3.0));
    }

    #[test]
    fn test_duplicate_timestamp_last_wins() {
        let series = PriceSeries::new("X", vec![(day(1), Some(1.0)), (day(1), Some(5.0))]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(&day(1)), Some(5.0));
    }

    #[test]
    fn test_positional_keys_keep_given_order() {
        let series = PriceSeries::new(
            "X",
            vec![
                (ObservationKey::Position(0), Some(9.0)),
                (ObservationKey::Position(1), Some(4.0)),
            ],
        );
        let values: Vec<_> = series.points().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![Some(9.0), Some(4.0)]);
    }
}

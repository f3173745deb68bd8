//! Per-symbol risk/return statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::panel::Panel;

/// Trading days per year used to annualize daily volatility
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Interval tokens that denote daily sampling
const DAILY_INTERVALS: [&str; 3] = ["1day", "1D", "1d"];

/// Scalar statistics for one symbol; every field is null without price data
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetrics {
    /// Last non-missing price
    pub latest: Option<f64>,
    /// `latest / first - 1`, null when the first price is zero
    pub cumulative_return: Option<f64>,
    /// Return dispersion, annualized only for daily data
    pub volatility: Option<f64>,
    /// Mean return over its standard deviation, null when the deviation is zero
    pub sharpe: Option<f64>,
    /// 5th percentile of returns (historical one-period VaR at 95%)
    pub var_95: Option<f64>,
}

/// Whether an interval denotes daily granularity; no interval means daily
pub fn is_daily_interval(interval: Option<&str>) -> bool {
    interval.is_none_or(|i| DAILY_INTERVALS.contains(&i))
}

/// Metrics for every price column, keyed by column name
///
/// Each symbol uses its own non-missing prices and returns; gaps in other
/// columns never remove its observations.
pub fn compute_metrics(
    prices: &Panel,
    returns: &Panel,
    interval: Option<&str>,
) -> BTreeMap<String, SymbolMetrics> {
    let daily = is_daily_interval(interval);

    prices
        .columns()
        .iter()
        .enumerate()
        .map(|(j, symbol)| {
            let r = returns
                .column_index(symbol)
                .map(|k| returns.valid_values(k))
                .unwrap_or_default();
            (symbol.clone(), symbol_metrics(&prices.valid_values(j), &r, daily))
        })
        .collect()
}

/// Metrics from one symbol's non-missing prices and returns
pub fn symbol_metrics(prices: &[f64], returns: &[f64], daily: bool) -> SymbolMetrics {
    let (Some(&first), Some(&latest)) = (prices.first(), prices.last()) else {
        return SymbolMetrics::default();
    };

    let cumulative_return = (first != 0.0).then(|| latest / first - 1.0);

    let mean = mean(returns).unwrap_or(0.0);
    let std = population_std(returns).unwrap_or(0.0);

    let volatility = if daily && std != 0.0 {
        std * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        std
    };
    let sharpe = (std != 0.0).then(|| mean / std);

    SymbolMetrics {
        latest: Some(latest),
        cumulative_return: cumulative_return.filter(|v| v.is_finite()),
        volatility: Some(volatility).filter(|v| v.is_finite()),
        sharpe: sharpe.filter(|v| v.is_finite()),
        var_95: percentile(returns, 5.0).filter(|v| v.is_finite()),
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (ddof = 0), `None` for an empty slice
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Percentile with linear interpolation between closest ranks
///
/// `q` is in `[0, 100]`. `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

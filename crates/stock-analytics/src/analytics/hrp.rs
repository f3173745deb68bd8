//! Hierarchical Risk Parity allocation
//!
//! Columns are clustered on the correlation distance `sqrt((1 - ρ) / 2)`
//! with single linkage, ordered quasi-diagonally, and weighted by recursive
//! bisection on inverse-variance cluster risk. Weights are long-only and sum
//! to one.

use std::collections::BTreeMap;

use crate::analytics::cluster::single_linkage;
use crate::analytics::correlation::{correlation_matrix, covariance_matrix};
use crate::analytics::panel::Panel;
use crate::error::{Result, StockError};

/// HRP weights for every column of a returns panel
///
/// Fails with [`StockError::AllocationFailed`] when any pairwise correlation
/// or covariance is undefined (too few overlapping rows, or a column with
/// no variation).
pub fn hrp_weights(returns: &Panel) -> Result<BTreeMap<String, f64>> {
    let symbols = returns.columns();
    let n = symbols.len();
    if n == 0 {
        return Ok(BTreeMap::new());
    }

    let corr = correlation_matrix(returns);
    if let Some((a, b)) = corr.first_undefined() {
        return Err(StockError::AllocationFailed(format!(
            "correlation between {a} and {b} is undefined"
        )));
    }

    let cov = defined_covariance(returns)?;

    let mut dist = vec![vec![0.0; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        for (j, d) in row.iter_mut().enumerate() {
            let c = corr.get(i, j).unwrap_or(0.0);
            *d = (0.5 * (1.0 - c)).clamp(0.0, 1.0).sqrt();
        }
    }

    let order = single_linkage(&dist).leaf_order();
    let mut weights = vec![1.0; n];
    recursive_bisect(&order, &cov, &mut weights);

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return Err(StockError::AllocationFailed(
            "weights do not sum to a positive value".to_string(),
        ));
    }

    Ok(symbols
        .iter()
        .cloned()
        .zip(weights.into_iter().map(|w| w / total))
        .collect())
}

/// Equal weight `1/N` for each requested symbol
///
/// `N` counts every entry of `symbols`, so a repeated symbol still lowers the
/// weight of the others even though it appears only once in the result.
pub fn equal_weights(symbols: &[String]) -> BTreeMap<String, f64> {
    if symbols.is_empty() {
        return BTreeMap::new();
    }
    let w = 1.0 / symbols.len() as f64;
    symbols.iter().map(|s| (s.clone(), w)).collect()
}

fn defined_covariance(returns: &Panel) -> Result<Vec<Vec<f64>>> {
    let symbols = returns.columns();
    covariance_matrix(returns)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_iter()
                .enumerate()
                .map(|(j, c)| match c {
                    Some(v) if v.is_finite() && (i != j || v > 0.0) => Ok(v),
                    _ => Err(StockError::AllocationFailed(format!(
                        "covariance between {} and {} is undefined",
                        symbols[i], symbols[j]
                    ))),
                })
                .collect::<Result<Vec<f64>>>()
        })
        .collect()
}

/// Split the ordered leaves in half and share weight by inverse cluster risk
fn recursive_bisect(order: &[usize], cov: &[Vec<f64>], weights: &mut [f64]) {
    if order.len() <= 1 {
        return;
    }

    let mid = order.len() / 2;
    let (left, right) = order.split_at(mid);

    let var_left = cluster_variance(left, cov);
    let var_right = cluster_variance(right, cov);
    let alpha = 1.0 - var_left / (var_left + var_right);

    for &i in left {
        weights[i] *= alpha;
    }
    for &i in right {
        weights[i] *= 1.0 - alpha;
    }

    recursive_bisect(left, cov, weights);
    recursive_bisect(right, cov, weights);
}

/// Variance of the inverse-variance portfolio over `indices`
fn cluster_variance(indices: &[usize], cov: &[Vec<f64>]) -> f64 {
    let inv: Vec<f64> = indices.iter().map(|&i| 1.0 / cov[i][i]).collect();
    let total: f64 = inv.iter().sum();
    let w: Vec<f64> = inv.iter().map(|v| v / total).collect();

    let mut var = 0.0;
    for (a, &i) in indices.iter().enumerate() {
        for (b, &j) in indices.iter().enumerate() {
            var += w[a] * w[b] * cov[i][j];
        }
    }
    var
}

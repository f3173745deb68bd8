//! Pairwise return correlation and covariance

use std::collections::BTreeMap;

use crate::analytics::panel::Panel;

/// Correlation matrix over a panel's columns; `None` where undefined
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Raw entry `(i, j)`
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values[i][j]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// First pair with an undefined correlation, if any
    pub fn first_undefined(&self) -> Option<(&str, &str)> {
        let n = self.len();
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .find(|&(i, j)| self.values[i][j].is_none())
            .map(|(i, j)| (self.symbols[i].as_str(), self.symbols[j].as_str()))
    }

    /// Nested symbol → symbol → value map, undefined entries as `0.0`, every
    /// entry rounded to 4 decimals
    pub fn to_rounded_map(&self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let row = self
                    .symbols
                    .iter()
                    .enumerate()
                    .map(|(j, b)| (b.clone(), round4(self.values[i][j].unwrap_or(0.0))))
                    .collect();
                (a.clone(), row)
            })
            .collect()
    }
}

/// Round to 4 decimal places, ties to even
pub fn round4(value: f64) -> f64 {
    let rounded = (value * 10_000.0).round_ties_even() / 10_000.0;
    // Avoid serializing "-0.0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Pairwise-complete Pearson correlation of every column pair
///
/// Each pair uses only rows where both columns have a value, independent of
/// the other columns.
pub fn correlation_matrix(returns: &Panel) -> CorrelationMatrix {
    let n = returns.n_columns();
    let columns: Vec<Vec<Option<f64>>> = (0..n).map(|j| returns.column(j)).collect();

    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let c = if i == j {
                // A column is perfectly correlated with itself whenever it varies.
                pearson(&columns[i], &columns[i]).map(|_| 1.0)
            } else {
                pearson(&columns[i], &columns[j])
            };
            values[i][j] = c;
            values[j][i] = c;
        }
    }

    CorrelationMatrix {
        symbols: returns.columns().to_vec(),
        values,
    }
}

/// Pairwise-complete sample covariance (ddof = 1) of every column pair
///
/// Entries with fewer than two complete observations are `None`.
pub fn covariance_matrix(returns: &Panel) -> Vec<Vec<Option<f64>>> {
    let n = returns.n_columns();
    let columns: Vec<Vec<Option<f64>>> = (0..n).map(|j| returns.column(j)).collect();

    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let c = covariance(&columns[i], &columns[j]);
            values[i][j] = c;
            values[j][i] = c;
        }
    }
    values
}

fn complete_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

/// Pearson correlation over rows where both inputs are present
///
/// `None` when there is no complete row or either side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys) = complete_pairs(x, y);
    if xs.is_empty() {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in xs.iter().zip(&ys) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Sample covariance over rows where both inputs are present
pub fn covariance(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (xs, ys) = complete_pairs(x, y);
    if xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let s: f64 = xs.iter().zip(&ys).map(|(a, b)| (a - mx) * (b - my)).sum();
    Some(s / (n - 1.0))
}

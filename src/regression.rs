/*!
 * Ordinary least squares fit of a straight line.
 */
use crate::aggregate::CombinedRow;
use std::fmt::{self, Display};

/// Coefficients and goodness of fit for `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination. `None` when every y value is the same, since there is no
    /// variance to explain.
    pub r_squared: Option<f64>,
    /// Number of points in the fit.
    pub points: usize,
}

impl RegressionResult {
    /// Evaluate the fitted line.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// The outcome of attempting a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regression {
    /// A usable fit.
    Fit(RegressionResult),
    /// Fewer than two points.
    InsufficientData { points: usize },
    /// The x values have no variance (or the sums overflowed), so the slope is undefined.
    Degenerate { points: usize },
}

impl Regression {
    /**
     * Fit a line through `(x, y)` pairs.
     *
     * The slope is `Σ(x − x̄)(y − ȳ) / Σ(x − x̄)²` and the intercept `ȳ − slope·x̄`. When every x
     * is the same value the fit is [Regression::Degenerate], even if rounding in the mean leaves
     * a tiny nonzero spread.
     */
    pub fn fit(points: &[(f64, f64)]) -> Self {
        let num_points = points.len();
        if num_points < 2 {
            return Regression::InsufficientData { points: num_points };
        }

        let first_x = points[0].0;
        if points.iter().all(|&(x, _)| x == first_x) {
            return Regression::Degenerate { points: num_points };
        }

        let n = num_points as f64;
        let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for &(x, y) in points {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        let slope = sxy / sxx;
        if !slope.is_finite() {
            return Regression::Degenerate { points: num_points };
        }
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = points
            .iter()
            .map(|&(x, y)| {
                let residual = y - (intercept + slope * x);
                residual * residual
            })
            .sum();

        let r_squared = if syy != 0.0 {
            Some(1.0 - ss_res / syy)
        } else {
            None
        };

        Regression::Fit(RegressionResult {
            slope,
            intercept,
            r_squared,
            points: num_points,
        })
    }

    /// Explain the primary volume (y) with the secondary volume (x).
    pub fn from_rows(rows: &[CombinedRow]) -> Self {
        let points: Vec<(f64, f64)> = rows
            .iter()
            .map(|row| (row.secondary_volume, row.primary_volume))
            .collect();

        Self::fit(&points)
    }

    /// Get the fit, if there is one.
    pub fn result(&self) -> Option<&RegressionResult> {
        match self {
            Regression::Fit(res) => Some(res),
            _ => None,
        }
    }
}

impl Display for Regression {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Regression::Fit(res) => {
                writeln!(f, "  Slope: {:.6}", res.slope)?;
                writeln!(f, "  Intercept: {:.6}", res.intercept)?;
                match res.r_squared {
                    Some(r2) => writeln!(f, "  R-squared: {:.6}", r2),
                    None => writeln!(f, "  R-squared: undefined (no variance in the response)"),
                }
            }
            Regression::InsufficientData { points } => writeln!(
                f,
                "Not enough clusters with valid data for regression ({} found, 2 required).",
                points
            ),
            Regression::Degenerate { points } => writeln!(
                f,
                "Degenerate fit: the {} predictor values have no variance, slope is undefined.",
                points
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exact_line() {
        let points: Vec<_> = (0..10)
            .map(|i| {
                let x = i as f64 * 0.7 - 2.0;
                (x, 2.0 * x + 3.0)
            })
            .collect();

        let res = *Regression::fit(&points).result().unwrap();
        assert!((res.slope - 2.0).abs() < 1.0e-9);
        assert!((res.intercept - 3.0).abs() < 1.0e-9);
        assert!((res.r_squared.unwrap() - 1.0).abs() < 1.0e-9);
        assert_eq!(res.points, 10);
        assert!((res.predict(10.0) - 23.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_noisy_line() {
        let points = [(1.0, 1.0), (2.0, 3.0), (3.0, 2.0), (4.0, 5.0), (5.0, 4.0)];

        let res = *Regression::fit(&points).result().unwrap();
        // Computed by hand: sx = 15, sy = 15, sxy = 53, sx2 = 55
        assert!((res.slope - 0.8).abs() < 1.0e-12);
        assert!((res.intercept - 0.6).abs() < 1.0e-12);
        assert!((res.r_squared.unwrap() - 0.64).abs() < 1.0e-12);
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            Regression::fit(&[]),
            Regression::InsufficientData { points: 0 }
        );
        assert_eq!(
            Regression::fit(&[(1.0, 2.0)]),
            Regression::InsufficientData { points: 1 }
        );
        assert!(Regression::fit(&[(1.0, 2.0)]).result().is_none());
    }

    #[test]
    fn test_no_variance_in_x() {
        let points = [(2.0, 1.0), (2.0, 3.0), (2.0, 5.0)];
        assert_eq!(
            Regression::fit(&points),
            Regression::Degenerate { points: 3 }
        );
    }

    #[test]
    fn test_no_variance_in_inexact_x() {
        // 0.3, 0.1 and 0.7 have no exact binary representation.
        for &x in &[0.3, 0.1, 0.7] {
            let points = [(x, 1.0), (x, 2.0), (x, 4.0)];
            assert_eq!(
                Regression::fit(&points),
                Regression::Degenerate { points: 3 }
            );
        }
    }

    #[test]
    fn test_large_offset_small_spread() {
        let points = [(1.0e8, 1.0), (1.0e8 + 1.0, 3.0), (1.0e8 + 2.0, 5.0)];
        let res = *Regression::fit(&points).result().unwrap();
        assert!((res.slope - 2.0).abs() < 1.0e-6);
        assert!((res.r_squared.unwrap() - 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn test_no_variance_in_y() {
        let points = [(1.0, 4.0), (2.0, 4.0), (3.0, 4.0)];
        let res = *Regression::fit(&points).result().unwrap();
        assert!(res.slope.abs() < 1.0e-12);
        assert!((res.intercept - 4.0).abs() < 1.0e-12);
        assert_eq!(res.r_squared, None);
    }

    #[test]
    fn test_from_rows_uses_secondary_as_predictor() {
        use crate::geo::Coord;

        let rows: Vec<_> = (1..=4)
            .map(|i| CombinedRow {
                cluster_id: i,
                centroid: Coord::default(),
                primary_volume: 0.5 * i as f64,
                secondary_volume: i as f64,
            })
            .collect();

        let res = *Regression::from_rows(&rows).result().unwrap();
        assert!((res.slope - 0.5).abs() < 1.0e-12);
        assert!(res.intercept.abs() < 1.0e-12);
    }
}

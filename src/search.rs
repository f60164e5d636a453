use std::f64::consts::PI;

use thiserror::Error;
use tracing::{debug, info};

use crate::equations::{RatioPair, TensorRatios};

/// Half-degree steps per axis: 0 deg to 360 deg inclusive.
pub const GRID_STEPS: u32 = 721;

/// Tolerance applied when the caller does not supply one.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// One discrete (theta, chi) sample of the search grid, in half-degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPoint {
    pub theta_step: u32,
    pub chi_step: u32,
}

impl GridPoint {
    pub fn theta_deg(&self) -> f64 {
        self.theta_step as f64 / 2.0
    }

    pub fn chi_deg(&self) -> f64 {
        self.chi_step as f64 / 2.0
    }

    /// step / 360 * pi converts a half-degree step straight to radians.
    pub fn theta_rad(&self) -> f64 {
        self.theta_step as f64 / 360.0 * PI
    }

    pub fn chi_rad(&self) -> f64 {
        self.chi_step as f64 / 360.0 * PI
    }
}

/// Lazy row-major traversal of the full grid: ascending theta step, then
/// ascending chi step. The order decides which of several matching points
/// a search reports, so it is part of the contract.
pub fn grid_points() -> impl Iterator<Item = GridPoint> {
    (0..GRID_STEPS).flat_map(|theta_step| {
        (0..GRID_STEPS).map(move |chi_step| GridPoint {
            theta_step,
            chi_step,
        })
    })
}

/// Measured intensity ratios the search tries to reproduce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub cc_aa: f64,
    pub ac_aa: f64,
}

/// A grid point whose model ratios fell within tolerance of both targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    pub theta_deg: f64,
    pub chi_deg: f64,
    pub ratios: RatioPair,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("tolerance must be non-negative, got {0}")]
    NegativeTolerance(f64),
}

/// Scan the grid for the first orientation whose model ratios are both
/// strictly within `tolerance` of the targets.
///
/// Degenerate grid points are skipped. `Ok(None)` means the whole grid was
/// exhausted without a match; this is a legitimate negative result, not a
/// failure to run the search.
pub fn find_orientation(
    ratios: TensorRatios,
    targets: Targets,
    tolerance: f64,
) -> Result<Option<Solution>, SearchError> {
    validate_finite("r1", ratios.r1)?;
    validate_finite("r2", ratios.r2)?;
    validate_finite("target1", targets.cc_aa)?;
    validate_finite("target2", targets.ac_aa)?;
    validate_finite("tolerance", tolerance)?;
    if tolerance < 0.0 {
        return Err(SearchError::NegativeTolerance(tolerance));
    }

    info!(
        "Scanning {} grid points (r1={}, r2={}, tolerance={})",
        GRID_STEPS as u64 * GRID_STEPS as u64,
        ratios.r1,
        ratios.r2,
        tolerance
    );

    let hit = grid_points().find_map(|point| {
        let pair = ratios.evaluate(point.theta_rad(), point.chi_rad())?;
        let matched = (pair.cc_aa - targets.cc_aa).abs() < tolerance
            && (pair.ac_aa - targets.ac_aa).abs() < tolerance;
        matched.then(|| Solution {
            theta_deg: point.theta_deg(),
            chi_deg: point.chi_deg(),
            ratios: pair,
        })
    });

    match &hit {
        Some(solution) => debug!(
            "Match at theta={} deg, chi={} deg",
            solution.theta_deg, solution.chi_deg
        ),
        None => debug!("Grid exhausted without a match"),
    }

    Ok(hit)
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), SearchError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SearchError::NonFinite { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_is_row_major_and_complete() {
        let mut points = grid_points();
        assert_eq!(
            points.next(),
            Some(GridPoint {
                theta_step: 0,
                chi_step: 0
            })
        );
        assert_eq!(
            points.next(),
            Some(GridPoint {
                theta_step: 0,
                chi_step: 1
            })
        );
        // 719 more chi steps before theta advances.
        let first_of_second_row = points.nth(719).unwrap();
        assert_eq!(
            first_of_second_row,
            GridPoint {
                theta_step: 1,
                chi_step: 0
            }
        );
        assert_eq!(
            grid_points().count(),
            (GRID_STEPS * GRID_STEPS) as usize
        );
    }

    #[test]
    fn grid_point_conversions() {
        let point = GridPoint {
            theta_step: 720,
            chi_step: 1,
        };
        assert_relative_eq!(point.theta_deg(), 360.0);
        assert_relative_eq!(point.chi_deg(), 0.5);
        assert_relative_eq!(point.theta_rad(), 2.0 * PI);
        assert_relative_eq!(point.chi_rad(), PI / 360.0);
    }

    #[test]
    fn known_scenario_is_reproducible() {
        let solution = find_orientation(
            TensorRatios::new(-9.52, -1.06),
            Targets {
                cc_aa: 8.78,
                ac_aa: 2.98,
            },
            0.05,
        )
        .unwrap()
        .expect("this parameter set has a solution");

        assert_relative_eq!(solution.theta_deg, 63.0);
        assert_relative_eq!(solution.chi_deg, 29.5);
        assert_relative_eq!(solution.ratios.cc_aa, 8.8079, epsilon = 1e-4);
        assert_relative_eq!(solution.ratios.ac_aa, 2.9811, epsilon = 1e-4);
    }

    #[test]
    fn search_is_deterministic() {
        let run = || {
            find_orientation(
                TensorRatios::new(-9.52, -1.06),
                Targets {
                    cc_aa: 8.78,
                    ac_aa: 2.98,
                },
                0.05,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn tie_break_returns_earliest_grid_point() {
        // An isotropic tensor matches everywhere; the scan must still
        // report the point earliest in ascending (theta, chi) order.
        let solution = find_orientation(
            TensorRatios::new(1.0, 1.0),
            Targets {
                cc_aa: 1.0,
                ac_aa: 0.0,
            },
            0.05,
        )
        .unwrap()
        .unwrap();
        assert_eq!((solution.theta_deg, solution.chi_deg), (0.0, 0.0));
    }

    #[test]
    fn widening_tolerance_keeps_a_solution() {
        let ratios = TensorRatios::new(-9.52, -1.06);
        let targets = Targets {
            cc_aa: 8.78,
            ac_aa: 2.98,
        };

        assert!(find_orientation(ratios, targets, 0.01).unwrap().is_none());
        assert!(find_orientation(ratios, targets, 0.05).unwrap().is_some());

        // A wider tolerance still finds a solution, though an earlier grid
        // point now qualifies.
        let wide = find_orientation(ratios, targets, 0.2).unwrap().unwrap();
        assert_eq!((wide.theta_deg, wide.chi_deg), (58.5, 23.0));
    }

    #[test]
    fn unreachable_target_reports_no_solution() {
        // cc/aa is a ratio of squares, so -1000 is unreachable.
        let outcome = find_orientation(
            TensorRatios::new(-9.52, -1.06),
            Targets {
                cc_aa: -1000.0,
                ac_aa: 2.98,
            },
            0.05,
        )
        .unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn degenerate_points_are_skipped_not_matched() {
        // r1 = 1, r2 = -1 degenerates the denominator along theta = 0 and
        // chi = 0; the scan must neither fault nor report those rows.
        let solution = find_orientation(
            TensorRatios::new(1.0, -1.0),
            Targets {
                cc_aa: 1.0,
                ac_aa: 0.0,
            },
            0.05,
        )
        .unwrap()
        .expect("a non-degenerate match exists");
        assert_eq!((solution.theta_deg, solution.chi_deg), (81.5, 87.5));
    }

    #[test]
    fn non_finite_inputs_are_rejected_before_the_scan() {
        let targets = Targets {
            cc_aa: f64::NAN,
            ac_aa: 0.0,
        };
        let err = find_orientation(TensorRatios::new(1.0, 1.0), targets, 0.05).unwrap_err();
        assert!(matches!(err, SearchError::NonFinite { field: "target1", .. }));

        let err = find_orientation(
            TensorRatios::new(f64::INFINITY, 1.0),
            Targets {
                cc_aa: 1.0,
                ac_aa: 0.0,
            },
            0.05,
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::NonFinite { field: "r1", .. }));
    }

    #[test]
    fn negative_tolerance_is_an_input_error() {
        let err = find_orientation(
            TensorRatios::new(1.0, 1.0),
            Targets {
                cc_aa: 1.0,
                ac_aa: 0.0,
            },
            -0.5,
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::NegativeTolerance(_)));
    }
}

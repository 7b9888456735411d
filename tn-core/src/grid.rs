//! Regular time grids over `[t0, tmax]`, configured by exactly one of a bin width `dt` or a bin
//! count `N_time_steps`.
use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::{
    Result,
    TemporalNetworkError,
};

/// Relative tolerance when checking that `dt` divides `tmax - t0` into whole bins.
const DIVISIBILITY_TOLERANCE: f64 = 1e-9;

/// Relative tolerance within which a time counts as lying on a bin edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Mutually exclusive grid resolution: set exactly one of the two to a positive value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Bin width; `0` means unset.
    #[serde(default)]
    pub dt: f64,
    /// Number of bins; `0` means unset.
    #[serde(default, rename = "N_time_steps")]
    pub n_time_steps: usize,
}

impl GridSpec {
    /// Grid with a fixed bin width.
    #[must_use]
    pub const fn with_dt(dt: f64) -> Self {
        Self { dt, n_time_steps: 0 }
    }

    /// Grid with a fixed number of bins.
    #[must_use]
    pub const fn with_steps(n_time_steps: usize) -> Self {
        Self { dt: 0.0, n_time_steps }
    }
}

/// A resolved grid of `n_bins` equal-width bins starting at `t0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeGrid {
    /// Left edge of the first bin.
    pub t0: f64,
    /// Right edge of the last bin.
    pub tmax: f64,
    /// Bin width.
    pub dt: f64,
    /// Number of bins.
    pub n_bins: usize,
}

impl TimeGrid {
    /// Resolve `spec` on `[t0, tmax]`. Fails with a configuration error if both or neither of
    /// `dt` and `n_time_steps` are positive, if `dt` does not divide `tmax - t0` evenly, or if
    /// the window is empty.
    pub fn resolve(t0: f64, tmax: f64, spec: GridSpec) -> Result<Self> {
        let GridSpec { dt, n_time_steps } = spec;
        if dt.is_nan() || dt < 0.0 {
            return Err(TemporalNetworkError::configuration(format!("dt must be non-negative, got {dt}")));
        }
        let span = tmax - t0;
        if span <= 0.0 || !span.is_finite() {
            return Err(TemporalNetworkError::configuration(format!(
                "cannot build a time grid on [{t0}, {tmax}]"
            )));
        }

        match (dt > 0.0, n_time_steps > 0) {
            (true, true) => Err(TemporalNetworkError::configuration(
                "provide either a positive dt or a positive N_time_steps, not both",
            )),
            (false, false) => Err(TemporalNetworkError::configuration(
                "provide either a positive dt or a positive N_time_steps, both are zero",
            )),
            (true, false) => {
                let bins = span / dt;
                let rounded = bins.round();
                if rounded < 1.0 || (bins - rounded).abs() > DIVISIBILITY_TOLERANCE * bins.max(1.0) {
                    return Err(TemporalNetworkError::configuration(format!(
                        "dt = {dt} does not divide the interval tmax - t0 = {span} into whole bins"
                    )));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let n_bins = rounded as usize;
                Ok(Self { t0, tmax, dt, n_bins })
            },
            (false, true) => {
                let dt = span / n_time_steps as f64;
                Ok(Self { t0, tmax, dt, n_bins: n_time_steps })
            },
        }
    }

    /// Left edge of bin `k`.
    #[must_use]
    pub fn bin_start(&self, k: usize) -> f64 {
        self.t0 + k as f64 * self.dt
    }

    /// Fractional bin coordinate of `t`, snapped to the nearest edge when within rounding error of
    /// it.
    fn position(&self, t: f64) -> f64 {
        let position = (t - self.t0) / (self.tmax - self.t0) * self.n_bins as f64;
        let edge = position.round();
        if (position - edge).abs() <= EDGE_TOLERANCE * edge.abs().max(1.0) {
            edge
        } else {
            position
        }
    }

    /// Half-open range of bins overlapping the half-open interval `[from, to)`. Empty for
    /// zero-length intervals.
    #[must_use]
    pub fn bins_overlapping(&self, from: f64, to: f64) -> std::ops::Range<usize> {
        if to <= from {
            return 0..0;
        }
        let first = self.position(from).floor().max(0.0);
        let end = self.position(to).ceil().max(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (first, end) = ((first as usize).min(self.n_bins), (end as usize).min(self.n_bins));
        first..end
    }
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case::both_set(GridSpec { dt: 0.5, n_time_steps: 4 })]
    #[case::neither_set(GridSpec::default())]
    #[case::not_dividing(GridSpec::with_dt(0.3))]
    #[case::negative(GridSpec::with_dt(-1.0))]
    fn test_resolve_rejects(#[case] spec: GridSpec) {
        let err = TimeGrid::resolve(0.0, 1.0, spec).unwrap_err();
        assert!(matches!(err, TemporalNetworkError::Configuration(_)));
    }

    #[rstest]
    #[case::dt(GridSpec::with_dt(0.1), 10)]
    #[case::steps(GridSpec::with_steps(4), 4)]
    fn test_resolve(#[case] spec: GridSpec, #[case] expected_bins: usize) {
        let grid = TimeGrid::resolve(0.0, 1.0, spec).unwrap();
        assert_eq!(grid.n_bins, expected_bins);
        assert_in_delta!(grid.dt * expected_bins as f64, 1.0, 1e-12);
    }

    #[rstest]
    fn test_bins_overlapping() {
        let grid = TimeGrid::resolve(0.0, 4.0, GridSpec::with_steps(4)).unwrap();

        assert_eq!(grid.bins_overlapping(0.0, 1.0), 0..1);
        assert_eq!(grid.bins_overlapping(0.5, 2.5), 0..3);
        assert_eq!(grid.bins_overlapping(3.0, 4.0), 3..4);
        assert_eq!(grid.bins_overlapping(2.0, 2.0), 0..0);
    }

    #[rstest]
    #[case::before_first_edge(0.0, 0.3, 0..3)]
    #[case::between_edges(0.3, 0.7, 3..7)]
    #[case::after_last_edge(0.7, 1.0, 7..10)]
    #[case::inside_one_bin(0.31, 0.39, 3..4)]
    fn test_bins_overlapping_on_inexact_edges(
        #[case] from: f64,
        #[case] to: f64,
        #[case] expected: std::ops::Range<usize>,
    ) {
        let grid = TimeGrid::resolve(0.0, 1.0, GridSpec::with_steps(10)).unwrap();

        assert_eq!(grid.bins_overlapping(from, to), expected);
    }
}

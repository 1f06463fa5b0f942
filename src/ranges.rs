//! Colorbar range selection.
//!
//! Unless the user pins the limits, the range for each plot kind is taken
//! over the full time, longitude, and latitude extent of the variable at the
//! plotted altitude. That way every keogram longitude and every map frame of
//! one (variable, altitude) pair shares a color scale and frames can be
//! compared by eye.
use ndarray::s;

use crate::dataset::PlotContext;

/// Inclusive colorbar limits for one plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRange {
    pub min: f64,
    pub max: f64,
}

/// Limits for each of the three plot kinds of one (variable, altitude) pair.
#[derive(Debug, Clone, Copy)]
pub struct KindRanges {
    pub raw: PlotRange,
    pub background: PlotRange,
    pub percent: PlotRange,
}

/// Which array divides the percent deviation: keograms use the background,
/// maps use the raw values.
#[derive(Debug, Clone, Copy)]
pub enum PercentBasis {
    Background,
    Raw,
}

/// Ranges computed over the whole (time x lon x lat) extent of `var_idx` at
/// `alt_idx`.
pub fn shared_ranges(
    ctx: &PlotContext,
    var_idx: usize,
    alt_idx: usize,
    basis: PercentBasis,
) -> KindRanges {
    let raw = ctx.raw().slice(s![.., var_idx, .., .., alt_idx]);
    let background = ctx.background().slice(s![.., var_idx, .., .., alt_idx]);

    let raw_range = min_max(raw.iter().copied());
    let background_range = min_max(background.iter().copied());
    let percent_range = min_max(raw.iter().zip(background.iter()).map(|(&r, &b)| {
        let denom = match basis {
            PercentBasis::Background => b,
            PercentBasis::Raw => r,
        };
        100.0 * (r - b) / denom
    }));

    KindRanges {
        raw: raw_range,
        background: background_range,
        percent: percent_range,
    }
}

/// Explicit symmetric limits override every kind uniformly.
pub fn fixed_ranges(half_range: f64) -> KindRanges {
    let range = PlotRange {
        min: -half_range,
        max: half_range,
    };
    KindRanges {
        raw: range,
        background: range,
        percent: range,
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> PlotRange {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        // NaN (e.g. 0/0 in a percent cell) is skipped rather than poisoning
        // the whole range.
        if v.is_nan() {
            (lo, hi)
        } else {
            (lo.min(v), hi.max(v))
        }
    });
    PlotRange { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};
    use ndarray::Array5;

    use crate::dataset::RawDataset;
    use crate::grid::Grid;
    use crate::variables::VariableSet;

    fn context() -> PlotContext {
        let times = (0..2)
            .map(|h| Utc.with_ymd_and_hms(2011, 5, 21, h, 0, 0).unwrap())
            .collect();
        let grid = Grid::new(
            vec![-45.0, 45.0],
            vec![0.0, 180.0],
            vec![100_000.0, 200_000.0],
            times,
        );
        let vars = VariableSet::from_codes(&["Rho"]).unwrap();
        let mut raw = Array5::from_elem((2, 1, 2, 2, 2), 100.0);
        raw[[0, 0, 0, 0, 0]] = 50.0;
        raw[[1, 0, 1, 1, 0]] = 200.0;
        // A spread at the other altitude that must not leak into alt 0.
        raw[[0, 0, 0, 0, 1]] = -1000.0;
        let background = Array5::from_elem((2, 1, 2, 2, 2), 100.0);
        let onset = Utc.with_ymd_and_hms(2011, 5, 21, 0, 0, 0).unwrap();
        PlotContext::new(RawDataset { grid, vars, raw }, background, onset).unwrap()
    }

    #[test]
    fn test_shared_ranges_span_full_extent_of_one_altitude() {
        let ctx = context();
        let ranges = shared_ranges(&ctx, 0, 0, PercentBasis::Background);
        assert_abs_diff_eq!(ranges.raw.min, 50.0);
        assert_abs_diff_eq!(ranges.raw.max, 200.0);
        assert_abs_diff_eq!(ranges.background.min, 100.0);
        assert_abs_diff_eq!(ranges.background.max, 100.0);
        // percent vs background: (50-100)/100 and (200-100)/100
        assert_abs_diff_eq!(ranges.percent.min, -50.0);
        assert_abs_diff_eq!(ranges.percent.max, 100.0);
    }

    #[test]
    fn test_percent_basis_changes_the_denominator() {
        let ctx = context();
        let over_raw = shared_ranges(&ctx, 0, 0, PercentBasis::Raw);
        // (50-100)/50 = -100%, (200-100)/200 = +50%
        assert_abs_diff_eq!(over_raw.percent.min, -100.0);
        assert_abs_diff_eq!(over_raw.percent.max, 50.0);
    }

    #[test]
    fn test_fixed_ranges_are_symmetric_and_uniform() {
        let ranges = fixed_ranges(10.0);
        for range in [ranges.raw, ranges.background, ranges.percent] {
            assert_abs_diff_eq!(range.min, -10.0);
            assert_abs_diff_eq!(range.max, 10.0);
        }
    }
}

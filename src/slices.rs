//! Keogram and map slice extraction.
//!
//! Both extractions pull matched 2-D views out of the raw and background
//! arrays and attach the percent deviation of raw from background. Note the
//! denominators: keograms report `100 * (raw - background) / background`
//! while maps report `100 * (raw - background) / raw`. The asymmetry is
//! inherited from long-standing analysis convention and the two are kept
//! deliberately distinct; do not "fix" one to match the other.
use chrono::{DateTime, Utc};
use ndarray::{s, Array2};

use crate::dataset::PlotContext;
use crate::grid::TimeSelector;
use crate::outliers::clip_outliers;

#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    #[error("No data for variable '{code}' at {alt_km:.0} km along longitude {lon:.0}: the raw slice is all zeros")]
    NoData { code: String, lon: f64, alt_km: f64 },
    #[error("Time index {index} is out of range, {n_times} timestamps are loaded")]
    TimeIndexOutOfRange { index: usize, n_times: usize },
}

/// A matched triple of 2-D arrays: raw values, the filtered background, and
/// the percent deviation between them.
#[derive(Debug)]
pub struct SliceSet {
    pub raw: Array2<f64>,
    pub background: Array2<f64>,
    pub percent: Array2<f64>,
}

impl SliceSet {
    fn maybe_clip(self, clip: bool) -> Self {
        if clip {
            // Each of the three arrays is clipped independently; the percent
            // array is not recomputed from the clipped inputs.
            Self {
                raw: clip_outliers(&self.raw),
                background: clip_outliers(&self.background),
                percent: clip_outliers(&self.percent),
            }
        } else {
            self
        }
    }
}

/// A (time x latitude) slice at a fixed longitude and altitude.
#[derive(Debug)]
pub struct KeoSlice {
    pub set: SliceSet,
    /// Index of the longitude actually used.
    pub lon_idx: usize,
    /// The longitude actually used, in degrees; the nearest axis value to
    /// what was requested.
    pub lon: f64,
}

/// Extract the keogram slice for one variable at one altitude, along the
/// axis longitude nearest to `target_lon`.
///
/// Fails with [`SliceError::NoData`] if the raw slice sums to exactly zero.
/// That is a heuristic for a bad (longitude, altitude, variable) selection,
/// not a guarantee of catching all invalid data.
pub fn extract_keogram(
    ctx: &PlotContext,
    var_idx: usize,
    alt_idx: usize,
    target_lon: f64,
    clip: bool,
) -> Result<KeoSlice, SliceError> {
    let (lon_idx, lon) = ctx.grid().nearest_lon(target_lon);

    let raw: Array2<f64> = ctx
        .raw()
        .slice(s![.., var_idx, lon_idx, .., alt_idx])
        .to_owned();
    if raw.sum() == 0.0 {
        let code = ctx
            .vars()
            .resolve_by_index(var_idx)
            .map(str::to_string)
            .unwrap_or_else(|_| format!("#{var_idx}"));
        return Err(SliceError::NoData {
            code,
            lon,
            alt_km: ctx.grid().alt_km(alt_idx),
        });
    }

    let background: Array2<f64> = ctx
        .background()
        .slice(s![.., var_idx, lon_idx, .., alt_idx])
        .to_owned();
    // Division by zero yields inf/NaN here, matching the source convention
    // of letting empty background cells show up as blown-out pixels.
    let percent = 100.0 * (&raw - &background) / &background;

    let set = SliceSet {
        raw,
        background,
        percent,
    }
    .maybe_clip(clip);
    Ok(KeoSlice { set, lon_idx, lon })
}

/// A (longitude x latitude) slice at a fixed time and altitude.
#[derive(Debug)]
pub struct MapSlice {
    pub set: SliceSet,
    pub time_idx: usize,
    pub time: DateTime<Utc>,
}

/// Extract the map slice for one variable at one altitude and one time,
/// selected either by index or by nearest timestamp.
pub fn extract_map(
    ctx: &PlotContext,
    var_idx: usize,
    alt_idx: usize,
    selector: TimeSelector,
    clip: bool,
) -> Result<MapSlice, SliceError> {
    let time_idx = match selector {
        TimeSelector::ByIndex(idx) => {
            if idx >= ctx.grid().n_times() {
                return Err(SliceError::TimeIndexOutOfRange {
                    index: idx,
                    n_times: ctx.grid().n_times(),
                });
            }
            idx
        }
        TimeSelector::Nearest(t) => ctx.grid().nearest_time(t),
    };

    let raw: Array2<f64> = ctx
        .raw()
        .slice(s![time_idx, var_idx, .., .., alt_idx])
        .to_owned();
    let background: Array2<f64> = ctx
        .background()
        .slice(s![time_idx, var_idx, .., .., alt_idx])
        .to_owned();
    let percent = 100.0 * (&raw - &background) / &raw;

    let set = SliceSet {
        raw,
        background,
        percent,
    }
    .maybe_clip(clip);
    Ok(MapSlice {
        set,
        time_idx,
        time: ctx.grid().times()[time_idx],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use ndarray::Array5;

    use crate::dataset::RawDataset;
    use crate::grid::Grid;
    use crate::variables::VariableSet;

    fn context(raw_fill: f64, background_fill: f64) -> PlotContext {
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
        let raw = Array5::from_elem((2, 1, 2, 2, 2), raw_fill);
        let background = Array5::from_elem((2, 1, 2, 2, 2), background_fill);
        let onset = Utc.with_ymd_and_hms(2011, 5, 21, 0, 0, 0).unwrap();
        PlotContext::new(RawDataset { grid, vars, raw }, background, onset).unwrap()
    }

    #[test]
    fn test_keogram_and_map_denominators_differ() {
        // raw = 110, background = 100: the keogram convention divides by the
        // background (10%), the map convention divides by raw (9.09%).
        let ctx = context(110.0, 100.0);

        let keo = extract_keogram(&ctx, 0, 0, 0.0, false).unwrap();
        assert_abs_diff_eq!(keo.set.percent[[0, 0]], 10.0, epsilon = 1e-12);

        let map = extract_map(&ctx, 0, 0, TimeSelector::ByIndex(0), false).unwrap();
        assert_abs_diff_eq!(map.set.percent[[0, 0]], 100.0 * 10.0 / 110.0, epsilon = 1e-12);
        assert_abs_diff_eq!(map.set.percent[[0, 0]], 9.0909, epsilon = 1e-4);
    }

    #[test]
    fn test_keogram_shapes_are_time_by_lat() {
        let ctx = context(1.0, 1.0);
        let keo = extract_keogram(&ctx, 0, 1, -10.0, false).unwrap();
        assert_eq!(keo.set.raw.dim(), (2, 2));
        assert_eq!(keo.lon, 0.0);
        assert_eq!(keo.lon_idx, 0);
    }

    #[test]
    fn test_map_shapes_are_lon_by_lat() {
        let ctx = context(1.0, 1.0);
        let map = extract_map(&ctx, 0, 0, TimeSelector::ByIndex(1), false).unwrap();
        assert_eq!(map.set.raw.dim(), (2, 2));
        assert_eq!(map.time_idx, 1);
    }

    #[test]
    fn test_all_zero_keogram_slice_is_no_data() {
        let ctx = context(0.0, 1.0);
        let err = extract_keogram(&ctx, 0, 0, 0.0, false).unwrap_err();
        assert!(matches!(err, SliceError::NoData { .. }));
    }

    #[test]
    fn test_map_nearest_time_selection() {
        let ctx = context(1.0, 1.0);
        let target = Utc.with_ymd_and_hms(2011, 5, 21, 0, 50, 0).unwrap();
        let map = extract_map(&ctx, 0, 0, TimeSelector::Nearest(target), false).unwrap();
        assert_eq!(map.time_idx, 1);
    }

    #[test]
    fn test_map_time_index_out_of_range() {
        let ctx = context(1.0, 1.0);
        let err = extract_map(&ctx, 0, 0, TimeSelector::ByIndex(5), false).unwrap_err();
        assert!(matches!(err, SliceError::TimeIndexOutOfRange { .. }));
    }

    #[test]
    fn test_outlier_clipping_applies_to_each_array() {
        // 20 latitudes so a single spike in the 2x20 keogram plane can sit
        // beyond 5 sigma (tiny arrays bound the max z-score below that).
        let mut raw = Array5::from_elem((2, 1, 2, 20, 2), 1.0);
        raw[[0, 0, 0, 0, 0]] = 1.0e9;
        let times = (0..2)
            .map(|h| Utc.with_ymd_and_hms(2011, 5, 21, h, 0, 0).unwrap())
            .collect();
        let lats: Vec<f64> = (0..20).map(|i| -85.0 + 9.0 * i as f64).collect();
        let grid = Grid::new(
            lats,
            vec![0.0, 180.0],
            vec![100_000.0, 200_000.0],
            times,
        );
        let vars = VariableSet::from_codes(&["Rho"]).unwrap();
        let background = Array5::from_elem((2, 1, 2, 20, 2), 1.0);
        let onset = Utc.with_ymd_and_hms(2011, 5, 21, 0, 0, 0).unwrap();
        let ctx = PlotContext::new(RawDataset { grid, vars, raw }, background, onset).unwrap();

        let unclipped = extract_keogram(&ctx, 0, 0, 0.0, false).unwrap();
        assert_abs_diff_eq!(unclipped.set.raw[[0, 0]], 1.0e9);

        let clipped = extract_keogram(&ctx, 0, 0, 0.0, true).unwrap();
        assert_abs_diff_eq!(clipped.set.raw[[0, 0]], 1.0);
    }
}

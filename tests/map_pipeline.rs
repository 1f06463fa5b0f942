//! End-to-end check of the map pipeline: a tiny synthetic dataset goes in,
//! PNG frames come out at the documented paths.
use chrono::{TimeZone, Utc};
use ndarray::Array5;

use gitm_rs::dataset::{PlotContext, RawDataset};
use gitm_rs::grid::{Grid, TimeSelector};
use gitm_rs::paths::{map_plot_path, PlotKind, PlotKindFilter};
use gitm_rs::plots::{draw_keo_set, draw_map_set, PlotOptions, SaveOrShow};
use gitm_rs::variables::VariableSet;

/// Two timestamps, one variable, a 2x2x2 grid of known values. The
/// background is offset from the raw values so every percent-difference
/// frame has structure.
fn synthetic_context() -> PlotContext {
    let times = (0..2)
        .map(|h| Utc.with_ymd_and_hms(2011, 5, 21, h, 0, 0).unwrap())
        .collect();
    let grid = Grid::new(
        vec![-45.0, 45.0],
        vec![0.0, 180.0],
        vec![100_000.0, 250_000.0],
        times,
    );
    let vars = VariableSet::from_codes(&["Temperature"]).unwrap();
    let raw = Array5::from_shape_fn((2, 1, 2, 2, 2), |(t, _, lo, la, al)| {
        200.0 + 10.0 * t as f64 + 5.0 * lo as f64 + 2.0 * la as f64 + al as f64
    });
    let background = raw.mapv(|v| v * 0.95);
    let onset = Utc.with_ymd_and_hms(2011, 5, 21, 0, 0, 0).unwrap();
    PlotContext::new(RawDataset { grid, vars, raw }, background, onset).unwrap()
}

#[test]
fn test_map_pipeline_writes_one_frame_per_time_altitude_and_kind() {
    let ctx = synthetic_context();
    let out_dir = tempfile::tempdir().unwrap();
    let figtype: PlotKindFilter = "all".parse().unwrap();
    let opts = PlotOptions {
        out_path: out_dir.path(),
        kinds: &figtype,
        mode: SaveOrShow::Save,
        lat_lim: 90.0,
        // Fixed limits pin every colorbar to [-10, 10] and collapse the
        // percent-difference output to a single frame per time.
        cbar_half_range: Some(10.0),
        clip_outliers: false,
        diff_half_ranges: &[1.0, 2.0, 3.0, 5.0, 10.0, 30.0, 50.0],
        coastlines: None,
    };

    let mut total = 0;
    for alt_idx in 0..2 {
        for time_idx in 0..2 {
            let rendered =
                draw_map_set(&ctx, 0, alt_idx, TimeSelector::ByIndex(time_idx), &opts).unwrap();
            assert_eq!(
                rendered.len(),
                3,
                "expected one frame per kind at alt {alt_idx}, time {time_idx}"
            );
            total += rendered.len();

            for kind in PlotKind::ALL {
                let expected = map_plot_path(
                    out_dir.path(),
                    kind,
                    ctx.grid().alt_km(alt_idx),
                    "Temperature",
                    None,
                    time_idx,
                );
                assert!(
                    expected.is_file(),
                    "missing frame {}",
                    expected.display()
                );
            }
        }
    }
    assert_eq!(total, 12);

    // Spot-check the deterministic layout: altitudes are 100 and 250 km.
    assert!(out_dir
        .path()
        .join("maps/raw/100/Temperature/000.png")
        .is_file());
    assert!(out_dir
        .path()
        .join("maps/diff/250/Temperature/001.png")
        .is_file());
}

#[test]
fn test_map_pipeline_expands_diff_half_ranges_when_unpinned() {
    let ctx = synthetic_context();
    let out_dir = tempfile::tempdir().unwrap();
    let figtype: PlotKindFilter = "diff".parse().unwrap();
    let opts = PlotOptions {
        out_path: out_dir.path(),
        kinds: &figtype,
        mode: SaveOrShow::Save,
        lat_lim: 90.0,
        cbar_half_range: None,
        clip_outliers: false,
        diff_half_ranges: &[5.0, 10.0],
        coastlines: None,
    };

    let rendered = draw_map_set(&ctx, 0, 0, TimeSelector::ByIndex(1), &opts).unwrap();
    assert_eq!(rendered.len(), 2);
    assert!(out_dir
        .path()
        .join("maps/diff/100/Temperature/5/001.png")
        .is_file());
    assert!(out_dir
        .path()
        .join("maps/diff/100/Temperature/10/001.png")
        .is_file());
}

#[test]
fn test_keo_pipeline_writes_one_image_per_kind() {
    let ctx = synthetic_context();
    let out_dir = tempfile::tempdir().unwrap();
    let figtype: PlotKindFilter = "all".parse().unwrap();
    let opts = PlotOptions {
        out_path: out_dir.path(),
        kinds: &figtype,
        mode: SaveOrShow::Save,
        lat_lim: 90.0,
        cbar_half_range: None,
        clip_outliers: false,
        diff_half_ranges: &[],
        coastlines: None,
    };

    // Longitude 100 snaps to the nearest axis value, 180.
    let rendered = draw_keo_set(&ctx, 0, 1, 100.0, &opts).unwrap();
    assert_eq!(rendered.len(), 3);
    for segment in ["raw", "bandpass", "percent-over-filter"] {
        assert!(out_dir
            .path()
            .join(format!("keo/{segment}/250/lon180/Temperature.png"))
            .is_file());
    }
}

#[test]
fn test_unmatched_plot_filter_renders_nothing() {
    let ctx = synthetic_context();
    let out_dir = tempfile::tempdir().unwrap();
    let figtype: PlotKindFilter = "histogram".parse().unwrap();
    assert!(figtype.is_empty());
    let opts = PlotOptions {
        out_path: out_dir.path(),
        kinds: &figtype,
        mode: SaveOrShow::Save,
        lat_lim: 90.0,
        cbar_half_range: None,
        clip_outliers: false,
        diff_half_ranges: &[],
        coastlines: None,
    };

    let rendered = draw_map_set(&ctx, 0, 0, TimeSelector::ByIndex(0), &opts).unwrap();
    assert!(rendered.is_empty());
    assert!(!out_dir.path().join("maps").exists());
}
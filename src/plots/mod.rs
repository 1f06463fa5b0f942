//! PNG rendering of keograms and maps, plus the per-slice drivers that turn
//! one (variable, altitude, longitude-or-time) selection into a set of
//! images.
//!
//! The drawing itself goes through plotters' bitmap backend. Figure state is
//! plain owned data here, so finishing a render (or bailing out of one with
//! `?`) drops the backend and releases its buffer on every exit path; there
//! is no lingering figure registry to clean up between frames.
mod coastline;
mod heatmap;
mod keogram;
mod map;

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};

pub use coastline::{load_optional as load_optional_coastlines, Coastlines};
pub use keogram::{render_keogram, KeoPlot};
pub use map::{render_map, MapPlot};

use crate::dataset::PlotContext;
use crate::error::ConfigError;
use crate::grid::TimeSelector;
use crate::paths::{keo_plot_path, map_plot_path, PlotKind, PlotKindFilter};
use crate::ranges::{fixed_ranges, shared_ranges, KindRanges, PercentBasis};
use crate::slices::{extract_keogram, extract_map, SliceError, SliceSet};
use crate::variables::{display_name, title_name};

/// Percent half-ranges the map percent-difference frames are rendered at
/// when no explicit colorbar limit is given.
pub const DEFAULT_DIFF_HALF_RANGES: [f64; 7] = [1.0, 2.0, 3.0, 5.0, 10.0, 30.0, 50.0];

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Could not create output directory {}: {reason}", .path.display())]
    CreateDir { path: PathBuf, reason: String },
    #[error("Could not read {}: {reason}", .path.display())]
    CouldNotRead { path: PathBuf, reason: String },
    #[error("{} is not usable GeoJSON: {reason}", .path.display())]
    BadGeoJson { path: PathBuf, reason: String },
    #[error("Drawing {} failed: {reason}", .path.display())]
    Backend { path: PathBuf, reason: String },
}

impl RenderError {
    pub(crate) fn backend(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            path: path.to_owned(),
            reason: err.to_string(),
        }
    }
}

/// Whether finished figures are written to their output path or handed to
/// the platform image viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SaveOrShow {
    Save,
    Show,
}

/// Anything that can go wrong while producing the plots for one slice.
#[derive(Debug, thiserror::Error)]
pub enum PlotJobError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Slice(#[from] SliceError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Settings shared by every plot of a run.
#[derive(Debug)]
pub struct PlotOptions<'a> {
    pub out_path: &'a Path,
    pub kinds: &'a PlotKindFilter,
    pub mode: SaveOrShow,
    /// Latitudes are plotted within +/- this value.
    pub lat_lim: f64,
    /// Explicit symmetric colorbar limit; overrides computed ranges for all
    /// plot kinds uniformly.
    pub cbar_half_range: Option<f64>,
    pub clip_outliers: bool,
    /// Half-ranges for map percent-difference frames when no explicit
    /// colorbar limit is given. Empty means a single auto-scaled frame.
    pub diff_half_ranges: &'a [f64],
    pub coastlines: Option<&'a Coastlines>,
}

fn ranges_for(
    ctx: &PlotContext,
    var_idx: usize,
    alt_idx: usize,
    basis: PercentBasis,
    opts: &PlotOptions,
) -> KindRanges {
    match opts.cbar_half_range {
        Some(half) => fixed_ranges(half),
        None => shared_ranges(ctx, var_idx, alt_idx, basis),
    }
}

fn kind_data<'s>(set: &'s SliceSet, kind: PlotKind) -> &'s ndarray::Array2<f64> {
    match kind {
        PlotKind::Raw => &set.raw,
        PlotKind::Filtered => &set.background,
        PlotKind::PercentDiff => &set.percent,
    }
}

/// Render the keogram images for one (variable, altitude, longitude)
/// selection, one per plot kind passing the filter. Returns the paths of the
/// rendered images; an empty result means the filter matched nothing, which
/// is reported by the caller, not an error.
pub fn draw_keo_set(
    ctx: &PlotContext,
    var_idx: usize,
    alt_idx: usize,
    target_lon: f64,
    opts: &PlotOptions,
) -> Result<Vec<PathBuf>, PlotJobError> {
    let code = ctx.vars().resolve_by_index(var_idx)?;
    let display = display_name(code)?;
    let ranges = ranges_for(ctx, var_idx, alt_idx, PercentBasis::Background, opts);
    let slice = extract_keogram(ctx, var_idx, alt_idx, target_lon, opts.clip_outliers)?;

    let hours = ctx.hours_since_onset();
    let alt_km = ctx.grid().alt_km(alt_idx);
    let lats = ctx.grid().lats();
    let lat_extent = (lats[0], lats[lats.len() - 1]);
    let title = format!(
        "Keogram of {} along {} deg Longitude at {} km",
        title_name(code)?,
        slice.lon as i64,
        alt_km.round() as i64,
    );

    let mut rendered = Vec::new();
    for kind in PlotKind::ALL {
        if !opts.kinds.includes(kind) {
            continue;
        }
        let (range, cbar_label) = match kind {
            PlotKind::Raw => (ranges.raw, "Raw data".to_string()),
            PlotKind::Filtered => (ranges.background, "Bandpass filter".to_string()),
            PlotKind::PercentDiff => (ranges.percent, "% over bandpass filter".to_string()),
        };
        let fname = keo_plot_path(opts.out_path, kind, alt_km, slice.lon, display);
        let plot = KeoPlot {
            data: kind_data(&slice.set, kind),
            title: title.clone(),
            cbar_label,
            range,
            hours: &hours,
            lat_extent,
            lat_lim: opts.lat_lim,
            fname,
        };
        rendered.push(render_keogram(&plot, opts.mode)?);
    }
    Ok(rendered)
}

/// Render the map images for one (variable, altitude, time) selection.
///
/// Raw and background frames render once each; percent-difference frames
/// render once per configured half-range (with the half-range encoded into
/// the path), or once auto-scaled/fixed when no half-range list applies.
pub fn draw_map_set(
    ctx: &PlotContext,
    var_idx: usize,
    alt_idx: usize,
    selector: TimeSelector,
    opts: &PlotOptions,
) -> Result<Vec<PathBuf>, PlotJobError> {
    let code = ctx.vars().resolve_by_index(var_idx)?;
    let display = display_name(code)?;
    let ranges = ranges_for(ctx, var_idx, alt_idx, PercentBasis::Raw, opts);
    let slice = extract_map(ctx, var_idx, alt_idx, selector, opts.clip_outliers)?;

    let alt_km = ctx.grid().alt_km(alt_idx);
    let lons = ctx.grid().lons();
    let lats = ctx.grid().lats();
    let lon_extent = (lons[0], lons[lons.len() - 1]);
    let lat_extent = (lats[0], lats[lats.len() - 1]);
    let title = format!(
        "{} at {} km at {} from Storm Start",
        display,
        alt_km.round() as i64,
        hours_label(slice.time, ctx.storm_onset()),
    );

    let mut rendered = Vec::new();
    let render_one = |kind: PlotKind,
                          range: crate::ranges::PlotRange,
                          cbar_label: String,
                          half_range: Option<f64>|
     -> Result<PathBuf, PlotJobError> {
        let fname = map_plot_path(
            opts.out_path,
            kind,
            alt_km,
            display,
            half_range,
            slice.time_idx,
        );
        let plot = MapPlot {
            data: kind_data(&slice.set, kind),
            title: title.clone(),
            cbar_label,
            range,
            lon_extent,
            lat_extent,
            lat_lim: opts.lat_lim,
            coastlines: opts.coastlines,
            fname,
        };
        Ok(render_map(&plot, opts.mode)?)
    };

    if opts.kinds.includes(PlotKind::Raw) {
        rendered.push(render_one(
            PlotKind::Raw,
            ranges.raw,
            display.to_string(),
            None,
        )?);
    }
    if opts.kinds.includes(PlotKind::Filtered) {
        rendered.push(render_one(
            PlotKind::Filtered,
            ranges.background,
            format!("Bandpass Filtered {display}"),
            None,
        )?);
    }
    if opts.kinds.includes(PlotKind::PercentDiff) {
        let label = "% over Background".to_string();
        if opts.cbar_half_range.is_some() || opts.diff_half_ranges.is_empty() {
            rendered.push(render_one(
                PlotKind::PercentDiff,
                ranges.percent,
                label,
                None,
            )?);
        } else {
            for &half in opts.diff_half_ranges {
                rendered.push(render_one(
                    PlotKind::PercentDiff,
                    crate::ranges::PlotRange {
                        min: -half,
                        max: half,
                    },
                    label.clone(),
                    Some(half),
                )?);
            }
        }
    }
    Ok(rendered)
}

/// Label a map time as signed elapsed hours since the storm onset.
fn hours_label(time: DateTime<Utc>, onset: DateTime<Utc>) -> String {
    let hours = (time - onset).num_seconds() as f64 / 3600.0;
    format!("{hours:+.1} hours")
}

/// Resolve where a figure should be drawn: the constructed path for saves
/// (creating directories as needed), a scratch path for shows.
pub(crate) fn prepare_target(fname: &Path, mode: SaveOrShow) -> Result<PathBuf, RenderError> {
    let target = match mode {
        SaveOrShow::Save => fname.to_owned(),
        SaveOrShow::Show => {
            let file_name = fname
                .file_name()
                .map(|n| n.to_owned())
                .unwrap_or_else(|| "plot.png".into());
            std::env::temp_dir().join("gitm_plots").join(file_name)
        }
    };
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RenderError::CreateDir {
            path: parent.to_owned(),
            reason: e.to_string(),
        })?;
    }
    Ok(target)
}

/// Hand a finished figure to the platform viewer. Failure to launch one is
/// logged, not fatal; the image is already on disk.
pub(crate) fn show_file(path: &Path) {
    #[cfg(target_os = "macos")]
    let viewer = "open";
    #[cfg(not(target_os = "macos"))]
    let viewer = "xdg-open";

    if let Err(e) = Command::new(viewer).arg(path).spawn() {
        log::warn!(
            "Could not launch {viewer} to show {}: {e}",
            path.display()
        );
    }
}

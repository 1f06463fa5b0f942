//! Geographic map rendering: a quantity against longitude (x) and latitude
//! (y) at one time and altitude, optionally with coastlines drawn on top.
use std::path::PathBuf;

use ndarray::Array2;

use super::coastline::Coastlines;
use super::heatmap::{render_heatmap, HeatmapSpec};
use super::{prepare_target, show_file, RenderError, SaveOrShow};
use crate::ranges::PlotRange;

pub struct MapPlot<'a> {
    /// Cell values indexed (longitude, latitude).
    pub data: &'a Array2<f64>,
    pub title: String,
    pub cbar_label: String,
    pub range: PlotRange,
    /// Longitude span of the data rows, degrees.
    pub lon_extent: (f64, f64),
    /// Latitude span of the data columns, degrees.
    pub lat_extent: (f64, f64),
    /// Latitudes are shown within +/- this value.
    pub lat_lim: f64,
    pub coastlines: Option<&'a Coastlines>,
    pub fname: PathBuf,
}

/// Render one map frame, returning the path it was written to.
pub fn render_map(plot: &MapPlot, mode: SaveOrShow) -> Result<PathBuf, RenderError> {
    let target = prepare_target(&plot.fname, mode)?;

    let spec = HeatmapSpec {
        data: plot.data,
        title: &plot.title,
        x_desc: "Longitude (deg)",
        y_desc: "Latitude (deg)",
        cbar_label: &plot.cbar_label,
        range: plot.range,
        x_extent: plot.lon_extent,
        y_extent: plot.lat_extent,
        y_view: (-plot.lat_lim, plot.lat_lim),
        overlay: plot.coastlines.map(|c| c.segments()),
    };
    render_heatmap(&spec, &target)?;

    if mode == SaveOrShow::Show {
        show_file(&target);
    }
    Ok(target)
}

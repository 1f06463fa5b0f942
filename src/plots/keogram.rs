//! Keogram rendering: a quantity against time (x) and latitude (y) at one
//! longitude and altitude.
use std::path::PathBuf;

use ndarray::Array2;

use super::heatmap::{render_heatmap, HeatmapSpec};
use super::{prepare_target, show_file, RenderError, SaveOrShow};
use crate::ranges::PlotRange;

pub struct KeoPlot<'a> {
    /// Cell values indexed (time, latitude).
    pub data: &'a Array2<f64>,
    pub title: String,
    pub cbar_label: String,
    pub range: PlotRange,
    /// Hours since storm onset for each time row.
    pub hours: &'a [f64],
    /// Latitude span of the data columns, degrees.
    pub lat_extent: (f64, f64),
    /// Latitudes are shown within +/- this value.
    pub lat_lim: f64,
    pub fname: PathBuf,
}

/// Render one keogram, returning the path it was written to.
pub fn render_keogram(plot: &KeoPlot, mode: SaveOrShow) -> Result<PathBuf, RenderError> {
    let target = prepare_target(&plot.fname, mode)?;

    let x_extent = plot
        .hours
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| {
            (lo.min(h), hi.max(h))
        });
    let spec = HeatmapSpec {
        data: plot.data,
        title: &plot.title,
        x_desc: "Hours since storm onset",
        y_desc: "Latitude (deg)",
        cbar_label: &plot.cbar_label,
        range: plot.range,
        x_extent,
        y_extent: plot.lat_extent,
        y_view: (-plot.lat_lim, plot.lat_lim),
        overlay: None,
    };
    render_heatmap(&spec, &target)?;

    if mode == SaveOrShow::Show {
        show_file(&target);
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_render_writes_png_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let fname = dir
            .path()
            .join("keo")
            .join("raw")
            .join("250")
            .join("lon2")
            .join("Temperature.png");
        let data = Array2::from_shape_fn((24, 18), |(t, l)| (t as f64) - (l as f64));
        let hours: Vec<f64> = (0..24).map(|h| h as f64 * 0.25).collect();

        let plot = KeoPlot {
            data: &data,
            title: "Keogram of Temperature along 2 deg Longitude at 250 km".to_string(),
            cbar_label: "Raw data".to_string(),
            range: PlotRange {
                min: -20.0,
                max: 25.0,
            },
            hours: &hours,
            lat_extent: (-87.5, 87.5),
            lat_lim: 90.0,
            fname: fname.clone(),
        };
        let written = render_keogram(&plot, SaveOrShow::Save).unwrap();
        assert_eq!(written, fname);
        assert!(fname.is_file());
        assert!(std::fs::metadata(&fname).unwrap().len() > 0);
    }
}

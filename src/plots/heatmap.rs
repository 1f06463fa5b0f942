//! Shared heatmap drawing for keograms and maps: a colormapped cell grid
//! with a colorbar strip on the right.
use std::path::Path;

use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::ViridisRGB;

use super::RenderError;
use crate::ranges::PlotRange;

const WIDTH: u32 = 960;
const HEIGHT: u32 = 640;
const CBAR_WIDTH: u32 = 150;

pub(crate) struct HeatmapSpec<'a> {
    /// Cell values indexed (x, y).
    pub data: &'a Array2<f64>,
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub cbar_label: &'a str,
    pub range: PlotRange,
    /// Data coordinates spanned by the cell grid.
    pub x_extent: (f64, f64),
    pub y_extent: (f64, f64),
    /// Visible y window; cells outside it are clipped.
    pub y_view: (f64, f64),
    /// Polylines drawn over the cells, in data coordinates.
    pub overlay: Option<&'a [Vec<(f64, f64)>]>,
}

pub(crate) fn render_heatmap(spec: &HeatmapSpec, target: &Path) -> Result<(), RenderError> {
    let root = BitMapBackend::new(target, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| RenderError::backend(target, e))?;
    let (chart_area, cbar_area) = root.split_horizontally(WIDTH - CBAR_WIDTH);

    let mut chart = ChartBuilder::on(&chart_area)
        .margin(10)
        .caption(spec.title, ("sans-serif", 20))
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(
            spec.x_extent.0..spec.x_extent.1,
            spec.y_view.0..spec.y_view.1,
        )
        .map_err(|e| RenderError::backend(target, e))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(spec.x_desc)
        .y_desc(spec.y_desc)
        .label_style(("sans-serif", 14))
        .draw()
        .map_err(|e| RenderError::backend(target, e))?;

    let (nx, ny) = spec.data.dim();
    let dx = (spec.x_extent.1 - spec.x_extent.0) / nx as f64;
    let dy = (spec.y_extent.1 - spec.y_extent.0) / ny as f64;
    chart
        .draw_series(spec.data.indexed_iter().map(|((i, j), &v)| {
            let x0 = spec.x_extent.0 + i as f64 * dx;
            let y0 = spec.y_extent.0 + j as f64 * dy;
            Rectangle::new(
                [(x0, y0), (x0 + dx, y0 + dy)],
                color_for(v, spec.range).filled(),
            )
        }))
        .map_err(|e| RenderError::backend(target, e))?;

    if let Some(segments) = spec.overlay {
        for segment in segments {
            chart
                .draw_series(LineSeries::new(segment.iter().copied(), &BLACK))
                .map_err(|e| RenderError::backend(target, e))?;
        }
    }

    draw_colorbar(&cbar_area, spec, target)?;

    root.present()
        .map_err(|e| RenderError::backend(target, e))?;
    Ok(())
}

fn draw_colorbar(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    spec: &HeatmapSpec,
    target: &Path,
) -> Result<(), RenderError> {
    // A degenerate range (constant slice) still needs a drawable axis.
    let (lo, hi) = if spec.range.max > spec.range.min {
        (spec.range.min, spec.range.max)
    } else {
        (spec.range.min - 0.5, spec.range.min + 0.5)
    };

    let mut colorbar = ChartBuilder::on(area)
        .margin_top(45)
        .margin_bottom(55)
        .margin_right(5)
        .set_label_area_size(LabelAreaPosition::Right, 85)
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(|e| RenderError::backend(target, e))?;

    let steps = 100;
    let dv = (hi - lo) / steps as f64;
    for i in 0..steps {
        let frac = i as f64 / (steps - 1) as f64;
        let v0 = lo + i as f64 * dv;
        colorbar
            .draw_series(std::iter::once(Rectangle::new(
                [(0.0, v0), (1.0, v0 + dv)],
                ViridisRGB.get_color(frac).filled(),
            )))
            .map_err(|e| RenderError::backend(target, e))?;
    }

    let magnitude = hi.abs().max(lo.abs());
    let plain_format = magnitude < 10_000.0 && magnitude >= 0.01;
    colorbar
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(6)
        .y_desc(spec.cbar_label)
        .y_label_style(("sans-serif", 13))
        .y_label_formatter(&move |v| {
            if plain_format {
                format!("{v:.1}")
            } else {
                format!("{v:.2e}")
            }
        })
        .draw()
        .map_err(|e| RenderError::backend(target, e))?;
    Ok(())
}

fn color_for(value: f64, range: PlotRange) -> RGBColor {
    let norm = if range.max > range.min {
        (value - range.min) / (range.max - range.min)
    } else {
        0.0
    };
    let norm = if norm.is_nan() { 0.0 } else { norm.clamp(0.0, 1.0) };
    ViridisRGB.get_color(norm)
}

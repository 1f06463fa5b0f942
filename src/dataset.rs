//! The immutable data bundle every extraction and rendering call works from.
use chrono::{DateTime, Utc};
use ndarray::Array5;

use crate::error::DatasetError;
use crate::grid::Grid;
use crate::variables::VariableSet;

/// What a [`crate::readers::GridReader`] hands back: the coordinate axes plus
/// the raw values, shaped (time, variable, longitude, latitude, altitude)
/// with the variable axis ordered like `vars`.
#[derive(Debug)]
pub struct RawDataset {
    pub grid: Grid,
    pub vars: VariableSet,
    pub raw: Array5<f64>,
}

/// Everything the plotting routines need, built once at startup and read-only
/// for the rest of the run: grid axes, the raw array, the filtered background
/// array, and the storm onset all plot times are expressed against.
#[derive(Debug)]
pub struct PlotContext {
    grid: Grid,
    vars: VariableSet,
    raw: Array5<f64>,
    background: Array5<f64>,
    storm_onset: DateTime<Utc>,
}

impl PlotContext {
    /// Bundle reader and filter output. Checks that the two arrays agree with
    /// each other and with the grid axes, since every slice operation indexes
    /// them against the same axes.
    pub fn new(
        dataset: RawDataset,
        background: Array5<f64>,
        storm_onset: DateTime<Utc>,
    ) -> Result<Self, DatasetError> {
        if dataset.raw.shape() != background.shape() {
            return Err(DatasetError::ShapeMismatch {
                raw: dataset.raw.shape().to_vec(),
                background: background.shape().to_vec(),
            });
        }

        let shape = dataset.raw.shape();
        let checks = [
            ("time", shape[0], dataset.grid.n_times()),
            ("variable", shape[1], dataset.vars.len()),
            ("longitude", shape[2], dataset.grid.lons().len()),
            ("latitude", shape[3], dataset.grid.lats().len()),
            ("altitude", shape[4], dataset.grid.alts().len()),
        ];
        for (name, axis_len, grid_len) in checks {
            if axis_len != grid_len {
                return Err(DatasetError::AxisMismatch {
                    name,
                    axis_len,
                    grid_len,
                });
            }
        }

        Ok(Self {
            grid: dataset.grid,
            vars: dataset.vars,
            raw: dataset.raw,
            background,
            storm_onset,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn vars(&self) -> &VariableSet {
        &self.vars
    }

    pub fn raw(&self) -> &Array5<f64> {
        &self.raw
    }

    pub fn background(&self) -> &Array5<f64> {
        &self.background
    }

    pub fn storm_onset(&self) -> DateTime<Utc> {
        self.storm_onset
    }

    /// Plot times as elapsed hours since the storm onset.
    pub fn hours_since_onset(&self) -> Vec<f64> {
        self.grid.hours_since(self.storm_onset)
    }
}

//! Grid reader for GITM output post-processed into NetCDF.
//!
//! Each file is one timestamp and holds the coordinate variables
//! (`Latitude`, `Longitude`, `Altitude`) plus one variable per 3DALL column,
//! laid out (longitude, latitude, altitude). The first file establishes the
//! grid; every later file must match it.
use std::path::Path;

use ndarray::{s, Array3, Array5};

use super::gitm::{apply_time_window, list_model_files, GridReader, ReadError, ReadRequest};
use crate::dataset::RawDataset;
use crate::grid::Grid;

pub struct NetcdfGridReader;

impl GridReader for NetcdfGridReader {
    fn read(&self, request: &ReadRequest) -> Result<RawDataset, ReadError> {
        let files = apply_time_window(
            list_model_files(&request.data_dir, &request.file_pattern)?,
            request.start_offset,
            request.end_offset,
        )?;
        log::info!(
            "Reading {} model files from {}",
            files.len(),
            request.data_dir.display()
        );

        let first = ::netcdf::open(&files[0].path)?;
        let lats = read_coord(&first, &files[0].path, "Latitude")?;
        let lons = read_coord(&first, &files[0].path, "Longitude")?;
        let alts = read_coord(&first, &files[0].path, "Altitude")?;
        drop(first);

        let times = files.iter().map(|f| f.time).collect();
        let grid = Grid::new(lats, lons, alts, times);
        let (n_lons, n_lats, n_alts) = (
            grid.lons().len(),
            grid.lats().len(),
            grid.alts().len(),
        );
        let cell_count = n_lons * n_lats * n_alts;

        let mut raw = Array5::zeros((
            files.len(),
            request.vars.len(),
            n_lons,
            n_lats,
            n_alts,
        ));
        for (t_idx, model_file) in files.iter().enumerate() {
            let file = ::netcdf::open(&model_file.path)?;
            for (v_idx, code) in request.vars.iter().enumerate() {
                let var = file
                    .variable(code)
                    .ok_or_else(|| ReadError::MissingVariable {
                        path: model_file.path.clone(),
                        var: code.to_string(),
                    })?;
                let values: Vec<f64> = var.get_values(..)?;
                if values.len() != cell_count {
                    return Err(ReadError::MismatchedGrid {
                        path: model_file.path.clone(),
                        var: code.to_string(),
                        expected: cell_count,
                        got: values.len(),
                    });
                }
                let block = Array3::from_shape_vec((n_lons, n_lats, n_alts), values)
                    .expect("length was checked against the grid dimensions");
                raw.slice_mut(s![t_idx, v_idx, .., .., ..]).assign(&block);
            }
        }

        Ok(RawDataset {
            grid,
            vars: request.vars.clone(),
            raw,
        })
    }
}

fn read_coord(file: &::netcdf::File, path: &Path, name: &str) -> Result<Vec<f64>, ReadError> {
    let var = file
        .variable(name)
        .ok_or_else(|| ReadError::MissingVariable {
            path: path.to_owned(),
            var: name.to_string(),
        })?;
    let values: Vec<f64> = var.get_values(..)?;

    // GITM stores angles in radians; converted files sometimes keep that.
    // An angular axis that never leaves [-2pi, 2pi] is taken as radians.
    if matches!(name, "Latitude" | "Longitude")
        && values
            .iter()
            .all(|v| v.abs() <= 2.0 * std::f64::consts::PI)
    {
        Ok(values.into_iter().map(|v| v.to_degrees()).collect())
    } else {
        Ok(values)
    }
}

//! Loading model output into the 5-D raw array.
//!
//! Decoding GITM's native binary output is out of scope here; the reader is
//! a collaborator behind the [`GridReader`] trait, and this module supplies
//! the pieces every implementation shares: directory listing against the
//! file-type glob, filename timestamp parsing, and time-window selection.
//! A NetCDF-backed implementation ships behind the `netcdf` feature for
//! model runs post-processed into NetCDF.
mod gitm;
#[cfg(feature = "netcdf")]
mod netcdf;

pub use gitm::{
    apply_time_window, list_model_files, parse_file_timestamp, GridReader, ModelFile, ReadError,
    ReadRequest,
};
#[cfg(feature = "netcdf")]
pub use netcdf::NetcdfGridReader;

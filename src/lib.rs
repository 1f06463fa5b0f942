pub mod dataset;
pub mod error;
pub mod filters;
pub mod grid;
pub mod logging;
pub mod outliers;
pub mod paths;
pub mod plots;
pub mod ranges;
pub mod readers;
pub mod slices;
pub mod variables;

//! Common errors across the gitm-rs crate
use std::path::PathBuf;

/// Errors in the run configuration, raised before any model data is read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested variable code is not in the 3DALL catalog. The second
    /// field lists the known codes so the message is actionable.
    #[error("Variable '{code}' is not a known 3DALL variable. Known variables are: {known}")]
    UnknownVariable { code: String, known: String },
    /// A variable index fell outside the set of variables requested for this run.
    #[error("Variable index {index} is out of range, only {n_vars} variables were requested")]
    VariableIndexOutOfRange { index: usize, n_vars: usize },
    #[error("Could not parse '{0}' as a storm onset time (expected YYYYMMDDHHMMSS, shorter strings are padded with zeros)")]
    BadOnsetTime(String),
    #[error("Could not load filter settings from {}: {reason}", .path.display())]
    BadFilterToml { path: PathBuf, reason: String },
}

/// Errors constructing the plot context from reader and filter output.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Background array shape {background:?} does not match the raw array shape {raw:?}")]
    ShapeMismatch {
        raw: Vec<usize>,
        background: Vec<usize>,
    },
    #[error(
        "Raw array has {axis_len} entries along the {name} axis but the grid provides {grid_len}"
    )]
    AxisMismatch {
        name: &'static str,
        axis_len: usize,
        grid_len: usize,
    },
}

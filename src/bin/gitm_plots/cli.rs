use std::path::PathBuf;

use clap_verbosity_flag::{InfoLevel, Verbosity};
use gitm_rs::paths::PlotKindFilter;
use gitm_rs::plots::SaveOrShow;

/// Make keograms and maps of GITM 3DALL output, raw and bandpass filtered.
#[derive(Debug, clap::Parser)]
pub(crate) struct Cli {
    /// Datetime of storm start, format YYYYMMDDHHMMSS. Shorter values are
    /// padded with zeros, so 20110521 means midnight UT.
    pub(crate) dtime_storm_start: String,

    /// Path to the directory of model output files.
    #[clap(short = 'g', long, default_value = "./gitm_dir")]
    pub(crate) gitm_data_path: PathBuf,

    /// Directory plots are written under.
    #[clap(long, default_value = "./")]
    pub(crate) out_path: PathBuf,

    /// Which variables to plot, as 3DALL codes, or "all".
    #[clap(long, num_args = 1.., default_value = "all")]
    pub(crate) cols: Vec<String>,

    /// Skip this many files from the start of the matched file list.
    /// Negative means no restriction.
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    pub(crate) plot_start_delta: i64,

    /// Stop before this index of the matched file list. Negative means no
    /// restriction.
    #[clap(long, default_value_t = -1, allow_negative_numbers = true)]
    pub(crate) plot_end_delta: i64,

    /// Save plots to out_path, or show them in the platform image viewer.
    #[clap(long, default_value_t = SaveOrShow::Save)]
    pub(crate) save_or_show: SaveOrShow,

    /// Which plot kinds to make: a string matched against raw/filt/diff,
    /// or "all". A string matching none of them makes no plots.
    #[clap(long, default_value = "all")]
    pub(crate) figtype: PlotKindFilter,

    /// Limit plotted latitudes to +/- this value in keos and maps.
    #[clap(long, default_value_t = 90.0, allow_negative_numbers = true)]
    pub(crate) lat_lim: f64,

    /// Fix every colorbar to +/- this value instead of computing ranges
    /// from the data.
    #[clap(long)]
    pub(crate) cbarlims: Option<f64>,

    /// Which file type to plot, e.g. 3DALL* or 2DANC*.
    #[clap(short = 'f', long, default_value = "3DALL*")]
    pub(crate) file_type: String,

    /// Replace values more than 5 sigma from the mean with the median
    /// before plotting.
    #[clap(short = 'o', long)]
    pub(crate) outliers: bool,

    /// Make keograms.
    #[clap(short = 'k', long)]
    pub(crate) keogram: bool,

    /// Longitudes to plot keograms along, degrees.
    #[clap(long, num_args = 1.., allow_negative_numbers = true,
           default_values_t = [-90.0, 2.0, 90.0, -178.0])]
    pub(crate) keo_lons: Vec<f64>,

    /// Altitude indices to plot. Pass -1 for every altitude in the grid.
    #[clap(long, num_args = 1.., allow_negative_numbers = true,
           default_values_t = [5i64, 10, 15, 22, 30, 45])]
    pub(crate) gitm_alt_idxs: Vec<i64>,

    /// Make maps.
    #[clap(short = 'm', long)]
    pub(crate) map: bool,

    /// Half-ranges (percent) for the map percent-difference frames. An
    /// empty list makes a single auto-scaled frame per time.
    #[clap(long, num_args = 0..,
           default_values_t = [1.0, 2.0, 3.0, 5.0, 10.0, 30.0, 50.0])]
    pub(crate) map_diff_lims: Vec<f64>,

    /// GeoJSON file of coastline/land outlines drawn on maps.
    #[clap(long)]
    pub(crate) world_file: Option<PathBuf>,

    /// TOML file overriding the background filter settings
    /// (keys: order, cutoff).
    #[clap(long)]
    pub(crate) filter_config: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) verbosity: Verbosity<InfoLevel>,
}

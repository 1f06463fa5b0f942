use std::process::ExitCode;

use clap::Parser;
use error_stack::ResultExt;
use indicatif::ProgressBar;
use log::{info, warn};

use gitm_rs::dataset::PlotContext;
use gitm_rs::filters::{make_fits, FilterConfig};
use gitm_rs::grid::{parse_storm_onset, TimeSelector};
use gitm_rs::logging::init_logging;
use gitm_rs::plots::{
    draw_keo_set, draw_map_set, load_optional_coastlines, PlotOptions,
};
use gitm_rs::readers::{GridReader, ReadRequest};
use gitm_rs::variables::VariableSet;

mod cli;
use cli::Cli;

fn main() -> ExitCode {
    if let Err(e) = main_inner() {
        eprintln!("ERROR: {e:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct RunError(String);

impl RunError {
    fn custom(msg: impl ToString) -> Self {
        Self(msg.to_string())
    }
}

fn main_inner() -> error_stack::Result<(), RunError> {
    let clargs = Cli::parse();
    init_logging(clargs.verbosity.log_level_filter());

    let storm_onset = parse_storm_onset(&clargs.dtime_storm_start)
        .change_context_lazy(|| RunError::custom("Invalid storm start time"))?;

    // Resolve everything the run needs before touching any model file, so a
    // typo'd variable or filter setting fails in milliseconds, not after the
    // whole dataset is loaded.
    let vars = if clargs.cols.len() == 1 && clargs.cols[0] == "all" {
        VariableSet::all()
    } else {
        VariableSet::from_codes(&clargs.cols)
            .change_context_lazy(|| RunError::custom("Unusable --cols selection"))?
    };

    let filter_config = match &clargs.filter_config {
        Some(path) => FilterConfig::from_toml_file(path)
            .change_context_lazy(|| RunError::custom("Unusable filter settings"))?,
        None => FilterConfig::default(),
    };

    let coastlines = load_optional_coastlines(clargs.world_file.as_ref())
        .change_context_lazy(|| RunError::custom("Could not load the coastline file"))?;

    if clargs.figtype.is_empty() {
        warn!(
            "Plot type '{}' matches none of raw/filt/diff; no images will be produced",
            clargs.figtype
        );
    }

    let reader = make_reader().map_err(error_stack::Report::new)?;
    let request = ReadRequest {
        data_dir: clargs.gitm_data_path.clone(),
        file_pattern: clargs.file_type.clone(),
        vars,
        start_offset: usize::try_from(clargs.plot_start_delta).ok(),
        end_offset: usize::try_from(clargs.plot_end_delta).ok(),
    };
    let dataset = reader
        .read(&request)
        .change_context_lazy(|| RunError::custom("Could not read the model output"))?;
    info!(
        "Loaded {} timestamps of {} variables on a {}x{}x{} grid",
        dataset.grid.n_times(),
        dataset.vars.len(),
        dataset.grid.lons().len(),
        dataset.grid.lats().len(),
        dataset.grid.alts().len(),
    );

    info!("Calculating background fits. This will take a moment...");
    let background = make_fits(&dataset.raw, &filter_config)
        .change_context_lazy(|| RunError::custom("Background filtering failed"))?;
    let ctx = PlotContext::new(dataset, background, storm_onset)
        .change_context_lazy(|| RunError::custom("Reader output was inconsistent"))?;

    let alt_idxs = resolve_alt_idxs(&clargs.gitm_alt_idxs, ctx.grid().alts().len())
        .map_err(error_stack::Report::new)?;

    let opts = PlotOptions {
        out_path: &clargs.out_path,
        kinds: &clargs.figtype,
        mode: clargs.save_or_show,
        lat_lim: clargs.lat_lim,
        cbar_half_range: clargs.cbarlims,
        clip_outliers: clargs.outliers,
        diff_half_ranges: &clargs.map_diff_lims,
        coastlines: coastlines.as_ref(),
    };

    if clargs.keogram {
        make_keograms(&ctx, &alt_idxs, &clargs.keo_lons, &opts)?;
    }
    if clargs.map {
        make_maps(&ctx, &alt_idxs, &opts)?;
    }
    if !clargs.keogram && !clargs.map {
        warn!("Neither --keogram nor --map was given; nothing to do");
    }

    Ok(())
}

fn make_keograms(
    ctx: &PlotContext,
    alt_idxs: &[usize],
    keo_lons: &[f64],
    opts: &PlotOptions,
) -> error_stack::Result<(), RunError> {
    info!("Making keograms");
    let total = alt_idxs.len() * keo_lons.len() * ctx.vars().len();
    let pbar = ProgressBar::new(total as u64);
    for &alt_idx in alt_idxs {
        for &lon in keo_lons {
            for var_idx in 0..ctx.vars().len() {
                let rendered = draw_keo_set(ctx, var_idx, alt_idx, lon, opts)
                    .change_context_lazy(|| {
                        RunError::custom(format!(
                            "Keogram plotting failed for variable index {var_idx} at altitude index {alt_idx}, longitude {lon}"
                        ))
                    })?;
                if rendered.is_empty() {
                    info!("No keogram kinds matched plot filter; nothing made");
                }
                pbar.inc(1);
            }
        }
    }
    pbar.finish_and_clear();
    Ok(())
}

fn make_maps(
    ctx: &PlotContext,
    alt_idxs: &[usize],
    opts: &PlotOptions,
) -> error_stack::Result<(), RunError> {
    info!("Making maps");
    let n_times = ctx.grid().n_times();
    let total = ctx.vars().len() * alt_idxs.len() * n_times;
    let pbar = ProgressBar::new(total as u64);
    for var_idx in 0..ctx.vars().len() {
        for &alt_idx in alt_idxs {
            for time_idx in 0..n_times {
                let rendered =
                    draw_map_set(ctx, var_idx, alt_idx, TimeSelector::ByIndex(time_idx), opts)
                        .change_context_lazy(|| {
                            RunError::custom(format!(
                                "Map plotting failed for variable index {var_idx} at altitude index {alt_idx}, time index {time_idx}"
                            ))
                        })?;
                if rendered.is_empty() {
                    info!("No map kinds matched plot filter; nothing made");
                }
                pbar.inc(1);
            }
        }
    }
    pbar.finish_and_clear();
    Ok(())
}

/// Map the CLI altitude index list onto the loaded grid: -1 anywhere means
/// every altitude, and explicit indices must be in range.
fn resolve_alt_idxs(requested: &[i64], n_alts: usize) -> Result<Vec<usize>, RunError> {
    if requested.iter().any(|&idx| idx < 0) {
        return Ok((0..n_alts).collect());
    }
    requested
        .iter()
        .map(|&idx| {
            let idx = idx as usize;
            if idx < n_alts {
                Ok(idx)
            } else {
                Err(RunError::custom(format!(
                    "Altitude index {idx} is out of range; the grid has {n_alts} levels"
                )))
            }
        })
        .collect()
}

fn make_reader() -> Result<Box<dyn GridReader>, RunError> {
    #[cfg(feature = "netcdf")]
    return Ok(Box::new(gitm_rs::readers::NetcdfGridReader));

    #[cfg(not(feature = "netcdf"))]
    return Err(RunError::custom(
        "This build cannot decode model files; rebuild with the 'netcdf' feature to read NetCDF-converted GITM output",
    ));
}

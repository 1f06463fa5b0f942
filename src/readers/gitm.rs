use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};

use crate::dataset::RawDataset;
use crate::variables::VariableSet;

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("No files matching '{pattern}' under {}", .dir.display())]
    NoFiles { dir: PathBuf, pattern: String },
    #[error("Could not list files under {}: {reason}", .dir.display())]
    ListDir { dir: PathBuf, reason: String },
    #[error("Could not parse a model timestamp from file name '{0}' (expected ..._tYYMMDD_HHMMSS...)")]
    BadFileName(String),
    #[error("Time window [{start}, {end}) selects none of the {n_files} matched files")]
    EmptyWindow {
        start: usize,
        end: usize,
        n_files: usize,
    },
    #[error("Could not read {}: {reason}", .path.display())]
    CouldNotRead { path: PathBuf, reason: String },
    #[error("File {} is missing variable '{var}'", .path.display())]
    MissingVariable { path: PathBuf, var: String },
    #[error("Variable '{var}' in {} has {got} values, expected {expected} for the grid from the first file", .path.display())]
    MismatchedGrid {
        path: PathBuf,
        var: String,
        expected: usize,
        got: usize,
    },
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] ::netcdf::Error),
}

/// What the orchestrator asks a reader for: where the model output lives,
/// which files of it to use, and which variables to pull out, in order.
#[derive(Debug)]
pub struct ReadRequest {
    pub data_dir: PathBuf,
    /// Glob matched against file names in `data_dir`, e.g. `3DALL*`.
    pub file_pattern: String,
    pub vars: VariableSet,
    /// Skip this many files from the start of the (time-sorted) match list.
    pub start_offset: Option<usize>,
    /// Stop before this index of the match list.
    pub end_offset: Option<usize>,
}

/// Loads a directory of model output into a [`RawDataset`]. Implementations
/// own the file format; everything downstream only sees the 5-D array and
/// its axes.
pub trait GridReader {
    fn read(&self, request: &ReadRequest) -> Result<RawDataset, ReadError>;
}

/// One matched model output file and the timestamp from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    pub time: DateTime<Utc>,
    pub path: PathBuf,
}

/// Files under `dir` matching `pattern`, sorted by their filename timestamp.
/// A matching file without a parseable timestamp is an error rather than
/// being skipped, since silently dropping a frame would desynchronize the
/// time axis from what the user expects.
pub fn list_model_files(dir: &Path, pattern: &str) -> Result<Vec<ModelFile>, ReadError> {
    let full_pattern = dir.join(pattern);
    let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| ReadError::ListDir {
        dir: dir.to_owned(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReadError::ListDir {
            dir: dir.to_owned(),
            reason: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let time =
            parse_file_timestamp(&name).ok_or_else(|| ReadError::BadFileName(name.clone()))?;
        files.push(ModelFile { time, path });
    }

    if files.is_empty() {
        return Err(ReadError::NoFiles {
            dir: dir.to_owned(),
            pattern: pattern.to_string(),
        });
    }
    files.sort_by_key(|f| f.time);
    Ok(files)
}

/// Timestamp embedded in a GITM output file name, e.g.
/// `3DALL_t110521_063000.bin` is 2011-05-21 06:30:00 UT.
pub fn parse_file_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let pos = name.find("_t")?;
    let stamp = name.get(pos + 2..pos + 15)?;
    let (date, time) = stamp.split_once('_')?;
    if date.len() != 6 || time.len() != 6 {
        return None;
    }
    let field = |s: &str, lo: usize, hi: usize| s.get(lo..hi)?.parse::<u32>().ok();

    // Two-digit years count from 2000; GITM postdates it comfortably.
    let year = 2000 + field(date, 0, 2)? as i32;
    let naive = NaiveDate::from_ymd_opt(year, field(date, 2, 4)?, field(date, 4, 6)?)?
        .and_hms_opt(field(time, 0, 2)?, field(time, 2, 4)?, field(time, 4, 6)?)?;
    Some(naive.and_utc())
}

/// Restrict the matched files to the `[start, end)` window of indices.
pub fn apply_time_window(
    files: Vec<ModelFile>,
    start_offset: Option<usize>,
    end_offset: Option<usize>,
) -> Result<Vec<ModelFile>, ReadError> {
    let n_files = files.len();
    let start = start_offset.unwrap_or(0);
    let end = end_offset.unwrap_or(n_files).min(n_files);
    if start >= end {
        return Err(ReadError::EmptyWindow {
            start,
            end,
            n_files,
        });
    }
    Ok(files
        .into_iter()
        .skip(start)
        .take(end - start)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_file_timestamp() {
        let t = parse_file_timestamp("3DALL_t110521_063000.bin").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2011, 5, 21, 6, 30, 0).unwrap());

        let t = parse_file_timestamp("3DALL_t110521_063000.nc").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2011, 5, 21, 6, 30, 0).unwrap());

        assert!(parse_file_timestamp("3DALL_t1105.bin").is_none());
        assert!(parse_file_timestamp("notes.txt").is_none());
        assert!(parse_file_timestamp("3DALL_t11x521_063000.bin").is_none());
    }

    #[test]
    fn test_list_model_files_sorts_by_time() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "3DALL_t110521_070000.bin",
            "3DALL_t110521_060000.bin",
            "3DALL_t110521_063000.bin",
            "2DANC_t110521_060000.bin",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = list_model_files(dir.path(), "3DALL*").unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(
            files[0].time,
            Utc.with_ymd_and_hms(2011, 5, 21, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_no_matching_files_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_model_files(dir.path(), "3DALL*").unwrap_err();
        assert!(matches!(err, ReadError::NoFiles { .. }));
    }

    #[test]
    fn test_time_window_selection() {
        let files: Vec<ModelFile> = (0..5)
            .map(|h| ModelFile {
                time: Utc.with_ymd_and_hms(2011, 5, 21, h, 0, 0).unwrap(),
                path: PathBuf::from(format!("3DALL_t110521_{h:02}0000.bin")),
            })
            .collect();

        let windowed = apply_time_window(files.clone(), Some(1), Some(4)).unwrap();
        assert_eq!(windowed.len(), 3);
        assert_eq!(windowed[0].time.to_string(), "2011-05-21 01:00:00 UTC");

        let all = apply_time_window(files.clone(), None, None).unwrap();
        assert_eq!(all.len(), 5);

        let err = apply_time_window(files, Some(4), Some(4)).unwrap_err();
        assert!(matches!(err, ReadError::EmptyWindow { .. }));
    }
}

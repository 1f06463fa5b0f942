//! Coordinate axes for the loaded model output.
use chrono::{DateTime, NaiveDateTime, Utc};
use ndarray::Array1;

use crate::error::ConfigError;

/// The spatial and temporal axes every data array is indexed against.
///
/// Axis values are sorted ascending and deduplicated on construction, and the
/// struct is never mutated afterwards, so an index into a data array and an
/// index into the matching axis always refer to the same grid point.
#[derive(Debug, Clone)]
pub struct Grid {
    lats: Array1<f64>,
    lons: Array1<f64>,
    alts: Array1<f64>,
    times: Vec<DateTime<Utc>>,
}

impl Grid {
    pub fn new(
        lats: Vec<f64>,
        lons: Vec<f64>,
        alts: Vec<f64>,
        times: Vec<DateTime<Utc>>,
    ) -> Self {
        Self {
            lats: unique_sorted(lats),
            lons: unique_sorted(lons),
            alts: unique_sorted(alts),
            times,
        }
    }

    /// Latitudes in degrees.
    pub fn lats(&self) -> &Array1<f64> {
        &self.lats
    }

    /// Longitudes in degrees.
    pub fn lons(&self) -> &Array1<f64> {
        &self.lons
    }

    /// Altitudes in meters (GITM stores altitude in meters; plot labels and
    /// output paths use kilometers, see [`Grid::alt_km`]).
    pub fn alts(&self) -> &Array1<f64> {
        &self.alts
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    /// Altitude of the given level, in kilometers.
    pub fn alt_km(&self, alt_idx: usize) -> f64 {
        self.alts[alt_idx] / 1000.0
    }

    /// Elapsed fractional hours of every timestamp relative to `onset`.
    /// Timestamps before the onset come out negative.
    pub fn hours_since(&self, onset: DateTime<Utc>) -> Vec<f64> {
        self.times
            .iter()
            .map(|t| (*t - onset).num_seconds() as f64 / 3600.0)
            .collect()
    }

    /// Index and actual value of the longitude closest to `target_deg`.
    /// Nearest neighbor only, no interpolation.
    pub fn nearest_lon(&self, target_deg: f64) -> (usize, f64) {
        let idx = argmin_abs_diff(self.lons.iter().copied(), target_deg);
        (idx, self.lons[idx])
    }

    /// Index of the timestamp closest to `target`.
    pub fn nearest_time(&self, target: DateTime<Utc>) -> usize {
        argmin_abs_diff(
            self.times
                .iter()
                .map(|t| t.timestamp_millis() as f64),
            target.timestamp_millis() as f64,
        )
    }
}

/// How the caller identifies the time of a map: by index into the loaded
/// timestamps, or by the nearest loaded timestamp to a given instant.
#[derive(Debug, Clone, Copy)]
pub enum TimeSelector {
    ByIndex(usize),
    Nearest(DateTime<Utc>),
}

/// Parse a storm onset time in the `YYYYMMDDHHMMSS` format used on the
/// command line. Shorter strings are padded on the right with zeros, so
/// `20110521` means midnight UT on 2011-05-21.
pub fn parse_storm_onset(s: &str) -> Result<DateTime<Utc>, ConfigError> {
    if s.len() > 14 || !s.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::BadOnsetTime(s.to_string()));
    }
    let padded = format!("{s:0<14}");
    NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S")
        .map(|naive| naive.and_utc())
        .map_err(|_| ConfigError::BadOnsetTime(s.to_string()))
}

fn unique_sorted(mut values: Vec<f64>) -> Array1<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    Array1::from(values)
}

fn argmin_abs_diff(values: impl Iterator<Item = f64>, target: f64) -> usize {
    values
        .enumerate()
        .fold(None, |acc: Option<(usize, f64)>, (i, v)| {
            let diff = (v - target).abs();
            match acc {
                Some((_, best)) if best <= diff => acc,
                _ => Some((i, diff)),
            }
        })
        .map(|(i, _)| i)
        .expect("axis must have at least one value")
}

//! Background fits for the loaded model data.
//!
//! The "background" against which storm perturbations are measured is a
//! smoothed trend of each grid cell's time series, produced by a low-pass
//! Butterworth filter run forward and backward (zero phase) along the time
//! axis. Every (variable, longitude, latitude, altitude) cell is filtered
//! independently; the output array has exactly the shape of the input and is
//! computed once per run.
use std::f64::consts::PI;
use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use nalgebra::{DMatrix, DVector};
use ndarray::{Array5, Axis, Zip};
use num_complex::Complex64;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Time series too short to filter: needed at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("Invalid filter design: {0}")]
    BadDesign(String),
}

/// Tunable filter settings. The defaults (third order, cutoff at a tenth of
/// the Nyquist frequency) keep variations slower than roughly twenty output
/// cadences and smooth out everything faster.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Butterworth filter order.
    pub order: usize,
    /// Low-pass cutoff as a fraction of the Nyquist frequency, in (0, 1).
    pub cutoff: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            order: 3,
            cutoff: 0.1,
        }
    }
}

impl FilterConfig {
    /// Load settings from a TOML file; keys not present keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::BadFilterToml {
                path: path.to_owned(),
                reason: "file does not exist".to_string(),
            });
        }
        Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ConfigError::BadFilterToml {
                path: path.to_owned(),
                reason: e.to_string(),
            })
    }
}

/// A digital Butterworth low-pass filter in transfer-function form, with the
/// steady-state initial conditions needed for zero-phase filtering
/// precomputed (they depend only on the coefficients, and [`make_fits`]
/// reuses one filter across millions of lanes).
#[derive(Debug, Clone)]
pub struct Butterworth {
    b: Vec<f64>,
    a: Vec<f64>,
    zi: Vec<f64>,
}

impl Butterworth {
    /// Design a low-pass filter of the given order with the cutoff expressed
    /// as a fraction of the Nyquist frequency, via the bilinear transform of
    /// the analog Butterworth prototype.
    pub fn lowpass(order: usize, cutoff: f64) -> Result<Self, FilterError> {
        if order == 0 {
            return Err(FilterError::BadDesign("order must be at least 1".to_string()));
        }
        if !(cutoff > 0.0 && cutoff < 1.0) {
            return Err(FilterError::BadDesign(format!(
                "cutoff must be a Nyquist fraction in (0, 1), got {cutoff}"
            )));
        }

        // Analog prototype: poles evenly spaced on the left half of the unit
        // circle, scaled to the pre-warped cutoff frequency.
        let fs = 2.0;
        let warped = 2.0 * fs * (PI * cutoff / fs).tan();
        let analog_poles: Vec<Complex64> = (0..order)
            .map(|k| {
                let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
                Complex64::from_polar(warped, theta)
            })
            .collect();
        let analog_gain = warped.powi(order as i32);

        // Bilinear transform. The analog prototype has no finite zeros, so
        // the digital filter gets all of its zeros at z = -1.
        let fs2 = 2.0 * fs;
        let digital_poles: Vec<Complex64> = analog_poles
            .iter()
            .map(|p| (Complex64::new(fs2, 0.0) + p) / (Complex64::new(fs2, 0.0) - p))
            .collect();
        let denom: Complex64 = analog_poles
            .iter()
            .map(|p| Complex64::new(fs2, 0.0) - p)
            .product();
        let digital_gain = analog_gain * (Complex64::new(1.0, 0.0) / denom).re;

        let digital_zeros = vec![Complex64::new(-1.0, 0.0); order];
        let b: Vec<f64> = poly_from_roots(&digital_zeros)
            .into_iter()
            .map(|c| c.re * digital_gain)
            .collect();
        let a: Vec<f64> = poly_from_roots(&digital_poles)
            .into_iter()
            .map(|c| c.re)
            .collect();

        let zi = lfilter_zi(&b, &a);
        Ok(Self { b, a, zi })
    }

    /// Samples of padding added to each end of the series before filtering,
    /// and therefore one less than the minimum series length.
    pub fn pad_len(&self) -> usize {
        3 * self.a.len().max(self.b.len())
    }

    pub fn min_series_len(&self) -> usize {
        self.pad_len() + 1
    }

    /// Zero-phase filtering: run the filter forward, then backward over the
    /// result, with odd-reflection padding at both ends and steady-state
    /// initial conditions so a constant series passes through unchanged.
    pub fn filtfilt(&self, x: &[f64]) -> Result<Vec<f64>, FilterError> {
        if x.len() < self.min_series_len() {
            return Err(FilterError::InsufficientData {
                required: self.min_series_len(),
                actual: x.len(),
            });
        }
        Ok(self.filtfilt_unchecked(x))
    }

    fn filtfilt_unchecked(&self, x: &[f64]) -> Vec<f64> {
        let pad = self.pad_len();
        let n = x.len();

        // Odd extension: reflect the series through its end points.
        let mut ext = Vec::with_capacity(n + 2 * pad);
        for i in (1..=pad).rev() {
            ext.push(2.0 * x[0] - x[i]);
        }
        ext.extend_from_slice(x);
        for i in 1..=pad {
            ext.push(2.0 * x[n - 1] - x[n - 1 - i]);
        }

        let z0: Vec<f64> = self.zi.iter().map(|z| z * ext[0]).collect();
        let forward = self.lfilter(&ext, z0);

        let reversed: Vec<f64> = forward.into_iter().rev().collect();
        let z0: Vec<f64> = self.zi.iter().map(|z| z * reversed[0]).collect();
        let backward = self.lfilter(&reversed, z0);

        backward.into_iter().rev().skip(pad).take(n).collect()
    }

    /// Direct form II transposed with the given initial state.
    fn lfilter(&self, x: &[f64], mut z: Vec<f64>) -> Vec<f64> {
        let n = self.a.len();
        let mut y = Vec::with_capacity(x.len());
        for &xi in x {
            let yi = self.b[0] * xi + z[0];
            for j in 0..n - 2 {
                z[j] = self.b[j + 1] * xi + z[j + 1] - self.a[j + 1] * yi;
            }
            z[n - 2] = self.b[n - 1] * xi - self.a[n - 1] * yi;
            y.push(yi);
        }
        y
    }
}

/// Smoothed background for the whole dataset: the time series at every
/// (variable, longitude, latitude, altitude) cell replaced by its low-pass
/// trend. Output shape equals input shape. Fails before touching any lane if
/// the time axis is shorter than the filter's padding requires.
pub fn make_fits(raw: &Array5<f64>, config: &FilterConfig) -> Result<Array5<f64>, FilterError> {
    let filter = Butterworth::lowpass(config.order, config.cutoff)?;
    let n_times = raw.len_of(Axis(0));
    if n_times < filter.min_series_len() {
        return Err(FilterError::InsufficientData {
            required: filter.min_series_len(),
            actual: n_times,
        });
    }

    let mut fits = Array5::zeros(raw.raw_dim());
    Zip::from(fits.lanes_mut(Axis(0)))
        .and(raw.lanes(Axis(0)))
        .par_for_each(|mut out, lane| {
            let series = lane.to_vec();
            let smoothed = filter.filtfilt_unchecked(&series);
            for (o, s) in out.iter_mut().zip(smoothed) {
                *o = s;
            }
        });
    Ok(fits)
}

/// Multiply out a monic polynomial from its roots, highest power first.
fn poly_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        coeffs.push(Complex64::new(0.0, 0.0));
        for i in (1..coeffs.len()).rev() {
            let prev = coeffs[i - 1];
            coeffs[i] -= root * prev;
        }
    }
    coeffs
}

/// Initial filter state that is at steady state for a unit step input, so
/// scaling it by the first sample removes the startup transient. This is the
/// usual companion-matrix construction: solve (I - A^T) zi = B with A the
/// companion matrix of the denominator.
fn lfilter_zi(b: &[f64], a: &[f64]) -> Vec<f64> {
    let n = a.len() - 1;
    let mut m = DMatrix::<f64>::identity(n, n);
    for i in 0..n {
        m[(i, 0)] += a[i + 1];
        if i + 1 < n {
            m[(i, i + 1)] -= 1.0;
        }
    }
    let rhs = DVector::from_iterator(n, (0..n).map(|i| b[i + 1] - a[i + 1] * b[0]));
    let zi = m
        .lu()
        .solve(&rhs)
        .expect("steady-state system for a stable Butterworth filter is nonsingular");
    zi.iter().copied().collect()
}

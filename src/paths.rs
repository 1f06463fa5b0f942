//! Output file-path construction.
//!
//! Every image lands at a deterministic path encoding the plot category
//! (`keo` or `maps`), the plot kind, the altitude in kilometers, the
//! longitude or zero-padded time index, and the variable's display name:
//!
//! - `out/keo/{bandpass,raw,percent-over-filter}/<alt_km>/lon<lon>/<variable>.png`
//! - `out/maps/{raw,bandpass,diff}/<alt_km>/<variable>/[<halfrange>/]<ttt>.png`
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The three things plotted for every slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Raw,
    Filtered,
    PercentDiff,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [PlotKind::Raw, PlotKind::Filtered, PlotKind::PercentDiff];

    /// Directory segment under `keo/`.
    pub fn keo_segment(&self) -> &'static str {
        match self {
            PlotKind::Raw => "raw",
            PlotKind::Filtered => "bandpass",
            PlotKind::PercentDiff => "percent-over-filter",
        }
    }

    /// Directory segment under `maps/`.
    pub fn map_segment(&self) -> &'static str {
        match self {
            PlotKind::Raw => "raw",
            PlotKind::Filtered => "bandpass",
            PlotKind::PercentDiff => "diff",
        }
    }

    /// The token a plot-kind filter string is matched against.
    fn token(&self) -> &'static str {
        match self {
            PlotKind::Raw => "raw",
            PlotKind::Filtered => "filt",
            PlotKind::PercentDiff => "diff",
        }
    }
}

/// The user's plot-kind filter. `"all"` selects every kind; otherwise a kind
/// is selected when its token (`raw`, `filt`, `diff`) appears in the string,
/// so `"rawdiff"` selects two kinds. A string matching nothing is not an
/// error; the caller reports it and moves on.
#[derive(Debug, Clone)]
pub struct PlotKindFilter(String);

impl PlotKindFilter {
    pub fn includes(&self, kind: PlotKind) -> bool {
        self.0 == "all" || self.0.contains(kind.token())
    }

    /// True when no kind at all matches, which means a whole call will
    /// silently produce nothing.
    pub fn is_empty(&self) -> bool {
        !PlotKind::ALL.iter().any(|k| self.includes(*k))
    }
}

impl FromStr for PlotKindFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_lowercase()))
    }
}

impl std::fmt::Display for PlotKindFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Path for one keogram image. Altitude and longitude are truncated to whole
/// numbers the way the historical tree was laid out.
pub fn keo_plot_path(
    out_path: &Path,
    kind: PlotKind,
    alt_km: f64,
    lon: f64,
    display_name: &str,
) -> PathBuf {
    out_path
        .join("keo")
        .join(kind.keo_segment())
        .join(format!("{}", alt_km as i64))
        .join(format!("lon{}", lon as i64))
        .join(format!("{display_name}.png"))
}

/// Path for one map frame. Percent-difference maps rendered at a fixed
/// half-range get an extra directory level for it, so the frames of each
/// half-range animate as a set.
pub fn map_plot_path(
    out_path: &Path,
    kind: PlotKind,
    alt_km: f64,
    display_name: &str,
    half_range: Option<f64>,
    time_idx: usize,
) -> PathBuf {
    let mut path = out_path
        .join("maps")
        .join(kind.map_segment())
        .join(format!("{}", alt_km as i64))
        .join(display_name);
    if let Some(half_range) = half_range {
        path = path.join(format!("{}", half_range as i64));
    }
    path.join(format!("{time_idx:03}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keo_paths() {
        let path = keo_plot_path(Path::new("plots"), PlotKind::Filtered, 254.7, -178.0, "O2");
        assert_eq!(path, PathBuf::from("plots/keo/bandpass/254/lon-178/O2.png"));

        let path = keo_plot_path(Path::new("plots"), PlotKind::PercentDiff, 120.0, 2.0, "NO+");
        assert_eq!(
            path,
            PathBuf::from("plots/keo/percent-over-filter/120/lon2/NO+.png")
        );
    }

    #[test]
    fn test_map_paths() {
        let path = map_plot_path(Path::new("plots"), PlotKind::Raw, 254.7, "Temperature", None, 7);
        assert_eq!(
            path,
            PathBuf::from("plots/maps/raw/254/Temperature/007.png")
        );

        let path = map_plot_path(
            Path::new("plots"),
            PlotKind::PercentDiff,
            254.7,
            "Temperature",
            Some(10.0),
            123,
        );
        assert_eq!(
            path,
            PathBuf::from("plots/maps/diff/254/Temperature/10/123.png")
        );
    }

    #[test]
    fn test_kind_filter_matching() {
        let all: PlotKindFilter = "all".parse().unwrap();
        assert!(all.includes(PlotKind::Raw));
        assert!(all.includes(PlotKind::Filtered));
        assert!(all.includes(PlotKind::PercentDiff));
        assert!(!all.is_empty());

        let rawdiff: PlotKindFilter = "rawdiff".parse().unwrap();
        assert!(rawdiff.includes(PlotKind::Raw));
        assert!(!rawdiff.includes(PlotKind::Filtered));
        assert!(rawdiff.includes(PlotKind::PercentDiff));

        let nothing: PlotKindFilter = "keograms-please".parse().unwrap();
        assert!(nothing.is_empty());
    }
}

//! Coastline overlay data for map plots.
//!
//! The geography background is a collaborator input: a GeoJSON file of land
//! outlines (for example Natural Earth's low-resolution countries layer
//! converted to GeoJSON). Only the outlines are used, so every Polygon,
//! MultiPolygon, LineString, and MultiLineString geometry is flattened into
//! plain (lon, lat) polylines and everything else is ignored.
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::RenderError;

#[derive(Debug, Clone)]
pub struct Coastlines {
    segments: Vec<Vec<(f64, f64)>>,
}

impl Coastlines {
    pub fn from_geojson(path: &Path) -> Result<Self, RenderError> {
        let text = std::fs::read_to_string(path).map_err(|e| RenderError::CouldNotRead {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let doc: Value =
            serde_json::from_str(&text).map_err(|e| RenderError::BadGeoJson {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;

        let mut segments = Vec::new();
        collect_geometries(&doc, &mut segments);
        if segments.is_empty() {
            return Err(RenderError::BadGeoJson {
                path: path.to_owned(),
                reason: "no line or polygon geometries found".to_string(),
            });
        }
        log::debug!(
            "Loaded {} coastline segments from {}",
            segments.len(),
            path.display()
        );
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Vec<(f64, f64)>] {
        &self.segments
    }
}

fn collect_geometries(value: &Value, segments: &mut Vec<Vec<(f64, f64)>>) {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            if let Some(features) = value.get("features").and_then(Value::as_array) {
                for feature in features {
                    collect_geometries(feature, segments);
                }
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get("geometry") {
                collect_geometries(geometry, segments);
            }
        }
        Some("GeometryCollection") => {
            if let Some(geometries) = value.get("geometries").and_then(Value::as_array) {
                for geometry in geometries {
                    collect_geometries(geometry, segments);
                }
            }
        }
        Some("LineString") => {
            if let Some(coords) = value.get("coordinates") {
                push_line(coords, segments);
            }
        }
        Some("MultiLineString") | Some("Polygon") => {
            if let Some(lines) = value.get("coordinates").and_then(Value::as_array) {
                for line in lines {
                    push_line(line, segments);
                }
            }
        }
        Some("MultiPolygon") => {
            if let Some(polygons) = value.get("coordinates").and_then(Value::as_array) {
                for polygon in polygons {
                    if let Some(rings) = polygon.as_array() {
                        for ring in rings {
                            push_line(ring, segments);
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn push_line(coords: &Value, segments: &mut Vec<Vec<(f64, f64)>>) {
    let Some(points) = coords.as_array() else {
        return;
    };
    let line: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| {
            let pair = p.as_array()?;
            Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
        })
        .collect();
    if line.len() >= 2 {
        segments.push(line);
    }
}

/// Convenience for callers holding an `Option<PathBuf>` from the CLI.
pub fn load_optional(path: Option<&PathBuf>) -> Result<Option<Coastlines>, RenderError> {
    path.map(|p| Coastlines::from_geojson(p)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_geojson(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_multipolygon_rings_become_segments() {
        let (_dir, path) = write_geojson(
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                    [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                ]}}
            ]}"#,
        );
        let coast = Coastlines::from_geojson(&path).unwrap();
        assert_eq!(coast.segments().len(), 2);
        assert_eq!(coast.segments()[0][1], (1.0, 0.0));
    }

    #[test]
    fn test_geometry_free_file_is_rejected() {
        let (_dir, path) = write_geojson(r#"{"type": "FeatureCollection", "features": []}"#);
        let err = Coastlines::from_geojson(&path).unwrap_err();
        assert!(matches!(err, RenderError::BadGeoJson { .. }));
    }

    #[test]
    fn test_unparseable_json_is_rejected() {
        let (_dir, path) = write_geojson("not json at all");
        let err = Coastlines::from_geojson(&path).unwrap_err();
        assert!(matches!(err, RenderError::BadGeoJson { .. }));
    }
}

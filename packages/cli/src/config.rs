//! Project file.
//!
//! A project is a TOML file naming the grid, the GeoJSON layers to
//! schematize and where to write the result. Relative paths are resolved
//! against the directory holding the project file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read project file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level project settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProjectConfig {
    /// Side length of every grid cell.
    pub cell_size: f64,
    /// A known cell centroid. Defaults to the first generated cell.
    #[serde(default)]
    pub reference_point: Option<[f64; 2]>,
    /// GeoJSON polygon the grid is generated over.
    pub boundary: PathBuf,
    /// Where to write the rows. Standard output when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub inputs: InputPaths,
    #[serde(default)]
    pub levees: LeveeSettings,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// GeoJSON layers, one per feature kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InputPaths {
    pub bank_lines: Option<PathBuf>,
    /// Right banks, matched to bank lines by feature id.
    pub right_banks: Option<PathBuf>,
    pub cross_sections: Option<PathBuf>,
    pub levee_lines: Option<PathBuf>,
    pub crest_points: Option<PathBuf>,
    pub elevation_polygons: Option<PathBuf>,
    pub blocked_areas: Option<PathBuf>,
    pub streets: Option<PathBuf>,
    pub floodplain: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LeveeSettings {
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// How far a crest point may lie from its levee line.
    #[serde(default = "default_crest_buffer")]
    pub crest_buffer: f64,
}

impl Default for LeveeSettings {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            crest_buffer: default_crest_buffer(),
        }
    }
}

const fn default_scale() -> f64 {
    0.9
}

const fn default_crest_buffer() -> f64 {
    1.0
}

impl ProjectConfig {
    /// Resolves `path` against the project file's directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Parses a [`ProjectConfig`] from a TOML string. Relative paths stay
/// relative to the working directory.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or misses required fields.
pub fn parse(toml_str: &str) -> Result<ProjectConfig, ConfigError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Reads the project file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse(&contents)?;
    config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    log::debug!("Loaded project {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_project() {
        let config = parse(
            r#"
            cell_size = 30.0
            boundary = "boundary.geojson"
            "#,
        )
        .unwrap();

        assert!((config.cell_size - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.boundary, PathBuf::from("boundary.geojson"));
        assert_eq!(config.reference_point, None);
        assert_eq!(config.inputs, InputPaths::default());
        assert!((config.levees.scale - 0.9).abs() < f64::EPSILON);
        assert!((config.levees.crest_buffer - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_inputs_and_levee_settings() {
        let config = parse(
            r#"
            cell_size = 10.0
            reference_point = [5.0, 5.0]
            boundary = "grid.geojson"
            output = "rows.json"

            [inputs]
            bank_lines = "banks.geojson"
            cross_sections = "xs.geojson"

            [levees]
            scale = 0.75
            "#,
        )
        .unwrap();

        assert_eq!(config.reference_point, Some([5.0, 5.0]));
        assert_eq!(config.output, Some(PathBuf::from("rows.json")));
        assert_eq!(config.inputs.bank_lines, Some(PathBuf::from("banks.geojson")));
        assert_eq!(config.inputs.streets, None);
        assert!((config.levees.scale - 0.75).abs() < f64::EPSILON);
        assert!((config.levees.crest_buffer - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_missing_cell_size() {
        let result = parse(r#"boundary = "grid.geojson""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn resolves_relative_paths_against_project_dir() {
        let mut config = parse(
            r#"
            cell_size = 10.0
            boundary = "grid.geojson"
            "#,
        )
        .unwrap();
        config.base_dir = PathBuf::from("/data/project");

        assert_eq!(
            config.resolve(Path::new("grid.geojson")),
            PathBuf::from("/data/project/grid.geojson")
        );
        assert_eq!(config.resolve(Path::new("/abs/x.geojson")), PathBuf::from("/abs/x.geojson"));
    }
}

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Most detailed zoom level (fewest meters per pixel)
pub const MIN_ZOOM: u8 = 1;

/// Least detailed zoom level; also the max zoom of features that declare none
pub const MAX_ZOOM: u8 = 17;

/// Blocks kept in memory at once
pub const DEFAULT_CACHE_CAPACITY: usize = 6;

/// Device map surface size in pixels
pub const DEFAULT_SCREEN_WIDTH: u16 = 320;
pub const DEFAULT_SCREEN_HEIGHT: u16 = 374;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: simd_json::Error,
    },
}

/// Runtime configuration, read from JSON. Every field has a default so a
/// missing or partial file still yields a usable setup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root folder holding the `±NNN±NNN` block folders
    pub map_dir: PathBuf,
    /// Block file extension, without the dot
    pub extension: String,
    pub cache_capacity: usize,
    /// Upper bound on points parsed into a single block; `None` disables it
    pub max_points_per_block: Option<usize>,
    pub default_lat: f64,
    pub default_lon: f64,
    pub default_zoom: u8,
    /// Surface size used when no terminal size is available
    pub screen_width: u16,
    pub screen_height: u16,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_dir: PathBuf::from("mymap"),
            extension: "fmp".to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_points_per_block: Some(200_000),
            default_lat: 0.0,
            default_lon: 0.0,
            default_zoom: 2,
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,
            log_file: PathBuf::from("blockmap.log"),
        }
    }
}

impl Config {
    /// Parse a config from JSON bytes. simd-json parses in place, hence `&mut`.
    pub fn from_json(bytes: &mut [u8], path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config =
            simd_json::serde::from_slice(bytes).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.normalize();
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read(path) {
            Ok(mut bytes) => Self::from_json(&mut bytes, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Pull out-of-range values back into range
    fn normalize(&mut self) {
        self.default_zoom = self.default_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.cache_capacity = self.cache_capacity.max(1);
        self.default_lat = self.default_lat.clamp(-85.0, 85.0);
        self.extension = self.extension.trim_start_matches('.').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.extension, "fmp");
        assert_eq!(config.screen_width, 320);
        assert_eq!(config.screen_height, 374);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut json = br#"{"map_dir": "/sd/maps", "default_zoom": 4}"#.to_vec();
        let config = Config::from_json(&mut json, Path::new("test.json")).unwrap();
        assert_eq!(config.map_dir, PathBuf::from("/sd/maps"));
        assert_eq!(config.default_zoom, 4);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut json = br#"{"default_zoom": 40, "cache_capacity": 0, "extension": ".map"}"#.to_vec();
        let config = Config::from_json(&mut json, Path::new("test.json")).unwrap();
        assert_eq!(config.default_zoom, MAX_ZOOM);
        assert_eq!(config.cache_capacity, 1);
        assert_eq!(config.extension, "map");
    }

    #[test]
    fn test_invalid_json() {
        let mut json = b"{not json".to_vec();
        let err = Config::from_json(&mut json, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/blockmap.json")).unwrap();
        assert_eq!(config, Config::default());
    }
}

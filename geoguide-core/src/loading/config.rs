use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::transform::MAX_ZOOM;
use crate::{DEFAULT_ZOOM, Error};

/// Widest neighbour ring a single load may request (17x17 tiles)
pub const MAX_TILE_RADIUS: u32 = 8;

/// Settings of the tile loader.
///
/// Every field has a default, so a partial `[loader]` table is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Tile service URL with `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub zoom: u8,
    /// Ring of neighbour tiles loaded around the center tile (1 gives 3x3)
    pub tile_radius: u32,
    pub max_concurrent_fetches: usize,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for every further retry
    pub retry_backoff_ms: u64,
    pub request_timeout_ms: u64,
    /// Overall budget of one load call, `None` waits for every fetch
    pub deadline_ms: Option<u64>,
    /// Directory of the persistent tile cache
    pub cache_dir: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            url_template: "http://localhost:8080/tiles/{z}/{x}/{y}.json".to_string(),
            zoom: DEFAULT_ZOOM,
            tile_radius: 1,
            max_concurrent_fetches: 4,
            max_retries: 3,
            retry_backoff_ms: 200,
            request_timeout_ms: 5_000,
            deadline_ms: None,
            cache_dir: None,
        }
    }
}

impl LoaderConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), Error> {
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return Err(Error::InvalidConfig(format!(
                    "url_template '{}' lacks the {placeholder} placeholder",
                    self.url_template
                )));
            }
        }
        if self.zoom > MAX_ZOOM {
            return Err(Error::InvalidConfig(format!(
                "zoom {} is above the supported maximum of {MAX_ZOOM}",
                self.zoom
            )));
        }
        if self.tile_radius > MAX_TILE_RADIUS {
            return Err(Error::InvalidConfig(format!(
                "tile_radius {} is above the supported maximum of {MAX_TILE_RADIUS}",
                self.tile_radius
            )));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(Error::InvalidConfig(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Backoff slept before retry number `retry` (1-based)
    pub(crate) fn backoff_for(&self, retry: u32) -> Duration {
        self.retry_backoff()
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LoaderConfig::default();
        config.validate().unwrap();
        assert_eq!(config.zoom, 19);
        assert_eq!(config.tile_radius, 1);
    }

    #[test]
    fn partial_table_keeps_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{"tile_radius": 2, "deadline_ms": 1500}"#).unwrap();
        assert_eq!(config.tile_radius, 2);
        assert_eq!(config.deadline(), Some(Duration::from_millis(1500)));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn backoff_doubles() {
        let config = LoaderConfig {
            retry_backoff_ms: 100,
            ..LoaderConfig::default()
        };
        assert_eq!(config.backoff_for(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for(2), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            LoaderConfig {
                url_template: "http://tiles/{z}/{x}".to_string(),
                ..LoaderConfig::default()
            },
            LoaderConfig {
                max_concurrent_fetches: 0,
                ..LoaderConfig::default()
            },
            LoaderConfig {
                zoom: MAX_ZOOM + 1,
                ..LoaderConfig::default()
            },
            LoaderConfig {
                tile_radius: 1000,
                ..LoaderConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn widest_ring_is_accepted() {
        let config = LoaderConfig {
            tile_radius: MAX_TILE_RADIUS,
            ..LoaderConfig::default()
        };
        config.validate().unwrap();
    }
}

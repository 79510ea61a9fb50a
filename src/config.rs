//! Configuration file of the command-line front end

use std::path::Path;

use anyhow::Context;
use geoguide_core::LoaderConfig;
use serde::Deserialize;

/// Contents of `geoguide.toml`. Every table is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub loader: LoaderConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        config.loader.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    fn loader_table_overrides_fields() {
        let config = AppConfig::from_toml(
            r#"
            [loader]
            url_template = "https://tiles.example.org/{z}/{x}/{y}.json"
            zoom = 18
            max_retries = 5
            deadline_ms = 3000
            cache_dir = "/var/cache/geoguide"
            "#,
        )
        .unwrap();
        assert_eq!(config.loader.zoom, 18);
        assert_eq!(config.loader.max_retries, 5);
        assert_eq!(config.loader.deadline_ms, Some(3000));
        assert_eq!(config.loader.tile_radius, 1);
        assert!(config.loader.cache_dir.is_some());
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(AppConfig::from_toml("[loader]\nmax_concurrent_fetches = 0").is_err());
        assert!(AppConfig::from_toml("[loader]\nzoom = \"high\"").is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("geoguide.toml");
        std::fs::write(&file, "[loader]\ntile_radius = 2\n").unwrap();
        assert_eq!(AppConfig::load(&file).unwrap().loader.tile_radius, 2);
    }
}

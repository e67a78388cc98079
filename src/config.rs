use std::path::Path;

use serde::{Deserialize, Serialize};

/// Server configuration.
///
/// Immutable once the server is constructed; shared read-only across all
/// in-flight requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL prefix the directory tree is exposed under (e.g. "/files").
    /// Empty serves at the server root.
    #[serde(default)]
    pub mount_path: String,

    /// strftime pattern for last-modified timestamps in listings
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// Decimal pattern for file sizes in listings ('#', '0' and ',' are
    /// significant, e.g. "#,000")
    #[serde(default = "default_size_format")]
    pub size_format: String,

    /// Template name for rendered listings; when unset a minimal HTML
    /// table is generated instead
    #[serde(default)]
    pub listing_template: Option<String>,
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M %z".to_string()
}

fn default_size_format() -> String {
    "#,000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount_path: String::new(),
            timestamp_format: default_timestamp_format(),
            size_format: default_size_format(),
            listing_template: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = mount_path.into();
        self
    }

    pub fn with_timestamp_format(mut self, pattern: impl Into<String>) -> Self {
        self.timestamp_format = pattern.into();
        self
    }

    pub fn with_size_format(mut self, pattern: impl Into<String>) -> Self {
        self.size_format = pattern.into();
        self
    }

    pub fn with_listing_template(mut self, template: impl Into<String>) -> Self {
        self.listing_template = Some(template.into());
        self
    }

    /// Mount prefix normalized to either "" or "/segment[/...]" with no
    /// trailing slash, regardless of how it was written in the config.
    pub fn mount(&self) -> String {
        let trimmed = self.mount_path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.mount_path, "");
        assert_eq!(config.timestamp_format, "%Y-%m-%d %H:%M %z");
        assert_eq!(config.size_format, "#,000");
        assert!(config.listing_template.is_none());
    }

    #[test]
    fn mount_normalization() {
        assert_eq!(Config::default().mount(), "");
        assert_eq!(Config::default().with_mount_path("/").mount(), "");
        assert_eq!(Config::default().with_mount_path("files").mount(), "/files");
        assert_eq!(Config::default().with_mount_path("/files/").mount(), "/files");
        assert_eq!(
            Config::default().with_mount_path("static/assets").mount(),
            "/static/assets"
        );
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(r#"mount_path = "/files""#).unwrap();
        assert_eq!(config.mount_path, "/files");
        assert_eq!(config.size_format, "#,000");
    }

    #[test]
    fn builder_setters() {
        let config = Config::default()
            .with_timestamp_format("%Y")
            .with_size_format("#")
            .with_listing_template("listing");
        assert_eq!(config.timestamp_format, "%Y");
        assert_eq!(config.size_format, "#");
        assert_eq!(config.listing_template.as_deref(), Some("listing"));
    }
}

//! Configuration handling for forms and the demo binary

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Tunables shared by forms and the demo binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FormConfig {
    /// Buffer size of the form event broadcast channel
    pub event_capacity: Option<usize>,
    /// Buffer size of the effect outcome broadcast channel
    pub outcome_capacity: Option<usize>,
    /// Default tracing filter when RUST_LOG is not set
    pub log_filter: Option<String>,
    /// Simulated validator latency used by the demo
    pub demo_latency_ms: Option<u64>,
}

impl FormConfig {
    pub const DEFAULT_CAPACITY: usize = 64;
    pub const DEFAULT_LOG_FILTER: &'static str = "formflow=info";

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "formflow", "formflow")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory, or defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Save configuration to the platform config directory
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn event_buffer(&self) -> usize {
        // broadcast channels panic on a zero capacity
        self.event_capacity.unwrap_or(Self::DEFAULT_CAPACITY).max(1)
    }

    pub fn outcome_buffer(&self) -> usize {
        self.outcome_capacity.unwrap_or(Self::DEFAULT_CAPACITY).max(1)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(Self::DEFAULT_LOG_FILTER)
    }

    pub fn demo_latency(&self) -> Duration {
        Duration::from_millis(self.demo_latency_ms.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert!(config.event_capacity.is_none());
        assert!(config.outcome_capacity.is_none());
        assert!(config.log_filter.is_none());
        assert!(config.demo_latency_ms.is_none());
        assert_eq!(config.event_buffer(), 64);
        assert_eq!(config.outcome_buffer(), 64);
        assert_eq!(config.log_filter(), "formflow=info");
        assert_eq!(config.demo_latency(), Duration::ZERO);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = FormConfig {
            event_capacity: Some(0),
            outcome_capacity: Some(0),
            ..Default::default()
        };
        assert_eq!(config.event_buffer(), 1);
        assert_eq!(config.outcome_buffer(), 1);
    }

    #[test]
    fn test_serialization() {
        let config = FormConfig {
            event_capacity: Some(8),
            outcome_capacity: Some(16),
            log_filter: Some("formflow=debug".to_string()),
            demo_latency_ms: Some(25),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: FormConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
        assert_eq!(parsed.demo_latency(), Duration::from_millis(25));
    }

    #[test]
    fn test_deserialize_from_empty_json() {
        let parsed: FormConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, FormConfig::default());
    }

    #[test]
    fn test_deserialize_with_extra_fields() {
        // Should ignore unknown fields
        let json = r#"{"event_capacity": 4, "unknown_field": "value"}"#;
        let parsed: FormConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.event_capacity, Some(4));
    }

    #[test]
    fn test_save_and_load_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("formflow-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.json");
        let config = FormConfig {
            log_filter: Some("formflow=trace".to_string()),
            ..Default::default()
        };

        config.save_to(&path).unwrap();
        let loaded = FormConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_from_missing_file_fails_with_context() {
        let path = Path::new("/definitely/not/here/config.json");
        let err = FormConfig::load_from(path).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }

    #[test]
    fn test_load_returns_ok() {
        // Defaults when no file exists; a user config must still parse.
        let result = FormConfig::load();
        assert!(result.is_ok());
    }
}

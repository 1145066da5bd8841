//! Visibility check configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Tuning of the visibility checks
///
/// Loaded from TOML (every field optional) and then overridden from
/// `SIGHTLINE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Trace step cap for block interaction
    #[serde(default = "default_interact_max_steps")]
    pub interact_max_steps: u32,
    /// Trace step cap for combat
    #[serde(default = "default_combat_max_steps")]
    pub combat_max_steps: u32,
    /// Path search hop cap; the check's step cap when unset
    #[serde(default)]
    pub max_hops: Option<u32>,
    /// Factor applied to the block interaction violation level on a pass
    #[serde(default = "default_vl_decay")]
    pub vl_decay: f64,
    /// Compute look-direction diagnostics and log verdicts
    #[serde(default)]
    pub debug: bool,
}

fn default_interact_max_steps() -> u32 {
    60
}

fn default_combat_max_steps() -> u32 {
    30
}

fn default_vl_decay() -> f64 {
    0.99
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            interact_max_steps: default_interact_max_steps(),
            combat_max_steps: default_combat_max_steps(),
            max_hops: None,
            vl_decay: default_vl_decay(),
            debug: false,
        }
    }
}

impl VisibilityConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded visibility config from {}", path.display());
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `SIGHTLINE_*` overrides on top of this configuration
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|var| env::var(var).ok())
    }

    /// Apply overrides from any variable source
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "SIGHTLINE_INTERACT_MAX_STEPS")? {
            self.interact_max_steps = v;
        }
        if let Some(v) = parse_var(&lookup, "SIGHTLINE_COMBAT_MAX_STEPS")? {
            self.combat_max_steps = v;
        }
        if let Some(v) = parse_var(&lookup, "SIGHTLINE_MAX_HOPS")? {
            self.max_hops = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "SIGHTLINE_VL_DECAY")? {
            self.vl_decay = v;
        }
        if let Some(v) = parse_var(&lookup, "SIGHTLINE_DEBUG")? {
            self.debug = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interact_max_steps == 0 || self.combat_max_steps == 0 {
            return Err(ConfigError::InvalidValue(
                "max steps must be >= 1".to_string(),
            ));
        }
        if self.max_hops == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_hops must be >= 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.vl_decay) {
            return Err(ConfigError::InvalidValue(format!(
                "vl_decay must be within 0..=1, got {}",
                self.vl_decay
            )));
        }
        Ok(())
    }

    /// Hop cap for a check with the given step cap
    pub fn hops_for(&self, max_steps: u32) -> u32 {
        self.max_hops.unwrap_or(max_steps)
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = VisibilityConfig::default();
        assert_eq!(config.interact_max_steps, 60);
        assert_eq!(config.combat_max_steps, 30);
        assert_eq!(config.hops_for(30), 30);
        assert_eq!(config.vl_decay, 0.99);
        assert!(!config.debug);
    }

    #[test]
    fn test_partial_toml() {
        let config = VisibilityConfig::from_toml_str("combat_max_steps = 40\nmax_hops = 12\n").unwrap();
        assert_eq!(config.interact_max_steps, 60);
        assert_eq!(config.combat_max_steps, 40);
        assert_eq!(config.hops_for(40), 12);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [("SIGHTLINE_DEBUG", "true"), ("SIGHTLINE_INTERACT_MAX_STEPS", " 80 ")]
            .into_iter()
            .collect();
        let config = VisibilityConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert!(config.debug);
        assert_eq!(config.interact_max_steps, 80);
    }

    #[test]
    fn test_from_env_starts_from_defaults() {
        let from_env = VisibilityConfig::from_env().map_err(|e| e.to_string());
        let expected = VisibilityConfig::default()
            .with_env_overrides()
            .map_err(|e| e.to_string());
        assert_eq!(from_env, expected);
    }

    #[test]
    fn test_zero_hops_override_rejected() {
        let err = VisibilityConfig::default()
            .with_overrides(|k| (k == "SIGHTLINE_MAX_HOPS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_bad_override() {
        let err = VisibilityConfig::default()
            .with_overrides(|k| (k == "SIGHTLINE_VL_DECAY").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == "SIGHTLINE_VL_DECAY"));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            VisibilityConfig::from_toml_str("vl_decay = 1.5"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            VisibilityConfig::from_toml_str("combat_max_steps = 0"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            VisibilityConfig::from_toml_str("max_hops = 0"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(VisibilityConfig::from_toml_str("max_hops = 1").is_ok());
        assert!(matches!(
            VisibilityConfig::from_toml_str("debug = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}

//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hierarchy/hierarchy.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `HIERARCHY__*` prefix, `__` between sections

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::render::RenderOptions;

/// How trees are rendered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// Append the short item id to each label
    pub show_ids: bool,
    /// Prefix each label with its done state
    pub show_status: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            show_ids: false,
            show_status: true,
        }
    }
}

/// Which sections `run` prints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    pub tree: bool,
    pub actions: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            tree: true,
            actions: true,
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub render: RawRenderSettings,
    pub output: RawOutputSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRenderSettings {
    pub show_ids: Option<bool>,
    pub show_status: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputSettings {
    pub tree: Option<bool>,
    pub actions: Option<bool>,
}

/// Unified configuration for hierarchy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub output: OutputSettings,
}

/// Get the XDG config directory for hierarchy.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hierarchy").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hierarchy.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            render: RenderSettings {
                show_ids: overlay.render.show_ids.unwrap_or(self.render.show_ids),
                show_status: overlay.render.show_status.unwrap_or(self.render.show_status),
            },
            output: OutputSettings {
                tree: overlay.output.tree.unwrap_or(self.output.tree),
                actions: overlay.output.actions.unwrap_or(self.output.actions),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing explicit `config_path` is
    /// an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = config_path {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply HIERARCHY__* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("HIERARCHY").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("render.show_ids") {
            settings.render.show_ids = val;
        }
        if let Ok(val) = config.get_bool("render.show_status") {
            settings.render.show_status = val;
        }
        if let Ok(val) = config.get_bool("output.tree") {
            settings.output.tree = val;
        }
        if let Ok(val) = config.get_bool("output.actions") {
            settings.output.actions = val;
        }

        Ok(settings)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_ids: self.render.show_ids,
            show_status: self.render.show_status,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_are_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            render: RawRenderSettings {
                show_ids: Some(true),
                show_status: None,
            },
            output: RawOutputSettings {
                tree: Some(false),
                actions: None,
            },
        };

        let merged = base.merge_with(&overlay);

        assert!(merged.render.show_ids);
        assert!(merged.render.show_status);
        assert!(!merged.output.tree);
        assert!(merged.output.actions);
    }

    #[test]
    fn given_empty_overlay_when_merging_then_settings_unchanged() {
        let base = Settings::default();
        assert_eq!(base.merge_with(&RawSettings::default()), base);
    }

    #[test]
    fn given_settings_when_converting_then_render_options_match() {
        let mut settings = Settings::default();
        settings.render.show_ids = true;

        let options = settings.render_options();

        assert_eq!(
            options,
            RenderOptions {
                show_ids: true,
                show_status: true,
            }
        );
    }
}

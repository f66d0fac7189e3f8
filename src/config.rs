//! TOML run configuration. Every key is optional.
//!
//! ```toml
//! bonds_to_break = 2
//! descriptor = "exact-mass"
//!
//! [render]
//! mols_per_row = 4
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::depict::DrawOptions;
use crate::descriptor::{Descriptor, SortBy};
use crate::disconnect::{DisconnectOptions, DEFAULT_MAX_COMBINATIONS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_bonds_to_break")]
    pub bonds_to_break: usize,
    #[serde(default)]
    pub single_bonds_only: bool,
    #[serde(default = "default_max_combinations")]
    pub max_combinations: usize,
    #[serde(default)]
    pub descriptor: Descriptor,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    #[serde(default = "default_mols_per_row")]
    pub mols_per_row: usize,
    #[serde(default = "default_panel_side")]
    pub panel_width: u32,
    #[serde(default = "default_panel_side")]
    pub panel_height: u32,
    #[serde(default = "default_panel_side")]
    pub input_panel_width: u32,
    #[serde(default = "default_input_panel_height")]
    pub input_panel_height: u32,
    #[serde(default = "default_legend_font_size")]
    pub legend_font_size: f64,
    #[serde(default = "default_highlight_colour")]
    pub highlight_colour: [f64; 3],
}

fn default_bonds_to_break() -> usize {
    1
}

fn default_max_combinations() -> usize {
    DEFAULT_MAX_COMBINATIONS
}

fn default_mols_per_row() -> usize {
    3
}

fn default_panel_side() -> u32 {
    300
}

fn default_input_panel_height() -> u32 {
    250
}

fn default_legend_font_size() -> f64 {
    20.0
}

fn default_highlight_colour() -> [f64; 3] {
    [0.3, 0.8, 0.9]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bonds_to_break: default_bonds_to_break(),
            single_bonds_only: false,
            max_combinations: default_max_combinations(),
            descriptor: Descriptor::default(),
            sort_by: SortBy::default(),
            render: RenderConfig::default(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mols_per_row: default_mols_per_row(),
            panel_width: default_panel_side(),
            panel_height: default_panel_side(),
            input_panel_width: default_panel_side(),
            input_panel_height: default_input_panel_height(),
            legend_font_size: default_legend_font_size(),
            highlight_colour: default_highlight_colour(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bonds_to_break == 0 {
            return Err(invalid("bonds_to_break", "must be at least 1"));
        }
        if self.max_combinations == 0 {
            return Err(invalid("max_combinations", "must be at least 1"));
        }
        self.render.validate()
    }

    pub fn disconnect_options(&self) -> DisconnectOptions {
        DisconnectOptions {
            single_bonds_only: self.single_bonds_only,
            max_combinations: self.max_combinations,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mols_per_row == 0 {
            return Err(invalid("mols_per_row", "must be at least 1"));
        }
        let sides = [
            ("render.panel_width", self.panel_width),
            ("render.panel_height", self.panel_height),
            ("render.input_panel_width", self.input_panel_width),
            ("render.input_panel_height", self.input_panel_height),
        ];
        for (key, side) in sides {
            if side == 0 {
                return Err(invalid(key, "must be positive"));
            }
        }
        if !(self.legend_font_size.is_finite() && self.legend_font_size > 0.0) {
            return Err(invalid(
                "render.legend_font_size",
                format!("must be a positive number, got {}", self.legend_font_size),
            ));
        }
        if self
            .highlight_colour
            .iter()
            .any(|c| !(0.0..=1.0).contains(c))
        {
            return Err(invalid(
                "render.highlight_colour",
                format!("components must lie in 0..=1, got {:?}", self.highlight_colour),
            ));
        }
        Ok(())
    }

    /// Options for the disconnection grid.
    pub fn grid_options(&self) -> DrawOptions {
        DrawOptions {
            panel_width: self.panel_width,
            panel_height: self.panel_height,
            legend_font_size: self.legend_font_size,
            highlight_colour: self.highlight_colour,
            ..DrawOptions::default()
        }
    }

    /// Options for the single input-molecule panel.
    pub fn input_options(&self) -> DrawOptions {
        DrawOptions {
            panel_width: self.input_panel_width,
            panel_height: self.input_panel_height,
            ..self.grid_options()
        }
    }
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

use std::{fs, path::Path};

use lib_2048::TableConfig;
use lib_brew::BrewConfig;
use serde::Deserialize;

use crate::error::ArcadeError;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ArcadeConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub table: TableConfig,
    #[serde(default)]
    pub brew: BrewConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "defaults::frame_rate")]
    pub frame_rate: f32,
    /// Pointer travel, in logical units, that turns a drag into an order.
    #[serde(default = "defaults::swipe_threshold")]
    pub swipe_threshold: f32,
    /// Fixed frame size in terminal cells; derived from the terminal when
    /// absent.
    pub columns: Option<usize>,
    pub rows: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_rate: defaults::frame_rate(),
            swipe_threshold: defaults::swipe_threshold(),
            columns: None,
            rows: None,
        }
    }
}

impl ArcadeConfig {
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ArcadeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ArcadeError::ConfigFile {
            path: path.to_owned(),
            source,
        })?;

        let config: Self = toml::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ArcadeError> {
        let display = &self.display;
        let positive = [
            ("frame_rate", f64::from(display.frame_rate)),
            ("swipe_threshold", f64::from(display.swipe_threshold)),
            ("columns", display.columns.map_or(1.0, |c| c as f64)),
            ("rows", display.rows.map_or(1.0, |r| r as f64)),
        ];

        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ArcadeError::NotPositive { name, value });
            }
        }

        self.table.validate()?;
        self.brew.validate()?;

        Ok(())
    }
}

mod defaults {
    pub fn frame_rate() -> f32 { 60.0 }
    pub fn swipe_threshold() -> f32 { 0.5 }
}

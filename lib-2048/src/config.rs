use core_arcade::Rgb;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("table dimension must be at least 2, got {0}")]
    Dimension(usize),
    #[error("probability of spawning a 4 must lie in 0..=1, got {0}")]
    FourProbability(f64),
    #[error("win value must be a power of two greater than 2, got {0}")]
    WinValue(u32),
    #[error("{name} must lie in 0..0.5 of a slot, got {value}")]
    Inset { name: &'static str, value: f32 },
    #[error("the tile palette is empty")]
    EmptyPalette,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TableConfig {
    #[serde(default = "defaults::dimension")]
    pub dimension: usize,
    #[serde(default = "defaults::background")]
    pub background: Rgb,
    #[serde(default = "defaults::divider")]
    pub divider: Rgb,
    /// Fraction of a slot covered by each divider line.
    #[serde(default = "defaults::divider_width")]
    pub divider_width: f32,
    /// Fraction of a slot left empty around each tile.
    #[serde(default = "defaults::tile_gap")]
    pub tile_gap: f32,
    /// Tile colours for 2, 4, 8, ... in order.
    #[serde(default = "defaults::palette")]
    pub palette: Vec<Rgb>,
    /// Colour for tiles beyond the end of the palette.
    #[serde(default = "defaults::fallback")]
    pub fallback: Rgb,
    #[serde(default = "defaults::four_probability")]
    pub four_probability: f64,
    #[serde(default = "defaults::win_value")]
    pub win_value: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            dimension: defaults::dimension(),
            background: defaults::background(),
            divider: defaults::divider(),
            divider_width: defaults::divider_width(),
            tile_gap: defaults::tile_gap(),
            palette: defaults::palette(),
            fallback: defaults::fallback(),
            four_probability: defaults::four_probability(),
            win_value: defaults::win_value(),
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension < 2 {
            return Err(ConfigError::Dimension(self.dimension));
        }

        if !(0.0..=1.0).contains(&self.four_probability) {
            return Err(ConfigError::FourProbability(self.four_probability));
        }

        if !self.win_value.is_power_of_two() || self.win_value <= 2 {
            return Err(ConfigError::WinValue(self.win_value));
        }

        for (name, value) in [("divider_width", self.divider_width), ("tile_gap", self.tile_gap)] {
            if !(0.0..0.5).contains(&value) {
                return Err(ConfigError::Inset { name, value });
            }
        }

        if self.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        Ok(())
    }

    pub fn tile_colour(&self, value: u32) -> Rgb {
        let order = value.checked_ilog2().unwrap_or(0) as usize;

        order
            .checked_sub(1)
            .and_then(|i| self.palette.get(i))
            .copied()
            .unwrap_or(self.fallback)
    }
}

mod defaults {
    use core_arcade::Rgb;

    pub fn dimension() -> usize { 4 }
    pub fn background() -> Rgb { Rgb::from_u32(0xf5f5f5) }
    pub fn divider() -> Rgb { Rgb::from_u32(0xe0e0e0) }
    pub fn divider_width() -> f32 { 0.04 }
    pub fn tile_gap() -> f32 { 0.12 }
    pub fn fallback() -> Rgb { Rgb::from_u32(0x6dbb8c) }
    pub fn four_probability() -> f64 { 0.1 }
    pub fn win_value() -> u32 { 2048 }

    pub fn palette() -> Vec<Rgb> {
        [
            0xeee4da, 0xede0c8, 0xf2b179, 0xf59563, 0xf67c5f, 0xf65e3b, 0xedcf72, 0xedcc61,
            0xedc850, 0xedc53f, 0xedc22e,
        ]
        .into_iter()
        .map(Rgb::from_u32)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(TableConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config: TableConfig = toml::from_str("").unwrap();
        assert_eq!(config, TableConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config: TableConfig = toml::from_str(
            r##"
            dimension = 5
            background = "#aaaaaa"
            palette = ["#111111", "#222222"]
            "##,
        )
        .unwrap();

        assert_eq!(config.dimension, 5);
        assert_eq!(config.background, Rgb::from_u32(0xaaaaaa));
        assert_eq!(config.tile_colour(4), Rgb::from_u32(0x222222));
        assert_eq!(config.tile_colour(8), config.fallback);
        assert_eq!(config.win_value, 2048);
    }

    #[test]
    fn tile_colours_follow_value_order() {
        let config = TableConfig::default();

        assert_eq!(config.tile_colour(2), Rgb::from_u32(0xeee4da));
        assert_eq!(config.tile_colour(128), Rgb::from_u32(0xedcf72));
        assert_eq!(config.tile_colour(2048), Rgb::from_u32(0xedc22e));
        assert_eq!(config.tile_colour(4096), Rgb::from_u32(0x6dbb8c));
    }

    #[test]
    fn rejects_bad_values() {
        let bad = |edit: fn(&mut TableConfig)| {
            let mut config = TableConfig::default();
            edit(&mut config);
            config.validate().unwrap_err()
        };

        assert_eq!(bad(|c| c.dimension = 1), ConfigError::Dimension(1));
        assert_eq!(bad(|c| c.four_probability = 1.5), ConfigError::FourProbability(1.5));
        assert_eq!(bad(|c| c.win_value = 1000), ConfigError::WinValue(1000));
        assert_eq!(bad(|c| c.win_value = 2), ConfigError::WinValue(2));
        assert_eq!(
            bad(|c| c.tile_gap = 0.5),
            ConfigError::Inset { name: "tile_gap", value: 0.5 }
        );
        assert_eq!(bad(|c| c.palette.clear()), ConfigError::EmptyPalette);
    }
}

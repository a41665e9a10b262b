use core_arcade::Rgb;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("target line {target_y} must lie inside a field of height {height}")]
    TargetOutsideField { target_y: f32, height: f32 },
    #[error("minimum spawn interval {minimum} ms exceeds the initial interval {initial} ms")]
    SpawnInterval { initial: u64, minimum: u64 },
    #[error("starting lives {starting} must lie in 1..={maximum}")]
    Lives { starting: u32, maximum: u32 },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BrewConfig {
    #[serde(default = "defaults::width")]
    pub width: f32,
    #[serde(default = "defaults::height")]
    pub height: f32,
    #[serde(default = "defaults::background")]
    pub background: Rgb,
    /// Height of the line notes are judged against.
    #[serde(default = "defaults::target_y")]
    pub target_y: f32,
    /// A note is judged once it is closer than this to the target line.
    #[serde(default = "defaults::hit_window")]
    pub hit_window: f32,
    #[serde(default = "defaults::spawn_interval_ms")]
    pub spawn_interval_ms: u64,
    #[serde(default = "defaults::min_spawn_interval_ms")]
    pub min_spawn_interval_ms: u64,
    /// Amount the spawn interval shrinks after every note.
    #[serde(default = "defaults::spawn_acceleration_ms")]
    pub spawn_acceleration_ms: u64,
    /// Distance a note falls per frame.
    #[serde(default = "defaults::note_speed")]
    pub note_speed: f32,
    #[serde(default = "defaults::speedup_every_ms")]
    pub speedup_every_ms: u64,
    #[serde(default = "defaults::speedup")]
    pub speedup: f32,
    #[serde(default = "defaults::max_lives")]
    pub max_lives: u32,
    #[serde(default = "defaults::starting_lives")]
    pub starting_lives: u32,
    #[serde(default = "defaults::miss_life_cost")]
    pub miss_life_cost: u32,
    #[serde(default = "defaults::star_count")]
    pub star_count: usize,
    /// Longest run of notes of the same step kind.
    #[serde(default = "defaults::max_repeat")]
    pub max_repeat: u32,
    #[serde(default = "defaults::hit_reward")]
    pub hit_reward: u64,
    /// Extra reward per hit beyond the third in a combo.
    #[serde(default = "defaults::combo_bonus")]
    pub combo_bonus: u64,
    #[serde(default = "defaults::miss_penalty")]
    pub miss_penalty: u64,
    /// How long the combo counter stays on screen after a hit.
    #[serde(default = "defaults::combo_window_ms")]
    pub combo_window_ms: u64,
    #[serde(default = "defaults::shake_frames")]
    pub shake_frames: u32,
    #[serde(default = "defaults::shake_amplitude")]
    pub shake_amplitude: f32,
    #[serde(default = "defaults::particle_count")]
    pub particle_count: usize,
    /// Time between losing the last life and the game over screen.
    #[serde(default = "defaults::game_over_delay_ms")]
    pub game_over_delay_ms: u64,
}

impl Default for BrewConfig {
    fn default() -> Self {
        Self {
            width: defaults::width(),
            height: defaults::height(),
            background: defaults::background(),
            target_y: defaults::target_y(),
            hit_window: defaults::hit_window(),
            spawn_interval_ms: defaults::spawn_interval_ms(),
            min_spawn_interval_ms: defaults::min_spawn_interval_ms(),
            spawn_acceleration_ms: defaults::spawn_acceleration_ms(),
            note_speed: defaults::note_speed(),
            speedup_every_ms: defaults::speedup_every_ms(),
            speedup: defaults::speedup(),
            max_lives: defaults::max_lives(),
            starting_lives: defaults::starting_lives(),
            miss_life_cost: defaults::miss_life_cost(),
            star_count: defaults::star_count(),
            max_repeat: defaults::max_repeat(),
            hit_reward: defaults::hit_reward(),
            combo_bonus: defaults::combo_bonus(),
            miss_penalty: defaults::miss_penalty(),
            combo_window_ms: defaults::combo_window_ms(),
            shake_frames: defaults::shake_frames(),
            shake_amplitude: defaults::shake_amplitude(),
            particle_count: defaults::particle_count(),
            game_over_delay_ms: defaults::game_over_delay_ms(),
        }
    }
}

impl BrewConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", f64::from(self.width)),
            ("height", f64::from(self.height)),
            ("hit_window", f64::from(self.hit_window)),
            ("note_speed", f64::from(self.note_speed)),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms as f64),
            ("speedup_every_ms", self.speedup_every_ms as f64),
            ("max_lives", f64::from(self.max_lives)),
            ("max_repeat", f64::from(self.max_repeat)),
        ];

        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !(0.0..self.height).contains(&self.target_y) {
            return Err(ConfigError::TargetOutsideField {
                target_y: self.target_y,
                height: self.height,
            });
        }

        if self.min_spawn_interval_ms > self.spawn_interval_ms {
            return Err(ConfigError::SpawnInterval {
                initial: self.spawn_interval_ms,
                minimum: self.min_spawn_interval_ms,
            });
        }

        if self.starting_lives == 0 || self.starting_lives > self.max_lives {
            return Err(ConfigError::Lives {
                starting: self.starting_lives,
                maximum: self.max_lives,
            });
        }

        Ok(())
    }
}

mod defaults {
    use core_arcade::Rgb;

    pub fn width() -> f32 { 400.0 }
    pub fn height() -> f32 { 600.0 }
    pub fn background() -> Rgb { Rgb::BLACK }
    pub fn target_y() -> f32 { 500.0 }
    pub fn hit_window() -> f32 { 30.0 }
    pub fn spawn_interval_ms() -> u64 { 1100 }
    pub fn min_spawn_interval_ms() -> u64 { 500 }
    pub fn spawn_acceleration_ms() -> u64 { 5 }
    pub fn note_speed() -> f32 { 2.5 }
    pub fn speedup_every_ms() -> u64 { 8000 }
    pub fn speedup() -> f32 { 0.15 }
    pub fn max_lives() -> u32 { 10 }
    pub fn starting_lives() -> u32 { 5 }
    pub fn miss_life_cost() -> u32 { 2 }
    pub fn star_count() -> usize { 100 }
    pub fn max_repeat() -> u32 { 2 }
    pub fn hit_reward() -> u64 { 100 }
    pub fn combo_bonus() -> u64 { 20 }
    pub fn miss_penalty() -> u64 { 200 }
    pub fn combo_window_ms() -> u64 { 2000 }
    pub fn shake_frames() -> u32 { 10 }
    pub fn shake_amplitude() -> f32 { 5.0 }
    pub fn particle_count() -> usize { 20 }
    pub fn game_over_delay_ms() -> u64 { 1000 }
}

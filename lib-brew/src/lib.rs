//! Brew, a rhythm-timing game.
//!
//! Notes of four step kinds fall towards a target line. Whenever a note
//! crosses the hit window it is judged against the step kind the player has
//! selected: matching kinds score and heal, anything else costs points and
//! lives. Running out of lives shatters the selector and ends the game.

pub mod config;
pub mod effects;
pub mod game;
pub mod note;

pub use config::{BrewConfig, ConfigError};
pub use effects::{Effect, FloatingText, HitEffect, Particle, Star};
pub use game::{BrewGame, Judgement, Phase};
pub use note::{Note, NoteSpawner, StepKind};

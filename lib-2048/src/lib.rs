//! The 2048 sliding puzzle.
//!
//! A [`Game`] owns a [`Table`], a square grid of [`Slot`]s holding [`Tile`]s.
//! Orders move every tile one slot per step, animated over a few frames, until
//! nothing can move; equal tiles landing in the same slot merge in between
//! steps.

pub mod animation;
pub mod config;
pub mod game;
pub mod slot;
pub mod swipe;
pub mod table;
pub mod tile;

mod direction;

pub use config::{ConfigError, TableConfig};
pub use direction::Direction;
pub use game::{Game, Status};
pub use slot::Slot;
pub use swipe::SwipeTracker;
pub use table::{Table, TurnSummary};
pub use tile::{Tile, TileId};

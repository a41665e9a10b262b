use core_arcade::{Point, Rgb};

use crate::{
    animation::{Move, Scale},
    slot::Slot,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub(crate) u32);

/// A numbered piece on the board. Owns at most one move and one scale
/// animation at a time.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    id: TileId,
    value: u32,
    merged: bool,
    movement: Option<Move>,
    scale: Option<Scale>,
}

impl Tile {
    pub(crate) fn new(id: TileId, value: u32, merged: bool) -> Self {
        Self {
            id,
            value,
            merged,
            movement: None,
            scale: None,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    /// log2 of the value, e.g. 7 for 128.
    pub fn value_order(&self) -> u32 {
        self.value.checked_ilog2().unwrap_or(0)
    }

    pub fn has_been_merged(&self) -> bool {
        self.merged
    }

    pub(crate) fn clear_merged(&mut self) {
        self.merged = false;
    }

    pub fn in_move(&self) -> bool {
        self.movement.is_some()
    }

    pub fn is_scaling(&self) -> bool {
        self.scale.is_some()
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale.as_ref().map_or(1.0, Scale::value)
    }

    /// Where the tile is drawn, given the origin of the slot holding it.
    pub fn position(&self, home: Point) -> Point {
        self.movement.as_ref().map_or(home, Move::position)
    }

    pub fn text_colour(&self) -> Rgb {
        if self.value < 5 {
            Rgb::BLACK
        } else {
            Rgb::WHITE
        }
    }

    /// Equal and unmerged, with a doubled value that still fits in a `u32`.
    pub fn can_merge_with(&self, other: &Tile) -> bool {
        self.value == other.value && !self.merged && !other.merged && can_double(self.value)
    }

    pub fn can_occupy(&self, slot: &Slot) -> bool {
        slot.is_empty()
            || slot
                .unique_tile()
                .is_some_and(|other| other.in_move() || self.can_merge_with(other))
    }

    pub(crate) fn scale_animation(&mut self, starting_scale: f32, duration: f32) {
        self.scale = Some(Scale::new(starting_scale, 1.0, duration));
    }

    pub(crate) fn merge_animation(&mut self) {
        let order = self.value_order() as f32;
        let peak = 1.08 + order * 0.02;
        let duration = 0.5 + order * 0.05;

        self.scale = Some(Scale::new(1.0, peak, duration).with_rebound(duration));
    }

    pub(crate) fn move_one_step_to(&mut self, from: Point, to: Point, target: usize) {
        self.movement = Some(Move::new(from, to, target));
    }

    /// Advances both animations by a frame. Returns the target slot when the
    /// tile arrives there.
    pub(crate) fn act(&mut self) -> Option<usize> {
        let arrived = self.movement.as_mut().is_some_and(Move::act);
        let arrival = if arrived {
            self.movement.take().map(|movement| movement.target())
        } else {
            None
        };

        if self.scale.as_mut().is_some_and(Scale::act) {
            self.scale = self.scale.as_ref().and_then(Scale::follow_up);
        }

        arrival
    }
}

pub(crate) fn can_double(value: u32) -> bool {
    value.checked_mul(2).is_some()
}

//! The board: a square grid of slots through which tiles slide one slot per
//! step until nothing can move any further.

use core_arcade::{Drawable, Point, Rect, Surface, TextAlign};
use rand::Rng;
use tracing::{debug, trace};

use crate::{
    config::TableConfig,
    direction::Direction,
    slot::Slot,
    tile::{can_double, Tile, TileId},
};

const SPAWN_DURATION: f32 = 3.0;
const MIN_LABEL_SCALE: f32 = 0.5;

/// What a finished turn produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnSummary {
    /// Sum of the values created by merges during the turn.
    pub merged: u64,
    /// Slot index of the tile spawned for the next turn.
    pub spawned: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct Table {
    config: TableConfig,
    slots: Vec<Slot>,
    in_motion: Option<Direction>,
    next_id: u32,
    turn_score: u64,
}

impl Table {
    pub fn new(config: TableConfig) -> Self {
        let dimension = config.dimension;
        let slots = (0..dimension)
            .flat_map(|row| (0..dimension).map(move |col| Slot::new(row, col)))
            .collect();

        Self {
            config,
            slots,
            in_motion: None,
            next_id: 0,
            turn_score: 0,
        }
    }

    /// Builds a settled board from row-major values, 0 meaning empty.
    pub fn with_values(config: TableConfig, values: &[u32]) -> Self {
        let mut table = Self::new(config);

        for (index, &value) in values.iter().enumerate().take(table.slots.len()) {
            if value != 0 {
                let tile = Tile::new(table.allocate_id(), value, false);
                table.slots[index].add_tile(tile);
            }
        }

        table
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, row: usize, col: usize) -> Option<&Slot> {
        let dimension = self.dimension();
        (row < dimension && col < dimension).then(|| &self.slots[row * dimension + col])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.slots.iter().flat_map(Slot::tiles)
    }

    /// Whether a turn is still animating; input is ignored meanwhile.
    pub fn in_motion(&self) -> bool {
        self.in_motion.is_some()
    }

    /// Row-major tile values with 0 for empty slots.
    pub fn values(&self) -> Vec<u32> {
        self.slots
            .iter()
            .map(|slot| slot.tiles().first().map_or(0, Tile::value))
            .collect()
    }

    pub fn max_value(&self) -> u32 {
        self.tiles().map(Tile::value).max().unwrap_or(0)
    }

    fn allocate_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        id
    }

    fn locate(&self, id: TileId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.contains(id))
    }

    fn neighbour(&self, index: usize, direction: Direction) -> Option<usize> {
        let dimension = self.dimension();
        let (d_row, d_col) = direction.delta();
        let row = (index / dimension).checked_add_signed(d_row)?;
        let col = (index % dimension).checked_add_signed(d_col)?;

        (row < dimension && col < dimension).then_some(row * dimension + col)
    }

    pub fn create_first_tiles(&mut self, rng: &mut impl Rng) {
        self.create_random_tile(rng, None);
        self.create_random_tile(rng, None);
    }

    /// Places a tile in a random empty slot. Without an explicit value a 4
    /// appears with the configured probability, a 2 otherwise.
    pub fn create_random_tile(&mut self, rng: &mut impl Rng, value: Option<u32>) -> Option<usize> {
        let empty_slots: Vec<usize> = (0..self.slots.len())
            .filter(|&index| self.slots[index].is_empty())
            .collect();

        if empty_slots.is_empty() {
            return None;
        }

        let value = value.unwrap_or_else(|| {
            if rng.gen::<f64>() < self.config.four_probability {
                4
            } else {
                2
            }
        });
        let index = empty_slots[rng.gen_range(0..empty_slots.len())];

        let mut tile = Tile::new(self.allocate_id(), value, false);
        tile.scale_animation(0.0, SPAWN_DURATION);
        self.slots[index].add_tile(tile);

        trace!(index, value, "spawned tile");

        Some(index)
    }

    /// Slot indices front-first along the direction of travel.
    fn visit_order(&self, direction: Direction) -> Vec<usize> {
        let dimension = self.dimension();
        let forward: Vec<usize> = (0..dimension).collect();
        let backward: Vec<usize> = (0..dimension).rev().collect();

        let cells = match direction {
            Direction::Up | Direction::Left => &forward,
            Direction::Down | Direction::Right => &backward,
        };

        forward
            .iter()
            .flat_map(|&line| {
                cells.iter().map(move |&cell| {
                    if direction.is_vertical() {
                        cell * dimension + line
                    } else {
                        line * dimension + cell
                    }
                })
            })
            .collect()
    }

    fn move_unique_tile_to(&mut self, index: usize, direction: Direction) -> bool {
        let Some(next) = self.neighbour(index, direction) else {
            return false;
        };

        let can_move = self.slots[index]
            .unique_tile()
            .is_some_and(|tile| tile.can_occupy(&self.slots[next]));

        if !can_move {
            return false;
        }

        let (from, to) = (self.slots[index].origin(), self.slots[next].origin());

        match self.slots[index].unique_tile_mut() {
            Some(tile) => {
                tile.move_one_step_to(from, to, next);
                true
            }
            None => false,
        }
    }

    /// Starts a one-slot move for every tile that can advance. Returns whether
    /// any tile started moving.
    pub fn try_move_one_step(&mut self, direction: Direction) -> bool {
        let mut some_tile_moved = false;

        for index in self.visit_order(direction) {
            if self.move_unique_tile_to(index, direction) {
                some_tile_moved = true;
            }
        }

        some_tile_moved
    }

    /// Starts a turn unless one is already animating. Returns whether any
    /// tile moved.
    pub fn begin_turn(&mut self, direction: Direction) -> bool {
        if self.in_motion() {
            return false;
        }

        let moved = self.try_move_one_step(direction);

        if moved {
            self.in_motion = Some(direction);
        }

        moved
    }

    /// Advances every tile by one frame. Returns a summary when this frame
    /// finished a turn.
    pub fn act(&mut self, rng: &mut impl Rng) -> Option<TurnSummary> {
        let snapshot: Vec<TileId> = self.tiles().map(Tile::id).collect();
        let mut summary = None;

        for id in snapshot {
            // Tiles merged away earlier in this frame no longer exist.
            let Some(index) = self.locate(id) else {
                continue;
            };

            let Some(target) = self.slots[index].tile_mut(id).and_then(Tile::act) else {
                continue;
            };

            if let Some(tile) = self.slots[index].take_tile(id) {
                self.slots[target].add_tile(tile);
            }

            if let Some(done) = self.one_tile_moved_one_step(rng) {
                summary = Some(done);
            }
        }

        summary
    }

    fn one_tile_moved_one_step(&mut self, rng: &mut impl Rng) -> Option<TurnSummary> {
        if self.tiles().any(Tile::in_move) {
            return None;
        }

        let direction = self.in_motion?;

        self.do_mergers();

        if self.try_move_one_step(direction) {
            None
        } else {
            Some(self.prepare_next_turn(rng))
        }
    }

    fn do_mergers(&mut self) {
        for index in 0..self.slots.len() {
            if self.slots[index].has_two_equal_tiles() {
                let id = self.allocate_id();

                if let Some(value) = self.slots[index].merge_tiles(id) {
                    trace!(index, value, "merged tiles");
                    self.turn_score += u64::from(value);
                }
            }
        }
    }

    fn prepare_next_turn(&mut self, rng: &mut impl Rng) -> TurnSummary {
        self.slots
            .iter_mut()
            .flat_map(Slot::tiles_mut)
            .for_each(Tile::clear_merged);

        let spawned = self.create_random_tile(rng, None);
        self.in_motion = None;

        let merged = std::mem::take(&mut self.turn_score);
        debug!(merged, ?spawned, "turn complete");

        TurnSummary { merged, spawned }
    }

    /// Whether any direction could still move a tile.
    pub fn has_moves(&self) -> bool {
        let dimension = self.dimension();
        let values = self.values();

        values.contains(&0)
            || (0..values.len()).any(|index| {
                let (row, col) = (index / dimension, index % dimension);
                let value = values[index];
                let merges = |other: u32| other == value && can_double(value);

                (col + 1 < dimension && merges(values[index + 1]))
                    || (row + 1 < dimension && merges(values[index + dimension]))
            })
    }

    fn draw_tile(&self, surface: &mut impl Surface, tile: &Tile, home: Point, slot_size: Point) {
        let position = tile.position(home);
        let centre = Point::new(
            (position.x + 0.5) * slot_size.x,
            (position.y + 0.5) * slot_size.y,
        );
        let scale = tile.scale_factor();
        let inset = 1.0 - 2.0 * self.config.tile_gap;

        surface.fill_rect(
            Rect::centred(centre, slot_size.x * inset * scale, slot_size.y * inset * scale),
            self.config.tile_colour(tile.value()),
        );

        if scale >= MIN_LABEL_SCALE {
            surface.fill_text(
                centre,
                &tile.value().to_string(),
                tile.text_colour(),
                TextAlign::Centre,
            );
        }
    }
}

impl Drawable for Table {
    fn draw(&self, surface: &mut impl Surface) {
        let dimension = self.dimension() as f32;
        let slot_size = Point::new(surface.width() / dimension, surface.height() / dimension);
        let (board_width, board_height) = (slot_size.x * dimension, slot_size.y * dimension);

        surface.fill_rect(Rect::new(0.0, 0.0, board_width, board_height), self.config.background);

        let divider = slot_size * self.config.divider_width;

        for i in 0..=self.dimension() {
            let i = i as f32;

            surface.fill_rect(
                Rect::new(slot_size.x * i - divider.x / 2.0, 0.0, divider.x, board_height),
                self.config.divider,
            );
            surface.fill_rect(
                Rect::new(0.0, slot_size.y * i - divider.y / 2.0, board_width, divider.y),
                self.config.divider,
            );
        }

        for slot in &self.slots {
            for tile in slot.tiles() {
                self.draw_tile(surface, tile, slot.origin(), slot_size);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core_arcade::{FrameBuffer, Rgb};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2048)
    }

    fn board(values: &[u32]) -> Table {
        Table::with_values(TableConfig::default(), values)
    }

    /// Plays one full turn and returns the board values before the spawn.
    fn play(table: &mut Table, direction: Direction, rng: &mut ChaCha8Rng) -> Option<(Vec<u32>, TurnSummary)> {
        if !table.begin_turn(direction) {
            return None;
        }

        for _ in 0..1000 {
            if let Some(summary) = table.act(rng) {
                let mut values = table.values();
                if let Some(spawned) = summary.spawned {
                    values[spawned] = 0;
                }
                return Some((values, summary));
            }
        }

        panic!("turn never finished");
    }

    #[rustfmt::skip]
    #[test]
    fn slides_and_merges_left() {
        let mut rng = rng();
        let mut table = board(&[
            2, 2, 2, 2,
            0, 4, 0, 4,
            2, 0, 2, 2,
            8, 4, 4, 0,
        ]);

        let (values, summary) = play(&mut table, Direction::Left, &mut rng).unwrap();

        assert_eq!(values, [
            4, 4, 0, 0,
            8, 0, 0, 0,
            4, 2, 0, 0,
            8, 8, 0, 0,
        ]);
        assert_eq!(summary.merged, 4 + 4 + 8 + 4 + 8);
        assert!(summary.spawned.is_some());
        assert!(!table.in_motion());
    }

    #[rustfmt::skip]
    #[test]
    fn slides_and_merges_down() {
        let mut rng = rng();
        let mut table = board(&[
            2, 0, 4, 0,
            2, 0, 4, 0,
            0, 0, 8, 0,
            2, 2, 8, 0,
        ]);

        let (values, summary) = play(&mut table, Direction::Down, &mut rng).unwrap();

        assert_eq!(values, [
            0, 0, 0, 0,
            0, 0, 0, 0,
            2, 0, 8, 0,
            4, 2, 16, 0,
        ]);
        assert_eq!(summary.merged, 4 + 8 + 16);
    }

    #[rustfmt::skip]
    #[test]
    fn merged_tiles_do_not_merge_again_in_the_same_turn() {
        let mut rng = rng();
        let mut table = board(&[
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
            4, 2, 2, 0,
        ]);

        let (values, _) = play(&mut table, Direction::Left, &mut rng).unwrap();
        assert_eq!(&values[12..], [4, 4, 0, 0]);
        assert!(table.tiles().all(|tile| !tile.has_been_merged()));
    }

    #[rustfmt::skip]
    #[test]
    fn blocked_turn_does_nothing() {
        let mut table = board(&[
            2, 4, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ]);

        assert!(!table.begin_turn(Direction::Left));
        assert!(!table.begin_turn(Direction::Up));
        assert!(!table.in_motion());
        assert_eq!(table.tiles().count(), 2);
    }

    #[test]
    fn input_is_ignored_while_moving() {
        let mut rng = rng();
        let mut table = board(&[2, 0, 0, 0]);

        assert!(table.begin_turn(Direction::Right));
        assert!(!table.begin_turn(Direction::Down));

        table.act(&mut rng);
        assert!(table.in_motion());
    }

    #[test]
    fn a_step_takes_five_frames() {
        let mut rng = rng();
        let mut table = board(&[0, 0, 2, 0]);

        assert!(table.begin_turn(Direction::Right));

        for _ in 0..4 {
            assert_eq!(table.act(&mut rng), None);
        }

        let summary = table.act(&mut rng).unwrap();
        assert_eq!(summary.merged, 0);
        assert_eq!(table.slot(0, 3).unwrap().unique_tile().map(Tile::value), Some(2));
    }

    #[test]
    fn tiles_too_large_to_double_never_merge() {
        let mut rng = rng();
        let top = 1 << 31;
        let mut table = board(&[top, top, 0, 0]);

        assert!(!table.begin_turn(Direction::Left));

        let (values, summary) = play(&mut table, Direction::Right, &mut rng).unwrap();
        assert_eq!(values[..4], [0, 0, top, top]);
        assert_eq!(summary.merged, 0);

        assert!(!board(&[top; 16]).has_moves());
    }

    #[test]
    fn transient_double_occupancy_resolves() {
        let mut rng = rng();
        // The trailing tile lands in the leading tile's slot before the
        // leading tile has left it on the final frame.
        let mut table = board(&[2, 4, 0, 0]);

        assert!(table.begin_turn(Direction::Right));

        for _ in 0..200 {
            table.act(&mut rng);
            assert!(table.slots().iter().all(|slot| slot.tiles().len() <= 2));
        }

        assert!(table.slots().iter().all(|slot| slot.tiles().len() <= 1));
        assert_eq!(&table.values()[2..4], [2, 4]);
    }

    #[test]
    fn random_tiles_fill_empty_slots_only() {
        let mut rng = rng();
        let mut table = Table::new(TableConfig::default());

        for _ in 0..16 {
            let index = table.create_random_tile(&mut rng, None).unwrap();
            assert_eq!(table.slots()[index].tiles().len(), 1);
        }

        assert_eq!(table.create_random_tile(&mut rng, None), None);
        assert!(table.values().iter().all(|&value| value == 2 || value == 4));
    }

    #[test]
    fn explicit_spawn_value_is_used() {
        let mut rng = rng();
        let mut table = Table::new(TableConfig::default());

        let index = table.create_random_tile(&mut rng, Some(1024)).unwrap();
        let tile = table.slots()[index].unique_tile().unwrap();
        assert_eq!(tile.value(), 1024);
        assert_eq!(tile.scale_factor(), 0.0);
    }

    #[test]
    fn four_probability_is_respected() {
        let mut rng = rng();
        let config = TableConfig {
            four_probability: 1.0,
            ..TableConfig::default()
        };
        let mut table = Table::new(config);

        table.create_first_tiles(&mut rng);
        assert_eq!(table.values().iter().filter(|&&value| value == 4).count(), 2);
    }

    #[rustfmt::skip]
    #[test]
    fn detects_remaining_moves() {
        let full_but_mergeable = board(&[
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 4,
        ]);
        assert!(full_but_mergeable.has_moves());

        let stuck = board(&[
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 2,
        ]);
        assert!(!stuck.has_moves());

        let vertical_pair = board(&[
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            2, 8, 16, 32,
        ]);
        assert!(vertical_pair.has_moves());
    }

    #[test]
    fn draws_tiles_with_their_colour_and_label() {
        let config = TableConfig::default();
        let table = Table::with_values(config.clone(), &[0, 0, 0, 0, 0, 2048]);
        let mut fb = FrameBuffer::new(32, 16, 4.0, 4.0, Rgb::BLACK);

        table.draw(&mut fb);

        // Slot (1, 1) spans columns 8..16 and rows 4..8.
        assert_eq!(fb.cell(12, 6).unwrap().bg, config.tile_colour(2048));
        assert!(fb.row_text(6).contains("2048"));
        assert_eq!(fb.cell(4, 2).unwrap().bg, config.background);
    }
}

use core_arcade::{Drawable, Surface};
use rand::Rng;
use tracing::info;

use crate::{
    config::TableConfig,
    direction::Direction,
    table::{Table, TurnSummary},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Playing,
    /// The win value has been reached; play carries on.
    Won,
    Over,
}

/// Owns the table and checks orders, victory and defeat.
pub struct Game<R> {
    config: TableConfig,
    table: Table,
    rng: R,
    score: u64,
    status: Status,
}

impl<R: Rng> Game<R> {
    pub fn new(config: TableConfig, rng: R) -> Self {
        let mut game = Self::from_table(Table::new(config), rng);
        game.start();
        game
    }

    /// Resumes play on an existing board.
    pub fn from_table(table: Table, rng: R) -> Self {
        Self {
            config: table.config().clone(),
            table,
            rng,
            score: 0,
            status: Status::Playing,
        }
    }

    pub fn start(&mut self) {
        self.table = Table::new(self.config.clone());
        self.table.create_first_tiles(&mut self.rng);
        self.score = 0;
        self.status = Status::Playing;

        info!(dimension = self.config.dimension, "2048 started");
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Applies a player's order. Returns whether a turn started.
    pub fn check_order_to(&mut self, direction: Direction) -> bool {
        if self.status == Status::Over {
            return false;
        }

        self.table.begin_turn(direction)
    }

    pub fn act(&mut self) {
        if let Some(summary) = self.table.act(&mut self.rng) {
            self.finish_turn(summary);
        }
    }

    pub fn render(&mut self, surface: &mut impl Surface) {
        surface.clear();
        self.act();
        self.draw(surface);
    }

    fn finish_turn(&mut self, summary: TurnSummary) {
        self.score += summary.merged;

        if self.status == Status::Playing && self.table.max_value() >= self.config.win_value {
            info!(score = self.score, "reached {}", self.config.win_value);
            self.status = Status::Won;
        }

        if !self.table.has_moves() {
            info!(score = self.score, max = self.table.max_value(), "game over");
            self.status = Status::Over;
        }
    }
}

impl<R> Drawable for Game<R> {
    fn draw(&self, surface: &mut impl Surface) {
        self.table.draw(surface);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn game(values: &[u32], config: TableConfig) -> Game<ChaCha8Rng> {
        Game::from_table(Table::with_values(config, values), ChaCha8Rng::seed_from_u64(7))
    }

    fn settle(game: &mut Game<ChaCha8Rng>) {
        for _ in 0..1000 {
            game.act();
            if !game.table().in_motion() {
                return;
            }
        }
        panic!("turn never finished");
    }

    #[test]
    fn new_game_has_two_tiles() {
        let game = Game::new(TableConfig::default(), ChaCha8Rng::seed_from_u64(1));

        assert_eq!(game.table().tiles().count(), 2);
        assert_eq!(game.score(), 0);
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn merges_add_to_the_score() {
        let mut game = game(&[4, 4, 2, 2], TableConfig::default());

        assert!(game.check_order_to(Direction::Left));
        settle(&mut game);

        assert_eq!(game.score(), 12);
        assert_eq!(&game.table().values()[..2], [8, 4]);
    }

    #[test]
    fn reaching_the_win_value_wins_but_play_continues() {
        let config = TableConfig {
            win_value: 16,
            ..TableConfig::default()
        };
        let mut game = game(&[8, 8], config);

        assert!(game.check_order_to(Direction::Right));
        settle(&mut game);
        assert_eq!(game.status(), Status::Won);

        assert!(game.check_order_to(Direction::Left));
        settle(&mut game);
        assert_eq!(game.status(), Status::Won);
    }

    #[rustfmt::skip]
    #[test]
    fn filling_the_board_ends_the_game() {
        // Moving right leaves one empty corner; the spawned 2 has no partner.
        let config = TableConfig { four_probability: 0.0, ..TableConfig::default() };
        let mut game = game(&[
            4, 16, 2, 2,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 2,
        ], config);

        assert!(game.check_order_to(Direction::Right));
        settle(&mut game);

        assert_eq!(&game.table().values()[..4], [2, 4, 16, 4]);
        assert_eq!(game.score(), 4);
        assert_eq!(game.status(), Status::Over);
        assert!(!game.check_order_to(Direction::Left));
    }

    #[test]
    fn orders_are_ignored_once_over() {
        let values = [2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2];
        let mut game = game(&values, TableConfig::default());
        game.status = Status::Over;

        assert!(!game.check_order_to(Direction::Up));
    }

    #[test]
    fn restart_resets_everything() {
        let mut game = game(&[4, 4], TableConfig::default());
        game.check_order_to(Direction::Left);
        settle(&mut game);
        assert!(game.score() > 0);

        game.start();
        assert_eq!(game.score(), 0);
        assert_eq!(game.table().tiles().count(), 2);
        assert_eq!(game.status(), Status::Playing);
    }
}

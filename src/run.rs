use std::{
    io::{self, Read, Write},
    thread,
    time::{Duration, Instant},
};

use core_arcade::{Drawable, FrameBuffer, Point, Rgb, Surface};
use lib_2048::{Game, Status, SwipeTracker};
use lib_brew::{BrewGame, Phase};
use rand::Rng;
use tracing::debug;

use crate::{
    config::DisplayConfig,
    error::ArcadeError,
    input::{Key, KeyDecoder, PointerKind},
    render::Screen,
};

/// A game the frame loop can drive.
pub trait Playable {
    /// Size of the space the game draws in.
    fn logical_size(&self) -> (f32, f32);

    fn background(&self) -> Rgb;

    fn press(&mut self, key: Key, now_ms: u64);

    fn pointer(&mut self, _kind: PointerKind, _at: Point) {}

    /// Advances one frame and draws it.
    fn frame(&mut self, now_ms: u64, frame: &mut FrameBuffer);

    fn status(&self) -> String;
}

pub struct PuzzleRunner<R> {
    game: Game<R>,
    swipe: SwipeTracker,
}

impl<R: Rng> PuzzleRunner<R> {
    pub fn new(game: Game<R>, swipe_threshold: f32) -> Self {
        Self {
            game,
            swipe: SwipeTracker::new(swipe_threshold),
        }
    }
}

impl<R: Rng> Playable for PuzzleRunner<R> {
    fn logical_size(&self) -> (f32, f32) {
        let dimension = self.game.table().dimension() as f32;
        (dimension, dimension)
    }

    fn background(&self) -> Rgb {
        self.game.table().config().background
    }

    fn press(&mut self, key: Key, _now_ms: u64) {
        match key {
            Key::Arrow(direction) => {
                self.game.check_order_to(direction);
            }
            Key::Restart => self.game.start(),
            _ => {}
        }
    }

    fn pointer(&mut self, kind: PointerKind, at: Point) {
        match kind {
            PointerKind::Press => self.swipe.begin(at),
            PointerKind::Drag => {
                for direction in self.swipe.drag(at).into_iter().flatten() {
                    self.game.check_order_to(direction);
                }
            }
            PointerKind::Release => self.swipe.end(),
        }
    }

    fn frame(&mut self, _now_ms: u64, frame: &mut FrameBuffer) {
        self.game.render(frame);
    }

    fn status(&self) -> String {
        let outcome = match self.game.status() {
            Status::Playing => "",
            Status::Won => "  You win!",
            Status::Over => "  Game over",
        };

        format!(
            "Score: {}{outcome}   [arrows/drag] move  [n] new game  [q] quit",
            self.game.score()
        )
    }
}

pub struct BrewRunner<R> {
    game: BrewGame<R>,
}

impl<R: Rng> BrewRunner<R> {
    pub fn new(game: BrewGame<R>) -> Self {
        Self { game }
    }
}

impl<R: Rng> Playable for BrewRunner<R> {
    fn logical_size(&self) -> (f32, f32) {
        let config = self.game.config();
        (config.width, config.height)
    }

    fn background(&self) -> Rgb {
        self.game.config().background
    }

    fn press(&mut self, key: Key, now_ms: u64) {
        match key {
            Key::CycleStep => self.game.cycle_step(),
            Key::ToggleNumbers => self.game.toggle_numbers(),
            Key::Restart => self.game.restart(now_ms),
            _ => {}
        }
    }

    fn frame(&mut self, now_ms: u64, frame: &mut FrameBuffer) {
        self.game.update(now_ms);
        frame.clear();
        self.game.draw(frame);
    }

    fn status(&self) -> String {
        let state = match self.game.phase() {
            Phase::Playing => format!(
                "Step {}  Lives {}/{}",
                self.game.selected().number(),
                self.game.lives(),
                self.game.config().max_lives
            ),
            Phase::Collapsing { .. } | Phase::Finished => "Game over".to_owned(),
        };

        format!("{state}   [r] step  [p] numbers  [n] restart  [q] quit")
    }
}

/// Frame size in cells for a game of the given logical size. Cells are
/// taken to be twice as tall as wide; one terminal row is kept for the
/// status line.
pub fn frame_size(logical: (f32, f32), terminal: (usize, usize), display: &DisplayConfig) -> (usize, usize) {
    let (width, height) = logical;
    let (term_columns, term_rows) = terminal;

    let rows = display.rows.unwrap_or(term_rows.saturating_sub(1)).max(1);
    let columns = display
        .columns
        .unwrap_or_else(|| ((rows as f32 * 2.0 * width / height).round() as usize).min(term_columns))
        .max(1);

    (columns, rows)
}

/// Logical position of a pointer report; the frame starts on the second
/// terminal row.
fn pointer_position(frame: &FrameBuffer, column: u16, row: u16) -> Point {
    let cell_width = frame.width() / frame.columns() as f32;
    let cell_height = frame.height() / frame.rows() as f32;

    Point::new(
        (f32::from(column) + 0.5) * cell_width,
        (f32::from(row) - 0.5) * cell_height,
    )
}

/// Runs the game until the player quits. Keys read in the same frame as
/// the quit key still reach that frame.
pub fn run(
    game: &mut impl Playable,
    display: &DisplayConfig,
    terminal: (usize, usize),
    input: &mut impl Read,
    screen: &mut Screen<impl Write>,
) -> Result<(), ArcadeError> {
    let (width, height) = game.logical_size();
    let (columns, rows) = frame_size((width, height), terminal, display);
    let mut frame = FrameBuffer::new(columns, rows, width, height, game.background());

    debug!(columns, rows, "frame size");

    let mut decoder = KeyDecoder::new()?;
    let frame_time = Duration::from_secs_f32(1.0 / display.frame_rate);
    let start = Instant::now();
    let mut buf = [0u8; 256];

    loop {
        let tick = Instant::now();
        let now_ms = start.elapsed().as_millis() as u64;

        let read = match input.read(&mut buf) {
            Ok(read) => read,
            Err(err) if matches!(err.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => 0,
            Err(err) => return Err(err.into()),
        };

        let mut quit = false;

        for key in decoder.feed(&buf[..read]) {
            match key {
                Key::Quit => {
                    quit = true;
                    break;
                }
                Key::Pointer(pointer) => {
                    let at = pointer_position(&frame, pointer.column, pointer.row);
                    game.pointer(pointer.kind, at);
                }
                key => game.press(key, now_ms),
            }
        }

        game.frame(now_ms, &mut frame);
        screen.present(&game.status(), &frame)?;

        if quit {
            return Ok(());
        }

        thread::sleep(frame_time.saturating_sub(tick.elapsed()));
    }
}

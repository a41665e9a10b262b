use core_arcade::{Drawable, Point, Rect, Rgb, Surface, TextAlign};
use rand::Rng;
use tracing::{debug, info, trace};

use crate::{
    config::BrewConfig,
    effects::{decay, FloatingText, HitEffect, Particle, Star},
    note::{Note, NoteSpawner, StepKind},
};

const NOTE_SIZE: f32 = 40.0;
const IMPACT_ZONE: f32 = 50.0;
/// Notes this far below the field are dropped.
const OFFSCREEN_MARGIN: f32 = 40.0;
const FLOATING_TEXT_ORIGIN: Point = Point::new(70.0, 180.0);

const HIT_TEXT: Rgb = Rgb::from_u32(0x44ff00);
const MISS_TEXT: Rgb = Rgb::from_u32(0xff4400);
const COMBO_TEXT: Rgb = Rgb::from_u32(0xffd700);
const FULL_LIVES: Rgb = Rgb::from_u32(0x00ffcc);
const EMPTY_LIFE: Rgb = Rgb::from_u32(0x333333);
const IMPACT_COLOUR: Rgb = Rgb::from_u32(0x444444);
const HINT_TEXT: Rgb = Rgb::from_u32(0xcccccc);

const LIFE_WIDTH: f32 = 15.0;
const LIFE_HEIGHT: f32 = 20.0;
const LIFE_SPACING: f32 = 5.0;
const LIVES_ORIGIN: Point = Point::new(20.0, 20.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Lives ran out; the selector is shattering.
    Collapsing { since_ms: u64 },
    /// The game over screen is up and nothing moves any more.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgement {
    Hit { reward: u64 },
    Miss,
}

pub struct BrewGame<R> {
    config: BrewConfig,
    rng: R,
    phase: Phase,
    now_ms: u64,

    notes: Vec<Note>,
    spawner: NoteSpawner,
    note_speed: f32,
    next_speedup_ms: u64,

    selected: StepKind,
    show_numbers: bool,
    score: u64,
    combo: u32,
    last_hit_ms: Option<u64>,
    lives: u32,

    stars: Vec<Star>,
    hit_effects: Vec<HitEffect>,
    floating_texts: Vec<FloatingText>,
    particles: Vec<Particle>,
    shake_frames: u32,
    shake_offset: f32,
}

impl<R: Rng> BrewGame<R> {
    pub fn new(config: BrewConfig, mut rng: R, now_ms: u64) -> Self {
        let stars = (0..config.star_count)
            .map(|_| Star::random(&mut rng, config.width, config.height))
            .collect();

        let mut game = Self {
            spawner: NoteSpawner::new(&config, now_ms),
            note_speed: config.note_speed,
            next_speedup_ms: now_ms + config.speedup_every_ms,
            lives: config.starting_lives,
            config,
            rng,
            phase: Phase::Playing,
            now_ms,
            notes: Vec::new(),
            selected: StepKind::Yellow,
            show_numbers: false,
            score: 0,
            combo: 0,
            last_hit_ms: None,
            stars,
            hit_effects: Vec::new(),
            floating_texts: Vec::new(),
            particles: Vec::new(),
            shake_frames: 0,
            shake_offset: 0.0,
        };
        game.restart(now_ms);
        game
    }

    /// Starts over with a fresh field. Stars and the display toggle are kept.
    pub fn restart(&mut self, now_ms: u64) {
        self.phase = Phase::Playing;
        self.now_ms = now_ms;
        self.notes.clear();
        self.spawner = NoteSpawner::new(&self.config, now_ms);
        self.note_speed = self.config.note_speed;
        self.next_speedup_ms = now_ms + self.config.speedup_every_ms;
        self.selected = StepKind::Yellow;
        self.score = 0;
        self.combo = 0;
        self.last_hit_ms = None;
        self.lives = self.config.starting_lives;
        self.hit_effects.clear();
        self.floating_texts.clear();
        self.particles.clear();
        self.shake_frames = 0;
        self.shake_offset = 0.0;

        info!(lives = self.lives, "brew started");
    }

    pub fn config(&self) -> &BrewConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase != Phase::Playing
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note_speed(&self) -> f32 {
        self.note_speed
    }

    pub fn selected(&self) -> StepKind {
        self.selected
    }

    pub fn shows_numbers(&self) -> bool {
        self.show_numbers
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn cycle_step(&mut self) {
        if self.phase == Phase::Playing {
            self.selected = self.selected.next();
        }
    }

    pub fn toggle_numbers(&mut self) {
        self.show_numbers = !self.show_numbers;
    }

    /// Whether the combo counter is on screen: a long enough streak with a
    /// recent hit.
    pub fn combo_visible(&self) -> bool {
        self.combo >= 4
            && self
                .last_hit_ms
                .is_some_and(|hit| self.now_ms.saturating_sub(hit) < self.config.combo_window_ms)
    }

    pub fn combo_scale(&self) -> f32 {
        1.0 + self.combo.saturating_sub(4).min(20) as f32 * 0.05
    }

    /// Red at no lives, yellow at half, green at full.
    pub fn lives_colour(&self) -> Rgb {
        const RED: Rgb = Rgb::from_u32(0xff0000);
        const YELLOW: Rgb = Rgb::from_u32(0xffff00);
        const GREEN: Rgb = Rgb::from_u32(0x00ff00);

        let t = self.lives as f32 / self.config.max_lives as f32;

        if t < 0.5 {
            RED.lerp(YELLOW, t * 2.0)
        } else {
            YELLOW.lerp(GREEN, (t - 0.5) * 2.0)
        }
    }

    fn target(&self) -> Point {
        Point::new(self.config.width / 2.0, self.config.target_y)
    }

    /// Advances the game by one frame. Returns the judgement made this frame,
    /// if any.
    pub fn update(&mut self, now_ms: u64) -> Option<Judgement> {
        if self.phase == Phase::Finished {
            return None;
        }

        self.now_ms = now_ms;

        let (width, height) = (self.config.width, self.config.height);
        for star in &mut self.stars {
            star.update(&mut self.rng, width, height);
        }

        while now_ms >= self.next_speedup_ms {
            self.note_speed += self.config.speedup;
            self.next_speedup_ms += self.config.speedup_every_ms;
            debug!(speed = self.note_speed, "notes speed up");
        }

        if self.phase == Phase::Playing {
            if let Some(note) = self.spawner.due(now_ms, &mut self.rng) {
                trace!(kind = ?note.kind, interval = self.spawner.interval_ms(), "spawned note");
                self.notes.push(note);
            }
        }

        for note in &mut self.notes {
            note.y += self.note_speed;
        }

        let judgement = if self.phase == Phase::Playing {
            self.judge_first_note_in_window()
        } else {
            None
        };

        let floor = height + OFFSCREEN_MARGIN;
        self.notes.retain(|note| note.y < floor);

        decay(&mut self.hit_effects);
        decay(&mut self.floating_texts);
        decay(&mut self.particles);

        self.shake_offset = if self.shake_frames > 0 {
            self.shake_frames -= 1;
            (self.rng.gen::<f32>() - 0.5) * self.config.shake_amplitude * 2.0
        } else {
            0.0
        };

        if let Phase::Collapsing { since_ms } = self.phase {
            if now_ms.saturating_sub(since_ms) > self.config.game_over_delay_ms {
                info!(score = self.score, "brew game over");
                self.phase = Phase::Finished;
            }
        }

        judgement
    }

    fn judge_first_note_in_window(&mut self) -> Option<Judgement> {
        let target_y = self.config.target_y;
        let window = self.config.hit_window;
        let index = self
            .notes
            .iter()
            .position(|note| (note.y - target_y).abs() < window)?;

        let note = self.notes.remove(index);

        Some(if note.kind == self.selected {
            self.hit(note)
        } else {
            self.miss()
        })
    }

    fn hit(&mut self, note: Note) -> Judgement {
        self.combo += 1;
        self.last_hit_ms = Some(self.now_ms);

        let reward = self.config.hit_reward
            + u64::from(self.combo.saturating_sub(3)) * self.config.combo_bonus;
        self.score += reward;
        self.lives = (self.lives + 1).min(self.config.max_lives);

        self.hit_effects.push(HitEffect::new(self.target(), note.kind.colour()));
        self.floating_texts
            .push(FloatingText::new(format!("+{reward}"), FLOATING_TEXT_ORIGIN, HIT_TEXT));

        trace!(reward, combo = self.combo, "hit");
        Judgement::Hit { reward }
    }

    fn miss(&mut self) -> Judgement {
        let penalty = self.config.miss_penalty;

        self.combo = 0;
        self.score = self.score.saturating_sub(penalty);
        self.shake_frames = self.config.shake_frames;
        self.lives = self.lives.saturating_sub(self.config.miss_life_cost);

        self.floating_texts
            .push(FloatingText::new(format!("-{penalty}"), FLOATING_TEXT_ORIGIN, MISS_TEXT));

        trace!(lives = self.lives, "miss");

        if self.lives == 0 {
            self.shatter_selector();
        }

        Judgement::Miss
    }

    fn shatter_selector(&mut self) {
        let centre = Point::new(self.config.width / 2.0, self.config.target_y - 20.0);

        self.particles = Particle::burst(
            &mut self.rng,
            centre,
            self.selected.colour(),
            self.config.particle_count,
        );
        self.phase = Phase::Collapsing {
            since_ms: self.now_ms,
        };

        info!(score = self.score, "out of lives");
    }
}

impl<R> BrewGame<R> {
    fn draw_step(&self, surface: &mut impl Surface, kind: StepKind, centre: Point) {
        let square = Rect::centred(centre, NOTE_SIZE, NOTE_SIZE);
        surface.fill_rect(square, kind.colour());

        if self.show_numbers {
            let badge = Rect::new(square.x + 2.0, square.y + 2.0, 14.0, 14.0);
            surface.fill_rect(badge, Rgb::BLACK);
            surface.fill_text(
                Point::new(badge.x + 7.0, badge.y + 7.0),
                &kind.number().to_string(),
                Rgb::WHITE,
                TextAlign::Centre,
            );
        }
    }

    fn draw_lives(&self, surface: &mut impl Surface, colour: Rgb) {
        let max = self.config.max_lives;

        for i in 0..max {
            let x = LIVES_ORIGIN.x + i as f32 * (LIFE_WIDTH + LIFE_SPACING);
            let fill = if i < self.lives { colour } else { EMPTY_LIFE };
            surface.fill_rect(Rect::new(x, LIVES_ORIGIN.y, LIFE_WIDTH, LIFE_HEIGHT), fill);
        }

        let frame = Rect::new(
            LIVES_ORIGIN.x - 5.0,
            LIVES_ORIGIN.y - 5.0,
            max as f32 * (LIFE_WIDTH + LIFE_SPACING) - LIFE_SPACING + 10.0,
            LIFE_HEIGHT + 10.0,
        );
        let border = if self.lives == max { FULL_LIVES } else { Rgb::WHITE };
        surface.stroke_rect(frame, border);
    }

    fn draw_game_over(&self, surface: &mut impl Surface) {
        let (width, height) = (self.config.width, self.config.height);
        let centre_x = width / 2.0;
        let middle = height / 2.0;

        surface.fill_rect(Rect::new(0.0, 0.0, width, height), Rgb::BLACK.with_alpha(0.85));
        surface.fill_text(Point::new(centre_x, middle - 100.0), "Game Over", Rgb::WHITE, TextAlign::Centre);

        let panel = Rect::new(centre_x - 140.0, middle - 60.0, 280.0, 60.0);
        surface.fill_rect(panel, Rgb::WHITE.with_alpha(0.1));
        surface.stroke_rect(panel, Rgb::WHITE);
        surface.fill_text(
            Point::new(centre_x, middle - 30.0),
            &format!("Score: {}", self.score),
            COMBO_TEXT,
            TextAlign::Centre,
        );

        surface.fill_text(
            Point::new(centre_x, middle + 90.0),
            "Press N to restart",
            HINT_TEXT,
            TextAlign::Centre,
        );
    }
}

impl<R: Rng> Drawable for BrewGame<R> {
    fn draw(&self, surface: &mut impl Surface) {
        let (width, height) = (self.config.width, self.config.height);
        let target = self.target();
        let playing = self.phase == Phase::Playing;

        surface.fill_rect(Rect::new(0.0, 0.0, width, height), self.config.background);
        for star in &self.stars {
            star.draw(surface);
        }

        if playing {
            surface.fill_rect(Rect::centred(target, IMPACT_ZONE, IMPACT_ZONE), IMPACT_COLOUR);
        }

        for note in &self.notes {
            self.draw_step(surface, note.kind, Point::new(target.x, note.y));
        }

        self.draw_lives(surface, self.lives_colour());
        for effect in &self.hit_effects {
            effect.draw(surface);
        }

        surface.fill_text(
            Point::new(10.0, 100.0),
            &format!("Score: {}", self.score),
            Rgb::WHITE,
            TextAlign::Left,
        );

        if self.combo_visible() {
            let glow = (self.combo_scale() - 1.0) / 2.0;
            surface.fill_text(
                Point::new(target.x + 50.0, target.y - 120.0),
                &format!("x{}", self.combo),
                COMBO_TEXT.lerp(Rgb::WHITE, glow),
                TextAlign::Left,
            );
        }

        for text in &self.floating_texts {
            text.draw(surface);
        }

        if playing {
            let centre = Point::new(target.x + self.shake_offset, target.y);
            self.draw_step(surface, self.selected, centre);
        }

        for particle in &self.particles {
            particle.draw(surface);
        }

        if self.phase == Phase::Finished {
            self.draw_game_over(surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use core_arcade::FrameBuffer;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    /// A game whose spawner never fires, so tests place their own notes.
    fn quiet_game() -> BrewGame<ChaCha8Rng> {
        let mut game = BrewGame::new(BrewConfig::default(), ChaCha8Rng::seed_from_u64(42), 0);
        game.spawner = NoteSpawner::new(&game.config, u64::MAX);
        game
    }

    /// Puts a note where the next frame will carry it onto the target line.
    fn note_arriving(game: &mut BrewGame<ChaCha8Rng>, kind: StepKind) {
        let y = game.config.target_y - game.note_speed;
        game.notes.push(Note { kind, y });
    }

    #[test]
    fn new_game_spawns_its_first_note_immediately() {
        let mut game = BrewGame::new(BrewConfig::default(), ChaCha8Rng::seed_from_u64(1), 0);

        assert_eq!(game.lives(), 5);
        assert_eq!(game.stars.len(), 100);

        assert_eq!(game.update(16), None);
        assert_eq!(game.notes().len(), 1);
        assert_eq!(game.notes()[0].y, -40.0 + 2.5);
    }

    #[test]
    fn hitting_the_selected_kind_scores_and_heals() {
        let mut game = quiet_game();
        note_arriving(&mut game, StepKind::Yellow);

        assert_eq!(game.update(100), Some(Judgement::Hit { reward: 100 }));
        assert_eq!(game.score(), 100);
        assert_eq!(game.combo(), 1);
        assert_eq!(game.lives(), 6);
        assert!(game.notes().is_empty());
        assert_eq!(game.hit_effects.len(), 1);
        assert_eq!(game.floating_texts[0].text, "+100");
        assert_eq!(game.floating_texts[0].colour, HIT_TEXT);
    }

    #[test]
    fn long_combos_earn_a_bonus() {
        let mut game = quiet_game();
        game.combo = 4;
        note_arriving(&mut game, StepKind::Yellow);

        assert_eq!(game.update(100), Some(Judgement::Hit { reward: 140 }));
        assert_eq!(game.combo(), 5);
    }

    #[test]
    fn lives_are_capped() {
        let mut game = quiet_game();
        game.lives = 10;
        note_arriving(&mut game, StepKind::Yellow);

        game.update(100);
        assert_eq!(game.lives(), 10);
    }

    #[test]
    fn missing_costs_points_lives_and_the_combo() {
        let mut game = quiet_game();
        game.score = 150;
        game.combo = 7;
        note_arriving(&mut game, StepKind::Red);

        assert_eq!(game.update(100), Some(Judgement::Miss));
        assert_eq!(game.score(), 0);
        assert_eq!(game.combo(), 0);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.shake_frames, 9);
        assert_eq!(game.floating_texts[0].text, "-200");
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn one_judgement_per_frame() {
        let mut game = quiet_game();
        note_arriving(&mut game, StepKind::Yellow);
        note_arriving(&mut game, StepKind::Yellow);

        game.update(100);
        assert_eq!(game.notes().len(), 1);
        game.update(116);
        assert!(game.notes().is_empty());
        assert_eq!(game.combo(), 2);
    }

    #[test]
    fn notes_outside_the_window_pass_untouched() {
        let mut game = quiet_game();
        game.notes.push(Note { kind: StepKind::Red, y: 0.0 });

        assert_eq!(game.update(100), None);
        assert_eq!(game.notes()[0].y, 2.5);
    }

    #[test]
    fn notes_below_the_field_are_dropped() {
        let mut game = quiet_game();
        game.phase = Phase::Collapsing { since_ms: 0 };
        game.notes.push(Note { kind: StepKind::Red, y: 638.0 });

        game.update(100);
        assert!(game.notes().is_empty());
    }

    #[test]
    fn running_out_of_lives_shatters_the_selector() {
        let mut game = quiet_game();
        game.lives = 2;
        game.selected = StepKind::Cyan;
        note_arriving(&mut game, StepKind::Yellow);

        game.update(1000);
        assert_eq!(game.lives(), 0);
        assert_eq!(game.phase(), Phase::Collapsing { since_ms: 1000 });
        assert_eq!(game.particles.len(), 20);
        assert!(game.particles.iter().all(|p| p.colour == StepKind::Cyan.colour()));
        assert!(game.is_over());

        game.update(2000);
        assert!(matches!(game.phase(), Phase::Collapsing { .. }));
        game.update(2001);
        assert_eq!(game.phase(), Phase::Finished);

        let score = game.score();
        game.notes.push(Note { kind: StepKind::Yellow, y: 0.0 });
        assert_eq!(game.update(3000), None);
        assert_eq!(game.notes()[0].y, 0.0);
        assert_eq!(game.score(), score);
    }

    #[test]
    fn notes_are_not_judged_after_game_over() {
        let mut game = quiet_game();
        game.phase = Phase::Collapsing { since_ms: 100 };
        note_arriving(&mut game, StepKind::Red);

        assert_eq!(game.update(200), None);
        assert_eq!(game.notes().len(), 1);
    }

    #[test]
    fn notes_speed_up_over_time() {
        let mut game = quiet_game();

        game.update(7999);
        assert_eq!(game.note_speed(), 2.5);
        game.update(8000);
        assert!((game.note_speed() - 2.65).abs() < 1e-6);
        game.update(24_000);
        assert!((game.note_speed() - 2.95).abs() < 1e-6);
    }

    #[test]
    fn selector_cycles_and_numbers_toggle() {
        let mut game = quiet_game();

        game.cycle_step();
        assert_eq!(game.selected(), StepKind::Cyan);
        (0..3).for_each(|_| game.cycle_step());
        assert_eq!(game.selected(), StepKind::Yellow);

        game.toggle_numbers();
        assert!(game.shows_numbers());
        game.toggle_numbers();
        assert!(!game.shows_numbers());
    }

    #[test]
    fn combo_shows_for_a_while_after_a_hit() {
        let mut game = quiet_game();
        game.combo = 3;
        note_arriving(&mut game, StepKind::Yellow);
        game.update(1000);

        assert!(game.combo_visible());
        assert_eq!(game.combo_scale(), 1.0);

        game.update(2999);
        assert!(game.combo_visible());
        game.update(3000);
        assert!(!game.combo_visible());

        game.combo = 30;
        assert!((game.combo_scale() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn lives_colour_runs_red_to_green() {
        let mut game = quiet_game();

        game.lives = 0;
        assert_eq!(game.lives_colour(), Rgb::from_u32(0xff0000));
        game.lives = 5;
        assert_eq!(game.lives_colour(), Rgb::from_u32(0xffff00));
        game.lives = 10;
        assert_eq!(game.lives_colour(), Rgb::from_u32(0x00ff00));
    }

    #[test]
    fn restart_resets_the_round() {
        let mut game = quiet_game();
        game.score = 900;
        game.lives = 0;
        game.phase = Phase::Finished;
        game.selected = StepKind::Red;
        game.show_numbers = true;

        game.restart(5000);

        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.lives(), 5);
        assert_eq!(game.selected(), StepKind::Yellow);
        assert!(game.shows_numbers());
        assert_eq!(game.spawner.next_at_ms(), 5000);
    }

    #[test]
    fn draws_score_and_game_over_screen() {
        let mut game = quiet_game();
        let mut frame = FrameBuffer::new(40, 30, 400.0, 600.0, Rgb::BLACK);

        game.draw(&mut frame);
        assert!(frame.row_text(5).contains("Score: 0"));

        game.score = 1234;
        game.phase = Phase::Finished;
        frame.clear();
        game.draw(&mut frame);

        assert!((0..frame.rows()).any(|row| frame.row_text(row).contains("Game Over")));
        assert!((0..frame.rows()).any(|row| frame.row_text(row).contains("Score: 1234")));
        assert!((0..frame.rows()).any(|row| frame.row_text(row).contains("Press N to restart")));
    }
}

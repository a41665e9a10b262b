use core_arcade::Rgb;
use rand::Rng;

use crate::config::BrewConfig;

/// Height at which new notes appear, above the top of the field.
pub const SPAWN_Y: f32 = -40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    Yellow = 0,
    Cyan = 1,
    Red = 2,
    Purple = 3,
}

impl StepKind {
    pub const ALL: [Self; 4] = [Self::Yellow, Self::Cyan, Self::Red, Self::Purple];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// The kind selected after this one; wraps around.
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    /// One-based number shown on notes when numbers are enabled.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    pub const fn colour(self) -> Rgb {
        match self {
            Self::Yellow => Rgb::new(255, 255, 0),
            Self::Cyan => Rgb::new(0, 255, 255),
            Self::Red => Rgb::new(255, 0, 0),
            Self::Purple => Rgb::new(160, 0, 255),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Note {
    pub kind: StepKind,
    /// Height of the note's centre.
    pub y: f32,
}

impl Note {
    pub fn new(kind: StepKind) -> Self {
        Self { kind, y: SPAWN_Y }
    }
}

/// Decides when the next note appears and of which kind.
#[derive(Clone, Debug)]
pub struct NoteSpawner {
    last: Option<StepKind>,
    consecutive: u32,
    max_repeat: u32,
    interval_ms: u64,
    min_interval_ms: u64,
    acceleration_ms: u64,
    next_at_ms: u64,
}

impl NoteSpawner {
    /// The first note is due at `start_ms`.
    pub fn new(config: &BrewConfig, start_ms: u64) -> Self {
        Self {
            last: None,
            consecutive: 0,
            max_repeat: config.max_repeat,
            interval_ms: config.spawn_interval_ms,
            min_interval_ms: config.min_spawn_interval_ms,
            acceleration_ms: config.spawn_acceleration_ms,
            next_at_ms: start_ms,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn next_at_ms(&self) -> u64 {
        self.next_at_ms
    }

    /// Picks a kind, re-rolling while it would extend a run that already
    /// reached the repeat limit.
    pub fn pick(&mut self, rng: &mut impl Rng) -> StepKind {
        let kind = loop {
            let kind = StepKind::random(rng);

            if self.last != Some(kind) || self.consecutive < self.max_repeat {
                break kind;
            }
        };

        if self.last == Some(kind) {
            self.consecutive += 1;
        } else {
            self.last = Some(kind);
            self.consecutive = 1;
        }

        kind
    }

    /// Returns a new note if one is due, then schedules the next one a
    /// slightly shorter interval later.
    pub fn due(&mut self, now_ms: u64, rng: &mut impl Rng) -> Option<Note> {
        if now_ms < self.next_at_ms {
            return None;
        }

        let note = Note::new(self.pick(rng));

        self.interval_ms = self
            .interval_ms
            .saturating_sub(self.acceleration_ms)
            .max(self.min_interval_ms);
        self.next_at_ms = now_ms + self.interval_ms;

        Some(note)
    }
}

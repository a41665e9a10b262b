//! Per-tile animations.
//!
//! Both animations advance by a fixed delta every frame; a `Move` covers its
//! distance in [`STEP_FRAMES`] frames and a `Scale` in `duration * STEP_FRAMES`.

use core_arcade::Point;

pub const STEP_FRAMES: f32 = 5.0;

const ARRIVAL_EPSILON: f32 = 1e-3;

/// Slides a tile from one slot origin to a neighbouring one.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    current: Point,
    velocity: Point,
    end: Point,
    target: usize,
}

impl Move {
    pub fn new(start: Point, end: Point, target: usize) -> Self {
        Self {
            current: start,
            velocity: (end - start) / STEP_FRAMES,
            end,
            target,
        }
    }

    pub fn position(&self) -> Point {
        self.current
    }

    /// Index of the slot the tile is heading to.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Advances one frame. Returns `true` once the end has been reached.
    pub fn act(&mut self) -> bool {
        self.current = self.current + self.velocity;

        let arrived = (self.end.x - self.current.x).abs() <= ARRIVAL_EPSILON
            && (self.end.y - self.current.y).abs() <= ARRIVAL_EPSILON;

        if arrived {
            self.current = self.end;
        }

        arrived
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    current: f32,
    start: f32,
    end: f32,
    velocity: f32,
    rebound: Option<f32>,
}

impl Scale {
    pub fn new(start: f32, end: f32, duration: f32) -> Self {
        Self {
            current: start,
            start,
            end,
            velocity: (end - start) / duration / STEP_FRAMES,
            rebound: None,
        }
    }

    /// Once finished, scale back to 1 over `duration`.
    pub fn with_rebound(self, duration: f32) -> Self {
        Self {
            rebound: Some(duration),
            ..self
        }
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    /// Advances one frame. Returns `true` when the end value has been reached.
    pub fn act(&mut self) -> bool {
        self.current += self.velocity;

        let sign = if self.start <= self.end { 1.0 } else { -1.0 };
        let finished = sign * (self.end - self.current) <= 0.0;

        if finished {
            self.current = self.end;
        }

        finished
    }

    /// The animation that replaces this one when it finishes, if any.
    pub fn follow_up(&self) -> Option<Self> {
        self.rebound
            .map(|duration| Self::new(self.current, 1.0, duration))
    }
}

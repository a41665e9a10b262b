use core_arcade::Point;

use crate::direction::Direction;

/// Turns a pointer drag into orders. Every time the pointer travels
/// `threshold` units from the anchor along an axis, an order fires and the
/// anchor jumps to the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct SwipeTracker {
    threshold: f32,
    anchor: Option<Point>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            anchor: None,
        }
    }

    pub fn begin(&mut self, point: Point) {
        self.anchor = Some(point);
    }

    pub fn end(&mut self) {
        self.anchor = None;
    }

    /// Returns the vertical order, then the horizontal one.
    pub fn drag(&mut self, point: Point) -> [Option<Direction>; 2] {
        let Some(anchor) = self.anchor else {
            return [None, None];
        };

        let vertical = self.axis(point.y - anchor.y, Direction::Down, Direction::Up);
        let anchor = if vertical.is_some() { point } else { anchor };
        let horizontal = self.axis(point.x - anchor.x, Direction::Right, Direction::Left);

        if vertical.is_some() || horizontal.is_some() {
            self.anchor = Some(point);
        }

        [vertical, horizontal]
    }

    fn axis(&self, delta: f32, positive: Direction, negative: Direction) -> Option<Direction> {
        if delta >= self.threshold {
            Some(positive)
        } else if delta <= -self.threshold {
            Some(negative)
        } else {
            None
        }
    }
}

//! Short-lived decorations: background stars, hit flashes, floating score
//! texts and the particles of a shattered selector.

use core_arcade::{Drawable, Point, Rgb, Surface, TextAlign};
use rand::Rng;

/// Something that changes every frame and eventually disappears.
pub trait Effect {
    fn update(&mut self);

    fn is_alive(&self) -> bool;
}

/// Advances every effect by one frame and drops the dead ones.
pub fn decay<E: Effect>(effects: &mut Vec<E>) {
    effects.iter_mut().for_each(Effect::update);
    effects.retain(Effect::is_alive);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    pub position: Point,
    pub radius: f32,
    pub opacity: f32,
    /// Change of opacity per frame; flips sign at either bound.
    pub twinkle: f32,
    /// Downward drift per frame.
    pub drift: f32,
}

impl Star {
    pub fn random(rng: &mut impl Rng, width: f32, height: f32) -> Self {
        Self {
            position: Point::new(rng.gen::<f32>() * width, rng.gen::<f32>() * height),
            radius: rng.gen::<f32>() * 1.5 + 0.5,
            opacity: rng.gen(),
            twinkle: rng.gen::<f32>() * 0.02 + 0.005,
            drift: rng.gen::<f32>() * 0.5 + 0.2,
        }
    }

    /// Twinkles and drifts; a star leaving the bottom reappears at the top
    /// at a random column.
    pub fn update(&mut self, rng: &mut impl Rng, width: f32, height: f32) {
        self.opacity += self.twinkle;
        if self.opacity >= 1.0 || self.opacity <= 0.0 {
            self.twinkle = -self.twinkle;
        }

        self.position.y += self.drift;
        if self.position.y > height {
            self.position = Point::new(rng.gen::<f32>() * width, -self.radius);
        }
    }
}

impl Drawable for Star {
    fn draw(&self, surface: &mut impl Surface) {
        let glyph = if self.radius > 1.5 { "*" } else { "." };
        let paint = Rgb::WHITE.with_alpha(self.opacity.clamp(0.0, 1.0));

        surface.fill_text(self.position, glyph, paint, TextAlign::Centre);
    }
}

/// A flash spreading out from the target when a note is hit.
#[derive(Clone, Debug, PartialEq)]
pub struct HitEffect {
    pub centre: Point,
    pub colour: Rgb,
    pub radius: f32,
    pub opacity: f32,
}

impl HitEffect {
    pub fn new(centre: Point, colour: Rgb) -> Self {
        Self {
            centre,
            colour,
            radius: 30.0,
            opacity: 1.0,
        }
    }
}

impl Effect for HitEffect {
    fn update(&mut self) {
        self.radius += 1.5;
        self.opacity -= 0.05;
    }

    fn is_alive(&self) -> bool {
        self.opacity > 0.0
    }
}

impl Drawable for HitEffect {
    fn draw(&self, surface: &mut impl Surface) {
        surface.fill_circle(self.centre, self.radius, self.colour.with_alpha(self.opacity));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatingText {
    pub text: String,
    pub position: Point,
    pub colour: Rgb,
    pub alpha: f32,
}

impl FloatingText {
    pub fn new(text: impl Into<String>, position: Point, colour: Rgb) -> Self {
        Self {
            text: text.into(),
            position,
            colour,
            alpha: 1.0,
        }
    }
}

impl Effect for FloatingText {
    fn update(&mut self) {
        self.position.y -= 0.5;
        self.alpha -= 0.02;
    }

    fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

impl Drawable for FloatingText {
    fn draw(&self, surface: &mut impl Surface) {
        let paint = self.colour.with_alpha(self.alpha);
        surface.fill_text(self.position, &self.text, paint, TextAlign::Left);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Point,
    pub radius: f32,
    pub colour: Rgb,
    pub alpha: f32,
}

impl Particle {
    /// `count` particles flying out of `centre` in random directions.
    pub fn burst(rng: &mut impl Rng, centre: Point, colour: Rgb, count: usize) -> Vec<Self> {
        (0..count)
            .map(|_| Self {
                position: centre,
                velocity: Point::new(rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)),
                radius: rng.gen_range(2.0..6.0),
                colour,
                alpha: 1.0,
            })
            .collect()
    }
}

impl Effect for Particle {
    fn update(&mut self) {
        self.position = self.position + self.velocity;
        self.alpha -= 0.02;
    }

    fn is_alive(&self) -> bool {
        self.alpha > 0.0
    }
}

impl Drawable for Particle {
    fn draw(&self, surface: &mut impl Surface) {
        let glyph = if self.radius > 4.0 { "●" } else { "•" };
        surface.fill_text(self.position, glyph, self.colour.with_alpha(self.alpha), TextAlign::Centre);
    }
}

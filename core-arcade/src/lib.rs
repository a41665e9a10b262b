//! Shared drawing primitives for the arcade games.
//!
//! Both games draw through the [`Surface`] trait in their own logical
//! coordinate space; [`FrameBuffer`] rasterises those calls onto a grid of
//! terminal cells.

pub mod colour;
pub mod framebuffer;
pub mod surface;

pub use colour::{ColourError, Rgb, Rgba};
pub use framebuffer::{Cell, FrameBuffer};
pub use surface::{Drawable, Point, Rect, Surface, TextAlign};

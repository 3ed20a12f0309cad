#![forbid(unsafe_code)]

//! Render kernel: the packed [`Glyph`] value shared by layout, effects, and
//! rendering, plus the [`PackedRgba`] color it embeds.

pub mod color;
pub mod glyph;

pub use color::PackedRgba;
pub use glyph::{Glyph, StyleFlags};

#![forbid(unsafe_code)]

//! Style: the color-lookup collaborator contract, the default named-color
//! table, and color literal parsing shared by markup tags and effect
//! parameters.

pub mod color;

pub use color::{
    ColorLookup, ColorParseError, NamedColors, NoColors, Rgb, parse_color, parse_color_strict,
};
pub use typist_render::PackedRgba;

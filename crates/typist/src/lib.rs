#![forbid(unsafe_code)]

//! Typist public facade crate.
//!
//! Re-exports the types a host needs to show animated, progressively
//! revealed rich text, and offers a prelude for day-to-day use.
//!
//! # Example
//! ```
//! use typist::prelude::*;
//!
//! let mut label = TypingLabel::new("{WAVE}Hello{ENDWAVE}, {NAME}!")
//!     .with_variable("NAME", "reader");
//! assert_eq!(label.layout().text(), "Hello, reader!");
//!
//! label.skip_to_end(false, false);
//! let frame = label.update(1.0 / 60.0);
//! assert_eq!(frame.text(), "Hello, reader!");
//! ```

use std::fmt;

// --- Codec re-exports -----------------------------------------------------

pub use typist_render::{Glyph, PackedRgba, StyleFlags};

// --- Style re-exports -----------------------------------------------------

pub use typist_style::{ColorLookup, ColorParseError, NamedColors, NoColors, Rgb};

// --- Text re-exports ------------------------------------------------------

pub use typist_text::{
    FontMetrics, Layout, Line, MarkupParser, MonospaceFont, Parsed, SpeedChange, Token,
    TokenCategory, TokenKind, TokenTable,
};

// --- Effect re-exports ----------------------------------------------------

pub use typist_fx::{
    ActiveEffects, BuiltinEffect, Effect, EffectInstance, EffectKind, EffectParams,
    EffectRegistry, EffectTiming, FrameContext, GlyphDelta, RegistryError,
};

// --- Runtime re-exports ---------------------------------------------------

pub use typist_runtime::{
    GlyphCell, GlyphFrame, RecordingListener, RevealState, TypingConfig, TypingLabel,
    TypingListener,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for typist hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Effect registration was refused.
    Registry(RegistryError),
    /// A color string did not parse.
    Color(ColorParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::Color(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Color(err) => Some(err),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

impl From<ColorParseError> for Error {
    fn from(err: ColorParseError) -> Self {
        Self::Color(err)
    }
}

/// Standard result type for typist APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Global helpers -------------------------------------------------------

/// Register an effect in the process-wide registry. Labels built afterwards
/// can use it; existing labels keep their snapshot.
pub fn register_effect(
    name: &str,
    shorthand: Option<char>,
    kind: impl Into<EffectKind>,
) -> Result<()> {
    typist_fx::register(name, shorthand, kind)?;
    Ok(())
}

/// Parse a color literal or a built-in color name.
pub fn parse_color(s: &str) -> Result<PackedRgba> {
    Ok(typist_style::parse_color_strict(s, &NamedColors::new())?)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Effect, EffectKind, EffectParams, Error, Glyph, GlyphFrame, PackedRgba, Result,
        RevealState, TypingConfig, TypingLabel, TypingListener,
    };

    pub use crate::{core, fx, render, runtime, style, text};
}

pub use typist_core as core;
pub use typist_fx as fx;
pub use typist_render as render;
pub use typist_runtime as runtime;
pub use typist_style as style;
pub use typist_text as text;

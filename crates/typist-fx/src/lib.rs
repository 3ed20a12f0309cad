#![forbid(unsafe_code)]

//! Effect runtime.
//!
//! An effect is a stateful transformer bound to a glyph range. Each frame the
//! runtime advances every active [`Effect`] once, then asks it to transform
//! each revealed glyph in its range. Transformations accumulate into a
//! [`GlyphDelta`]: position offsets, size deltas, rotation, and a recolored
//! glyph.
//!
//! Effects are looked up by name (or a one-character shorthand) in an
//! [`EffectRegistry`]. A process-wide registry pre-populated with the
//! [`BuiltinEffect`]s backs the markup parser; [`register`] and
//! [`unregister`] extend it at runtime without touching the parser.
//!
//! # Example
//!
//! ```
//! use typist_fx::{EffectParams, EffectRegistry, FrameContext, GlyphDelta};
//! use typist_render::{Glyph, PackedRgba};
//!
//! let registry = EffectRegistry::with_builtins();
//! let raw = vec!["2".to_string()];
//! let mut wave = registry.create("w", &EffectParams::new(&raw)).unwrap();
//!
//! wave.update(0.1);
//! let glyph = Glyph::from_char('a', PackedRgba::WHITE);
//! let delta = wave.apply(glyph, 0, 0, &FrameContext::new(0.1, 16.0));
//! assert_eq!(delta.dx, 0.0);
//! ```

pub mod effect;
pub mod effects;
pub mod instance;
pub mod params;
pub mod registry;

pub use effect::{Effect, EffectTiming, FADEOUT_SPLIT, FrameContext, GlyphClock, GlyphDelta};
pub use effects::BuiltinEffect;
pub use instance::{ActiveEffects, EffectInstance};
pub use params::EffectParams;
pub use registry::{
    EffectFactory, EffectKind, EffectRegistry, RegisteredEffect, RegistryError, register,
    registry_snapshot, reset_registry, unregister, with_registry,
};

#![forbid(unsafe_code)]

//! Core: logging facade, easing curves, and deterministic pseudo-noise shared
//! by every typist crate.

pub mod easing;
pub mod logging;
pub mod noise;

pub use easing::Easing;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace};

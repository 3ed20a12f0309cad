#![forbid(unsafe_code)]

//! Reveal runtime.
//!
//! Ties markup, effects and time together:
//!
//! - [`TypingConfig`]: reveal defaults, with a process-wide instance that
//!   new labels copy.
//! - [`RevealScheduler`]: the budgeted reveal clock and its
//!   RUNNING/PAUSED/SKIPPING/ENDED state machine.
//! - [`TypingListener`]: lifecycle callbacks.
//! - [`TypingLabel`]: one animated text, producing a [`GlyphFrame`] per
//!   update.

pub mod config;
pub mod frame;
pub mod label;
pub mod listener;
pub mod scheduler;

pub use config::{
    TypingConfig, global_config, reset_globals, set_global_variable, update_global_config,
};
pub use frame::{GlyphCell, GlyphFrame};
pub use label::{RegistryResolver, TypingLabel};
pub use listener::{ListenerCall, RecordingListener, TypingListener};
pub use scheduler::{RevealEvent, RevealScheduler, RevealState, natural_jitter};

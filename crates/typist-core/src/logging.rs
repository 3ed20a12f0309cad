#![forbid(unsafe_code)]

//! Logging facade for the effect crates.
//!
//! With the `tracing` feature enabled `debug!` and `trace!` are the
//! `tracing` macros, re-exported here and at the crate root. Without it they
//! expand to nothing, so registry and effect call sites cost nothing in
//! builds that do not log.
//!
//! Call sites tag their events with one of the [`targets`] so a subscriber
//! can filter e.g. `typist::effects=debug,typist::reveal=trace`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

/// Log targets used across the workspace.
pub mod targets {
    /// Effect registry and effect instance lifecycle.
    pub const EFFECTS: &str = "typist::effects";
    /// Reveal scheduler state transitions.
    pub const REVEAL: &str = "typist::reveal";
    /// Process-wide configuration changes.
    pub const CONFIG: &str = "typist::config";
}

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards a debug event.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards a trace event.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }
}

#[cfg(all(test, not(feature = "tracing")))]
mod tests {
    use super::targets;

    #[test]
    fn noop_macros_accept_tracing_syntax() {
        let glyphs = 3usize;
        crate::debug!(target: targets::EFFECTS, glyphs, "registered");
        crate::trace!(target: targets::EFFECTS, name = %"wave", range = ?(0..glyphs), "started");
        assert_eq!(glyphs, 3);
    }

    #[test]
    fn targets_share_prefix() {
        for target in [targets::EFFECTS, targets::REVEAL, targets::CONFIG] {
            assert!(target.starts_with("typist::"));
        }
    }
}

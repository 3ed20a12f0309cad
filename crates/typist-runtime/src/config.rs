#![forbid(unsafe_code)]

//! Typing configuration.
//!
//! [`TypingConfig`] carries every reveal default. A process-wide instance,
//! initialised from the defaults plus environment overrides, is read by
//! each new label; labels then own their copy and can override anything.
//!
//! # Environment Variables
//!
//! - `TYPIST_CHARS_PER_SECOND`: base reveal rate.
//! - `TYPIST_MIN_SPEED` / `TYPIST_MAX_SPEED`: effective speed clamp.
//! - `TYPIST_DEFAULT_WAIT`: seconds for a bare `{WAIT}`.
//! - `TYPIST_MAX_CHARS_PER_TICK`: reveal cap per update, `0` for none.
//!
//! Unparseable or out-of-range values are ignored.

use std::sync::{LazyLock, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use typist_core::logging::targets;
use typist_render::PackedRgba;

const ENV_CHARS_PER_SECOND: &str = "TYPIST_CHARS_PER_SECOND";
const ENV_MIN_SPEED: &str = "TYPIST_MIN_SPEED";
const ENV_MAX_SPEED: &str = "TYPIST_MAX_SPEED";
const ENV_DEFAULT_WAIT: &str = "TYPIST_DEFAULT_WAIT";
const ENV_MAX_CHARS_PER_TICK: &str = "TYPIST_MAX_CHARS_PER_TICK";

/// Reveal defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingConfig {
    /// Base reveal rate at speed multiplier 1.
    pub chars_per_second: f32,
    /// Lower clamp on the effective speed multiplier.
    pub min_speed_multiplier: f32,
    /// Upper clamp on the effective speed multiplier.
    pub max_speed_multiplier: f32,
    /// Seconds a bare `{WAIT}` holds.
    pub default_wait: f32,
    /// Per-character interval multipliers: `2.0` makes the pause after that
    /// character twice as long.
    pub interval_multipliers: FxHashMap<char, f32>,
    /// Color applied by `{CLEARCOLOR}`.
    pub clear_color: PackedRgba,
    /// Variables visible to every label, keyed in upper case.
    pub variables: FxHashMap<String, String>,
    /// Most glyphs revealed by one update, `0` for no limit. Skipping
    /// ignores it.
    pub max_chars_per_tick: usize,
    /// Ellipsis used when a label truncates at its line limit.
    pub default_ellipsis: Option<String>,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            chars_per_second: 20.0,
            min_speed_multiplier: 0.001,
            max_speed_multiplier: 100.0,
            default_wait: 0.25,
            interval_multipliers: FxHashMap::default(),
            clear_color: PackedRgba::WHITE,
            variables: FxHashMap::default(),
            max_chars_per_tick: 0,
            default_ellipsis: None,
        }
    }
}

impl TypingConfig {
    /// Defaults with overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = env_positive(&get_env, ENV_CHARS_PER_SECOND) {
            config.chars_per_second = v;
        }
        if let Some(v) = env_positive(&get_env, ENV_MIN_SPEED) {
            config.min_speed_multiplier = v;
        }
        if let Some(v) = env_positive(&get_env, ENV_MAX_SPEED) {
            config.max_speed_multiplier = v;
        }
        if let Some(v) = env_f32(&get_env, ENV_DEFAULT_WAIT).filter(|v| *v >= 0.0) {
            config.default_wait = v;
        }
        if let Some(v) = get_env(ENV_MAX_CHARS_PER_TICK).and_then(|s| s.trim().parse().ok()) {
            config.max_chars_per_tick = v;
        }
        config
    }

    /// Set the base reveal rate.
    #[must_use]
    pub fn with_chars_per_second(mut self, cps: f32) -> Self {
        self.chars_per_second = cps;
        self
    }

    /// Set the effective speed clamp.
    #[must_use]
    pub fn with_speed_range(mut self, min: f32, max: f32) -> Self {
        self.min_speed_multiplier = min;
        self.max_speed_multiplier = max;
        self
    }

    /// Set the bare `{WAIT}` duration.
    #[must_use]
    pub fn with_default_wait(mut self, seconds: f32) -> Self {
        self.default_wait = seconds;
        self
    }

    /// Make the pause after `ch` `multiplier` times as long.
    #[must_use]
    pub fn with_interval_multiplier(mut self, ch: char, multiplier: f32) -> Self {
        self.interval_multipliers.insert(ch, multiplier);
        self
    }

    /// Set the `{CLEARCOLOR}` color.
    #[must_use]
    pub fn with_clear_color(mut self, color: impl Into<PackedRgba>) -> Self {
        self.clear_color = color.into();
        self
    }

    /// Add a variable.
    #[must_use]
    pub fn with_variable(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_variable(name, value);
        self
    }

    /// Cap glyphs per update.
    #[must_use]
    pub fn with_max_chars_per_tick(mut self, max: usize) -> Self {
        self.max_chars_per_tick = max;
        self
    }

    /// Ellipsis for truncated labels.
    #[must_use]
    pub fn with_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.default_ellipsis = Some(ellipsis.into());
        self
    }

    /// Set a variable. Names are case-insensitive.
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) {
        self.variables.insert(name.to_uppercase(), value.into());
    }

    /// Value of a variable.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(&name.to_uppercase()).map(String::as_str)
    }

    /// Interval multiplier for `ch`, `1` when unset or not positive.
    pub fn interval_multiplier(&self, ch: char) -> f32 {
        self.interval_multipliers
            .get(&ch)
            .copied()
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(1.0)
    }

    /// Clamp a speed multiplier into the configured range. The bounds may
    /// be given in either order and a NaN bound is ignored. A NaN
    /// multiplier becomes the lower bound.
    pub fn clamp_speed(&self, multiplier: f32) -> f32 {
        let lo = self.min_speed_multiplier.min(self.max_speed_multiplier);
        let hi = self.min_speed_multiplier.max(self.max_speed_multiplier);
        if multiplier.is_nan() {
            return lo;
        }
        multiplier.max(lo).min(hi)
    }
}

fn env_f32<F>(get_env: &F, key: &str) -> Option<f32>
where
    F: Fn(&str) -> Option<String>,
{
    get_env(key)
        .and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
}

fn env_positive<F>(get_env: &F, key: &str) -> Option<f32>
where
    F: Fn(&str) -> Option<String>,
{
    env_f32(get_env, key).filter(|v| *v > 0.0)
}

// =============================================================================
// Process-wide defaults
// =============================================================================

static GLOBAL_CONFIG: LazyLock<RwLock<TypingConfig>> =
    LazyLock::new(|| RwLock::new(TypingConfig::from_env()));

/// Copy of the process-wide configuration.
pub fn global_config() -> TypingConfig {
    GLOBAL_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Edit the process-wide configuration. Existing labels keep their copy.
pub fn update_global_config(f: impl FnOnce(&mut TypingConfig)) {
    let mut guard = GLOBAL_CONFIG.write().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard);
    tracing::debug!(target: targets::CONFIG, "global typing config updated");
}

/// Set a process-wide variable.
pub fn set_global_variable(name: &str, value: impl Into<String>) {
    GLOBAL_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .set_variable(name, value);
}

/// Restore the process-wide configuration to its startup state (defaults
/// plus environment overrides) and the effect registry to the built-ins.
pub fn reset_globals() {
    *GLOBAL_CONFIG.write().unwrap_or_else(PoisonError::into_inner) = TypingConfig::from_env();
    typist_fx::reset_registry();
    tracing::debug!(target: targets::CONFIG, "globals reset");
}

#![forbid(unsafe_code)]

//! Permissive access to raw effect parameters.
//!
//! Parameters come straight from content-authored markup, so every accessor
//! takes a default and falls back to it when the slot is missing, empty, or
//! does not parse.

use typist_render::PackedRgba;
use typist_style::{ColorLookup, NoColors, parse_color};

static NO_COLORS: NoColors = NoColors;

/// Raw parameter strings of one effect tag plus the color lookup used to
/// resolve color-valued slots.
#[derive(Clone, Copy)]
pub struct EffectParams<'a> {
    raw: &'a [String],
    colors: &'a dyn ColorLookup,
}

impl std::fmt::Debug for EffectParams<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectParams").field("raw", &self.raw).finish()
    }
}

impl<'a> EffectParams<'a> {
    /// Parameters with no named colors (hex and `rgb()` still parse).
    pub fn new(raw: &'a [String]) -> Self {
        Self {
            raw,
            colors: &NO_COLORS,
        }
    }

    /// Resolve color names through `colors`.
    #[must_use]
    pub fn with_colors(mut self, colors: &'a dyn ColorLookup) -> Self {
        self.colors = colors;
        self
    }

    /// Number of slots, empty ones included.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the tag had no parameters.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Trimmed slot `index`, `None` if missing or blank.
    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.raw
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Finite float in slot `index`, else `default`.
    pub fn float(&self, index: usize, default: f32) -> f32 {
        self.get(index)
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(default)
    }

    /// Boolean in slot `index`, else `default`.
    ///
    /// `true`, `yes`, `t`, `y`, `on`, `1` are true; `false`, `no`, `f`, `n`,
    /// `off`, `0` are false. Case-insensitive.
    pub fn boolean(&self, index: usize, default: bool) -> bool {
        let Some(s) = self.get(index) else {
            return default;
        };
        match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "t" | "y" | "on" | "1" => true,
            "false" | "no" | "f" | "n" | "off" | "0" => false,
            _ => default,
        }
    }

    /// Color in slot `index`.
    pub fn color(&self, index: usize) -> Option<PackedRgba> {
        self.get(index).and_then(|s| parse_color(s, self.colors))
    }

    /// Lifetime in slot `index`. Missing or negative means indefinite.
    pub fn duration(&self, index: usize) -> f32 {
        self.float(index, f32::INFINITY)
    }
}

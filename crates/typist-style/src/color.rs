#![forbid(unsafe_code)]

//! Color lookup and color literal parsing.
//!
//! The parser never owns a color table. It asks a [`ColorLookup`] to turn a
//! name into a [`PackedRgba`], so callers can swap in their own palette.
//! [`NamedColors`] is the stock implementation.

use std::fmt;

use rustc_hash::FxHashMap;
use typist_render::PackedRgba;

/// Resolve a color name to a packed color.
///
/// Implementations should match case-insensitively; markup authors write
/// `{RED}`, `[red]` and `{COLOR=Red}` interchangeably.
pub trait ColorLookup {
    /// Look up `name`. `None` means "not a color".
    fn lookup(&self, name: &str) -> Option<PackedRgba>;
}

impl<T: ColorLookup + ?Sized> ColorLookup for &T {
    fn lookup(&self, name: &str) -> Option<PackedRgba> {
        (**self).lookup(name)
    }
}

/// A lookup that knows no names. Hex and `rgb()` literals still parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoColors;

impl ColorLookup for NoColors {
    fn lookup(&self, _name: &str) -> Option<PackedRgba> {
        None
    }
}

/// Opaque RGB color, the structured counterpart of [`PackedRgba`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for PackedRgba {
    fn from(c: Rgb) -> Self {
        PackedRgba::rgb(c.r, c.g, c.b)
    }
}

impl From<PackedRgba> for Rgb {
    fn from(c: PackedRgba) -> Self {
        Self::new(c.r(), c.g(), c.b())
    }
}

/// Built-in names, lowercase.
const BUILTIN: &[(&str, PackedRgba)] = &[
    ("black", PackedRgba::rgb(0, 0, 0)),
    ("red", PackedRgba::rgb(255, 0, 0)),
    ("green", PackedRgba::rgb(0, 255, 0)),
    ("yellow", PackedRgba::rgb(255, 255, 0)),
    ("blue", PackedRgba::rgb(0, 0, 255)),
    ("magenta", PackedRgba::rgb(255, 0, 255)),
    ("purple", PackedRgba::rgb(160, 32, 240)),
    ("cyan", PackedRgba::rgb(0, 255, 255)),
    ("white", PackedRgba::rgb(255, 255, 255)),
    ("gray", PackedRgba::rgb(128, 128, 128)),
    ("grey", PackedRgba::rgb(128, 128, 128)),
    ("light_gray", PackedRgba::rgb(191, 191, 191)),
    ("dark_gray", PackedRgba::rgb(63, 63, 63)),
    ("orange", PackedRgba::rgb(255, 165, 0)),
    ("pink", PackedRgba::rgb(255, 192, 203)),
    ("brown", PackedRgba::rgb(165, 42, 42)),
    ("gold", PackedRgba::rgb(255, 215, 0)),
    ("silver", PackedRgba::rgb(192, 192, 192)),
    ("navy", PackedRgba::rgb(0, 0, 128)),
    ("teal", PackedRgba::rgb(0, 128, 128)),
    ("olive", PackedRgba::rgb(128, 128, 0)),
    ("maroon", PackedRgba::rgb(128, 0, 0)),
    ("lime", PackedRgba::rgb(50, 205, 50)),
    ("aqua", PackedRgba::rgb(0, 255, 255)),
    ("fuchsia", PackedRgba::rgb(255, 0, 255)),
    ("sky", PackedRgba::rgb(135, 206, 235)),
    ("salmon", PackedRgba::rgb(250, 128, 114)),
    ("coral", PackedRgba::rgb(255, 127, 80)),
    ("violet", PackedRgba::rgb(238, 130, 238)),
    ("clear", PackedRgba::TRANSPARENT),
];

/// Case-insensitive name table, seeded with a small built-in palette.
#[derive(Debug, Clone)]
pub struct NamedColors {
    entries: FxHashMap<String, PackedRgba>,
}

impl Default for NamedColors {
    fn default() -> Self {
        Self::new()
    }
}

impl NamedColors {
    /// Table with the built-in palette.
    pub fn new() -> Self {
        let mut entries = FxHashMap::default();
        for &(name, color) in BUILTIN {
            entries.insert(name.to_owned(), color);
        }
        Self { entries }
    }

    /// Table with no names.
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Add or replace a name.
    pub fn insert(&mut self, name: &str, color: impl Into<PackedRgba>) {
        self.entries.insert(normalize(name), color.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: &str, color: impl Into<PackedRgba>) -> Self {
        self.insert(name, color);
        self
    }

    /// Remove a name, returning its color.
    pub fn remove(&mut self, name: &str) -> Option<PackedRgba> {
        self.entries.remove(&normalize(name))
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ColorLookup for NamedColors {
    fn lookup(&self, name: &str) -> Option<PackedRgba> {
        self.entries.get(&normalize(name)).copied()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Why a color literal failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// `#` followed by something other than 3, 4, 6 or 8 hex digits.
    InvalidHex(String),
    /// `rgb(...)`/`rgba(...)` with the wrong arity or a non-byte component.
    InvalidFunction(String),
    /// Not a literal, and the lookup did not know the name.
    UnknownName(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex(s) => write!(f, "invalid hex color '#{s}'"),
            Self::InvalidFunction(s) => write!(f, "invalid color function '{s}'"),
            Self::UnknownName(s) => write!(f, "unknown color name '{s}'"),
        }
    }
}

impl std::error::Error for ColorParseError {}

/// Parse a color literal or name.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
/// `rgba(r, g, b, a)`, and anything `lookup` knows.
pub fn parse_color_strict(
    s: &str,
    lookup: &dyn ColorLookup,
) -> Result<PackedRgba, ColorParseError> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(hex.to_owned()));
    }

    let lower = s.to_ascii_lowercase();
    if let Some(inner) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(inner)
            .ok_or_else(|| ColorParseError::InvalidFunction(s.to_owned()));
    }

    lookup
        .lookup(s)
        .ok_or_else(|| ColorParseError::UnknownName(s.to_owned()))
}

/// Permissive form of [`parse_color_strict`].
pub fn parse_color(s: &str, lookup: &dyn ColorLookup) -> Option<PackedRgba> {
    parse_color_strict(s, lookup).ok()
}

fn parse_hex(hex: &str) -> Option<PackedRgba> {
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(PackedRgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(PackedRgba::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(PackedRgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(PackedRgba::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_function(inner: &str) -> Option<PackedRgba> {
    let parts: Vec<u8> = inner
        .split(',')
        .map(|p| p.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        &[r, g, b] => Some(PackedRgba::rgb(r, g, b)),
        &[r, g, b, a] => Some(PackedRgba::rgba(r, g, b, a)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        let l = NoColors;
        assert_eq!(parse_color("#f00", &l), Some(PackedRgba::RED));
        assert_eq!(parse_color("#f008", &l), Some(PackedRgba::rgba(255, 0, 0, 136)));
        assert_eq!(parse_color("#00FF00", &l), Some(PackedRgba::GREEN));
        assert_eq!(
            parse_color("#0000ff80", &l),
            Some(PackedRgba::rgba(0, 0, 255, 128))
        );
    }

    #[test]
    fn bad_hex_is_rejected() {
        let l = NoColors;
        assert_eq!(
            parse_color_strict("#12345", &l),
            Err(ColorParseError::InvalidHex("12345".into()))
        );
        assert!(parse_color("#gggggg", &l).is_none());
        assert!(parse_color("#", &l).is_none());
        assert!(parse_color("#é", &l).is_none());
    }

    #[test]
    fn rgb_functions() {
        let l = NoColors;
        assert_eq!(parse_color("rgb(255, 0, 0)", &l), Some(PackedRgba::RED));
        assert_eq!(
            parse_color("RGBA(1,2,3,4)", &l),
            Some(PackedRgba::rgba(1, 2, 3, 4))
        );
        assert!(matches!(
            parse_color_strict("rgb(300,0,0)", &l),
            Err(ColorParseError::InvalidFunction(_))
        ));
        assert!(parse_color("rgb(1,2)", &l).is_none());
    }

    #[test]
    fn names_are_case_insensitive() {
        let colors = NamedColors::new();
        assert_eq!(colors.lookup("RED"), Some(PackedRgba::RED));
        assert_eq!(colors.lookup(" Red "), Some(PackedRgba::RED));
        assert_eq!(parse_color("navy", &colors), Some(PackedRgba::rgb(0, 0, 128)));
        assert_eq!(
            parse_color_strict("notacolor", &colors),
            Err(ColorParseError::UnknownName("notacolor".into()))
        );
    }

    #[test]
    fn custom_entries_override_builtins() {
        let mut colors = NamedColors::new().with("Ember", Rgb::new(226, 88, 34));
        colors.insert("red", PackedRgba::rgb(200, 0, 0));
        assert_eq!(colors.lookup("EMBER"), Some(PackedRgba::rgb(226, 88, 34)));
        assert_eq!(colors.lookup("red"), Some(PackedRgba::rgb(200, 0, 0)));
        assert_eq!(colors.remove("ember"), Some(PackedRgba::rgb(226, 88, 34)));
        assert_eq!(colors.lookup("ember"), None);
    }

    #[test]
    fn empty_table_knows_nothing() {
        let colors = NamedColors::empty();
        assert!(colors.is_empty());
        assert_eq!(colors.lookup("red"), None);
        assert!(NamedColors::new().len() > 20);
    }

    #[test]
    fn rgb_conversions() {
        let packed: PackedRgba = Rgb::new(1, 2, 3).into();
        assert_eq!(packed, PackedRgba::rgb(1, 2, 3));
        assert_eq!(Rgb::from(PackedRgba::rgba(1, 2, 3, 0)), Rgb::new(1, 2, 3));
    }

    #[test]
    fn errors_display() {
        assert_eq!(
            ColorParseError::UnknownName("x".into()).to_string(),
            "unknown color name 'x'"
        );
    }
}

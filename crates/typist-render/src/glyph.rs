#![forbid(unsafe_code)]

//! The packed glyph: one `u64` per visible character.
//!
//! Layout, effects, and rendering all share this value. Effects rewrite a
//! single field (usually color) without touching the others, so every field
//! lives in its own bit range:
//!
//! ```text
//!  63                             32 31      25 24  21 20                 0
//! +--------------------------------+----------+------+--------------------+
//! |        color (RGBA8888)        |  style   | scale|     code point     |
//! +--------------------------------+----------+------+--------------------+
//! ```
//!
//! - **code point** (21 bits): any Unicode scalar value.
//! - **scale** (4 bits): sixteen quarter steps from `0.25` to `4.0`. The
//!   stored value is offset so that an all-zero field means `1.0`.
//! - **style** (7 bits): [`StyleFlags`].
//! - **color** (32 bits): [`PackedRgba`], `0xRRGGBBAA`.
//!
//! Every operation is a pure function on `Copy` values.

use crate::color::PackedRgba;

const CHAR_BITS: u32 = 21;
const CHAR_MASK: u64 = (1 << CHAR_BITS) - 1;

const SCALE_SHIFT: u32 = 21;
const SCALE_MASK: u64 = 0xF << SCALE_SHIFT;

const STYLE_SHIFT: u32 = 25;
const STYLE_MASK: u64 = 0x7F << STYLE_SHIFT;

const COLOR_SHIFT: u32 = 32;
const COLOR_MASK: u64 = 0xFFFF_FFFF << COLOR_SHIFT;

/// Smallest representable scale multiplier.
pub const MIN_SCALE: f32 = 0.25;
/// Largest representable scale multiplier.
pub const MAX_SCALE: f32 = 4.0;

bitflags::bitflags! {
    /// 7-bit glyph style flags.
    ///
    /// The three script positions are mutually exclusive; use
    /// [`StyleFlags::with_script`] to switch between them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        /// Heavier weight.
        const BOLD          = 0b100_0000;
        /// Slanted.
        const OBLIQUE       = 0b010_0000;
        /// Line under the glyph.
        const UNDERLINE     = 0b001_0000;
        /// Line through the glyph.
        const STRIKETHROUGH = 0b000_1000;
        /// Lowered and shrunk.
        const SUBSCRIPT     = 0b000_0100;
        /// Shrunk, vertically centered.
        const MIDSCRIPT     = 0b000_0010;
        /// Raised and shrunk.
        const SUPERSCRIPT   = 0b000_0001;

        /// All script positions.
        const SCRIPTS = Self::SUBSCRIPT.bits() | Self::MIDSCRIPT.bits() | Self::SUPERSCRIPT.bits();
    }
}

impl StyleFlags {
    /// Switch to `script` (one of the script flags), clearing the others.
    /// Passing a script that is already set clears it.
    #[must_use]
    pub fn with_script(self, script: StyleFlags) -> Self {
        let script = script & Self::SCRIPTS;
        if !script.is_empty() && self.contains(script) {
            self - Self::SCRIPTS
        } else {
            (self - Self::SCRIPTS) | script
        }
    }

    /// The active script position, if any.
    pub fn script(self) -> Option<StyleFlags> {
        let s = self & Self::SCRIPTS;
        (!s.is_empty()).then_some(s)
    }
}

/// A packed glyph value. See the module docs for the bit layout.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Glyph(pub u64);

impl Glyph {
    /// Encode all four fields at once.
    ///
    /// `scale` is quantized to the nearest quarter and clamped to
    /// [`MIN_SCALE`]..=[`MAX_SCALE`].
    #[inline]
    pub fn encode(ch: char, style: StyleFlags, scale: f32, color: PackedRgba) -> Self {
        Self(0)
            .with_char(ch)
            .with_style(style)
            .with_scale(scale)
            .with_color(color)
    }

    /// Encode with default style and scale.
    #[inline]
    pub fn from_char(ch: char, color: PackedRgba) -> Self {
        Self::encode(ch, StyleFlags::empty(), 1.0, color)
    }

    /// Raw packed value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Code point. Bit patterns that are not a Unicode scalar value decode
    /// as U+FFFD.
    #[inline]
    pub fn ch(self) -> char {
        char::from_u32((self.0 & CHAR_MASK) as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    /// Style flags.
    #[inline]
    pub const fn style(self) -> StyleFlags {
        StyleFlags::from_bits_truncate(((self.0 & STYLE_MASK) >> STYLE_SHIFT) as u8)
    }

    /// Raw 4-bit scale field.
    #[inline]
    pub const fn scale_bits(self) -> u8 {
        ((self.0 & SCALE_MASK) >> SCALE_SHIFT) as u8
    }

    /// Scale multiplier, one of the sixteen quarter steps in `0.25..=4.0`.
    #[inline]
    pub fn scale(self) -> f32 {
        let quarters = ((self.scale_bits() + 3) & 0xF) + 1;
        f32::from(quarters) * 0.25
    }

    /// Color.
    #[inline]
    pub const fn color(self) -> PackedRgba {
        PackedRgba((self.0 >> COLOR_SHIFT) as u32)
    }

    /// Replace the code point.
    #[inline]
    #[must_use]
    pub const fn with_char(self, ch: char) -> Self {
        Self((self.0 & !CHAR_MASK) | (ch as u64 & CHAR_MASK))
    }

    /// Replace the style flags.
    #[inline]
    #[must_use]
    pub const fn with_style(self, style: StyleFlags) -> Self {
        Self((self.0 & !STYLE_MASK) | ((style.bits() as u64 & 0x7F) << STYLE_SHIFT))
    }

    /// Replace the raw 4-bit scale field (upper bits ignored).
    #[inline]
    #[must_use]
    pub const fn with_scale_bits(self, bits: u8) -> Self {
        Self((self.0 & !SCALE_MASK) | (((bits & 0xF) as u64) << SCALE_SHIFT))
    }

    /// Replace the scale. Non-finite input is treated as `1.0`.
    #[inline]
    #[must_use]
    pub fn with_scale(self, scale: f32) -> Self {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        let quarters = (scale.clamp(MIN_SCALE, MAX_SCALE) * 4.0).round() as u8;
        // quarters in 1..=16; stored so that 4 quarters (1.0) encodes as 0.
        self.with_scale_bits(quarters.wrapping_sub(4) & 0xF)
    }

    /// Replace the color.
    #[inline]
    #[must_use]
    pub const fn with_color(self, color: PackedRgba) -> Self {
        Self((self.0 & !COLOR_MASK) | ((color.0 as u64) << COLOR_SHIFT))
    }

    /// Toggle style flags.
    #[inline]
    #[must_use]
    pub fn toggle_style(self, flags: StyleFlags) -> Self {
        self.with_style(self.style() ^ flags)
    }

    /// Whether this glyph is a line break.
    #[inline]
    pub fn is_newline(self) -> bool {
        self.ch() == '\n'
    }

    /// Whether this glyph is whitespace (a wrap opportunity).
    #[inline]
    pub fn is_whitespace(self) -> bool {
        self.ch().is_whitespace()
    }
}

impl std::fmt::Debug for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Glyph")
            .field("ch", &self.ch())
            .field("style", &self.style())
            .field("scale", &self.scale())
            .field("color", &format_args!("#{:08X}", self.color().0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_glyph_has_unit_scale() {
        assert_eq!(Glyph(0).scale(), 1.0);
        assert_eq!(Glyph(0).ch(), '\0');
        assert_eq!(Glyph(0).style(), StyleFlags::empty());
    }

    #[test]
    fn encode_decodes_every_field() {
        let color = PackedRgba::rgba(0x12, 0x34, 0x56, 0x78);
        let g = Glyph::encode('λ', StyleFlags::BOLD | StyleFlags::UNDERLINE, 2.5, color);
        assert_eq!(g.ch(), 'λ');
        assert_eq!(g.style(), StyleFlags::BOLD | StyleFlags::UNDERLINE);
        assert_eq!(g.scale(), 2.5);
        assert_eq!(g.color(), color);
    }

    #[test]
    fn scale_is_quantized_and_clamped() {
        let g = Glyph::from_char('a', PackedRgba::WHITE);
        assert_eq!(g.with_scale(1.1).scale(), 1.0);
        assert_eq!(g.with_scale(1.2).scale(), 1.25);
        assert_eq!(g.with_scale(0.0).scale(), MIN_SCALE);
        assert_eq!(g.with_scale(99.0).scale(), MAX_SCALE);
        assert_eq!(g.with_scale(f32::NAN).scale(), 1.0);
    }

    #[test]
    fn all_sixteen_scale_steps_round_trip() {
        for quarters in 1..=16u8 {
            let s = f32::from(quarters) * 0.25;
            assert_eq!(Glyph(0).with_scale(s).scale(), s);
        }
    }

    #[test]
    fn astral_code_points_fit() {
        let g = Glyph::from_char('\u{10FFFF}', PackedRgba::WHITE);
        assert_eq!(g.ch(), '\u{10FFFF}');
        assert_eq!(g.color(), PackedRgba::WHITE);
    }

    #[test]
    fn invalid_code_point_decodes_as_replacement() {
        // 0xD800 is a surrogate.
        assert_eq!(Glyph(0xD800).ch(), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn color_rewrite_leaves_other_fields() {
        let g = Glyph::encode('x', StyleFlags::OBLIQUE, 0.5, PackedRgba::RED);
        let h = g.with_color(PackedRgba::BLUE);
        assert_eq!(h.ch(), 'x');
        assert_eq!(h.style(), StyleFlags::OBLIQUE);
        assert_eq!(h.scale(), 0.5);
        assert_eq!(h.color(), PackedRgba::BLUE);
    }

    #[test]
    fn scripts_are_exclusive() {
        let s = StyleFlags::BOLD.with_script(StyleFlags::SUBSCRIPT);
        assert_eq!(s, StyleFlags::BOLD | StyleFlags::SUBSCRIPT);
        let s = s.with_script(StyleFlags::SUPERSCRIPT);
        assert_eq!(s, StyleFlags::BOLD | StyleFlags::SUPERSCRIPT);
        assert_eq!(s.script(), Some(StyleFlags::SUPERSCRIPT));
        let s = s.with_script(StyleFlags::SUPERSCRIPT);
        assert_eq!(s, StyleFlags::BOLD);
        assert_eq!(s.script(), None);
    }

    #[test]
    fn toggle_style_flips_bits() {
        let g = Glyph::from_char('a', PackedRgba::WHITE).toggle_style(StyleFlags::BOLD);
        assert!(g.style().contains(StyleFlags::BOLD));
        assert!(g.toggle_style(StyleFlags::BOLD).style().is_empty());
    }

    #[test]
    fn debug_shows_fields() {
        let g = Glyph::from_char('q', PackedRgba::RED);
        let s = format!("{g:?}");
        assert!(s.contains("'q'"));
        assert!(s.contains("#FF0000FF"));
    }
}

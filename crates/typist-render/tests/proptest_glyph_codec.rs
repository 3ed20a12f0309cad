//! Property-based tests for the packed glyph codec.
//!
//! 1. Encode then decode returns every field as written (scale quantized).
//! 2. Any sequence of `with_*` writes leaves each field at its last written
//!    value and never disturbs the others.
//! 3. Any raw `u64` decodes without panicking and yields an in-range scale.

use proptest::prelude::*;
use typist_render::{Glyph, PackedRgba, StyleFlags};

fn any_char() -> impl Strategy<Value = char> {
    any::<char>()
}

fn any_style() -> impl Strategy<Value = StyleFlags> {
    (0u8..=0x7F).prop_map(StyleFlags::from_bits_truncate)
}

/// Representable scales: quarter steps 0.25..=4.0.
fn any_scale() -> impl Strategy<Value = f32> {
    (1u8..=16).prop_map(|q| f32::from(q) * 0.25)
}

fn any_color() -> impl Strategy<Value = PackedRgba> {
    any::<u32>().prop_map(PackedRgba)
}

#[derive(Debug, Clone)]
enum Write {
    Char(char),
    Style(StyleFlags),
    Scale(f32),
    Color(PackedRgba),
}

fn any_write() -> impl Strategy<Value = Write> {
    prop_oneof![
        any_char().prop_map(Write::Char),
        any_style().prop_map(Write::Style),
        any_scale().prop_map(Write::Scale),
        any_color().prop_map(Write::Color),
    ]
}

proptest! {
    #[test]
    fn encode_decode_identity(
        ch in any_char(),
        style in any_style(),
        scale in any_scale(),
        color in any_color(),
    ) {
        let g = Glyph::encode(ch, style, scale, color);
        prop_assert_eq!(g.ch(), ch);
        prop_assert_eq!(g.style(), style);
        prop_assert_eq!(g.scale(), scale);
        prop_assert_eq!(g.color(), color);
        prop_assert_eq!(Glyph::encode(g.ch(), g.style(), g.scale(), g.color()), g);
    }

    #[test]
    fn writes_are_field_independent(
        ch in any_char(),
        style in any_style(),
        scale in any_scale(),
        color in any_color(),
        writes in prop::collection::vec(any_write(), 0..24),
    ) {
        let mut g = Glyph::encode(ch, style, scale, color);
        let (mut ech, mut estyle, mut escale, mut ecolor) = (ch, style, scale, color);
        for w in writes {
            match w {
                Write::Char(c) => { g = g.with_char(c); ech = c; }
                Write::Style(s) => { g = g.with_style(s); estyle = s; }
                Write::Scale(s) => { g = g.with_scale(s); escale = s; }
                Write::Color(c) => { g = g.with_color(c); ecolor = c; }
            }
            prop_assert_eq!(g.ch(), ech);
            prop_assert_eq!(g.style(), estyle);
            prop_assert_eq!(g.scale(), escale);
            prop_assert_eq!(g.color(), ecolor);
        }
    }

    #[test]
    fn arbitrary_scale_input_stays_in_range(scale in any::<f32>()) {
        let s = Glyph(0).with_scale(scale).scale();
        prop_assert!((0.25..=4.0).contains(&s));
    }

    #[test]
    fn any_raw_value_decodes(raw in any::<u64>()) {
        let g = Glyph(raw);
        let _ = g.ch();
        prop_assert!((0.25..=4.0).contains(&g.scale()));
        prop_assert_eq!(g.color().0, (raw >> 32) as u32);
    }
}

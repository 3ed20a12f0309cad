#![forbid(unsafe_code)]

//! Built-in effects.
//!
//! | name       | alias | parameters                                          |
//! |------------|-------|-----------------------------------------------------|
//! | `blink`    | `b`   | color1; color2; frequency; threshold; duration       |
//! | `ease`     | `e`   | distance; intensity; elastic                         |
//! | `fade`     | `f`   | from; to; seconds                                    |
//! | `gradient` | `g`   | color1; color2; distance; frequency; duration        |
//! | `hang`     | `h`   | distance; intensity                                  |
//! | `jolt`     | `t`   | distance; intensity; likelihood; base; jolt; duration|
//! | `jump`     | `j`   | distance; frequency; intensity; duration             |
//! | `rainbow`  | `r`   | distance; frequency; saturation; brightness; duration|
//! | `shake`    | `s`   | distance; intensity; duration                        |
//! | `sick`     | `c`   | distance; intensity; duration                        |
//! | `slide`    | `d`   | distance; intensity; elastic                         |
//! | `wave`     | `w`   | distance; frequency; intensity; duration             |
//! | `wind`     | `i`   | distance x; distance y; spacing; intensity; duration |
//!
//! Distances are in line heights, frequencies and intensities are relative
//! to each effect's own default (so `1` is the default), and durations are
//! in seconds with missing or negative meaning indefinite.

/// Forwards the [`Effect`](crate::Effect) clock accessors to a `timing` field.
macro_rules! timing_field {
    () => {
        fn timing(&self) -> &$crate::EffectTiming {
            &self.timing
        }

        fn timing_mut(&mut self) -> &mut $crate::EffectTiming {
            &mut self.timing
        }
    };
}

mod color;
mod entrance;
mod motion;

pub use color::{Blink, Fade, Gradient, Rainbow};
pub use entrance::{Ease, Hang, Slide};
pub use motion::{Jolt, Jump, Shake, Sick, Wave, Wind};

use crate::{Effect, EffectParams};

/// Largest magnitude accepted for a distance, rate, or intensity factor.
const LIMIT: f32 = 1.0e4;

/// `value` clamped to `[-LIMIT, LIMIT]`.
pub(crate) fn bounded(value: f32) -> f32 {
    value.clamp(-LIMIT, LIMIT)
}

/// `value` clamped to `[1/LIMIT, LIMIT]` if strictly positive, else
/// `default`. Guards divisors.
pub(crate) fn positive(value: f32, default: f32) -> f32 {
    if value > 0.0 {
        value.clamp(1.0 / LIMIT, LIMIT)
    } else {
        default
    }
}

/// Effects shipped with the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinEffect {
    /// Discrete color toggle.
    Blink,
    /// Glyphs drop into place as they appear.
    Ease,
    /// Per-glyph color or alpha fade.
    Fade,
    /// Two-color gradient scrolling through the region.
    Gradient,
    /// Glyphs hover, then drop.
    Hang,
    /// Random glyphs twitch and flash.
    Jolt,
    /// Glyphs hop in sequence.
    Jump,
    /// Hue cycling.
    Rainbow,
    /// Continuous jitter.
    Shake,
    /// Drooping, desaturated wobble.
    Sick,
    /// Glyphs slide in from the left.
    Slide,
    /// Vertical sine wave.
    Wave,
    /// Gusts that push glyphs sideways.
    Wind,
}

impl BuiltinEffect {
    /// Every built-in, alphabetical.
    pub const ALL: [Self; 13] = [
        Self::Blink,
        Self::Ease,
        Self::Fade,
        Self::Gradient,
        Self::Hang,
        Self::Jolt,
        Self::Jump,
        Self::Rainbow,
        Self::Shake,
        Self::Sick,
        Self::Slide,
        Self::Wave,
        Self::Wind,
    ];

    /// Registered name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::Ease => "ease",
            Self::Fade => "fade",
            Self::Gradient => "gradient",
            Self::Hang => "hang",
            Self::Jolt => "jolt",
            Self::Jump => "jump",
            Self::Rainbow => "rainbow",
            Self::Shake => "shake",
            Self::Sick => "sick",
            Self::Slide => "slide",
            Self::Wave => "wave",
            Self::Wind => "wind",
        }
    }

    /// Registered one-character alias.
    pub const fn shorthand(self) -> char {
        match self {
            Self::Blink => 'b',
            Self::Ease => 'e',
            Self::Fade => 'f',
            Self::Gradient => 'g',
            Self::Hang => 'h',
            Self::Jolt => 't',
            Self::Jump => 'j',
            Self::Rainbow => 'r',
            Self::Shake => 's',
            Self::Sick => 'c',
            Self::Slide => 'd',
            Self::Wave => 'w',
            Self::Wind => 'i',
        }
    }

    /// Look up by name, case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
    }

    /// Instantiate with tag parameters.
    pub fn create(self, params: &EffectParams<'_>) -> Box<dyn Effect> {
        match self {
            Self::Blink => Box::new(Blink::new(params)),
            Self::Ease => Box::new(Ease::new(params)),
            Self::Fade => Box::new(Fade::new(params)),
            Self::Gradient => Box::new(Gradient::new(params)),
            Self::Hang => Box::new(Hang::new(params)),
            Self::Jolt => Box::new(Jolt::new(params)),
            Self::Jump => Box::new(Jump::new(params)),
            Self::Rainbow => Box::new(Rainbow::new(params)),
            Self::Shake => Box::new(Shake::new(params)),
            Self::Sick => Box::new(Sick::new(params)),
            Self::Slide => Box::new(Slide::new(params)),
            Self::Wave => Box::new(Wave::new(params)),
            Self::Wind => Box::new(Wind::new(params)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FrameContext, GlyphDelta};
    use rustc_hash::FxHashSet;
    use typist_render::{Glyph, PackedRgba};

    #[test]
    fn names_and_aliases_are_unique() {
        let names: FxHashSet<_> = BuiltinEffect::ALL.iter().map(|e| e.name()).collect();
        let aliases: FxHashSet<_> = BuiltinEffect::ALL.iter().map(|e| e.shorthand()).collect();
        assert_eq!(names.len(), 13);
        assert_eq!(aliases.len(), 13);
    }

    #[test]
    fn from_name_round_trips() {
        for e in BuiltinEffect::ALL {
            assert_eq!(BuiltinEffect::from_name(e.name()), Some(e));
        }
        assert_eq!(BuiltinEffect::from_name("WAVE"), Some(BuiltinEffect::Wave));
        assert_eq!(BuiltinEffect::from_name("ripple"), None);
    }

    /// Garbage parameters never make an effect panic or emit non-finite
    /// offsets.
    #[test]
    fn every_builtin_tolerates_garbage_parameters() {
        let garbage: Vec<String> = ["", "x", "-5", "0", "NaN", "#zz", "1e39"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        let params = EffectParams::new(&garbage);
        let glyph = Glyph::from_char('a', PackedRgba::WHITE);
        for kind in BuiltinEffect::ALL {
            let mut fx = kind.create(&params);
            for frame in 0..30 {
                fx.update(1.0 / 30.0);
                for i in 0..4 {
                    let ctx = FrameContext::new(1.0 / 30.0, 16.0);
                    let d: GlyphDelta = fx.apply(glyph, i, i + frame, &ctx);
                    for v in [d.dx, d.dy, d.sx, d.sy, d.rotation] {
                        assert!(v.is_finite(), "{kind:?} produced {v}");
                    }
                    assert_eq!(d.glyph.ch(), 'a', "{kind:?} changed the character");
                }
            }
        }
    }
}

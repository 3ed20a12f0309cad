#![forbid(unsafe_code)]

//! Effects that only recolor glyphs.

use typist_render::PackedRgba;

use super::positive;
use crate::{Effect, EffectParams, EffectTiming, FrameContext, GlyphClock, GlyphDelta};

// =============================================================================
// Blink
// =============================================================================

/// Switches between two colors every period.
///
/// A missing first color keeps the glyph's own color, a missing second color
/// hides the glyph.
#[derive(Debug, Clone)]
pub struct Blink {
    timing: EffectTiming,
    color1: Option<PackedRgba>,
    color2: Option<PackedRgba>,
    frequency: f32,
    threshold: f32,
}

impl Blink {
    const DEFAULT_FREQUENCY: f32 = 1.0;

    /// `{BLINK=color1;color2;frequency;threshold;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(4)),
            color1: params.color(0),
            color2: params.color(1),
            frequency: positive(params.float(2, 1.0), 1.0),
            threshold: params.float(3, 0.5).clamp(0.0, 1.0),
        }
    }
}

impl Effect for Blink {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, _global: usize, _ctx: &FrameContext) {
        let period = Self::DEFAULT_FREQUENCY / self.frequency;
        let progress = self.timing.progress(period, 0.0, false);
        let base = out.glyph.color();
        let color = if progress <= self.threshold {
            self.color1.unwrap_or(base)
        } else {
            self.color2.unwrap_or(base.with_alpha(0))
        };
        out.glyph = out.glyph.with_color(color);
    }
}

// =============================================================================
// Fade
// =============================================================================

/// One end of a fade: an explicit color, or the glyph's color at an alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FadeEnd {
    Color(PackedRgba),
    Alpha(f32),
}

impl FadeEnd {
    fn from_param(params: &EffectParams<'_>, index: usize, default_alpha: f32) -> Self {
        match params.color(index) {
            Some(color) => Self::Color(color),
            None => Self::Alpha(params.float(index, default_alpha).clamp(0.0, 1.0)),
        }
    }

    fn resolve(self, base: PackedRgba) -> PackedRgba {
        match self {
            Self::Color(color) => color,
            Self::Alpha(alpha) => base.with_alpha((alpha * 255.0).round() as u8),
        }
    }
}

/// Fades each glyph from one color (or alpha) to another, starting when the
/// glyph is first drawn. Defaults to fading in from transparent.
#[derive(Debug, Clone)]
pub struct Fade {
    timing: EffectTiming,
    clock: GlyphClock,
    from: FadeEnd,
    to: FadeEnd,
    seconds: f32,
}

impl Fade {
    /// `{FADE=from;to;seconds}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::indefinite(),
            clock: GlyphClock::new(),
            from: FadeEnd::from_param(params, 0, 0.0),
            to: FadeEnd::from_param(params, 1, 1.0),
            seconds: params.float(2, 1.0).max(0.0),
        }
    }
}

impl Effect for Fade {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let elapsed = self.clock.tick(global, ctx.delta);
        let progress = if self.seconds > 0.0 {
            (elapsed / self.seconds).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let base = out.glyph.color();
        let color = self.from.resolve(base).lerp(self.to.resolve(base), progress);
        out.glyph = out.glyph.with_color(color);
    }
}

// =============================================================================
// Gradient
// =============================================================================

/// Two-color gradient that scrolls back and forth through the region.
#[derive(Debug, Clone)]
pub struct Gradient {
    timing: EffectTiming,
    color1: PackedRgba,
    color2: PackedRgba,
    distance: f32,
    frequency: f32,
}

impl Gradient {
    const DEFAULT_DISTANCE: f32 = 0.975;
    const DEFAULT_FREQUENCY: f32 = 2.0;

    /// `{GRADIENT=color1;color2;distance;frequency;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(4)),
            color1: params.color(0).unwrap_or(PackedRgba::WHITE),
            color2: params.color(1).unwrap_or(PackedRgba::WHITE),
            distance: positive(params.float(2, 1.0), 1.0),
            frequency: positive(params.float(3, 1.0), 1.0),
        }
    }
}

impl Effect for Gradient {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, local: usize, _global: usize, _ctx: &FrameContext) {
        let distance_mod = (1.0 / self.distance) * (1.0 - Self::DEFAULT_DISTANCE);
        let frequency_mod = (1.0 / self.frequency) * Self::DEFAULT_FREQUENCY;
        let progress = self
            .timing
            .progress(frequency_mod, distance_mod * local as f32, true);
        out.glyph = out
            .glyph
            .with_color(self.color1.lerp(self.color2, progress));
    }
}

// =============================================================================
// Rainbow
// =============================================================================

/// Cycles hue over time, phase-shifted along the region.
#[derive(Debug, Clone)]
pub struct Rainbow {
    timing: EffectTiming,
    distance: f32,
    frequency: f32,
    saturation: f32,
    brightness: f32,
}

impl Rainbow {
    const DEFAULT_DISTANCE: f32 = 0.975;
    const DEFAULT_FREQUENCY: f32 = 2.0;

    /// `{RAINBOW=distance;frequency;saturation;brightness;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(4)),
            distance: positive(params.float(0, 1.0), 1.0),
            frequency: positive(params.float(1, 1.0), 1.0),
            saturation: params.float(2, 1.0).clamp(0.0, 1.0),
            brightness: params.float(3, 1.0).clamp(0.0, 1.0),
        }
    }
}

impl Effect for Rainbow {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, local: usize, _global: usize, _ctx: &FrameContext) {
        let distance_mod = (1.0 / self.distance) * (1.0 - Self::DEFAULT_DISTANCE);
        let frequency_mod = (1.0 / self.frequency) * Self::DEFAULT_FREQUENCY;
        let progress = self
            .timing
            .progress(frequency_mod, distance_mod * local as f32, false);
        let alpha = out.glyph.color().a();
        let hue = PackedRgba::from_hsv(progress * 360.0, self.saturation, self.brightness);
        out.glyph = out.glyph.with_color(hue.with_alpha(alpha));
    }
}

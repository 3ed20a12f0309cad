#![forbid(unsafe_code)]

//! Effects that animate each glyph once, from the moment it is first drawn.

use typist_core::Easing;

use super::{bounded, positive};
use crate::{Effect, EffectParams, EffectTiming, FrameContext, GlyphClock, GlyphDelta};

/// Curve slot shared by ease and slide: a boolean picks elastic or not, a
/// curve name picks that curve. Returns the curve and the time stretch.
fn entrance_curve(params: &EffectParams<'_>, index: usize) -> (Easing, f32) {
    let named = params.get(index).and_then(Easing::from_name);
    match named {
        Some(curve) if curve.can_overshoot() => (curve, 3.0),
        Some(curve) => (curve, 1.0),
        None if params.boolean(index, false) => (Easing::Back, 3.0),
        None => (Easing::Sine, 1.0),
    }
}

/// Progress of a per-glyph animation lasting `seconds`.
fn clocked(clock: &mut GlyphClock, global: usize, ctx: &FrameContext, seconds: f32) -> f32 {
    let elapsed = clock.tick(global, ctx.delta);
    if seconds > 0.0 {
        (elapsed / seconds).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

// =============================================================================
// Ease
// =============================================================================

/// Glyphs drop into place from slightly above.
#[derive(Debug, Clone)]
pub struct Ease {
    timing: EffectTiming,
    clock: GlyphClock,
    distance: f32,
    seconds: f32,
    curve: Easing,
}

impl Ease {
    const DEFAULT_DISTANCE: f32 = 0.15;
    const DEFAULT_INTENSITY: f32 = 0.075;

    /// `{EASE=distance;intensity;elastic}`. The last slot also accepts a
    /// curve name such as `bounce`.
    pub fn new(params: &EffectParams<'_>) -> Self {
        let (curve, stretch) = entrance_curve(params, 2);
        let intensity = positive(params.float(1, 1.0), 1.0);
        Self {
            timing: EffectTiming::indefinite(),
            clock: GlyphClock::new(),
            distance: bounded(params.float(0, 1.0)),
            seconds: intensity * stretch * Self::DEFAULT_INTENSITY,
            curve,
        }
    }
}

impl Effect for Ease {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let progress = clocked(&mut self.clock, global, ctx, self.seconds);
        let remaining = self.curve.interpolate(1.0, 0.0, progress);
        out.dy -= ctx.line_height * self.distance * remaining * Self::DEFAULT_DISTANCE;
    }
}

// =============================================================================
// Slide
// =============================================================================

/// Glyphs slide in from the left while fading in.
#[derive(Debug, Clone)]
pub struct Slide {
    timing: EffectTiming,
    clock: GlyphClock,
    distance: f32,
    seconds: f32,
    curve: Easing,
}

impl Slide {
    const DEFAULT_DISTANCE: f32 = 2.0;
    const DEFAULT_INTENSITY: f32 = 0.375;

    /// `{SLIDE=distance;intensity;elastic}`. The last slot also accepts a
    /// curve name.
    pub fn new(params: &EffectParams<'_>) -> Self {
        let (curve, stretch) = entrance_curve(params, 2);
        let intensity = positive(params.float(1, 1.0), 1.0);
        Self {
            timing: EffectTiming::indefinite(),
            clock: GlyphClock::new(),
            distance: bounded(params.float(0, 1.0)),
            seconds: intensity * stretch * Self::DEFAULT_INTENSITY,
            curve,
        }
    }
}

impl Effect for Slide {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let progress = clocked(&mut self.clock, global, ctx, self.seconds);
        let remaining = self.curve.interpolate(1.0, 0.0, progress);
        out.dx -= ctx.line_height * self.distance * remaining * Self::DEFAULT_DISTANCE;
        let color = out.glyph.color().with_opacity(progress);
        out.glyph = out.glyph.with_color(color);
    }
}

// =============================================================================
// Hang
// =============================================================================

/// Glyphs appear raised, float up a little, then drop into place.
#[derive(Debug, Clone)]
pub struct Hang {
    timing: EffectTiming,
    clock: GlyphClock,
    distance: f32,
    seconds: f32,
}

impl Hang {
    const DEFAULT_DISTANCE: f32 = 0.7;
    const DEFAULT_INTENSITY: f32 = 1.5;
    const SPLIT: f32 = 0.7;

    /// `{HANG=distance;intensity}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::indefinite(),
            clock: GlyphClock::new(),
            distance: bounded(params.float(0, 1.0)),
            seconds: positive(params.float(1, 1.0), 1.0) * Self::DEFAULT_INTENSITY,
        }
    }

    /// Lift in `[0, 1]` at progress `p`.
    fn lift(p: f32) -> f32 {
        if p < Self::SPLIT {
            Easing::Pow3Out.interpolate(0.8, 1.0, p / Self::SPLIT)
        } else {
            Easing::Pow2In.interpolate(1.0, 0.0, (p - Self::SPLIT) / (1.0 - Self::SPLIT))
        }
    }
}

impl Effect for Hang {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let progress = clocked(&mut self.clock, global, ctx, self.seconds);
        out.dy -= ctx.line_height * self.distance * Self::lift(progress) * Self::DEFAULT_DISTANCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typist_render::{Glyph, PackedRgba};

    fn raw(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn glyph() -> Glyph {
        Glyph::from_char('a', PackedRgba::WHITE)
    }

    #[test]
    fn ease_settles_at_rest() {
        let mut fx = Ease::new(&EffectParams::new(&[]));
        let first = fx.apply(glyph(), 0, 0, &FrameContext::new(0.0, 10.0));
        assert!((first.dy + 10.0 * 0.15).abs() < 1e-4);
        let later = fx.apply(glyph(), 0, 0, &FrameContext::new(1.0, 10.0));
        assert!(later.dy.abs() < 1e-6);
    }

    #[test]
    fn elastic_flag_and_curve_names() {
        let r = raw(&["1", "1", "yes"]);
        assert_eq!(Ease::new(&EffectParams::new(&r)).curve, Easing::Back);
        let r = raw(&["1", "1", "bounce"]);
        let fx = Ease::new(&EffectParams::new(&r));
        assert_eq!(fx.curve, Easing::Bounce);
        assert!((fx.seconds - 0.075).abs() < 1e-6);
        let r = raw(&["1", "1", "elastic"]);
        assert!((Ease::new(&EffectParams::new(&r)).seconds - 0.225).abs() < 1e-6);
    }

    #[test]
    fn slide_fades_in_from_the_left() {
        let mut fx = Slide::new(&EffectParams::new(&[]));
        let start = fx.apply(glyph(), 0, 0, &FrameContext::new(0.0, 4.0));
        assert!(start.dx < 0.0);
        assert_eq!(start.glyph.color().a(), 0);
        let done = fx.apply(glyph(), 0, 0, &FrameContext::new(1.0, 4.0));
        assert!(done.dx.abs() < 1e-6);
        assert_eq!(done.glyph.color().a(), 255);
    }

    #[test]
    fn glyphs_enter_independently() {
        let mut fx = Slide::new(&EffectParams::new(&[]));
        fx.apply(glyph(), 0, 0, &FrameContext::new(1.0, 4.0));
        let late = fx.apply(glyph(), 1, 1, &FrameContext::new(0.0, 4.0));
        assert!(late.dx < 0.0);
    }

    #[test]
    fn hang_drops_to_rest() {
        let mut fx = Hang::new(&EffectParams::new(&[]));
        let start = fx.apply(glyph(), 0, 0, &FrameContext::new(0.0, 10.0));
        assert!((start.dy + 10.0 * 0.7 * 0.8).abs() < 1e-4);
        let top = fx.apply(glyph(), 0, 0, &FrameContext::new(1.0, 10.0));
        assert!(top.dy < start.dy);
        let rest = fx.apply(glyph(), 0, 0, &FrameContext::new(1.0, 10.0));
        assert!(rest.dy.abs() < 1e-6);
    }
}

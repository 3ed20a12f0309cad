#![forbid(unsafe_code)]

//! Effects that move glyphs continuously.
//!
//! Jitter comes from [`typist_core::noise`], keyed by glyph index and a
//! time step, so two runs with the same frame times produce the same motion.

use typist_core::Easing;
use typist_core::noise::{self, value_noise};
use typist_render::PackedRgba;

use super::{bounded, positive};
use crate::{Effect, EffectParams, EffectTiming, FrameContext, GlyphDelta};

const SHAKE_SALT: u64 = 0x5348_414B;
const JOLT_SALT: u64 = 0x4A4F_4C54;
const SICK_SALT: u64 = 0x5349_434B;
const WIND_SALT: u64 = 0x5749_4E44;

// =============================================================================
// Wave
// =============================================================================

/// Vertical sine wave travelling along the region.
#[derive(Debug, Clone)]
pub struct Wave {
    timing: EffectTiming,
    distance: f32,
    frequency: f32,
    intensity: f32,
}

impl Wave {
    const DEFAULT_FREQUENCY: f32 = 15.0;
    const DEFAULT_DISTANCE: f32 = 0.33;
    const DEFAULT_INTENSITY: f32 = 0.5;

    /// `{WAVE=distance;frequency;intensity;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(3)),
            distance: bounded(params.float(0, 1.0)),
            frequency: positive(params.float(1, 1.0), 1.0),
            intensity: positive(params.float(2, 1.0), 1.0),
        }
    }
}

impl Effect for Wave {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, local: usize, _global: usize, ctx: &FrameContext) {
        let modifier = (1.0 / self.intensity) * Self::DEFAULT_INTENSITY;
        let normal_frequency = (1.0 / self.frequency) * Self::DEFAULT_FREQUENCY;
        let progress = self
            .timing
            .progress(modifier, local as f32 / normal_frequency, true);
        let y = ctx.line_height
            * self.distance
            * Easing::Sine.interpolate(-1.0, 1.0, progress)
            * Self::DEFAULT_DISTANCE;
        out.dy += y * self.timing.fadeout();
    }
}

// =============================================================================
// Shake
// =============================================================================

/// Smooth random jitter on both axes.
#[derive(Debug, Clone)]
pub struct Shake {
    timing: EffectTiming,
    distance: f32,
    intensity: f32,
}

impl Shake {
    const DEFAULT_DISTANCE: f32 = 0.12;
    const DEFAULT_INTENSITY: f32 = 0.5;
    /// Noise lattice points per second at default intensity.
    const RATE: f32 = 30.0;

    /// `{SHAKE=distance;intensity;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(2)),
            distance: bounded(params.float(0, 1.0)),
            intensity: positive(params.float(1, 1.0), 1.0),
        }
    }
}

impl Effect for Shake {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let t = self.timing.total_time() * Self::RATE * self.intensity / (2.0 * Self::DEFAULT_INTENSITY);
        let amp = ctx.line_height * self.distance * Self::DEFAULT_DISTANCE * self.timing.fadeout();
        let seed = SHAKE_SALT ^ (global as u64).wrapping_mul(2);
        out.dx += value_noise(t, seed) * amp;
        out.dy += value_noise(t, seed ^ 1) * amp;
    }
}

// =============================================================================
// Jump
// =============================================================================

/// Glyphs hop one after another and bounce back down.
#[derive(Debug, Clone)]
pub struct Jump {
    timing: EffectTiming,
    distance: f32,
    frequency: f32,
    intensity: f32,
}

impl Jump {
    const DEFAULT_FREQUENCY: f32 = 50.0;
    const DEFAULT_DISTANCE: f32 = 1.33;
    const DEFAULT_INTENSITY: f32 = 1.0;
    const SPLIT: f32 = 0.2;

    /// `{JUMP=distance;frequency;intensity;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(3)),
            distance: bounded(params.float(0, 1.0)),
            frequency: positive(params.float(1, 1.0), 1.0),
            intensity: positive(params.float(2, 1.0), 1.0),
        }
    }

    /// Height in `[0, 1]` at cycle position `p`.
    fn height(p: f32) -> f32 {
        if p < Self::SPLIT {
            Easing::Pow2Out.apply(p / Self::SPLIT)
        } else {
            Easing::Bounce.interpolate(1.0, 0.0, (p - Self::SPLIT) / (1.0 - Self::SPLIT))
        }
    }
}

impl Effect for Jump {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, local: usize, _global: usize, ctx: &FrameContext) {
        let modifier = (1.0 / self.intensity) * Self::DEFAULT_INTENSITY;
        let normal_frequency = (1.0 / self.frequency) * Self::DEFAULT_FREQUENCY;
        let progress = self
            .timing
            .progress(modifier, -(local as f32) / normal_frequency, false);
        let y = ctx.line_height * self.distance * Self::height(progress) * Self::DEFAULT_DISTANCE;
        out.dy -= y * self.timing.fadeout();
    }
}

// =============================================================================
// Jolt
// =============================================================================

/// Now and then a glyph twitches and flashes the jolt color.
#[derive(Debug, Clone)]
pub struct Jolt {
    timing: EffectTiming,
    distance: f32,
    intensity: f32,
    likelihood: f32,
    base: Option<PackedRgba>,
    jolt: PackedRgba,
}

impl Jolt {
    const DEFAULT_DISTANCE: f32 = 0.12;
    const DEFAULT_INTENSITY: f32 = 0.5;
    const DEFAULT_LIKELIHOOD: f32 = 0.05;
    const DEFAULT_JOLT: PackedRgba = PackedRgba::rgb(255, 255, 136);
    /// Decisions per second at default intensity.
    const RATE: f32 = 30.0;

    /// `{JOLT=distance;intensity;likelihood;base;jolt;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(5)),
            distance: bounded(params.float(0, 1.0)),
            intensity: positive(params.float(1, 1.0), 1.0),
            likelihood: params
                .float(2, Self::DEFAULT_LIKELIHOOD)
                .clamp(0.0, 1.0),
            base: params.color(3),
            jolt: params.color(4).unwrap_or(Self::DEFAULT_JOLT),
        }
    }
}

impl Effect for Jolt {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let rate = Self::RATE * self.intensity / (2.0 * Self::DEFAULT_INTENSITY);
        let step = (self.timing.total_time() * rate).floor() as u64;
        let salt = JOLT_SALT ^ noise::hash64(step);
        if noise::unit(global as u64, salt) < self.likelihood {
            let amp = ctx.line_height * self.distance * Self::DEFAULT_DISTANCE * self.timing.fadeout();
            out.dx += noise::signed(global as u64, salt ^ 1) * amp;
            out.dy += noise::signed(global as u64, salt ^ 2) * amp;
            out.glyph = out.glyph.with_color(self.jolt);
        } else if let Some(base) = self.base {
            out.glyph = out.glyph.with_color(base);
        }
    }
}

// =============================================================================
// Sick
// =============================================================================

/// Glyphs droop and sway out of phase while their color drains toward a
/// queasy green.
#[derive(Debug, Clone)]
pub struct Sick {
    timing: EffectTiming,
    distance: f32,
    intensity: f32,
}

impl Sick {
    const DEFAULT_DISTANCE: f32 = 0.125;
    const DEFAULT_INTENSITY: f32 = 1.0;
    const PALLOR: PackedRgba = PackedRgba::rgb(154, 205, 50);

    /// `{SICK=distance;intensity;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(2)),
            distance: bounded(params.float(0, 1.0)),
            intensity: positive(params.float(1, 1.0), 1.0),
        }
    }
}

impl Effect for Sick {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, _local: usize, global: usize, ctx: &FrameContext) {
        let modifier = (1.0 / self.intensity) * Self::DEFAULT_INTENSITY;
        let phase = noise::unit(global as u64, SICK_SALT);
        let progress = self.timing.progress(modifier, -phase, true);
        let fade = self.timing.fadeout();
        let amp = ctx.line_height * self.distance * Self::DEFAULT_DISTANCE * fade;

        out.dy += Easing::Pow2In.apply(progress) * amp;
        out.dx += value_noise(self.timing.total_time() * 4.0, SICK_SALT ^ global as u64) * amp * 0.5;

        let base = out.glyph.color();
        let queasy = base
            .desaturate(0.5 * progress * fade)
            .lerp(Self::PALLOR, 0.3 * progress * fade)
            .with_alpha(base.a());
        out.glyph = out.glyph.with_color(queasy);
    }
}

// =============================================================================
// Wind
// =============================================================================

/// Gusts of noise that push glyphs sideways and lift them slightly. Each
/// gust reaches later glyphs a little later.
#[derive(Debug, Clone)]
pub struct Wind {
    timing: EffectTiming,
    distance_x: f32,
    distance_y: f32,
    spacing: f32,
    intensity: f32,
}

impl Wind {
    const DEFAULT_SPACING: f32 = 10.0;
    const DEFAULT_DISTANCE: f32 = 0.33;
    const DEFAULT_INTENSITY: f32 = 0.375;
    /// Gusts per second at default intensity.
    const RATE: f32 = 8.0;

    /// `{WIND=distance x;distance y;spacing;intensity;duration}`
    pub fn new(params: &EffectParams<'_>) -> Self {
        Self {
            timing: EffectTiming::with_duration(params.duration(4)),
            distance_x: bounded(params.float(0, 1.0)),
            distance_y: bounded(params.float(1, 1.0)),
            spacing: positive(params.float(2, 1.0), 1.0),
            intensity: positive(params.float(3, 1.0), 1.0),
        }
    }
}

impl Effect for Wind {
    timing_field!();

    fn on_apply(&mut self, out: &mut GlyphDelta, local: usize, _global: usize, ctx: &FrameContext) {
        let cursor = self.timing.total_time() * Self::RATE * self.intensity * Self::DEFAULT_INTENSITY;
        let phase = cursor - local as f32 / (Self::DEFAULT_SPACING * self.spacing);
        let amp = ctx.line_height * Self::DEFAULT_DISTANCE * self.timing.fadeout();
        let push = (value_noise(phase, WIND_SALT) + 1.0) * 0.5;
        out.dx += push * amp * self.distance_x;
        out.dy -= value_noise(phase, WIND_SALT ^ 1) * amp * self.distance_y * 0.5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typist_render::Glyph;

    fn raw(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn glyph() -> Glyph {
        Glyph::from_char('a', PackedRgba::WHITE)
    }

    const CTX: FrameContext = FrameContext::new(1.0 / 60.0, 10.0);

    #[test]
    fn wave_is_vertical_and_phase_shifted() {
        let mut fx = Wave::new(&EffectParams::new(&[]));
        fx.update(0.1);
        let a = fx.apply(glyph(), 0, 0, &CTX);
        let b = fx.apply(glyph(), 3, 3, &CTX);
        assert_eq!(a.dx, 0.0);
        assert_ne!(a.dy, b.dy);
        // Bounded by distance * default distance * line height.
        assert!(a.dy.abs() <= 10.0 * 0.33 + 1e-4);
    }

    #[test]
    fn wave_fades_out_over_its_duration() {
        let r = raw(&["1", "1", "1", "1"]);
        let mut fx = Wave::new(&EffectParams::new(&r));
        fx.update(1.0);
        assert!(fx.is_finished() || fx.timing().fadeout() == 0.0);
        assert_eq!(fx.apply(glyph(), 0, 0, &CTX).dy, 0.0);
    }

    #[test]
    fn shake_is_deterministic() {
        let mut a = Shake::new(&EffectParams::new(&[]));
        let mut b = Shake::new(&EffectParams::new(&[]));
        for _ in 0..5 {
            a.update(1.0 / 60.0);
            b.update(1.0 / 60.0);
        }
        let da = a.apply(glyph(), 0, 7, &CTX);
        let db = b.apply(glyph(), 0, 7, &CTX);
        assert_eq!(da, db);
        assert!(da.dx.abs() <= 10.0 * 0.12 + 1e-4);
    }

    #[test]
    fn jump_rests_between_hops() {
        let mut fx = Jump::new(&EffectParams::new(&[]));
        assert_eq!(fx.apply(glyph(), 0, 0, &CTX).dy, 0.0);
        fx.update(0.2);
        let peak = fx.apply(glyph(), 0, 0, &CTX).dy;
        assert!((peak + 10.0 * 1.33).abs() < 1e-3, "peak was {peak}");
    }

    #[test]
    fn jolt_with_certainty_always_flashes() {
        let r = raw(&["1", "1", "1", "", "#00ff00"]);
        let mut fx = Jolt::new(&EffectParams::new(&r));
        for i in 0..10 {
            let out = fx.apply(glyph(), i, i, &CTX);
            assert_eq!(out.glyph.color(), PackedRgba::rgb(0, 255, 0));
        }
    }

    #[test]
    fn jolt_with_zero_likelihood_uses_base() {
        let r = raw(&["1", "1", "0", "#ff0000"]);
        let mut fx = Jolt::new(&EffectParams::new(&r));
        let out = fx.apply(glyph(), 0, 0, &CTX);
        assert_eq!(out.glyph.color(), PackedRgba::rgb(255, 0, 0));
        assert!(out.is_stationary());
    }

    #[test]
    fn sick_droops_downward_and_keeps_alpha() {
        let mut fx = Sick::new(&EffectParams::new(&[]));
        let g = glyph().with_color(PackedRgba::rgba(200, 0, 0, 90));
        for _ in 0..20 {
            fx.update(0.05);
            let out = fx.apply(g, 0, 4, &CTX);
            assert!(out.dy >= 0.0);
            assert_eq!(out.glyph.color().a(), 90);
        }
    }

    #[test]
    fn wind_pushes_right() {
        let mut fx = Wind::new(&EffectParams::new(&[]));
        for _ in 0..30 {
            fx.update(0.1);
            assert!(fx.apply(glyph(), 2, 2, &CTX).dx >= 0.0);
        }
    }
}

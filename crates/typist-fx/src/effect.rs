#![forbid(unsafe_code)]

//! The effect capability and the timing state every effect shares.
//!
//! Time flows into an effect two ways. [`Effect::update`] runs once per
//! frame and advances the effect-wide clock ([`EffectTiming`]). Effects that
//! animate each glyph from the moment it appears (entrances like ease and
//! slide) additionally keep a [`GlyphClock`] ticked from
//! [`FrameContext::delta`] inside [`Effect::on_apply`].

use rustc_hash::FxHashMap;
use typist_core::Easing;
use typist_render::Glyph;

/// Fraction of a finite duration after which effects start fading out.
pub const FADEOUT_SPLIT: f32 = 0.25;

// =============================================================================
// Per-frame data
// =============================================================================

/// What an effect may read while transforming one glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Height of the line the glyph sits on. Positional effects scale their
    /// travel by it.
    pub line_height: f32,
}

impl FrameContext {
    /// Context for one glyph.
    pub const fn new(delta: f32, line_height: f32) -> Self {
        Self { delta, line_height }
    }
}

/// Accumulated transformation of one glyph for one frame.
///
/// Offsets are in layout units with `y` growing downward. Scale factors
/// multiply the glyph's own size. Rotation is in degrees, clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphDelta {
    /// The glyph as it should be drawn, possibly recolored.
    pub glyph: Glyph,
    /// Horizontal offset.
    pub dx: f32,
    /// Vertical offset.
    pub dy: f32,
    /// Horizontal size factor.
    pub sx: f32,
    /// Vertical size factor.
    pub sy: f32,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl GlyphDelta {
    /// No transformation.
    pub const fn new(glyph: Glyph) -> Self {
        Self {
            glyph,
            dx: 0.0,
            dy: 0.0,
            sx: 1.0,
            sy: 1.0,
            rotation: 0.0,
        }
    }

    /// Whether only the glyph field could differ from [`GlyphDelta::new`].
    pub fn is_stationary(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.sx == 1.0 && self.sy == 1.0 && self.rotation == 0.0
    }
}

// =============================================================================
// Timing
// =============================================================================

/// Effect-wide clock and optional lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTiming {
    total_time: f32,
    duration: f32,
}

impl Default for EffectTiming {
    fn default() -> Self {
        Self::indefinite()
    }
}

impl EffectTiming {
    /// Runs until retired externally.
    pub const fn indefinite() -> Self {
        Self {
            total_time: 0.0,
            duration: f32::INFINITY,
        }
    }

    /// Finishes once `seconds` have elapsed. Negative or NaN means
    /// indefinite.
    pub fn with_duration(seconds: f32) -> Self {
        let duration = if seconds.is_nan() || seconds < 0.0 {
            f32::INFINITY
        } else {
            seconds
        };
        Self {
            total_time: 0.0,
            duration,
        }
    }

    /// Seconds accumulated by [`advance`](Self::advance).
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Lifetime in seconds, `None` when indefinite.
    pub fn duration(&self) -> Option<f32> {
        self.duration.is_finite().then_some(self.duration)
    }

    /// Add frame time. Negative and non-finite deltas are ignored.
    pub fn advance(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.total_time += delta;
        }
    }

    /// Whether the lifetime has elapsed.
    pub fn is_finished(&self) -> bool {
        self.duration().is_some_and(|d| self.total_time > d)
    }

    /// Cyclic progress in `[0, 1]`.
    ///
    /// `modifier` is the period in seconds, `offset` shifts the phase (in
    /// periods). With `pingpong` the value runs 0→1→0 over two periods,
    /// otherwise it is a sawtooth.
    pub fn progress(&self, modifier: f32, offset: f32, pingpong: bool) -> f32 {
        let modifier = if modifier.is_finite() && modifier != 0.0 {
            modifier
        } else {
            1.0
        };
        let raw = self.total_time / modifier + offset;
        if !raw.is_finite() {
            return 0.0;
        }
        if pingpong {
            let p = raw.rem_euclid(2.0);
            if p > 1.0 { 2.0 - p } else { p }
        } else {
            raw.rem_euclid(1.0)
        }
    }

    /// Strength multiplier in `[0, 1]` that eases to zero over the last
    /// `1 - FADEOUT_SPLIT` of a finite duration. Always `1` when indefinite.
    pub fn fadeout(&self) -> f32 {
        let Some(duration) = self.duration() else {
            return 1.0;
        };
        if duration <= 0.0 {
            return 0.0;
        }
        let p = (self.total_time / duration).clamp(0.0, 1.0);
        if p < FADEOUT_SPLIT {
            1.0
        } else {
            Easing::Smooth.interpolate(1.0, 0.0, (p - FADEOUT_SPLIT) / (1.0 - FADEOUT_SPLIT))
        }
    }
}

/// Seconds each glyph has spent inside an effect since it was first drawn.
#[derive(Debug, Clone, Default)]
pub struct GlyphClock {
    elapsed: FxHashMap<usize, f32>,
}

impl GlyphClock {
    /// Empty clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance glyph `index` by `delta` and return its elapsed time.
    pub fn tick(&mut self, index: usize, delta: f32) -> f32 {
        let t = self.elapsed.entry(index).or_insert(0.0);
        if delta.is_finite() && delta > 0.0 {
            *t += delta;
        }
        *t
    }

    /// Elapsed time of glyph `index`, zero if never ticked.
    pub fn get(&self, index: usize) -> f32 {
        self.elapsed.get(&index).copied().unwrap_or(0.0)
    }

    /// Forget every glyph.
    pub fn clear(&mut self) {
        self.elapsed.clear();
    }
}

// =============================================================================
// Capability
// =============================================================================

/// A stateful per-glyph transformer.
///
/// Implementations must not panic in [`on_apply`](Self::on_apply): bad
/// parameters are clamped or defaulted when the effect is constructed.
pub trait Effect: Send {
    /// Shared clock.
    fn timing(&self) -> &EffectTiming;

    /// Shared clock, mutably.
    fn timing_mut(&mut self) -> &mut EffectTiming;

    /// Transform one glyph. `local` is the glyph's offset from the start of
    /// the effect region, `global` its index in the layout.
    fn on_apply(&mut self, out: &mut GlyphDelta, local: usize, global: usize, ctx: &FrameContext);

    /// Advance the effect-wide clock. Called once per frame.
    fn update(&mut self, delta: f32) {
        self.timing_mut().advance(delta);
    }

    /// Transform a single glyph starting from no transformation.
    fn apply(&mut self, glyph: Glyph, local: usize, global: usize, ctx: &FrameContext) -> GlyphDelta {
        let mut out = GlyphDelta::new(glyph);
        self.on_apply(&mut out, local, global, ctx);
        out
    }

    /// Whether the effect's lifetime has elapsed.
    fn is_finished(&self) -> bool {
        self.timing().is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(total: f32) -> EffectTiming {
        let mut t = EffectTiming::indefinite();
        t.advance(total);
        t
    }

    #[test]
    fn negative_duration_is_indefinite() {
        assert_eq!(EffectTiming::with_duration(-1.0).duration(), None);
        assert_eq!(EffectTiming::with_duration(f32::NAN).duration(), None);
        assert_eq!(EffectTiming::with_duration(2.0).duration(), Some(2.0));
    }

    #[test]
    fn finishes_after_duration() {
        let mut t = EffectTiming::with_duration(1.0);
        t.advance(0.6);
        assert!(!t.is_finished());
        t.advance(0.6);
        assert!(t.is_finished());
        let mut forever = EffectTiming::indefinite();
        forever.advance(1e6);
        assert!(!forever.is_finished());
    }

    #[test]
    fn advance_ignores_bad_deltas() {
        let mut t = EffectTiming::indefinite();
        t.advance(-1.0);
        t.advance(f32::NAN);
        t.advance(f32::INFINITY);
        assert_eq!(t.total_time(), 0.0);
    }

    #[test]
    fn sawtooth_progress() {
        assert!((at(0.25).progress(1.0, 0.0, false) - 0.25).abs() < 1e-6);
        assert!((at(1.25).progress(1.0, 0.0, false) - 0.25).abs() < 1e-6);
        // Negative offsets wrap into range.
        assert!((at(0.0).progress(1.0, -0.25, false) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn pingpong_progress() {
        assert!((at(0.5).progress(1.0, 0.0, true) - 0.5).abs() < 1e-6);
        assert!((at(1.5).progress(1.0, 0.0, true) - 0.5).abs() < 1e-6);
        assert!((at(1.75).progress(1.0, 0.0, true) - 0.25).abs() < 1e-6);
        assert_eq!(at(1.0).progress(0.0, 0.0, true), 1.0);
    }

    #[test]
    fn fadeout_shape() {
        assert_eq!(at(5.0).fadeout(), 1.0);
        let mut t = EffectTiming::with_duration(4.0);
        t.advance(0.5);
        assert_eq!(t.fadeout(), 1.0);
        t.advance(1.5);
        let mid = t.fadeout();
        assert!(mid > 0.0 && mid < 1.0);
        t.advance(10.0);
        assert_eq!(t.fadeout(), 0.0);
    }

    #[test]
    fn glyph_clock_is_per_index() {
        let mut clock = GlyphClock::new();
        assert_eq!(clock.tick(3, 0.5), 0.5);
        assert_eq!(clock.tick(3, 0.25), 0.75);
        assert_eq!(clock.tick(4, 0.1), 0.1);
        assert_eq!(clock.get(9), 0.0);
        clock.clear();
        assert_eq!(clock.get(3), 0.0);
    }

    #[test]
    fn stationary_delta() {
        let g = Glyph::from_char('x', typist_render::PackedRgba::WHITE);
        let mut d = GlyphDelta::new(g);
        assert!(d.is_stationary());
        d.dy = 1.0;
        assert!(!d.is_stationary());
    }
}

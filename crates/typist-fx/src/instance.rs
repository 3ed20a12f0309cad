#![forbid(unsafe_code)]

//! Live effect instances and the set the reveal runtime drives each frame.

use std::fmt;
use std::ops::Range;

use typist_render::Glyph;

use crate::{Effect, FrameContext, GlyphDelta};

/// One effect bound to the glyph range of its markup region.
pub struct EffectInstance {
    id: u32,
    name: String,
    range: Range<usize>,
    started_at: usize,
    effect: Box<dyn Effect>,
}

impl fmt::Debug for EffectInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectInstance")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("range", &self.range)
            .field("started_at", &self.started_at)
            .field("total_time", &self.effect.timing().total_time())
            .finish()
    }
}

impl EffectInstance {
    /// Bind `effect` to glyphs `range`. `started_at` is how many glyphs were
    /// visible when the region was reached.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        range: Range<usize>,
        started_at: usize,
        effect: Box<dyn Effect>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            range,
            started_at,
            effect,
        }
    }

    /// Region id from the markup.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Canonical effect name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Governed glyphs.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Visible glyph count when the instance was created.
    pub fn started_at(&self) -> usize {
        self.started_at
    }

    /// Seconds the instance has been running.
    pub fn elapsed(&self) -> f32 {
        self.effect.timing().total_time()
    }

    /// Whether glyph `index` is in range.
    pub fn covers(&self, index: usize) -> bool {
        self.range.contains(&index)
    }

    /// The effect itself.
    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    /// The effect itself, mutably.
    pub fn effect_mut(&mut self) -> &mut dyn Effect {
        self.effect.as_mut()
    }

    /// Whether the effect's lifetime has elapsed.
    pub fn is_finished(&self) -> bool {
        self.effect.is_finished()
    }

    /// Transform glyph `index` into `out`.
    pub fn apply_to(&mut self, out: &mut GlyphDelta, index: usize, ctx: &FrameContext) {
        let local = index.saturating_sub(self.range.start);
        self.effect.on_apply(out, local, index, ctx);
    }

    /// Whether `self` is nested inside `other` for the purpose of
    /// same-kind override: later start wins, then later region.
    fn is_inner_to(&self, other: &Self) -> bool {
        (self.range.start, self.id) > (other.range.start, other.id)
    }
}

/// The active effect instances of one label, in creation order.
///
/// When regions of the same effect overlap, only the innermost applies to
/// a glyph they share; the outer one still applies elsewhere.
#[derive(Debug, Default)]
pub struct ActiveEffects {
    instances: Vec<EffectInstance>,
}

impl ActiveEffects {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance.
    pub fn push(&mut self, instance: EffectInstance) {
        typist_core::trace!(
            target: typist_core::logging::targets::EFFECTS,
            name = instance.name(),
            start = instance.range.start,
            end = instance.range.end,
            "effect instance created"
        );
        self.instances.push(instance);
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether nothing is live.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Live instances in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, EffectInstance> {
        self.instances.iter()
    }

    /// Whether region `id` has a live instance.
    pub fn contains(&self, id: u32) -> bool {
        self.instances.iter().any(|i| i.id == id)
    }

    /// Drop every instance.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Advance every instance's clock.
    pub fn update(&mut self, delta: f32) {
        for instance in &mut self.instances {
            instance.effect.update(delta);
        }
    }

    /// Drop finished instances, returning how many were dropped.
    pub fn retire_finished(&mut self) -> usize {
        let before = self.instances.len();
        self.instances.retain(|instance| {
            let done = instance.is_finished();
            if done {
                typist_core::trace!(
                    target: typist_core::logging::targets::EFFECTS,
                    name = instance.name(),
                    "effect instance retired"
                );
            }
            !done
        });
        before - self.instances.len()
    }

    fn governs(&self, slot: usize, index: usize) -> bool {
        let me = &self.instances[slot];
        me.covers(index)
            && !self
                .instances
                .iter()
                .any(|other| other.name == me.name && other.covers(index) && other.is_inner_to(me))
    }

    /// Instances that apply to glyph `index`: at most one per effect name.
    pub fn governing(&self, index: usize) -> impl Iterator<Item = &EffectInstance> + '_ {
        (0..self.instances.len())
            .filter(move |&slot| self.governs(slot, index))
            .map(move |slot| &self.instances[slot])
    }

    /// Run every governing instance over glyph `index`, in creation order.
    pub fn apply(&mut self, glyph: Glyph, index: usize, ctx: &FrameContext) -> GlyphDelta {
        let mut out = GlyphDelta::new(glyph);
        for slot in 0..self.instances.len() {
            if self.governs(slot, index) {
                self.instances[slot].apply_to(&mut out, index, ctx);
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a ActiveEffects {
    type Item = &'a EffectInstance;
    type IntoIter = std::slice::Iter<'a, EffectInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

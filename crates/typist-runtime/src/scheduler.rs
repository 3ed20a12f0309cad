#![forbid(unsafe_code)]

//! Reveal scheduler.
//!
//! Decides how many glyphs of a parsed layout are visible. Time flows into
//! a budget; revealing a glyph charges its interval
//! (`1 / (chars_per_second * effective_speed)`) and a `{WAIT}` charges its
//! duration, so the budget going negative is what holds the reveal back.
//! The first glyph therefore appears on the first tick that carries time.
//!
//! The effective speed of a glyph is the current `{SPEED}` multiplier
//! (jittered per glyph under `{NATURAL}`) divided by the glyph's interval
//! multiplier, clamped to the configured range. Glyphs inside a `{SKIP}`
//! region cost nothing.
//!
//! # State machine
//!
//! ```text
//!   RUNNING ──pause──▶ PAUSED ──resume──▶ RUNNING
//!      │                  │
//!      └──skip_to_end─────┴──▶ SKIPPING ──next tick──▶ ENDED
//!   RUNNING ──last glyph and trailing tokens──▶ ENDED
//! ```
//!
//! The scheduler never calls out. Each [`tick`](RevealScheduler::tick)
//! appends [`RevealEvent`]s to a caller-owned buffer in the order things
//! happened; the label dispatches them.

use std::fmt;

use typist_core::logging::targets;
use typist_core::noise;
use typist_render::Glyph;
use typist_text::{Layout, SpeedChange, TokenKind, TokenTable};

use crate::config::TypingConfig;

const NATURAL_SALT: u64 = 0x4E41_5455;

/// Speed factor applied to glyph `index` under `{NATURAL}`, in
/// `(0.41, 2.5]`. Deterministic.
pub fn natural_jitter(index: usize) -> f32 {
    1.0 / (0.4 + 2.0 * noise::unit(index as u64, NATURAL_SALT))
}

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealState {
    /// Revealing over time.
    Running,
    /// Time is not counted.
    Paused,
    /// The next tick reveals everything.
    Skipping,
    /// Everything is visible and the end was reported.
    Ended,
}

impl fmt::Display for RevealState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Skipping => "SKIPPING",
            Self::Ended => "ENDED",
        })
    }
}

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    /// Glyph `index` became visible.
    Char {
        /// Layout index.
        index: usize,
        /// The glyph.
        glyph: Glyph,
    },
    /// An `{EVENT}` marker was reached.
    Event(String),
    /// The effect region whose start token sits at this position in the
    /// token table was reached.
    EffectStart(usize),
    /// The reveal finished.
    End,
}

/// Reveal progress of one parsed text.
#[derive(Debug, Clone)]
pub struct RevealScheduler {
    visible: usize,
    next_token: usize,
    budget: f32,
    speed: SpeedChange,
    elapsed: f32,
    paused: bool,
    skipping: bool,
    ignore_events: bool,
    ignore_effects: bool,
    waiting: bool,
    ended: bool,
}

impl Default for RevealScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RevealScheduler {
    /// Nothing visible, running at normal speed.
    pub fn new() -> Self {
        Self {
            visible: 0,
            next_token: 0,
            budget: 0.0,
            speed: SpeedChange::fixed(1.0),
            elapsed: 0.0,
            paused: false,
            skipping: false,
            ignore_events: false,
            ignore_effects: false,
            waiting: false,
            ended: false,
        }
    }

    /// Back to the initial state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of visible glyphs.
    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Seconds counted while not paused.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current state.
    pub fn state(&self) -> RevealState {
        if self.ended {
            RevealState::Ended
        } else if self.skipping {
            RevealState::Skipping
        } else if self.paused {
            RevealState::Paused
        } else {
            RevealState::Running
        }
    }

    /// Whether [`pause`](Self::pause) is in effect.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a skip is pending.
    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    /// Whether the end was reported.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Whether a `{WAIT}` is holding the next glyph.
    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Whether the last skip asked to suppress events.
    pub fn ignoring_events(&self) -> bool {
        self.ignore_events
    }

    /// Whether the last skip asked to cancel effects.
    pub fn ignoring_effects(&self) -> bool {
        self.ignore_effects
    }

    /// Speed in force.
    pub fn speed(&self) -> SpeedChange {
        self.speed
    }

    // =========================================================================
    // Control
    // =========================================================================

    /// Stop counting time.
    pub fn pause(&mut self) {
        let before = self.state();
        self.paused = true;
        self.log_transition(before);
    }

    /// Count time again. Time spent paused is not made up.
    pub fn resume(&mut self) {
        let before = self.state();
        self.paused = false;
        self.log_transition(before);
    }

    /// Reveal everything on the next tick, even while paused.
    ///
    /// With `ignore_events`, `{EVENT}` markers passed by the skip are not
    /// reported, and neither are later [`TypingLabel::trigger_event`]
    /// calls unless forced. With `ignore_effects`, effects are cancelled.
    /// Does nothing once ended.
    ///
    /// [`TypingLabel::trigger_event`]: crate::TypingLabel::trigger_event
    pub fn skip_to_end(&mut self, ignore_events: bool, ignore_effects: bool) {
        if self.ended {
            return;
        }
        let before = self.state();
        self.skipping = true;
        self.ignore_events = ignore_events;
        self.ignore_effects = ignore_effects;
        self.log_transition(before);
    }

    /// Withdraw a pending skip.
    pub fn cancel_skipping(&mut self) {
        if self.skipping {
            let before = self.state();
            self.skipping = false;
            self.ignore_events = false;
            self.ignore_effects = false;
            self.log_transition(before);
        }
    }

    /// Advance by `dt` seconds, appending what happened to `out`.
    pub fn tick(
        &mut self,
        dt: f32,
        layout: &Layout,
        tokens: &TokenTable,
        config: &TypingConfig,
        out: &mut Vec<RevealEvent>,
    ) {
        if self.ended {
            return;
        }
        let before = self.state();
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        if self.skipping {
            self.elapsed += dt;
            self.run_to_end(layout, tokens, out);
        } else if !self.paused {
            self.elapsed += dt;
            self.budget += dt;
            self.advance(layout, tokens, config, out);
        }
        self.log_transition(before);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn advance(
        &mut self,
        layout: &Layout,
        tokens: &TokenTable,
        config: &TypingConfig,
        out: &mut Vec<RevealEvent>,
    ) {
        let total = layout.glyph_count();
        let mut revealed = 0usize;
        while self.budget > 0.0 {
            self.process_tokens(tokens, out);
            if self.budget <= 0.0 {
                break;
            }
            if config.max_chars_per_tick > 0 && revealed >= config.max_chars_per_tick {
                self.budget = 0.0;
                break;
            }
            let Some(glyph) = layout.glyph(self.visible).filter(|_| self.visible < total) else {
                self.finish(out);
                return;
            };
            let cost = self.cost(self.visible, glyph, tokens, config);
            out.push(RevealEvent::Char {
                index: self.visible,
                glyph,
            });
            self.visible += 1;
            self.waiting = false;
            self.budget -= cost;
            revealed += 1;
        }
        // A trailing wait still owes time; the end waits for it.
        let wait_pending = self.waiting && self.budget <= 0.0;
        if self.visible >= total && self.next_token >= tokens.len() && !wait_pending {
            self.finish(out);
        }
    }

    fn run_to_end(&mut self, layout: &Layout, tokens: &TokenTable, out: &mut Vec<RevealEvent>) {
        let total = layout.glyph_count();
        loop {
            self.process_tokens(tokens, out);
            match layout.glyph(self.visible) {
                Some(glyph) if self.visible < total => {
                    out.push(RevealEvent::Char {
                        index: self.visible,
                        glyph,
                    });
                    self.visible += 1;
                }
                _ => break,
            }
        }
        self.finish(out);
    }

    /// Handle every token at or before the cursor. Stops early when a wait
    /// exhausts the budget, leaving later tokens for the next pass.
    fn process_tokens(&mut self, tokens: &TokenTable, out: &mut Vec<RevealEvent>) {
        while let Some(token) = tokens.get(self.next_token) {
            if token.start > self.visible {
                break;
            }
            let position = self.next_token;
            self.next_token += 1;
            match &token.kind {
                TokenKind::Speed(change) => self.speed = *change,
                TokenKind::Reset => self.speed = SpeedChange::fixed(1.0),
                TokenKind::Wait(seconds) => {
                    if self.skipping || !(seconds.is_finite() && *seconds > 0.0) {
                        continue;
                    }
                    self.budget -= seconds;
                    self.waiting = true;
                    tracing::trace!(target: targets::REVEAL, index = self.visible, seconds, "wait started");
                    if self.budget <= 0.0 {
                        return;
                    }
                }
                TokenKind::Event(name) => {
                    if !(self.skipping && self.ignore_events) {
                        out.push(RevealEvent::Event(name.clone()));
                    }
                }
                TokenKind::EffectStart { .. } => {
                    if !(self.skipping && self.ignore_effects) {
                        out.push(RevealEvent::EffectStart(position));
                    }
                }
                TokenKind::EffectEnd { .. } | TokenKind::Variable(_) | TokenKind::Skip => {}
            }
        }
    }

    fn cost(&self, index: usize, glyph: Glyph, tokens: &TokenTable, config: &TypingConfig) -> f32 {
        if tokens
            .covering(index)
            .any(|t| matches!(t.kind, TokenKind::Skip))
        {
            return 0.0;
        }
        let cps = config.chars_per_second;
        if !(cps.is_finite() && cps > 0.0) {
            return 0.0;
        }
        let mut speed = self.speed.multiplier;
        if self.speed.natural {
            speed *= natural_jitter(index);
        }
        let effective = config
            .clamp_speed(speed / config.interval_multiplier(glyph.ch()))
            .max(f32::EPSILON);
        1.0 / (cps * effective)
    }

    fn finish(&mut self, out: &mut Vec<RevealEvent>) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.skipping = false;
        self.waiting = false;
        self.budget = 0.0;
        out.push(RevealEvent::End);
    }

    fn log_transition(&self, before: RevealState) {
        let after = self.state();
        if after != before {
            tracing::debug!(
                target: targets::REVEAL,
                from = %before,
                to = %after,
                visible = self.visible,
                "reveal state changed"
            );
        }
    }
}

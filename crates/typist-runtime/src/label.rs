#![forbid(unsafe_code)]

//! Typing label: markup, reveal and effects behind one handle.
//!
//! A [`TypingLabel`] owns its source text, a snapshot of the global
//! configuration and effect registry taken when it was built, the parsed
//! layout, the reveal scheduler and the running effect instances. The host
//! calls [`update`](TypingLabel::update) once per frame and draws the
//! returned [`GlyphFrame`].
//!
//! # Example
//! ```
//! use typist_runtime::{TypingConfig, TypingLabel};
//!
//! let mut label = TypingLabel::new("{RED}Hi{RESET} {VAR}!")
//!     .with_config(TypingConfig::default())
//!     .with_variable("VAR", "there");
//! assert_eq!(label.layout().text(), "Hi there!");
//!
//! let frame = label.update(0.01);
//! assert_eq!(frame.text(), "H");
//! label.skip_to_end(false, false);
//! assert!(label.update(0.0).is_complete());
//! ```

use rustc_hash::FxHashMap;
use typist_core::logging::targets;
use typist_fx::{ActiveEffects, EffectInstance, EffectParams, EffectRegistry, FrameContext};
use typist_style::{ColorLookup, NamedColors};
use typist_text::{
    EffectMatch, EffectResolver, FontMetrics, Layout, MarkupParser, MonospaceFont, TokenKind,
    TokenTable, VariableSource,
};

use crate::config::{TypingConfig, global_config};
use crate::frame::{GlyphCell, GlyphFrame};
use crate::listener::TypingListener;
use crate::scheduler::{RevealEvent, RevealScheduler, RevealState};

// =============================================================================
// Parse-time adapters
// =============================================================================

/// Exposes an [`EffectRegistry`] to the markup parser.
#[derive(Debug, Clone, Copy)]
pub struct RegistryResolver<'a>(pub &'a EffectRegistry);

impl EffectResolver for RegistryResolver<'_> {
    fn resolve_effect(&self, tag: &str) -> Option<EffectMatch> {
        self.0.resolve(tag).map(|(entry, shorthand)| EffectMatch {
            name: entry.name().to_owned(),
            shorthand,
        })
    }
}

/// Listener first, then label variables, then the configuration's.
struct VariableChain<'a> {
    listener: Option<&'a dyn TypingListener>,
    label: &'a FxHashMap<String, String>,
    config: &'a TypingConfig,
}

impl VariableSource for VariableChain<'_> {
    fn variable(&self, name: &str) -> Option<String> {
        self.listener
            .and_then(|l| l.replace_variable(name))
            .or_else(|| self.label.get(&name.to_uppercase()).cloned())
            .or_else(|| self.config.variable(name).map(str::to_owned))
    }
}

// =============================================================================
// TypingLabel
// =============================================================================

/// An animated, progressively revealed text.
pub struct TypingLabel {
    source: String,
    config: TypingConfig,
    variables: FxHashMap<String, String>,
    default_token: String,
    font: Box<dyn FontMetrics>,
    colors: Box<dyn ColorLookup>,
    registry: EffectRegistry,
    /// Registry came from the global one, not [`TypingLabel::with_registry`].
    shared_registry: bool,
    layout: Layout,
    tokens: TokenTable,
    scheduler: RevealScheduler,
    effects: ActiveEffects,
    listener: Option<Box<dyn TypingListener>>,
    events: Vec<RevealEvent>,
    frame: GlyphFrame,
}

impl std::fmt::Debug for TypingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypingLabel")
            .field("source", &self.source)
            .field("state", &self.scheduler.state())
            .field("visible", &self.scheduler.visible())
            .field("total", &self.layout.glyph_count())
            .field("effects", &self.effects.len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl TypingLabel {
    /// Label for `text` using the current global configuration and effect
    /// registry, a one-cell monospace font and the built-in color names.
    pub fn new(text: impl Into<String>) -> Self {
        let config = global_config();
        let mut layout = Layout::new();
        layout.set_ellipsis(config.default_ellipsis.clone());
        let mut label = Self {
            source: text.into(),
            config,
            variables: FxHashMap::default(),
            default_token: String::new(),
            font: Box::new(MonospaceFont::default()),
            colors: Box::new(NamedColors::new()),
            registry: typist_fx::registry_snapshot(),
            shared_registry: true,
            layout,
            tokens: TokenTable::default(),
            scheduler: RevealScheduler::new(),
            effects: ActiveEffects::new(),
            listener: None,
            events: Vec::new(),
            frame: GlyphFrame::default(),
        };
        label.reparse();
        label
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    /// Measure with `font`.
    #[must_use]
    pub fn with_font(mut self, font: impl FontMetrics + 'static) -> Self {
        self.font = Box::new(font);
        self.reparse();
        self
    }

    /// Resolve color names with `colors`.
    #[must_use]
    pub fn with_colors(mut self, colors: impl ColorLookup + 'static) -> Self {
        self.colors = Box::new(colors);
        self.reparse();
        self
    }

    /// Replace the configuration snapshot.
    #[must_use]
    pub fn with_config(mut self, config: TypingConfig) -> Self {
        self.set_config(config);
        self
    }

    /// Use a private effect registry instead of the global snapshot.
    #[must_use]
    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = registry;
        self.shared_registry = false;
        self.reparse();
        self
    }

    /// Attach a listener.
    #[must_use]
    pub fn with_listener(mut self, listener: impl TypingListener + 'static) -> Self {
        self.set_listener(Some(Box::new(listener)));
        self
    }

    /// Wrap lines wider than `width`. Non-positive disables wrapping.
    #[must_use]
    pub fn with_target_width(mut self, width: f32) -> Self {
        self.layout.set_target_width(width);
        self.reparse();
        self
    }

    /// Stop after `max_lines` lines (at least one).
    #[must_use]
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.layout.set_max_lines(max_lines);
        self.reparse();
        self
    }

    /// Ellipsis appended when the line limit truncates.
    #[must_use]
    pub fn with_ellipsis(mut self, ellipsis: impl Into<String>) -> Self {
        self.layout.set_ellipsis(Some(ellipsis.into()));
        self.reparse();
        self
    }

    /// Markup applied before the text and after every `{RESET}`.
    #[must_use]
    pub fn with_default_token(mut self, token: impl Into<String>) -> Self {
        self.default_token = token.into();
        self.reparse();
        self
    }

    /// Set a label variable and re-parse.
    #[must_use]
    pub fn with_variable(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_variable(name, value);
        self.reparse();
        self
    }

    // -------------------------------------------------------------------------
    // Text and settings
    // -------------------------------------------------------------------------

    /// Replace the text and restart.
    ///
    /// Parses against the registry snapshot this label holds; see
    /// [`refresh_registry`](Self::refresh_registry).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.source = text.into();
        self.reparse();
    }

    /// Replace the configuration and restart.
    pub fn set_config(&mut self, config: TypingConfig) {
        if self.config.default_ellipsis != config.default_ellipsis {
            self.layout.set_ellipsis(config.default_ellipsis.clone());
        }
        self.config = config;
        self.reparse();
    }

    /// Set a label variable. Takes effect at the next parse
    /// ([`restart`](Self::restart) or [`set_text`](Self::set_text)).
    pub fn set_variable(&mut self, name: &str, value: impl Into<String>) {
        self.variables.insert(name.to_uppercase(), value.into());
    }

    /// Drop every label variable. Takes effect at the next parse.
    pub fn clear_variables(&mut self) {
        self.variables.clear();
    }

    /// Replace or remove the listener and re-parse, since the listener can
    /// supply variables.
    pub fn set_listener(&mut self, listener: Option<Box<dyn TypingListener>>) {
        self.listener = listener;
        self.reparse();
    }

    /// Start over: re-parse with current variables, nothing visible, no
    /// effects running. Effects registered globally after this label was
    /// built stay unknown until [`refresh_registry`](Self::refresh_registry).
    pub fn restart(&mut self) {
        self.reparse();
        tracing::debug!(target: targets::REVEAL, total = self.layout.glyph_count(), "label restarted");
    }

    /// Take a fresh snapshot of the global effect registry and restart.
    ///
    /// Returns `false` and changes nothing when the label was given a
    /// private registry with [`with_registry`](Self::with_registry).
    pub fn refresh_registry(&mut self) -> bool {
        if !self.shared_registry {
            return false;
        }
        self.registry = typist_fx::registry_snapshot();
        self.restart();
        true
    }

    fn reparse(&mut self) {
        let resolver = RegistryResolver(&self.registry);
        let variables = VariableChain {
            listener: self.listener.as_deref(),
            label: &self.variables,
            config: &self.config,
        };
        let parser = MarkupParser::new()
            .colors(&*self.colors)
            .effects(&resolver)
            .variables(&variables)
            .font(&*self.font)
            .clear_color(self.config.clear_color)
            .default_wait(self.config.default_wait)
            .default_token(&self.default_token);
        self.tokens = parser.parse_into(&self.source, &mut self.layout);
        self.scheduler.reset();
        self.effects.clear();
        self.events.clear();
        self.frame = GlyphFrame {
            total: self.layout.glyph_count(),
            width: self.layout.width(),
            height: self.layout.height(),
            ..GlyphFrame::default()
        };
    }

    // -------------------------------------------------------------------------
    // Reveal control
    // -------------------------------------------------------------------------

    /// Stop the reveal clock. Effects keep animating.
    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    /// Restart the reveal clock.
    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    /// Whether paused.
    pub fn is_paused(&self) -> bool {
        self.scheduler.is_paused()
    }

    /// Reveal everything on the next update. See
    /// [`RevealScheduler::skip_to_end`].
    pub fn skip_to_end(&mut self, ignore_events: bool, ignore_effects: bool) {
        self.scheduler.skip_to_end(ignore_events, ignore_effects);
    }

    /// Withdraw a pending skip.
    pub fn cancel_skipping(&mut self) {
        self.scheduler.cancel_skipping();
    }

    /// Whether a skip is pending.
    pub fn is_skipping(&self) -> bool {
        self.scheduler.is_skipping()
    }

    /// Whether the reveal finished.
    pub fn has_ended(&self) -> bool {
        self.scheduler.has_ended()
    }

    /// Reveal state.
    pub fn state(&self) -> RevealState {
        self.scheduler.state()
    }

    /// Send `name` to the listener. Unless `always`, nothing is sent after a
    /// skip that asked to ignore events. Returns whether it was sent.
    pub fn trigger_event(&mut self, name: &str, always: bool) -> bool {
        if !always && self.scheduler.ignoring_events() {
            return false;
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.event(name);
        }
        true
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Source markup.
    pub fn text(&self) -> &str {
        &self.source
    }

    /// Parsed layout, every glyph included.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Parsed tokens.
    pub fn tokens(&self) -> &TokenTable {
        &self.tokens
    }

    /// Configuration snapshot.
    pub fn config(&self) -> &TypingConfig {
        &self.config
    }

    /// Effect registry snapshot.
    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    /// Running effect instances.
    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    /// Reveal scheduler.
    pub fn scheduler(&self) -> &RevealScheduler {
        &self.scheduler
    }

    /// Number of visible glyphs.
    pub fn visible(&self) -> usize {
        self.scheduler.visible()
    }

    /// Characters of the visible glyphs.
    pub fn visible_text(&self) -> String {
        self.layout
            .glyphs()
            .take(self.scheduler.visible())
            .map(|g| g.ch())
            .collect()
    }

    /// Frame built by the last [`update`](Self::update).
    pub fn frame(&self) -> &GlyphFrame {
        &self.frame
    }

    // -------------------------------------------------------------------------
    // Per-frame update
    // -------------------------------------------------------------------------

    /// Advance reveal and effects by `dt` seconds, notify the listener and
    /// return the frame to draw.
    pub fn update(&mut self, dt: f32) -> &GlyphFrame {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

        let mut events = std::mem::take(&mut self.events);
        self.scheduler
            .tick(dt, &self.layout, &self.tokens, &self.config, &mut events);
        for event in events.drain(..) {
            self.dispatch(event);
        }
        self.events = events;

        if self.scheduler.ignoring_effects() {
            self.effects.clear();
        }
        self.effects.update(dt);
        let retired = self.effects.retire_finished();
        if retired > 0 {
            tracing::trace!(target: targets::REVEAL, retired, "effects finished");
        }

        self.build_frame(dt);
        &self.frame
    }

    fn dispatch(&mut self, event: RevealEvent) {
        match event {
            RevealEvent::Char { glyph, .. } => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.on_char(glyph);
                }
            }
            RevealEvent::Event(name) => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.event(&name);
                }
            }
            RevealEvent::EffectStart(position) => self.start_effect(position),
            RevealEvent::End => {
                tracing::debug!(target: targets::REVEAL, total = self.layout.glyph_count(), "reveal ended");
                if let Some(listener) = self.listener.as_mut() {
                    listener.end();
                }
            }
        }
    }

    fn start_effect(&mut self, position: usize) {
        let Some(token) = self.tokens.get(position) else {
            return;
        };
        let TokenKind::EffectStart { id, name, params } = &token.kind else {
            return;
        };
        let params = EffectParams::new(params).with_colors(&*self.colors);
        match self.registry.create(name, &params) {
            Some(effect) => {
                tracing::trace!(target: targets::REVEAL, effect = %name, id, start = token.start, end = token.end, "effect started");
                self.effects.push(EffectInstance::new(
                    *id,
                    name.clone(),
                    token.start..token.end,
                    token.start,
                    effect,
                ));
            }
            None => {
                tracing::debug!(target: targets::REVEAL, effect = %name, "effect no longer registered");
            }
        }
    }

    fn build_frame(&mut self, dt: f32) {
        let visible = self.scheduler.visible();
        self.frame.cells.clear();
        let mut index = 0;
        let mut y = 0.0;
        'lines: for (line_no, line) in self.layout.lines().iter().enumerate() {
            let ctx = FrameContext::new(dt, line.height());
            let mut x = 0.0;
            for &glyph in line.glyphs() {
                if index >= visible {
                    break 'lines;
                }
                let delta = self.effects.apply(glyph, index, &ctx);
                self.frame.cells.push(GlyphCell {
                    index,
                    line: line_no,
                    glyph: delta.glyph,
                    x,
                    y,
                    dx: delta.dx,
                    dy: delta.dy,
                    sx: delta.sx,
                    sy: delta.sy,
                    rotation: delta.rotation,
                });
                x += self.font.advance(glyph);
                index += 1;
            }
            y += line.height();
        }
        self.frame.visible = visible;
        self.frame.total = self.layout.glyph_count();
        self.frame.elapsed = self.scheduler.elapsed();
        self.frame.width = self.layout.width();
        self.frame.height = self.layout.height();
        self.frame.state = self.scheduler.state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::listener::{ListenerCall, RecordingListener};
    use typist_render::PackedRgba;

    fn label(text: &str) -> TypingLabel {
        TypingLabel::new(text)
            .with_config(TypingConfig::default().with_chars_per_second(10.0))
            .with_registry(EffectRegistry::with_builtins())
    }

    fn recorded(text: &str) -> (TypingLabel, Rc<RefCell<RecordingListener>>) {
        let shared = Rc::new(RefCell::new(RecordingListener::new()));
        let label = label(text).with_listener(Rc::clone(&shared));
        (label, shared)
    }

    #[test]
    fn color_reset_and_variable() {
        let lbl = label("{RED}Hi{RESET} {VAR}!").with_variable("var", "you");
        let layout = lbl.layout();
        assert_eq!(layout.text(), "Hi you!");
        assert_eq!(layout.glyph(0).map(|g| g.color()), Some(PackedRgba::rgb(255, 0, 0)));
        assert_eq!(layout.glyph(1).map(|g| g.color()), Some(PackedRgba::rgb(255, 0, 0)));
        assert_eq!(layout.glyph(3).map(|g| g.color()), Some(PackedRgba::WHITE));
    }

    #[test]
    fn listener_variables_win() {
        struct Names;
        impl TypingListener for Names {
            fn replace_variable(&self, name: &str) -> Option<String> {
                (name.eq_ignore_ascii_case("who")).then(|| "listener".to_owned())
            }
        }
        let config = TypingConfig::default()
            .with_variable("WHO", "config")
            .with_variable("WHERE", "config");
        let lbl = TypingLabel::new("{WHO} {WHERE} {WHEN}")
            .with_config(config)
            .with_variable("WHO", "label")
            .with_variable("WHEN", "label")
            .with_listener(Names);
        assert_eq!(lbl.layout().text(), "listener config label");
    }

    #[test]
    fn variable_changes_apply_on_restart() {
        let mut lbl = label("{NAME}").with_variable("NAME", "a");
        lbl.set_variable("NAME", "bb");
        assert_eq!(lbl.layout().text(), "a");
        lbl.restart();
        assert_eq!(lbl.layout().text(), "bb");
        lbl.clear_variables();
        lbl.restart();
        assert_eq!(lbl.layout().text(), "{NAME}");
    }

    #[test]
    fn callbacks_in_order() {
        let (mut lbl, rec) = recorded("a{EVENT=mid}b");
        for _ in 0..10 {
            lbl.update(0.1);
        }
        assert_eq!(
            rec.borrow().calls(),
            &[
                ListenerCall::Char('a'),
                ListenerCall::Event("mid".into()),
                ListenerCall::Char('b'),
                ListenerCall::End,
            ]
        );
    }

    #[test]
    fn skip_fires_end_once_and_shows_everything() {
        let (mut lbl, rec) = recorded("hello {EVENT=x}world");
        lbl.update(0.01);
        lbl.skip_to_end(false, false);
        let frame = lbl.update(0.01);
        assert_eq!(frame.visible, frame.total);
        assert_eq!(frame.text(), "hello world");
        assert_eq!(frame.state, RevealState::Ended);
        lbl.update(1.0);
        assert_eq!(rec.borrow().end_count(), 1);
        assert_eq!(rec.borrow().events(), vec!["x"]);
    }

    #[test]
    fn skip_ignoring_events_mutes_triggers() {
        let (mut lbl, rec) = recorded("ab{EVENT=x}c");
        lbl.skip_to_end(true, false);
        lbl.update(0.0);
        assert!(rec.borrow().events().is_empty());
        assert!(!lbl.trigger_event("manual", false));
        assert!(lbl.trigger_event("forced", true));
        assert_eq!(rec.borrow().events(), vec!["forced"]);
    }

    #[test]
    fn trigger_event_reaches_listener() {
        let (mut lbl, rec) = recorded("abc");
        assert!(lbl.trigger_event("ping", false));
        assert_eq!(rec.borrow().events(), vec!["ping"]);
    }

    #[test]
    fn restart_resets_reveal_and_effects() {
        let mut lbl = label("{WAVE}abc{ENDWAVE}");
        lbl.skip_to_end(false, false);
        lbl.update(0.1);
        assert_eq!(lbl.visible(), 3);
        assert_eq!(lbl.effects().len(), 1);
        lbl.restart();
        assert_eq!(lbl.visible(), 0);
        assert!(lbl.effects().is_empty());
        assert_eq!(lbl.state(), RevealState::Running);
        assert_eq!(lbl.frame().visible, 0);
    }

    #[test]
    fn one_effect_instance_governs_its_range() {
        let mut lbl = label("a{WAVE}bc{ENDWAVE}d");
        for _ in 0..20 {
            lbl.update(0.05);
        }
        assert!(lbl.has_ended());
        let effects = lbl.effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.governing(0).count(), 0);
        assert_eq!(effects.governing(1).count(), 1);
        assert_eq!(effects.governing(2).count(), 1);
        assert_eq!(effects.governing(3).count(), 0);
    }

    #[test]
    fn wave_moves_only_its_region() {
        let mut lbl = label("a{WAVE}bc{ENDWAVE}d");
        lbl.skip_to_end(false, false);
        let mut moved = false;
        for _ in 0..30 {
            let frame = lbl.update(0.033);
            assert_eq!(frame.cells[0].dy, 0.0);
            assert_eq!(frame.cells[3].dy, 0.0);
            moved |= frame.cells[1].dy != 0.0 || frame.cells[2].dy != 0.0;
        }
        assert!(moved);
    }

    #[test]
    fn skip_can_cancel_effects() {
        let mut lbl = label("{SHAKE}abc{ENDSHAKE}");
        lbl.update(0.05);
        assert_eq!(lbl.effects().len(), 1);
        lbl.skip_to_end(false, true);
        let frame = lbl.update(0.05);
        assert!(frame.cells.iter().all(|c| c.dx == 0.0 && c.dy == 0.0));
        assert!(lbl.effects().is_empty());
    }

    #[test]
    fn finished_effects_retire() {
        // Wave lasting 0.2 s.
        let mut lbl = label("{WAVE=1;1;1;0.2}ab{ENDWAVE}");
        lbl.skip_to_end(false, false);
        lbl.update(0.0);
        assert_eq!(lbl.effects().len(), 1);
        for _ in 0..10 {
            lbl.update(0.05);
        }
        assert!(lbl.effects().is_empty());
    }

    #[test]
    fn frame_positions_follow_lines() {
        let mut lbl = label("ab\ncd");
        lbl.skip_to_end(false, false);
        let frame = lbl.update(0.0).clone();
        let d = frame.cells.iter().find(|c| c.glyph.ch() == 'd').copied();
        let d = d.expect("d visible");
        assert_eq!(d.line, 1);
        assert_eq!(d.x, 1.0);
        assert_eq!(d.y, 1.0);
    }

    #[test]
    fn pause_stops_reveal_not_effects() {
        let mut lbl = label("{WAVE}abcdef{ENDWAVE}");
        lbl.update(0.01);
        lbl.pause();
        assert!(lbl.is_paused());
        let first: Vec<f32> = (0..5).map(|_| lbl.update(0.05).cells[0].dy).collect();
        assert_eq!(lbl.visible(), 1);
        assert!(first.windows(2).any(|w| w[0] != w[1]));
        lbl.resume();
        lbl.update(0.2);
        assert!(lbl.visible() > 1);
    }

    #[test]
    fn visible_text_tracks_reveal() {
        let mut lbl = label("hey");
        lbl.update(0.01);
        assert_eq!(lbl.visible_text(), "h");
        assert_eq!(lbl.text(), "hey");
    }
}

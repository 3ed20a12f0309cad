#![forbid(unsafe_code)]

//! Listener contract for reveal lifecycle callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use typist_render::Glyph;

/// Receives callbacks from a [`TypingLabel`](crate::TypingLabel).
///
/// All methods have empty defaults, so implementors only override what they
/// need. Callbacks run synchronously inside
/// [`TypingLabel::update`](crate::TypingLabel::update).
pub trait TypingListener {
    /// A glyph became visible.
    fn on_char(&mut self, glyph: Glyph) {
        let _ = glyph;
    }

    /// The reveal reached an `{EVENT=name}` marker, or an event was
    /// triggered by hand.
    fn event(&mut self, name: &str) {
        let _ = name;
    }

    /// Every glyph is visible. Fires once per text.
    fn end(&mut self) {}

    /// First chance to supply a variable's value at parse time. `None`
    /// falls through to the label's and then the global variables.
    fn replace_variable(&self, name: &str) -> Option<String> {
        let _ = name;
        None
    }
}

/// One recorded callback.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerCall {
    /// [`TypingListener::on_char`]
    Char(char),
    /// [`TypingListener::event`]
    Event(String),
    /// [`TypingListener::end`]
    End,
}

/// Listener that records every callback, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    calls: Vec<ListenerCall>,
}

impl RecordingListener {
    /// Empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far.
    pub fn calls(&self) -> &[ListenerCall] {
        &self.calls
    }

    /// Recorded characters as a string.
    pub fn chars(&self) -> String {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ListenerCall::Char(ch) => Some(*ch),
                _ => None,
            })
            .collect()
    }

    /// Recorded event names.
    pub fn events(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ListenerCall::Event(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// How many times `end` fired.
    pub fn end_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ListenerCall::End))
            .count()
    }
}

impl TypingListener for RecordingListener {
    fn on_char(&mut self, glyph: Glyph) {
        self.calls.push(ListenerCall::Char(glyph.ch()));
    }

    fn event(&mut self, name: &str) {
        self.calls.push(ListenerCall::Event(name.to_owned()));
    }

    fn end(&mut self) {
        self.calls.push(ListenerCall::End);
    }
}

/// Shared listener, so the caller can inspect it while a label owns a
/// handle. Callbacks must not re-enter the same listener.
impl<L: TypingListener + ?Sized> TypingListener for Rc<RefCell<L>> {
    fn on_char(&mut self, glyph: Glyph) {
        self.borrow_mut().on_char(glyph);
    }

    fn event(&mut self, name: &str) {
        self.borrow_mut().event(name);
    }

    fn end(&mut self) {
        self.borrow_mut().end();
    }

    fn replace_variable(&self, name: &str) -> Option<String> {
        self.borrow().replace_variable(name)
    }
}

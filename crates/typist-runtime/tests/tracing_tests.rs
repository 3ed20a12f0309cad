#![forbid(unsafe_code)]

//! Structured logging integration tests.
//!
//! Reveal transitions and configuration changes are reported as `tracing`
//! events under the `typist::reveal` and `typist::config` targets.
//!
//!   cargo test -p typist-runtime --test tracing_tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use typist_runtime::{TypingConfig, TypingLabel};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event with its target and fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

/// A tracing Layer that records every event.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

/// Handle to read captured events afterwards.
struct CaptureHandle {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureHandle {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.message() == message)
            .collect()
    }
}

/// Visitor that extracts event fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

/// Run `f` with an event-capturing subscriber installed.
fn with_captured_events<F: FnOnce()>(f: F) -> CaptureHandle {
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    CaptureHandle { events }
}

fn label(text: &str) -> TypingLabel {
    TypingLabel::new(text).with_config(TypingConfig::default().with_chars_per_second(10.0))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn skip_logs_each_transition() {
    let handle = with_captured_events(|| {
        let mut lbl = label("hello");
        lbl.update(0.05);
        lbl.skip_to_end(false, false);
        lbl.update(0.05);
    });

    let changes = handle.with_message("reveal state changed");
    let pairs: Vec<(String, String)> = changes
        .iter()
        .map(|e| (e.fields["from"].clone(), e.fields["to"].clone()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("RUNNING".to_string(), "SKIPPING".to_string()),
            ("SKIPPING".to_string(), "ENDED".to_string()),
        ]
    );
    assert!(changes.iter().all(|e| e.target == "typist::reveal"));
    assert_eq!(changes[1].fields["visible"], "5");
}

#[test]
fn pause_and_resume_are_logged() {
    let handle = with_captured_events(|| {
        let mut lbl = label("abc");
        lbl.pause();
        lbl.pause();
        lbl.resume();
    });
    let changes = handle.with_message("reveal state changed");
    assert_eq!(changes.len(), 2, "repeated pause is not a transition");
    assert_eq!(changes[0].fields["to"], "PAUSED");
    assert_eq!(changes[1].fields["to"], "RUNNING");
}

#[test]
fn end_is_logged_once() {
    let handle = with_captured_events(|| {
        let mut lbl = label("ab");
        for _ in 0..10 {
            lbl.update(0.1);
        }
    });
    let ended = handle.with_message("reveal ended");
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].fields["total"], "2");
}

#[test]
fn wait_start_is_traced() {
    let handle = with_captured_events(|| {
        let mut lbl = label("a{WAIT=0.5}b");
        for _ in 0..3 {
            lbl.update(0.1);
        }
    });
    let waits = handle.with_message("wait started");
    assert_eq!(waits.len(), 1);
    assert_eq!(waits[0].fields["index"], "1");
    assert_eq!(waits[0].fields["seconds"], "0.5");
}

#[test]
fn restart_is_logged() {
    let handle = with_captured_events(|| {
        let mut lbl = label("abc");
        lbl.update(0.1);
        lbl.restart();
    });
    let restarts = handle.with_message("label restarted");
    assert_eq!(restarts.len(), 1);
    assert_eq!(restarts[0].target, "typist::reveal");
}

#[test]
fn config_updates_are_logged() {
    let handle = with_captured_events(|| {
        typist_runtime::update_global_config(|_| {});
    });
    let updates = handle.with_message("global typing config updated");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].target, "typist::config");
}

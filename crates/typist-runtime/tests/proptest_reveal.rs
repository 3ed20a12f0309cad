//! Property-based tests for the reveal scheduler.
//!
//! 1. The visible count never decreases and never passes the glyph count.
//! 2. Reveal notifications name glyphs `0, 1, 2, ...` with no gaps.
//! 3. The end is reported at most once, and only with every glyph visible.
//! 4. A skip reveals everything on the next tick, reports the end exactly
//!    once and fires each event marker exactly once, in text order.
//! 5. Ticks spent paused change nothing.

use proptest::prelude::*;
use typist_runtime::{RevealEvent, RevealScheduler, TypingConfig};
use typist_text::{MarkupParser, Parsed, TokenKind};

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z ]{1,5}",
        1 => Just("\n".to_string()),
        1 => (0u8..5).prop_map(|n| format!("{{WAIT=0.{n}}}")),
        1 => (0u8..3).prop_map(|n| format!("{{EVENT=e{n}}}")),
        1 => prop::sample::select(vec!["{FAST}", "{SLOW}", "{NATURAL}", "{NORMAL}", "{RESET}"])
            .prop_map(str::to_string),
        1 => (0u8..4).prop_map(|n| format!("{{SKIP={n}}}")),
    ]
}

fn markup() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..12).prop_map(|parts| parts.concat())
}

fn frames() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(0.0f32..0.3, 1..60)
}

fn config() -> TypingConfig {
    TypingConfig::default().with_chars_per_second(15.0)
}

fn tick(sched: &mut RevealScheduler, parsed: &Parsed, dt: f32, out: &mut Vec<RevealEvent>) {
    sched.tick(dt, &parsed.layout, &parsed.tokens, &config(), out);
}

fn events_in_text(parsed: &Parsed) -> Vec<String> {
    parsed
        .tokens
        .iter()
        .filter_map(|t| match &t.kind {
            TokenKind::Event(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn reveal_is_monotone_and_gapless(text in markup(), dts in frames()) {
        let parsed = MarkupParser::new().parse(&text);
        let total = parsed.layout.glyph_count();
        let mut sched = RevealScheduler::new();
        let mut out = Vec::new();
        let mut last = 0;
        for dt in dts {
            tick(&mut sched, &parsed, dt, &mut out);
            prop_assert!(sched.visible() >= last);
            prop_assert!(sched.visible() <= total);
            last = sched.visible();
        }
        let indices: Vec<usize> = out
            .iter()
            .filter_map(|e| match e {
                RevealEvent::Char { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        prop_assert_eq!(indices, (0..sched.visible()).collect::<Vec<_>>());

        let ends = out.iter().filter(|e| **e == RevealEvent::End).count();
        prop_assert!(ends <= 1);
        if ends == 1 {
            prop_assert_eq!(sched.visible(), total);
            prop_assert_eq!(out.last(), Some(&RevealEvent::End));
        }
    }

    #[test]
    fn skip_finishes_everything(text in markup(), dts in frames(), at in 0usize..60) {
        let parsed = MarkupParser::new().parse(&text);
        let mut sched = RevealScheduler::new();
        let mut out = Vec::new();
        for dt in dts.iter().take(at) {
            tick(&mut sched, &parsed, *dt, &mut out);
        }
        sched.skip_to_end(false, false);
        tick(&mut sched, &parsed, 0.0, &mut out);
        for dt in &dts {
            tick(&mut sched, &parsed, *dt, &mut out);
        }

        prop_assert!(sched.has_ended());
        prop_assert_eq!(sched.visible(), parsed.layout.glyph_count());
        prop_assert_eq!(out.iter().filter(|e| **e == RevealEvent::End).count(), 1);
        let fired: Vec<String> = out
            .iter()
            .filter_map(|e| match e {
                RevealEvent::Event(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        prop_assert_eq!(fired, events_in_text(&parsed));
    }

    #[test]
    fn paused_ticks_change_nothing(text in markup(), dts in frames(), idle in frames()) {
        let parsed = MarkupParser::new().parse(&text);
        let mut plain = RevealScheduler::new();
        let mut paused = RevealScheduler::new();
        let mut a = Vec::new();
        let mut b = Vec::new();
        let half = dts.len() / 2;
        for dt in &dts[..half] {
            tick(&mut plain, &parsed, *dt, &mut a);
            tick(&mut paused, &parsed, *dt, &mut b);
        }
        paused.pause();
        for dt in &idle {
            tick(&mut paused, &parsed, *dt, &mut b);
        }
        paused.resume();
        for dt in &dts[half..] {
            tick(&mut plain, &parsed, *dt, &mut a);
            tick(&mut paused, &parsed, *dt, &mut b);
        }
        prop_assert_eq!(plain.visible(), paused.visible());
        prop_assert_eq!(a, b);
    }
}

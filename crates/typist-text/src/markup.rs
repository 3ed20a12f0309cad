#![forbid(unsafe_code)]

//! Markup tokenizer.
//!
//! Turns an annotated string into a [`Layout`] of packed glyphs plus a
//! [`TokenTable`] in one left-to-right pass. Parsing never fails: any tag
//! that is not understood is kept as literal text, delimiters included.
//!
//! # Syntax
//!
//! ## Font markup, `[...]`
//! Changes the style folded into subsequent glyphs. Every change can be
//! undone with `[]`.
//! - `[*]` bold, `[/]` oblique, `[_]` underline, `[~]` strikethrough
//! - `[.]` subscript, `[=]` midscript, `[^]` superscript (exclusive)
//! - `[%150]` scale to 150%, `[%]` back to 100%
//! - `[#f80]`, `[#ff8800]`, `[#ff8800cc]`, `[red]` color
//! - `[]` undo the last change, `[ ]` reset everything
//!
//! A `[...]` body that is none of the above is tried as a typing tag, so
//! `[WAIT=1]` and `{WAIT=1}` are equivalent.
//!
//! ## Typing tags, `{...}`
//! Names are case-insensitive; arguments follow `=` and are split on `,`
//! or `;`.
//! - `{WAIT}`, `{WAIT=0.5}`: pause the reveal before the next glyph
//! - `{SPEED=2}`, `{SLOWER}`, `{SLOW}`, `{NORMAL}`, `{FAST}`, `{FASTER}`,
//!   `{NATURAL}`, `{NATURAL=1.5}`: reveal speed multiplier
//! - `{EVENT=name}`: fire an event when the reveal gets here
//! - `{VAR=name}` or `{name}`: substitute a variable
//! - `{COLOR=red}`, `{COLOR=#ff0000}`, `{red}`, `{CLEARCOLOR}`, `{ENDCOLOR}`
//! - `{STYLE=bold}`, `{ENDSTYLE}`, `{SIZE=150}`
//! - `{SKIP}`, `{SKIP=5}`: reveal glyphs instantly
//! - `{RESET}`: defaults for style, color, speed and effects
//! - `{WAVE=1;2}` ... `{ENDWAVE}` or `{/WAVE}`: effect region. A shorthand
//!   alias (`{w}`) toggles: it closes an open region of its kind, otherwise
//!   opens one.
//!
//! ## Escaping
//! - `[[` is a literal `[`, `{{` a literal `{`.
//!
//! # Example
//! ```
//! use typist_text::markup::MarkupParser;
//!
//! let parsed = MarkupParser::new().parse("[*]Bold[] and {WAIT}plain");
//! assert_eq!(parsed.layout.text(), "Bold and plain");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;

use typist_render::{Glyph, PackedRgba, StyleFlags};
use typist_style::{ColorLookup, NoColors, parse_color};

use crate::font::{FontMetrics, MonospaceFont};
use crate::layout::Layout;
use crate::token::{Params, SpeedChange, Token, TokenKind, TokenTable};

/// How deep variable values may nest markup that substitutes variables.
pub const MAX_VARIABLE_DEPTH: usize = 8;

/// Wait used by a bare `{WAIT}`, in seconds.
pub const DEFAULT_WAIT: f32 = 0.25;

/// Undo history length for `[]`.
const MAX_HISTORY: usize = 64;

// =============================================================================
// Collaborator contracts
// =============================================================================

/// An effect tag resolved against the effect registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectMatch {
    /// Canonical effect name.
    pub name: String,
    /// The tag used the single-character alias rather than the full name.
    pub shorthand: bool,
}

/// Resolves effect tag names (full or shorthand) at parse time.
pub trait EffectResolver {
    /// Resolve a tag name. Matching should be case-insensitive.
    fn resolve_effect(&self, tag: &str) -> Option<EffectMatch>;
}

/// Resolver with no effects registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl EffectResolver for NoEffects {
    fn resolve_effect(&self, _tag: &str) -> Option<EffectMatch> {
        None
    }
}

/// Supplies variable values for `{NAME}` and `{VAR=NAME}`.
pub trait VariableSource {
    /// Value of a variable. Names are case-insensitive.
    fn variable(&self, name: &str) -> Option<String>;
}

/// Source with no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableSource for NoVariables {
    fn variable(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Keys are expected in upper case.
impl<S: BuildHasher> VariableSource for HashMap<String, String, S> {
    fn variable(&self, name: &str) -> Option<String> {
        self.get(&name.to_uppercase()).cloned()
    }
}

// =============================================================================
// Parser
// =============================================================================

static NO_COLORS: NoColors = NoColors;
static NO_EFFECTS: NoEffects = NoEffects;
static NO_VARIABLES: NoVariables = NoVariables;
static DEFAULT_FONT: MonospaceFont = MonospaceFont::new(1.0, 1.0);

/// Result of [`MarkupParser::parse`].
#[derive(Debug, Clone)]
pub struct Parsed {
    /// Glyphs, lines and metrics.
    pub layout: Layout,
    /// Timed directives.
    pub tokens: TokenTable,
}

/// Markup parser configured with its collaborators.
///
/// The parser is cheap to build and holds only borrowed collaborators, so a
/// label builds a fresh one per parse.
#[derive(Clone, Copy)]
pub struct MarkupParser<'a> {
    colors: &'a dyn ColorLookup,
    effects: &'a dyn EffectResolver,
    variables: &'a dyn VariableSource,
    font: &'a dyn FontMetrics,
    clear_color: PackedRgba,
    default_wait: f32,
    default_token: &'a str,
}

impl Default for MarkupParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkupParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkupParser")
            .field("clear_color", &self.clear_color)
            .field("default_wait", &self.default_wait)
            .field("default_token", &self.default_token)
            .finish_non_exhaustive()
    }
}

impl<'a> MarkupParser<'a> {
    /// Parser with no color names, effects or variables, and a 1×1
    /// monospace font.
    #[must_use]
    pub fn new() -> Self {
        Self {
            colors: &NO_COLORS,
            effects: &NO_EFFECTS,
            variables: &NO_VARIABLES,
            font: &DEFAULT_FONT,
            clear_color: PackedRgba::WHITE,
            default_wait: DEFAULT_WAIT,
            default_token: "",
        }
    }

    /// Color-name lookup.
    #[must_use]
    pub fn colors(mut self, colors: &'a dyn ColorLookup) -> Self {
        self.colors = colors;
        self
    }

    /// Effect-name resolver.
    #[must_use]
    pub fn effects(mut self, effects: &'a dyn EffectResolver) -> Self {
        self.effects = effects;
        self
    }

    /// Variable source.
    #[must_use]
    pub fn variables(mut self, variables: &'a dyn VariableSource) -> Self {
        self.variables = variables;
        self
    }

    /// Font used for wrapping and metrics.
    #[must_use]
    pub fn font(mut self, font: &'a dyn FontMetrics) -> Self {
        self.font = font;
        self
    }

    /// Color applied by `{CLEARCOLOR}`.
    #[must_use]
    pub fn clear_color(mut self, color: PackedRgba) -> Self {
        self.clear_color = color;
        self
    }

    /// Duration of a bare `{WAIT}`.
    #[must_use]
    pub fn default_wait(mut self, seconds: f32) -> Self {
        self.default_wait = seconds.max(0.0);
        self
    }

    /// Markup applied before the text and again after every `{RESET}`.
    #[must_use]
    pub fn default_token(mut self, token: &'a str) -> Self {
        self.default_token = token;
        self
    }

    /// Parse into a fresh unconstrained [`Layout`].
    pub fn parse(&self, text: &str) -> Parsed {
        let mut layout = Layout::new();
        let tokens = self.parse_into(text, &mut layout);
        Parsed { layout, tokens }
    }

    /// Parse into `layout`, replacing its lines but keeping its paragraph
    /// attributes (wrap width, line limit, ellipsis, base color).
    pub fn parse_into(&self, text: &str, layout: &mut Layout) -> TokenTable {
        layout.clear();
        let mut scan = Scan::new(self, layout);
        if !text.is_empty() {
            scan.apply_default_token(0);
        }
        scan.scan(text, 0);
        scan.finish()
    }
}

// =============================================================================
// Scan state
// =============================================================================

#[derive(Debug)]
struct OpenRegion {
    id: u32,
    name: String,
    token: usize,
}

struct Scan<'p, 'a> {
    parser: &'p MarkupParser<'a>,
    layout: &'p mut Layout,
    tokens: Vec<Token>,
    /// Default glyph state (code point unused).
    base: Glyph,
    /// Current glyph state (code point unused).
    current: Glyph,
    history: Vec<Glyph>,
    open: Vec<OpenRegion>,
    /// `{SKIP}` tokens and their explicit glyph counts.
    skips: Vec<(usize, Option<usize>)>,
    next_id: u32,
    count: usize,
    truncated: bool,
    in_default: bool,
}

impl<'p, 'a> Scan<'p, 'a> {
    fn new(parser: &'p MarkupParser<'a>, layout: &'p mut Layout) -> Self {
        let base = Glyph::from_char('\0', layout.base_color());
        Self {
            parser,
            layout,
            tokens: Vec::new(),
            base,
            current: base,
            history: Vec::new(),
            open: Vec::new(),
            skips: Vec::new(),
            next_id: 0,
            count: 0,
            truncated: false,
            in_default: false,
        }
    }

    fn scan(&mut self, text: &str, depth: usize) {
        let mut chars = text.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            if self.truncated {
                return;
            }
            if ch != '[' && ch != '{' {
                self.emit(ch);
                continue;
            }

            // Doubled delimiter is an escape.
            if chars.peek().is_some_and(|&(_, next)| next == ch) {
                chars.next();
                self.emit(ch);
                continue;
            }

            let close = if ch == '[' { ']' } else { '}' };
            let mut body_end = None;
            while let Some(&(p, c)) = chars.peek() {
                if c == close {
                    body_end = Some(p);
                    chars.next();
                    break;
                }
                if c == '\n' || c == '[' || c == '{' {
                    break;
                }
                chars.next();
            }

            match body_end {
                Some(end) => {
                    let body = &text[pos + 1..end];
                    let handled = if ch == '[' {
                        self.font_tag(body) || self.typing_tag(body, depth)
                    } else {
                        self.typing_tag(body, depth)
                    };
                    if !handled {
                        tracing::debug!(tag = body, "unrecognized tag kept as text");
                        self.emit_str(&text[pos..=end]);
                    }
                }
                None => {
                    let stop = chars.peek().map_or(text.len(), |&(p, _)| p);
                    self.emit_str(&text[pos..stop]);
                }
            }
        }
    }

    fn emit(&mut self, ch: char) {
        if self.truncated {
            return;
        }
        let glyph = self.current.with_char(ch);
        if self.layout.push_glyph(glyph, self.parser.font) {
            self.count += 1;
        } else {
            tracing::debug!(glyphs = self.count, "line limit reached, truncating");
            self.truncated = true;
        }
    }

    fn emit_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.emit(ch);
        }
    }

    fn set_state(&mut self, next: Glyph) {
        if self.history.len() >= MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push(self.current);
        self.current = next;
    }

    fn push_token(&mut self, kind: TokenKind) -> usize {
        self.tokens.push(Token::at(kind, self.count));
        self.tokens.len() - 1
    }

    // -------------------------------------------------------------------------
    // Font markup
    // -------------------------------------------------------------------------

    fn font_tag(&mut self, body: &str) -> bool {
        let cur = self.current;
        let script = |flag| cur.with_style(cur.style().with_script(flag));
        let next = match body {
            "" => {
                self.current = self.history.pop().unwrap_or(self.base);
                return true;
            }
            " " => self.base,
            "*" => cur.toggle_style(StyleFlags::BOLD),
            "/" => cur.toggle_style(StyleFlags::OBLIQUE),
            "_" => cur.toggle_style(StyleFlags::UNDERLINE),
            "~" => cur.toggle_style(StyleFlags::STRIKETHROUGH),
            "." => script(StyleFlags::SUBSCRIPT),
            "=" => script(StyleFlags::MIDSCRIPT),
            "^" => script(StyleFlags::SUPERSCRIPT),
            _ => {
                if let Some(pct) = body.strip_prefix('%') {
                    match parse_percent(pct) {
                        Some(scale) => cur.with_scale(scale),
                        None => return false,
                    }
                } else {
                    match parse_color(body, self.parser.colors) {
                        Some(color) => cur.with_color(color),
                        None => return false,
                    }
                }
            }
        };
        self.set_state(next);
        true
    }

    // -------------------------------------------------------------------------
    // Typing tags
    // -------------------------------------------------------------------------

    fn typing_tag(&mut self, body: &str, depth: usize) -> bool {
        let (name, arg) = match body.split_once('=') {
            Some((n, a)) => (n.trim(), Some(a.trim())),
            None => (body.trim(), None),
        };
        if name.is_empty() {
            return false;
        }
        let upper = name.to_ascii_uppercase();
        let cur = self.current;

        match (upper.as_str(), arg) {
            ("WAIT", None) => {
                self.push_token(TokenKind::Wait(self.parser.default_wait));
                true
            }
            ("WAIT", Some(a)) => match parse_non_negative(a) {
                Some(seconds) => {
                    self.push_token(TokenKind::Wait(seconds));
                    true
                }
                None => false,
            },
            ("SPEED", Some(a)) => self.push_speed(parse_positive(a).map(SpeedChange::fixed)),
            ("SLOWER", None) => self.push_speed(Some(SpeedChange::fixed(0.5))),
            ("SLOW", None) => self.push_speed(Some(SpeedChange::fixed(2.0 / 3.0))),
            ("NORMAL", None) => self.push_speed(Some(SpeedChange::fixed(1.0))),
            ("FAST", None) => self.push_speed(Some(SpeedChange::fixed(2.0))),
            ("FASTER", None) => self.push_speed(Some(SpeedChange::fixed(4.0))),
            ("NATURAL", None) => self.push_speed(Some(SpeedChange::natural(1.0))),
            ("NATURAL", Some(a)) => self.push_speed(parse_positive(a).map(SpeedChange::natural)),
            ("EVENT", Some(a)) if !a.is_empty() => {
                self.push_token(TokenKind::Event(a.to_owned()));
                true
            }
            ("VAR", Some(a)) if !a.is_empty() => self.substitute(a, depth),
            ("COLOR", Some(a)) => match parse_color(a, self.parser.colors) {
                Some(color) => {
                    self.set_state(cur.with_color(color));
                    true
                }
                None => false,
            },
            ("CLEARCOLOR", None) => {
                self.set_state(cur.with_color(self.parser.clear_color));
                true
            }
            ("ENDCOLOR", None) => {
                self.set_state(cur.with_color(self.base.color()));
                true
            }
            ("STYLE", Some(a)) => match style_flag(a) {
                Some(flag) if flag.intersects(StyleFlags::SCRIPTS) => {
                    self.set_state(cur.with_style(cur.style().with_script(flag)));
                    true
                }
                Some(flag) => {
                    self.set_state(cur.toggle_style(flag));
                    true
                }
                None => false,
            },
            ("ENDSTYLE", None) => {
                self.set_state(cur.with_style(StyleFlags::empty()));
                true
            }
            ("SIZE", Some(a)) => match parse_percent(a) {
                Some(scale) => {
                    self.set_state(cur.with_scale(scale));
                    true
                }
                None => false,
            },
            ("RESET", None) => {
                self.reset(depth);
                true
            }
            ("SKIP", None) => {
                let pos = self.push_token(TokenKind::Skip);
                self.skips.push((pos, None));
                true
            }
            ("SKIP", Some(a)) => match a.parse::<usize>() {
                Ok(n) => {
                    let pos = self.push_token(TokenKind::Skip);
                    self.skips.push((pos, Some(n)));
                    true
                }
                Err(_) => false,
            },
            _ => self.named_tag(name, &upper, arg, depth),
        }
    }

    /// Effects, effect closers, variables, then color names.
    fn named_tag(&mut self, name: &str, upper: &str, arg: Option<&str>, depth: usize) -> bool {
        let closing = name.strip_prefix('/').or_else(|| {
            (upper.len() > 3 && upper.starts_with("END")).then(|| &name[3..])
        });
        if let Some(target) = closing
            && arg.is_none()
            && let Some(m) = self.parser.effects.resolve_effect(target)
        {
            return self.close_effect(&m.name);
        }

        if let Some(m) = self.parser.effects.resolve_effect(name) {
            if m.shorthand && arg.is_none() && self.open.iter().any(|r| r.name == m.name) {
                return self.close_effect(&m.name);
            }
            self.open_effect(m.name, arg.map(split_params).unwrap_or_default());
            return true;
        }

        if arg.is_none() {
            if self.substitute(name, depth) {
                return true;
            }
            if let Some(color) = self.parser.colors.lookup(name) {
                self.set_state(self.current.with_color(color));
                return true;
            }
        }
        false
    }

    fn push_speed(&mut self, change: Option<SpeedChange>) -> bool {
        match change {
            Some(change) => {
                self.push_token(TokenKind::Speed(change));
                true
            }
            None => false,
        }
    }

    fn substitute(&mut self, name: &str, depth: usize) -> bool {
        if depth >= MAX_VARIABLE_DEPTH {
            tracing::debug!(name, "variable nesting too deep");
            return false;
        }
        let Some(value) = self.parser.variables.variable(name) else {
            return false;
        };
        let pos = self.push_token(TokenKind::Variable(name.to_uppercase()));
        self.scan(&value, depth + 1);
        self.tokens[pos].end = self.count;
        true
    }

    fn reset(&mut self, depth: usize) {
        self.close_all_effects();
        self.history.clear();
        self.current = self.base;
        self.push_token(TokenKind::Reset);
        self.apply_default_token(depth);
    }

    fn apply_default_token(&mut self, depth: usize) {
        let token = self.parser.default_token;
        if token.is_empty() || self.in_default {
            return;
        }
        self.in_default = true;
        self.scan(token, depth + 1);
        self.in_default = false;
    }

    // -------------------------------------------------------------------------
    // Effect regions
    // -------------------------------------------------------------------------

    fn open_effect(&mut self, name: String, params: Params) {
        let id = self.next_id;
        self.next_id += 1;
        let token = self.push_token(TokenKind::EffectStart {
            id,
            name: name.clone(),
            params,
        });
        self.open.push(OpenRegion { id, name, token });
    }

    fn close_effect(&mut self, name: &str) -> bool {
        let Some(i) = self.open.iter().rposition(|r| r.name == name) else {
            return false;
        };
        let region = self.open.remove(i);
        self.finish_region(region);
        true
    }

    fn close_all_effects(&mut self) {
        while let Some(region) = self.open.pop() {
            self.finish_region(region);
        }
    }

    fn finish_region(&mut self, region: OpenRegion) {
        self.tokens[region.token].end = self.count;
        self.push_token(TokenKind::EffectEnd {
            id: region.id,
            name: region.name,
        });
    }

    // -------------------------------------------------------------------------
    // Finalization
    // -------------------------------------------------------------------------

    fn finish(mut self) -> TokenTable {
        self.close_all_effects();

        let mut limit = self.count;
        if self.truncated && self.layout.ellipsis().is_some() {
            limit = self.layout.apply_ellipsis(self.current, self.parser.font);
        }
        self.layout.calculate_size(self.parser.font);

        let mut tokens = std::mem::take(&mut self.tokens);
        for t in &mut tokens {
            t.start = t.start.min(limit);
            t.end = t.end.min(limit);
        }

        for &(pos, n) in &self.skips {
            let start = tokens[pos].start;
            tokens[pos].end = match n {
                Some(n) => start.saturating_add(n).min(limit),
                None => tokens[pos + 1..]
                    .iter()
                    .map(|t| t.start)
                    .find(|&s| s > start)
                    .unwrap_or(limit),
            };
        }

        for i in 0..tokens.len() {
            if matches!(tokens[i].kind, TokenKind::Speed(_)) {
                let start = tokens[i].start;
                tokens[i].end = tokens[i + 1..]
                    .iter()
                    .find(|t| matches!(t.kind, TokenKind::Speed(_) | TokenKind::Reset))
                    .map_or(limit, |t| t.start.max(start));
            }
        }

        // Regions that cover no glyphs never activate.
        let empty: Vec<u32> = tokens
            .iter()
            .filter_map(|t| match t.kind {
                TokenKind::EffectStart { id, .. } if t.is_empty() => Some(id),
                _ => None,
            })
            .collect();
        if !empty.is_empty() {
            tokens.retain(|t| match t.kind {
                TokenKind::EffectStart { id, .. } | TokenKind::EffectEnd { id, .. } => {
                    !empty.contains(&id)
                }
                _ => true,
            });
        }

        TokenTable::new(tokens)
    }
}

// =============================================================================
// Argument helpers
// =============================================================================

fn split_params(arg: &str) -> Params {
    arg.split([',', ';']).map(|p| p.trim().to_owned()).collect()
}

fn parse_non_negative(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

fn parse_positive(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// `""` means 100%.
fn parse_percent(s: &str) -> Option<f32> {
    let s = s.trim().trim_end_matches('%');
    if s.is_empty() {
        return Some(1.0);
    }
    parse_positive(s).map(|p| p / 100.0)
}

fn style_flag(word: &str) -> Option<StyleFlags> {
    let flag = match word.trim().to_ascii_lowercase().as_str() {
        "*" | "b" | "bold" => StyleFlags::BOLD,
        "/" | "i" | "italic" | "oblique" => StyleFlags::OBLIQUE,
        "_" | "u" | "underline" => StyleFlags::UNDERLINE,
        "~" | "s" | "strike" | "strikethrough" => StyleFlags::STRIKETHROUGH,
        "." | "sub" | "subscript" => StyleFlags::SUBSCRIPT,
        "=" | "mid" | "midscript" => StyleFlags::MIDSCRIPT,
        "^" | "sup" | "super" | "superscript" => StyleFlags::SUPERSCRIPT,
        _ => return None,
    };
    Some(flag)
}

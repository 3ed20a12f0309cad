#![forbid(unsafe_code)]

//! Parsed markup directives.
//!
//! Color and style tags are folded straight into glyphs and never appear
//! here. Everything that acts over time (speed, waits, events, effects,
//! skips, resets) or that a listener may want to know about (variable
//! substitutions) becomes a [`Token`] bound to a half-open glyph range.

use std::fmt;

use smallvec::SmallVec;

/// Raw effect parameters, in tag order.
pub type Params = SmallVec<[String; 4]>;

/// A change of reveal speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedChange {
    /// Multiplier on the base characters-per-second rate.
    pub multiplier: f32,
    /// Human-like cadence: the multiplier is jittered per glyph.
    pub natural: bool,
}

impl SpeedChange {
    /// Plain multiplier.
    pub const fn fixed(multiplier: f32) -> Self {
        Self {
            multiplier,
            natural: false,
        }
    }

    /// Jittered multiplier.
    pub const fn natural(multiplier: f32) -> Self {
        Self {
            multiplier,
            natural: true,
        }
    }
}

/// Token payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Reveal speed from `start` until the next speed change or reset.
    Speed(SpeedChange),
    /// Hold the reveal for this many seconds before glyph `start`.
    Wait(f32),
    /// Named event fired when the reveal reaches `start`.
    Event(String),
    /// Glyphs `[start, end)` came from substituting this variable.
    Variable(String),
    /// Effect region `[start, end)`. `id` pairs it with its
    /// [`EffectEnd`](Self::EffectEnd).
    EffectStart {
        /// Region id, unique within one parse.
        id: u32,
        /// Canonical effect name.
        name: String,
        /// Raw parameters.
        params: Params,
    },
    /// Closing marker of region `id`, at its end index.
    EffectEnd {
        /// Region id.
        id: u32,
        /// Canonical effect name.
        name: String,
    },
    /// Style, color, speed and effects return to defaults at `start`.
    Reset,
    /// Glyphs `[start, end)` appear instantly.
    Skip,
}

/// Token category, for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// [`TokenKind::Speed`]
    Speed,
    /// [`TokenKind::Wait`]
    Wait,
    /// [`TokenKind::Event`]
    Event,
    /// [`TokenKind::Variable`]
    Variable,
    /// [`TokenKind::EffectStart`]
    EffectStart,
    /// [`TokenKind::EffectEnd`]
    EffectEnd,
    /// [`TokenKind::Reset`]
    Reset,
    /// [`TokenKind::Skip`]
    Skip,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Speed => "SPEED",
            Self::Wait => "WAIT",
            Self::Event => "EVENT",
            Self::Variable => "VARIABLE",
            Self::EffectStart => "EFFECT-START",
            Self::EffectEnd => "EFFECT-END",
            Self::Reset => "RESET",
            Self::Skip => "SKIP",
        })
    }
}

/// One directive bound to glyphs `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Payload.
    pub kind: TokenKind,
    /// First glyph index governed.
    pub start: usize,
    /// One past the last glyph index governed.
    pub end: usize,
}

impl Token {
    /// Zero-width token at `index`.
    pub fn at(kind: TokenKind, index: usize) -> Self {
        Self {
            kind,
            start: index,
            end: index,
        }
    }

    /// Category of the payload.
    pub fn category(&self) -> TokenCategory {
        match self.kind {
            TokenKind::Speed(_) => TokenCategory::Speed,
            TokenKind::Wait(_) => TokenCategory::Wait,
            TokenKind::Event(_) => TokenCategory::Event,
            TokenKind::Variable(_) => TokenCategory::Variable,
            TokenKind::EffectStart { .. } => TokenCategory::EffectStart,
            TokenKind::EffectEnd { .. } => TokenCategory::EffectEnd,
            TokenKind::Reset => TokenCategory::Reset,
            TokenKind::Skip => TokenCategory::Skip,
        }
    }

    /// Whether glyph `index` lies in `[start, end)`.
    pub fn covers(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// Number of glyphs governed.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the token governs no glyphs.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Tokens sorted by start index. Ties keep input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenTable {
    tokens: Vec<Token>,
}

impl TokenTable {
    /// Build a table, sorting by start index.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.sort_by_key(|t| t.start);
        Self { tokens }
    }

    /// All tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Iterate in start order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token by position in start order.
    pub fn get(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    /// Position of the first token with `start >= index`.
    pub fn lower_bound(&self, index: usize) -> usize {
        self.tokens.partition_point(|t| t.start < index)
    }

    /// Tokens that start exactly at `index`, in input order.
    pub fn starting_at(&self, index: usize) -> &[Token] {
        let lo = self.lower_bound(index);
        let hi = self.tokens.partition_point(|t| t.start <= index);
        &self.tokens[lo..hi]
    }

    /// Tokens whose range covers glyph `index`.
    pub fn covering(&self, index: usize) -> impl Iterator<Item = &Token> + '_ {
        let hi = self.tokens.partition_point(|t| t.start <= index);
        self.tokens[..hi].iter().filter(move |t| t.covers(index))
    }

    /// Tokens of one category.
    pub fn of(&self, category: TokenCategory) -> impl Iterator<Item = &Token> + '_ {
        self.tokens.iter().filter(move |t| t.category() == category)
    }
}

impl<'a> IntoIterator for &'a TokenTable {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

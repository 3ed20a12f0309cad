#![forbid(unsafe_code)]

//! Text: the [`Layout`] model, the [`FontMetrics`] collaborator contract,
//! and the markup tokenizer that turns annotated strings into a layout plus
//! a [`TokenTable`].
//!
//! # Example
//! ```
//! use typist_text::{MarkupParser, MonospaceFont};
//! use typist_style::NamedColors;
//!
//! let colors = NamedColors::new();
//! let parsed = MarkupParser::new().colors(&colors).parse("{RED}Hi{WAIT} there");
//! assert_eq!(parsed.layout.text(), "Hi there");
//! assert_eq!(parsed.tokens.len(), 1);
//! # let _ = MonospaceFont::default();
//! ```

pub mod font;
pub mod layout;
pub mod markup;
pub mod token;

pub use font::{FontMetrics, MonospaceFont};
pub use layout::{Layout, Line};
pub use markup::{
    EffectMatch, EffectResolver, MAX_VARIABLE_DEPTH, MarkupParser, NoEffects, NoVariables, Parsed,
    VariableSource,
};
pub use token::{Params, SpeedChange, Token, TokenCategory, TokenKind, TokenTable};

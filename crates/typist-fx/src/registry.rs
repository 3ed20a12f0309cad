#![forbid(unsafe_code)]

//! Effect registry.
//!
//! Maps case-insensitive effect names, and optional one-character
//! shorthands, to an [`EffectKind`]. The markup parser consults a registry
//! to decide whether `{NAME}` opens an effect region; the reveal runtime
//! consults it again to instantiate effects when their region is reached.
//!
//! A process-wide registry, pre-populated with every [`BuiltinEffect`], is
//! reachable through the free functions [`register`], [`unregister`],
//! [`reset_registry`], [`with_registry`] and [`registry_snapshot`]. It is
//! never reset implicitly.

use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use crate::{BuiltinEffect, Effect, EffectParams};

/// Constructor for a user-defined effect.
pub type EffectFactory = Arc<dyn Fn(&EffectParams<'_>) -> Box<dyn Effect> + Send + Sync>;

/// How to build an effect.
#[derive(Clone)]
pub enum EffectKind {
    /// One of the shipped effects.
    Builtin(BuiltinEffect),
    /// A user-supplied constructor.
    Custom(EffectFactory),
}

impl EffectKind {
    /// Wrap a closure as a custom kind.
    pub fn custom<F>(factory: F) -> Self
    where
        F: Fn(&EffectParams<'_>) -> Box<dyn Effect> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(factory))
    }

    /// Instantiate with tag parameters.
    pub fn create(&self, params: &EffectParams<'_>) -> Box<dyn Effect> {
        match self {
            Self::Builtin(builtin) => builtin.create(params),
            Self::Custom(factory) => factory(params),
        }
    }
}

impl fmt::Debug for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<BuiltinEffect> for EffectKind {
    fn from(builtin: BuiltinEffect) -> Self {
        Self::Builtin(builtin)
    }
}

/// Why a registration was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is blank or contains tag syntax.
    EmptyName,
    /// Another effect already uses this name.
    DuplicateName(String),
    /// Another effect already uses this shorthand.
    DuplicateShorthand(char),
    /// Shorthands must be a single alphanumeric character.
    InvalidShorthand(char),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "effect name is empty or contains tag syntax"),
            Self::DuplicateName(name) => write!(f, "effect name {name:?} is already registered"),
            Self::DuplicateShorthand(c) => {
                write!(f, "effect shorthand {c:?} is already registered")
            }
            Self::InvalidShorthand(c) => {
                write!(f, "effect shorthand {c:?} must be a single alphanumeric character")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// One registry entry.
#[derive(Debug, Clone)]
pub struct RegisteredEffect {
    name: String,
    shorthand: Option<char>,
    kind: EffectKind,
}

impl RegisteredEffect {
    /// Canonical (lowercase) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercase shorthand, if any.
    pub fn shorthand(&self) -> Option<char> {
        self.shorthand
    }

    /// Constructor.
    pub fn kind(&self) -> &EffectKind {
        &self.kind
    }
}

/// Name and shorthand table of effect kinds.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    by_name: FxHashMap<String, RegisteredEffect>,
    by_shorthand: FxHashMap<char, String>,
}

fn fold_shorthand(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

impl EffectRegistry {
    /// Registry with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every [`BuiltinEffect`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for builtin in BuiltinEffect::ALL {
            registry.insert(builtin.name().to_owned(), Some(builtin.shorthand()), builtin.into());
        }
        registry
    }

    fn insert(&mut self, name: String, shorthand: Option<char>, kind: EffectKind) {
        if let Some(c) = shorthand {
            self.by_shorthand.insert(c, name.clone());
        }
        self.by_name.insert(
            name.clone(),
            RegisteredEffect {
                name,
                shorthand,
                kind,
            },
        );
    }

    /// Add an effect under `name` and, optionally, a one-character alias.
    ///
    /// Names and shorthands are case-insensitive. Nothing is changed when an
    /// error is returned.
    pub fn register(
        &mut self,
        name: &str,
        shorthand: Option<char>,
        kind: impl Into<EffectKind>,
    ) -> Result<(), RegistryError> {
        let name = name.trim().to_lowercase();
        let tag_syntax = |c: char| matches!(c, '{' | '}' | '[' | ']' | '=' | ';' | '/') || c.is_whitespace();
        if name.is_empty() || name.chars().any(tag_syntax) {
            return Err(RegistryError::EmptyName);
        }
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        let shorthand = shorthand.map(fold_shorthand);
        if let Some(c) = shorthand {
            if !c.is_alphanumeric() {
                return Err(RegistryError::InvalidShorthand(c));
            }
            if self.by_shorthand.contains_key(&c) {
                return Err(RegistryError::DuplicateShorthand(c));
            }
        }
        typist_core::debug!(
            target: typist_core::logging::targets::EFFECTS,
            name = %name,
            ?shorthand,
            "effect registered"
        );
        self.insert(name, shorthand, kind.into());
        Ok(())
    }

    /// Remove the effect called `name` together with its shorthand, and
    /// drop `shorthand` as an alias whatever it points at. Returns whether
    /// anything was removed.
    pub fn unregister(&mut self, name: &str, shorthand: Option<char>) -> bool {
        let name = name.trim().to_lowercase();
        let mut removed = false;
        if let Some(entry) = self.by_name.remove(&name) {
            if let Some(c) = entry.shorthand {
                self.by_shorthand.remove(&c);
            }
            removed = true;
        }
        let alias = shorthand.map(fold_shorthand);
        if let Some(target) = alias.and_then(|c| self.by_shorthand.remove(&c)) {
            if let Some(entry) = self.by_name.get_mut(&target) {
                entry.shorthand = None;
            }
            removed = true;
        }
        if removed {
            typist_core::debug!(
                target: typist_core::logging::targets::EFFECTS,
                name = %name,
                "effect unregistered"
            );
        }
        removed
    }

    /// Look up a tag name. Full names win over shorthands. The flag is true
    /// when the shorthand matched.
    pub fn resolve(&self, tag: &str) -> Option<(&RegisteredEffect, bool)> {
        let tag = tag.trim();
        if let Some(entry) = self.by_name.get(&tag.to_lowercase()) {
            return Some((entry, false));
        }
        let mut chars = tag.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self
                .by_shorthand
                .get(&fold_shorthand(c))
                .and_then(|name| self.by_name.get(name))
                .map(|entry| (entry, true)),
            _ => None,
        }
    }

    /// Entry for a canonical name or shorthand.
    pub fn get(&self, tag: &str) -> Option<&RegisteredEffect> {
        self.resolve(tag).map(|(entry, _)| entry)
    }

    /// Instantiate the effect named by `tag`.
    pub fn create(&self, tag: &str, params: &EffectParams<'_>) -> Option<Box<dyn Effect>> {
        self.get(tag).map(|entry| entry.kind.create(params))
    }

    /// Whether `tag` names an effect.
    pub fn contains(&self, tag: &str) -> bool {
        self.resolve(tag).is_some()
    }

    /// Registered names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_name.keys().map(String::as_str)
    }

    /// Number of registered effects.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

static REGISTRY: LazyLock<RwLock<EffectRegistry>> =
    LazyLock::new(|| RwLock::new(EffectRegistry::with_builtins()));

/// Register an effect in the process-wide registry.
pub fn register(
    name: &str,
    shorthand: Option<char>,
    kind: impl Into<EffectKind>,
) -> Result<(), RegistryError> {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .register(name, shorthand, kind)
}

/// Remove an effect from the process-wide registry.
pub fn unregister(name: &str, shorthand: Option<char>) -> bool {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .unregister(name, shorthand)
}

/// Restore the process-wide registry to exactly the built-ins.
pub fn reset_registry() {
    *REGISTRY.write().unwrap_or_else(PoisonError::into_inner) = EffectRegistry::with_builtins();
}

/// Run `f` against the process-wide registry under a read lock.
///
/// `f` must not call [`register`], [`unregister`] or [`reset_registry`].
pub fn with_registry<R>(f: impl FnOnce(&EffectRegistry) -> R) -> R {
    let guard = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    f(&*guard)
}

/// Copy of the process-wide registry. Custom factories are shared, not
/// cloned.
pub fn registry_snapshot() -> EffectRegistry {
    with_registry(Clone::clone)
}

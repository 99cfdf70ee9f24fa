//! Parameter schema: what an action node expects to read from its tokens.

use crate::types::CommandEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Parsing strategy for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// One token, taken verbatim.
    String,
    /// Starts at a token beginning with `"` and runs to one ending with `"`.
    QuotedString,
    /// Every remaining token, space-joined. Must be last.
    GreedyString,
    Short,
    Int,
    Long,
    Bool,
    Double,
    Float,
    Enum,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::String => "string",
            ParameterKind::QuotedString => "quoted_string",
            ParameterKind::GreedyString => "greedy_string",
            ParameterKind::Short => "short",
            ParameterKind::Int => "int",
            ParameterKind::Long => "long",
            ParameterKind::Bool => "bool",
            ParameterKind::Double => "double",
            ParameterKind::Float => "float",
            ParameterKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces the current completion candidates. Called on every completion
/// request, so it may reflect live state.
pub type SuggestionSource = Arc<dyn Fn() -> Vec<String> + Send + Sync>;

/// Ordered set of valid names for an enum-kind parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDomain {
    names: Vec<String>,
}

impl EnumDomain {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !out.contains(&name) {
                out.push(name);
            }
        }
        Self { names: out }
    }

    pub fn of<E: CommandEnum>() -> Self {
        Self::new(E::VARIANTS.iter().copied())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Upper-case `raw` and return the matching domain name.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        let upper = raw.to_uppercase();
        self.names
            .iter()
            .find(|n| **n == upper)
            .map(|n| n.as_str())
    }
}

#[derive(Clone)]
pub struct Parameter {
    name: String,
    kind: ParameterKind,
    suggestions: Option<SuggestionSource>,
    domain: Option<EnumDomain>,
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("suggestions", &self.suggestions.as_ref().map(|_| "<fn>"))
            .field("domain", &self.domain)
            .finish()
    }
}

impl Parameter {
    /// A parameter without explicit suggestions. Bool parameters still
    /// complete to `true` / `false`.
    ///
    /// An `Enum` parameter built this way has no domain and fails every
    /// parse; use [`Parameter::enumeration`] instead.
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            suggestions: None,
            domain: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String)
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::QuotedString)
    }

    pub fn greedy(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::GreedyString)
    }

    pub fn short(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Short)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Int)
    }

    pub fn long(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Long)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Bool)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Float)
    }

    pub fn double(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Double)
    }

    pub fn enumeration(name: impl Into<String>, domain: EnumDomain) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Enum,
            suggestions: None,
            domain: Some(domain),
        }
    }

    /// Enum parameter backed by a Rust enum.
    pub fn enum_of<E: CommandEnum>(name: impl Into<String>) -> Self {
        Self::enumeration(name, EnumDomain::of::<E>())
    }

    /// Replace the default suggestions with a live source.
    pub fn with_suggestions<F>(mut self, source: F) -> Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        self.suggestions = Some(Arc::new(source));
        self
    }

    /// Replace the default suggestions with a fixed list.
    pub fn with_static_suggestions<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        self.with_suggestions(move || items.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn domain(&self) -> Option<&EnumDomain> {
        self.domain.as_ref()
    }

    /// Current completion candidates, recomputed on each call.
    ///
    /// Enum parameters always offer their domain; a custom source is ignored.
    pub fn suggestions(&self) -> Vec<String> {
        if self.kind == ParameterKind::Enum {
            return self
                .domain
                .as_ref()
                .map(|d| d.names().to_vec())
                .unwrap_or_default();
        }
        if let Some(source) = &self.suggestions {
            return source();
        }
        match self.kind {
            ParameterKind::Bool => vec!["true".to_string(), "false".to_string()],
            _ => Vec::new(),
        }
    }
}

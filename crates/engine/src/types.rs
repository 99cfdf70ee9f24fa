use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Caller identity
// ---------------------------------------------------------------------------

/// The principal an invocation runs on behalf of. Permission checks and
/// message delivery are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    name: String,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The local operator, used by hosts that have no logged-in user.
    pub fn console() -> Self {
        Self::new("CONSOLE")
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Typed argument values
// ---------------------------------------------------------------------------

/// A single converted argument. One variant per parameter kind; the three
/// string kinds all produce [`Value::String`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    String(String),
    Short(i16),
    Int(i32),
    Long(i64),
    Bool(bool),
    Float(f32),
    Double(f64),
    /// Canonical (domain-spelled) name of the matched enum case.
    Enum(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
        }
    }
}

/// Implemented by Rust enums that back an enum-kind parameter.
///
/// `VARIANTS` must be upper-case: raw input is upper-cased before lookup.
pub trait CommandEnum: Sized {
    const VARIANTS: &'static [&'static str];

    fn from_variant(name: &str) -> Option<Self>;
}

/// Ordered list of typed values handed to a callback, in parameter order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        match self.values.get(index)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn short(&self, index: usize) -> Option<i16> {
        match self.values.get(index)? {
            Value::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, index: usize) -> Option<i32> {
        match self.values.get(index)? {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn long(&self, index: usize) -> Option<i64> {
        match self.values.get(index)? {
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        match self.values.get(index)? {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, index: usize) -> Option<f32> {
        match self.values.get(index)? {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn double(&self, index: usize) -> Option<f64> {
        match self.values.get(index)? {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Resolve an enum-kind argument back into the caller's Rust enum.
    pub fn enumeration<E: CommandEnum>(&self, index: usize) -> Option<E> {
        match self.values.get(index)? {
            Value::Enum(name) => E::from_variant(name),
            _ => None,
        }
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

// ---------------------------------------------------------------------------
// Dispatch result – the stable output contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub run_id: String,
    /// Registered label the invocation was addressed to.
    pub command: String,
    /// Tokens joined with single spaces.
    pub input: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    pub timing_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// A callback ran.
    Pass,
    /// Built-in help was served instead of dispatching.
    Help,
    /// Root permission check failed.
    Denied,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Pass => "pass",
            Status::Help => "help",
            Status::Denied => "denied",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingParameter,
    MalformedQuotedString,
    InvalidNumber,
    InvalidBoolean,
    InvalidEnum,
    MissingSubcommand,
    UnknownSubcommand,
    UnknownCommand,
    CallbackNotSet,
    Misconfigured,
    PermissionDenied,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_else(|| format!("{:?}", self));
        f.write_str(&s)
    }
}

// ---------------------------------------------------------------------------
// Scenario types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Label every step is addressed to.
    pub command: String,
    /// Identity used by steps that do not name one.
    #[serde(default = "default_identity")]
    pub identity: String,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioStep {
    Run {
        run: String,
        #[serde(default, rename = "as")]
        identity: Option<String>,
        #[serde(default = "default_expect_status")]
        expect_status: Status,
    },
    Complete {
        complete: String,
        #[serde(default, rename = "as")]
        identity: Option<String>,
        #[serde(default)]
        expect: Option<Vec<String>>,
    },
}

fn default_identity() -> String {
    Identity::console().name().to_string()
}

fn default_expect_status() -> Status {
    Status::Pass
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step: usize,
    pub line: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: Option<String>,
    pub overall_status: Status,
    pub step_results: Vec<StepResult>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a new run ID (UUIDv4).
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Build a result for an invocation that ran to completion.
pub fn result_with_status(
    command: &str,
    tokens: &[String],
    run_id: &str,
    total_ms: u64,
    status: Status,
) -> DispatchResult {
    DispatchResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        input: tokens.join(" "),
        status,
        error: None,
        timing_ms: total_ms,
    }
}

/// Build a failed result.
pub fn result_err(
    command: &str,
    tokens: &[String],
    run_id: &str,
    total_ms: u64,
    status: Status,
    code: ErrorCode,
    message: impl Into<String>,
) -> DispatchResult {
    DispatchResult {
        run_id: run_id.to_string(),
        command: command.to_string(),
        input: tokens.join(" "),
        status,
        error: Some(ErrorInfo {
            code,
            message: message.into(),
        }),
        timing_ms: total_ms,
    }
}

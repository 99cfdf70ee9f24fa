//! cmdtree – command-tree dispatch with typed argument parsing and tab
//! completion.
//!
//! A command is a tree of [`Node`]s: groups route on the first token,
//! actions parse the remaining tokens against a parameter schema and run a
//! callback. The host supplies permission checks and message delivery
//! through the traits in [`traits`]; nothing here does I/O on its own.

pub mod chat;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod help;
pub mod node;
pub mod parameter;
pub mod parse;
pub mod platform;
pub mod scenario;
pub mod tokens;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use chat::{Chat, Message, MessageLevel};
pub use commands::{CommandDefinition, CommandRegistry, RegistryError};
pub use context::DispatchContext;
pub use dispatch::Dispatcher;
pub use node::{ActionNode, BuildError, CommandError, GroupNode, HybridNode, Invocation, Node};
pub use parameter::{EnumDomain, Parameter, ParameterKind};
pub use parse::ParseError;
pub use types::{Arguments, CommandEnum, DispatchResult, ErrorCode, Identity, Status, Value};

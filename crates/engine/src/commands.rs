//! Command registry – binds command trees to labels.
//!
//! Trees are registered under a label and invoked with an identity and the
//! raw tokens that followed the label.

use crate::context::DispatchContext;
use crate::dispatch::Dispatcher;
use crate::node::{BuildError, Node};
use crate::types::*;
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("command '{label}' failed to bind: {source}")]
    Build {
        label: String,
        #[source]
        source: BuildError,
    },
}

/// A command described in two phases: first the tree's shape, then the
/// callbacks, so callbacks may refer to anything built in phase one.
pub trait CommandDefinition {
    fn label(&self) -> &str;

    /// Build the node tree. Callbacks may be left unset.
    fn shape(&self) -> Node;

    /// Attach callbacks to the built tree.
    fn bind(&self, root: &mut Node) -> Result<(), BuildError>;

    fn tab_complete(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    commands: HashMap<String, Dispatcher>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register `root` under `label`, replacing any previous tree.
    pub fn register(&mut self, label: &str, root: impl Into<Node>) {
        self.insert(Dispatcher::new(label, root));
    }

    pub fn insert(&mut self, dispatcher: Dispatcher) {
        tracing::debug!(label = %dispatcher.label(), "registering command");
        self.commands
            .insert(dispatcher.label().to_string(), dispatcher);
    }

    /// Run both phases of `definition` and register the result.
    pub fn install(&mut self, definition: &dyn CommandDefinition) -> Result<(), RegistryError> {
        let mut root = definition.shape();
        definition
            .bind(&mut root)
            .map_err(|source| RegistryError::Build {
                label: definition.label().to_string(),
                source,
            })?;
        self.insert(
            Dispatcher::new(definition.label(), root).with_tab_complete(definition.tab_complete()),
        );
        Ok(())
    }

    pub fn get(&self, label: &str) -> Result<&Dispatcher, RegistryError> {
        self.commands
            .get(label)
            .ok_or_else(|| RegistryError::UnknownCommand(label.to_string()))
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Invoke `label` and return the full DispatchResult.
    pub fn execute(
        &self,
        label: &str,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> DispatchResult {
        match self.get(label) {
            Ok(dispatcher) => dispatcher.invoke(ctx, identity, tokens),
            Err(e) => result_err(
                label,
                tokens,
                &new_run_id(),
                0,
                Status::Error,
                ErrorCode::UnknownCommand,
                e.to_string(),
            ),
        }
    }

    pub fn complete(
        &self,
        label: &str,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> Vec<String> {
        self.get(label)
            .map(|d| d.complete(ctx, identity, tokens))
            .unwrap_or_default()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

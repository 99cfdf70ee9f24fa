//! Dispatch adapter – the boundary between a host's raw invocation
//! (identity + token array) and the command tree.

use crate::chat::{Chat, Message, MessageLevel};
use crate::context::DispatchContext;
use crate::help;
use crate::node::{CommandError, Node};
use crate::types::*;
use std::time::Instant;

const NO_PERMISSION: &str = "You do not have permission to use this command.";

/// A command tree bound to the label the host registered it under.
pub struct Dispatcher {
    label: String,
    root: Node,
    tab_complete: bool,
}

impl Dispatcher {
    pub fn new(label: impl Into<String>, root: impl Into<Node>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
            tab_complete: true,
        }
    }

    /// Turn completion off entirely; [`Dispatcher::complete`] then returns
    /// nothing.
    pub fn with_tab_complete(mut self, enabled: bool) -> Self {
        self.tab_complete = enabled;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn tab_complete(&self) -> bool {
        self.tab_complete
    }

    /// Run one invocation. Every failure is reported to `identity` through
    /// the context's message sink and summarised in the returned result.
    pub fn invoke(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> DispatchResult {
        let run_id = new_run_id();
        let start = Instant::now();
        let elapsed = || start.elapsed().as_millis() as u64;

        if !self.root.check_permission(ctx, identity) {
            tracing::debug!(command = %self.label, identity = %identity, "root permission denied");
            ctx.send(identity, Message::new(MessageLevel::Error, NO_PERMISSION));
            return result_err(
                &self.label,
                tokens,
                &run_id,
                elapsed(),
                Status::Denied,
                ErrorCode::PermissionDenied,
                NO_PERMISSION,
            );
        }

        if self.intercepts_help(tokens) {
            let tree = tokens
                .get(1)
                .is_some_and(|t| t.eq_ignore_ascii_case("tree"));
            let lines = if tree {
                help::render_tree(&self.root, &self.label, ctx, identity)
            } else {
                help::render_help(&self.root, &self.label, ctx, identity)
            };
            for line in lines {
                ctx.send(identity, line);
            }
            return result_with_status(&self.label, tokens, &run_id, elapsed(), Status::Help);
        }

        match self.root.execute(ctx, identity, tokens) {
            Ok(()) => result_with_status(&self.label, tokens, &run_id, elapsed(), Status::Pass),
            Err(e) => self.report(ctx, identity, tokens, &run_id, elapsed(), e),
        }
    }

    /// Completion candidates for the last token of `tokens`.
    pub fn complete(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> Vec<String> {
        if !self.tab_complete {
            return Vec::new();
        }
        let mut out = self.root.complete(ctx, identity, tokens);
        if tokens.len() == 1 {
            out.push("help".to_string());
        } else if tokens.len() >= 2 && tokens[0] == "help" {
            out.push("tree".to_string());
        }
        out
    }

    fn intercepts_help(&self, tokens: &[String]) -> bool {
        let asks_help = tokens
            .first()
            .is_some_and(|t| t.eq_ignore_ascii_case("help"));
        asks_help && self.root.has_children() && !self.root.has_descendant_named("help")
    }

    fn report(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
        run_id: &str,
        total_ms: u64,
        error: CommandError,
    ) -> DispatchResult {
        let message = error.to_string();
        tracing::debug!(command = %self.label, code = %error.error_code(), %message, "invocation failed");
        let status = match error {
            CommandError::PermissionDenied(_) => {
                ctx.send(identity, Message::new(MessageLevel::Error, NO_PERMISSION));
                Status::Denied
            }
            _ => {
                let owner = self.root.route(tokens).info().owner();
                ctx.send(identity, Chat::new(owner).error(&message));
                Status::Error
            }
        };
        result_err(
            &self.label,
            tokens,
            run_id,
            total_ms,
            status,
            error.error_code(),
            message,
        )
    }
}

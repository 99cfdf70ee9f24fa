//! The command tree: a closed set of node variants sharing one
//! execute / complete contract.
//!
//! - [`ActionNode`]: leaf, parses its parameters and runs a callback
//! - [`GroupNode`]: interior, routes by the first remaining token
//! - [`HybridNode`]: a group that runs its own callback when no tokens remain

use crate::chat::{Chat, Message};
use crate::context::DispatchContext;
use crate::parameter::Parameter;
use crate::parse::{complete_arguments, parse_arguments, ParseError};
use crate::types::{Arguments, ErrorCode, Identity};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Work performed when a node's input is fully satisfied.
pub type Callback = Arc<dyn Fn(&Invocation<'_>) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Missing subcommand. Try /{0} help")]
    MissingSubcommand(String),
    #[error("Unknown subcommand: {0}")]
    UnknownSubcommand(String),
    #[error("Executor for command {0} not set.")]
    CallbackNotSet(String),
    /// Carries the permission string that was checked.
    #[error("You do not have permission to use this command.")]
    PermissionDenied(String),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::Parse(e) => e.error_code(),
            CommandError::MissingSubcommand(_) => ErrorCode::MissingSubcommand,
            CommandError::UnknownSubcommand(_) => ErrorCode::UnknownSubcommand,
            CommandError::CallbackNotSet(_) => ErrorCode::CallbackNotSet,
            CommandError::PermissionDenied(_) => ErrorCode::PermissionDenied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("no node at path '{0}'")]
    NoSuchNode(String),
    #[error("node '{0}' is a plain group and cannot take a callback")]
    NotExecutable(String),
}

// ---------------------------------------------------------------------------
// Shared identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    name: String,
    description: String,
    owner: String,
    permission: Option<String>,
}

impl NodeInfo {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            owner: owner.into(),
            permission: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Explicit override, or `owner.name`.
    pub fn permission(&self) -> String {
        match &self.permission {
            Some(p) => p.clone(),
            None => format!("{}.{}", self.owner, self.name),
        }
    }

    pub fn set_permission(&mut self, permission: impl Into<String>) {
        self.permission = Some(permission.into());
    }
}

// ---------------------------------------------------------------------------
// Callback input
// ---------------------------------------------------------------------------

/// Everything a callback receives: who called, the parsed arguments, and a
/// way to reply through the host's message sink.
pub struct Invocation<'a> {
    ctx: &'a DispatchContext,
    identity: &'a Identity,
    node: &'a NodeInfo,
    args: Arguments,
}

impl<'a> Invocation<'a> {
    pub fn identity(&self) -> &Identity {
        self.identity
    }

    pub fn args(&self) -> &Arguments {
        &self.args
    }

    pub fn node(&self) -> &NodeInfo {
        self.node
    }

    pub fn context(&self) -> &DispatchContext {
        self.ctx
    }

    pub fn reply(&self, text: &str) {
        self.ctx
            .send(self.identity, Chat::new(self.node.owner()).info(text));
    }

    pub fn reply_error(&self, text: &str) {
        self.ctx
            .send(self.identity, Chat::new(self.node.owner()).error(text));
    }

    pub fn send(&self, message: Message) {
        self.ctx.send(self.identity, message);
    }
}

fn run_callback(
    callback: Option<&Callback>,
    info: &NodeInfo,
    ctx: &DispatchContext,
    identity: &Identity,
    args: Arguments,
) -> Result<(), CommandError> {
    let Some(callback) = callback else {
        tracing::warn!(node = %info.name(), "callback not set");
        return Err(CommandError::CallbackNotSet(info.name().to_string()));
    };
    tracing::debug!(node = %info.name(), identity = %identity, args = args.len(), "invoking callback");
    let invocation = Invocation {
        ctx,
        identity,
        node: info,
        args,
    };
    callback(&invocation);
    Ok(())
}

// ===========================================================================
// Action node
// ===========================================================================

pub struct ActionNode {
    info: NodeInfo,
    parameters: Vec<Parameter>,
    callback: Option<Callback>,
}

impl ActionNode {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            info: NodeInfo::new(name, description, owner),
            parameters: Vec::new(),
            callback: None,
        }
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn params(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.info.set_permission(permission);
        self
    }

    pub fn on_execute<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn set_callback(&mut self, callback: Callback) {
        self.callback = Some(callback);
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn execute(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> Result<(), CommandError> {
        let args = parse_arguments(&self.parameters, tokens)?;
        run_callback(self.callback.as_ref(), &self.info, ctx, identity, args)
    }

    fn complete(&self, partial: &[String]) -> Vec<String> {
        complete_arguments(&self.parameters, partial)
    }
}

// ===========================================================================
// Group node
// ===========================================================================

pub struct GroupNode {
    info: NodeInfo,
    children: BTreeMap<String, Node>,
}

impl GroupNode {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            info: NodeInfo::new(name, description, owner),
            children: BTreeMap::new(),
        }
    }

    /// Add a child. A child with the same name is replaced.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.add_child(node);
        self
    }

    pub fn add_child(&mut self, node: impl Into<Node>) {
        let node = node.into();
        self.children.insert(node.name().to_string(), node);
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.info.set_permission(permission);
        self
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    fn execute(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> Result<(), CommandError> {
        let Some((first, rest)) = tokens.split_first() else {
            return Err(CommandError::MissingSubcommand(self.info.name().to_string()));
        };
        let Some(child) = self.children.get(first) else {
            return Err(CommandError::UnknownSubcommand(first.clone()));
        };
        if ctx.enforce_node_permissions && !child.check_permission(ctx, identity) {
            return Err(CommandError::PermissionDenied(child.info().permission()));
        }
        tracing::debug!(group = %self.info.name(), child = %first, remaining = rest.len(), "routing");
        child.execute(ctx, identity, rest)
    }

    fn complete(&self, ctx: &DispatchContext, identity: &Identity, partial: &[String]) -> Vec<String> {
        let visible = |node: &Node| {
            !ctx.enforce_node_permissions || node.check_permission(ctx, identity)
        };
        match partial {
            [] => Vec::new(),
            [typing] => self
                .children
                .iter()
                .filter(|(name, node)| name.starts_with(typing.as_str()) && visible(node))
                .map(|(name, _)| name.clone())
                .collect(),
            [first, rest @ ..] => match self.children.get(first) {
                Some(child) if visible(child) => child.complete(ctx, identity, rest),
                _ => Vec::new(),
            },
        }
    }
}

// ===========================================================================
// Hybrid node
// ===========================================================================

pub struct HybridNode {
    group: GroupNode,
    callback: Option<Callback>,
}

impl HybridNode {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            group: GroupNode::new(name, description, owner),
            callback: None,
        }
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.group.add_child(node);
        self
    }

    pub fn add_child(&mut self, node: impl Into<Node>) {
        self.group.add_child(node);
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.group.info.set_permission(permission);
        self
    }

    pub fn on_execute<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    pub fn set_callback(&mut self, callback: Callback) {
        self.callback = Some(callback);
    }

    pub fn info(&self) -> &NodeInfo {
        &self.group.info
    }

    pub fn group(&self) -> &GroupNode {
        &self.group
    }

    fn execute(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> Result<(), CommandError> {
        if tokens.is_empty() {
            return run_callback(
                self.callback.as_ref(),
                &self.group.info,
                ctx,
                identity,
                Arguments::default(),
            );
        }
        self.group.execute(ctx, identity, tokens)
    }
}

// ===========================================================================
// Node
// ===========================================================================

pub enum Node {
    Action(ActionNode),
    Group(GroupNode),
    Hybrid(HybridNode),
}

impl From<ActionNode> for Node {
    fn from(node: ActionNode) -> Self {
        Node::Action(node)
    }
}

impl From<GroupNode> for Node {
    fn from(node: GroupNode) -> Self {
        Node::Group(node)
    }
}

impl From<HybridNode> for Node {
    fn from(node: HybridNode) -> Self {
        Node::Hybrid(node)
    }
}

impl Node {
    pub fn info(&self) -> &NodeInfo {
        match self {
            Node::Action(n) => n.info(),
            Node::Group(n) => n.info(),
            Node::Hybrid(n) => n.info(),
        }
    }

    pub fn name(&self) -> &str {
        self.info().name()
    }

    pub fn description(&self) -> &str {
        self.info().description()
    }

    pub fn has_children(&self) -> bool {
        !matches!(self, Node::Action(_))
    }

    /// Interior nodes' group view; `None` for actions.
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Action(_) => None,
            Node::Group(g) => Some(g),
            Node::Hybrid(h) => Some(h.group()),
        }
    }

    pub fn children(&self) -> Vec<&Node> {
        self.as_group()
            .map(|g| g.children().collect())
            .unwrap_or_default()
    }

    /// Parameter schema of an action; empty for interior nodes.
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Node::Action(a) => a.parameters(),
            _ => &[],
        }
    }

    pub fn check_permission(&self, ctx: &DispatchContext, identity: &Identity) -> bool {
        ctx.has_permission(identity, &self.info().permission())
    }

    pub fn execute(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        tokens: &[String],
    ) -> Result<(), CommandError> {
        match self {
            Node::Action(n) => n.execute(ctx, identity, tokens),
            Node::Group(n) => n.execute(ctx, identity, tokens),
            Node::Hybrid(n) => n.execute(ctx, identity, tokens),
        }
    }

    pub fn complete(
        &self,
        ctx: &DispatchContext,
        identity: &Identity,
        partial: &[String],
    ) -> Vec<String> {
        match self {
            Node::Action(n) => n.complete(partial),
            Node::Group(n) => n.complete(ctx, identity, partial),
            Node::Hybrid(n) => n.group.complete(ctx, identity, partial),
        }
    }

    /// The node that handles `tokens`: routing stops at an action, at a
    /// group whose next token names no child, or when tokens run out.
    pub fn route(&self, tokens: &[String]) -> &Node {
        let mut node = self;
        let mut rest = tokens;
        while let (Some(group), Some((first, tail))) = (node.as_group(), rest.split_first()) {
            match group.get(first) {
                Some(child) => {
                    node = child;
                    rest = tail;
                }
                None => break,
            }
        }
        node
    }

    /// True if any descendant (not this node) is named `name`.
    pub fn has_descendant_named(&self, name: &str) -> bool {
        self.children()
            .into_iter()
            .any(|c| c.name() == name || c.has_descendant_named(name))
    }

    /// Attach a callback to the action or hybrid node at `path`, relative to
    /// this node. An empty path targets this node.
    pub fn bind<F>(&mut self, path: &[&str], callback: F) -> Result<(), BuildError>
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        self.bind_callback(path, Arc::new(callback))
    }

    pub fn bind_callback(&mut self, path: &[&str], callback: Callback) -> Result<(), BuildError> {
        let Some((first, rest)) = path.split_first() else {
            return match self {
                Node::Action(a) => {
                    a.set_callback(callback);
                    Ok(())
                }
                Node::Hybrid(h) => {
                    h.set_callback(callback);
                    Ok(())
                }
                Node::Group(g) => Err(BuildError::NotExecutable(g.info().name().to_string())),
            };
        };

        let children = match self {
            Node::Action(_) => None,
            Node::Group(g) => Some(&mut g.children),
            Node::Hybrid(h) => Some(&mut h.group.children),
        };
        match children.and_then(|c| c.get_mut(*first)) {
            Some(child) => child.bind_callback(rest, callback).map_err(|e| match e {
                BuildError::NoSuchNode(p) => BuildError::NoSuchNode(format!("{} {}", first, p)),
                other => other,
            }),
            None => Err(BuildError::NoSuchNode(path.join(" "))),
        }
    }
}

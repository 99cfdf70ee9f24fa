//! Dispatch context – holds collaborator trait objects and policy flags.

use crate::chat::Message;
use crate::platform::{AllowAll, RecordingMessages};
use crate::traits::*;
use crate::types::Identity;

/// Central context passed to every tree operation.
///
/// Holds trait-object collaborators so hosts can swap implementations
/// (e.g. a recording sink in tests vs. a coloured terminal sink).
pub struct DispatchContext {
    permissions: Box<dyn PermissionOps>,
    messages: Box<dyn MessageOps>,
    /// Check each node's permission while routing, not only the root's.
    pub enforce_node_permissions: bool,
}

impl DispatchContext {
    pub fn new(permissions: Box<dyn PermissionOps>, messages: Box<dyn MessageOps>) -> Self {
        Self {
            permissions,
            messages,
            enforce_node_permissions: false,
        }
    }

    /// Everything permitted, messages recorded and discarded.
    pub fn default_headless() -> Self {
        Self::new(Box::new(AllowAll), Box::new(RecordingMessages::new()))
    }

    pub fn with_node_permissions(mut self, enforce: bool) -> Self {
        self.enforce_node_permissions = enforce;
        self
    }

    pub fn has_permission(&self, identity: &Identity, permission: &str) -> bool {
        self.permissions.has_permission(identity, permission)
    }

    pub fn send(&self, identity: &Identity, message: Message) {
        self.messages.send(identity, &message);
    }
}

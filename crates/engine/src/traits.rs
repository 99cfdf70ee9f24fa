//! Collaborator ports the host implements: permission checks and message
//! delivery. The engine never interprets permission strings itself.

use crate::chat::Message;
use crate::types::Identity;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Permission checks
// ---------------------------------------------------------------------------

pub trait PermissionOps: Send + Sync {
    fn has_permission(&self, identity: &Identity, permission: &str) -> bool;
}

// ---------------------------------------------------------------------------
// Message delivery
// ---------------------------------------------------------------------------

pub trait MessageOps: Send + Sync {
    fn send(&self, identity: &Identity, message: &Message);
}

// Shared handles, so a test or host can keep a reference to the sink it
// hands to the context.

impl<T: PermissionOps + ?Sized> PermissionOps for Arc<T> {
    fn has_permission(&self, identity: &Identity, permission: &str) -> bool {
        (**self).has_permission(identity, permission)
    }
}

impl<T: MessageOps + ?Sized> MessageOps for Arc<T> {
    fn send(&self, identity: &Identity, message: &Message) {
        (**self).send(identity, message)
    }
}

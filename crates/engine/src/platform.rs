//! Reference implementations of the collaborator traits.
//!
//! - [`AllowAll`]: grants every permission
//! - [`StaticPermissions`]: fixed grant table with `*` / `prefix.*` wildcards
//! - [`RecordingMessages`]: keeps every sent message in memory

use crate::chat::Message;
use crate::traits::*;
use crate::types::Identity;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

// ===========================================================================
// Permissions
// ===========================================================================

pub struct AllowAll;

impl PermissionOps for AllowAll {
    fn has_permission(&self, _identity: &Identity, _permission: &str) -> bool {
        true
    }
}

/// Grant table keyed by identity name.
///
/// A grant of `*` matches everything; `a.b.*` matches `a.b.c` and anything
/// deeper, but not `a.b` itself.
#[derive(Debug, Default, Clone)]
pub struct StaticPermissions {
    grants: HashMap<String, HashSet<String>>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, identity: &str, permission: &str) -> Self {
        self.grants
            .entry(identity.to_string())
            .or_default()
            .insert(permission.to_string());
        self
    }

    pub fn from_table<I, P>(table: I) -> Self
    where
        I: IntoIterator<Item = (String, P)>,
        P: IntoIterator<Item = String>,
    {
        let grants = table
            .into_iter()
            .map(|(who, perms)| (who, perms.into_iter().collect()))
            .collect();
        Self { grants }
    }
}

impl PermissionOps for StaticPermissions {
    fn has_permission(&self, identity: &Identity, permission: &str) -> bool {
        let Some(granted) = self.grants.get(identity.name()) else {
            return false;
        };
        granted.iter().any(|g| {
            if g == "*" || g == permission {
                return true;
            }
            match g.strip_suffix('*') {
                Some(prefix) if prefix.ends_with('.') => permission.starts_with(prefix),
                _ => false,
            }
        })
    }
}

// ===========================================================================
// Messages
// ===========================================================================

/// Collects `(recipient, message)` pairs; used by tests and by hosts that
/// report messages in a structured result.
#[derive(Debug, Default)]
pub struct RecordingMessages {
    sent: Mutex<Vec<(Identity, Message)>>,
}

impl RecordingMessages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Identity, Message)> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Text of every message, in send order.
    pub fn texts(&self) -> Vec<String> {
        self.messages().into_iter().map(|(_, m)| m.text).collect()
    }

    pub fn take(&self) -> Vec<(Identity, Message)> {
        self.sent
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut v) = self.sent.lock() {
            v.clear();
        }
    }
}

impl MessageOps for RecordingMessages {
    fn send(&self, identity: &Identity, message: &Message) {
        if let Ok(mut v) = self.sent.lock() {
            v.push((identity.clone(), message.clone()));
        }
    }
}

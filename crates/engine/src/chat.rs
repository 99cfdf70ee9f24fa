//! User-visible message formatting: owner prefix plus a level the sink uses
//! for colouring.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    /// Unprefixed listing lines (help entries, tree rows).
    Plain,
    /// Section headers such as "Available subcommands:".
    Heading,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Plain, text)
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::new(MessageLevel::Heading, text)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Formats messages under an owner's `[owner]` prefix.
#[derive(Debug, Clone)]
pub struct Chat {
    owner: String,
}

impl Chat {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    pub fn affix(&self, message: &str) -> String {
        format!("[{}] {}", self.owner, message)
    }

    pub fn info(&self, message: &str) -> Message {
        Message::new(MessageLevel::Info, self.affix(message))
    }

    pub fn error(&self, message: &str) -> Message {
        Message::new(MessageLevel::Error, self.affix(message))
    }
}

//! Terminal message sink.

use cmdtree::traits::MessageOps;
use cmdtree::{Identity, Message, MessageLevel};
use colored::Colorize;

/// Prints engine messages to stdout, coloured by level.
pub struct ColoredConsole;

impl ColoredConsole {
    pub fn render(message: &Message) -> String {
        match message.level {
            MessageLevel::Plain => message.text.normal().to_string(),
            MessageLevel::Heading => message.text.yellow().to_string(),
            MessageLevel::Info => render_prefixed(&message.text, |s| s.normal().to_string()),
            MessageLevel::Error => render_prefixed(&message.text, |s| s.red().to_string()),
        }
    }
}

/// Dim the `[owner]` prefix, style the rest.
fn render_prefixed(text: &str, body: impl Fn(&str) -> String) -> String {
    match text.split_once("] ") {
        Some((prefix, rest)) if prefix.starts_with('[') => {
            format!("{}{} {}", prefix.dimmed(), "]".dimmed(), body(rest))
        }
        _ => body(text),
    }
}

impl MessageOps for ColoredConsole {
    fn send(&self, _identity: &Identity, message: &Message) {
        println!("{}", Self::render(message));
    }
}

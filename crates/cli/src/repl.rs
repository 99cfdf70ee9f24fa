//! Interactive shell over a registry, with tab completion driven by the
//! command trees themselves.

use anyhow::{anyhow, Result};
use cmdtree::tokens::{tokenize, tokenize_partial};
use cmdtree::{CommandRegistry, DispatchContext, Identity, Status};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::sync::{Arc, RwLock};

struct TreeHelper {
    registry: Arc<CommandRegistry>,
    ctx: Arc<DispatchContext>,
    identity: Arc<RwLock<Identity>>,
}

impl TreeHelper {
    fn current_identity(&self) -> Identity {
        self.identity
            .read()
            .map(|id| id.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Candidates for the last token of `line` and the byte offset it starts at.
    fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        let stripped = line.strip_prefix('/').unwrap_or(line);
        let offset = line.len() - stripped.len();
        let tokens = tokenize_partial(stripped);
        let last = tokens.last().map(|s| s.as_str()).unwrap_or("");
        let start = line.len() - last.len();

        let found = match tokens.split_first() {
            Some((label, [])) => self
                .registry
                .list()
                .into_iter()
                .filter(|name| name.starts_with(label.as_str()))
                .map(str::to_string)
                .collect(),
            Some((label, rest)) => {
                let who = self.current_identity();
                self.registry
                    .complete(label, &self.ctx, &who, rest)
                    .into_iter()
                    .filter(|c| starts_with_ignore_case(c, last))
                    .collect()
            }
            None => Vec::new(),
        };
        (start.max(offset), found)
    }
}

fn starts_with_ignore_case(candidate: &str, prefix: &str) -> bool {
    candidate.len() >= prefix.len()
        && candidate.is_char_boundary(prefix.len())
        && candidate[..prefix.len()].eq_ignore_ascii_case(prefix)
}

impl Completer for TreeHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, found) = self.candidates(&line[..pos]);
        let pairs = found
            .into_iter()
            .map(|s| Pair {
                display: s.clone(),
                replacement: s,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl rustyline::Helper for TreeHelper {}

impl rustyline::highlight::Highlighter for TreeHelper {}

impl rustyline::hint::Hinter for TreeHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl rustyline::validate::Validator for TreeHelper {}

enum ReplControl {
    Continue,
    Exit,
}

pub fn run_repl(
    registry: Arc<CommandRegistry>,
    ctx: Arc<DispatchContext>,
    identity: Identity,
) -> Result<()> {
    let identity = Arc::new(RwLock::new(identity));
    let helper = TreeHelper {
        registry: registry.clone(),
        ctx: ctx.clone(),
        identity: identity.clone(),
    };
    let mut rl: Editor<TreeHelper, DefaultHistory> =
        Editor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;
    rl.set_helper(Some(helper));

    println!("{}", "cmdtree shell".green().bold());
    println!(
        "Commands: {}. Type `:as <name>` to switch identity, `exit` to quit.\n",
        registry.list().join(", ")
    );

    loop {
        let prompt = match identity.read() {
            Ok(id) => format!("{}> ", id),
            Err(_) => "> ".to_string(),
        };
        let line = match rl.readline(&prompt) {
            Ok(l) => l,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => return Err(anyhow!("readline error: {e}")),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rl.add_history_entry(line)
            .map_err(|e| anyhow!("failed to record history: {e}"))?;

        match handle_line(&registry, &ctx, &identity, line) {
            ReplControl::Continue => {}
            ReplControl::Exit => break,
        }
    }

    Ok(())
}

fn handle_line(
    registry: &CommandRegistry,
    ctx: &DispatchContext,
    identity: &RwLock<Identity>,
    line: &str,
) -> ReplControl {
    let tokens = tokenize(line.strip_prefix('/').unwrap_or(line));
    let Some((head, rest)) = tokens.split_first() else {
        return ReplControl::Continue;
    };

    match head.as_str() {
        "exit" | "quit" => return ReplControl::Exit,
        ":as" => {
            match rest.first() {
                Some(name) => {
                    if let Ok(mut id) = identity.write() {
                        *id = Identity::new(name.as_str());
                    }
                }
                None => eprintln!("{} usage: :as <name>", "error:".red().bold()),
            }
            return ReplControl::Continue;
        }
        _ => {}
    }

    let who = match identity.read() {
        Ok(id) => id.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    let result = registry.execute(head, ctx, &who, rest);
    tracing::debug!(run_id = %result.run_id, status = %result.status, "repl dispatch");
    if result.status == Status::Error {
        if let Some(err) = result.error.filter(|e| e.code == cmdtree::ErrorCode::UnknownCommand) {
            eprintln!("{} {}", "error:".red().bold(), err.message);
        }
    }
    ReplControl::Continue
}

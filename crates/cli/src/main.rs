//! `cmdtreectl` – command-line host for cmdtree command trees.
//!
//! Runs, completes and explores the demo `inv` tree with the same engine a
//! plugin host would embed, with permissions and identity taken from config.

mod config;
mod console;
mod demo;
mod logging;
mod repl;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use cmdtree::help::render_tree;
use cmdtree::platform::{RecordingMessages, StaticPermissions};
use cmdtree::scenario::{load_scenario, run_scenario};
use cmdtree::tokens::tokenize_partial;
use cmdtree::{CommandRegistry, DispatchContext, DispatchResult, Identity, Message, Status};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ===========================================================================
// CLI definition
// ===========================================================================

#[derive(Parser)]
#[command(
    name = "cmdtreectl",
    version,
    about = "Run and explore cmdtree command trees"
)]
struct Cli {
    /// Extra config file, layered over cmdtree.yaml and .cmdtree.yaml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Invoke the command with the given tokens.
    Run {
        /// Identity to run as (defaults to the configured identity).
        #[arg(long = "as")]
        identity: Option<String>,
        /// Output the result record and messages as JSON.
        #[arg(long)]
        json: bool,
        /// Tokens following the command label.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Print completion candidates for a partial line.
    Complete {
        /// Everything after the label, e.g. "item give a".
        line: String,
        #[arg(long = "as")]
        identity: Option<String>,
    },

    /// Print the command tree.
    Tree {
        #[arg(long = "as")]
        identity: Option<String>,
    },

    /// List registered command labels.
    List,

    /// Start an interactive shell with tab completion.
    Repl {
        #[arg(long = "as")]
        identity: Option<String>,
    },

    /// Run a scripted scenario from a YAML file.
    RunScenario {
        /// Path to the scenario YAML file.
        file: PathBuf,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

// ===========================================================================
// Main
// ===========================================================================

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref()).context("failed to load config")?;
    logging::init_logging(&config.logging);
    tracing::debug!(label = %config.command.label, "config loaded");

    let registry = build_registry(&config)?;
    let who = |identity: Option<String>| Identity::new(identity.unwrap_or_else(|| config.identity.clone()));

    let code = match cli.command {
        Commands::Run {
            identity,
            json,
            tokens,
        } => {
            let (ctx, recorder) = build_context(&config, json);
            let result = registry.execute(&config.command.label, &ctx, &who(identity), &tokens);
            if let Some(recorder) = recorder {
                print_json(&RunOutput {
                    result: &result,
                    messages: recorder.texts(),
                })?;
            }
            exit_code(&result)
        }
        Commands::Complete { line, identity } => {
            let (ctx, _) = build_context(&config, true);
            let tokens = tokenize_partial(&line);
            for candidate in registry.complete(&config.command.label, &ctx, &who(identity), &tokens) {
                println!("{}", candidate);
            }
            0
        }
        Commands::Tree { identity } => {
            let (ctx, _) = build_context(&config, true);
            match tree_messages(&registry, &config.command.label, &ctx, &who(identity))? {
                Some(lines) => {
                    for line in &lines {
                        println!("{}", console::ColoredConsole::render(line));
                    }
                    0
                }
                None => {
                    eprintln!("You do not have permission to use this command.");
                    1
                }
            }
        }
        Commands::List => {
            for label in registry.list() {
                println!("{}", label);
            }
            0
        }
        Commands::Repl { identity } => {
            let (ctx, _) = build_context(&config, false);
            repl::run_repl(Arc::new(registry), Arc::new(ctx), who(identity))?;
            0
        }
        Commands::RunScenario { file, json } => cmd_run_scenario(&file, json, &config, &registry)?,
    };
    Ok(code)
}

// ===========================================================================
// Wiring
// ===========================================================================

fn build_registry(config: &config::CliConfig) -> Result<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    let command = demo::InventoryCommand::new(
        &config.command.label,
        &config.command.owner,
        config.command.tab_complete,
        demo::SharedInventory::default(),
    );
    registry.install(&command)?;
    Ok(registry)
}

/// Console output normally; a recording sink when the caller wants JSON.
fn build_context(
    config: &config::CliConfig,
    quiet: bool,
) -> (DispatchContext, Option<Arc<RecordingMessages>>) {
    let permissions = StaticPermissions::from_table(config.permissions.clone());
    let (ctx, recorder) = if quiet {
        let recorder = Arc::new(RecordingMessages::new());
        (
            DispatchContext::new(Box::new(permissions), Box::new(recorder.clone())),
            Some(recorder),
        )
    } else {
        (
            DispatchContext::new(Box::new(permissions), Box::new(console::ColoredConsole)),
            None,
        )
    };
    (ctx.with_node_permissions(config.enforce_node_permissions), recorder)
}

/// Render the tree without dispatching, so a node named `help` cannot
/// shadow it. `None` when the root denies the caller.
fn tree_messages(
    registry: &CommandRegistry,
    label: &str,
    ctx: &DispatchContext,
    identity: &Identity,
) -> Result<Option<Vec<Message>>> {
    let dispatcher = registry.get(label)?;
    if !dispatcher.root().check_permission(ctx, identity) {
        return Ok(None);
    }
    Ok(Some(render_tree(dispatcher.root(), dispatcher.label(), ctx, identity)))
}

fn cmd_run_scenario(
    file: &Path,
    json: bool,
    config: &config::CliConfig,
    registry: &CommandRegistry,
) -> Result<i32> {
    let yaml = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read scenario file {}", file.display()))?;
    let scenario = load_scenario(&yaml).map_err(anyhow::Error::msg)?;
    let (ctx, _) = build_context(config, true);

    let scenario_result = run_scenario(&scenario, &ctx, registry);

    if json {
        print_json(&scenario_result)?;
    } else {
        println!(
            "Scenario: {}",
            scenario_result.name.as_deref().unwrap_or("<unnamed>")
        );
        println!("Overall: {}", scenario_result.overall_status);
        for sr in &scenario_result.step_results {
            let mark = if sr.passed { "ok" } else { "MISMATCH" };
            match (&sr.dispatch, &sr.completions) {
                (Some(d), _) => println!(
                    "  Step {}: {} -> {} [{}] ({}ms)",
                    sr.step, sr.line, d.status, mark, d.timing_ms
                ),
                (None, Some(c)) => println!(
                    "  Step {}: complete '{}' -> [{}] [{}]",
                    sr.step,
                    sr.line,
                    c.join(", "),
                    mark
                ),
                (None, None) => println!("  Step {}: {} [{}]", sr.step, sr.line, mark),
            }
        }
    }

    Ok(match scenario_result.overall_status {
        Status::Pass => 0,
        _ => 2,
    })
}

// ===========================================================================
// Output helpers
// ===========================================================================

#[derive(Serialize)]
struct RunOutput<'a> {
    #[serde(flatten)]
    result: &'a DispatchResult,
    messages: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(result: &DispatchResult) -> i32 {
    match result.status {
        Status::Pass | Status::Help => 0,
        Status::Denied => 1,
        Status::Error => 2,
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CliConfig {
    pub command: CommandConfig,
    /// Identity used when `--as` is not given.
    pub identity: String,
    /// Identity → granted permission strings. `*` and `prefix.*` wildcards
    /// are honoured.
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub enforce_node_permissions: bool,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CommandConfig {
    pub label: String,
    pub owner: String,
    pub tab_complete: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub show_time: bool,
    pub show_file: bool,
    pub show_line: bool,
}

/// Load configuration: built-in defaults, then `cmdtree.yaml`, then the
/// local `.cmdtree.yaml`, then `extra` if given, then `CMDTREE__*`
/// environment variables.
pub fn load_config(extra: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut builder = Config::builder()
        .set_default("command.label", "inv")?
        .set_default("command.owner", "inv")?
        .set_default("command.tab_complete", true)?
        .set_default("identity", "operator")?
        .set_default("permissions.operator", vec!["*"])?
        .set_default("enforce_node_permissions", false)?
        .set_default("logging.level", "warn")?
        .set_default("logging.json", false)?
        .set_default("logging.show_time", false)?
        .set_default("logging.show_file", false)?
        .set_default("logging.show_line", false)?
        // Project config
        .add_source(File::with_name("cmdtree.yaml").required(false))
        // Local override
        .add_source(File::with_name(".cmdtree.yaml").required(false));

    if let Some(path) = extra {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(
            Environment::with_prefix("CMDTREE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

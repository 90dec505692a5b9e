//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// promptkit - Manage and run prompt templates.
#[derive(Debug, Parser)]
#[command(name = "promptkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Template directory (overrides template_dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// Backend provider (echo, command)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model passed to the backend
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Default maximum tokens to generate
    #[arg(long, global = true, value_name = "N")]
    pub max_tokens: Option<u64>,

    /// Default sampling temperature
    #[arg(long, global = true)]
    pub temperature: Option<f64>,

    /// Credential profile for the backend
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Region for the backend
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Show extra detail
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Never prompt; use PROMPTKIT_VAR_* values or defaults
    #[arg(long, global = true)]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The command-line configuration layer.
    ///
    /// Flags that were not given stay `None` and never override lower
    /// layers. `--template-dir` and `--provider` are applied here too, so
    /// they also show up as "command line" in `config show`.
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            profile: self.profile.clone(),
            region: self.region.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            default_max_tokens: self.max_tokens,
            default_temperature: self.temperature,
            template_dir: self.template_dir.clone(),
            backend_command: None,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a template through the configured backend
    Run(RunArgs),

    /// List available templates
    List(ListArgs),

    /// Print a template definition
    Show(ShowArgs),

    /// Check a template for errors
    Validate(ValidateArgs),

    /// Create a template interactively
    Create(CreateArgs),

    /// Change fields of an existing template
    Edit(EditArgs),

    /// Delete a template
    Delete(DeleteArgs),

    /// Show or change configuration
    Config(ConfigArgs),

    /// Print the JSON Schema for template files
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Template to run
    pub name: String,

    /// Variable value as key=value (repeatable; later wins)
    #[arg(short = 'v', long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,

    /// Print output as it is generated
    #[arg(long)]
    pub stream: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ShowArgs {
    /// Template to show
    pub name: String,

    /// Show content with file inclusions expanded
    #[arg(long)]
    pub resolved: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ValidateArgs {
    /// Template to validate
    pub name: String,
}

/// Arguments for the `create` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CreateArgs {
    /// Name of the new template
    pub name: String,

    /// Template content (prompted for if omitted)
    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read template content from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Arguments for the `edit` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct EditArgs {
    /// Template to edit
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(id = "template_version", long = "template-version", value_name = "VERSION")]
    pub version: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// Provider recorded in the template
    #[arg(long = "set-provider", value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Model recorded in the template
    #[arg(long = "set-model", value_name = "MODEL")]
    pub model: Option<String>,

    #[arg(long)]
    pub content: Option<String>,
}

/// Arguments for the `delete` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DeleteArgs {
    /// Template to delete
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `config` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration and where each value came from
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a value and save it to the configuration file
    Set { key: String, value: String },

    /// Save the effective configuration to the configuration file
    Save,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

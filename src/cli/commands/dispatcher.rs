//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::config::ConfigResolver;
use crate::error::Result;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::config::ConfigCommand;
use super::create::CreateCommand;
use super::delete::DeleteCommand;
use super::edit::EditCommand;
use super::list::ListCommand;
use super::run::RunCommand;
use super::schema::SchemaCommand;
use super::show::ShowCommand;
use super::validate::ValidateCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
///
/// Owns the process configuration; commands receive a snapshot, except
/// `config` which may update and save it.
pub struct CommandDispatcher {
    resolver: ConfigResolver,
}

impl CommandDispatcher {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&mut self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.resolver.get_config();
        let template_dir = config.template_dir.clone();

        match &cli.command {
            Commands::Run(args) => RunCommand::new(config, args.clone())
                .with_provider(cli.provider.clone())
                .with_model(cli.model.clone())
                .execute(ui),
            Commands::List(args) => ListCommand::new(&template_dir, args.clone()).execute(ui),
            Commands::Show(args) => ShowCommand::new(&template_dir, args.clone()).execute(ui),
            Commands::Validate(args) => {
                ValidateCommand::new(&template_dir, args.clone()).execute(ui)
            }
            Commands::Create(args) => CreateCommand::new(config, args.clone()).execute(ui),
            Commands::Edit(args) => EditCommand::new(&template_dir, args.clone()).execute(ui),
            Commands::Delete(args) => DeleteCommand::new(&template_dir, args.clone()).execute(ui),
            Commands::Config(args) => {
                ConfigCommand::new(&mut self.resolver, args.clone()).execute(ui)
            }
            Commands::Schema => SchemaCommand::new().execute(ui),
            Commands::Completions(args) => CompletionsCommand::new(args.clone()).execute(ui),
        }
    }
}

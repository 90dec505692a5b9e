//! Shell completions generation.
//!
//! The `promptkit completions` command generates shell completion scripts.

use clap::CommandFactory;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Name completions are registered for.
const BIN_NAME: &str = "promptkit";

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    fn script(&self) -> String {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        clap_complete::generate(self.args.shell, &mut cmd, BIN_NAME, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl Command for CompletionsCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.output(&self.script());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use clap_complete::Shell;

    fn generate(shell: Shell) -> String {
        let mut ui = MockUI::new();
        CompletionsCommand::new(CompletionsArgs { shell })
            .execute(&mut ui)
            .unwrap();
        ui.output_text()
    }

    #[test]
    fn generates_bash_completions() {
        let output = generate(Shell::Bash);
        assert!(output.contains("promptkit"));
        assert!(output.contains("complete"));
    }

    #[test]
    fn zsh_completions_include_subcommands() {
        let output = generate(Shell::Zsh);
        assert!(output.contains("#compdef promptkit"));
        assert!(output.contains("validate"));
    }

    #[test]
    fn generates_fish_completions() {
        assert!(generate(Shell::Fish).contains("complete -c promptkit"));
    }
}

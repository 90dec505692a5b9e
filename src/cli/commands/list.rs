//! List command implementation.
//!
//! The `promptkit list` command lists templates with their descriptions.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::template::TemplateStore;
use crate::ui::{hints, Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// One line of `promptkit list`.
#[derive(Debug, Serialize)]
struct TemplateSummary {
    name: String,
    version: String,
    description: String,
}

/// The list command implementation.
pub struct ListCommand {
    template_dir: PathBuf,
    args: ListArgs,
}

impl ListCommand {
    pub fn new(template_dir: &Path, args: ListArgs) -> Self {
        Self {
            template_dir: template_dir.to_path_buf(),
            args,
        }
    }

    fn summaries(&self, ui: &mut dyn UserInterface) -> Result<Vec<TemplateSummary>> {
        let mut store = TemplateStore::new(&self.template_dir);
        let mut summaries = Vec::new();

        for name in store.list_templates()? {
            let summary = match store.get_template(&name) {
                Ok(Some(template)) => TemplateSummary {
                    name,
                    version: template.version,
                    description: template.description,
                },
                Ok(None) => continue,
                Err(e) => {
                    ui.warning(&format!("Skipping {}: {}", name, e));
                    continue;
                }
            };
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

impl Command for ListCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let summaries = self.summaries(ui)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&summaries).map_err(anyhow::Error::from)?;
            ui.output(&json);
            return Ok(CommandResult::success());
        }

        if summaries.is_empty() {
            ui.message(&format!("No templates in {}", self.template_dir.display()));
            ui.show_hint(hints::no_templates());
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["NAME", "VERSION", "DESCRIPTION"]);
        for summary in summaries {
            table.add_row(vec![summary.name, summary.version, summary.description]);
        }
        ui.output(&table.render());

        Ok(CommandResult::success())
    }
}

//! Schema command implementation.
//!
//! `promptkit schema` prints the JSON Schema for template files, for
//! editor integration.

use crate::error::Result;
use crate::template::SchemaGenerator;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
#[derive(Debug, Default)]
pub struct SchemaCommand {
    generator: SchemaGenerator,
}

impl SchemaCommand {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Command for SchemaCommand {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = self.generator.generate();
        let text = serde_json::to_string_pretty(&schema).map_err(anyhow::Error::from)?;
        ui.output(&text);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn prints_json_schema() {
        let mut ui = MockUI::new();
        SchemaCommand::new().execute(&mut ui).unwrap();

        let schema: serde_json::Value = serde_json::from_str(&ui.output_text()).unwrap();
        assert_eq!(schema["title"], "promptkit template");
        assert!(schema["properties"]["content"].is_object());
    }
}

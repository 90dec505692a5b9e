//! Config command implementation.
//!
//! `promptkit config show` prints every key with its effective value and
//! the layer that supplied it. `config set` adds one key to the
//! configuration file; `config save` writes the whole effective snapshot.

use serde_json::json;
use serde_yaml::Value;

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{ConfigOverrides, ConfigResolver, CONFIG_KEYS};
use crate::error::Result;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The config command implementation.
pub struct ConfigCommand<'a> {
    resolver: &'a mut ConfigResolver,
    args: ConfigArgs,
}

impl<'a> ConfigCommand<'a> {
    pub fn new(resolver: &'a mut ConfigResolver, args: ConfigArgs) -> Self {
        Self { resolver, args }
    }

    fn show(&self, json: bool, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let rows: Vec<(&str, Option<String>, &str)> = CONFIG_KEYS
            .iter()
            .map(|(key, _)| {
                let value = self.resolver.get_option(key, None).map(|v| display_value(&v));
                let source = self.resolver.source_of(key).unwrap_or("unset");
                (*key, value, source)
            })
            .collect();

        if json {
            let mut object = serde_json::Map::new();
            for (key, value, source) in &rows {
                object.insert(
                    key.to_string(),
                    json!({ "value": value, "source": source }),
                );
            }
            let text = serde_json::to_string_pretty(&object).map_err(anyhow::Error::from)?;
            ui.output(&text);
            return Ok(CommandResult::success());
        }

        match self.resolver.file_path() {
            Some(path) => ui.message(&format!("Config file: {}", path.display())),
            None => ui.message(&format!(
                "No config file; `promptkit config save` writes {}",
                self.resolver.save_path().display()
            )),
        }

        let mut table = Table::new(&["KEY", "VALUE", "SOURCE"]);
        for (key, value, source) in rows {
            table.add_row(vec![
                key.to_string(),
                value.unwrap_or_else(|| "-".to_string()),
                source.to_string(),
            ]);
        }
        ui.output(&table.render());

        Ok(CommandResult::success())
    }

    fn set(&mut self, key: &str, value: &str, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let partial = ConfigOverrides::from_assignment(key, value)?;
        let path = self.resolver.set_in_file(partial)?;
        ui.success(&format!("Set {} in {}", key, path.display()));
        Ok(CommandResult::success())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl Command for ConfigCommand<'_> {
    fn execute(&mut self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match self.args.action.clone() {
            ConfigAction::Show { json } => self.show(json, ui),
            ConfigAction::Set { key, value } => self.set(&key, &value, ui),
            ConfigAction::Save => {
                let path = self.resolver.save_config()?;
                ui.success(&format!("Saved configuration to {}", path.display()));
                Ok(CommandResult::success())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSources, CONFIG_FILE_NAME};
    use crate::error::PromptkitError;
    use crate::ui::MockUI;
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn resolver(cwd: &Path, env: &[(&str, &str)]) -> ConfigResolver {
        ConfigResolver::load(ConfigSources {
            cwd: cwd.to_path_buf(),
            home: None,
            env: env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            overrides: ConfigOverrides::default(),
        })
        .unwrap()
    }

    fn args(action: ConfigAction) -> ConfigArgs {
        ConfigArgs { action }
    }

    #[test]
    fn show_lists_values_with_sources() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "region: eu-west-1").unwrap();
        let mut resolver = resolver(temp.path(), &[("PROMPTKIT_MODEL", "large")]);

        let mut ui = MockUI::new();
        ConfigCommand::new(&mut resolver, args(ConfigAction::Show { json: true }))
            .execute(&mut ui)
            .unwrap();

        let shown: serde_json::Value = serde_json::from_str(&ui.output_text()).unwrap();
        assert_eq!(shown["model"]["value"], "large");
        assert_eq!(shown["model"]["source"], "environment");
        assert_eq!(shown["region"]["value"], "eu-west-1");
        assert_eq!(shown["default_max_tokens"]["value"], "2048");
        assert_eq!(shown["default_max_tokens"]["source"], "defaults");
        assert!(shown["profile"]["value"].is_null());
    }

    #[test]
    fn show_table_names_save_path_without_file() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(temp.path(), &[]);

        let mut ui = MockUI::new();
        ConfigCommand::new(&mut resolver, args(ConfigAction::Show { json: false }))
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_message("No config file"));
        assert!(ui.output_text().contains("default_temperature"));
    }

    #[test]
    fn set_updates_and_persists() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(temp.path(), &[]);

        let mut ui = MockUI::new();
        ConfigCommand::new(
            &mut resolver,
            args(ConfigAction::Set {
                key: "default_max_tokens".to_string(),
                value: "512".to_string(),
            }),
        )
        .execute(&mut ui)
        .unwrap();

        assert_eq!(resolver.get_config().default_max_tokens, 512);
        let saved = fs::read_to_string(temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(saved.contains("default_max_tokens: 512"));
    }

    #[test]
    fn set_does_not_persist_environment_values() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(temp.path(), &[("PROMPTKIT_DEFAULT_MAX_TOKENS", "4096")]);

        let mut ui = MockUI::new();
        ConfigCommand::new(
            &mut resolver,
            args(ConfigAction::Set {
                key: "region".to_string(),
                value: "eu".to_string(),
            }),
        )
        .execute(&mut ui)
        .unwrap();

        let saved = fs::read_to_string(temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(saved.trim(), "region: eu");
        assert_eq!(resolver.get_config().default_max_tokens, 4096);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(temp.path(), &[]);

        let mut ui = MockUI::new();
        let result = ConfigCommand::new(
            &mut resolver,
            args(ConfigAction::Set {
                key: "colour".to_string(),
                value: "blue".to_string(),
            }),
        )
        .execute(&mut ui);

        assert!(matches!(result, Err(PromptkitError::ConfigLoad { .. })));
        assert!(!temp.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn save_writes_snapshot() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver(temp.path(), &[("PROMPTKIT_REGION", "ap-south-1")]);

        let mut ui = MockUI::new();
        ConfigCommand::new(&mut resolver, args(ConfigAction::Save))
            .execute(&mut ui)
            .unwrap();

        let saved = fs::read_to_string(temp.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(saved.contains("region: ap-south-1"));
        assert!(ui.has_success("Saved configuration"));
    }
}

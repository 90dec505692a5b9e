//! Template storage.
//!
//! Templates live one per file as `<name>.yaml` in a single directory.
//! File existence is the source of truth: there is no index.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{PromptkitError, Result};

use super::cast::{cast_value, VariableMap, VariableValue};
use super::inclusion::InclusionResolver;
use super::schema::{TemplateDefinition, TemplatePatch};
use super::token::variable_names;

/// File extension for template definitions.
pub const TEMPLATE_EXTENSION: &str = "yaml";

/// Reads and writes template definitions in a directory.
///
/// # Example
///
/// ```
/// use promptkit::template::{TemplateDefinition, TemplateStore};
/// use tempfile::TempDir;
///
/// let temp = TempDir::new().unwrap();
/// let mut store = TemplateStore::new(temp.path());
/// store.init().unwrap();
///
/// let template = TemplateDefinition {
///     name: "hello".to_string(),
///     content: "Hello!".to_string(),
///     ..Default::default()
/// };
/// store.save_template(&template).unwrap();
///
/// let loaded = store.get_template("hello").unwrap().unwrap();
/// assert_eq!(loaded.resolved_content.as_deref(), Some("Hello!"));
/// assert!(store.get_template("missing").unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
    inclusions: InclusionResolver,
}

impl TemplateStore {
    /// Create a store for the given directory.
    ///
    /// The directory is not touched until [`TemplateStore::init`] or a write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            inclusions: InclusionResolver::new(&dir),
            dir,
        }
    }

    /// The template directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the template directory exists.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            PromptkitError::manager(format!(
                "cannot create template directory {}: {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// List template names, sorted.
    ///
    /// A missing directory has no templates.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(PromptkitError::manager(format!(
                    "cannot read template directory {}: {}",
                    self.dir.display(),
                    e
                )))
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PromptkitError::manager(e.to_string()))?.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
            {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Load a template and expand its inclusions.
    ///
    /// Returns `Ok(None)` if no such template exists.
    ///
    /// # Errors
    ///
    /// Returns `TemplateManager` for unreadable or unparseable files, and
    /// `FileInclusion`/`InclusionCycle` if inclusion resolution fails.
    pub fn get_template(&mut self, name: &str) -> Result<Option<TemplateDefinition>> {
        let Some(mut template) = self.read_definition(name)? else {
            return Ok(None);
        };

        template.resolved_content = Some(self.inclusions.resolve(&template.content)?);
        Ok(Some(template))
    }

    /// Write a template to `<name>.yaml`, creating the directory if needed.
    ///
    /// `resolved_content` is never written.
    pub fn save_template(&self, template: &TemplateDefinition) -> Result<()> {
        let path = self.template_path(&template.name)?;
        self.init()?;

        let yaml = serde_yaml::to_string(template).map_err(|e| {
            PromptkitError::manager(format!("cannot serialize '{}': {}", template.name, e))
        })?;
        fs::write(&path, yaml).map_err(|e| {
            PromptkitError::manager(format!("cannot write {}: {}", path.display(), e))
        })?;

        tracing::debug!("Saved template {} to {}", template.name, path.display());
        Ok(())
    }

    /// Delete a template.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTemplate` if it does not exist.
    pub fn delete_template(&self, name: &str) -> Result<()> {
        let path = self.template_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(PromptkitError::UnknownTemplate {
                name: name.to_string(),
            }),
            Err(e) => Err(PromptkitError::manager(format!(
                "cannot delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Merge `patch` over the stored template and save it.
    ///
    /// Returns the updated definition (without resolved content).
    pub fn update_template(
        &mut self,
        name: &str,
        patch: TemplatePatch,
    ) -> Result<TemplateDefinition> {
        let mut template =
            self.read_definition(name)?
                .ok_or_else(|| PromptkitError::UnknownTemplate {
                    name: name.to_string(),
                })?;

        patch.apply(&mut template);
        self.save_template(&template)?;
        Ok(template)
    }

    /// Expand `{{file: ...}}` tokens in arbitrary content against this
    /// store's directory.
    pub fn resolve_content(&mut self, content: &str) -> Result<String> {
        self.inclusions.resolve(content)
    }

    /// Check whether `<name>.yaml` exists.
    pub fn template_exists(&self, name: &str) -> bool {
        self.template_path(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Build the variable map for a run from `key=value` arguments.
    ///
    /// Every `{{name}}` in the content, including transitively included
    /// files, is considered. Supplied values are cast to their declared
    /// type (undeclared keys stay strings). Tokens that are neither
    /// supplied nor declared get an empty placeholder. Declared variables
    /// that were not supplied are left out so the executor can resolve
    /// them. Later duplicates of a key win.
    pub fn parse_variables(
        &mut self,
        raw_args: &[String],
        template: &TemplateDefinition,
    ) -> Result<VariableMap> {
        let mut supplied: IndexMap<String, String> = IndexMap::new();
        for arg in raw_args {
            let (key, value) = parse_assignment(arg)?;
            supplied.insert(key, value);
        }

        let resolved = match &template.resolved_content {
            Some(resolved) => resolved.clone(),
            None => self.inclusions.resolve(&template.content)?,
        };

        let mut variables = VariableMap::new();
        for name in variable_names(&resolved) {
            if let Some(raw) = supplied.shift_remove(&name) {
                let value = cast_declared(template, &name, &raw)?;
                variables.insert(name, value);
            } else if !template.input_variables.contains_key(&name) {
                variables.insert(name, VariableValue::String(String::new()));
            }
        }

        for (name, raw) in supplied {
            let value = cast_declared(template, &name, &raw)?;
            variables.insert(name, value);
        }

        Ok(variables)
    }

    fn read_definition(&self, name: &str) -> Result<Option<TemplateDefinition>> {
        let path = self.template_path(name)?;

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PromptkitError::manager(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::debug!("Loaded template {} from {}", name, path.display());

        serde_yaml::from_str(&content).map(Some).map_err(|e| {
            PromptkitError::manager(format!("cannot parse {}: {}", path.display(), e))
        })
    }

    fn template_path(&self, name: &str) -> Result<PathBuf> {
        if name.trim().is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(PromptkitError::manager(format!(
                "invalid template name '{}'",
                name
            )));
        }
        Ok(self.dir.join(format!("{}.{}", name, TEMPLATE_EXTENSION)))
    }
}

/// Split a `key=value` argument. The value may itself contain `=`.
pub fn parse_assignment(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(PromptkitError::InputValidation {
            key: arg.to_string(),
            value: String::new(),
            message: "expected key=value".to_string(),
        }),
    }
}

fn cast_declared(template: &TemplateDefinition, name: &str, raw: &str) -> Result<VariableValue> {
    match template.input_variables.get(name) {
        Some(spec) => cast_value(name, raw, &spec.var_type),
        None => Ok(VariableValue::String(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::schema::{Parameters, VariableSpec};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample(name: &str) -> TemplateDefinition {
        let mut input_variables = IndexMap::new();
        input_variables.insert(
            "topic".to_string(),
            VariableSpec::new("string", "What to write about"),
        );
        input_variables.insert(
            "count".to_string(),
            VariableSpec::new("number", "How many items").with_default(json!(3)),
        );

        let mut params = IndexMap::new();
        params.insert("max_tokens".to_string(), json!(256));
        params.insert("temperature".to_string(), json!(0.3));

        TemplateDefinition {
            name: name.to_string(),
            version: "1.0".to_string(),
            description: "List ideas".to_string(),
            author: "tester".to_string(),
            provider: "echo".to_string(),
            model: "none".to_string(),
            content: "Give {{count}} ideas about {{topic}}.".to_string(),
            resolved_content: None,
            input_variables,
            output_variables: IndexMap::new(),
            parameters: Some(Parameters(params)),
        }
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn init_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("templates");
        let store = TemplateStore::new(&dir);

        store.init().unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn init_fails_when_path_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        fs::write(&file, "").unwrap();
        let store = TemplateStore::new(&file);

        assert!(matches!(
            store.init(),
            Err(PromptkitError::TemplateManager { .. })
        ));
    }

    #[test]
    fn save_then_get_round_trips() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let template = sample("ideas");

        store.save_template(&template).unwrap();
        let mut loaded = store.get_template("ideas").unwrap().unwrap();

        assert_eq!(
            loaded.resolved_content.as_deref(),
            Some("Give {{count}} ideas about {{topic}}.")
        );
        loaded.resolved_content = None;
        assert_eq!(loaded, template);
    }

    #[test]
    fn get_missing_template_is_none() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        assert!(store.get_template("ghost").unwrap().is_none());
    }

    #[test]
    fn get_unparseable_template_is_an_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("broken.yaml"), "name: [unclosed").unwrap();
        let mut store = TemplateStore::new(temp.path());

        assert!(matches!(
            store.get_template("broken"),
            Err(PromptkitError::TemplateManager { .. })
        ));
    }

    #[test]
    fn get_template_resolves_inclusions() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("rules.md"), "Be brief.").unwrap();
        let mut store = TemplateStore::new(temp.path());
        let mut template = sample("ideas");
        template.content = "{{file: rules.md}} About {{topic}}".to_string();
        store.save_template(&template).unwrap();

        let loaded = store.get_template("ideas").unwrap().unwrap();
        assert_eq!(
            loaded.resolved_content.as_deref(),
            Some("Be brief. About {{topic}}")
        );
        assert_eq!(loaded.content, "{{file: rules.md}} About {{topic}}");
    }

    #[test]
    fn list_templates_only_returns_yaml_files() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path());
        store.save_template(&sample("b")).unwrap();
        store.save_template(&sample("a")).unwrap();
        fs::write(temp.path().join("notes.md"), "ignore me").unwrap();

        assert_eq!(store.list_templates().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn list_templates_on_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path().join("absent"));
        assert!(store.list_templates().unwrap().is_empty());
    }

    #[test]
    fn exists_and_delete() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path());
        store.save_template(&sample("gone")).unwrap();

        assert!(store.template_exists("gone"));
        store.delete_template("gone").unwrap();
        assert!(!store.template_exists("gone"));
        assert!(matches!(
            store.delete_template("gone"),
            Err(PromptkitError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn update_merges_over_existing() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        store.save_template(&sample("ideas")).unwrap();

        let patch = TemplatePatch {
            description: Some("Brainstorm".to_string()),
            ..Default::default()
        };
        let updated = store.update_template("ideas", patch).unwrap();
        assert_eq!(updated.description, "Brainstorm");
        assert_eq!(updated.author, "tester");

        let loaded = store.get_template("ideas").unwrap().unwrap();
        assert_eq!(loaded.description, "Brainstorm");
    }

    #[test]
    fn update_missing_template_fails() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        assert!(matches!(
            store.update_template("nope", TemplatePatch::default()),
            Err(PromptkitError::UnknownTemplate { .. })
        ));
    }

    #[test]
    fn names_with_separators_are_rejected() {
        let temp = TempDir::new().unwrap();
        let store = TemplateStore::new(temp.path());
        let mut template = sample("x");
        template.name = "../escape".to_string();

        assert!(store.save_template(&template).is_err());
        assert!(!store.template_exists("../escape"));
        assert!(store.delete_template("..").is_err());
    }

    #[test]
    fn names_with_inner_dots_are_allowed() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        store.save_template(&sample("v1..2")).unwrap();

        assert!(store.template_exists("v1..2"));
        assert_eq!(store.get_template("v1..2").unwrap().unwrap().name, "v1..2");
        assert_eq!(store.list_templates().unwrap(), ["v1..2"]);
    }

    #[test]
    fn parse_variables_casts_declared_values() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let template = sample("ideas");

        let vars = store
            .parse_variables(&args(&["count=5", "topic=rust"]), &template)
            .unwrap();
        assert_eq!(vars["count"], VariableValue::Number(5.0));
        assert_eq!(vars["topic"], VariableValue::String("rust".to_string()));
    }

    #[test]
    fn parse_variables_rejects_bad_cast() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let template = sample("ideas");

        let err = store
            .parse_variables(&args(&["count=lots"]), &template)
            .unwrap_err();
        assert!(matches!(err, PromptkitError::InputValidation { .. }));
    }

    #[test]
    fn parse_variables_leaves_declared_unsupplied_absent() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let template = sample("ideas");

        let vars = store.parse_variables(&args(&["topic=x"]), &template).unwrap();
        assert!(!vars.contains_key("count"));
    }

    #[test]
    fn parse_variables_fills_undeclared_tokens_with_placeholder() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let mut template = sample("ideas");
        template.content.push_str(" {{extra}}");

        let vars = store.parse_variables(&[], &template).unwrap();
        assert_eq!(vars["extra"], VariableValue::String(String::new()));
    }

    #[test]
    fn parse_variables_scans_included_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("tone.md"), "Use a {{tone}} tone.").unwrap();
        let mut store = TemplateStore::new(temp.path());
        let mut template = sample("ideas");
        template.content = "{{file: tone.md}} {{topic}}".to_string();

        let vars = store
            .parse_variables(&args(&["tone=warm"]), &template)
            .unwrap();
        assert_eq!(vars["tone"], VariableValue::String("warm".to_string()));
    }

    #[test]
    fn parse_variables_later_duplicates_win() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let template = sample("ideas");

        let vars = store
            .parse_variables(&args(&["topic=first", "topic=second"]), &template)
            .unwrap();
        assert_eq!(vars["topic"], VariableValue::String("second".to_string()));
    }

    #[test]
    fn parse_variables_keeps_supplied_keys_not_in_content() {
        let temp = TempDir::new().unwrap();
        let mut store = TemplateStore::new(temp.path());
        let template = sample("ideas");

        let vars = store
            .parse_variables(&args(&["unused=1"]), &template)
            .unwrap();
        assert_eq!(vars["unused"], VariableValue::String("1".to_string()));
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        assert_eq!(
            parse_assignment("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=value").is_err());
    }
}

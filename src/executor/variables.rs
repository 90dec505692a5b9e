//! Sources of values for declared variables that were not supplied.

use std::collections::HashMap;

use crate::error::{PromptkitError, Result};
use crate::template::{InputType, VariableSpec};
use crate::ui::{Prompt, PromptType, UserInterface};

/// Supplies raw text for a missing input variable.
///
/// The executor casts the answer to the declared type.
pub trait VariableResolver {
    fn resolve(&mut self, name: &str, spec: &VariableSpec) -> Result<String>;
}

/// Asks the user through the UI, offering the declared default.
pub struct PromptingResolver<'a> {
    ui: &'a mut dyn UserInterface,
}

impl<'a> PromptingResolver<'a> {
    pub fn new(ui: &'a mut dyn UserInterface) -> Self {
        Self { ui }
    }
}

impl VariableResolver for PromptingResolver<'_> {
    fn resolve(&mut self, name: &str, spec: &VariableSpec) -> Result<String> {
        let question = if spec.description.is_empty() {
            name.to_string()
        } else {
            format!("{} ({})", spec.description, name)
        };
        let prompt_type = match InputType::parse(&spec.var_type) {
            Some(InputType::Boolean) => PromptType::Confirm,
            _ => PromptType::Input,
        };

        let answer = self.ui.prompt(&Prompt {
            key: name.to_string(),
            question,
            prompt_type,
            default: spec.default_as_raw(),
        })?;
        Ok(answer.as_string())
    }
}

/// Answers from a fixed map, falling back to declared defaults.
#[derive(Debug, Clone, Default)]
pub struct FixedResolver {
    answers: HashMap<String, String>,
}

impl FixedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(name.into(), value.into());
        self
    }
}

impl FromIterator<(String, String)> for FixedResolver {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

impl VariableResolver for FixedResolver {
    fn resolve(&mut self, name: &str, spec: &VariableSpec) -> Result<String> {
        self.answers
            .get(name)
            .cloned()
            .or_else(|| spec.default_as_raw())
            .ok_or_else(|| PromptkitError::InputValidation {
                key: name.to_string(),
                value: String::new(),
                message: "no value supplied and no default declared".to_string(),
            })
    }
}

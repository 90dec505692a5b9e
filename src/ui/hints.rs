//! Hints suggesting the next command to run.

/// After a template is created or edited.
pub fn after_save(name: &str) -> String {
    format!("Run `promptkit run {}` to try it.", name)
}

/// When the template directory holds no templates.
pub fn no_templates() -> &'static str {
    "Create one with `promptkit create <name>`."
}

/// When a template name is not found.
pub fn unknown_template() -> &'static str {
    "Run `promptkit list` to see available templates."
}

/// After a template fails validation.
pub fn after_invalid(name: &str) -> String {
    format!("Fix it with `promptkit edit {}` or in your editor.", name)
}

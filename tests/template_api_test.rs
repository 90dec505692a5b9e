//! Integration tests for the template, executor and backend public API.

use promptkit::backend::{create_backend, GenerationOptions, Provider};
use promptkit::config::EffectiveConfig;
use promptkit::executor::{ExecutionContext, FixedResolver, TemplateExecutor};
use promptkit::template::{
    cast_value, validate, TemplateDefinition, TemplateStore, VariableSpec, VariableValue,
};
use promptkit::PromptkitError;
use std::fs;
use tempfile::TempDir;

fn template(name: &str, content: &str, vars: &[(&str, &str)]) -> TemplateDefinition {
    let mut template = TemplateDefinition {
        name: name.to_string(),
        version: "1.0.0".to_string(),
        description: "test template".to_string(),
        author: "tests".to_string(),
        provider: "echo".to_string(),
        model: "none".to_string(),
        content: content.to_string(),
        ..Default::default()
    };
    for (var, var_type) in vars {
        template
            .input_variables
            .insert(var.to_string(), VariableSpec::new(*var_type, "a variable"));
    }
    template
}

#[test]
fn save_then_get_round_trips_except_resolved_content() {
    let temp = TempDir::new().unwrap();
    let mut store = TemplateStore::new(temp.path());
    let original = template("t", "Count {{n}}", &[("n", "number")]);

    store.save_template(&original).unwrap();
    let mut loaded = store.get_template("t").unwrap().unwrap();

    assert_eq!(loaded.resolved_content.as_deref(), Some("Count {{n}}"));
    loaded.resolved_content = None;
    assert_eq!(loaded, original);
}

#[test]
fn inclusion_cycle_is_reported() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.md"), "A {{file: b.md}}").unwrap();
    fs::write(temp.path().join("b.md"), "B {{file: a.md}}").unwrap();

    let mut store = TemplateStore::new(temp.path());
    store
        .save_template(&template("loop", "{{file: a.md}}", &[]))
        .unwrap();

    let result = store.get_template("loop");
    assert!(matches!(result, Err(PromptkitError::InclusionCycle { .. })));
}

#[test]
fn sibling_inclusions_of_same_file_are_allowed() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("part.md"), "x").unwrap();

    let mut store = TemplateStore::new(temp.path());
    store
        .save_template(&template("twice", "{{file: part.md}}-{{file: part.md}}", &[]))
        .unwrap();

    let loaded = store.get_template("twice").unwrap().unwrap();
    assert_eq!(loaded.effective_content(), "x-x");
}

#[test]
fn casting_follows_declared_types() {
    assert!(matches!(
        cast_value("n", "42", "number").unwrap(),
        VariableValue::Number(n) if n == 42.0
    ));
    assert!(matches!(
        cast_value("n", "abc", "number"),
        Err(PromptkitError::InputValidation { .. })
    ));
}

#[test]
fn validation_requires_exact_variable_agreement() {
    let unused = template("t", "no variables here", &[("x", "string")]);
    assert!(validate(&unused).is_err());

    let undeclared = template("t", "uses {{y}}", &[]);
    assert!(validate(&undeclared).is_err());

    let good = template("t", "uses {{x}}", &[("x", "string")]);
    assert!(validate(&good).is_ok());
}

#[test]
fn run_pipeline_with_echo_backend() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("footer.md"), "Reply in {{lang}}.").unwrap();

    let mut store = TemplateStore::new(temp.path());
    store
        .save_template(&template(
            "qa",
            "Q: {{question}} ({{n}} words)\n{{file: footer.md}}",
            &[("question", "string"), ("n", "number"), ("lang", "string")],
        ))
        .unwrap();

    let loaded = store.get_template("qa").unwrap().unwrap();
    validate(&loaded).unwrap();

    let variables = store
        .parse_variables(&["question=Why?".to_string(), "n=50".to_string()], &loaded)
        .unwrap();

    let config = EffectiveConfig::with_home(Some(temp.path()));
    let backend = create_backend(Provider::Echo, &config).unwrap();
    let options = GenerationOptions::from_config(&config).with_parameters(loaded.parameters.as_ref());
    let context = ExecutionContext::new(loaded, backend, options).with_variables(variables);

    let mut resolver = FixedResolver::new().with_answer("lang", "French");
    let mut sink = Vec::new();
    let text = TemplateExecutor::new(&mut resolver)
        .execute(context, &mut sink)
        .unwrap();

    assert_eq!(text, "Q: Why? (50 words)\nReply in French.");
}

#[test]
fn command_provider_requires_a_command() {
    let config = EffectiveConfig::with_home(None);
    assert!(create_backend(Provider::Command, &config).is_err());
    assert!("unknown".parse::<Provider>().is_err());
}

//! Template definitions, storage, resolution and validation.
//!
//! This module handles everything about a template before it is sent to
//! a backend:
//! - Schema definitions in [`schema`]
//! - Content tokenizing in [`token`]
//! - Recursive file inclusion in [`inclusion`]
//! - Variable casting in [`cast`]
//! - Directory-backed storage in [`store`]
//! - Validation in [`validator`]
//! - JSON Schema for template files in [`json_schema`]

pub mod cast;
pub mod inclusion;
pub mod json_schema;
pub mod schema;
pub mod store;
pub mod token;
pub mod validator;

pub use cast::{cast_as, cast_value, VariableMap, VariableValue};
pub use inclusion::InclusionResolver;
pub use json_schema::SchemaGenerator;
pub use schema::{
    InputType, OutputType, Parameters, TemplateDefinition, TemplatePatch, VariableSpec,
};
pub use store::{parse_assignment, TemplateStore, TEMPLATE_EXTENSION};
pub use token::{inclusion_paths, is_variable_name, tokenize, variable_names, Segment};
pub use validator::validate;

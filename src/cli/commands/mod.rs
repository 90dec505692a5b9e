//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which owns the
//! [`ConfigResolver`](crate::config::ConfigResolver) and hands each
//! command what it needs.

pub mod completions;
pub mod config;
pub mod create;
pub mod delete;
pub mod dispatcher;
pub mod edit;
pub mod list;
pub mod run;
pub mod schema;
pub mod show;
pub mod validate;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

use crate::error::{PromptkitError, Result};
use crate::template::{TemplateDefinition, TemplateStore};

/// Load a template, treating absence as an error.
fn require_template(store: &mut TemplateStore, name: &str) -> Result<TemplateDefinition> {
    store
        .get_template(name)?
        .ok_or_else(|| PromptkitError::UnknownTemplate {
            name: name.to_string(),
        })
}

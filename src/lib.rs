//! promptkit - Reusable, parameterized prompt templates.
//!
//! Templates are YAML files holding prompt text with `{{variable}}` and
//! `{{file: path}}` tokens, typed variable declarations, and generation
//! parameters. promptkit stores and validates them, fills in variables,
//! and sends the result to a generation backend.
//!
//! # Modules
//!
//! - [`backend`] - Generation backends and provider selection
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Layered configuration with source tracking
//! - [`error`] - Error types and result aliases
//! - [`executor`] - Variable resolution, substitution and generation
//! - [`template`] - Template schema, storage, inclusion and validation
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use promptkit::executor::substitute;
//! use promptkit::template::{VariableMap, VariableValue};
//!
//! let mut vars = VariableMap::new();
//! vars.insert("name".to_string(), VariableValue::String("Ada".to_string()));
//!
//! let text = substitute("Hi {{name}}, see {{file: notes.md}}", &vars);
//! assert_eq!(text, "Hi Ada, see {{file: notes.md}}");
//! ```
//!
//! For end-to-end runs, see the integration tests.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod template;
pub mod ui;

pub use error::{PromptkitError, Result};

//! Layered configuration for promptkit.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Source-tracked layers in [`env_layer`]
//! - The process-wide resolver in [`resolver`]
//!
//! # Configuration Precedence
//!
//! Lowest to highest:
//! 1. Built-in defaults
//! 2. `.promptkit.yaml` (working directory, else home directory)
//! 3. `PROMPTKIT_*` environment variables
//! 4. Command-line flags

pub mod env_layer;
pub mod loader;
pub mod merger;
pub mod resolver;
pub mod schema;

pub use env_layer::{ConfigLayer, LayerStack, ENV_MAPPINGS, ENV_PREFIX};
pub use loader::{find_config_file, load_config_layer};
pub use merger::{deep_merge, merge_layers};
pub use resolver::{ConfigObserver, ConfigResolver, ConfigSources};
pub use schema::{
    coerce, expand_home, expand_path_keys, value_kind, ConfigOverrides, EffectiveConfig, ValueKind,
    CONFIG_FILE_NAME, CONFIG_KEYS,
};

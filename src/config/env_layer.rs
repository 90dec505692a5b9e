//! Configuration layers with source tracking.
//!
//! Each source of configuration (defaults, file, environment, command
//! line, runtime updates) becomes a [`ConfigLayer`]. A [`LayerStack`]
//! holds them in precedence order and remembers where every key came from.

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

use super::merger::merge_layers;
use super::schema::coerce;

/// Prefix reserved for promptkit environment variables.
pub const ENV_PREFIX: &str = "PROMPTKIT_";

/// Environment variable to configuration key mapping.
pub const ENV_MAPPINGS: [(&str, &str); 8] = [
    ("PROMPTKIT_PROFILE", "profile"),
    ("PROMPTKIT_REGION", "region"),
    ("PROMPTKIT_PROVIDER", "provider"),
    ("PROMPTKIT_MODEL", "model"),
    ("PROMPTKIT_DEFAULT_MAX_TOKENS", "default_max_tokens"),
    ("PROMPTKIT_DEFAULT_TEMPERATURE", "default_temperature"),
    ("PROMPTKIT_TEMPLATE_DIR", "template_dir"),
    ("PROMPTKIT_BACKEND_COMMAND", "backend_command"),
];

/// One source of configuration values.
///
/// # Example
///
/// ```
/// use promptkit::config::ConfigLayer;
///
/// let mut layer = ConfigLayer::new("file");
/// layer.set("model", "large");
///
/// assert!(layer.contains("model"));
/// assert_eq!(layer.source, "file");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLayer {
    /// Values defined by this layer.
    pub values: Mapping,
    /// Source of this layer (for display and debugging).
    pub source: String,
}

impl ConfigLayer {
    /// Create an empty layer with the given source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            values: Mapping::new(),
            source: source.into(),
        }
    }

    /// Create a layer from an existing mapping.
    pub fn from_mapping(source: impl Into<String>, values: Mapping) -> Self {
        Self {
            values,
            source: source.into(),
        }
    }

    /// Build the environment layer from `PROMPTKIT_*` variables.
    ///
    /// Only names in [`ENV_MAPPINGS`] are read; numeric and path keys are
    /// coerced, with `~` in paths expanded against `home`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigLoad` if a numeric variable does not parse.
    pub fn from_env(vars: &HashMap<String, String>, home: Option<&Path>) -> Result<Self> {
        let mut layer = Self::new("environment");
        for (env_name, key) in ENV_MAPPINGS {
            if let Some(raw) = vars.get(env_name) {
                let value = coerce(key, raw, env_name, home)?;
                layer.values.insert(Value::String(key.to_string()), value);
            }
        }
        Ok(layer)
    }

    /// Define a value in this layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(Value::String(key.into()), value.into());
    }

    /// Check whether this layer defines `key` (null counts as undefined).
    pub fn contains(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| !v.is_null())
    }

    /// Number of keys in this layer.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if this layer is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Configuration layers in precedence order.
///
/// The first layer pushed has lowest priority, the last has highest.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<ConfigLayer>,
}

impl LayerStack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self { layers: vec![] }
    }

    /// Add a layer above all existing ones.
    pub fn push(&mut self, layer: ConfigLayer) {
        self.layers.push(layer);
    }

    /// Get the effective value of a key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.contains(key))
            .and_then(|layer| layer.values.get(key))
    }

    /// Merge all layers into one mapping value.
    pub fn resolve(&self) -> Value {
        merge_layers(self.layers.iter().map(|layer| &layer.values))
    }

    /// Name of the highest layer that defines `key`.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.contains(key))
            .map(|layer| layer.source.as_str())
    }

    /// All layers, lowest priority first.
    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }
}

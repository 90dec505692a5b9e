//! Precedence merge for configuration layers.
//!
//! Configuration is layered: defaults, file, environment, command line.
//! This module implements how a higher layer lands on a lower one.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Null values in an overlay are ignored (they never erase a lower value)
//! - Anything else in the overlay replaces the base value

use serde_yaml::{Mapping, Value};

/// Merge `overlay` on top of `base`.
///
/// # Example
///
/// ```
/// use promptkit::config::deep_merge;
///
/// let base: serde_yaml::Value = serde_yaml::from_str("model: small\nregion: eu").unwrap();
/// let overlay: serde_yaml::Value = serde_yaml::from_str("model: large\nregion: ~").unwrap();
///
/// let merged = deep_merge(&base, &overlay);
/// assert_eq!(merged["model"], "large");
/// assert_eq!(merged["region"], "eu");
/// ```
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    continue;
                }
                let merged = match base_map.get(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }

            Value::Mapping(result)
        }

        // An empty file parses to null: no changes.
        (base, Value::Null) => base.clone(),

        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order (later overrides earlier).
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Mapping>) -> Value {
    layers
        .into_iter()
        .fold(Value::Mapping(Mapping::new()), |acc, layer| {
            deep_merge(&acc, &Value::Mapping(layer.clone()))
        })
}

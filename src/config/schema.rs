//! Configuration schema definitions.
//!
//! [`EffectiveConfig`] is the flattened, fully-resolved configuration.
//! [`ConfigOverrides`] is a partial layer: only fields that are `Some`
//! take part in a merge.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PromptkitError, Result};

/// Name of the configuration file, looked up in the working directory and
/// then the home directory.
pub const CONFIG_FILE_NAME: &str = ".promptkit.yaml";

/// Fully resolved configuration for one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectiveConfig {
    /// Credential profile handed to backends that need one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Backend used when neither the CLI nor the template names one.
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub default_max_tokens: u64,

    pub default_temperature: f64,

    /// Directory holding `<name>.yaml` template files.
    pub template_dir: PathBuf,

    /// Shell command run by the `command` backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_command: Option<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self::with_home(dirs::home_dir().as_deref())
    }
}

impl EffectiveConfig {
    /// Built-in defaults for a given home directory.
    pub fn with_home(home: Option<&Path>) -> Self {
        let template_dir = home
            .map(|h| h.join(".promptkit").join("templates"))
            .unwrap_or_else(|| PathBuf::from(".promptkit").join("templates"));

        Self {
            profile: None,
            region: None,
            provider: "echo".to_string(),
            model: None,
            default_max_tokens: 2048,
            default_temperature: 0.7,
            template_dir,
            backend_command: None,
        }
    }
}

/// How a raw text value for a key is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Path,
}

/// Every recognized configuration key and its value kind.
pub const CONFIG_KEYS: [(&str, ValueKind); 8] = [
    ("profile", ValueKind::Text),
    ("region", ValueKind::Text),
    ("provider", ValueKind::Text),
    ("model", ValueKind::Text),
    ("default_max_tokens", ValueKind::Integer),
    ("default_temperature", ValueKind::Float),
    ("template_dir", ValueKind::Path),
    ("backend_command", ValueKind::Text),
];

/// Look up the value kind of a configuration key.
pub fn value_kind(key: &str) -> Option<ValueKind> {
    CONFIG_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
}

/// A partial configuration layer.
///
/// Serializes to a mapping holding only the defined keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_command: Option<String>,
}

impl ConfigOverrides {
    /// Build a single-key override from `key` and raw text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigLoad` for an unknown key or a value that does not
    /// coerce to the key's kind.
    pub fn from_assignment(key: &str, raw: &str) -> Result<Self> {
        let value = coerce(key, raw, "command line", dirs::home_dir().as_deref())?;
        let mut mapping = serde_yaml::Mapping::new();
        mapping.insert(serde_yaml::Value::String(key.to_string()), value);
        serde_yaml::from_value(serde_yaml::Value::Mapping(mapping)).map_err(|e| {
            PromptkitError::ConfigLoad {
                origin: "command line".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Check whether any key is defined.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The defined keys as a YAML mapping.
    pub fn to_mapping(&self) -> serde_yaml::Mapping {
        match serde_yaml::to_value(self) {
            Ok(serde_yaml::Value::Mapping(mapping)) => mapping,
            _ => serde_yaml::Mapping::new(),
        }
    }
}

/// Coerce raw text to the YAML value for a configuration key.
///
/// `origin` names where the text came from, for error messages. Path
/// values have a leading `~` expanded against `home`.
pub fn coerce(
    key: &str,
    raw: &str,
    origin: &str,
    home: Option<&Path>,
) -> Result<serde_yaml::Value> {
    let kind = value_kind(key).ok_or_else(|| PromptkitError::ConfigLoad {
        origin: origin.to_string(),
        message: format!("unknown configuration key '{}'", key),
    })?;

    let invalid = |expected: &str| PromptkitError::ConfigLoad {
        origin: origin.to_string(),
        message: format!("{} must be {}, got '{}'", key, expected, raw),
    };

    let value = match kind {
        ValueKind::Text => serde_yaml::Value::String(raw.to_string()),
        ValueKind::Integer => {
            let n: u64 = raw.trim().parse().map_err(|_| invalid("a whole number"))?;
            serde_yaml::Value::Number(n.into())
        }
        ValueKind::Float => {
            let f: f64 = raw.trim().parse().map_err(|_| invalid("a number"))?;
            if !f.is_finite() {
                return Err(invalid("a finite number"));
            }
            serde_yaml::Value::Number(f.into())
        }
        ValueKind::Path => {
            serde_yaml::Value::String(expand_home(raw, home).to_string_lossy().to_string())
        }
    };
    Ok(value)
}

/// Expand a leading `~` to `home`. Without a home the path is unchanged.
pub fn expand_home(raw: &str, home: Option<&Path>) -> PathBuf {
    match (home, raw.strip_prefix('~')) {
        (Some(home), Some("")) => home.to_path_buf(),
        (Some(home), Some(rest)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(raw),
    }
}

/// Expand `~` in the path-kind keys of a loaded file layer.
pub fn expand_path_keys(values: &mut serde_yaml::Mapping, home: Option<&Path>) {
    for (key, kind) in CONFIG_KEYS {
        if kind != ValueKind::Path {
            continue;
        }
        if let Some(serde_yaml::Value::String(raw)) = values.get_mut(key) {
            *raw = expand_home(raw, home).to_string_lossy().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EffectiveConfig::with_home(Some(Path::new("/home/u")));
        assert_eq!(config.default_max_tokens, 2048);
        assert_eq!(config.provider, "echo");
        assert_eq!(
            config.template_dir,
            PathBuf::from("/home/u/.promptkit/templates")
        );
    }

    #[test]
    fn defaults_without_home_are_relative() {
        let config = EffectiveConfig::with_home(None);
        assert!(config.template_dir.is_relative());
    }

    #[test]
    fn overrides_serialize_only_defined_keys() {
        let overrides = ConfigOverrides {
            model: Some("big".to_string()),
            ..Default::default()
        };
        let mapping = overrides.to_mapping();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("model").and_then(|v| v.as_str()), Some("big"));
    }

    #[test]
    fn from_assignment_coerces_numbers() {
        let overrides = ConfigOverrides::from_assignment("default_max_tokens", "512").unwrap();
        assert_eq!(overrides.default_max_tokens, Some(512));

        let overrides = ConfigOverrides::from_assignment("default_temperature", "0.25").unwrap();
        assert_eq!(overrides.default_temperature, Some(0.25));
    }

    #[test]
    fn from_assignment_rejects_bad_values() {
        assert!(ConfigOverrides::from_assignment("default_max_tokens", "many").is_err());
        assert!(ConfigOverrides::from_assignment("colour", "red").is_err());
    }

    #[test]
    fn empty_overrides() {
        assert!(ConfigOverrides::default().is_empty());
        assert!(!ConfigOverrides::from_assignment("region", "eu").unwrap().is_empty());
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        let home = Some(Path::new("/home/u"));
        assert_eq!(expand_home("/abs/dir", home), PathBuf::from("/abs/dir"));
        assert_eq!(expand_home("rel", home), PathBuf::from("rel"));
        assert_eq!(expand_home("~other/x", home), PathBuf::from("~other/x"));
    }

    #[test]
    fn expand_home_uses_given_home() {
        let home = Some(Path::new("/home/u"));
        assert_eq!(expand_home("~", home), PathBuf::from("/home/u"));
        assert_eq!(expand_home("~/tpl", home), PathBuf::from("/home/u/tpl"));
        assert_eq!(expand_home("~/tpl", None), PathBuf::from("~/tpl"));
    }

    #[test]
    fn expand_path_keys_only_touches_paths() {
        let mut values: serde_yaml::Mapping =
            serde_yaml::from_str("template_dir: ~/tpl
region: ~/eu").unwrap();
        expand_path_keys(&mut values, Some(Path::new("/home/u")));

        assert_eq!(values.get("template_dir").and_then(|v| v.as_str()), Some("/home/u/tpl"));
        assert_eq!(values.get("region").and_then(|v| v.as_str()), Some("~/eu"));
    }

    #[test]
    fn every_key_has_a_kind() {
        assert_eq!(value_kind("template_dir"), Some(ValueKind::Path));
        assert_eq!(value_kind("nope"), None);
    }
}

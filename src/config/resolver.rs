//! Effective configuration for one process.
//!
//! [`ConfigResolver`] merges, in increasing precedence:
//! 1. Built-in defaults
//! 2. `.promptkit.yaml` (working directory, else home directory)
//! 3. `PROMPTKIT_*` environment variables
//! 4. Command-line overrides
//!
//! A layer only overrides the keys it defines. The resolver is an explicit
//! object handed to whatever needs configuration; there is no global.

use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PromptkitError, Result};

use super::env_layer::{ConfigLayer, LayerStack};
use super::loader::{find_config_file, load_config_layer};
use super::schema::{expand_path_keys, ConfigOverrides, EffectiveConfig, CONFIG_FILE_NAME};

/// Inputs for building a [`ConfigResolver`].
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Working directory searched first for the config file.
    pub cwd: PathBuf,
    /// Home directory searched second, and used for default paths.
    pub home: Option<PathBuf>,
    /// Environment variables (only `PROMPTKIT_*` names are read).
    pub env: HashMap<String, String>,
    /// Command-line overrides.
    pub overrides: ConfigOverrides,
}

impl ConfigSources {
    /// Sources for the running process.
    pub fn from_process(overrides: ConfigOverrides) -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_default(),
            home: dirs::home_dir(),
            env: std::env::vars().collect(),
            overrides,
        }
    }
}

/// Callback invoked after every [`ConfigResolver::update_config`].
pub type ConfigObserver = Box<dyn Fn(&EffectiveConfig)>;

/// Layered configuration with runtime updates.
///
/// # Example
///
/// ```
/// use promptkit::config::{ConfigOverrides, ConfigResolver, ConfigSources};
/// use tempfile::TempDir;
///
/// let temp = TempDir::new().unwrap();
/// let sources = ConfigSources {
///     cwd: temp.path().to_path_buf(),
///     overrides: ConfigOverrides {
///         default_max_tokens: Some(512),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
///
/// let resolver = ConfigResolver::load(sources).unwrap();
/// assert_eq!(resolver.get_config().default_max_tokens, 512);
/// assert_eq!(resolver.source_of("default_max_tokens"), Some("command line"));
/// ```
pub struct ConfigResolver {
    stack: LayerStack,
    config: EffectiveConfig,
    /// The config file's own keys, as written.
    file_values: Mapping,
    file_path: Option<PathBuf>,
    save_path: PathBuf,
    observers: Vec<ConfigObserver>,
}

impl ConfigResolver {
    /// Build the effective configuration from all layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigLoad` if the config file is unreadable or invalid,
    /// an environment value does not coerce, or the merged values do not
    /// form a valid configuration. A missing file is not an error.
    pub fn load(sources: ConfigSources) -> Result<Self> {
        let mut stack = LayerStack::new();

        let defaults = EffectiveConfig::with_home(sources.home.as_deref());
        stack.push(ConfigLayer::from_mapping("defaults", to_mapping(&defaults)?));

        let home = sources.home.as_deref();
        let file_path = find_config_file(&sources.cwd, home);
        let mut file_values = Mapping::new();
        match &file_path {
            Some(path) => {
                tracing::debug!("Loading config file {}", path.display());
                file_values = load_config_layer(path)?;
                let mut layer = file_values.clone();
                expand_path_keys(&mut layer, home);
                stack.push(ConfigLayer::from_mapping(path.display().to_string(), layer));
            }
            None => tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME),
        }

        stack.push(ConfigLayer::from_env(&sources.env, home)?);
        stack.push(ConfigLayer::from_mapping(
            "command line",
            sources.overrides.to_mapping(),
        ));

        let config = materialize(&stack)?;
        let save_path = file_path
            .clone()
            .unwrap_or_else(|| sources.cwd.join(CONFIG_FILE_NAME));

        Ok(Self {
            stack,
            config,
            file_values,
            file_path,
            save_path,
            observers: Vec::new(),
        })
    }

    /// Snapshot of the effective configuration.
    pub fn get_config(&self) -> EffectiveConfig {
        self.config.clone()
    }

    /// Borrow the effective configuration.
    pub fn config(&self) -> &EffectiveConfig {
        &self.config
    }

    /// Apply a partial update on top of every existing layer.
    ///
    /// Keys left as `None` keep their current values. Observers are
    /// notified after the update.
    pub fn update_config(&mut self, partial: ConfigOverrides) -> Result<()> {
        let mut stack = self.stack.clone();
        stack.push(ConfigLayer::from_mapping("runtime", partial.to_mapping()));
        let config = materialize(&stack)?;

        self.stack = stack;
        self.config = config;
        for observer in &self.observers {
            observer(&self.config);
        }
        Ok(())
    }

    /// Register a callback for configuration changes.
    pub fn subscribe(&mut self, observer: impl Fn(&EffectiveConfig) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Resolve a single key, preferring an explicit override.
    ///
    /// Returns `None` for unknown keys and unset optional keys.
    pub fn get_option(&self, key: &str, explicit: Option<Value>) -> Option<Value> {
        if let Some(value) = explicit.filter(|v| !v.is_null()) {
            return Some(value);
        }
        let mapping = to_mapping(&self.config).ok()?;
        mapping.get(key).cloned()
    }

    /// Name of the layer that supplied `key`.
    pub fn source_of(&self, key: &str) -> Option<&str> {
        self.stack.source_of(key)
    }

    /// The config file that was loaded, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Where [`ConfigResolver::save_config`] writes.
    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// Set keys in the config file and apply them.
    ///
    /// Only the file's own keys plus `partial` are written; values from
    /// the environment, the command line or the defaults stay out of it.
    pub fn set_in_file(&mut self, partial: ConfigOverrides) -> Result<PathBuf> {
        let mut values = self.file_values.clone();
        for (key, value) in partial.to_mapping() {
            values.insert(key, value);
        }

        self.update_config(partial)?;
        self.write(&values)?;
        self.file_values = values;
        Ok(self.save_path.clone())
    }

    /// Persist the current snapshot to the file layer.
    ///
    /// Writes to the loaded file, or `<cwd>/.promptkit.yaml` if none was
    /// found.
    pub fn save_config(&self) -> Result<PathBuf> {
        self.write(&self.config)?;
        Ok(self.save_path.clone())
    }

    fn write(&self, values: &impl serde::Serialize) -> Result<()> {
        let save_error = |message: String| PromptkitError::ConfigSave {
            path: self.save_path.clone(),
            message,
        };

        let yaml = serde_yaml::to_string(values).map_err(|e| save_error(e.to_string()))?;
        fs::write(&self.save_path, yaml).map_err(|e| save_error(e.to_string()))?;

        tracing::debug!("Saved config to {}", self.save_path.display());
        Ok(())
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("config", &self.config)
            .field("file_path", &self.file_path)
            .field("observers", &self.observers.len())
            .finish()
    }
}

fn to_mapping(config: &EffectiveConfig) -> Result<Mapping> {
    match serde_yaml::to_value(config) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(_) => Ok(Mapping::new()),
        Err(e) => Err(PromptkitError::Other(e.into())),
    }
}

fn materialize(stack: &LayerStack) -> Result<EffectiveConfig> {
    serde_yaml::from_value(stack.resolve()).map_err(|e| PromptkitError::ConfigLoad {
        origin: "merged configuration".to_string(),
        message: e.to_string(),
    })
}

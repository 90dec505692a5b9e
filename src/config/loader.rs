//! Configuration file discovery and loading.
//!
//! Only one configuration file is used: `.promptkit.yaml` in the working
//! directory, or failing that in the home directory. A missing file is
//! not an error.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PromptkitError, Result};

use super::schema::CONFIG_FILE_NAME;

/// Find the configuration file for a working directory.
///
/// # Returns
///
/// The first existing path of `<cwd>/.promptkit.yaml` and
/// `<home>/.promptkit.yaml`, or `None`.
pub fn find_config_file(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let global = home?.join(CONFIG_FILE_NAME);
    if global.is_file() {
        Some(global)
    } else {
        None
    }
}

/// Load a configuration file as a raw mapping (for merging).
///
/// An empty file is an empty mapping.
///
/// # Errors
///
/// Returns `ConfigLoad` if the file cannot be read, is not valid YAML, or
/// is not a mapping at the top level.
pub fn load_config_layer(path: &Path) -> Result<Mapping> {
    let origin = || path.display().to_string();

    let content = fs::read_to_string(path).map_err(|e| PromptkitError::ConfigLoad {
        origin: origin(),
        message: e.to_string(),
    })?;

    let value: Value = serde_yaml::from_str(&content).map_err(|e| PromptkitError::ConfigLoad {
        origin: origin(),
        message: e.to_string(),
    })?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(PromptkitError::ConfigLoad {
            origin: origin(),
            message: "expected a mapping of settings".to_string(),
        }),
    }
}

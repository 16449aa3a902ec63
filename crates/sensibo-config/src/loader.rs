//! YAML loader with custom tag support
//!
//! Supported tags:
//! - `!include path` - Include another YAML file, relative to the including file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader resolving custom tags
pub struct YamlLoader {
    /// Base directory for resolving relative paths
    config_dir: PathBuf,
    secrets: Secrets,
    /// Files currently being loaded, for circular include detection
    include_stack: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a loader for the given config directory, reading its secrets.yaml
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;
        Ok(Self::with_secrets(config_dir, secrets))
    }

    /// Create a loader with pre-loaded secrets
    pub fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            include_stack: HashSet::new(),
        }
    }

    /// Load and process a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve_path(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.include_stack.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.include_stack.insert(path.clone());
        let result = self.load_string(&content, &path);
        self.include_stack.remove(&path);

        result
    }

    /// Load and process YAML from a string
    pub fn load_string(&mut self, content: &str, source_path: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        self.process_value(value, source_path)
    }

    fn process_value(&mut self, value: Value, source_path: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.process_tagged(*tagged, source_path),
            Value::Mapping(map) => {
                let mut result = Mapping::new();
                for (k, v) in map {
                    let v = self.process_value(v, source_path)?;
                    result.insert(k, v);
                }
                Ok(Value::Mapping(result))
            }
            Value::Sequence(seq) => seq
                .into_iter()
                .map(|v| self.process_value(v, source_path))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Sequence),
            other => Ok(other),
        }
    }

    fn process_tagged(&mut self, tagged: TaggedValue, source_path: &Path) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        trace!("Processing tag '{}' with value {:?}", tag, tagged.value);

        match tag.as_str() {
            "!include" => {
                let path = self.include_path(&tagged.value, source_path)?;
                debug!("Including file: {:?}", path);
                self.load_file(&path)
            }
            "!secret" => {
                let key = tag_argument(&tagged.value, "!secret")?;
                let secret = self.secrets.get(key)?;
                debug!("Substituted secret: {}", key);
                Ok(Value::String(secret.to_string()))
            }
            "!env_var" => {
                let var = tag_argument(&tagged.value, "!env_var")?;
                let value = std::env::var(var).map_err(|_| ConfigError::EnvVarNotFound {
                    var: var.to_string(),
                })?;
                debug!("Substituted env var: {}", var);
                Ok(Value::String(value))
            }
            _ => {
                // Unknown tag: keep it, but still resolve tags nested inside
                let value = self.process_value(tagged.value, source_path)?;
                Ok(Value::Tagged(Box::new(TaggedValue {
                    tag: tagged.tag,
                    value,
                })))
            }
        }
    }

    /// Resolve an `!include` argument relative to the including file
    fn include_path(&self, value: &Value, source_path: &Path) -> ConfigResult<PathBuf> {
        let Value::String(path) = value else {
            return Err(ConfigError::InvalidIncludePath {
                path: format!("{:?}", value),
                reason: "path must be a string".to_string(),
            });
        };

        let base_dir = source_path.parent().unwrap_or(&self.config_dir);
        Ok(if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            base_dir.join(path)
        })
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

fn tag_argument<'a>(value: &'a Value, tag: &str) -> ConfigResult<&'a str> {
    value.as_str().ok_or_else(|| ConfigError::InvalidValue {
        key: tag.to_string(),
        reason: "tag argument must be a string".to_string(),
    })
}

/// Load a YAML file with full tag processing
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    let mut loader = YamlLoader::new(config_dir)?;
    loader.load_file(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        value.as_mapping().and_then(|m| m.get(key))
    }

    #[test]
    fn test_load_simple_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "configuration.yaml",
            "sensibo:\n  name: Sensibo\n  refreshInterval: 30\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        let section = get(&value, "sensibo").unwrap();
        assert_eq!(get(section, "name").and_then(Value::as_str), Some("Sensibo"));
    }

    #[test]
    fn test_include_relative_to_source() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "platforms/sensibo.yaml", "name: Included\n");
        write_file(dir.path(), "platforms/main.yaml", "sensibo: !include sensibo.yaml\n");

        let value = load_yaml(dir.path(), "platforms/main.yaml").unwrap();
        let section = get(&value, "sensibo").unwrap();
        assert_eq!(get(section, "name").and_then(Value::as_str), Some("Included"));
    }

    #[test]
    fn test_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "sensibo_key: secret123\n");
        write_file(dir.path(), "configuration.yaml", "apiKey: !secret sensibo_key\n");

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(get(&value, "apiKey").and_then(Value::as_str), Some("secret123"));
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "existing: value\n");
        write_file(dir.path(), "configuration.yaml", "apiKey: !secret nonexistent\n");

        let result = load_yaml(dir.path(), "configuration.yaml");
        assert!(matches!(result, Err(ConfigError::SecretNotFound { .. })));
    }

    #[test]
    fn test_env_var() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("TEST_SENSIBO_LOADER_VAR", "from_env");
        write_file(
            dir.path(),
            "configuration.yaml",
            "apiKey: !env_var TEST_SENSIBO_LOADER_VAR\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(get(&value, "apiKey").and_then(Value::as_str), Some("from_env"));

        std::env::remove_var("TEST_SENSIBO_LOADER_VAR");
    }

    #[test]
    fn test_missing_env_var() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "configuration.yaml",
            "apiKey: !env_var TEST_SENSIBO_LOADER_UNSET\n",
        );

        let result = load_yaml(dir.path(), "configuration.yaml");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound { .. })));
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }
}

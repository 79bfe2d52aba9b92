//! YAML loading with `!env_var` substitution

use crate::error::{LoadError, LoadResult};
use crate::prefs::MasqueradeConfig;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// Load and parse a configuration file
pub fn load_config(path: impl AsRef<Path>) -> LoadResult<MasqueradeConfig> {
    let path = path.as_ref();
    debug!("Loading configuration file: {:?}", path);

    let content = fs::read_to_string(path).map_err(|e| LoadError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_str(&content, path)
}

/// Parse configuration from a string
///
/// `source_path` is only used in error messages.
pub fn load_config_str(content: &str, source_path: &Path) -> LoadResult<MasqueradeConfig> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| LoadError::ParseYaml {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let value = process_value(value)?;
    let config = MasqueradeConfig::from_yaml(value)?;

    debug!(
        plugins = config.plugins.len(),
        devices = config.devices.len(),
        bindings = config.bindings.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Walk a YAML value, substituting tags
fn process_value(value: Value) -> LoadResult<Value> {
    match value {
        Value::Tagged(tagged) => {
            let tagged = *tagged;
            let tag = tagged.tag.to_string();
            trace!("Processing tag '{}' with value {:?}", tag, tagged.value);

            match tag.as_str() {
                "!env_var" => process_env_var(tagged.value),
                _ => {
                    // Unknown tag, keep it as-is but process the inner value
                    let processed = process_value(tagged.value)?;
                    Ok(Value::Tagged(Box::new(serde_yaml::value::TaggedValue {
                        tag: tagged.tag,
                        value: processed,
                    })))
                }
            }
        }
        Value::Mapping(map) => {
            let mut result = serde_yaml::Mapping::new();
            for (k, v) in map {
                result.insert(process_value(k)?, process_value(v)?);
            }
            Ok(Value::Mapping(result))
        }
        Value::Sequence(seq) => {
            let result: LoadResult<Vec<Value>> = seq.into_iter().map(process_value).collect();
            Ok(Value::Sequence(result?))
        }
        _ => Ok(value),
    }
}

/// `!env_var NAME` or `!env_var NAME default`
fn process_env_var(value: Value) -> LoadResult<Value> {
    let arg = match value {
        Value::String(s) => s,
        _ => {
            return Err(LoadError::InvalidValue {
                key: "!env_var".to_string(),
                reason: "environment variable name must be a string".to_string(),
            })
        }
    };

    let mut parts = arg.splitn(2, char::is_whitespace);
    let var = parts.next().unwrap_or_default().to_string();
    let default = parts.next().map(str::trim);

    match std::env::var(&var) {
        Ok(v) => Ok(Value::String(v)),
        Err(_) => match default {
            Some(d) => Ok(Value::String(d.to_string())),
            None => Err(LoadError::EnvVarNotFound { var }),
        },
    }
}

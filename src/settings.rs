//! Settings model for the zipatoserver config file.
//!
//! The deployed program reads a YAML mapping; the builder uses this model
//! to validate the template before copying it into the image. Formatting
//! rules carried over from the program: some path parameters always end
//! with a slash, some never do, yes/no strings coerce to booleans, and
//! integer-looking scalars coerce to integers.

use anyhow::{bail, Result};
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parameters whose values always end with a slash.
const PATH_WITH_SLASH_PARAMS: &[&str] = &[
    "WEB_API_PATH",
    "WEB_GUI_PATH",
    "WAKEONLAN_PATH",
    "PING_PATH",
    "SSH_PATH",
];

/// Parameters whose values never end with a slash.
const PATH_WITHOUT_SLASH_PARAMS: &[&str] = &["MESSAGE_LOG", "ERROR_LOG", "SSH_KEY_FILE"];

/// A normalized settings value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// Normalized view of a settings file.
#[derive(Debug, Default)]
pub struct Settings {
    params: BTreeMap<String, Value>,
}

impl Settings {
    /// Parse and normalize a settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid YAML or not a mapping
    /// with string keys and scalar values.
    pub fn parse(raw: &str) -> Result<Self> {
        let doc: Yaml = serde_yaml::from_str(raw)?;
        let map = match doc {
            Yaml::Mapping(map) => map,
            _ => bail!("settings file must be a YAML mapping"),
        };

        let mut params = BTreeMap::new();
        for (key, value) in map {
            let key = match key {
                Yaml::String(key) => key,
                other => bail!("parameter names must be strings, got {:?}", other),
            };
            let value = format_value(&key, &value)?;
            params.insert(key, value);
        }

        Ok(Self { params })
    }

    /// Parse a settings file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn get(&self, param: &str) -> Option<&Value> {
        self.params.get(param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.params.iter()
    }
}

/// Apply the slash rule for a path parameter.
fn format_path(path: &str, slash: bool) -> String {
    if path.is_empty() {
        return String::new();
    }
    if slash && !path.ends_with('/') {
        return format!("{}/", path);
    }
    if !slash && path.ends_with('/') {
        return path[..path.len() - 1].to_string();
    }
    path.to_string()
}

/// Coerce a raw YAML scalar to its normalized value.
fn format_value(param: &str, value: &Yaml) -> Result<Value> {
    if PATH_WITH_SLASH_PARAMS.contains(&param) {
        return Ok(Value::Str(format_path(&scalar_to_string(param, value)?, true)));
    }
    if PATH_WITHOUT_SLASH_PARAMS.contains(&param) {
        return Ok(Value::Str(format_path(
            &scalar_to_string(param, value)?,
            false,
        )));
    }

    match value {
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                Ok(Value::Str(n.to_string()))
            }
        }
        Yaml::String(s) => {
            let lower = s.to_lowercase();
            if lower == "yes" || lower == "true" {
                Ok(Value::Bool(true))
            } else if lower == "no" || lower == "false" {
                Ok(Value::Bool(false))
            } else if let Ok(i) = s.parse::<i64>() {
                Ok(Value::Int(i))
            } else {
                Ok(Value::Str(s.clone()))
            }
        }
        Yaml::Null => Ok(Value::Str(String::new())),
        other => bail!("unsupported value for {}: {:?}", param, other),
    }
}

fn scalar_to_string(param: &str, value: &Yaml) -> Result<String> {
    match value {
        Yaml::String(s) => Ok(s.clone()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Null => Ok(String::new()),
        other => bail!("expected a scalar path for {}, got {:?}", param, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_appended_to_path_params() {
        let settings = Settings::parse("WEB_API_PATH: /api\nSSH_PATH: /usr/bin/\n").unwrap();
        assert_eq!(
            settings.get("WEB_API_PATH"),
            Some(&Value::Str("/api/".to_string()))
        );
        assert_eq!(
            settings.get("SSH_PATH"),
            Some(&Value::Str("/usr/bin/".to_string()))
        );
    }

    #[test]
    fn test_slash_stripped_from_file_params() {
        let settings =
            Settings::parse("MESSAGE_LOG: /var/log/zipato/\nERROR_LOG: /var/log/err\n").unwrap();
        assert_eq!(
            settings.get("MESSAGE_LOG"),
            Some(&Value::Str("/var/log/zipato".to_string()))
        );
        assert_eq!(
            settings.get("ERROR_LOG"),
            Some(&Value::Str("/var/log/err".to_string()))
        );
    }

    #[test]
    fn test_empty_path_stays_empty() {
        let settings = Settings::parse("WEB_GUI_PATH: ''\n").unwrap();
        assert_eq!(settings.get("WEB_GUI_PATH"), Some(&Value::Str(String::new())));
    }

    #[test]
    fn test_yes_no_coerce_to_bool() {
        let settings =
            Settings::parse("A: yes\nB: No\nC: TRUE\nD: 'false'\n").unwrap();
        assert_eq!(settings.get("A"), Some(&Value::Bool(true)));
        assert_eq!(settings.get("B"), Some(&Value::Bool(false)));
        assert_eq!(settings.get("C"), Some(&Value::Bool(true)));
        assert_eq!(settings.get("D"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_integers_coerce() {
        let settings = Settings::parse("PORT: 8080\nQUOTED: '42'\nNAME: zipato\n").unwrap();
        assert_eq!(settings.get("PORT"), Some(&Value::Int(8080)));
        assert_eq!(settings.get("QUOTED"), Some(&Value::Int(42)));
        assert_eq!(
            settings.get("NAME"),
            Some(&Value::Str("zipato".to_string()))
        );
    }

    #[test]
    fn test_non_mapping_rejected() {
        assert!(Settings::parse("- a\n- b\n").is_err());
        assert!(Settings::parse("just a string").is_err());
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(Settings::parse("KEY: [unclosed\n").is_err());
    }

    #[test]
    fn test_representative_template() {
        let template = "\
# Web paths
WEB_API_PATH: /zipato/api
WEB_GUI_PATH: /zipato/gui
PING_PATH: /usr/bin
# Logs
MESSAGE_LOG: /mnt/host/var/log/messages.log
ERROR_LOG: /mnt/host/var/log/error.log
SSH_KEY_FILE: /root/.ssh/id_rsa
DEBUG: no
TIMEOUT: 30
";
        let settings = Settings::parse(template).unwrap();
        assert_eq!(settings.len(), 8);
        assert_eq!(
            settings.get("PING_PATH"),
            Some(&Value::Str("/usr/bin/".to_string()))
        );
        assert_eq!(settings.get("DEBUG"), Some(&Value::Bool(false)));
        assert_eq!(settings.get("TIMEOUT"), Some(&Value::Int(30)));
        assert!(!settings.is_empty());
    }
}

//! Externally configurable values declared by languages.

use std::collections::HashMap;

/// A configurable value a language declares (interpreter path, compiler
/// flags, custom command template, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigField {
    /// Key used to index into [`ConfigValues`]. Unique across the registry.
    pub key: &'static str,
    /// Short human-readable label
    pub label: &'static str,
    /// Longer help text
    pub help: &'static str,
    /// Value used when the key is missing or blank
    pub default: &'static str,
    /// Whether the value is free-form multiline text (custom commands)
    pub multiline: bool,
}

/// Flat key → value configuration map.
///
/// Lookups go through a [`ConfigField`] so that missing or blank values fall
/// back to the field's declared default. Keys no field declares are kept but
/// never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigValues {
    values: HashMap<String, String>,
}

impl ConfigValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style [`ConfigValues::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Raw value for `key`, if one was provided.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Effective value for `field`: the provided value when it is not blank,
    /// the field default otherwise.
    pub fn get(&self, field: &ConfigField) -> &str {
        match self.raw(field.key) {
            Some(value) if !value.trim().is_empty() => value,
            _ => field.default,
        }
    }

    /// Provided value for `field` when it is not blank. Used for optional
    /// fields (custom commands) whose default is "unset".
    pub fn get_opt(&self, field: &ConfigField) -> Option<&str> {
        self.raw(field.key).filter(|value| !value.trim().is_empty())
    }

    /// Iterate over the provided keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for ConfigValues {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELD: ConfigField = ConfigField {
        key: "tool_command",
        label: "Tool",
        help: "",
        default: "tool",
        multiline: false,
    };

    #[test]
    fn missing_key_uses_default() {
        let values = ConfigValues::new();
        assert_eq!(values.get(&FIELD), "tool");
        assert_eq!(values.get_opt(&FIELD), None);
    }

    #[test]
    fn blank_value_uses_default() {
        let values = ConfigValues::new().with("tool_command", "   ");
        assert_eq!(values.get(&FIELD), "tool");
        assert_eq!(values.get_opt(&FIELD), None);
    }

    #[test]
    fn provided_value_wins() {
        let values = ConfigValues::new().with("tool_command", "/opt/tool");
        assert_eq!(values.get(&FIELD), "/opt/tool");
        assert_eq!(values.get_opt(&FIELD), Some("/opt/tool"));
    }
}

//! Language registry: identifier lookup and aggregated configuration.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::command::CommandSpec;
use crate::error::RegistryError;
use crate::field::{ConfigField, ConfigValues};
use crate::language::Language;
use crate::settings::LanguageSettings;

/// Immutable description of how to run one language.
#[derive(Debug, PartialEq, Eq)]
pub struct LanguageDescriptor {
    language: Language,
}

impl LanguageDescriptor {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn ids(&self) -> &'static [&'static str] {
        self.language.ids()
    }

    pub fn name(&self) -> &'static str {
        self.language.name()
    }

    pub fn config_fields(&self) -> &'static [ConfigField] {
        self.language.config_fields()
    }

    /// Typed settings for this language out of a flat configuration map.
    pub fn settings(&self, values: &ConfigValues) -> LanguageSettings {
        LanguageSettings::resolve(self.language, values)
    }

    /// Build the default command for `source`. Pure.
    pub fn build_command(
        &self,
        values: &ConfigValues,
        source: &str,
        user_args: &[String],
    ) -> CommandSpec {
        self.settings(values).build_command(source, user_args)
    }
}

/// The set of languages available to the engine.
///
/// Built once, read-only afterwards. Identifier and configuration-key
/// collisions are resolved first-registrant-wins and recorded; see
/// [`Registry::conflicts`] and [`Registry::validate`].
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<LanguageDescriptor>,
    by_id: HashMap<String, usize>,
    defaults: IndexMap<&'static str, &'static str>,
    conflicts: Vec<RegistryError>,
}

impl Registry {
    /// Registry of every built-in language.
    pub fn builtin() -> Self {
        Self::new(Language::ALL)
    }

    /// Registry of `languages`, in the given order.
    pub fn new(languages: impl IntoIterator<Item = Language>) -> Self {
        let mut descriptors: Vec<LanguageDescriptor> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();
        let mut defaults = IndexMap::new();
        let mut key_owner: HashMap<&'static str, Language> = HashMap::new();
        let mut conflicts = Vec::new();

        for language in languages {
            let index = descriptors.len();
            descriptors.push(LanguageDescriptor { language });

            for id in language.ids() {
                let id = id.to_lowercase();
                if let Some(&existing) = by_id.get(&id) {
                    let first: Language = descriptors[existing].language;
                    tracing::warn!(%id, %first, second = %language, "duplicate language id, keeping first");
                    conflicts.push(RegistryError::DuplicateId {
                        id,
                        first,
                        second: language,
                    });
                } else {
                    by_id.insert(id, index);
                }
            }

            for field in language.config_fields() {
                if let Some(&first) = key_owner.get(field.key) {
                    tracing::warn!(key = field.key, %first, second = %language, "duplicate config key, keeping first default");
                    conflicts.push(RegistryError::DuplicateKey {
                        key: field.key,
                        first,
                        second: language,
                    });
                } else {
                    key_owner.insert(field.key, language);
                    defaults.insert(field.key, field.default);
                }
            }
        }

        tracing::debug!(
            languages = descriptors.len(),
            ids = by_id.len(),
            keys = defaults.len(),
            "language registry built"
        );

        Self {
            descriptors,
            by_id,
            defaults,
            conflicts,
        }
    }

    /// Look up a language by any of its identifiers, case-insensitively.
    pub fn resolve(&self, id: &str) -> Option<&LanguageDescriptor> {
        self.by_id
            .get(&id.trim().to_lowercase())
            .map(|&index| &self.descriptors[index])
    }

    /// Registered descriptors, in registration order.
    pub fn descriptors(&self) -> &[LanguageDescriptor] {
        &self.descriptors
    }

    /// Display names, sorted and de-duplicated.
    pub fn supported_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.descriptors.iter().map(|d| d.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Every identifier that resolves, sorted.
    pub fn supported_ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.by_id.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Default value of every declared configuration key, in declaration
    /// order.
    pub fn collect_all_config_fields(&self) -> &IndexMap<&'static str, &'static str> {
        &self.defaults
    }

    /// Provided configuration keys that no registered language declares.
    pub fn unknown_keys<'a>(&self, values: &'a ConfigValues) -> Vec<&'a str> {
        let mut unknown: Vec<_> = values
            .keys()
            .filter(|key| !self.defaults.contains_key(*key))
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// Collisions detected while registering.
    pub fn conflicts(&self) -> &[RegistryError] {
        &self.conflicts
    }

    /// Fails with the first collision, if any.
    pub fn validate(&self) -> Result<(), RegistryError> {
        match self.conflicts.first() {
            Some(conflict) => Err(conflict.clone()),
            None => Ok(()),
        }
    }
}

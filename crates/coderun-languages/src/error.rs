//! Error types for registry construction.

use crate::language::Language;

/// Registry configuration defects detected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two languages claim the same identifier. The first one keeps it.
    #[error("language id `{id}` is claimed by both {first} and {second}")]
    DuplicateId {
        id: String,
        first: Language,
        second: Language,
    },

    /// Two languages declare the same configuration key. The first default
    /// is kept.
    #[error("config key `{key}` is declared by both {first} and {second}")]
    DuplicateKey {
        key: &'static str,
        first: Language,
        second: Language,
    },
}

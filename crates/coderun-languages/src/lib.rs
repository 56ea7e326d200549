//! Language descriptors for coderun.
//!
//! This crate knows, for every supported language, which identifiers select
//! it, which settings it exposes and how to turn a source snippet into a
//! concrete [`CommandSpec`]. It never runs anything; see `coderun-exec` for
//! the engine that consumes these commands.
//!
//! ```
//! use coderun_languages::{ConfigValues, Registry};
//!
//! let registry = Registry::builtin();
//! let python = registry.resolve("py").expect("python is built in");
//! let spec = python.build_command(&ConfigValues::new(), "print(1+1)", &[]);
//! assert_eq!(spec.program, "python3");
//! assert!(!spec.uses_temp_file);
//! ```

mod command;
mod error;
mod field;
mod language;
mod registry;
mod settings;

pub use command::{CommandSpec, GENERIC_EXTENSION};
pub use error::RegistryError;
pub use field::{ConfigField, ConfigValues};
pub use language::{Language, fields};
pub use registry::{LanguageDescriptor, Registry};
pub use settings::{
    CompilerSettings, InterpreterSettings, JavaSettings, LanguageSettings, RustSettings,
    java_class_name,
};

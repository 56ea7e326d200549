//! Configuration file discovery and parsing
//!
//! Searches for `.config/coderun.yaml` walking up from the current directory,
//! unless a path is given explicitly. The project root is the parent of
//! `.config/`; a relative `scratch_dir` is resolved against it.

use std::collections::HashMap;
use std::num::NonZeroU64;

use camino::{Utf8Path, Utf8PathBuf};
use coderun_exec::ExecutionConfig;
use coderun_languages::{ConfigValues, Registry};
use facet::Facet;

const CONFIG_DIR: &str = ".config";
const CONFIG_FILE_YAML: &str = "coderun.yaml";

/// Coderun configuration from `.config/coderun.yaml`
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "snake_case")]
pub struct CoderunConfig {
    /// Seconds before a run is killed. Default: 30
    #[facet(default)]
    pub timeout_secs: Option<u64>,

    /// Arguments passed to every snippet that is run without `--args`
    #[facet(default)]
    pub default_args: Option<String>,

    /// Where temp files are created (the OS temp dir by default)
    #[facet(default)]
    pub scratch_dir: Option<String>,

    /// Per-language settings, e.g. `python_command: pypy3`
    #[facet(default)]
    pub languages: Option<HashMap<String, String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Current directory is not valid UTF-8: {0}")]
    NonUtf8Cwd(std::path::PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },

    #[error("{path}: timeout_secs must be greater than zero")]
    ZeroTimeout { path: Utf8PathBuf },
}

/// A configuration file together with where it was found.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// The file that was read, if any
    pub path: Option<Utf8PathBuf>,
    pub config: CoderunConfig,
}

impl LoadedConfig {
    /// Load `explicit` if given, otherwise look for `.config/coderun.yaml`
    /// from the current directory upwards. No file at all is not an error.
    pub fn discover(explicit: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_owned()),
            None => {
                let cwd = std::env::current_dir()?;
                let cwd = Utf8PathBuf::try_from(cwd)
                    .map_err(|e| ConfigError::NonUtf8Cwd(e.into_path_buf()))?;
                find_config_file(&cwd)
            }
        };

        match path {
            Some(path) => Self::load(&path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs_err::read_to_string(path)?;
        let config: CoderunConfig =
            facet_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_owned(),
                message: e.to_string(),
            })?;
        tracing::debug!(%path, "loaded config");

        Ok(Self {
            path: Some(path.to_owned()),
            config,
        })
    }

    /// Directory relative paths in the file are resolved against.
    fn project_root(&self) -> Option<&Utf8Path> {
        let dir = self.path.as_deref()?.parent()?;
        if dir.file_name() == Some(CONFIG_DIR) {
            dir.parent()
        } else {
            Some(dir)
        }
    }

    /// Language settings as a flat key/value map.
    pub fn values(&self) -> ConfigValues {
        self.config
            .languages
            .clone()
            .map(ConfigValues::from)
            .unwrap_or_default()
    }

    /// Build the engine configuration. Language keys `registry` does not
    /// know about are reported and otherwise ignored.
    pub fn to_execution_config(&self, registry: &Registry) -> Result<ExecutionConfig, ConfigError> {
        let values = self.values();
        for key in registry.unknown_keys(&values) {
            tracing::warn!(key, "unknown language setting, ignoring");
        }

        let mut config = ExecutionConfig::new(values);

        if let Some(secs) = self.config.timeout_secs {
            let secs = NonZeroU64::new(secs).ok_or_else(|| ConfigError::ZeroTimeout {
                path: self.path.clone().unwrap_or_default(),
            })?;
            config = config.with_timeout_secs(secs);
        }

        if let Some(args) = &self.config.default_args {
            config = config.with_default_args(args.clone());
        }

        if let Some(dir) = self.config.scratch_dir.as_deref().filter(|d| !d.trim().is_empty()) {
            let dir = Utf8Path::new(dir);
            let dir = match self.project_root() {
                Some(root) if dir.is_relative() => root.join(dir),
                _ => dir.to_owned(),
            };
            config = config.with_scratch_dir(dir);
        }

        Ok(config)
    }
}

/// Search for `.config/coderun.yaml` walking up from `start`
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = start;

    loop {
        let yaml_file = current.join(CONFIG_DIR).join(CONFIG_FILE_YAML);
        if yaml_file.exists() {
            return Some(yaml_file);
        }

        current = current.parent()?;
    }
}

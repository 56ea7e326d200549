use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use coderun_languages::ConfigValues;

/// Timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECS: NonZeroU64 = NonZeroU64::new(30).unwrap();

/// Everything the engine reads at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    values: ConfigValues,
    timeout_secs: NonZeroU64,
    default_args: String,
    scratch_dir: Option<Utf8PathBuf>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            values: ConfigValues::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_args: String::new(),
            scratch_dir: None,
        }
    }
}

impl ExecutionConfig {
    /// Config with per-language `values` and defaults for everything else.
    pub fn new(values: ConfigValues) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Timeout applied to every language.
    pub fn with_timeout_secs(mut self, secs: NonZeroU64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Arguments used when a run does not supply its own.
    pub fn with_default_args(mut self, args: impl Into<String>) -> Self {
        self.default_args = args.into();
        self
    }

    /// Directory temp files are created in (the OS temp dir otherwise).
    pub fn with_scratch_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.set(key, value);
        self
    }

    pub fn values(&self) -> &ConfigValues {
        &self.values
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.get()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.get())
    }

    pub fn default_args(&self) -> &str {
        &self.default_args
    }

    pub fn scratch_dir(&self) -> Option<&Utf8Path> {
        self.scratch_dir.as_deref()
    }

    /// Directory temp files are actually created in.
    pub(crate) fn scratch_root(&self) -> PathBuf {
        match &self.scratch_dir {
            Some(dir) => dir.clone().into_std_path_buf(),
            None => std::env::temp_dir(),
        }
    }
}

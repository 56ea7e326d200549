use std::sync::Arc;

use coderun_languages::Registry;
use tokio::task::JoinHandle;

use crate::args::split_user_args;
use crate::config::ExecutionConfig;
use crate::result::ExecutionResult;
use crate::scratch::ScratchFile;
use crate::supervise::{KillHandle, supervise};
use crate::template::{TemplateVars, substitute};

const SHELL: &str = "/bin/sh";

/// Runs snippets against a fixed registry and configuration.
///
/// Cheap to clone; clones share the registry and configuration. Runs are
/// independent of each other and may overlap freely.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    config: Arc<ExecutionConfig>,
}

impl Engine {
    pub fn new(registry: Arc<Registry>, config: ExecutionConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Run `source` as `language` and wait for the result.
    ///
    /// `user_args` replaces the configured default arguments when given.
    /// Never fails: unsupported languages, missing toolchains and timeouts
    /// all come back as an [`ExecutionResult`].
    pub async fn run(
        &self,
        language: &str,
        source: &str,
        user_args: Option<&str>,
    ) -> ExecutionResult {
        self.execute(language, source, user_args, &KillHandle::new())
            .await
    }

    /// Start a run in the background and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        &self,
        language: impl Into<String>,
        source: impl Into<String>,
        user_args: Option<String>,
    ) -> Execution {
        let engine = self.clone();
        let language = language.into();
        let source = source.into();
        let kill = KillHandle::new();
        let task_kill = kill.clone();

        let task = tokio::spawn(async move {
            engine
                .execute(&language, &source, user_args.as_deref(), &task_kill)
                .await
        });

        Execution { task, kill }
    }

    async fn execute(
        &self,
        language: &str,
        source: &str,
        user_args: Option<&str>,
        kill: &KillHandle,
    ) -> ExecutionResult {
        let Some(descriptor) = self.registry.resolve(language) else {
            tracing::debug!(language, "unsupported language");
            return ExecutionResult::unsupported(language, &self.registry.supported_names());
        };

        let args = split_user_args(user_args.unwrap_or(self.config.default_args()));
        let settings = descriptor.settings(self.config.values());
        let custom = settings.custom_command();
        let spec = settings.build_command(source, &args);

        let scratch = if custom.is_some() || spec.uses_temp_file {
            match ScratchFile::create(&self.config.scratch_root(), spec.extension(), source) {
                Ok(scratch) => Some(scratch),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to create temp file");
                    return ExecutionResult::setup_failure(format!(
                        "Failed to create temp file: {e}"
                    ));
                }
            }
        } else {
            None
        };

        let (program, argv) = match &scratch {
            None => (spec.program, spec.argv),
            Some(file) => {
                let path = file.path().to_string_lossy().into_owned();
                match custom {
                    Some(template) => {
                        let dir = file.dir().to_string_lossy();
                        let line = substitute(
                            template,
                            &TemplateVars {
                                file: &path,
                                args: &args.join(" "),
                                dir: &dir,
                            },
                        );
                        tracing::debug!(language = descriptor.name(), %line, "using custom command");
                        (SHELL.to_string(), vec!["-c".to_string(), line])
                    }
                    None => {
                        let mut argv = spec.argv;
                        argv.push(path);
                        argv.extend(args);
                        (spec.program, argv)
                    }
                }
            }
        };

        let result = supervise(&program, &argv, self.config.timeout_secs(), kill).await;

        if let Some(scratch) = scratch {
            scratch.remove();
        }

        result
    }
}

/// A run in progress, started with [`Engine::start`].
///
/// Dropping it detaches the run; it still finishes (or times out) and cleans
/// up on its own.
#[derive(Debug)]
pub struct Execution {
    task: JoinHandle<ExecutionResult>,
    kill: KillHandle,
}

impl Execution {
    /// Handle that can kill this run from elsewhere.
    pub fn kill_handle(&self) -> KillHandle {
        self.kill.clone()
    }

    /// Force-kill the process. The result still arrives through
    /// [`Execution::wait`], with `timed_out` unset.
    pub fn kill(&self) {
        self.kill.kill();
    }

    pub async fn wait(self) -> ExecutionResult {
        match self.task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "execution task failed");
                ExecutionResult::setup_failure(format!("Execution task failed: {e}"))
            }
        }
    }
}

//! Bounded execution of code snippets through external toolchains.
//!
//! The [`Engine`] resolves a language through a
//! [`Registry`](coderun_languages::Registry), builds the command, writes the
//! source to a scratch file when the toolchain needs one, runs the process
//! under a timeout and always hands back an [`ExecutionResult`].
//!
//! Code runs with the privileges of the caller. Nothing here is a sandbox.

mod args;
mod config;
mod engine;
mod result;
mod scratch;
mod supervise;
mod template;

pub use args::split_user_args;
pub use config::{DEFAULT_TIMEOUT_SECS, ExecutionConfig};
pub use engine::{Engine, Execution};
pub use result::{ExecutionResult, timeout_message};
pub use scratch::ScratchFile;
pub use supervise::{CompletionGuard, KillHandle, Termination};
pub use template::{TemplateVars, substitute};

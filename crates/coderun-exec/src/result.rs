use std::time::Duration;

use facet::Facet;

/// Outcome of one invocation. Every run produces exactly one of these,
/// whatever went wrong.
#[derive(Facet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionResult {
    /// Standard output
    pub stdout: String,
    /// Standard error, or the timeout message when the run timed out
    pub stderr: String,
    /// Exit code. Absent only when the process could not be started; a
    /// process killed by a signal reports `128 + signal`.
    pub exit_code: Option<i32>,
    /// Wall-clock duration from spawn to observed termination
    pub elapsed_ms: u64,
    /// Whether the engine killed the process because it ran too long
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Whether the snippet ran to completion with exit code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    /// Result for a language no descriptor handles. Nothing was spawned.
    pub fn unsupported(language: &str, supported: &[&str]) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!(
                "Unsupported language: {}\nCurrently supported: {}",
                language,
                supported.join(", ")
            ),
            exit_code: Some(1),
            elapsed_ms: 0,
            timed_out: false,
        }
    }

    /// Result for a program that could not be started.
    pub fn spawn_failure(program: &str, error: &std::io::Error, elapsed: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!(
                "Failed to execute {program}: {error}\n\n\
                 Make sure {program} is installed and in your PATH."
            ),
            exit_code: Some(1),
            elapsed_ms: millis(elapsed),
            timed_out: false,
        }
    }

    /// Result for a failure before anything was spawned (temp file setup).
    pub fn setup_failure(message: String) -> Self {
        Self {
            stdout: String::new(),
            stderr: message,
            exit_code: Some(1),
            elapsed_ms: 0,
            timed_out: false,
        }
    }
}

/// Canonical stderr of a timed-out run.
pub fn timeout_message(timeout_secs: u64) -> String {
    format!("Execution timed out after {timeout_secs}s")
}

pub(crate) fn millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_lists_languages() {
        let result = ExecutionResult::unsupported("cobol", &["C", "Python"]);
        assert_eq!(result.exit_code, Some(1));
        assert!(!result.timed_out);
        assert_eq!(result.elapsed_ms, 0);
        assert_eq!(
            result.stderr,
            "Unsupported language: cobol\nCurrently supported: C, Python"
        );
        assert!(!result.success());
    }

    #[test]
    fn spawn_failure_names_the_program() {
        let error = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let result =
            ExecutionResult::spawn_failure("python3.99", &error, Duration::from_millis(3));
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.elapsed_ms, 3);
        assert!(result.stderr.contains("python3.99"));
        assert!(result.stderr.contains("No such file or directory"));
        assert!(result.stderr.contains("Make sure python3.99 is installed"));
    }

    #[test]
    fn timed_out_run_is_not_a_success() {
        let result = ExecutionResult {
            stdout: String::new(),
            stderr: timeout_message(2),
            exit_code: Some(0),
            elapsed_ms: 2000,
            timed_out: true,
        };
        assert!(!result.success());
        assert_eq!(result.stderr, "Execution timed out after 2s");
    }
}

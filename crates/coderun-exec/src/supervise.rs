//! Running one external process to completion.
//!
//! The process is spawned with both output streams piped into growing
//! buffers, then raced against the timeout and an optional kill request.
//! Whichever terminal event comes first settles the [`CompletionGuard`];
//! the others become no-ops.

use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::result::{ExecutionResult, millis, timeout_message};

/// How long output readers may keep draining after a forced kill. Only
/// matters when a descendant escaped the process group and keeps a pipe open.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited on its own
    Exited,
    /// The engine killed it when the timeout fired
    TimedOut,
    /// A [`KillHandle`] killed it
    Killed,
}

/// Single-assignment record of the first terminal event of a run.
#[derive(Debug, Default)]
pub struct CompletionGuard {
    settled: OnceLock<Termination>,
}

impl CompletionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `termination` if nothing was recorded yet. Returns whether this
    /// call won.
    pub fn settle(&self, termination: Termination) -> bool {
        self.settled.set(termination).is_ok()
    }

    pub fn outcome(&self) -> Option<Termination> {
        self.settled.get().copied()
    }
}

#[derive(Debug, Default)]
struct KillState {
    requested: AtomicBool,
    notify: Notify,
}

/// Requests a forced kill of a running execution. Cloneable; killing after
/// the process has already finished does nothing.
#[derive(Debug, Clone, Default)]
pub struct KillHandle {
    state: Arc<KillState>,
}

impl KillHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kill(&self) {
        self.state.requested.store(true, Ordering::SeqCst);
        self.state.notify.notify_one();
    }

    pub fn is_requested(&self) -> bool {
        self.state.requested.load(Ordering::SeqCst)
    }

    /// Resolves once [`KillHandle::kill`] has been called.
    pub(crate) async fn requested(&self) {
        if self.is_requested() {
            return;
        }
        self.state.notify.notified().await;
    }
}

/// Output of one stream, filled by a background reader as data arrives.
struct StreamCollector {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

impl StreamCollector {
    fn spawn<R>(stream: Option<R>, name: &'static str) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = buffer.clone();

        let reader = tokio::spawn(async move {
            let Some(mut stream) = stream else {
                return;
            };
            let mut chunk = vec![0u8; READ_CHUNK];
            loop {
                match stream.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend_from_slice(&chunk[..n]),
                    Err(e) => {
                        tracing::debug!(stream = name, error = %e, "output read failed");
                        break;
                    }
                }
            }
        });

        Self {
            buffer,
            reader: Some(reader),
        }
    }

    /// Resolves at end-of-stream, i.e. once every process holding the write
    /// end has closed it. Cancel-safe.
    async fn closed(&mut self) {
        if let Some(reader) = self.reader.as_mut() {
            if let Err(e) = reader.await {
                tracing::debug!(error = %e, "output reader failed");
            }
            self.reader = None;
        }
    }

    /// Like [`StreamCollector::closed`], but gives up after `grace`.
    async fn drain(&mut self, grace: Duration) {
        if tokio::time::timeout(grace, self.closed()).await.is_err() {
            tracing::debug!("output still open after kill, abandoning reader");
        }
    }

    /// Everything read so far. Stops the reader if it is still running.
    fn into_output(self) -> String {
        if let Some(reader) = &self.reader {
            reader.abort();
        }
        let bytes = std::mem::take(&mut *self.buffer.lock().unwrap_or_else(PoisonError::into_inner));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Spawn `program` with `argv`, wait for it under `timeout_secs`, and
/// collect its output. Never fails: spawn errors become a result too.
///
/// A run is over once the process has exited and both output streams are
/// closed, so background processes that keep writing are waited for, within
/// the same timeout. Whatever is left of the process group afterwards is
/// killed before this returns.
pub(crate) async fn supervise(
    program: &str,
    argv: &[String],
    timeout_secs: u64,
    kill: &KillHandle,
) -> ExecutionResult {
    let mut cmd = Command::new(program);
    cmd.args(argv)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    // own process group, so a kill reaches everything the snippet started
    #[cfg(unix)]
    cmd.process_group(0);

    tracing::debug!(program, ?argv, timeout_secs, "spawning");

    let started = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(program, error = %e, "spawn failed");
            return ExecutionResult::spawn_failure(program, &e, started.elapsed());
        }
    };
    let pid = child.id();

    let mut stdout = StreamCollector::spawn(child.stdout.take(), "stdout");
    let mut stderr = StreamCollector::spawn(child.stderr.take(), "stderr");

    let guard = CompletionGuard::new();
    let deadline = tokio::time::sleep(Duration::from_secs(timeout_secs));
    tokio::pin!(deadline);

    let exited = tokio::select! {
        biased;

        status = async {
            let status = child.wait().await;
            // background processes may still hold the pipes
            tokio::join!(stdout.closed(), stderr.closed());
            status
        } => {
            guard.settle(Termination::Exited);
            Some(status)
        }
        () = &mut deadline => {
            if guard.settle(Termination::TimedOut) {
                tracing::warn!(program, timeout_secs, "execution timed out, killing");
            }
            None
        }
        () = kill.requested() => {
            if guard.settle(Termination::Killed) {
                tracing::debug!(program, "kill requested");
            }
            None
        }
    };

    let status = match exited {
        Some(status) => status,
        None => {
            terminate(&mut child, pid);
            let status = child.wait().await;
            tokio::join!(stdout.drain(DRAIN_GRACE), stderr.drain(DRAIN_GRACE));
            status
        }
    };
    let elapsed = started.elapsed();

    // nothing the snippet started outlives the run
    if kill_group(pid) {
        tracing::debug!(program, "killed processes left running by the snippet");
    }

    let stdout = stdout.into_output();
    let stderr = stderr.into_output();
    let timed_out = guard.outcome() == Some(Termination::TimedOut);

    let exit_code = match status {
        Ok(status) => exit_code(status),
        Err(e) => {
            tracing::debug!(program, error = %e, "waiting for process failed");
            -1
        }
    };

    tracing::debug!(
        program,
        exit_code,
        elapsed_ms = millis(elapsed),
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        outcome = ?guard.outcome(),
        "finished"
    );

    ExecutionResult {
        stdout,
        stderr: if timed_out {
            timeout_message(timeout_secs)
        } else {
            stderr
        },
        exit_code: Some(exit_code),
        elapsed_ms: millis(elapsed),
        timed_out,
    }
}

/// Force-kill the child and its whole process group.
fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_group(pid);
    if let Err(e) = child.start_kill() {
        tracing::debug!(error = %e, "kill failed");
    }
}

/// SIGKILL the process group led by `pid`. Returns whether any process
/// received the signal.
#[cfg(unix)]
fn kill_group(pid: Option<u32>) -> bool {
    let Some(pid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        return false;
    };
    // SAFETY: plain syscall; a negative pid addresses the process group
    // created at spawn, which only contains the snippet's processes.
    let rc = unsafe { libc::kill(-pid, libc::SIGKILL) };
    if rc != 0 {
        let e = std::io::Error::last_os_error();
        if e.raw_os_error() != Some(libc::ESRCH) {
            tracing::debug!(pid, error = %e, "killpg failed");
        }
    }
    rc == 0
}

#[cfg(not(unix))]
fn kill_group(_pid: Option<u32>) -> bool {
    false
}

/// Exit code of a finished process; `128 + signal` when it was signalled.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn guard_settles_once() {
        let guard = CompletionGuard::new();
        assert_eq!(guard.outcome(), None);
        assert!(guard.settle(Termination::Exited));
        assert!(!guard.settle(Termination::TimedOut));
        assert!(!guard.settle(Termination::Killed));
        assert_eq!(guard.outcome(), Some(Termination::Exited));
    }

    #[test]
    fn guard_race_has_exactly_one_winner() {
        for _ in 0..64 {
            let guard = Arc::new(CompletionGuard::new());
            let contenders = [Termination::Exited, Termination::TimedOut, Termination::Killed];
            let winners: usize = std::thread::scope(|scope| {
                let handles: Vec<_> = contenders
                    .iter()
                    .map(|&t| {
                        let guard = guard.clone();
                        scope.spawn(move || guard.settle(t))
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap() as usize).sum()
            });
            assert_eq!(winners, 1);
            assert!(guard.outcome().is_some());
        }
    }

    #[test_log::test(tokio::test)]
    async fn kill_before_wait_is_remembered() {
        let kill = KillHandle::new();
        kill.kill();
        assert!(kill.is_requested());
        tokio::time::timeout(Duration::from_secs(1), kill.requested())
            .await
            .expect("a kill issued before waiting must not be lost");
    }

    #[test_log::test(tokio::test)]
    async fn collects_both_streams() {
        let result = supervise(
            "/bin/sh",
            &sh("echo out; echo err >&2; exit 3"),
            10,
            &KillHandle::new(),
        )
        .await;
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.timed_out);
    }

    #[test_log::test(tokio::test)]
    async fn preserves_order_within_a_stream() {
        let result = supervise(
            "/bin/sh",
            &sh("for i in 1 2 3 4 5; do echo $i; done"),
            10,
            &KillHandle::new(),
        )
        .await;
        assert_eq!(result.stdout, "1\n2\n3\n4\n5\n");
    }

    #[test_log::test(tokio::test)]
    async fn timeout_replaces_stderr() {
        let result = supervise(
            "/bin/sh",
            &sh("echo partial >&2; sleep 10"),
            1,
            &KillHandle::new(),
        )
        .await;
        assert!(result.timed_out);
        assert_eq!(result.stderr, "Execution timed out after 1s");
        assert_eq!(result.exit_code, Some(128 + libc::SIGKILL));
        assert!(result.elapsed_ms >= 1000);
        assert!(result.elapsed_ms < 5000, "kill took {}ms", result.elapsed_ms);
    }

    #[test_log::test(tokio::test)]
    async fn timeout_kills_grandchildren() {
        // the subshell keeps stdout open; without the group kill the readers
        // would only see EOF after the sleep finished
        let result = supervise(
            "/bin/sh",
            &sh("(sleep 20; echo late) & sleep 20"),
            1,
            &KillHandle::new(),
        )
        .await;
        assert!(result.timed_out);
        assert!(!result.stdout.contains("late"));
        assert!(result.elapsed_ms < 5000, "took {}ms", result.elapsed_ms);
    }

    #[test_log::test(tokio::test)]
    async fn waits_for_background_output() {
        let result = supervise(
            "/bin/sh",
            &sh("(sleep 1; echo late) & echo early"),
            10,
            &KillHandle::new(),
        )
        .await;
        assert_eq!(result.stdout, "early\nlate\n");
        assert!(!result.timed_out);
        assert_eq!(result.exit_code, Some(0));
    }

    #[test_log::test(tokio::test)]
    async fn timeout_bounds_background_processes() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let script = format!("(sleep 4; touch '{}') & echo early", marker.display());

        let started = Instant::now();
        let result = supervise("/bin/sh", &sh(&script), 1, &KillHandle::new()).await;
        let took = started.elapsed();

        assert!(result.timed_out);
        assert_eq!(result.stdout, "early\n");
        assert!(took < Duration::from_secs(3), "returned after {took:?}");

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(!marker.exists(), "background process outlived the timeout");
    }

    #[test_log::test(tokio::test)]
    async fn detached_leftovers_are_killed_on_exit() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        // closes its copies of the pipes, so the run ends right away
        let script = format!(
            "(sleep 2; touch '{}') >/dev/null 2>&1 & echo done",
            marker.display()
        );

        let result = supervise("/bin/sh", &sh(&script), 10, &KillHandle::new()).await;
        assert_eq!(result.stdout, "done\n");
        assert!(!result.timed_out);
        assert!(result.elapsed_ms < 1500, "took {}ms", result.elapsed_ms);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists(), "leftover process kept running");
    }

    #[test_log::test(tokio::test)]
    async fn fast_exit_is_not_a_timeout() {
        let result = supervise("/bin/sh", &sh("exit 0"), 1, &KillHandle::new()).await;
        assert!(!result.timed_out);
        assert_eq!(result.exit_code, Some(0));
    }

    #[test_log::test(tokio::test)]
    async fn user_kill_keeps_stderr() {
        let kill = KillHandle::new();
        let trigger = kill.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            trigger.kill();
        });

        let result = supervise(
            "/bin/sh",
            &sh("echo started >&2; sleep 10"),
            30,
            &kill,
        )
        .await;
        assert!(!result.timed_out);
        assert_eq!(result.stderr, "started\n");
        assert_eq!(result.exit_code, Some(128 + libc::SIGKILL));
    }

    #[test_log::test(tokio::test)]
    async fn missing_program_is_a_spawn_failure() {
        let result = supervise(
            "/definitely/not/a/real/tool",
            &[],
            5,
            &KillHandle::new(),
        )
        .await;
        assert_eq!(result.exit_code, Some(1));
        assert!(!result.timed_out);
        assert!(result.stderr.contains("/definitely/not/a/real/tool"));
        assert!(result.stderr.contains("is installed"));
    }
}

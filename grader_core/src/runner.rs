use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::Result;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One child-process invocation with its redirections and optional
/// wall-clock deadline. stderr is always appended so that successive
/// stages accumulate diagnostics in one shared log.
#[derive(Debug)]
pub struct RunSpec {
    pub command: PathBuf,
    pub args: Vec<OsString>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<PathBuf>,
    pub stderr: PathBuf,
    pub deadline: Option<Duration>,
}

/// Normalized result of one child process. Exactly one case holds;
/// a spawn failure is distinct from a non-zero exit.
#[derive(Debug)]
pub enum RunOutcome {
    Exited(i32),
    Signaled(i32),
    TimedOut,
    LaunchFailed(io::Error),
}

/// Launch the child described by `spec`, wait for it (or force-kill
/// it at the deadline) and report what happened. The child is always
/// reaped before this returns; its whole process group is killed on
/// timeout so no descendant survives either.
pub fn run(spec: &RunSpec) -> Result<RunOutcome> {
    let mut command = Command::new(&spec.command);
    command.args(&spec.args);

    match &spec.stdin {
        Some(path) => {
            command.stdin(Stdio::from(File::open(path)?));
        }
        None => {
            command.stdin(Stdio::null());
        }
    }
    match &spec.stdout {
        Some(path) => {
            command.stdout(Stdio::from(File::create(path)?));
        }
        None => {
            command.stdout(Stdio::null());
        }
    }
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&spec.stderr)?;
    command.stderr(Stdio::from(log));

    // own process group, so a deadline kill reaches descendants too
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            debug!("failed to launch `{}`: {}", spec.command.display(), err);
            return Ok(RunOutcome::LaunchFailed(err));
        }
    };

    match spec.deadline {
        None => {
            let status = child.wait()?;
            Ok(classify_exit(&status))
        }
        Some(deadline) => wait_with_deadline(&mut child, deadline),
    }
}

fn wait_with_deadline(child: &mut Child, deadline: Duration) -> Result<RunOutcome> {
    let armed = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(classify_exit(&status));
        }
        if armed.elapsed() >= deadline {
            kill_group(child.id());
            child.wait()?;
            return Ok(RunOutcome::TimedOut);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn classify_exit(status: &ExitStatus) -> RunOutcome {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => RunOutcome::Exited(code),
        None => RunOutcome::Signaled(status.signal().unwrap_or(0)),
    }
}

#[cfg(not(unix))]
fn classify_exit(status: &ExitStatus) -> RunOutcome {
    RunOutcome::Exited(status.code().unwrap_or(-1))
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    let killed = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if killed != 0 {
        // group already gone; the child exited between the poll and us
        warn!("killpg({}) failed: {}", pid, io::Error::last_os_error());
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn spec(command: PathBuf, stderr: PathBuf) -> RunSpec {
        RunSpec {
            command,
            args: Vec::new(),
            stdin: None,
            stdout: None,
            stderr,
            deadline: None,
        }
    }

    #[test]
    fn reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = script(dir.path(), "exit7.sh", "exit 7");
        let outcome = run(&spec(cmd, dir.path().join("err.log"))).unwrap();
        assert!(matches!(outcome, RunOutcome::Exited(7)));
    }

    #[test]
    fn reports_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = run(&spec(
            dir.path().join("no_such_binary"),
            dir.path().join("err.log"),
        ))
        .unwrap();
        assert!(matches!(outcome, RunOutcome::LaunchFailed(_)));
    }

    #[test]
    fn kills_at_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = script(dir.path(), "loop.sh", "sleep 30");
        let mut spec = spec(cmd, dir.path().join("err.log"));
        spec.deadline = Some(Duration::from_millis(200));

        let started = Instant::now();
        let outcome = run(&spec).unwrap();
        assert!(matches!(outcome, RunOutcome::TimedOut));
        // returned promptly, not after the sleep ran out
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn fast_child_beats_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = script(dir.path(), "ok.sh", "exit 0");
        let mut spec = spec(cmd, dir.path().join("err.log"));
        spec.deadline = Some(Duration::from_secs(5));
        let outcome = run(&spec).unwrap();
        assert!(matches!(outcome, RunOutcome::Exited(0)));
    }

    #[test]
    fn redirects_stdin_and_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = script(dir.path(), "cat.sh", "cat");
        let input = dir.path().join("input.txt");
        fs::write(&input, "42\n").unwrap();
        let output = dir.path().join("output.txt");

        let mut spec = spec(cmd, dir.path().join("err.log"));
        spec.stdin = Some(input);
        spec.stdout = Some(output.clone());
        let outcome = run(&spec).unwrap();
        assert!(matches!(outcome, RunOutcome::Exited(0)));
        assert_eq!(fs::read_to_string(&output).unwrap(), "42\n");
    }

    #[test]
    fn stderr_accumulates_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = script(dir.path(), "noise.sh", "echo oops >&2");
        let log = dir.path().join("err.log");

        run(&spec(cmd.clone(), log.clone())).unwrap();
        run(&spec(cmd, log.clone())).unwrap();
        assert_eq!(fs::read_to_string(&log).unwrap(), "oops\noops\n");
    }
}

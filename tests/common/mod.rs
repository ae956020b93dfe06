//! Shared test utilities and fixtures
//!
//! Every helper drives the real `waitstep` binary with an isolated config
//! file so the developer's `~/.waitstep/config.toml` never leaks in.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::process::{Child, ChildStderr, ChildStdout, Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde_json::Value;
use tempfile::NamedTempFile;

/// Config with no grace period so cancelled runs exit promptly.
pub const FAST_CONFIG: &str = "[cancellation]\ngrace_period_ms = 0\n";

/// A `waitstep` invocation bound to its own config file.
pub struct Plugin {
    config: NamedTempFile,
}

impl Plugin {
    pub fn new() -> Self {
        Self::with_config(FAST_CONFIG)
    }

    pub fn with_config(toml: &str) -> Self {
        let mut config = NamedTempFile::new().expect("create config file");
        config
            .write_all(toml.as_bytes())
            .expect("write config file");
        Self { config }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_waitstep"));
        cmd.env("WAITSTEP_CONFIG", self.config.path())
            .env_remove("WAITSTEP_GRACE_PERIOD_MS")
            .env("RUST_LOG", "debug")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run to completion with `stdin` as the input document.
    pub fn run_with_stdin(&self, args: &[&str], stdin: &str) -> Output {
        let mut child = self
            .command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn waitstep");
        let written = child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes());
        // The plugin may exit before reading stdin (unknown step, bad config).
        if let Err(err) = written {
            assert_eq!(err.kind(), ErrorKind::BrokenPipe, "write stdin: {err}");
        }
        child.wait_with_output().expect("wait for waitstep")
    }

    /// Spawn with every stream piped and stdin left open.
    pub fn spawn(&self, args: &[&str]) -> Child {
        self.command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn waitstep")
    }
}

/// Parse the single JSON document the plugin writes to stdout.
pub fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

/// Block until a stderr line contains `needle`. Returns the reader so the
/// caller can keep draining it.
pub fn wait_for_log(stderr: ChildStderr, needle: &str) -> BufReader<ChildStderr> {
    let mut reader = BufReader::new(stderr);
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).expect("read stderr");
        assert!(read > 0, "stderr closed before {needle:?} was logged");
        if line.contains(needle) {
            return reader;
        }
    }
}

/// Stdout captured with the moments the document completed and the pipe closed.
pub struct TimedStdout {
    pub text: String,
    /// When the closing `}` of the top-level document was read.
    pub document_at: Option<Instant>,
    /// When stdout hit EOF, i.e. the process exited.
    pub closed_at: Instant,
}

impl TimedStdout {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.text))
    }
}

/// Drain stdout on a background thread, timestamping the document and EOF.
pub fn time_stdout(stdout: ChildStdout) -> JoinHandle<TimedStdout> {
    thread::spawn(move || {
        let mut reader = BufReader::new(stdout);
        let mut text = String::new();
        let mut document_at = None;
        let mut line = String::new();
        loop {
            line.clear();
            let read = reader.read_line(&mut line).expect("read stdout");
            if read == 0 {
                break;
            }
            // Pretty output closes the top-level object on a line of its own.
            if document_at.is_none() && line.trim_end() == "}" {
                document_at = Some(Instant::now());
            }
            text.push_str(&line);
        }
        TimedStdout {
            text,
            document_at,
            closed_at: Instant::now(),
        }
    })
}

/// Send `signal` to the child process.
#[cfg(unix)]
pub fn send_signal(child: &Child, signal: libc::c_int) {
    let pid = libc::pid_t::try_from(child.id()).expect("pid fits in pid_t");
    // SAFETY: plain kill(2) on a child we spawned and have not reaped.
    let rc = unsafe { libc::kill(pid, signal) };
    assert_eq!(rc, 0, "kill failed");
}

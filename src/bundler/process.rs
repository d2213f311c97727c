//! External command execution.
//!
//! Every stage and build directive goes through [`ProcessRunner::run`]: the
//! command is interpreted by the platform shell, its output is streamed to the
//! log line by line, and the exit code is mapped onto the pipeline's
//! success/failure contract (0 is success, anything else is
//! [`Error::Process`]).

use crate::bundler::error::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Output of a successful run.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Exit code (always 0)
    pub exit_code: i32,
    /// Non-blank stdout lines
    pub stdout: Vec<String>,
    /// Non-blank stderr lines
    pub stderr: Vec<String>,
}

/// Runs shell commands for the pipeline.
///
/// Cheap to clone; runs started from different clones are independent.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    cancel: Option<CancellationToken>,
}

impl ProcessRunner {
    /// Creates a runner without cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner whose children are killed when `token` is cancelled.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
        }
    }

    /// Runs `command` with `arguments` in `working_dir` through the shell.
    ///
    /// Resolves only after the child exits and both output streams are
    /// drained.
    pub async fn run<S: AsRef<str>>(
        &self,
        command: &str,
        arguments: &[S],
        working_dir: &Path,
    ) -> Result<ProcessOutput> {
        let command_line = command_line(command, arguments);
        log::debug!("Running `{}` in {}", command_line, working_dir.display());

        let mut command = shell_command(&command_line);
        // Cancellable runs get their own process group so the whole tree can
        // be signalled, not only the shell.
        #[cfg(unix)]
        {
            if self.cancel.is_some() {
                command.process_group(0);
            }
        }

        let mut child = command
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| Error::CommandFailed {
                command: command_line.clone(),
                error,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both streams must be drained before the exit status is read.
        let streams = async { tokio::join!(pump(stdout), pump(stderr)) };

        let (stdout, stderr) = tokio::select! {
            lines = streams => lines,
            _ = cancelled(self.cancel.as_ref()) => {
                log::warn!("Cancelling `{}`", command_line);
                terminate(&mut child, &command_line).await;
                return Err(Error::Cancelled);
            }
        };

        let status = child.wait().await.map_err(|error| Error::CommandFailed {
            command: command_line.clone(),
            error,
        })?;

        log::info!("`{}` exited with code: {:?}", command_line, status.code());

        match status.code() {
            Some(0) => Ok(ProcessOutput {
                exit_code: 0,
                stdout,
                stderr,
            }),
            exit_code => Err(Error::Process {
                command: command_line,
                working_dir: working_dir.to_path_buf(),
                exit_code,
            }),
        }
    }
}

/// Joins the command and its arguments the way the shell will see them.
pub fn command_line<S: AsRef<str>>(command: &str, arguments: &[S]) -> String {
    std::iter::once(command)
        .chain(arguments.iter().map(AsRef::as_ref))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command_line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command_line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command_line);
    cmd
}

/// Kills the child and, on Unix, every process in its group.
///
/// On Windows only the shell itself is killed; its descendants keep running.
async fn terminate(child: &mut Child, command_line: &str) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                log::debug!("Failed to signal process group of `{}`: {}", command_line, e);
            }
        }
    }

    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill `{}`: {}", command_line, e);
    }
}

/// Logs and collects the non-blank lines of one output stream.
///
/// Reads until EOF. Bytes that are not UTF-8 (OEM code pages on Windows) are
/// replaced rather than ending the read, so the child never sees a closed pipe.
async fn pump<R: AsyncRead + Unpin>(stream: Option<R>) -> Vec<String> {
    let mut captured = Vec::new();
    let Some(stream) = stream else {
        return captured;
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to read child output: {}", e);
                break;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        // Wrapped shell tooling emits spurious empty output.
        if line.trim().is_empty() {
            continue;
        }
        log::info!("{}", line);
        captured.push(line.to_string());
    }
    captured
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Quotes a single argument for the platform shell when it needs it.
#[cfg(not(windows))]
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Quotes a single argument for the platform shell when it needs it.
#[cfg(windows)]
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || "\"&|<>^".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\\\""))
    }
}

//! Runs external collaborator programs (espeak-ng, the voice cloning worker,
//! ffmpeg).
//!
//! One-shot invocations capture exit status and output and are bounded by a
//! timeout after which the child is killed. Long-lived workers answer one
//! line of stdout per line written to their stdin.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Longest stderr excerpt carried in an error message
const STDERR_EXCERPT_CHARS: usize = 2000;

/// Longest output excerpt written to the debug log
const LOG_EXCERPT_CHARS: usize = 500;

/// Grace period for collecting a worker's exit status once its output closes
const EXIT_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {} seconds", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with {}: {stderr}", exit_label(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O with {program} failed: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A program invocation: executable plus arguments.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Result of a successful run. Output is logged, not returned.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run the command to completion.
    ///
    /// A non-zero exit status is reported as [`ProcessError::Failed`] with the
    /// tail of stderr attached.
    pub async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        let start = Instant::now();
        tracing::debug!(command = %spec, "Starting external process");

        let child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProcessError::TimedOut {
                program: spec.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let elapsed = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            tracing::warn!(
                program = %spec.program,
                code = ?output.status.code(),
                latency_ms = elapsed.as_millis(),
                "External process failed"
            );
            return Err(ProcessError::Failed {
                program: spec.program.clone(),
                code: output.status.code(),
                stderr: tail(&stderr, STDERR_EXCERPT_CHARS),
            });
        }

        tracing::debug!(
            program = %spec.program,
            latency_ms = elapsed.as_millis(),
            stdout = %tail(&stdout, LOG_EXCERPT_CHARS),
            stderr = %tail(&stderr, LOG_EXCERPT_CHARS),
            "External process finished"
        );

        Ok(ProcessOutput { elapsed })
    }

    /// Start a long-lived child with piped stdin and stdout.
    ///
    /// The child's stderr is forwarded to the debug log line by line. Every
    /// read from the worker is bounded by this runner's timeout.
    pub fn spawn_worker(&self, spec: &CommandSpec) -> Result<WorkerProcess, ProcessError> {
        tracing::debug!(command = %spec, "Starting worker process");

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(ProcessError::Io {
                program: spec.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipes not captured"),
            });
        };

        if let Some(stderr) = child.stderr.take() {
            let program = spec.program.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    tracing::debug!(program = %program, "{line}");
                }
            });
        }

        Ok(WorkerProcess {
            program: spec.program.clone(),
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            timeout: self.timeout,
        })
    }
}

/// A running child driven through a line protocol. Killed when dropped.
#[derive(Debug)]
pub struct WorkerProcess {
    program: String,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    timeout: Duration,
}

impl WorkerProcess {
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Write one line to the worker's stdin.
    pub async fn send_line(&mut self, line: &str) -> Result<(), ProcessError> {
        match write_line(&mut self.stdin, line).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Err(self.exited().await),
            Err(source) => Err(ProcessError::Io {
                program: self.program.clone(),
                source,
            }),
        }
    }

    /// Wait for the next line the worker prints.
    ///
    /// On timeout the worker is killed: a late reply must never answer the
    /// next request.
    pub async fn read_line(&mut self) -> Result<String, ProcessError> {
        match tokio::time::timeout(self.timeout, self.stdout.next_line()).await {
            Ok(Ok(Some(line))) => Ok(line),
            Ok(Ok(None)) => Err(self.exited().await),
            Ok(Err(source)) => Err(ProcessError::Io {
                program: self.program.clone(),
                source,
            }),
            Err(_) => {
                tracing::warn!(program = %self.program, "Worker timed out, killing it");
                let _ = self.child.start_kill();
                Err(ProcessError::TimedOut {
                    program: self.program.clone(),
                    timeout: self.timeout,
                })
            }
        }
    }

    async fn exited(&mut self) -> ProcessError {
        let code = match tokio::time::timeout(EXIT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => status.code(),
            _ => None,
        };
        tracing::warn!(program = %self.program, code = ?code, "Worker exited");
        ProcessError::Failed {
            program: self.program.clone(),
            code,
            stderr: "worker closed its output".to_string(),
        }
    }
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> std::io::Result<()> {
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn tail(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    let count = trimmed.chars().count();
    if count <= max_chars {
        trimmed.to_string()
    } else {
        trimmed.chars().skip(count - max_chars).collect()
    }
}

//! Shell command runner for changewise.
//!
//! Commands are written as templates with `%s` placeholders that are
//! interpolated textually into one `sh -c` string; callers quote values
//! with [`quote`] where needed. `%%` is a literal percent sign.
//!
//! Captured output is bounded: exceeding `max_output_bytes` fails the call
//! rather than truncating, which keeps pathological (minified,
//! concatenated) diffs from exhausting memory.

use crate::error::{ChangewiseError, Result};
use std::borrow::Cow;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Default ceiling on captured stdout (800 KiB).
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 800 * 1024;

/// Limits applied to one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    pub max_output_bytes: usize,
    /// Kill the command if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            timeout: None,
        }
    }
}

/// Captured output of a successful command. Streams are not trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }

    /// Stdout split into lines, without the trailing empty line.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

/// Quote a value for safe interpolation into a template.
pub fn quote(value: &str) -> Cow<'_, str> {
    shell_words::quote(value)
}

/// Count the placeholders in a template. `%%` does not count.
pub fn placeholder_count(template: &str) -> usize {
    let mut count = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
            }
            Some(next) if next.is_alphanumeric() || *next == '_' => {
                chars.next();
                count += 1;
            }
            _ => {}
        }
    }
    count
}

/// Substitute `args` into the template's placeholders, in order.
///
/// # Returns
///
/// * `Ok(String)` - The interpolated command line
/// * `Err(ChangewiseError::ArgumentCountMismatch)` - Placeholder and argument counts differ
pub fn interpolate(template: &str, args: &[&str]) -> Result<String> {
    let expected = placeholder_count(template);
    if expected != args.len() {
        return Err(ChangewiseError::ArgumentCountMismatch {
            expected,
            got: args.len(),
        });
    }

    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(next) if next.is_alphanumeric() || next == '_' => {
                chars.next();
                // counts were checked above
                if let Some(arg) = args.next() {
                    out.push_str(arg);
                }
            }
            _ => out.push('%'),
        }
    }
    Ok(out)
}

/// Run a command template in `cwd`.
///
/// The argument count is validated before any process is spawned.
///
/// # Returns
///
/// * `Ok(CommandOutput)` - Exit status 0 within the output and time limits
/// * `Err(ChangewiseError::ArgumentCountMismatch)` - Wrong number of arguments
/// * `Err(ChangewiseError::OutputTooLarge)` - Stdout exceeded `max_output_bytes`
/// * `Err(ChangewiseError::Timeout)` - The deadline passed; the child was killed
/// * `Err(ChangewiseError::CommandFailed)` - Non-zero exit or killed by a signal
/// * `Err(ChangewiseError::Spawn)` - The shell could not be started
pub fn execute(
    cwd: &Path,
    template: &str,
    args: &[&str],
    options: &ExecOptions,
) -> Result<CommandOutput> {
    let command = interpolate(template, args)?;
    let started = Instant::now();

    let spawn_error = |source: io::Error| ChangewiseError::Spawn {
        command: command.clone(),
        source,
    };

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    let limit = options.max_output_bytes;
    let stdout_reader = spawn_capped_reader(child.stdout.take(), limit);
    let stderr_reader = spawn_capped_reader(child.stderr.take(), limit);

    let status = wait_for(&mut child, options.timeout).map_err(spawn_error)?;

    let (stdout, stdout_overflow) = join_reader(stdout_reader).map_err(spawn_error)?;
    let (stderr, _) = join_reader(stderr_reader).map_err(spawn_error)?;

    tracing::debug!(
        command = %command,
        cwd = %cwd.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "command finished"
    );

    let Some(status) = status else {
        return Err(ChangewiseError::Timeout {
            command,
            after: options.timeout.unwrap_or_default(),
        });
    };

    if stdout_overflow {
        return Err(ChangewiseError::OutputTooLarge { command, limit });
    }

    let stdout = String::from_utf8_lossy(&stdout).into_owned();
    let stderr = String::from_utf8_lossy(&stderr).into_owned();

    if !status.success() {
        return Err(ChangewiseError::CommandFailed {
            command,
            cwd: cwd.to_path_buf(),
            code: status.code(),
            signal: exit_signal(&status),
            stdout,
            stderr,
        });
    }

    Ok(CommandOutput { stdout, stderr })
}

/// Wait for the child, killing it once the deadline passes.
///
/// Returns `Ok(None)` on timeout.
fn wait_for(child: &mut Child, timeout: Option<Duration>) -> io::Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return child.wait().map(Some);
    };

    match child.wait_timeout(timeout)? {
        Some(status) => Ok(Some(status)),
        None => {
            if let Err(e) = child.kill() {
                tracing::warn!("failed to kill timed out command: {}", e);
            }
            child.wait()?;
            Ok(None)
        }
    }
}

type CappedRead = io::Result<(Vec<u8>, bool)>;

/// Read a stream on its own thread, keeping at most `limit` bytes.
///
/// Bytes beyond the limit are drained and discarded so the child never
/// blocks on a full pipe; the flag reports that the limit was exceeded.
fn spawn_capped_reader<R: Read + Send + 'static>(
    stream: Option<R>,
    limit: usize,
) -> JoinHandle<CappedRead> {
    thread::spawn(move || {
        let Some(mut stream) = stream else {
            return Ok((Vec::new(), false));
        };

        let mut kept = Vec::new();
        (&mut stream)
            .take(limit as u64 + 1)
            .read_to_end(&mut kept)?;

        if kept.len() <= limit {
            return Ok((kept, false));
        }

        kept.truncate(limit);
        io::copy(&mut stream, &mut io::sink())?;
        Ok((kept, true))
    })
}

fn join_reader(handle: JoinHandle<CappedRead>) -> io::Result<(Vec<u8>, bool)> {
    handle
        .join()
        .map_err(|_| io::Error::other("output reader thread panicked"))?
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

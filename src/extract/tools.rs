//! Subprocess plumbing for the external PDF and OCR tools.
//!
//! Every external invocation goes through `run_with_timeout` so a hung tool
//! cannot block a request forever. A missing binary is always surfaced as
//! `ToolNotFound`, never as a document-level failure.

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use super::ExtractionError;

/// External binaries the pipeline shells out to.
pub const REQUIRED_TOOLS: &[&str] = &[
    "pdffonts",
    "pdfinfo",
    "pdftotext",
    "pdfimages",
    "pdftoppm",
    "exiftool",
    "tesseract",
];

/// Poll interval while waiting on a child process.
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check availability of all required tools.
pub fn check_tools() -> Vec<(String, bool)> {
    REQUIRED_TOOLS
        .iter()
        .map(|tool| (tool.to_string(), check_binary(tool)))
        .collect()
}

/// Run a command to completion with a deadline, killing it on expiry.
pub fn run_with_timeout(
    mut cmd: Command,
    tool_name: &str,
    timeout: Duration,
) -> Result<Output, ExtractionError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractionError::ToolNotFound(tool_name.to_string()));
        }
        Err(e) => return Err(ExtractionError::Io(e)),
    };

    // Drain pipes on separate threads so a chatty child cannot deadlock
    // against a full pipe buffer while we poll its exit status.
    let stdout_reader = child.stdout.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExtractionError::Timeout(tool_name.to_string()));
                }
                std::thread::sleep(WAIT_POLL);
            }
            Err(e) => return Err(ExtractionError::Io(e)),
        }
    };

    let stdout = stdout_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_reader
        .and_then(|h| h.join().ok())
        .unwrap_or_default();

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

/// Run a command and return its stdout as a string, or a descriptive error.
pub fn run_tool(
    cmd: Command,
    tool_name: &str,
    error_prefix: &str,
    timeout: Duration,
) -> Result<String, ExtractionError> {
    let output = run_with_timeout(cmd, tool_name, timeout)?;
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(ExtractionError::ExtractionFailed(format!(
            "{}: {}",
            error_prefix,
            stderr.trim()
        )))
    }
}

/// Run a command for its side effects only, checking the exit status.
pub fn run_tool_status(
    cmd: Command,
    tool_name: &str,
    error_msg: &str,
    timeout: Duration,
) -> Result<(), ExtractionError> {
    let output = run_with_timeout(cmd, tool_name, timeout)?;
    if output.status.success() {
        Ok(())
    } else {
        Err(ExtractionError::ExtractionFailed(error_msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_tools_covers_all_required_binaries() {
        let tools = check_tools();
        assert_eq!(tools.len(), REQUIRED_TOOLS.len());
        for (tool, available) in tools {
            println!("{}: {}", tool, if available { "found" } else { "missing" });
        }
    }

    #[test]
    fn missing_binary_is_an_environment_error() {
        let cmd = Command::new("definitely-not-a-real-binary-xyz");
        let err = run_with_timeout(cmd, "definitely-not-a-real-binary-xyz", Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ToolNotFound(_)));
        assert!(err.is_environment());
    }

    #[test]
    fn timeout_kills_hung_process() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let start = Instant::now();
        let err = run_with_timeout(cmd, "sleep", Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn successful_command_returns_stdout() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");
        let out = run_tool(cmd, "echo", "echo failed", Duration::from_secs(5)).unwrap();
        assert_eq!(out.trim(), "hello");
    }
}

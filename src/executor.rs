//! Shell execution for confirmed commands.
//!
//! Every command goes through a single indirect shell invocation (`sh -c` on
//! Unix, `cmd /C` on Windows) so the generated text may use pipes, globs and
//! redirections. Standard output and standard error share one pipe, so the
//! captured text keeps the order in which the command wrote it.

use crate::error::{GromitError, Result};
use std::io::Read;
use std::process::{Command, ExitStatus};
use tracing::{debug, error, info};

/// Exit status plus everything the process wrote to stdout and stderr,
/// interleaved as written.
#[derive(Debug, Clone)]
pub struct CombinedOutput {
    pub status: ExitStatus,
    pub output: Vec<u8>,
}

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Executes a program and waits for its combined output.
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CombinedOutput>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CombinedOutput> {
        let (mut reader, writer) = os_pipe::pipe()?;
        let writer_for_stderr = writer.try_clone()?;

        // The Command owns the write ends; dropping it right after spawn
        // leaves the child as the only writer, so the read below sees EOF.
        let mut child = {
            let mut command = Command::new(program);
            command.args(args).stdout(writer).stderr(writer_for_stderr);
            command.spawn()?
        };

        let mut output = Vec::new();
        reader.read_to_end(&mut output)?;
        let status = child.wait()?;

        Ok(CombinedOutput { status, output })
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

// =============================================================================
// ShellExecutor
// =============================================================================

/// Returns the shell program and the flag that makes it run a command string.
pub fn shell_invocation() -> (&'static str, &'static str) {
    if cfg!(windows) { ("cmd", "/C") } else { ("sh", "-c") }
}

/// Runs literal command strings through the OS shell.
///
/// # Example
///
/// ```no_run
/// use gromit::executor::ShellExecutor;
///
/// let executor = ShellExecutor::new();
/// let listing = executor.run("ls | head -n 3")?;
/// println!("{listing}");
/// # Ok::<(), gromit::error::GromitError>(())
/// ```
pub struct ShellExecutor {
    runner: Box<dyn ProcessRunner>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemProcessRunner))
    }

    /// Creates an executor with a custom process runner (for testing).
    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Runs `command` and returns its combined, trimmed output.
    ///
    /// # Errors
    ///
    /// Returns [`GromitError::Execution`] if the shell is missing, cannot be
    /// spawned, or the command exits with a non-zero status. In the last case
    /// the error message carries whatever output the command produced.
    pub fn run(&self, command: &str) -> Result<String> {
        let (shell, flag) = shell_invocation();

        if !self.runner.program_exists(shell) {
            return Err(GromitError::Execution {
                message: format!("shell '{shell}' not found in PATH"),
                output: String::new(),
            });
        }

        info!("Executing via {} {}: {}", shell, flag, command);
        let result = self
            .runner
            .run(shell, &[flag, command])
            .map_err(|e| GromitError::Execution {
                message: format!("failed to start {shell}: {e}"),
                output: String::new(),
            })?;

        let combined = String::from_utf8_lossy(&result.output).trim().to_string();

        if result.status.success() {
            debug!("Command succeeded with {} bytes of output", combined.len());
            Ok(combined)
        } else {
            error!("Command failed with status: {}", result.status);
            let message = if combined.is_empty() {
                format!("command failed with {}", result.status)
            } else {
                format!("command failed with {}: {}", result.status, combined)
            };
            Err(GromitError::Execution {
                message,
                output: combined,
            })
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

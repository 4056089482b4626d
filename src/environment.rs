//! Facts about the machine gromit runs on, captured once at startup.

use crate::executor::ShellExecutor;
use tracing::warn;

/// Read-only description of the user's environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFacts {
    /// OS family as reported by the Rust target (`linux`, `macos`, `windows`, ...).
    pub operating_system: String,
    /// Value of `$SHELL`; empty on Windows or when unset.
    pub current_shell: String,
    /// Output of `uname -a` (or `ver` on Windows); empty if it could not be read.
    pub kernel_info: String,
    /// Line delimiter for user-facing output.
    pub delimiter: String,
}

impl EnvironmentFacts {
    /// Captures the facts for the running process.
    ///
    /// Failing to read kernel information is logged and leaves the field
    /// empty; it never aborts startup.
    pub fn capture(executor: &ShellExecutor) -> Self {
        let operating_system = std::env::consts::OS.to_string();
        let is_windows = operating_system.to_lowercase().contains("windows");

        let (delimiter, current_shell, kernel_command) = if is_windows {
            ("\r\n", String::new(), "ver")
        } else {
            (
                "\n",
                std::env::var("SHELL").unwrap_or_default(),
                "uname -a",
            )
        };

        let kernel_info = executor.run(kernel_command).unwrap_or_else(|e| {
            warn!("Error retrieving runtime information: {}", e);
            String::new()
        });

        Self {
            operating_system,
            current_shell,
            kernel_info,
            delimiter: delimiter.to_string(),
        }
    }
}

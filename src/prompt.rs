//! Builds the system instruction sent to the provider.

use crate::environment::EnvironmentFacts;

/// Instruction used when the caller does not supply `--systemPrompt`.
pub const BASE_INSTRUCTION: &str = "You are an assistant providing terminal commands based on user's questions. \
You will be given a question about how to do something in the CLI environment. \
You will then find out what command to execute and provide the command. \
Do not provide any additional information, explanation or context, just the command. \
For example, if question is about listing all files in a directory for linux, respond with \"ls\"";

/// Appends environment facts to the instruction.
///
/// Starts from `override_instruction` when it is non-empty, otherwise from
/// [`BASE_INSTRUCTION`]. The OS is always appended; kernel info and shell only
/// when known, and always in that order.
pub fn compose(override_instruction: Option<&str>, facts: &EnvironmentFacts) -> String {
    let base = match override_instruction {
        Some(text) if !text.is_empty() => text,
        _ => BASE_INSTRUCTION,
    };

    let mut result = format!(
        "{}. User's operating system is {}",
        base, facts.operating_system
    );
    if !facts.kernel_info.is_empty() {
        result.push_str(&format!(". User's kernel info is {}", facts.kernel_info));
    }
    if !facts.current_shell.is_empty() {
        result.push_str(&format!(". User's current shell is {}", facts.current_shell));
    }
    result
}

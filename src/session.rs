//! The interactive turn loop.
//!
//! A session resolves the user's request into a command, shows it, asks for
//! confirmation, runs it, and then offers another turn:
//!
//! ```text
//! AwaitingQuery -> Resolving -> AwaitingConfirmation -> Executing -> Continuing
//!                      ^                                                 |
//!                      +------------------- yes -------------------------+
//! ```
//!
//! Any error from resolving, confirming or executing ends the session and is
//! returned to the caller untouched.

use crate::environment::EnvironmentFacts;
use crate::error::{GromitError, Result};
use crate::executor::ShellExecutor;
use crate::printer::MessagePrinter;
use crate::prompt;
use crate::translator::{AiParameters, ProviderSelector};
use std::io::{BufRead, Write};
use tokio::sync::watch;
use tracing::{debug, info};

/// How many unintelligible answers we accept before giving up.
pub const MAX_CONFIRMATION_ATTEMPTS: usize = 5;

pub const USAGE_HINT: &str = "Please run gromit --help to see usage";

const OUTPUT_BORDER_WIDTH: usize = 50;

/// Receiver side of the cancellation signal; `true` means stop.
pub type CancelSignal = watch::Receiver<bool>;

/// Creates a cancellation pair that starts out not cancelled.
pub fn cancellation() -> (watch::Sender<bool>, CancelSignal) {
    watch::channel(false)
}

/// Per-run settings, fixed before the first turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParameters {
    pub ai: AiParameters,
    /// Replaces the built-in base instruction when set and non-empty.
    pub system_prompt: Option<String>,
    pub ask_for_confirmation: bool,
    pub prompt_prefix: String,
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self {
            ai: AiParameters::default(),
            system_prompt: None,
            ask_for_confirmation: true,
            prompt_prefix: "⚡️🐶".to_string(),
        }
    }
}

/// A yes/no answer from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub confirmed: bool,
}

impl Confirmation {
    /// Interprets a raw answer. Only `yes`/`y`/`no`/`n` (any case) are
    /// accepted; everything else, including blank input, is `None`.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "yes" | "y" => Some(Self { confirmed: true }),
            "no" | "n" => Some(Self { confirmed: false }),
            _ => None,
        }
    }
}

pub struct Session<R: BufRead, W: Write> {
    params: SessionParameters,
    instruction: String,
    selector: Box<dyn ProviderSelector>,
    executor: ShellExecutor,
    input: R,
    printer: MessagePrinter<W>,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Creates a session. The system instruction is composed once here from
    /// the parameters and environment facts.
    pub fn new(
        params: SessionParameters,
        facts: &EnvironmentFacts,
        selector: Box<dyn ProviderSelector>,
        input: R,
        output: W,
    ) -> Self {
        let instruction = prompt::compose(params.system_prompt.as_deref(), facts);
        let printer = MessagePrinter::new(output, params.prompt_prefix.clone(), facts.delimiter.clone());
        Self {
            params,
            instruction,
            selector,
            executor: ShellExecutor::new(),
            input,
            printer,
        }
    }

    /// Replaces the shell executor (for testing).
    pub fn with_executor(mut self, executor: ShellExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Gives back the output sink.
    pub fn into_output(self) -> W {
        self.printer.into_inner()
    }

    /// Runs the session starting with `query`.
    ///
    /// An empty query prints a usage hint and succeeds without contacting
    /// any provider. `cancel` is checked before each offer of another turn.
    pub async fn run(&mut self, query: &str, cancel: &CancelSignal) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            self.say(USAGE_HINT)?;
            return Ok(());
        }

        self.handle_query(query).await?;

        while !*cancel.borrow() {
            match self.ask_confirmation("Can I help you with anything else?")? {
                Some(true) => {}
                Some(false) => break,
                None => {
                    debug!("Input ended at the continuation prompt");
                    break;
                }
            }
            self.say("How can I help?")?;
            match self.read_utterance()? {
                Some(next) => self.handle_query(&next).await?,
                None => break,
            }
        }

        if *cancel.borrow() {
            info!("Session cancelled");
        }
        Ok(())
    }

    /// One turn: resolve, show, confirm, execute.
    async fn handle_query(&mut self, query: &str) -> Result<()> {
        let translator = self.selector.select(&self.params.ai)?;
        info!(
            "Translating with {} ({}): {}",
            translator.name(),
            translator.model(),
            query
        );
        let command = translator.translate(query, &self.instruction).await?;
        debug!("Candidate command: {}", command);

        self.say("In order to do that, you need to run:")?;
        self.say(&command)?;

        match self.ask_confirmation("Would you like to run this command?")? {
            Some(true) => self.execute(&command),
            Some(false) => {
                self.say("You chose not to execute this command.")?;
                Ok(())
            }
            None => {
                self.say("Error reading your response")?;
                Err(GromitError::ConfirmationInput(
                    "unexpected end of input".to_string(),
                ))
            }
        }
    }

    fn execute(&mut self, command: &str) -> Result<()> {
        self.say("Running the command...")?;
        match self.executor.run(command) {
            Ok(output) => {
                let border = "-".repeat(OUTPUT_BORDER_WIDTH);
                self.say("Command output:")?;
                self.say(&border)?;
                self.say(&output)?;
                self.say(&border)?;
                Ok(())
            }
            Err(e) => {
                self.say(&format!("error running the command: {e}"))?;
                Err(e)
            }
        }
    }

    /// Asks `message` until a valid yes/no arrives. Auto-confirms when the
    /// confirmation gate is off. `None` means input ended before an answer.
    fn ask_confirmation(&mut self, message: &str) -> Result<Option<bool>> {
        if !self.params.ask_for_confirmation {
            return Ok(Some(true));
        }

        match self.read_confirmation(message) {
            Ok(confirmation) => Ok(confirmation.map(|c| c.confirmed)),
            Err(e) => {
                self.say("Error reading your response")?;
                Err(e)
            }
        }
    }

    fn read_confirmation(&mut self, message: &str) -> Result<Option<Confirmation>> {
        for _ in 0..MAX_CONFIRMATION_ATTEMPTS {
            self.say(message)?;

            let mut answer = String::new();
            let read = self
                .input
                .read_line(&mut answer)
                .map_err(|e| GromitError::ConfirmationInput(e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }

            match Confirmation::parse(&answer) {
                Some(confirmation) => return Ok(Some(confirmation)),
                None => self.say(
                    "You didn't confirm your choice! Please reply with yes(y) or no(n).",
                )?,
            }
        }

        Err(GromitError::ConfirmationInput(format!(
            "no valid answer after {MAX_CONFIRMATION_ATTEMPTS} attempts"
        )))
    }

    /// Reads the next request. End of input or a blank line means the user
    /// is done.
    fn read_utterance(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| GromitError::ConfirmationInput(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }
        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }

    fn say(&mut self, message: &str) -> Result<()> {
        Ok(self.printer.print(message)?)
    }
}

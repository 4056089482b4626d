//! Gromit - describe a shell action in plain words and run the command an AI
//! backend suggests for it.
//!
//! A session takes the user's request, asks a pluggable provider (OpenAI,
//! Anthropic or Gemini) for one literal command, shows it, and runs it through
//! the OS shell only after the user confirms. Afterwards it offers another
//! turn until the user declines.
//!
//! # Architecture
//!
//! - [`cli`] - argument parsing, merged with the config file
//! - [`config`] - `~/.gromit/config.toml` and environment overrides
//! - [`environment`] - OS, shell and kernel facts captured at startup
//! - [`prompt`] - system instruction composition
//! - [`translator`] - provider adapters and agent/model selection
//! - [`http_client`] - HTTP client abstraction used by the adapters
//! - [`session`] - the confirm/execute/continue loop
//! - [`executor`] - runs confirmed commands through the shell
//! - [`printer`] - decorated output for everything the user sees
//! - [`error`] - the error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use gromit::environment::EnvironmentFacts;
//! use gromit::executor::ShellExecutor;
//! use gromit::session::{cancellation, Session, SessionParameters};
//! use gromit::translator::DefaultSelector;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let facts = EnvironmentFacts::capture(&ShellExecutor::new());
//!     let (_cancel_tx, cancel_rx) = cancellation();
//!     let mut session = Session::new(
//!         SessionParameters::default(),
//!         &facts,
//!         Box::new(DefaultSelector::new()),
//!         std::io::stdin().lock(),
//!         std::io::stdout(),
//!     );
//!     session.run("list all files in the current directory", &cancel_rx).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod printer;
pub mod prompt;
pub mod session;
pub mod translator;

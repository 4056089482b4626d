use gromit::cli::{self, CliAction};
use gromit::config::Config;
use gromit::environment::EnvironmentFacts;
use gromit::executor::ShellExecutor;
use gromit::session::{self, Session};
use gromit::translator::{DefaultSelector, MockSelector, ProviderSelector};
use std::io;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error running gromit: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("GROMIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run() -> anyhow::Result<()> {
    let matches = match cli::parse_args(std::env::args_os()) {
        Ok(matches) => matches,
        Err(e) => e.exit(),
    };
    let config = Config::load()?;

    match cli::action_from_matches(&matches, &config)? {
        CliAction::ShowConfig => {
            config.show_config_info(&Config::get_config_path()?, &mut io::stdout())?;
        }
        CliAction::SetApiKey { agent, api_key } => {
            // Reload so environment overrides are not written back to disk.
            let path = Config::get_config_path()?;
            let mut stored = Config::load_from(&path)?;
            stored.set_api_key(agent.name(), api_key);
            stored.save_to(&path)?;
            println!("✅ API key for {agent} saved successfully");
        }
        CliAction::Run { params, query } => {
            info!("Processing query: {:?}", query);

            let facts = EnvironmentFacts::capture(&ShellExecutor::new());
            let selector: Box<dyn ProviderSelector> = if config.use_mock {
                info!("Using mock translator ({} is set)", gromit::config::MOCK_ENV_VAR);
                Box::new(MockSelector)
            } else {
                Box::new(DefaultSelector::new().with_stored_keys(config.api_keys.clone()))
            };

            let (cancel_tx, cancel_rx) = session::cancellation();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted; press Ctrl-C again to quit immediately");
                    let _ = cancel_tx.send(true);
                    if tokio::signal::ctrl_c().await.is_ok() {
                        std::process::exit(130);
                    }
                }
            });

            let mut session = Session::new(params, &facts, selector, io::stdin().lock(), io::stdout());
            session.run(&query, &cancel_rx).await?;
        }
    }

    Ok(())
}

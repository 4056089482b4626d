//! Command-line surface: turns argv plus the config file into what `main`
//! should do.

use crate::config::Config;
use crate::error::Result;
use crate::session::SessionParameters;
use crate::translator::{AiParameters, Agent, DEFAULT_AGENT};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

/// What the user asked the binary to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    ShowConfig,
    SetApiKey { agent: Agent, api_key: String },
    Run {
        params: SessionParameters,
        query: String,
    },
}

fn non_empty(
    name: &'static str,
) -> impl Fn(&str) -> std::result::Result<String, String> + Clone + Send + Sync + 'static {
    move |value: &str| {
        if value.is_empty() {
            Err(format!("{name} cannot be empty"))
        } else {
            Ok(value.to_string())
        }
    }
}

pub fn build_command() -> Command {
    Command::new("gromit")
        .about("A command line helper that uses generative AI to generate commands based on user input.")
        .long_about(
            "Describe what you want to do in plain words. gromit asks an AI provider for the \
             matching shell command, shows it to you, and runs it once you confirm.",
        )
        .arg(
            Arg::new("query")
                .help("What you want to do, e.g. \"list all files in the current directory\"")
                .num_args(1..),
        )
        .arg(
            Arg::new("agent")
                .long("agent")
                .help("The AI agent to use. Defaults to 'openai'. Supported agents: openai, anthropic, gemini")
                .value_name("AGENT")
                .value_parser(non_empty("agent")),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .help("The model to use for the AI agent; for example, gpt-4o")
                .value_name("MODEL")
                .value_parser(non_empty("model")),
        )
        .arg(
            Arg::new("systemPrompt")
                .long("systemPrompt")
                .help("The system prompt for the AI agent. Defaults to a command line helper prompt")
                .value_name("PROMPT"),
        )
        .arg(
            Arg::new("apiKey")
                .long("apiKey")
                .help("The API key for the given agent. By default it is read from environment variables")
                .value_name("API_KEY"),
        )
        .arg(
            Arg::new("maxTokens")
                .long("maxTokens")
                .help("Maximum number of tokens for the AI agent to generate")
                .value_name("N")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .help("Run generated commands without asking for confirmation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Show configuration information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("set-api-key")
                .long("set-api-key")
                .help("Store an API key for --agent in the config file")
                .value_name("API_KEY")
                .value_parser(non_empty("api key")),
        )
}

/// Parses `args` (including the program name).
pub fn parse_args<I, T>(args: I) -> std::result::Result<ArgMatches, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    build_command().try_get_matches_from(args)
}

/// Combines parsed arguments with the config file. CLI values win.
pub fn action_from_matches(matches: &ArgMatches, config: &Config) -> Result<CliAction> {
    let string = |id: &str| matches.get_one::<String>(id).cloned();

    if matches.get_flag("config") {
        return Ok(CliAction::ShowConfig);
    }

    // A model from the config file belongs to the config file's agent; it
    // does not follow the user onto another agent picked on the command line.
    let cli_agent = string("agent");
    let config_model_applies = match &cli_agent {
        None => true,
        Some(name) => {
            name.eq_ignore_ascii_case(config.agent.as_deref().unwrap_or(DEFAULT_AGENT.name()))
        }
    };
    let agent = cli_agent.or_else(|| config.agent.clone());
    let model = string("model").or_else(|| config.model.clone().filter(|_| config_model_applies));

    if let Some(api_key) = string("set-api-key") {
        let agent = Agent::resolve(agent.as_deref(), model.as_deref())?;
        return Ok(CliAction::SetApiKey { agent, api_key });
    }

    let params = SessionParameters {
        ai: AiParameters {
            agent,
            model,
            api_key: string("apiKey"),
            max_tokens: matches
                .get_one::<u32>("maxTokens")
                .copied()
                .or(config.max_tokens),
        },
        system_prompt: string("systemPrompt").or_else(|| config.system_prompt.clone()),
        ask_for_confirmation: !matches.get_flag("yes")
            && config.ask_for_confirmation.unwrap_or(true),
        prompt_prefix: config
            .prompt_prefix
            .clone()
            .unwrap_or_else(|| SessionParameters::default().prompt_prefix),
    };

    let query = matches
        .get_many::<String>("query")
        .unwrap_or_default()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(CliAction::Run { params, query })
}

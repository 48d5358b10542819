use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use copyedit_core::api;
use copyedit_core::session::DEFAULT_DOCUMENT;
use copyedit_core::{
    parse_response, Assistant, ChatOutcome, ClaudeClient, Config, EditorSession, LanguageModel,
    LiveAssistant, MockAssistant, Mode, OllamaClient, OpenAIClient, ParsedResponse, Provider,
    TextAction,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod serve;

#[derive(Parser)]
#[command(name = "copyedit")]
#[command(version, about = "AI-assisted text editing: chat edits and toolbar actions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer with the configured language model
    #[arg(long, global = true, conflicts_with = "mock")]
    live: bool,

    /// Answer with the deterministic local mock
    #[arg(long, global = true)]
    mock: bool,

    /// Model provider (openai, claude, ollama)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Model name for the provider
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one chat message about a document
    Chat {
        /// Your message
        message: String,
        /// Document to discuss; rewritten in place when the assistant edits it
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Apply a toolbar action to text (reads stdin when TEXT is omitted)
    Action {
        /// One of: shorten, lengthen, table, fix-grammar, format, bullet-list
        action: String,
        text: Option<String>,
    },
    /// Parse a raw assistant response from stdin
    Parse,
    /// List toolbar actions
    Actions,
    /// List available models for the provider
    Models,
    /// Answer line-delimited JSON requests on stdin
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for `serve`
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = resolve_config(&cli)?;
    let provider = config.provider()?;
    let mode = resolve_mode(&cli, &config);
    debug!(provider = provider.as_str(), ?mode, "Configuration loaded");

    match cli.command {
        Commands::Chat { message, file } => {
            let client = provider.build_client(&config);
            let assistant = select_assistant(mode, provider, client.as_deref())?;
            chat(assistant.as_ref(), &message, file.as_deref()).await?
        }
        Commands::Action { action, text } => {
            let client = provider.build_client(&config);
            let assistant = select_assistant(mode, provider, client.as_deref())?;
            let text = match text {
                Some(text) => text,
                None => read_stdin()?,
            };
            println!("{}", run_action(assistant.as_ref(), &action, &text).await?);
        }
        Commands::Parse => print_parsed(&read_stdin()?),
        Commands::Actions => {
            for action in TextAction::all() {
                println!("  • {:<12} {}", action.as_str(), action.display_name());
            }
        }
        Commands::Models => list_models(provider, &config).await?,
        Commands::Serve => {
            let client = provider.build_client(&config);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            serve::run(stdin, tokio::io::stdout(), client.as_deref()).await?
        }
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(provider) = &cli.provider {
        config.provider = Some(provider.clone());
    }
    if let Some(model) = &cli.model {
        config.model = Some(model.clone());
    }
    Ok(config)
}

fn resolve_mode(cli: &Cli, config: &Config) -> Mode {
    if cli.live {
        Mode::Live
    } else if cli.mock {
        Mode::Mock
    } else {
        config.mode
    }
}

fn select_assistant<'a>(
    mode: Mode,
    provider: Provider,
    client: Option<&'a dyn LanguageModel>,
) -> Result<Box<dyn Assistant + 'a>> {
    match mode {
        Mode::Mock => Ok(Box::new(MockAssistant)),
        Mode::Live => {
            let client = client.ok_or_else(|| {
                anyhow!(
                    "{} API key is not configured. Set it in {} or the environment.",
                    provider.display_name(),
                    Config::get_config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string())
                )
            })?;
            info!(provider = provider.as_str(), model = client.name(), "Using live model");
            Ok(Box::new(LiveAssistant::new(client)))
        }
    }
}

async fn chat(assistant: &dyn Assistant, message: &str, file: Option<&Path>) -> Result<()> {
    let document = match file {
        Some(path) => load_document(path)?,
        None => DEFAULT_DOCUMENT.to_string(),
    };
    let mut session = EditorSession::new(document);

    let outcome = session.send_message(assistant, message).await;
    if let Some(reply) = session.messages().last() {
        println!("{}", reply.content);
    }

    match outcome {
        ChatOutcome::Replied | ChatOutcome::Edited { applied: false } => Ok(()),
        ChatOutcome::Edited { applied: true } => {
            match file {
                Some(path) => {
                    std::fs::write(path, session.content())?;
                    info!("Wrote edited document to {}", path.display());
                }
                None => println!("\n{}", session.content()),
            }
            Ok(())
        }
        ChatOutcome::Failed(err) => Err(err.into()),
    }
}

/// Validate like the text-action endpoint, so empty text never reaches the model
async fn run_action(assistant: &dyn Assistant, action: &str, text: &str) -> Result<String> {
    let body = serde_json::json!({ "action": action, "text": text });
    let (action, text) = api::parse_text_action_request(&body)?;
    Ok(assistant.transform(action, &text).await?)
}

fn load_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Ok(DEFAULT_DOCUMENT.to_string());
    }
    std::fs::read_to_string(path).map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

fn describe_parsed(raw: &str) -> String {
    match parse_response(raw) {
        ParsedResponse::Conversation(text) => format!("Conversation:\n{}", text),
        ParsedResponse::Edit(directive) => {
            let mut out = format!("Instruction: {}\n", directive.instruction);
            if directive.has_replacement() {
                out.push_str(&format!("Replacement:\n{}", directive.replacement));
            } else {
                out.push_str("Replacement: (none, document unchanged)");
            }
            out
        }
    }
}

fn print_parsed(raw: &str) {
    println!("{}", describe_parsed(raw));
}

async fn list_models(provider: Provider, config: &Config) -> Result<()> {
    println!("{} models:", provider.display_name());
    let models = match provider {
        Provider::OpenAI => OpenAIClient::list_models(),
        Provider::Claude => ClaudeClient::list_models(),
        Provider::Ollama => {
            let url = config
                .ollama_url
                .as_deref()
                .unwrap_or(copyedit_core::ai::ollama::DEFAULT_OLLAMA_URL);
            OllamaClient::new(url, provider.default_model())
                .list_models()
                .await
                .map_err(|e| anyhow!("{}. Make sure Ollama is running: ollama serve", e))?
        }
    };

    if models.is_empty() {
        println!("  (none found)");
    }
    for model in models {
        println!("  • {}", model);
    }
    Ok(())
}

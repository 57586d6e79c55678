//! CLI binary for enhancing prompts and hosting the message gateway.

mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use enhancer_llm::{enhance_field, Enhancer, Gateway};
use enhancer_types::{EnhancementResult, ProviderId};
use settings::{env_vars, mask_key, SettingsStore, DEFAULT_SETTINGS_PATH};

/// Sent by `penhance test` to check that a key works.
const TEST_PROMPT: &str = "Test prompt";

#[derive(Parser)]
#[command(name = "penhance", version, about = "Rewrite prompts with OpenAI, Gemini or Anthropic")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file holding the selected provider and API keys
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_PATH)]
    settings: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a prompt given as an argument, a file, or stdin
    Enhance {
        /// Prompt text (reads stdin when neither TEXT nor --file is given)
        text: Option<String>,

        /// Rewrite this file in place
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Provider to use instead of the selected one
        #[arg(short, long)]
        provider: Option<String>,

        /// Send requests to this base URL instead of the vendor's
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Check that a provider's API key works
    Test {
        /// openai, gemini or anthropic
        provider: String,

        /// Send requests to this base URL instead of the vendor's
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Show the selected provider and whether it has a key
    Status,

    /// Read or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Serve the JSON message protocol on stdin/stdout
    Gateway {
        /// File to enhance when an `enhance-prompt` message arrives
        #[arg(long)]
        field: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print all settings with keys masked
    Show,
    /// Choose the provider used by default
    SetProvider { provider: String },
    /// Store an API key for a provider
    SetKey { provider: String, key: String },
    /// Remove a provider's stored API key
    ClearKey { provider: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup tracing; stderr keeps stdout free for output and the gateway protocol
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = SettingsStore::new(cli.settings);

    match cli.command {
        Commands::Enhance {
            text,
            file,
            provider,
            base_url,
        } => {
            cmd_enhance(&store, text, file.as_deref(), provider, base_url).await?;
        }
        Commands::Test { provider, base_url } => {
            cmd_test(&store, &provider, base_url).await?;
        }
        Commands::Status => {
            cmd_status(&store)?;
        }
        Commands::Config { action } => {
            cmd_config(&store, action)?;
        }
        Commands::Gateway { field } => {
            cmd_gateway(store, field).await?;
        }
    }

    Ok(())
}

fn build_enhancer(provider: Option<ProviderId>, base_url: Option<String>) -> Enhancer {
    match (provider, base_url) {
        (Some(id), Some(url)) => Enhancer::new().with_base_url(id, url),
        _ => Enhancer::new(),
    }
}

/// Provider name and credential for one run: explicit name or the selected one.
fn resolve_target(
    store: &SettingsStore,
    provider: Option<String>,
) -> anyhow::Result<(String, Option<ProviderId>, Option<String>)> {
    let settings = store.load()?;
    let name = provider.unwrap_or_else(|| settings.selected_provider.to_string());
    let id = name.parse::<ProviderId>().ok();
    let credential = id.and_then(|id| settings.resolve_key(id));
    Ok((name, id, credential))
}

/// Rewrite a file in place through the text-field flow. The file is only
/// written back when the enhancement succeeds.
async fn enhance_file(
    enhancer: &Enhancer,
    store: &SettingsStore,
    path: &Path,
    provider: Option<String>,
) -> anyhow::Result<EnhancementResult> {
    let (provider, _, credential) = resolve_target(store, provider)?;
    let mut contents = std::fs::read_to_string(path)?;
    let result = enhance_field(enhancer, &mut contents, &provider, credential.as_deref()).await;
    if result.is_success() {
        std::fs::write(path, &contents)?;
    }
    Ok(result)
}

async fn cmd_enhance(
    store: &SettingsStore,
    text: Option<String>,
    file: Option<&Path>,
    provider: Option<String>,
    base_url: Option<String>,
) -> anyhow::Result<()> {
    if let Some(path) = file {
        let (_, id, _) = resolve_target(store, provider.clone())?;
        let enhancer = build_enhancer(id, base_url);
        if let EnhancementResult::Failure { message } =
            enhance_file(&enhancer, store, path, provider).await?
        {
            anyhow::bail!("Enhancement failed: {}", message);
        }
        eprintln!("Prompt enhanced successfully: {}", path.display());
        return Ok(());
    }

    let (provider, id, credential) = resolve_target(store, provider)?;
    let enhancer = build_enhancer(id, base_url);
    let mut prompt = match text {
        Some(text) => text,
        None => std::io::read_to_string(std::io::stdin())?,
    };
    match enhance_field(&enhancer, &mut prompt, &provider, credential.as_deref()).await {
        EnhancementResult::Success { text } => println!("{}", text),
        EnhancementResult::Failure { message } => anyhow::bail!("Enhancement failed: {}", message),
    }
    Ok(())
}

async fn cmd_test(
    store: &SettingsStore,
    provider: &str,
    base_url: Option<String>,
) -> anyhow::Result<()> {
    let id: ProviderId = provider.parse()?;
    let settings = store.load()?;

    let result = match settings.resolve_key(id) {
        Some(key) => {
            let enhancer = build_enhancer(Some(id), base_url);
            enhancer.enhance(TEST_PROMPT, id.as_str(), Some(&key)).await
        }
        None => EnhancementResult::Failure {
            message: "API key is required".to_string(),
        },
    };

    match connection_report(id, &result) {
        Ok(line) => {
            println!("{}", line);
            Ok(())
        }
        Err(line) => anyhow::bail!(line),
    }
}

/// `Ok` carries the success line, `Err` the failure line.
fn connection_report(id: ProviderId, result: &EnhancementResult) -> Result<String, String> {
    let display = id.display_name();
    match result {
        EnhancementResult::Success { .. } => Ok(format!("{} connection successful!", display)),
        EnhancementResult::Failure { message } => {
            Err(format!("{} test failed: {}", display, message))
        }
    }
}

fn cmd_status(store: &SettingsStore) -> anyhow::Result<()> {
    let settings = store.load()?;
    let provider = settings.selected_provider;
    let configured = settings.resolve_key(provider).is_some();
    for line in status_lines(provider, configured) {
        println!("{}", line);
    }
    Ok(())
}

fn status_lines(provider: ProviderId, configured: bool) -> [String; 2] {
    let status = if configured {
        "Status: connected".to_string()
    } else {
        format!(
            "Status: not configured (run `penhance config set-key {}` or set {})",
            provider,
            env_vars(provider).join(" or ")
        )
    };
    [format!("Provider: {}", provider.display_name()), status]
}

fn cmd_config(store: &SettingsStore, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = store.load()?;
            println!("Settings: {}", store.path().display());
            for id in ProviderId::ALL {
                let marker = if id == settings.selected_provider { "*" } else { " " };
                let key = settings
                    .key_for(id)
                    .map(mask_key)
                    .unwrap_or_else(|| "not configured".to_string());
                println!("{} {:<10} {}", marker, id.as_str(), key);
            }
        }
        ConfigAction::SetProvider { provider } => {
            let id: ProviderId = provider.parse()?;
            store.update(|s| s.selected_provider = id)?;
            println!("Selected provider: {}", id.display_name());
        }
        ConfigAction::SetKey { provider, key } => {
            let id: ProviderId = provider.parse()?;
            store.update(|s| s.set_key(id, &key))?;
            println!("{} API key saved", id.display_name());
        }
        ConfigAction::ClearKey { provider } => {
            let id: ProviderId = provider.parse()?;
            store.update(|s| s.clear_key(id))?;
            println!("{} API key cleared", id.display_name());
        }
    }
    Ok(())
}

async fn cmd_gateway(store: SettingsStore, field: Option<PathBuf>) -> anyhow::Result<()> {
    let enhancer = Arc::new(Enhancer::new());
    let mut gateway = Gateway::new(Arc::clone(&enhancer));

    if let Some(path) = field {
        tracing::info!(path = %path.display(), "enhance-prompt will rewrite this file");
        gateway = gateway.on_enhance_prompt(move || {
            let enhancer = Arc::clone(&enhancer);
            let store = store.clone();
            let path = path.clone();
            async move {
                match enhance_file(&enhancer, &store, &path, None).await {
                    Ok(EnhancementResult::Success { .. }) => {
                        tracing::info!(path = %path.display(), "Prompt enhanced successfully")
                    }
                    Ok(EnhancementResult::Failure { message }) => {
                        tracing::warn!(path = %path.display(), %message, "Enhancement failed")
                    }
                    Err(e) => tracing::error!(path = %path.display(), error = %e, "Enhancement failed"),
                }
            }
        });
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    Arc::new(gateway).serve(stdin, tokio::io::stdout()).await?;
    Ok(())
}

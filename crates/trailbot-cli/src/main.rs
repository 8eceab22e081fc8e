//! 🚲 trailbot CLI: interactive chat, one-shot questions, onboarding, status.
//!
//! Usage:
//!   trailbot chat           : Start an interactive chat session
//!   trailbot ask "question" : Ask a single question and exit
//!   trailbot onboard        : Create a default configuration
//!   trailbot status         : Show current configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};

use trailbot_core::bot::Bot;
use trailbot_core::config::Config;
use trailbot_core::conversation::{ConversationState, History, Turn};

#[derive(Parser)]
#[command(
    name = "trailbot",
    version,
    about = "A bike-trail chat assistant",
    long_about = "🚲 trailbot. Ask about bike trails anywhere.\n\nAnswers come from an LLM; trail lookups use a geocoder and a trail catalog."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        question: String,

        /// Model to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Create or reset the default configuration
    Onboard,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Chat { model }) => cmd_chat(model.as_deref()).await?,
        Some(Commands::Ask { question, model }) => cmd_ask(&question, model.as_deref()).await?,
        Some(Commands::Onboard) => cmd_onboard()?,
        Some(Commands::Status) => cmd_status()?,
        None => cmd_chat(None).await?,
    }

    Ok(())
}

// ── Shared Setup ────────────────────────────────────────────────────

fn validate_config(config: &Config) -> Result<()> {
    if let Err(errors) = config.validate() {
        eprintln!("\n  \x1b[31m❌ Configuration errors:\x1b[0m");
        for e in &errors {
            eprintln!("     • {}", e);
        }
        eprintln!();
        anyhow::bail!("Fix the above {} error(s) in config.json", errors.len());
    }
    Ok(())
}

/// Load and validate config, apply the model override, and build the bot.
fn setup_bot(model_override: Option<&str>) -> Result<(Bot, Config)> {
    let mut config = Config::load()?;
    if let Some(model) = model_override {
        config.agent.model = model.to_string();
        for entry in [&mut config.providers.openai, &mut config.providers.huggingface]
            .into_iter()
            .flatten()
        {
            entry.model = None;
        }
    }
    validate_config(&config)?;

    let bot = Bot::from_config(&config)?;
    Ok((bot, config))
}

// ── Chat Command ────────────────────────────────────────────────────

async fn cmd_chat(model_override: Option<&str>) -> Result<()> {
    let (bot, config) = setup_bot(model_override)?;

    println!();
    println!("  🚲 trailbot v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  Provider: {} | Model: {}",
        bot.orchestrator().provider_name(),
        config.agent.model
    );
    println!();
    println!("  Ask about bike trails, or /quit to exit.");
    println!("  ─────────────────────────────────────");
    println!();

    let mut history = History::new();
    let mut state: Option<ConversationState> = None;

    let stdin = io::stdin();
    loop {
        print!("  \x1b[36m>\x1b[0m ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" | "/q" => {
                println!("  Goodbye! 👋");
                break;
            }
            "/clear" => {
                history = History::new();
                state = None;
                println!("  Conversation cleared.");
                continue;
            }
            "/state" => {
                println!("  {}", serde_json::to_string(&state)?);
                continue;
            }
            _ => {}
        }

        history.push(Turn::user(input));

        println!();
        let (reply, next_state) = bot.on_message(&history, state).await;
        println!("  \x1b[32m{}\x1b[0m\n", reply);

        history.push(Turn::assistant(reply));
        tracing::debug!(turns = history.len(), counter = next_state.counter, "Exchange complete");
        state = Some(next_state);
    }

    Ok(())
}

// ── Ask Command ─────────────────────────────────────────────────────

async fn cmd_ask(question: &str, model_override: Option<&str>) -> Result<()> {
    let (bot, _config) = setup_bot(model_override)?;
    let history = History::from(vec![Turn::user(question)]);
    let (reply, _) = bot.on_message(&history, None).await;
    println!("{}", reply);
    Ok(())
}

// ── Onboard Command ─────────────────────────────────────────────────

fn cmd_onboard() -> Result<()> {
    let path = Config::write_default_template()?;
    println!();
    println!("  ✅ Configuration created at:");
    println!("     {}", path.display());
    println!();
    println!("  Next steps:");
    println!("  1. Add your OpenAI key (or set OPENAI_KEY)");
    println!("  2. Add your RapidAPI trailapi key (or set RAPIDAPI_KEY)");
    println!("  3. Run `trailbot chat` to start chatting");
    println!();
    Ok(())
}

// ── Status Command ──────────────────────────────────────────────────

fn cmd_status() -> Result<()> {
    let config_path = Config::default_path();
    let config = Config::load()?;

    println!();
    println!("  🚲 trailbot status");
    println!("  ─────────────────────────────────────");

    if config_path.exists() {
        println!("  Config:    {}", config_path.display());
    } else {
        println!("  Config:    ⚠️  Not found, using defaults + environment (run `trailbot onboard`)");
    }

    match config.providers.find_active(config.agent.provider.as_deref()) {
        Some(active) => println!("  Provider:  ✅ {} configured", active.name()),
        None => println!("  Provider:  ❌ No provider configured"),
    }

    println!("  Model:     {}", config.agent.model);
    println!("  Geocoder:  {}", config.services.geocoder.base_url);
    println!(
        "  Trails:    {} {}",
        config.services.trails.base_url,
        if config.services.trails.api_key.is_empty() { "❌ no key" } else { "✅" }
    );
    println!(
        "  Showing:   up to {} trail(s), {}s timeout per request",
        config.agent.max_trails_shown, config.agent.request_timeout_secs
    );

    match config.validate() {
        Ok(()) => println!("  Ready:     ✅"),
        Err(errors) => {
            for e in errors {
                println!("  Problem:   {}", e);
            }
        }
    }

    println!();
    Ok(())
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cardswap_bot::application::errors::BotError;
use cardswap_bot::application::messaging::{Dispatch, EventDispatcher};
use cardswap_bot::domain::entities::{Group, InboundEvent};
use cardswap_bot::domain::traits::MemberStore;
use cardswap_bot::infrastructure::adapters::slack::decode_envelopes;
use cardswap_bot::infrastructure::adapters::{ConsoleAdapter, SlackAdapter};
use cardswap_bot::infrastructure::config::Config;
use cardswap_bot::infrastructure::database::SqliteStore;

#[derive(Parser)]
#[command(name = "cardswap-bot")]
#[command(about = "Track trading card haves and needs and find swaps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Database path (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the bot from the terminal
    Run {
        /// Acting user id (overrides config)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Process Slack event JSON (one envelope or an array) and reply via Slack
    HandleEvent {
        /// Read from file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Register or update an installed workspace
    AddGroup {
        team_id: String,
        team_name: String,
        bot_token: String,
        #[arg(long)]
        bot_user_id: Option<String>,
    },
    /// Print all groups and members as JSON
    Dump,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Version => {
            println!("cardswap-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
        command => {
            let mut config = load_config(&cli.config);
            if let Some(path) = cli.database {
                config.database.path = path;
            }
            run_command(command, config)
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: &str) -> Config {
    if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    }
}

fn run_command(command: Commands, config: Config) -> Result<(), BotError> {
    let store = Arc::new(SqliteStore::open(&config.database.path)?);
    tracing::info!("Database opened at {}", config.database.path.display());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match command {
            Commands::Run { user } => run_console(store, &config, user).await,
            Commands::HandleEvent { file } => handle_events(store, &config, file).await,
            Commands::AddGroup { team_id, team_name, bot_token, bot_user_id } => {
                let mut group = Group::new(team_id, team_name, bot_token);
                group.bot_user_id = bot_user_id;
                let saved = store.save_group(&group).await?;
                tracing::info!("Saved group {}", saved);
                Ok(())
            }
            Commands::Dump => dump(store).await,
            Commands::Version | Commands::InitConfig => Ok(()),
        }
    })
}

async fn run_console(store: Arc<SqliteStore>, config: &Config, user: Option<String>) -> Result<(), BotError> {
    let console = &config.console;
    if store.find_group(&console.team_id).await?.is_none() {
        store
            .save_group(&Group::new(&console.team_id, &console.team_name, "console"))
            .await?;
    }

    let dispatcher = EventDispatcher::new(store, ConsoleAdapter::new(&config.bot.name));
    let mut user_id = user.unwrap_or_else(|| console.user_id.clone());
    tracing::info!("Console started as {} in {} (type /as <user> to switch, /quit to leave)", user_id, console.team_id);

    // Main loop (for console mode)
    while let Some(input) = dispatcher.delivery().read_line(&format!("{}> ", user_id)) {
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }
        if let Some(next) = input.strip_prefix("/as ") {
            user_id = next.trim().to_string();
            continue;
        }

        let event = InboundEvent::new(&console.team_id, &user_id, "console", input);
        dispatcher.dispatch(event).await;
    }

    Ok(())
}

async fn handle_events(store: Arc<SqliteStore>, config: &Config, file: Option<PathBuf>) -> Result<(), BotError> {
    let json = match file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            use tokio::io::AsyncReadExt;
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    let mut events = Vec::new();
    for decoded in decode_envelopes(&json)? {
        match decoded {
            Ok(event) => events.push(event),
            Err(e) => tracing::error!("Dropping undecodable event: {}", e),
        }
    }

    let slack = SlackAdapter::new(&config.slack.api_base, Duration::from_secs(config.slack.timeout_seconds))?;
    let dispatcher = Arc::new(EventDispatcher::new(store, slack));

    let outcomes = dispatcher.dispatch_all(events).await;
    let delivered = outcomes
        .iter()
        .filter(|o| matches!(o, Dispatch::Delivered { .. }))
        .count();
    tracing::info!("Processed {} events, {} replies delivered", outcomes.len(), delivered);
    Ok(())
}

async fn dump(store: Arc<SqliteStore>) -> Result<(), BotError> {
    let mut teams = Vec::new();
    for group in store.list_groups().await? {
        let members = store.list_members(&group).await?;
        teams.push(serde_json::json!({ "team": group, "members": members }));
    }

    let output = serde_json::to_string_pretty(&teams)
        .map_err(|e| BotError::Internal(e.to_string()))?;
    println!("{}", output);
    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = serde_yaml::to_string(&Config::default())
        .map_err(|e| BotError::Internal(e.to_string()))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}

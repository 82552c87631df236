mod api;
mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use std::sync::Arc;
use suitcast_channels::telegram::TelegramChannel;
use suitcast_core::config::{self, BotConfig, Config};
use suitcast_engine::{extract::extract_features, Engine, Verdict};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(
    name = "suitcast",
    version,
    about = "Suit-pattern round predictor for Telegram channels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Bot token; overrides `telegram.bot_token`.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot.
    Start,
    /// Check configuration health.
    Status,
    /// Show what the engine sees in a message.
    Check {
        /// The message text.
        #[arg(trailing_var_arg = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let notice = config::missing_notice(&cli.config);
    let mut cfg = config::load(&cli.config)?;
    if let Some(token) = cli.token.filter(|t| !t.trim().is_empty()) {
        cfg.telegram.bot_token = token;
    }

    let _log_guard = init_tracing(&cfg.bot);
    if let Some(notice) = notice {
        tracing::info!("{notice}");
    }

    match cli.command {
        Commands::Start => start(cfg).await?,
        Commands::Status => print_status(&cli.config, &cfg),
        Commands::Check { text } => {
            if text.is_empty() {
                anyhow::bail!("no text provided. Usage: suitcast check <text>");
            }
            check(&text.join(" "));
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `bot.log_level`;
/// with `bot.log_dir` set, output goes to a daily-rolling file instead of
/// stdout.
fn init_tracing(bot: &BotConfig) -> WorkerGuard {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&bot.log_level));

    match bot.log_dir.as_deref() {
        Some(dir) => {
            let appender =
                tracing_appender::rolling::daily(config::shellexpand(dir), "suitcast.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            guard
        }
        None => {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .init();
            guard
        }
    }
}

async fn start(cfg: Config) -> anyhow::Result<()> {
    cfg.validate()?;

    let channel = Arc::new(TelegramChannel::new(cfg.telegram.clone())?);

    if cfg.webhook.enabled {
        let url = format!("{}/webhook", cfg.webhook.public_url.trim_end_matches('/'));
        channel.set_webhook(&url, &cfg.webhook.secret_token).await?;
    }

    println!("{} - starting...", cfg.bot.name);
    let gw = Arc::new(gateway::Gateway::new(channel, cfg));
    gw.run().await
}

fn print_status(path: &str, cfg: &Config) {
    println!("{} - Status Check\n", cfg.bot.name);
    println!("Config: {path}");
    println!(
        "  telegram: {}",
        if cfg.telegram.bot_token.is_empty() {
            "missing bot_token"
        } else {
            "configured"
        }
    );
    println!("  source channel: {}", cfg.routing.source_channel);
    println!(
        "  destinations: {:?} (max {})",
        cfg.routing.destinations, cfg.routing.max_destinations
    );
    println!(
        "  ingress: {}",
        if cfg.webhook.enabled {
            format!("webhook on {}:{}", cfg.webhook.host, cfg.webhook.port)
        } else {
            "long polling".to_string()
        }
    );
    println!();
    match cfg.validate() {
        Ok(()) => println!("ready"),
        Err(e) => println!("not ready: {e}"),
    }
}

fn check(text: &str) {
    println!("{}", extract_features(text));
    match Engine::new().should_predict(text) {
        Verdict::Predict {
            source_round,
            combination,
        } => println!("verdict: predict the round after {source_round} with {combination}"),
        Verdict::Skip(reason) => println!("verdict: skip ({reason})"),
    }
}

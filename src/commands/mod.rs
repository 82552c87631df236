//! Built-in bot commands: instant replies, no engine side effects except
//! `/redirect` and `/reset`.


use crate::gateway::dispatcher::Dispatcher;
use crate::gateway::lock_engine;
use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::Instant;
use suitcast_core::config::Config;
use suitcast_engine::Engine;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub engine: &'a Mutex<Engine>,
    pub dispatcher: &'a Dispatcher,
    pub config: &'a Config,
    pub uptime: &'a Instant,
    pub text: &'a str,
}

/// Known bot commands.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    About,
    Status,
    Redirect,
    Reset,
}

impl Command {
    /// Parse a command from message text. Returns `None` for unknown `/` prefixes.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/help@suitcast_bot" → "/help").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/about" => Some(Self::About),
            "/status" => Some(Self::Status),
            "/redirect" => Some(Self::Redirect),
            "/reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Handle a command and return the reply, escaped for HTML parse mode.
pub fn handle(cmd: Command, ctx: &CommandContext<'_>) -> String {
    escape_html(&reply(cmd, ctx))
}

/// Escape the three characters Telegram's HTML parser treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn reply(cmd: Command, ctx: &CommandContext<'_>) -> String {
    match cmd {
        Command::Start => format!(
            "👋 {} is watching channel {} and posts predictions for the next round.\n\
             Use /help to see the commands.",
            ctx.config.bot.name, ctx.config.routing.source_channel
        ),
        Command::Help => help_text(ctx.dispatcher.max_destinations()),
        Command::About => format!(
            "{} v{}\n\
             Reads round posts (#N<round>), predicts the next round when the first \
             section shows exactly three distinct suits, and marks each prediction \
             ✅ within three rounds or ⭕⭕ after.",
            ctx.config.bot.name,
            env!("CARGO_PKG_VERSION")
        ),
        Command::Status => handle_status(ctx),
        Command::Redirect => handle_redirect(ctx),
        Command::Reset => {
            lock_engine(ctx.engine).reset();
            "🧹 All predictions and trigger history cleared.".to_string()
        }
    }
}

fn help_text(max_destinations: usize) -> String {
    format!(
        "Commands:\n\
         /start - greeting\n\
         /help - this message\n\
         /about - what the bot does\n\
         /status - pending predictions and destinations\n\
         /redirect <chat_id> [chat_id…] - send predictions elsewhere (max {max_destinations})\n\
         /redirect reset - back to the configured destinations\n\
         /reset - forget all predictions"
    )
}

fn handle_status(ctx: &CommandContext<'_>) -> String {
    let engine = lock_engine(ctx.engine);
    let store = engine.store();
    let mut out = String::new();

    let _ = writeln!(out, "Uptime: {}", format_uptime(ctx.uptime.elapsed().as_secs()));
    let _ = writeln!(
        out,
        "Destinations: {:?}{}",
        ctx.dispatcher.active(),
        if ctx.dispatcher.is_overridden() {
            " (override)"
        } else {
            ""
        }
    );
    let _ = writeln!(
        out,
        "Predictions: {} tracked, {} pending",
        store.len(),
        store.pending_count()
    );
    for p in store.pending() {
        let _ = writeln!(
            out,
            "  {} {} (from #{}, {})",
            p.round_number,
            p.combination,
            p.source_round,
            p.created_at.format("%H:%M:%S")
        );
    }
    out.trim_end().to_string()
}

fn handle_redirect(ctx: &CommandContext<'_>) -> String {
    let args: Vec<&str> = ctx.text.split_whitespace().skip(1).collect();
    if args.is_empty() {
        return "Usage: /redirect <chat_id> [chat_id…] or /redirect reset\n\
                Example: /redirect -1002891656360"
            .to_string();
    }

    if args.len() == 1 && args[0].eq_ignore_ascii_case("reset") {
        ctx.dispatcher.reset_override();
        return format!("✅ Destinations reset to {:?}", ctx.dispatcher.active());
    }

    let mut ids = Vec::with_capacity(args.len());
    for arg in args {
        match arg.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => return format!("❌ Invalid chat id: {arg}"),
        }
    }

    match ctx.dispatcher.set_override(ids) {
        Ok(active) => format!("✅ Predictions now go to {active:?}"),
        Err(e) => format!("❌ {e}"),
    }
}

fn format_uptime(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}h {m}m {s}s")
    } else if m > 0 {
        format!("{m}m {s}s")
    } else {
        format!("{s}s")
    }
}

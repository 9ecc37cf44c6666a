//! Stock ticker chat bot
//!
//! # Usage
//!
//! ```bash
//! # Telegram
//! export TELEGRAM_BOT_TOKEN="123456:ABC..."
//! cargo run --bin stock-bot -- telegram
//!
//! # Local terminal, charts written to ./charts
//! cargo run --bin stock-bot -- cli --chart-dir charts
//! ```

use bot_utils::{LogFormat, init_tracing};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use stock_bot::bot::RequestDispatcher;
use stock_bot::config::StockConfig;
use stock_bot::platforms::{CliBot, TelegramBot, TelegramConfig};
use tracing::info;

const DEFAULT_LOG_FILTER: &str = "warn,stock_bot=info";

#[derive(Parser, Debug)]
#[command(name = "stock-bot")]
#[command(
    about = "Quotes, RSI, news sentiment and price charts for stock tickers",
    long_about = None
)]
struct Args {
    /// Log output format (pretty or json)
    #[arg(long, env = "STOCK_BOT_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Serve a Telegram bot (token from TELEGRAM_BOT_TOKEN)
    Telegram,
    /// Interactive terminal session
    Cli {
        /// Directory chart PNGs are written to
        #[arg(long, default_value = "charts")]
        chart_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format, DEFAULT_LOG_FILTER);

    let config = StockConfig::from_env()?;
    let dispatcher = Arc::new(RequestDispatcher::from_config(config)?);

    match args.mode {
        Mode::Telegram => {
            let telegram = TelegramConfig::from_env()?
                .with_request_timeout(dispatcher.config().request_timeout);
            info!("Starting stock-bot on Telegram");
            TelegramBot::new(&telegram, dispatcher)?.run().await?;
        }
        Mode::Cli { chart_dir } => {
            info!(chart_dir = %chart_dir.display(), "Starting stock-bot in the terminal");
            CliBot::new(dispatcher, chart_dir).run().await?;
        }
    }

    Ok(())
}

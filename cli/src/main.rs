//! cardfx
//!
//! Estimate the KRW cost of a foreign-currency card purchase, including
//! card issuer and foreign-transaction fees.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cardfx_common::{CardIssuer, Currency};
use cardfx_fx::FxConfig;

mod commands;
mod console;

/// cardfx CLI
#[derive(Parser, Debug)]
#[command(name = "cardfx")]
#[command(about = "Foreign card purchase cost calculator (KRW)")]
struct Args {
    /// Directory holding the rate cache
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Latest-rates endpoint quoting against KRW
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Refresh cached rates older than this many seconds
    #[arg(long, global = true)]
    refresh_interval_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate the total KRW cost of a purchase
    Calc {
        /// Purchase amount in the foreign currency
        #[arg(allow_negative_numbers = true)]
        amount: String,

        /// Currency of the purchase (JPY, USD, TRY)
        #[arg(short, long, default_value = "USD")]
        currency: Currency,

        /// Card issuer (woori, shinhan, kb, samsung, hyundai)
        #[arg(short = 'k', long, default_value = "woori")]
        card: CardIssuer,

        /// Print the breakdown as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current exchange rates
    Rates,

    /// Fetch fresh exchange rates now
    Refresh,

    /// List card issuers and their fees
    Cards,
}

impl Args {
    fn config(&self) -> FxConfig {
        let mut config = FxConfig::from_env();

        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }

        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }

        if let Some(secs) = self.refresh_interval_secs {
            config.refresh_interval = std::time::Duration::from_secs(secs);
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = args.config();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    match args.command {
        Command::Calc {
            amount,
            currency,
            card,
            json,
        } => commands::calc(&config, &amount, currency, card, json).await,
        Command::Rates => commands::rates(&config).await,
        Command::Refresh => commands::refresh(&config).await,
        Command::Cards => {
            commands::cards();
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calc() {
        let args = Args::try_parse_from(["cardfx", "calc", "1,200", "-c", "jpy", "-k", "kb"]).unwrap();
        match args.command {
            Command::Calc {
                amount,
                currency,
                card,
                json,
            } => {
                assert_eq!(amount, "1,200");
                assert_eq!(currency, Currency::Jpy);
                assert_eq!(card, CardIssuer::Kb);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_negative_amount_reaches_validation() {
        let args = Args::try_parse_from(["cardfx", "calc", "-5"]).unwrap();
        assert!(matches!(args.command, Command::Calc { ref amount, .. } if amount == "-5"));
    }

    #[test]
    fn test_unknown_card_rejected() {
        assert!(Args::try_parse_from(["cardfx", "calc", "10", "--card", "lotte"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "cardfx",
            "--cache-dir",
            "/tmp/cardfx-test",
            "--refresh-interval-secs",
            "120",
            "rates",
        ])
        .unwrap();
        let config = args.config();
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cardfx-test"));
        assert_eq!(config.refresh_interval_ms(), 120_000);
    }
}

// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use topmovers_rs::api::{PriceSource, YahooClient};
use topmovers_rs::config::{self, MailSettings};
use topmovers_rs::digest::{self, RunOptions};
use topmovers_rs::mailer::SmtpMailer;
use topmovers_rs::prices_csv::{self, CsvPriceSource};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch prices, build the top performers report and email it
    Send {
        /// Read prices from a CSV file instead of the market data API
        #[arg(long)]
        prices_csv: Option<PathBuf>,
        /// Also write the HTML report to this file
        #[arg(long)]
        save_html: Option<PathBuf>,
    },
    /// Build the report and write it to a file without sending email
    Preview {
        /// Read prices from a CSV file instead of the market data API
        #[arg(long)]
        prices_csv: Option<PathBuf>,
        /// Where to write the HTML report
        #[arg(long, default_value = "report.html")]
        output: PathBuf,
    },
    /// Fetch price history for the configured tickers and export it to CSV
    ExportPrices {
        /// Output CSV path (default: output/prices_<timestamp>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the configured lookback windows
    ListWindows,
}

fn price_source(prices_csv: Option<PathBuf>) -> Result<Box<dyn PriceSource>> {
    Ok(match prices_csv {
        Some(path) => Box::new(CsvPriceSource::new(path)),
        None => Box::new(YahooClient::new()?),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;

    match cli.command {
        Some(Commands::Send {
            prices_csv,
            save_html,
        }) => {
            send(&config, prices_csv, save_html).await?;
        }
        Some(Commands::Preview { prices_csv, output }) => {
            let source = price_source(prices_csv)?;
            let options = RunOptions {
                run_date: Local::now().date_naive(),
                dry_run: true,
                save_html: Some(output),
            };
            let mailer = SmtpMailer::new(&config.smtp);
            digest::run_digest(
                &config,
                &MailSettings::default(),
                source.as_ref(),
                &mailer,
                &options,
            )
            .await?;
        }
        Some(Commands::ExportPrices { output }) => {
            let client = YahooClient::new()?;
            let table = digest::fetch_prices(&config, &client).await?;
            let path = prices_csv::write_price_table_csv(&table, output)?;
            tracing::info!(path = %path.display(), rows = table.len(), "prices exported");
        }
        Some(Commands::ListWindows) => {
            println!("Lookback windows ({} configured):", config.windows.len());
            for window in &config.windows {
                println!("  {:>4} trading days  {}", window.lookback, window.title);
            }
        }
        None => {
            send(&config, None, None).await?;
        }
    }

    Ok(())
}

async fn send(
    config: &config::Config,
    prices_csv: Option<PathBuf>,
    save_html: Option<PathBuf>,
) -> Result<()> {
    let mail = MailSettings::from_env();
    let source = price_source(prices_csv)?;
    let mailer = SmtpMailer::new(&config.smtp);
    let options = RunOptions {
        run_date: Local::now().date_naive(),
        dry_run: false,
        save_html,
    };

    let summary = digest::run_digest(config, &mail, source.as_ref(), &mailer, &options).await?;
    tracing::info!(
        price_rows = summary.price_rows,
        tickers = summary.tickers_with_data,
        sections = summary.sections,
        "report sent"
    );
    Ok(())
}

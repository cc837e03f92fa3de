// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

use crate::api::PriceSource;
use crate::config::{Config, MailSettings};
use crate::error::DigestError;
use crate::mailer::{deliver, MailTransport, OutboundMessage};
use crate::models::PriceTable;
use crate::report::ReportAssembler;
use crate::snapshot::MarketSnapshot;

/// Options for one fetch, rank, render and deliver cycle.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Date used in the subject line.
    pub run_date: NaiveDate,
    /// Build the report but do not email it.
    pub dry_run: bool,
    /// Also write the HTML document here.
    pub save_html: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub price_rows: usize,
    pub tickers_with_data: usize,
    pub sections: usize,
    pub delivered: bool,
    pub html: String,
}

/// Fetches the universe plus index symbols in one request.
pub async fn fetch_prices(config: &Config, source: &dyn PriceSource) -> Result<PriceTable, DigestError> {
    let symbols = config.fetch_symbols();
    tracing::info!(
        symbols = symbols.len(),
        history_days = config.history_days,
        "fetching price history"
    );
    source
        .fetch_price_table(&symbols, config.history_days)
        .await
        .map_err(|e| DigestError::DataFetch(format!("{e:#}")))
}

/// The ranked tickers' columns, without the sessions only index symbols
/// traded in. Fails when none of the configured tickers came back.
pub fn universe_table(config: &Config, table: &PriceTable) -> Result<PriceTable, DigestError> {
    let universe = table.select(&config.tickers).without_empty_rows();
    if universe.tickers().is_empty() {
        return Err(DigestError::DataFetch(format!(
            "no price data returned for any of {} configured tickers",
            config.tickers.len()
        )));
    }
    if universe.len() < table.len() {
        tracing::debug!(
            dropped = table.len() - universe.len(),
            "dropped dates without any ticker close"
        );
    }
    Ok(universe)
}

/// Builds the report document for an already fetched table.
pub fn build_document(config: &Config, table: &PriceTable) -> Result<(String, usize), DigestError> {
    let universe = universe_table(config, table)?;
    let snapshot = MarketSnapshot::from_table(&config.indices, table);

    let assembler = ReportAssembler::new()
        .with_title(config.report_title.clone())
        .with_directory(&config.names)
        .with_snapshot(&snapshot);

    let sections = assembler.sections(&universe, &config.windows)?;
    let html = assembler.finish(&sections)?;
    Ok((html, sections.len()))
}

/// One complete run. Missing mail settings stop the run before any network
/// call; a failed fetch, render or delivery stops it without sending.
pub async fn run_digest(
    config: &Config,
    mail: &MailSettings,
    source: &dyn PriceSource,
    transport: &dyn MailTransport,
    options: &RunOptions,
) -> Result<RunSummary> {
    if !options.dry_run {
        mail.require()?;
    }

    let table = fetch_prices(config, source).await?;
    let tickers_with_data = universe_table(config, &table)?.tickers().len();

    let (html, sections) = build_document(config, &table)?;
    tracing::info!(sections, bytes = html.len(), "report assembled");

    if let Some(path) = &options.save_html {
        fs::write(path, &html)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!(path = %path.display(), "report saved");
    }

    let delivered = if options.dry_run {
        tracing::info!("dry run; skipping delivery");
        false
    } else {
        let message = OutboundMessage::daily_report(options.run_date, html.clone());
        deliver(transport, mail, &message).await?;
        true
    };

    Ok(RunSummary {
        price_rows: table.len(),
        tickers_with_data,
        sections,
        delivered,
        html,
    })
}

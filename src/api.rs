// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;

use crate::models::{PriceTable, PriceTableBuilder};

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

// Yahoo rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Anything that can produce a dated closing-price table for a set of tickers.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Closing prices for `tickers` over roughly the last `history_days`
    /// calendar days, ascending by date. Tickers without data may be absent.
    async fn fetch_price_table(&self, tickers: &[String], history_days: u32) -> Result<PriceTable>;
}

pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(YAHOO_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Daily closes for one symbol between `from` and `to`.
    pub async fn get_daily_closes(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, f64)>> {
        if symbol.is_empty() {
            anyhow::bail!("ticker empty");
        }

        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            encode_symbol(symbol)
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", from.timestamp().to_string()),
                ("period2", to.timestamp().to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let text = response.text().await.context("Failed to get response text")?;

        let parsed: ChartResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                anyhow::bail!("API error: {} - {}", status, text);
            }
            Err(e) => return Err(e).context("Failed to parse chart response"),
        };

        if let Some(error) = parsed.chart.error {
            anyhow::bail!("{}: {}", error.code, error.description);
        }
        if !status.is_success() {
            anyhow::bail!("API error: {}", status);
        }

        let result = parsed
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .context("No chart data found for ticker")?;

        Ok(result.daily_closes())
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch_price_table(&self, tickers: &[String], history_days: u32) -> Result<PriceTable> {
        let to = Utc::now();
        let from = to - Duration::days(i64::from(history_days));

        let progress = ProgressBar::new(tickers.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );

        let mut builder = PriceTableBuilder::new();
        let mut fetched = 0usize;

        // One request at a time, in universe order.
        for ticker in tickers {
            progress.set_message(ticker.clone());
            match self.get_daily_closes(ticker, from, to).await {
                Ok(series) if series.is_empty() => {
                    tracing::warn!(%ticker, "no prices returned; omitting ticker");
                }
                Ok(series) => {
                    tracing::debug!(%ticker, rows = series.len(), "fetched price history");
                    builder.add_series(ticker, series);
                    fetched += 1;
                }
                Err(e) => {
                    tracing::warn!(%ticker, error = %format!("{e:#}"), "price fetch failed; omitting ticker");
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        if fetched == 0 && !tickers.is_empty() {
            anyhow::bail!(
                "no price data returned for any of {} tickers",
                tickers.len()
            );
        }

        let table = builder.build();
        tracing::info!(
            tickers = table.tickers().len(),
            requested = tickers.len(),
            rows = table.len(),
            "price table fetched"
        );
        Ok(table)
    }
}

fn encode_symbol(symbol: &str) -> String {
    symbol.replace('^', "%5E").replace('=', "%3D")
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
    #[serde(default)]
    pub adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResult {
    /// (trading date, close) pairs, preferring split/dividend adjusted
    /// closes. Null or non-finite closes are dropped.
    pub fn daily_closes(&self) -> Vec<(NaiveDate, f64)> {
        let closes = self
            .indicators
            .adjclose
            .first()
            .map(|a| &a.adjclose)
            .filter(|a| !a.is_empty())
            .or_else(|| self.indicators.quote.first().map(|q| &q.close));

        let Some(closes) = closes else {
            return Vec::new();
        };

        self.timestamp
            .iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let close = (*close).filter(|c| c.is_finite())?;
                let date = DateTime::from_timestamp(ts + self.meta.gmtoffset, 0)?.date_naive();
                Some((date, close))
            })
            .collect()
    }
}

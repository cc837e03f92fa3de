// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Common test utilities and helpers
//!
//! Shared fixtures for the integration tests:
//! - Price tables built from simple per-ticker series
//! - In-memory price source and mail transport fakes
//! - Config and CSV file helpers

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use topmovers_rs::api::PriceSource;
use topmovers_rs::config::{Config, MailSettings, SenderIdentity};
use topmovers_rs::error::DigestError;
use topmovers_rs::mailer::{MailTransport, OutboundMessage};
use topmovers_rs::models::{PriceTable, PriceTableBuilder};
use topmovers_rs::prices_csv::write_price_table_csv;

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

/// Consecutive dates starting at [`start_date`].
pub fn trading_dates(n: usize) -> Vec<NaiveDate> {
    (0..n)
        .map(|i| start_date().checked_add_days(Days::new(i as u64)).unwrap())
        .collect()
}

/// Builds a table from `(ticker, closes)` pairs; closes line up with
/// [`trading_dates`] and `None` leaves a gap.
pub fn table_from_series(series: &[(&str, Vec<Option<f64>>)]) -> PriceTable {
    let mut builder = PriceTableBuilder::new();
    for (ticker, closes) in series {
        builder.add_ticker(ticker);
        for (date, close) in trading_dates(closes.len()).into_iter().zip(closes) {
            if let Some(close) = close {
                builder.insert(ticker, date, *close);
            }
        }
    }
    builder.build()
}

/// A ticker moving linearly from `start` by `step` per row.
pub fn linear(start: f64, step: f64, rows: usize) -> Vec<Option<f64>> {
    (0..rows).map(|i| Some(start + step * i as f64)).collect()
}

pub fn test_config(tickers: &[&str]) -> Config {
    let toml = format!(
        "tickers = [{}]\n",
        tickers
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(", ")
    );
    topmovers_rs::config::parse_config(&toml).unwrap()
}

pub fn complete_mail_settings() -> MailSettings {
    MailSettings {
        sender: Some("sender@example.com".to_string()),
        password: Some("app-password".to_string()),
        recipient: Some("recipient@example.com".to_string()),
    }
}

/// Price source that serves a fixed table and counts calls.
pub struct StaticSource {
    table: PriceTable,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl StaticSource {
    pub fn new(table: PriceTable) -> Self {
        Self {
            table,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch_price_table(&self, tickers: &[String], _history_days: u32) -> Result<PriceTable> {
        self.calls.lock().unwrap().push(tickers.to_vec());
        Ok(self.table.select(tickers))
    }
}

/// Price source whose every call fails.
pub struct FailingSource;

#[async_trait]
impl PriceSource for FailingSource {
    async fn fetch_price_table(&self, _tickers: &[String], _history_days: u32) -> Result<PriceTable> {
        anyhow::bail!("connection refused")
    }
}

/// Mail transport that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(String, String, OutboundMessage)>>,
    pub fail: bool,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(
        &self,
        sender: &SenderIdentity,
        recipient: &str,
        message: &OutboundMessage,
    ) -> Result<(), DigestError> {
        if self.fail {
            return Err(DigestError::Delivery(
                "535 authentication failed".to_string(),
            ));
        }
        self.sent.lock().unwrap().push((
            sender.address.clone(),
            recipient.to_string(),
            message.clone(),
        ));
        Ok(())
    }
}

/// Writes `table` into `dir` and returns the CSV path.
pub fn write_table_csv(dir: &Path, table: &PriceTable) -> Result<PathBuf> {
    write_price_table_csv(table, Some(dir.join("prices.csv")))
}

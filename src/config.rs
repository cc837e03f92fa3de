// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::DigestError;
use crate::models::{LookbackWindow, TickerDirectory};
use crate::report::DEFAULT_REPORT_TITLE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const SENDER_EMAIL_VAR: &str = "MY_EMAIL";
pub const SENDER_PASSWORD_VAR: &str = "MY_PASSWORD";
pub const RECIPIENT_EMAIL_VAR: &str = "MY_RECIPIENT";

/// Report settings read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub tickers: Vec<String>,
    #[serde(default = "default_windows")]
    pub windows: Vec<LookbackWindow>,
    #[serde(default)]
    pub names: TickerDirectory,
    #[serde(default = "default_indices")]
    pub indices: Vec<IndexSymbol>,
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    #[serde(default = "default_report_title")]
    pub report_title: String,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// A market index shown in the snapshot section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSymbol {
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
        }
    }
}

fn default_windows() -> Vec<LookbackWindow> {
    vec![
        LookbackWindow::new(1, "Top 10 Performers - 1 Day"),
        LookbackWindow::new(5, "Top 10 Performers - 1 Week"),
        LookbackWindow::new(21, "Top 10 Performers - 1 Month"),
        LookbackWindow::new(63, "Top 10 Performers - 3 Months"),
    ]
}

fn default_indices() -> Vec<IndexSymbol> {
    vec![
        IndexSymbol {
            name: "Nasdaq 100".to_string(),
            symbol: "^NDX".to_string(),
        },
        IndexSymbol {
            name: "S&P 500".to_string(),
            symbol: "^GSPC".to_string(),
        },
    ]
}

fn default_history_days() -> u32 {
    90
}

fn default_report_title() -> String {
    DEFAULT_REPORT_TITLE.to_string()
}

impl Config {
    /// Reject settings the report cannot be built from.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.tickers.is_empty() {
            return Err(DigestError::InvalidConfiguration(
                "at least one ticker is required".to_string(),
            ));
        }
        if self.history_days == 0 {
            return Err(DigestError::InvalidConfiguration(
                "history_days must be positive".to_string(),
            ));
        }
        for window in &self.windows {
            if window.lookback == 0 {
                return Err(DigestError::InvalidConfiguration(format!(
                    "window '{}' has a lookback of 0 trading days",
                    window.title
                )));
            }
            if window.title.trim().is_empty() {
                return Err(DigestError::InvalidConfiguration(format!(
                    "window with lookback {} has an empty title",
                    window.lookback
                )));
            }
        }
        Ok(())
    }

    /// Universe tickers followed by index symbols, without duplicates.
    pub fn fetch_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::with_capacity(self.tickers.len() + self.indices.len());
        for symbol in self
            .tickers
            .iter()
            .chain(self.indices.iter().map(|index| &index.symbol))
        {
            let symbol = symbol.trim();
            if !symbol.is_empty() && !symbols.iter().any(|s| s == symbol) {
                symbols.push(symbol.to_string());
            }
        }
        symbols
    }
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    let mut config: Config = toml::from_str(content)?;
    let mut tickers: Vec<String> = Vec::with_capacity(config.tickers.len());
    for ticker in config.tickers.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if tickers.iter().any(|t| t == ticker) {
            tracing::warn!(%ticker, "ticker listed more than once; keeping the first");
        } else {
            tickers.push(ticker.to_string());
        }
    }
    config.tickers = tickers;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Sender identity and recipient, read once from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailSettings {
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

/// Validated sender address and credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub address: String,
    pub password: String,
}

impl MailSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let settings = Self {
            sender: read(SENDER_EMAIL_VAR),
            password: read(SENDER_PASSWORD_VAR),
            recipient: read(RECIPIENT_EMAIL_VAR),
        };

        tracing::debug!(
            sender_set = settings.sender.is_some(),
            password_set = settings.password.is_some(),
            recipient_set = settings.recipient.is_some(),
            "mail settings loaded"
        );
        settings
    }

    pub fn missing(&self) -> Vec<&'static str> {
        [
            (SENDER_EMAIL_VAR, self.sender.is_none()),
            (SENDER_PASSWORD_VAR, self.password.is_none()),
            (RECIPIENT_EMAIL_VAR, self.recipient.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect()
    }

    /// The sender identity and recipient, or every variable that is missing.
    pub fn require(&self) -> Result<(SenderIdentity, &str), DigestError> {
        match (&self.sender, &self.password, &self.recipient) {
            (Some(address), Some(password), Some(recipient)) => Ok((
                SenderIdentity {
                    address: address.clone(),
                    password: password.clone(),
                },
                recipient.as_str(),
            )),
            _ => Err(DigestError::ConfigurationMissing {
                missing: self.missing(),
            }),
        }
    }
}

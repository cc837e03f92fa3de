// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

/// Failures that end a digest run.
///
/// Data gaps (a window with too little history, a ticker with a missing
/// price) are not errors; they only change what the report shows.
#[derive(Error, Debug)]
pub enum DigestError {
    #[error("missing required configuration: {}", missing.join(", "))]
    ConfigurationMissing { missing: Vec<&'static str> },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to fetch price history: {0}")]
    DataFetch(String),

    #[error("failed to render report: {0}")]
    Render(#[from] askama::Error),

    #[error("invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("email delivery failed: {0}")]
    Delivery(String),
}

// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::config::IndexSymbol;
use crate::models::PriceTable;
use crate::utils::format_with_commas;
use chrono::NaiveDate;

const UNAVAILABLE: &str = "N/A (Market Closed?)";

/// Latest level of one market index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuote {
    pub name: String,
    pub symbol: String,
    pub close: Option<f64>,
}

impl IndexQuote {
    pub fn display_value(&self) -> String {
        match self.close {
            Some(close) => format_with_commas(close, 2),
            None => UNAVAILABLE.to_string(),
        }
    }
}

/// Index levels shown above the ranking tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarketSnapshot {
    pub quotes: Vec<IndexQuote>,
    /// Most recent date any index closed on.
    pub as_of: Option<NaiveDate>,
}

impl MarketSnapshot {
    /// Picks each index's most recent close out of the fetched table.
    pub fn from_table(indices: &[IndexSymbol], table: &PriceTable) -> Self {
        let mut as_of: Option<NaiveDate> = None;
        let quotes = indices
            .iter()
            .map(|index| {
                let latest = table.latest_close(&index.symbol);
                if let Some((date, _)) = latest {
                    as_of = as_of.max(Some(date));
                } else {
                    tracing::warn!(symbol = %index.symbol, "no recent close for index");
                }
                IndexQuote {
                    name: index.name.clone(),
                    symbol: index.symbol.clone(),
                    close: latest.map(|(_, close)| close),
                }
            })
            .collect();

        Self { quotes, as_of }
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

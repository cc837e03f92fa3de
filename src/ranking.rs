// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::models::{PriceTable, RankedRow, TickerDirectory};
use crate::utils::format_percent;

/// Maximum number of rows in one top-performers table.
pub const TOP_N: usize = 10;

/// Percentage change of every ticker between the row `lookback` positions
/// before the last one and the last row, in column order.
///
/// Returns an empty list when the table does not reach back that far.
/// Tickers with a missing close on either end, or a zero anchor price, are
/// left out.
pub fn percent_changes(table: &PriceTable, lookback: usize) -> Vec<(&str, f64)> {
    if lookback == 0 || table.len() <= lookback {
        return Vec::new();
    }

    let last = table.len() - 1;
    let (Some(current), Some(past)) = (table.row(last), table.row(last - lookback)) else {
        return Vec::new();
    };

    table
        .tickers()
        .iter()
        .zip(current.iter().zip(past))
        .filter_map(|(ticker, prices)| match prices {
            (Some(now), Some(then)) if *then != 0.0 => {
                let change = (now - then) / then * 100.0;
                change.is_finite().then_some((ticker.as_str(), change))
            }
            _ => None,
        })
        .collect()
}

/// Top performers over `lookback` trading rows, labelled with raw tickers.
pub fn rank_top_performers(table: &PriceTable, lookback: usize) -> Vec<RankedRow> {
    rank_top_performers_with(table, lookback, &TickerDirectory::default())
}

/// Top performers over `lookback` trading rows, labelled through `directory`.
///
/// At most [`TOP_N`] rows, highest change first, ranked `1..=N`. Ties keep
/// the table's column order. Formatting happens after selection.
pub fn rank_top_performers_with(
    table: &PriceTable,
    lookback: usize,
    directory: &TickerDirectory,
) -> Vec<RankedRow> {
    let mut changes = percent_changes(table, lookback);
    // Stable sort: equal changes stay in column order.
    changes.sort_by(|a, b| b.1.total_cmp(&a.1));

    changes
        .into_iter()
        .take(TOP_N)
        .enumerate()
        .map(|(i, (ticker, change))| RankedRow {
            rank: i + 1,
            ticker: ticker.to_string(),
            name: directory.display_name(ticker).to_string(),
            change,
            percent_change: format_percent(change),
        })
        .collect()
}

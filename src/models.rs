// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Closing prices for one run: rows are trading dates, columns are tickers.
///
/// Rows are kept in the order the source produced them (ascending by date);
/// nothing downstream re-sorts them. A `None` cell is a gap: the ticker had
/// no close that day (not listed yet, halted, delisted).
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    pub fn new(
        dates: Vec<NaiveDate>,
        tickers: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if dates.len() != rows.len() {
            anyhow::bail!(
                "price table has {} dates but {} rows",
                dates.len(),
                rows.len()
            );
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != tickers.len())
        {
            anyhow::bail!(
                "row {} has {} cells, expected {} (one per ticker)",
                i,
                row.len(),
                tickers.len()
            );
        }
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            anyhow::bail!(
                "price table dates must be strictly ascending ({} is followed by {})",
                pair[0],
                pair[1]
            );
        }

        Ok(Self {
            dates,
            tickers,
            rows,
        })
    }

    pub fn empty(tickers: Vec<String>) -> Self {
        Self {
            dates: Vec::new(),
            tickers,
            rows: Vec::new(),
        }
    }

    /// Number of trading-date rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn row(&self, index: usize) -> Option<&[Option<f64>]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Most recent defined close for `ticker`, scanning back from the last row.
    pub fn latest_close(&self, ticker: &str) -> Option<(NaiveDate, f64)> {
        let column = self.tickers.iter().position(|t| t == ticker)?;
        self.dates
            .iter()
            .zip(&self.rows)
            .rev()
            .find_map(|(date, row)| row[column].map(|price| (*date, price)))
    }

    /// Project the table onto `tickers`, in that order. Requested tickers
    /// the table does not carry are skipped, as are repeats; rows with no
    /// data left are kept so every projection shares the same calendar.
    pub fn select(&self, tickers: &[String]) -> PriceTable {
        let mut columns: Vec<(usize, &String)> = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            if let Some(i) = self.tickers.iter().position(|t| t == ticker) {
                if !columns.iter().any(|(chosen, _)| *chosen == i) {
                    columns.push((i, ticker));
                }
            }
        }

        PriceTable {
            dates: self.dates.clone(),
            tickers: columns.iter().map(|(_, t)| (*t).clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| columns.iter().map(|(i, _)| row[*i]).collect())
                .collect(),
        }
    }

    /// Drops dates on which no column has a close, such as a session only
    /// the index symbols traded in.
    pub fn without_empty_rows(&self) -> PriceTable {
        let (dates, rows): (Vec<NaiveDate>, Vec<Vec<Option<f64>>>) = self
            .dates
            .iter()
            .zip(&self.rows)
            .filter(|(_, row)| row.iter().any(Option::is_some))
            .map(|(date, row)| (*date, row.clone()))
            .unzip();
        PriceTable {
            dates,
            tickers: self.tickers.clone(),
            rows,
        }
    }
}

/// Accumulates per-ticker series into a [`PriceTable`].
///
/// Columns follow the order tickers were first added; rows are the union of
/// all dates, ascending. Inserting the same (ticker, date) twice keeps the
/// later price.
#[derive(Debug, Default)]
pub struct PriceTableBuilder {
    tickers: Vec<String>,
    cells: BTreeMap<NaiveDate, HashMap<usize, f64>>,
}

impl PriceTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn column(&mut self, ticker: &str) -> usize {
        match self.tickers.iter().position(|t| t == ticker) {
            Some(i) => i,
            None => {
                self.tickers.push(ticker.to_string());
                self.tickers.len() - 1
            }
        }
    }

    /// Registers a ticker column even if it ends up with no prices.
    pub fn add_ticker(&mut self, ticker: &str) -> &mut Self {
        self.column(ticker);
        self
    }

    pub fn insert(&mut self, ticker: &str, date: NaiveDate, close: f64) -> &mut Self {
        let column = self.column(ticker);
        if close.is_finite() {
            self.cells.entry(date).or_default().insert(column, close);
        }
        self
    }

    pub fn add_series<I>(&mut self, ticker: &str, series: I) -> &mut Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        self.add_ticker(ticker);
        for (date, close) in series {
            self.insert(ticker, date, close);
        }
        self
    }

    pub fn build(self) -> PriceTable {
        let width = self.tickers.len();
        let mut dates = Vec::with_capacity(self.cells.len());
        let mut rows = Vec::with_capacity(self.cells.len());
        for (date, cells) in self.cells {
            let mut row = vec![None; width];
            for (column, close) in cells {
                row[column] = Some(close);
            }
            dates.push(date);
            rows.push(row);
        }
        PriceTable {
            dates,
            tickers: self.tickers,
            rows,
        }
    }
}

/// How many trading rows to look back, and the heading its section gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    pub lookback: usize,
    pub title: String,
}

impl LookbackWindow {
    pub fn new(lookback: usize, title: impl Into<String>) -> Self {
        Self {
            lookback,
            title: title.into(),
        }
    }
}

/// One line of a top-performers table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub rank: usize,
    pub ticker: String,
    pub name: String,
    /// Raw change in percent, kept for callers that need the number.
    pub change: f64,
    /// Display form, e.g. `"10.00%"` or `"-5.00%"`.
    pub percent_change: String,
}

/// Optional ticker -> company name lookup used to relabel ranked rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerDirectory(HashMap<String, String>);

impl TickerDirectory {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self(names)
    }

    /// Company name for `ticker`, or the ticker itself when unknown.
    pub fn display_name<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.0.get(ticker).map(String::as_str).unwrap_or(ticker)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for TickerDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use csv::{Reader, Writer};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::api::PriceSource;
use crate::models::PriceTable;

const DATE_HEADER: &str = "Date";

/// Reads a price table previously written by [`write_price_table_csv`].
///
/// Layout: a `Date` column (`YYYY-MM-DD`, strictly ascending) followed by
/// one column per ticker; an empty cell is a missing close.
pub fn read_price_table_csv(path: &Path) -> Result<PriceTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut reader = Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    match headers.get(0) {
        Some(first) if first.trim() == DATE_HEADER => {}
        _ => anyhow::bail!(
            "{}: first column must be '{}'",
            path.display(),
            DATE_HEADER
        ),
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

    let mut dates = Vec::new();
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let date = NaiveDate::parse_from_str(record.get(0).unwrap_or_default().trim(), "%Y-%m-%d")
            .with_context(|| format!("{}: bad date on data row {}", path.display(), line + 1))?;

        let mut row = Vec::with_capacity(tickers.len());
        for (i, ticker) in tickers.iter().enumerate() {
            let cell = record.get(i + 1).unwrap_or_default().trim();
            let price = if cell.is_empty() {
                None
            } else {
                let value: f64 = cell.parse().with_context(|| {
                    format!("{}: bad price '{}' for {} on {}", path.display(), cell, ticker, date)
                })?;
                value.is_finite().then_some(value)
            };
            row.push(price);
        }
        dates.push(date);
        rows.push(row);
    }

    PriceTable::new(dates, tickers, rows)
        .with_context(|| format!("{}: invalid price table", path.display()))
}

/// Writes `table` as CSV. Without an explicit path the file goes to
/// `output/prices_<timestamp>.csv`. Returns the path written.
pub fn write_price_table_csv(table: &PriceTable, output_path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match output_path {
        Some(path) => path,
        None => {
            std::fs::create_dir_all("output")?;
            let timestamp = Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from(format!("output/prices_{}.csv", timestamp))
        }
    };

    let file = File::create(&path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    let mut header = vec![DATE_HEADER.to_string()];
    header.extend(table.tickers().iter().cloned());
    writer.write_record(&header)?;

    for (i, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        if let Some(row) = table.row(i) {
            record.extend(
                row.iter()
                    .map(|price| price.map(|p| p.to_string()).unwrap_or_default()),
            );
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(path)
}

/// Price source backed by a local CSV file, for offline runs.
pub struct CsvPriceSource {
    path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    async fn fetch_price_table(&self, tickers: &[String], _history_days: u32) -> Result<PriceTable> {
        let table = read_price_table_csv(&self.path)?;
        for ticker in tickers {
            if !table.tickers().contains(ticker) {
                tracing::warn!(%ticker, path = %self.path.display(), "ticker not in price file; omitting");
            }
        }
        Ok(table.select(tickers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, day).unwrap()
    }

    #[test]
    fn test_read_price_csv_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(
            &path,
            "Date,AAPL,NEWCO\n2025-04-01,200.5,\n2025-04-02,202.25,10\n",
        )
        .unwrap();

        let table = read_price_table_csv(&path).unwrap();
        assert_eq!(table.dates(), &[d(1), d(2)]);
        assert_eq!(table.tickers(), &["AAPL".to_string(), "NEWCO".to_string()]);
        assert_eq!(table.row(0).unwrap(), &[Some(200.5), None]);
        assert_eq!(table.row(1).unwrap(), &[Some(202.25), Some(10.0)]);
    }

    #[test]
    fn test_read_rejects_descending_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Date,AAPL\n2025-04-02,1\n2025-04-01,2\n").unwrap();

        assert!(read_price_table_csv(&path).is_err());
    }

    #[test]
    fn test_read_rejects_missing_date_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Ticker,AAPL\n2025-04-01,1\n").unwrap();

        assert!(read_price_table_csv(&path).is_err());
    }

    #[test]
    fn test_write_then_read_preserves_gaps() {
        let table = PriceTable::new(
            vec![d(1), d(2)],
            vec!["NKE".to_string(), "TJX".to_string()],
            vec![vec![Some(70.5), None], vec![Some(71.0), Some(120.0)]],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = write_price_table_csv(&table, Some(dir.path().join("out.csv"))).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Date,NKE,TJX");
        assert_eq!(lines[1], "2025-04-01,70.5,");

        assert_eq!(read_price_table_csv(&path).unwrap(), table);
    }

    #[tokio::test]
    async fn test_csv_source_selects_requested_tickers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Date,AAPL,MSFT,^GSPC\n2025-04-01,1,2,3\n").unwrap();

        let source = CsvPriceSource::new(&path);
        let table = source
            .fetch_price_table(&["MSFT".to_string(), "GONE".to_string()], 90)
            .await
            .unwrap();

        assert_eq!(table.tickers(), &["MSFT".to_string()]);
        assert_eq!(table.row(0).unwrap(), &[Some(2.0)]);
    }
}

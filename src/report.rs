// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::error::DigestError;
use crate::models::{LookbackWindow, PriceTable, TickerDirectory};
use crate::ranking::rank_top_performers_with;
use crate::render::{render, render_document, render_snapshot};
use crate::snapshot::MarketSnapshot;

pub const DEFAULT_REPORT_TITLE: &str = "Daily Stock Performance Report";

/// Builds the HTML report: heading, optional market snapshot, then one
/// section per lookback window in configured order.
///
/// Any section that fails to render fails the whole report, so a document
/// either has every section or is not produced.
#[derive(Debug, Clone)]
pub struct ReportAssembler<'a> {
    title: String,
    directory: Option<&'a TickerDirectory>,
    snapshot: Option<&'a MarketSnapshot>,
}

impl Default for ReportAssembler<'_> {
    fn default() -> Self {
        Self {
            title: DEFAULT_REPORT_TITLE.to_string(),
            directory: None,
            snapshot: None,
        }
    }
}

impl<'a> ReportAssembler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_directory(mut self, directory: &'a TickerDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_snapshot(mut self, snapshot: &'a MarketSnapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Rendered sections in document order, before wrapping.
    pub fn sections(
        &self,
        table: &PriceTable,
        windows: &[LookbackWindow],
    ) -> Result<Vec<String>, DigestError> {
        let empty_directory = TickerDirectory::default();
        let directory = self.directory.unwrap_or(&empty_directory);

        let mut sections = Vec::with_capacity(windows.len() + 1);
        if let Some(snapshot) = self.snapshot.filter(|s| !s.is_empty()) {
            sections.push(render_snapshot(snapshot)?);
        }

        for window in windows {
            let rows = rank_top_performers_with(table, window.lookback, directory);
            if rows.is_empty() {
                tracing::info!(
                    lookback = window.lookback,
                    available_rows = table.len(),
                    title = %window.title,
                    "not enough history for window"
                );
            } else {
                tracing::debug!(
                    lookback = window.lookback,
                    entries = rows.len(),
                    title = %window.title,
                    "ranked window"
                );
            }
            sections.push(render(&rows, &window.title)?);
        }

        Ok(sections)
    }

    pub fn build(
        &self,
        table: &PriceTable,
        windows: &[LookbackWindow],
    ) -> Result<String, DigestError> {
        let sections = self.sections(table, windows)?;
        self.finish(&sections)
    }

    /// Wraps already rendered sections under the report heading.
    pub fn finish(&self, sections: &[String]) -> Result<String, DigestError> {
        render_document(&self.title, sections)
    }
}

/// Report for `windows` over `table` with the default heading.
pub fn build_report(table: &PriceTable, windows: &[LookbackWindow]) -> Result<String, DigestError> {
    ReportAssembler::new().build(table, windows)
}

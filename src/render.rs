// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use askama::Template;
use chrono::NaiveDate;

use crate::error::DigestError;
use crate::models::RankedRow;
use crate::snapshot::{IndexQuote, MarketSnapshot};

#[derive(Template)]
#[template(path = "window.html")]
struct WindowTemplate<'a> {
    title: &'a str,
    rows: &'a [RankedRow],
}

#[derive(Template)]
#[template(path = "insufficient.html")]
struct InsufficientDataTemplate<'a> {
    title: &'a str,
}

#[derive(Template)]
#[template(path = "snapshot.html")]
struct SnapshotTemplate<'a> {
    quotes: &'a [IndexQuote],
    as_of: Option<NaiveDate>,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    sections: &'a [String],
}

/// HTML fragment for one window: a heading plus the ranked table, or a
/// not-enough-data notice when `rows` is empty. Rows are emitted as given.
pub fn render(rows: &[RankedRow], title: &str) -> Result<String, DigestError> {
    let html = if rows.is_empty() {
        InsufficientDataTemplate { title }.render()?
    } else {
        WindowTemplate { title, rows }.render()?
    };
    Ok(html)
}

pub fn render_snapshot(snapshot: &MarketSnapshot) -> Result<String, DigestError> {
    Ok(SnapshotTemplate {
        quotes: &snapshot.quotes,
        as_of: snapshot.as_of,
    }
    .render()?)
}

/// Wraps rendered sections into a full document, each followed by `<hr>`.
pub fn render_document(title: &str, sections: &[String]) -> Result<String, DigestError> {
    Ok(ReportTemplate { title, sections }.render()?)
}

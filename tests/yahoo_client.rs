// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

//! Yahoo chart client against a mock HTTP server

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topmovers_rs::api::{PriceSource, YahooClient};

fn chart_body(symbol: &str, closes: &[f64]) -> serde_json::Value {
    // 2025-06-02, 2025-06-03, 2025-06-04 at 09:30 New York time.
    let timestamps: Vec<i64> = [1748871000, 1748957400, 1749043800]
        .into_iter()
        .take(closes.len())
        .collect();
    json!({
        "chart": {
            "result": [{
                "meta": {"symbol": symbol, "currency": "USD", "gmtoffset": -14400},
                "timestamp": timestamps,
                "indicators": {
                    "quote": [{"close": closes}],
                    "adjclose": [{"adjclose": closes}]
                }
            }],
            "error": null
        }
    })
}

fn not_found_body() -> serde_json::Value {
    json!({
        "chart": {
            "result": null,
            "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
        }
    })
}

async fn mount_chart(server: &MockServer, symbol: &str, closes: &[f64]) {
    Mock::given(method("GET"))
        .and(path(format!("/v8/finance/chart/{symbol}")))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(symbol, closes)))
        .mount(server)
        .await;
}

fn tickers(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_fetch_builds_aligned_table() {
    let server = MockServer::start().await;
    mount_chart(&server, "AAPL", &[200.0, 202.0, 204.0]).await;
    mount_chart(&server, "MSFT", &[400.0, 410.0]).await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let table = client
        .fetch_price_table(&tickers(&["AAPL", "MSFT"]), 30)
        .await
        .unwrap();

    assert_eq!(table.tickers(), &["AAPL".to_string(), "MSFT".to_string()]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.dates()[0], NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    assert_eq!(table.row(2), Some(&[Some(204.0), None][..]));
    assert_eq!(
        table.latest_close("MSFT"),
        Some((NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(), 410.0))
    );
}

#[tokio::test]
async fn test_unknown_ticker_is_omitted() {
    let server = MockServer::start().await;
    mount_chart(&server, "AAPL", &[200.0, 202.0]).await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GONE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let table = client
        .fetch_price_table(&tickers(&["GONE", "AAPL"]), 30)
        .await
        .unwrap();

    assert_eq!(table.tickers(), &["AAPL".to_string()]);
    assert_eq!(table.len(), 2);
}

#[tokio::test]
async fn test_chart_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GONE"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let to = chrono::Utc::now();
    let err = client
        .get_daily_closes("GONE", to - chrono::Duration::days(30), to)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No data found"));
}

#[tokio::test]
async fn test_every_ticker_failing_is_an_error() {
    // Nothing mounted: every request gets an empty 404.
    let server = MockServer::start().await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let result = client
        .fetch_price_table(&tickers(&["AAPL", "MSFT"]), 30)
        .await;

    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("no price data returned")
    );
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let to = chrono::Utc::now();
    let err = client
        .get_daily_closes("AAPL", to - chrono::Duration::days(5), to)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("503"));
}

//! Yahoo Finance 차트 API 시세 조회.
//!
//! `GET {base_url}/v8/finance/chart/{SYMBOL}?interval=1d&range=1d` 응답의
//! `chart.result[0].meta.regularMarketPrice`를 현재가로 사용합니다.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use portfolio_core::{Price, PriceConfig, Ticker};

use super::PriceSource;
use crate::error::{DataError, Result};

/// Yahoo Finance 현재가 조회기.
#[derive(Debug, Clone)]
pub struct YahooPriceSource {
    client: Client,
    base_url: String,
    ticker_suffix: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

impl YahooPriceSource {
    /// 설정으로 조회기를 생성합니다.
    pub fn new(config: &PriceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DataError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            ticker_suffix: config.ticker_suffix.clone(),
        })
    }

    /// 종목의 차트 API URL을 반환합니다.
    pub fn chart_url(&self, ticker: &Ticker) -> String {
        format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url,
            ticker.quote_symbol(&self.ticker_suffix)
        )
    }
}

/// 차트 응답에서 현재가를 추출합니다. 0 이하의 가격은 시세 없음으로 취급합니다.
fn extract_price(response: ChartResponse) -> Result<Option<Price>> {
    if let Some(err) = response.chart.error {
        debug!(
            code = err.code.as_deref().unwrap_or(""),
            description = err.description.as_deref().unwrap_or(""),
            "Chart API returned an error body"
        );
        return Ok(None);
    }

    let raw = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.meta.regular_market_price);

    let Some(raw) = raw else {
        return Ok(None);
    };
    if !raw.is_finite() {
        return Ok(None);
    }

    // f64 Display gives the shortest round-trip form (38.12, not 38.1199999...)
    let price = Decimal::from_str(&raw.to_string())
        .map_err(|e| DataError::Parse(format!("regularMarketPrice {}: {}", raw, e)))?;

    Ok(Some(price).filter(|p| *p > Decimal::ZERO))
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<Option<Price>> {
        let url = self.chart_url(ticker);
        debug!(url = %url, "Fetching chart");

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        match status {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(DataError::RateLimited(ticker.to_string()));
            }
            s if !s.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(DataError::Api {
                    status: s.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        let parsed: ChartResponse = serde_json::from_str(&body)
            .map_err(|e| DataError::Parse(format!("{}: {}", ticker, e)))?;

        extract_price(parsed)
    }
}

//! 고정 가격표 시세 소스.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use portfolio_core::{Price, Ticker};

use super::PriceSource;
use crate::error::Result;

/// 미리 정해진 가격표에서 현재가를 반환합니다.
///
/// 오프라인 분석(`--prices prices.json`)과 테스트에 사용합니다.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceSource {
    prices: HashMap<Ticker, Price>,
}

impl StaticPriceSource {
    pub fn new(prices: HashMap<Ticker, Price>) -> Self {
        Self { prices }
    }

    /// `{"PETR4": 38.12, "VALE3": "61.50"}` 형식의 JSON 파일에서 가격표를 읽습니다.
    ///
    /// 키는 티커 정규화 규칙을 따릅니다 ("petr4.sa" → "PETR4").
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let raw: HashMap<String, Price> = serde_json::from_str(&content)?;

        let mut prices = HashMap::with_capacity(raw.len());
        for (symbol, price) in raw {
            prices.insert(Ticker::parse(&symbol)?, price);
        }
        Ok(Self { prices })
    }

    /// 가격을 추가합니다.
    pub fn with_price(mut self, ticker: Ticker, price: Price) -> Self {
        self.prices.insert(ticker, price);
        self
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<Option<Price>> {
        Ok(self.prices.get(ticker).copied())
    }
}

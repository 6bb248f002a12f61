//! 한 번의 분석에 사용할 시세 스냅샷.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Price, Ticker};

/// 종목별 현재가 스냅샷.
///
/// 시세를 얻지 못한 종목은 `None`으로 기록되며, 0 이하의 가격도 조회 불가로 취급합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBook {
    prices: HashMap<Ticker, Option<Price>>,
    /// 스냅샷 생성 시각
    pub fetched_at: DateTime<Utc>,
}

impl Default for PriceBook {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceBook {
    /// 빈 시세 스냅샷을 생성합니다.
    pub fn new() -> Self {
        Self {
            prices: HashMap::new(),
            fetched_at: Utc::now(),
        }
    }

    /// 조회 결과를 기록합니다.
    pub fn record(&mut self, ticker: Ticker, price: Option<Price>) {
        let price = price.filter(|p| *p > Decimal::ZERO);
        self.prices.insert(ticker, price);
    }

    /// 가격을 기록합니다.
    pub fn insert(&mut self, ticker: Ticker, price: Price) {
        self.record(ticker, Some(price));
    }

    /// 시세 조회 불가로 기록합니다.
    pub fn mark_unavailable(&mut self, ticker: Ticker) {
        self.record(ticker, None);
    }

    /// 사용 가능한 가격을 반환합니다.
    pub fn price(&self, ticker: &Ticker) -> Option<Price> {
        self.prices.get(ticker).copied().flatten()
    }

    /// 기록된 종목 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// 가격이 있는 종목 수를 반환합니다.
    pub fn available_count(&self) -> usize {
        self.prices.values().filter(|p| p.is_some()).count()
    }
}

impl FromIterator<(Ticker, Price)> for PriceBook {
    fn from_iter<I: IntoIterator<Item = (Ticker, Price)>>(iter: I) -> Self {
        let mut book = PriceBook::new();
        for (ticker, price) in iter {
            book.insert(ticker, price);
        }
        book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_positive_prices_are_unavailable() {
        let mut book = PriceBook::new();
        let petr = Ticker::parse("PETR4").unwrap();
        let vale = Ticker::parse("VALE3").unwrap();
        let itub = Ticker::parse("ITUB4").unwrap();

        book.insert(petr.clone(), dec!(38.12));
        book.insert(vale.clone(), dec!(0));
        book.mark_unavailable(itub.clone());

        assert_eq!(book.price(&petr), Some(dec!(38.12)));
        assert_eq!(book.price(&vale), None);
        assert_eq!(book.price(&itub), None);
        assert_eq!(book.len(), 3);
        assert_eq!(book.available_count(), 1);
    }
}

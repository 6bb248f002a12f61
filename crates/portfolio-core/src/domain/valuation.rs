//! 보유 종목 수익률 평가.
//!
//! 평균 단가, 현재가, 누적 배당으로 종목별 손익과 배당 수익률을 계산합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Holding;
use crate::error::{PortfolioError, PortfolioResult};
use crate::types::{times_units, Money, Percent, Price, Ticker, Units};

fn overflow(context: &str) -> PortfolioError {
    PortfolioError::Overflow(context.to_string())
}

/// `numerator / denominator × 100`. 분모가 0이면 0을 반환합니다.
fn checked_pct(numerator: Decimal, denominator: Decimal) -> Option<Percent> {
    if denominator.is_zero() {
        return Some(Decimal::ZERO);
    }
    numerator
        .checked_div(denominator)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// 종목별 평가 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub ticker: Ticker,
    pub quantity: Units,
    pub target_pct: u32,
    pub average_cost: Price,
    pub price: Price,
    /// 평가액 (수량 × 현재가)
    pub market_value: Money,
    /// 투자 원금 (수량 × 평균 단가)
    pub invested: Money,
    /// 평가 손익
    pub profit: Money,
    /// 평균 단가 대비 수익률 (평균 단가가 0이면 0)
    pub profit_pct: Percent,
    /// 누적 배당
    pub distributions: Money,
    /// 평가 손익 + 누적 배당
    pub total_return: Money,
    /// 투자 원금 대비 배당 수익률 (원금이 0이면 0)
    pub yield_on_cost_pct: Percent,
}

impl HoldingValuation {
    /// 보유 기록과 현재가로 평가합니다.
    ///
    /// 금액이 Decimal 범위를 넘으면 `Overflow` 에러를 반환합니다.
    pub fn new(ticker: Ticker, holding: &Holding, price: Price) -> PortfolioResult<Self> {
        let market_value =
            times_units(price, holding.quantity).ok_or_else(|| overflow(ticker.as_str()))?;
        let invested = times_units(holding.average_cost, holding.quantity)
            .ok_or_else(|| overflow(ticker.as_str()))?;
        let profit = market_value
            .checked_sub(invested)
            .ok_or_else(|| overflow(ticker.as_str()))?;

        let profit_pct = if holding.average_cost.is_zero() {
            Decimal::ZERO
        } else {
            checked_pct(price, holding.average_cost)
                .and_then(|pct| pct.checked_sub(Decimal::ONE_HUNDRED))
                .ok_or_else(|| overflow(ticker.as_str()))?
        };

        let yield_on_cost_pct = checked_pct(holding.distributions, invested)
            .ok_or_else(|| overflow(ticker.as_str()))?;
        let total_return = profit
            .checked_add(holding.distributions)
            .ok_or_else(|| overflow(ticker.as_str()))?;

        Ok(Self {
            ticker,
            quantity: holding.quantity,
            target_pct: holding.target_pct,
            average_cost: holding.average_cost,
            price,
            market_value,
            invested,
            profit,
            profit_pct,
            distributions: holding.distributions,
            total_return,
            yield_on_cost_pct,
        })
    }
}

/// 포트폴리오 전체 평가 요약.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub market_value: Money,
    pub invested: Money,
    pub profit: Money,
    /// 총 평가액 대비 손익 비율 (평가액이 0이면 0)
    pub profit_pct: Percent,
    pub distributions: Money,
    pub total_return: Money,
}

/// 종목별 평가와 요약.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// 입력 순서의 종목별 평가
    pub rows: Vec<HoldingValuation>,
    pub summary: ValuationSummary,
}

impl Valuation {
    /// 종목별 평가 목록으로 요약을 계산합니다.
    pub fn from_rows(rows: Vec<HoldingValuation>) -> PortfolioResult<Self> {
        let mut summary = ValuationSummary::default();
        for row in &rows {
            let sum = |acc: Money, value: Money| {
                acc.checked_add(value).ok_or_else(|| overflow(row.ticker.as_str()))
            };
            summary.market_value = sum(summary.market_value, row.market_value)?;
            summary.invested = sum(summary.invested, row.invested)?;
            summary.profit = sum(summary.profit, row.profit)?;
            summary.distributions = sum(summary.distributions, row.distributions)?;
        }
        summary.total_return = summary
            .profit
            .checked_add(summary.distributions)
            .ok_or_else(|| overflow("total return"))?;
        summary.profit_pct = checked_pct(summary.profit, summary.market_value)
            .ok_or_else(|| overflow("profit %"))?;

        Ok(Self { rows, summary })
    }

    /// 수익률 내림차순으로 정렬된 평가 목록을 반환합니다.
    pub fn rows_by_profit_pct(&self) -> Vec<&HoldingValuation> {
        let mut rows: Vec<&HoldingValuation> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.profit_pct.cmp(&a.profit_pct));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_holding_valuation() {
        let holding = Holding::new(100, 20)
            .with_average_cost(dec!(25))
            .with_distributions(dec!(150));
        let v = HoldingValuation::new(ticker("BBAS3"), &holding, dec!(30)).unwrap();

        assert_eq!(v.market_value, dec!(3000));
        assert_eq!(v.invested, dec!(2500));
        assert_eq!(v.profit, dec!(500));
        assert_eq!(v.profit_pct, dec!(20));
        assert_eq!(v.total_return, dec!(650));
        assert_eq!(v.yield_on_cost_pct, dec!(6));
    }

    #[test]
    fn test_zero_average_cost_has_zero_pct() {
        let holding = Holding::new(10, 10);
        let v = HoldingValuation::new(ticker("BBAS3"), &holding, dec!(30)).unwrap();

        assert_eq!(v.profit, dec!(300));
        assert_eq!(v.profit_pct, Decimal::ZERO);
        assert_eq!(v.yield_on_cost_pct, Decimal::ZERO);
    }

    #[test]
    fn test_summary_and_sorting() {
        let rows = vec![
            HoldingValuation::new(
                ticker("LOSS3"),
                &Holding::new(10, 50).with_average_cost(dec!(20)),
                dec!(15),
            )
            .unwrap(),
            HoldingValuation::new(
                ticker("GAIN3"),
                &Holding::new(10, 50).with_average_cost(dec!(10)),
                dec!(15),
            )
            .unwrap(),
        ];
        let valuation = Valuation::from_rows(rows).unwrap();

        assert_eq!(valuation.summary.market_value, dec!(300));
        assert_eq!(valuation.summary.invested, dec!(300));
        assert_eq!(valuation.summary.profit, dec!(0));
        assert_eq!(valuation.summary.profit_pct, dec!(0));

        let sorted = valuation.rows_by_profit_pct();
        assert_eq!(sorted[0].ticker.as_str(), "GAIN3");
        assert_eq!(sorted[1].ticker.as_str(), "LOSS3");
    }

    #[test]
    fn test_empty_summary() {
        let valuation = Valuation::from_rows(Vec::new()).unwrap();
        assert_eq!(valuation.summary.profit_pct, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_values_are_errors() {
        let huge = Holding::new(u64::MAX, 10);
        assert!(matches!(
            HoldingValuation::new(ticker("HUGE3"), &huge, Decimal::MAX),
            Err(PortfolioError::Overflow(_))
        ));

        // A tiny average cost makes the profit ratio explode
        let tiny_cost = Holding::new(1, 10).with_average_cost(Decimal::new(1, 28));
        assert!(matches!(
            HoldingValuation::new(ticker("TINY3"), &tiny_cost, dec!(1000000000)),
            Err(PortfolioError::Overflow(_))
        ));

        let half = Holding::new(1, 10);
        let rows = vec![
            HoldingValuation::new(ticker("HALF3"), &half, Decimal::MAX).unwrap(),
            HoldingValuation::new(ticker("HALF4"), &half, Decimal::MAX).unwrap(),
        ];
        assert!(matches!(
            Valuation::from_rows(rows),
            Err(PortfolioError::Overflow(_))
        ));
    }
}

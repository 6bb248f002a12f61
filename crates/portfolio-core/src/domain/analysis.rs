//! 포트폴리오 분석 실행.
//!
//! 시세 스냅샷을 받아 시세가 있는 종목만으로 평가와 배분을 수행하고
//! 화면/내보내기에 필요한 결과를 하나의 보고서로 묶습니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{
    allocate_with, AllocationAsset, AllocationOptions, HoldingValuation, Portfolio, PriceBook,
    PurchaseLine, PurchasePlan, Valuation,
};
use crate::error::{PortfolioError, PortfolioResult};
use crate::types::{Money, Ticker};

/// 한 번의 분석 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// 생성 시각
    pub generated_at: DateTime<Utc>,
    /// 투자금
    pub cash: Money,
    /// 시세가 있는 종목의 평가
    pub valuation: Valuation,
    /// 매수 계획
    pub plan: PurchasePlan,
    /// 시세 조회 불가로 제외된 종목
    pub unavailable: Vec<Ticker>,
    /// 분석에 포함된 종목의 목표 비중 합계
    pub target_sum_pct: u32,
}

impl AnalysisReport {
    /// 매수 금액 내림차순 매수 목록.
    pub fn shopping_list(&self) -> Vec<&PurchaseLine> {
        self.plan.purchases_by_cost()
    }

    /// 총 매수 금액.
    pub fn total_spent(&self) -> Money {
        self.plan.total_spent()
    }

    /// 남은 현금.
    pub fn remaining_cash(&self) -> Money {
        self.plan.remaining_cash
    }

    /// 매수할 것이 없는지 (이미 균형 상태인지) 확인합니다.
    pub fn is_balanced(&self) -> bool {
        self.plan.is_empty()
    }
}

/// 포트폴리오를 분석합니다.
///
/// 시세가 없는 종목은 평가와 배분 모두에서 제외됩니다.
/// 모든 종목의 시세가 없으면 `PriceUnavailable` 에러를 반환합니다.
pub fn analyze(
    portfolio: &Portfolio,
    prices: &PriceBook,
    cash: Money,
    options: AllocationOptions,
) -> PortfolioResult<AnalysisReport> {
    if portfolio.is_empty() {
        return Err(PortfolioError::InvalidInput("포트폴리오가 비어 있습니다".to_string()));
    }

    let mut rows = Vec::with_capacity(portfolio.len());
    let mut assets = Vec::with_capacity(portfolio.len());
    let mut unavailable = Vec::new();

    for (ticker, holding) in portfolio.iter() {
        match prices.price(ticker) {
            Some(price) => {
                rows.push(HoldingValuation::new(ticker.clone(), holding, price)?);
                assets.push(AllocationAsset::new(
                    ticker.clone(),
                    holding.quantity,
                    holding.target_pct,
                    price,
                ));
            }
            None => {
                warn!(ticker = %ticker, "Price unavailable, excluded from analysis");
                unavailable.push(ticker.clone());
            }
        }
    }

    if assets.is_empty() {
        return Err(PortfolioError::PriceUnavailable(format!(
            "{}개 종목 모두 시세 없음",
            unavailable.len()
        )));
    }

    let target_sum_pct: u32 = assets.iter().map(|a| a.target_pct).sum();
    if target_sum_pct != 100 {
        warn!(target_sum_pct, "Target weights do not sum to 100");
    }

    let valuation = Valuation::from_rows(rows)?;
    let plan = allocate_with(&assets, cash, options)?;

    info!(
        priced = assets.len(),
        unavailable = unavailable.len(),
        market_value = %valuation.summary.market_value,
        spent = %plan.total_spent(),
        "Analysis completed"
    );

    Ok(AnalysisReport {
        generated_at: Utc::now(),
        cash,
        valuation,
        plan,
        unavailable,
        target_sum_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Holding, StopReason};
    use crate::error::AllocationError;
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    fn sample_portfolio() -> Portfolio {
        let mut portfolio = Portfolio::new();
        portfolio
            .insert(ticker("ITSA4"), Holding::new(10, 50).with_average_cost(dec!(8)))
            .unwrap();
        portfolio
            .insert(ticker("VALE3"), Holding::new(0, 50).with_average_cost(dec!(0)))
            .unwrap();
        portfolio.insert(ticker("ZZZZ3"), Holding::new(5, 0)).unwrap();
        portfolio
    }

    #[test]
    fn test_unpriced_assets_are_excluded() {
        let portfolio = sample_portfolio();
        let prices: PriceBook = vec![(ticker("ITSA4"), dec!(10)), (ticker("VALE3"), dec!(60))]
            .into_iter()
            .collect();

        let report = analyze(&portfolio, &prices, dec!(200), AllocationOptions::default()).unwrap();

        assert_eq!(report.unavailable, vec![ticker("ZZZZ3")]);
        assert_eq!(report.valuation.rows.len(), 2);
        assert_eq!(report.plan.lines.len(), 2);
        assert!(report.plan.line("ZZZZ3").is_none());
        assert_eq!(report.target_sum_pct, 100);
        assert_eq!(report.valuation.summary.market_value, dec!(100));
        assert_eq!(report.valuation.summary.profit, dec!(20));
    }

    #[test]
    fn test_allocation_moves_toward_targets() {
        let portfolio = sample_portfolio();
        let prices: PriceBook = vec![
            (ticker("ITSA4"), dec!(10)),
            (ticker("VALE3"), dec!(60)),
            (ticker("ZZZZ3"), dec!(1)),
        ]
        .into_iter()
        .collect();

        let report = analyze(&portfolio, &prices, dec!(200), AllocationOptions::default()).unwrap();

        // ZZZZ3 has no target and is never bought
        assert_eq!(report.plan.units_for("ZZZZ3"), 0);
        assert!(report.plan.units_for("VALE3") > 0);
        assert_eq!(
            report.total_spent() + report.remaining_cash(),
            dec!(200)
        );
        assert!(!report.is_balanced());
    }

    #[test]
    fn test_all_unavailable_is_error() {
        let portfolio = sample_portfolio();
        let prices = PriceBook::new();

        assert!(matches!(
            analyze(&portfolio, &prices, dec!(100), AllocationOptions::default()),
            Err(PortfolioError::PriceUnavailable(_))
        ));
    }

    #[test]
    fn test_empty_portfolio_is_error() {
        assert!(matches!(
            analyze(
                &Portfolio::new(),
                &PriceBook::new(),
                dec!(100),
                AllocationOptions::default()
            ),
            Err(PortfolioError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_negative_cash_is_rejected() {
        let portfolio = sample_portfolio();
        let prices: PriceBook = vec![(ticker("ITSA4"), dec!(10))].into_iter().collect();

        assert!(matches!(
            analyze(&portfolio, &prices, dec!(-5), AllocationOptions::default()),
            Err(PortfolioError::Allocation(AllocationError::NegativeCash(_)))
        ));
    }

    #[test]
    fn test_balanced_portfolio() {
        let mut portfolio = Portfolio::new();
        portfolio.insert(ticker("BOVA11"), Holding::new(100, 100)).unwrap();
        let prices: PriceBook = vec![(ticker("BOVA11"), dec!(120))].into_iter().collect();

        // Cash below one unit: nothing can be bought
        let report = analyze(&portfolio, &prices, dec!(50), AllocationOptions::default()).unwrap();
        assert!(report.is_balanced());
        assert_eq!(report.plan.stop_reason, StopReason::NothingAffordable);
        assert!(report.shopping_list().is_empty());
    }
}

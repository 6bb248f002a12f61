//! 보유 자산 및 포트폴리오 관리.
//!
//! 이 모듈은 저장소에 기록되는 포트폴리오 타입을 정의합니다:
//! - `Holding` - 종목별 보유 수량, 목표 비중, 평균 단가, 누적 배당
//! - `HoldingPatch` - 부분 수정 요청
//! - `Portfolio` - 티커 순으로 정렬된 보유 자산 모음

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

use crate::domain::ModelPortfolio;
use crate::error::{PortfolioError, PortfolioResult};
use crate::types::{Money, Ticker, Units};

/// 신규 종목의 기본 목표 비중.
pub const DEFAULT_TARGET_PCT: u32 = 10;

/// 종목별 보유 기록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// 보유 수량
    #[serde(alias = "qtde")]
    pub quantity: Units,
    /// 목표 비중 (0~100)
    #[serde(alias = "meta_pct")]
    pub target_pct: u32,
    /// 평균 단가 (이전 버전 파일에는 없을 수 있음)
    #[serde(default, alias = "pm")]
    pub average_cost: Money,
    /// 누적 수령 배당/분배금
    #[serde(default)]
    pub distributions: Money,
}

impl Holding {
    /// 새 보유 기록을 생성합니다 (평균 단가와 배당은 0).
    pub fn new(quantity: Units, target_pct: u32) -> Self {
        Self {
            quantity,
            target_pct,
            average_cost: Decimal::ZERO,
            distributions: Decimal::ZERO,
        }
    }

    /// 평균 단가를 설정합니다.
    pub fn with_average_cost(mut self, average_cost: Money) -> Self {
        self.average_cost = average_cost;
        self
    }

    /// 누적 배당을 설정합니다.
    pub fn with_distributions(mut self, distributions: Money) -> Self {
        self.distributions = distributions;
        self
    }
}

/// 보유 기록 부분 수정.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingPatch {
    pub quantity: Option<Units>,
    pub target_pct: Option<u32>,
    pub average_cost: Option<Money>,
    pub distributions: Option<Money>,
}

impl HoldingPatch {
    /// 변경할 필드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.target_pct.is_none()
            && self.average_cost.is_none()
            && self.distributions.is_none()
    }

    fn validate(&self) -> PortfolioResult<()> {
        if let Some(target) = self.target_pct {
            validate_target(target)?;
        }
        if self.average_cost.is_some_and(|v| v < Decimal::ZERO) {
            return Err(PortfolioError::InvalidInput(
                "평균 단가는 음수일 수 없습니다".to_string(),
            ));
        }
        if self.distributions.is_some_and(|v| v < Decimal::ZERO) {
            return Err(PortfolioError::InvalidInput(
                "누적 배당은 음수일 수 없습니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 모델 포트폴리오 적용 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelApplySummary {
    /// 새로 추가된 종목
    pub added: Vec<Ticker>,
    /// 목표 비중이 갱신된 종목
    pub updated: Vec<Ticker>,
}

/// 보유 자산 모음.
///
/// 티커 오름차순으로 정렬되어 저장되며, 이 순서가 배분 엔진의 동점 처리 순서가 됩니다.
/// 역직렬화 시 키는 [`Ticker::parse`]로 정규화되며, 정규화 후 겹치는 키
/// ("petr4.sa"와 "PETR4")는 에러입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Portfolio {
    holdings: BTreeMap<Ticker, Holding>,
}

impl<'de> Deserialize<'de> for Portfolio {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PortfolioVisitor;

        impl<'de> Visitor<'de> for PortfolioVisitor {
            type Value = Portfolio;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of ticker to holding")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut holdings = BTreeMap::new();
                while let Some((ticker, holding)) = map.next_entry::<Ticker, Holding>()? {
                    if holdings.contains_key(&ticker) {
                        return Err(de::Error::custom(format!("duplicate ticker {}", ticker)));
                    }
                    holdings.insert(ticker, holding);
                }
                Ok(Portfolio { holdings })
            }
        }

        deserializer.deserialize_map(PortfolioVisitor)
    }
}

impl Portfolio {
    /// 빈 포트폴리오를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// 종목 보유 기록을 조회합니다.
    pub fn get(&self, ticker: &Ticker) -> Option<&Holding> {
        self.holdings.get(ticker)
    }

    /// 티커 순으로 보유 기록을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&Ticker, &Holding)> {
        self.holdings.iter()
    }

    /// 티커 목록을 반환합니다.
    pub fn tickers(&self) -> Vec<Ticker> {
        self.holdings.keys().cloned().collect()
    }

    /// 목표 비중 합계를 반환합니다.
    pub fn total_target_pct(&self) -> u32 {
        self.holdings.values().map(|h| h.target_pct).sum()
    }

    /// 보유 기록을 그대로 삽입하거나 교체합니다.
    pub fn insert(&mut self, ticker: Ticker, holding: Holding) -> PortfolioResult<()> {
        validate_target(holding.target_pct)?;
        self.holdings.insert(ticker, holding);
        Ok(())
    }

    /// 새 종목을 추가합니다 (수량 0, 평균 단가 0).
    pub fn add(&mut self, ticker: Ticker, target_pct: u32) -> PortfolioResult<()> {
        validate_target(target_pct)?;
        if self.holdings.contains_key(&ticker) {
            return Err(PortfolioError::AlreadyExists(ticker.to_string()));
        }

        info!(ticker = %ticker, target_pct, "Holding added");
        self.holdings.insert(ticker, Holding::new(0, target_pct));
        Ok(())
    }

    /// 종목을 제거합니다.
    pub fn remove(&mut self, ticker: &Ticker) -> PortfolioResult<Holding> {
        let removed = self
            .holdings
            .remove(ticker)
            .ok_or_else(|| PortfolioError::NotFound(ticker.to_string()))?;

        info!(ticker = %ticker, "Holding removed");
        Ok(removed)
    }

    /// 보유 기록을 부분 수정합니다.
    pub fn update(&mut self, ticker: &Ticker, patch: &HoldingPatch) -> PortfolioResult<&Holding> {
        patch.validate()?;

        let holding = self
            .holdings
            .get_mut(ticker)
            .ok_or_else(|| PortfolioError::NotFound(ticker.to_string()))?;

        if let Some(quantity) = patch.quantity {
            holding.quantity = quantity;
        }
        if let Some(target) = patch.target_pct {
            holding.target_pct = target;
        }
        if let Some(cost) = patch.average_cost {
            holding.average_cost = cost;
        }
        if let Some(distributions) = patch.distributions {
            holding.distributions = distributions;
        }

        info!(ticker = %ticker, ?patch, "Holding updated");
        Ok(holding)
    }

    /// 모델 포트폴리오의 목표 비중을 적용합니다.
    ///
    /// 새 종목은 수량 0으로 추가하고, 기존 종목은 목표 비중만 덮어씁니다.
    /// 모델에 없는 종목은 그대로 둡니다.
    pub fn apply_model(&mut self, model: &ModelPortfolio) -> PortfolioResult<ModelApplySummary> {
        let mut summary = ModelApplySummary::default();

        for (raw, target) in model.targets {
            let ticker = Ticker::parse(raw)?;
            validate_target(*target)?;

            match self.holdings.get_mut(&ticker) {
                Some(holding) => {
                    holding.target_pct = *target;
                    summary.updated.push(ticker);
                }
                None => {
                    self.holdings.insert(ticker.clone(), Holding::new(0, *target));
                    summary.added.push(ticker);
                }
            }
        }

        let total = self.total_target_pct();
        if total != 100 {
            warn!(model = model.name, total_target_pct = total, "Target weights do not sum to 100");
        }

        info!(
            model = model.name,
            added = summary.added.len(),
            updated = summary.updated.len(),
            "Model portfolio applied"
        );
        Ok(summary)
    }
}

fn validate_target(target_pct: u32) -> PortfolioResult<()> {
    if target_pct > 100 {
        return Err(PortfolioError::InvalidInput(format!(
            "목표 비중은 0~100 범위여야 합니다: {}",
            target_pct
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::find_model;
    use rust_decimal_macros::dec;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_add_and_remove() {
        let mut portfolio = Portfolio::new();
        portfolio.add(ticker("WEGE3"), DEFAULT_TARGET_PCT).unwrap();

        let holding = portfolio.get(&ticker("WEGE3")).unwrap();
        assert_eq!(holding.quantity, 0);
        assert_eq!(holding.target_pct, 10);
        assert_eq!(holding.average_cost, Decimal::ZERO);

        assert!(matches!(
            portfolio.add(ticker("wege3.sa"), 5),
            Err(PortfolioError::AlreadyExists(_))
        ));

        portfolio.remove(&ticker("WEGE3")).unwrap();
        assert!(portfolio.is_empty());
        assert!(matches!(
            portfolio.remove(&ticker("WEGE3")),
            Err(PortfolioError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_patch() {
        let mut portfolio = Portfolio::new();
        portfolio.add(ticker("ITUB4"), 10).unwrap();

        let patch = HoldingPatch {
            quantity: Some(25),
            average_cost: Some(dec!(31.40)),
            ..Default::default()
        };
        let holding = portfolio.update(&ticker("ITUB4"), &patch).unwrap();

        assert_eq!(holding.quantity, 25);
        assert_eq!(holding.target_pct, 10);
        assert_eq!(holding.average_cost, dec!(31.40));
    }

    #[test]
    fn test_update_rejects_invalid_values() {
        let mut portfolio = Portfolio::new();
        portfolio.add(ticker("ITUB4"), 10).unwrap();

        let bad_target = HoldingPatch {
            target_pct: Some(150),
            ..Default::default()
        };
        assert!(portfolio.update(&ticker("ITUB4"), &bad_target).is_err());

        let bad_cost = HoldingPatch {
            average_cost: Some(dec!(-1)),
            ..Default::default()
        };
        assert!(portfolio.update(&ticker("ITUB4"), &bad_cost).is_err());
        assert_eq!(portfolio.get(&ticker("ITUB4")).unwrap().target_pct, 10);
    }

    #[test]
    fn test_apply_model_adds_and_updates() {
        let mut portfolio = Portfolio::new();
        portfolio
            .insert(ticker("PETR4"), Holding::new(40, 25).with_average_cost(dec!(30)))
            .unwrap();
        portfolio.insert(ticker("WEGE3"), Holding::new(5, 15)).unwrap();

        let model = find_model("dividends").unwrap();
        let summary = portfolio.apply_model(model).unwrap();

        assert_eq!(summary.updated, vec![ticker("PETR4")]);
        assert_eq!(summary.added.len(), model.targets.len() - 1);

        let petr = portfolio.get(&ticker("PETR4")).unwrap();
        assert_eq!(petr.quantity, 40);
        assert_eq!(petr.target_pct, 10);
        assert_eq!(petr.average_cost, dec!(30));

        // Holdings outside the model are untouched
        assert_eq!(portfolio.get(&ticker("WEGE3")).unwrap().target_pct, 15);
    }

    #[test]
    fn test_serde_defaults_for_legacy_records() {
        let json = r#"{"PETR4": {"quantity": 10, "target_pct": 20}}"#;
        let portfolio: Portfolio = serde_json::from_str(json).unwrap();

        let holding = portfolio.get(&ticker("PETR4")).unwrap();
        assert_eq!(holding.average_cost, Decimal::ZERO);
        assert_eq!(holding.distributions, Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_normalizes_keys() {
        let json = r#"{"petr4.sa": {"quantity": 10, "target_pct": 20}, " wege3 ": {"quantity": 1, "target_pct": 5}}"#;
        let portfolio: Portfolio = serde_json::from_str(json).unwrap();

        assert_eq!(portfolio.tickers(), vec![ticker("PETR4"), ticker("WEGE3")]);
        assert_eq!(portfolio.get(&ticker("PETR4")).unwrap().quantity, 10);
    }

    #[test]
    fn test_deserialize_rejects_colliding_and_empty_keys() {
        let colliding = r#"{"petr4.sa": {"quantity": 1, "target_pct": 5}, "PETR4": {"quantity": 2, "target_pct": 5}}"#;
        let err = serde_json::from_str::<Portfolio>(colliding).unwrap_err();
        assert!(err.to_string().contains("duplicate ticker PETR4"));

        let empty = r#"{"": {"quantity": 1, "target_pct": 5}}"#;
        assert!(serde_json::from_str::<Portfolio>(empty).is_err());
    }

    #[test]
    fn test_deserialize_accepts_legacy_field_names() {
        let json = r#"{"ITSA4": {"qtde": 100, "meta_pct": 20, "pm": 9.5}}"#;
        let portfolio: Portfolio = serde_json::from_str(json).unwrap();

        let holding = portfolio.get(&ticker("ITSA4")).unwrap();
        assert_eq!(holding.quantity, 100);
        assert_eq!(holding.target_pct, 20);
        assert_eq!(holding.average_cost, dec!(9.5));

        // Saved files always use the current names
        let saved = serde_json::to_string(&portfolio).unwrap();
        assert!(saved.contains("\"quantity\":100"));
        assert!(!saved.contains("qtde"));
    }

    #[test]
    fn test_iteration_is_ticker_ordered() {
        let mut portfolio = Portfolio::new();
        portfolio.add(ticker("VALE3"), 10).unwrap();
        portfolio.add(ticker("BBAS3"), 10).unwrap();
        portfolio.add(ticker("ITSA4"), 10).unwrap();

        let order: Vec<&str> = portfolio.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(order, vec!["BBAS3", "ITSA4", "VALE3"]);
        assert_eq!(portfolio.total_target_pct(), 30);
    }
}

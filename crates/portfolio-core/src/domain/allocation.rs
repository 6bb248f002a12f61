//! 신규 투자금 배분 엔진.
//!
//! 현재 보유 수량과 목표 비중을 기준으로, 투자금을 어떤 종목에 몇 주씩
//! 사용할지 결정합니다. 정수 단위로 한 주씩 매수하는 탐욕 알고리즘입니다:
//!
//! 1. 시뮬레이션 총액 = 보유 평가액 + 매수 예정 평가액 + 남은 현금
//! 2. 종목별 시뮬레이션 비중 = (보유 + 매수 예정) × 가격 / 총액 × 100
//! 3. 괴리(gap) = 목표 비중 - 시뮬레이션 비중
//! 4. 살 수 있고(가격 ≤ 남은 현금) 괴리가 양수인 종목 중 괴리가 가장 큰 종목을 1주 매수
//! 5. 후보가 없거나 현금이 0이 될 때까지 반복
//!
//! 괴리가 같으면 입력 순서상 먼저 나온 종목을 선택합니다.
//! 지나간 매수는 다시 고려하지 않으므로 전역 최적을 보장하지는 않습니다.
//!
//! # 예제
//!
//! ```rust
//! use portfolio_core::{allocate, AllocationAsset, Ticker};
//! use rust_decimal_macros::dec;
//!
//! let assets = vec![AllocationAsset::new(Ticker::parse("IVVB11").unwrap(), 0, 100, dec!(10))];
//! let plan = allocate(&assets, dec!(35)).unwrap();
//!
//! assert_eq!(plan.units_for("IVVB11"), 3);
//! assert_eq!(plan.remaining_cash, dec!(5));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::AllocationError;
use crate::types::{times_units, Money, Percent, Price, Ticker, Units};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// 배분 엔진에 입력되는 시세 확정 자산.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationAsset {
    /// 종목 티커
    pub ticker: Ticker,
    /// 현재 보유 수량
    pub held_quantity: Units,
    /// 목표 비중 (0~100, 0이면 매수하지 않음)
    pub target_pct: u32,
    /// 현재 가격 (양수)
    pub price: Price,
}

impl AllocationAsset {
    /// 새 배분 자산을 생성합니다.
    pub fn new(ticker: Ticker, held_quantity: Units, target_pct: u32, price: Price) -> Self {
        Self {
            ticker,
            held_quantity,
            target_pct,
            price,
        }
    }
}

/// 배분 실행 옵션.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationOptions {
    /// 최대 매수 스텝 수 (None = 제한 없음)
    pub max_steps: Option<u64>,
}

impl AllocationOptions {
    /// 최대 매수 스텝 수를 설정합니다.
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

/// 배분 종료 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// 목표 비중 합계가 0
    NoTargets,
    /// 남은 현금이 정확히 0
    CashExhausted,
    /// 남은 현금으로 살 수 있는 종목 없음
    NothingAffordable,
    /// 살 수 있는 종목이 모두 목표 비중 이상
    TargetsReached,
    /// 호출자가 지정한 스텝 제한 도달
    StepLimit,
}

impl StopReason {
    /// 사람이 읽을 수 있는 설명을 반환합니다.
    pub fn describe(&self) -> &'static str {
        match self {
            StopReason::NoTargets => "no target weights set",
            StopReason::CashExhausted => "cash fully invested",
            StopReason::NothingAffordable => "remaining cash cannot buy any asset",
            StopReason::TargetsReached => "every affordable asset is at or above its target",
            StopReason::StepLimit => "step limit reached",
        }
    }
}

/// 한 번의 1주 매수 이벤트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyEvent {
    /// 1부터 시작하는 스텝 번호
    pub step: u64,
    /// 매수 종목
    pub ticker: Ticker,
    /// 매수 가격
    pub price: Price,
    /// 매수 직전의 괴리 (목표 - 시뮬레이션 비중)
    pub gap: Percent,
    /// 매수 후 남은 현금
    pub remaining_cash: Money,
}

/// 종목별 매수 계획.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    /// 종목 티커
    pub ticker: Ticker,
    /// 목표 비중
    pub target_pct: u32,
    /// 현재 가격
    pub price: Price,
    /// 매수 수량
    pub units: Units,
    /// 누적 매수 금액 (units × price)
    pub cost: Money,
}

/// 한 번의 배분 실행 결과.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    /// 입력 순서대로의 종목별 매수 계획 (매수 0 포함)
    pub lines: Vec<PurchaseLine>,
    /// 투자금
    pub cash: Money,
    /// 남은 현금
    pub remaining_cash: Money,
    /// 실행된 매수 스텝 수
    pub steps: u64,
    /// 종료 사유
    pub stop_reason: StopReason,
}

impl PurchasePlan {
    /// 실제 매수가 있는 종목만 반환합니다.
    pub fn purchases(&self) -> impl Iterator<Item = &PurchaseLine> {
        self.lines.iter().filter(|l| l.units > 0)
    }

    /// 매수할 종목이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.purchases().next().is_none()
    }

    /// 총 매수 금액 (투자금 - 남은 현금).
    pub fn total_spent(&self) -> Money {
        self.cash - self.remaining_cash
    }

    /// 종목의 매수 계획을 조회합니다.
    pub fn line(&self, ticker: &str) -> Option<&PurchaseLine> {
        self.lines.iter().find(|l| l.ticker.as_str() == ticker)
    }

    /// 종목의 매수 수량을 반환합니다 (없으면 0).
    pub fn units_for(&self, ticker: &str) -> Units {
        self.line(ticker).map(|l| l.units).unwrap_or(0)
    }

    /// 매수 금액 내림차순으로 정렬된 매수 목록을 반환합니다.
    pub fn purchases_by_cost(&self) -> Vec<&PurchaseLine> {
        let mut purchases: Vec<&PurchaseLine> = self.purchases().collect();
        // Stable sort keeps input order among equal costs
        purchases.sort_by(|a, b| b.cost.cmp(&a.cost));
        purchases
    }
}

/// 진행 중인 배분 실행.
///
/// 각 `next()` 호출이 1주 매수 이벤트를 하나 만들어내는 이터레이터입니다.
/// 호출자의 자산 데이터는 변경하지 않으며, 매수 누적 상태는 이 구조체가 소유합니다.
#[derive(Debug, Clone)]
pub struct AllocationRun<'a> {
    assets: &'a [AllocationAsset],
    bought: Vec<Units>,
    /// 자산별 보유 평가액 (held × price)
    held_values: Vec<Money>,
    /// 자산별 누적 매수 금액
    spent: Vec<Money>,
    /// 시뮬레이션 총액. 매수는 현금을 같은 금액의 자산으로 바꿀 뿐이므로 실행 내내 일정합니다.
    total: Money,
    cash: Money,
    remaining_cash: Money,
    steps: u64,
    max_steps: Option<u64>,
    stop_reason: Option<StopReason>,
}

impl<'a> AllocationRun<'a> {
    /// 입력을 검증하고 새 배분 실행을 시작합니다.
    pub fn new(
        assets: &'a [AllocationAsset],
        cash: Money,
        options: AllocationOptions,
    ) -> Result<Self, AllocationError> {
        validate(assets, cash)?;

        let mut held_values = Vec::with_capacity(assets.len());
        let mut total = cash;
        for asset in assets {
            let value = times_units(asset.price, asset.held_quantity)
                .ok_or_else(|| AllocationError::Overflow(asset.ticker.to_string()))?;
            total = total
                .checked_add(value)
                .ok_or_else(|| AllocationError::Overflow(asset.ticker.to_string()))?;
            held_values.push(value);
        }

        Ok(Self {
            assets,
            bought: vec![0; assets.len()],
            held_values,
            spent: vec![Decimal::ZERO; assets.len()],
            total,
            cash,
            remaining_cash: cash,
            steps: 0,
            max_steps: options.max_steps,
            stop_reason: None,
        })
    }

    /// 남은 현금을 반환합니다.
    pub fn remaining_cash(&self) -> Money {
        self.remaining_cash
    }

    /// 종료 사유를 반환합니다 (아직 진행 중이면 None).
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// 자산별 매수 예정 수량을 입력 순서대로 반환합니다.
    pub fn bought(&self) -> &[Units] {
        &self.bought
    }

    /// 남은 이벤트를 모두 소진하고 매수 계획을 만듭니다.
    pub fn into_plan(mut self) -> PurchasePlan {
        while self.next().is_some() {}

        let lines = self
            .assets
            .iter()
            .zip(self.bought.iter().zip(&self.spent))
            .map(|(asset, (&units, &cost))| PurchaseLine {
                ticker: asset.ticker.clone(),
                target_pct: asset.target_pct,
                price: asset.price,
                units,
                cost,
            })
            .collect();

        PurchasePlan {
            lines,
            cash: self.cash,
            remaining_cash: self.remaining_cash,
            steps: self.steps,
            stop_reason: self.stop_reason.unwrap_or(StopReason::CashExhausted),
        }
    }

    /// 다음 매수 대상을 결정하거나 종료 사유를 반환합니다.
    fn select(&self) -> Result<(usize, Percent), StopReason> {
        let total_target: u32 = self.assets.iter().map(|a| a.target_pct).sum();
        if total_target == 0 {
            return Err(StopReason::NoTargets);
        }
        // A zero total implies zero cash, so this also covers an empty portfolio
        if self.remaining_cash.is_zero() {
            return Err(StopReason::CashExhausted);
        }

        let mut any_affordable = false;
        let mut best: Option<(usize, Percent)> = None;

        for (idx, asset) in self.assets.iter().enumerate() {
            if asset.price > self.remaining_cash {
                continue;
            }
            any_affordable = true;

            // held + spent never exceeds the total, so neither step can overflow
            let value = self.held_values[idx] + self.spent[idx];
            let weight = value / self.total * HUNDRED;
            let gap = Decimal::from(asset.target_pct) - weight;

            if gap <= Decimal::ZERO {
                continue;
            }
            // Strictly greater: the first asset in input order wins ties
            match best {
                Some((_, best_gap)) if gap <= best_gap => {}
                _ => best = Some((idx, gap)),
            }
        }

        match best {
            Some(choice) => Ok(choice),
            None if any_affordable => Err(StopReason::TargetsReached),
            None => Err(StopReason::NothingAffordable),
        }
    }
}

impl Iterator for AllocationRun<'_> {
    type Item = BuyEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop_reason.is_some() {
            return None;
        }

        let (idx, gap) = match self.select() {
            Ok(choice) => choice,
            Err(reason) => {
                self.stop_reason = Some(reason);
                return None;
            }
        };

        if self.max_steps.is_some_and(|max| self.steps >= max) {
            self.stop_reason = Some(StopReason::StepLimit);
            return None;
        }

        let asset = &self.assets[idx];
        self.bought[idx] += 1;
        self.spent[idx] += asset.price;
        self.remaining_cash -= asset.price;
        self.steps += 1;

        Some(BuyEvent {
            step: self.steps,
            ticker: asset.ticker.clone(),
            price: asset.price,
            gap,
            remaining_cash: self.remaining_cash,
        })
    }
}

/// 엔진 사전 조건을 검증합니다.
fn validate(assets: &[AllocationAsset], cash: Money) -> Result<(), AllocationError> {
    if cash.is_sign_negative() && !cash.is_zero() {
        return Err(AllocationError::NegativeCash(cash));
    }

    let mut seen = HashSet::with_capacity(assets.len());
    for asset in assets {
        if asset.price <= Decimal::ZERO {
            return Err(AllocationError::NonPositivePrice {
                ticker: asset.ticker.to_string(),
                price: asset.price,
            });
        }
        if asset.target_pct > 100 {
            return Err(AllocationError::TargetOutOfRange {
                ticker: asset.ticker.to_string(),
                target_pct: asset.target_pct,
            });
        }
        if !seen.insert(&asset.ticker) {
            return Err(AllocationError::DuplicateTicker(asset.ticker.to_string()));
        }
    }

    Ok(())
}

/// 투자금을 배분합니다 (스텝 제한 없음).
pub fn allocate(assets: &[AllocationAsset], cash: Money) -> Result<PurchasePlan, AllocationError> {
    allocate_with(assets, cash, AllocationOptions::default())
}

/// 옵션을 지정하여 투자금을 배분합니다.
///
/// 매수 이벤트를 순서대로 접어(fold) 계획을 완성합니다.
pub fn allocate_with(
    assets: &[AllocationAsset],
    cash: Money,
    options: AllocationOptions,
) -> Result<PurchasePlan, AllocationError> {
    let mut run = AllocationRun::new(assets, cash, options)?;

    let events = run.by_ref().fold(0usize, |count, event| {
        debug!(
            step = event.step,
            ticker = %event.ticker,
            price = %event.price,
            gap = %event.gap,
            remaining = %event.remaining_cash,
            "Buy one unit"
        );
        count + 1
    });

    let plan = run.into_plan();

    info!(
        assets = assets.len(),
        cash = %cash,
        steps = events,
        spent = %plan.total_spent(),
        remaining = %plan.remaining_cash,
        stop = ?plan.stop_reason,
        "Allocation finished"
    );

    Ok(plan)
}

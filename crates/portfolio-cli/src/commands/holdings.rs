//! 보유 종목 관리 명령어 (list / add / remove / set).
//!
//! 모든 명령은 저장소에서 포트폴리오를 읽고, 수정한 뒤, 다시 저장합니다.

use anyhow::{Context, Result};

use portfolio_core::{Holding, HoldingPatch, Portfolio, Ticker};
use portfolio_data::PortfolioStore;

use super::render::format_holdings;

/// 사용자 입력 티커를 정규화합니다.
pub fn parse_ticker(raw: &str, suffix: &str) -> Result<Ticker> {
    Ticker::parse_with_suffix(raw, suffix).with_context(|| format!("잘못된 티커: '{}'", raw))
}

fn load<S: PortfolioStore>(store: &S) -> Result<Portfolio> {
    store.load().context("포트폴리오를 읽을 수 없습니다")
}

fn save<S: PortfolioStore>(store: &S, portfolio: &Portfolio) -> Result<()> {
    store.save(portfolio).context("포트폴리오를 저장할 수 없습니다")
}

/// 보유 종목 테이블을 출력합니다.
pub fn list_holdings<S: PortfolioStore>(store: &S) -> Result<()> {
    let portfolio = load(store)?;
    println!("{}", format_holdings(&portfolio));
    Ok(())
}

/// 새 종목을 추가합니다 (수량 0).
pub fn add_holding<S: PortfolioStore>(
    store: &S,
    raw_ticker: &str,
    target_pct: u32,
    suffix: &str,
) -> Result<Ticker> {
    let ticker = parse_ticker(raw_ticker, suffix)?;
    let mut portfolio = load(store)?;
    portfolio.add(ticker.clone(), target_pct)?;
    save(store, &portfolio)?;

    println!("{} 추가됨 (목표 비중 {}%)", ticker, target_pct);
    Ok(ticker)
}

/// 종목을 삭제합니다.
pub fn remove_holding<S: PortfolioStore>(
    store: &S,
    raw_ticker: &str,
    suffix: &str,
) -> Result<Holding> {
    let ticker = parse_ticker(raw_ticker, suffix)?;
    let mut portfolio = load(store)?;
    let removed = portfolio.remove(&ticker)?;
    save(store, &portfolio)?;

    println!("{} 삭제됨", ticker);
    Ok(removed)
}

/// 종목의 일부 필드를 수정합니다.
pub fn set_holding<S: PortfolioStore>(
    store: &S,
    raw_ticker: &str,
    patch: &HoldingPatch,
    suffix: &str,
) -> Result<Holding> {
    if patch.is_empty() {
        anyhow::bail!("변경할 값이 없습니다 (--quantity, --target, --avg-cost, --distributions)");
    }

    let ticker = parse_ticker(raw_ticker, suffix)?;
    let mut portfolio = load(store)?;
    let updated = portfolio.update(&ticker, patch)?.clone();
    save(store, &portfolio)?;

    println!(
        "{} 수정됨: 수량 {}, 목표 {}%, 평균 단가 {}, 누적 배당 {}",
        ticker, updated.quantity, updated.target_pct, updated.average_cost, updated.distributions
    );
    Ok(updated)
}

//! 모델 포트폴리오 명령어.

use anyhow::{Context, Result};

use portfolio_core::{find_model, ModelApplySummary, MODEL_PORTFOLIOS};
use portfolio_data::PortfolioStore;

use super::render::format_models;

/// 내장 모델 포트폴리오를 출력합니다.
pub fn print_models() {
    println!("{}", format_models());
}

/// 모델 포트폴리오의 목표 비중을 적용합니다.
pub fn apply_model<S: PortfolioStore>(store: &S, name: &str) -> Result<ModelApplySummary> {
    let model = find_model(name).with_context(|| {
        let names: Vec<&str> = MODEL_PORTFOLIOS.iter().map(|m| m.name).collect();
        format!("알 수 없는 모델: '{}' (사용 가능: {})", name, names.join(", "))
    })?;

    let mut portfolio = store.load().context("포트폴리오를 읽을 수 없습니다")?;
    let summary = portfolio.apply_model(model)?;
    store
        .save(&portfolio)
        .context("포트폴리오를 저장할 수 없습니다")?;

    println!(
        "모델 '{}' 적용: {}개 추가, {}개 목표 비중 갱신 (목표 비중 합계 {}%)",
        model.name,
        summary.added.len(),
        summary.updated.len(),
        portfolio.total_target_pct()
    );
    Ok(summary)
}

//! 시세 조회, 수익률 평가, 신규 투자금 배분 명령어.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::info;

use portfolio_core::{analyze, AllocationOptions, AnalysisReport, AppConfig, Money, Portfolio};
use portfolio_data::{
    resolve_prices_with, write_purchase_csv, PortfolioStore, PriceSource, ResolveOptions,
    StaticPriceSource, YahooPriceSource,
};

use super::render::format_report;

/// 분석 실행 설정.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// 투자금
    pub cash: Money,
    /// 오프라인 가격표 (없으면 Yahoo Finance 조회)
    pub prices_file: Option<PathBuf>,
    /// 매수 목록 CSV 경로
    pub csv_path: Option<PathBuf>,
    /// 테이블 대신 JSON 보고서 출력
    pub json: bool,
    /// 최대 매수 스텝 수
    pub max_steps: Option<u64>,
}

/// 한 번의 분석에 필요한 실행 옵션.
#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub cash: Money,
    pub resolve: ResolveOptions,
    pub allocation: AllocationOptions,
    pub show_progress: bool,
}

/// 설정과 명령행 옵션으로 시세 소스를 만듭니다.
pub fn build_price_source(
    app: &AppConfig,
    prices_file: Option<&PathBuf>,
) -> Result<Box<dyn PriceSource>> {
    match prices_file {
        Some(path) => {
            let source = StaticPriceSource::from_json_file(path)
                .with_context(|| format!("가격표를 읽을 수 없습니다: {}", path.display()))?;
            info!(path = %path.display(), prices = source.len(), "Using static price list");
            Ok(Box::new(source))
        }
        None => Ok(Box::new(YahooPriceSource::new(&app.prices)?)),
    }
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// 포트폴리오 한 번을 분석합니다.
pub async fn analyze_once<S>(
    portfolio: &Portfolio,
    source: &S,
    settings: RunSettings,
) -> Result<AnalysisReport>
where
    S: PriceSource + ?Sized,
{
    let tickers = portfolio.tickers();
    let pb = progress_bar(tickers.len(), settings.show_progress)?;

    let prices = resolve_prices_with(source, &tickers, settings.resolve, |ticker, price| {
        pb.set_message(match price {
            Some(_) => ticker.to_string(),
            None => format!("{} (시세 없음)", ticker),
        });
        pb.inc(1);
    })
    .await;
    pb.finish_and_clear();

    let report = analyze(portfolio, &prices, settings.cash, settings.allocation)?;
    Ok(report)
}

/// `analyze` 명령어를 실행합니다.
pub async fn run_analyze<S: PortfolioStore>(
    app: &AppConfig,
    store: &S,
    config: AnalyzeConfig,
) -> Result<AnalysisReport> {
    let portfolio = store.load().context("포트폴리오를 읽을 수 없습니다")?;
    if portfolio.is_empty() {
        anyhow::bail!("포트폴리오가 비어 있습니다. `portfolio add <TICKER>`로 종목을 추가하세요");
    }

    let source = build_price_source(app, config.prices_file.as_ref())?;
    let settings = RunSettings {
        cash: config.cash,
        resolve: ResolveOptions::from_config(&app.prices),
        allocation: AllocationOptions {
            max_steps: config.max_steps.or(app.allocation.max_steps),
        },
        show_progress: !config.json,
    };

    let report = analyze_once(&portfolio, source.as_ref(), settings).await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }

    if let Some(path) = &config.csv_path {
        let rows = write_purchase_csv(path, &report)
            .with_context(|| format!("CSV를 저장할 수 없습니다: {}", path.display()))?;
        if !config.json {
            println!("\n매수 목록 저장: {} ({}개 종목)", path.display(), rows);
        }
    }

    Ok(report)
}

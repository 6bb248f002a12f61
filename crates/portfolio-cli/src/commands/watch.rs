//! 주기적 재분석 명령어.
//!
//! 타이머마다 포트폴리오를 다시 읽고 분석합니다. 시세는 TTL 캐시를 거치므로
//! 재조회 시점은 `prices.cache_ttl_secs` 설정으로 결정됩니다.
//! Ctrl-C 또는 지정한 횟수만큼 실행하면 종료합니다.

use anyhow::Result;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use portfolio_core::{AllocationOptions, AppConfig, Money};
use portfolio_data::{CachedPriceSource, PortfolioStore, PriceSource, ResolveOptions};

use super::analyze::{analyze_once, RunSettings};
use super::render::format_report;

/// 감시 실행 설정.
#[derive(Debug, Clone, Copy)]
pub struct WatchConfig {
    pub cash: Money,
    pub interval: Duration,
    /// 실행 횟수 제한 (None = Ctrl-C까지)
    pub rounds: Option<u64>,
}

/// 감시 종료 시점의 실행 집계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// 타이머가 돈 횟수 (`rounds` 제한은 이 값 기준)
    pub rounds: u64,
    /// 리포트를 출력한 횟수
    pub analyses: u64,
}

/// `watch` 명령어를 실행하고 실행 집계를 반환합니다.
pub async fn run_watch<St, Src>(
    app: &AppConfig,
    store: &St,
    source: Src,
    config: WatchConfig,
) -> Result<WatchSummary>
where
    St: PortfolioStore,
    Src: PriceSource,
{
    let source = CachedPriceSource::new(source, Duration::from_secs(app.prices.cache_ttl_secs));
    let settings = RunSettings {
        cash: config.cash,
        resolve: ResolveOptions::from_config(&app.prices),
        allocation: AllocationOptions {
            max_steps: app.allocation.max_steps,
        },
        show_progress: false,
    };

    let mut timer = tokio::time::interval(config.interval.max(Duration::from_secs(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        interval_secs = config.interval.as_secs(),
        cache_ttl_secs = app.prices.cache_ttl_secs,
        "Watching portfolio"
    );

    let mut summary = WatchSummary::default();
    loop {
        if config.rounds.is_some_and(|limit| summary.rounds >= limit) {
            break;
        }

        tokio::select! {
            _ = timer.tick() => {
                summary.rounds += 1;

                // Reload every round so edits made from another shell are picked up
                let portfolio = match store.load() {
                    Ok(p) if !p.is_empty() => p,
                    Ok(_) => {
                        warn!(round = summary.rounds, "Portfolio is empty, skipping round");
                        continue;
                    }
                    Err(e) => {
                        warn!(round = summary.rounds, error = %e, "Failed to load portfolio, skipping round");
                        continue;
                    }
                };

                match analyze_once(&portfolio, &source, settings).await {
                    Ok(report) => {
                        println!("\n=== {} ===", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
                        println!("{}", format_report(&report));
                        summary.analyses += 1;
                    }
                    Err(e) => warn!(round = summary.rounds, error = %e, "Analysis failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    info!(rounds = summary.rounds, analyses = summary.analyses, "Watch finished");
    Ok(summary)
}

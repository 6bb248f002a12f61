//! 포트폴리오 리밸런싱 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 종목 추가 및 보유 수량 입력
//! portfolio add ITSA4 --target 20
//! portfolio set ITSA4 --quantity 150 --avg-cost 9.85
//!
//! # 모델 포트폴리오 적용
//! portfolio apply-model dividends
//!
//! # 1,500으로 살 종목 계산 후 CSV 저장
//! portfolio analyze --cash 1500 --csv
//!
//! # 5분마다 재분석
//! portfolio watch --cash 1500 --interval-secs 300
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

mod commands;

use commands::analyze::{build_price_source, run_analyze, AnalyzeConfig};
use commands::holdings::{add_holding, list_holdings, remove_holding, set_holding};
use commands::models::{apply_model, print_models};
use commands::watch::{run_watch, WatchConfig};
use portfolio_core::{init_logging, AppConfig, HoldingPatch, LogConfig, DEFAULT_TARGET_PCT};
use portfolio_data::JsonFileStore;

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio CLI - 목표 비중 기반 신규 투자금 배분", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    /// 포트폴리오 파일 경로 (설정의 store.path 대신 사용)
    #[arg(long, global = true)]
    portfolio: Option<PathBuf>,

    /// 디버그 로그 출력
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 보유 종목 목록
    List,

    /// 종목 추가 (수량 0)
    Add {
        /// 종목 티커 (예: ITSA4, itsa4.sa)
        ticker: String,

        /// 목표 비중 (0~100)
        #[arg(short, long, default_value_t = DEFAULT_TARGET_PCT)]
        target: u32,
    },

    /// 종목 삭제
    Remove {
        /// 종목 티커
        ticker: String,
    },

    /// 보유 수량, 목표 비중, 평균 단가, 누적 배당 수정
    Set {
        /// 종목 티커
        ticker: String,

        /// 보유 수량
        #[arg(short, long)]
        quantity: Option<u64>,

        /// 목표 비중 (0~100)
        #[arg(short, long)]
        target: Option<u32>,

        /// 평균 단가
        #[arg(long)]
        avg_cost: Option<Decimal>,

        /// 누적 수령 배당
        #[arg(long)]
        distributions: Option<Decimal>,
    },

    /// 내장 모델 포트폴리오 목록
    Models,

    /// 모델 포트폴리오의 목표 비중 적용
    ApplyModel {
        /// 모델 이름 (dividends, reits)
        name: String,
    },

    /// 시세 조회 후 수익률과 매수 목록 계산
    Analyze {
        /// 투자금 (기본: allocation.default_contribution)
        #[arg(long)]
        cash: Option<Decimal>,

        /// 오프라인 가격표 JSON 파일 ({"PETR4": 38.12, ...})
        #[arg(long)]
        prices: Option<PathBuf>,

        /// 매수 목록 CSV 저장 (경로 생략 시 export.csv_path)
        #[arg(long, num_args = 0..=1)]
        csv: Option<Option<PathBuf>>,

        /// JSON 보고서 출력
        #[arg(long, default_value = "false")]
        json: bool,

        /// 최대 매수 스텝 수
        #[arg(long)]
        max_steps: Option<u64>,
    },

    /// 주기적으로 재분석 (Ctrl-C로 종료)
    Watch {
        /// 투자금 (기본: allocation.default_contribution)
        #[arg(long)]
        cash: Option<Decimal>,

        /// 재분석 주기 (초)
        #[arg(long, default_value = "60")]
        interval_secs: u64,

        /// 실행 횟수 (생략 시 Ctrl-C까지)
        #[arg(long)]
        rounds: Option<u64>,

        /// 오프라인 가격표 JSON 파일
        #[arg(long)]
        prices: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let app = AppConfig::load(&cli.config)
        .with_context(|| format!("설정을 읽을 수 없습니다: {}", cli.config.display()))?;

    let mut log_config = LogConfig::from_app(&app.logging);
    if cli.verbose {
        log_config.level = "debug".to_string();
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let store_path = cli
        .portfolio
        .clone()
        .unwrap_or_else(|| PathBuf::from(&app.store.path));
    debug!(path = %store_path.display(), "Using portfolio file");
    let store = JsonFileStore::new(store_path);
    let suffix = app.prices.ticker_suffix.as_str();

    match cli.command {
        Commands::List => list_holdings(&store)?,

        Commands::Add { ticker, target } => {
            add_holding(&store, &ticker, target, suffix)?;
        }

        Commands::Remove { ticker } => {
            remove_holding(&store, &ticker, suffix)?;
        }

        Commands::Set {
            ticker,
            quantity,
            target,
            avg_cost,
            distributions,
        } => {
            let patch = HoldingPatch {
                quantity,
                target_pct: target,
                average_cost: avg_cost,
                distributions,
            };
            set_holding(&store, &ticker, &patch, suffix)?;
        }

        Commands::Models => print_models(),

        Commands::ApplyModel { name } => {
            apply_model(&store, &name)?;
        }

        Commands::Analyze {
            cash,
            prices,
            csv,
            json,
            max_steps,
        } => {
            let csv_path = csv.map(|path| path.unwrap_or_else(|| PathBuf::from(&app.export.csv_path)));
            let config = AnalyzeConfig {
                cash: cash.unwrap_or(app.allocation.default_contribution),
                prices_file: prices,
                csv_path,
                json,
                max_steps,
            };
            run_analyze(&app, &store, config).await?;
        }

        Commands::Watch {
            cash,
            interval_secs,
            rounds,
            prices,
        } => {
            let source = build_price_source(&app, prices.as_ref())?;
            let config = WatchConfig {
                cash: cash.unwrap_or(app.allocation.default_contribution),
                interval: Duration::from_secs(interval_secs),
                rounds,
            };
            let summary = run_watch(&app, &store, source, config).await?;
            println!(
                "\n{}회 실행 중 {}회 분석 후 종료",
                summary.rounds, summary.analyses
            );
        }
    }

    Ok(())
}

//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정 파일은 선택 사항이며, 없으면 기본값과 환경 변수만 사용합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 환경 변수 접두사 (예: `PORTFOLIO__PRICES__TIMEOUT_SECS=5`).
pub const ENV_PREFIX: &str = "PORTFOLIO";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 포트폴리오 저장소 설정
    pub store: StoreConfig,
    /// 시세 조회 설정
    pub prices: PriceConfig,
    /// 배분 엔진 설정
    pub allocation: AllocationConfig,
    /// 내보내기 설정
    pub export: ExportConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 포트폴리오 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON 파일 경로
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "portfolio.json".to_string(),
        }
    }
}

/// 시세 조회 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PriceConfig {
    /// 차트 API 기본 URL
    pub base_url: String,
    /// 조회 시 티커에 붙일 거래소 접미사 (B3 = ".SA")
    pub ticker_suffix: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// User-Agent 헤더
    pub user_agent: String,
    /// 동시 요청 수
    pub concurrency: usize,
    /// 재시도 가능한 오류의 재시도 횟수
    pub retries: u32,
    /// 시세 캐시 TTL (초)
    pub cache_ttl_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            ticker_suffix: ".SA".to_string(),
            timeout_secs: 3,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            concurrency: 4,
            retries: 1,
            cache_ttl_secs: 60,
        }
    }
}

/// 배분 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// 기본 투자금
    pub default_contribution: Decimal,
    /// 최대 매수 스텝 수 (None = 제한 없음)
    pub max_steps: Option<u64>,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            default_contribution: Decimal::new(1000, 0),
            max_steps: None,
        }
    }
}

/// 내보내기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 매수 목록 CSV 기본 경로
    pub csv_path: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_path: "purchase_list.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값에 환경 변수만 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.prices.ticker_suffix, ".SA");
        assert_eq!(config.prices.timeout_secs, 3);
        assert_eq!(config.allocation.default_contribution, Decimal::new(1000, 0));
        assert!(config.allocation.max_steps.is_none());
        assert_eq!(config.store.path, "portfolio.json");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.export.csv_path, "purchase_list.csv");
    }
}

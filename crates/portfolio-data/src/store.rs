//! 포트폴리오 저장소.
//!
//! 포트폴리오는 티커를 키로 하는 JSON 객체로 저장됩니다:
//!
//! ```json
//! {
//!   "ITSA4": { "quantity": 100, "target_pct": 10, "average_cost": "9.85", "distributions": "42.10" }
//! }
//! ```
//!
//! `average_cost`, `distributions`가 없는 이전 형식도 읽을 수 있습니다.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use portfolio_core::Portfolio;

use crate::error::Result;

/// 포트폴리오 영속화 인터페이스.
pub trait PortfolioStore {
    /// 저장된 포트폴리오를 읽습니다. 저장된 것이 없으면 빈 포트폴리오를 반환합니다.
    fn load(&self) -> Result<Portfolio>;

    /// 포트폴리오 전체를 저장합니다.
    fn save(&self, portfolio: &Portfolio) -> Result<()>;
}

/// JSON 파일 저장소.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PortfolioStore for JsonFileStore {
    fn load(&self) -> Result<Portfolio> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Portfolio file not found, starting empty");
            return Ok(Portfolio::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Portfolio::new());
        }

        let portfolio: Portfolio = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), holdings = portfolio.len(), "Portfolio loaded");
        Ok(portfolio)
    }

    fn save(&self, portfolio: &Portfolio) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling file first so a crash never leaves a truncated portfolio
        let temp = self.temp_path();
        let json = serde_json::to_string_pretty(portfolio)?;
        fs::write(&temp, json)?;
        fs::rename(&temp, &self.path)?;

        info!(path = %self.path.display(), holdings = portfolio.len(), "Portfolio saved");
        Ok(())
    }
}

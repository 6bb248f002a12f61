//! 종목 티커 정의.
//!
//! 사용자가 입력한 티커는 공백 제거, 대문자 변환, 거래소 접미사 제거를 거쳐
//! 정규화된 형태로 저장됩니다 (예: " petr4.sa " → "PETR4").

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PortfolioError, PortfolioResult};

/// B3 종목의 기본 거래소 접미사.
pub const DEFAULT_TICKER_SUFFIX: &str = ".SA";

/// 정규화된 종목 티커.
///
/// 역직렬화도 [`Ticker::parse`]를 거치므로 저장 파일의 키에 같은 규칙이 적용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// 기본 접미사(".SA")를 제거하며 티커를 정규화합니다.
    pub fn parse(raw: &str) -> PortfolioResult<Self> {
        Self::parse_with_suffix(raw, DEFAULT_TICKER_SUFFIX)
    }

    /// 지정한 거래소 접미사를 제거하며 티커를 정규화합니다.
    pub fn parse_with_suffix(raw: &str, suffix: &str) -> PortfolioResult<Self> {
        let upper = raw.trim().to_uppercase();
        let suffix = suffix.to_uppercase();
        let base = if suffix.is_empty() {
            upper.as_str()
        } else {
            upper.strip_suffix(suffix.as_str()).unwrap_or(upper.as_str())
        };
        let base = base.trim();

        if base.is_empty() {
            return Err(PortfolioError::InvalidInput(format!(
                "빈 티커: '{}'",
                raw
            )));
        }
        if base.chars().any(char::is_whitespace) {
            return Err(PortfolioError::InvalidInput(format!(
                "티커에 공백이 포함됨: '{}'",
                raw
            )));
        }

        Ok(Self(base.to_string()))
    }

    /// 시세 조회용 심볼을 반환합니다 (접미사가 없으면 붙입니다).
    pub fn quote_symbol(&self, suffix: &str) -> String {
        if suffix.is_empty() || self.0.ends_with(&suffix.to_uppercase()) {
            self.0.clone()
        } else {
            format!("{}{}", self.0, suffix)
        }
    }

    /// 티커 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = PortfolioError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl std::str::FromStr for Ticker {
    type Err = PortfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

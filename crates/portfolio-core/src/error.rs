//! 포트폴리오 시스템의 에러 타입.
//!
//! 이 모듈은 포트폴리오 관리 및 배분 계산에서 사용되는 에러 타입을 정의합니다.

use rust_decimal::Decimal;
use thiserror::Error;

/// 핵심 포트폴리오 에러.
#[derive(Debug, Error)]
pub enum PortfolioError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 배분 엔진 입력 에러
    #[error("배분 에러: {0}")]
    Allocation(#[from] AllocationError),

    /// 시세 조회 불가
    #[error("시세 조회 불가: {0}")]
    PriceUnavailable(String),

    /// 이미 존재하는 종목
    #[error("이미 존재하는 종목: {0}")]
    AlreadyExists(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 계산 범위 초과
    #[error("계산 범위 초과: {0}")]
    Overflow(String),
}

/// 포트폴리오 작업을 위한 Result 타입.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

impl PortfolioError {
    /// 사용자 입력 수정으로 해결 가능한 에러인지 확인합니다.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            PortfolioError::AlreadyExists(_)
                | PortfolioError::NotFound(_)
                | PortfolioError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for PortfolioError {
    fn from(err: serde_json::Error) -> Self {
        PortfolioError::Serialization(err.to_string())
    }
}

/// 배분 엔진의 사전 조건 위반.
///
/// 호출자는 시세가 없는 자산을 미리 걸러내야 하며,
/// 이 에러는 정상적인 실행 상태가 아니라 잘못된 호출을 의미합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// 음수 투자금
    #[error("cash to invest must not be negative: {0}")]
    NegativeCash(Decimal),

    /// 0 이하의 가격
    #[error("price for {ticker} must be positive: {price}")]
    NonPositivePrice { ticker: String, price: Decimal },

    /// 목표 비중이 0~100 범위를 벗어남
    #[error("target weight for {ticker} out of range [0, 100]: {target_pct}")]
    TargetOutOfRange { ticker: String, target_pct: u32 },

    /// 중복 종목
    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    /// 보유 평가액 합계가 Decimal 범위를 넘음
    #[error("portfolio value overflows the decimal range at {0}")]
    Overflow(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_user_error_classification() {
        assert!(PortfolioError::NotFound("PETR4".to_string()).is_user_error());
        assert!(PortfolioError::InvalidInput("empty".to_string()).is_user_error());
        assert!(!PortfolioError::Config("bad".to_string()).is_user_error());
    }

    #[test]
    fn test_allocation_error_converts() {
        let err: PortfolioError = AllocationError::NegativeCash(dec!(-1)).into();
        assert!(matches!(
            err,
            PortfolioError::Allocation(AllocationError::NegativeCash(_))
        ));
    }
}

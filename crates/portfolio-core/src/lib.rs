//! # Portfolio Core
//!
//! 포트폴리오 대시보드의 핵심 도메인 모델 및 계산 로직을 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 보유 자산 및 목표 비중 타입
//! - 신규 투자금 배분 엔진 (정수 단위 탐욕 알고리즘)
//! - 수익률/배당 평가
//! - 추천 모델 포트폴리오
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;

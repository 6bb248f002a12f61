//! 시세 조회 및 포트폴리오 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - Yahoo Finance 차트 API 기반 현재가 조회
//! - TTL 기반 시세 캐시
//! - JSON 파일 포트폴리오 저장소
//! - 매수 목록 CSV 내보내기

pub mod error;
pub mod export;
pub mod price;
pub mod store;

pub use error::{DataError, Result};
pub use export::{write_purchase_csv, write_purchase_csv_to, write_report_json, PURCHASE_CSV_HEADER};
pub use price::{
    resolve_prices, resolve_prices_with, CachedPriceSource, PriceSource, ResolveOptions,
    StaticPriceSource, YahooPriceSource,
};
pub use store::{JsonFileStore, PortfolioStore};

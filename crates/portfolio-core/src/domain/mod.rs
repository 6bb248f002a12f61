//! 포트폴리오 운영을 위한 도메인 모델.

mod allocation;
mod analysis;
mod model;
mod portfolio;
mod price_book;
mod valuation;

pub use allocation::*;
pub use analysis::*;
pub use model::*;
pub use portfolio::*;
pub use price_book::*;
pub use valuation::*;

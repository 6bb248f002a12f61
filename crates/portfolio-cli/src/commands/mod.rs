//! CLI 명령어 구현 모듈.

pub mod analyze;
pub mod holdings;
pub mod models;
pub mod render;
pub mod watch;

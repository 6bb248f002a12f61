//! 현재가 조회.
//!
//! - [`PriceSource`]: 종목 하나의 현재가를 조회하는 공통 인터페이스
//! - [`YahooPriceSource`]: Yahoo Finance 차트 API
//! - [`StaticPriceSource`]: 고정 가격표 (오프라인 실행, 테스트)
//! - [`CachedPriceSource`]: TTL 기반 캐시 래퍼
//!
//! [`resolve_prices`]는 여러 종목을 제한된 동시성으로 조회해 [`PriceBook`]을 만듭니다.
//! 개별 종목의 조회 실패는 전체 실행을 중단시키지 않고 "시세 없음"으로 기록됩니다.

mod cache;
mod fixed;
mod yahoo;

pub use cache::CachedPriceSource;
pub use fixed::StaticPriceSource;
pub use yahoo::YahooPriceSource;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, warn, Instrument};

use portfolio_core::{portfolio_span, Price, PriceBook, Ticker};

use crate::error::Result;

/// 재시도 간 기본 대기 시간
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// 현재가 조회 인터페이스.
///
/// `Ok(None)`은 "시세 없음"(알 수 없는 종목, 가격 0 등)을 의미하고,
/// `Err`는 네트워크/파싱 등 조회 자체의 실패를 의미합니다.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 조회 소스 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 현재가를 조회합니다.
    async fn latest_price(&self, ticker: &Ticker) -> Result<Option<Price>>;
}

#[async_trait]
impl<T: PriceSource + ?Sized> PriceSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<Option<Price>> {
        (**self).latest_price(ticker).await
    }
}

/// 시세 일괄 조회 옵션.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// 동시 요청 수 (최소 1)
    pub concurrency: usize,
    /// 재시도 가능한 오류의 재시도 횟수
    pub retries: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retries: 1,
        }
    }
}

impl ResolveOptions {
    /// 설정값으로 옵션을 생성합니다.
    pub fn from_config(config: &portfolio_core::PriceConfig) -> Self {
        Self {
            concurrency: config.concurrency,
            retries: config.retries,
        }
    }
}

/// 종목 목록의 현재가를 조회해 시세 스냅샷을 만듭니다.
pub async fn resolve_prices<S>(source: &S, tickers: &[Ticker], options: ResolveOptions) -> PriceBook
where
    S: PriceSource + ?Sized,
{
    resolve_prices_with(source, tickers, options, |_, _| {}).await
}

/// 종목별 조회가 끝날 때마다 `on_resolved`를 호출하며 시세를 조회합니다.
///
/// 콜백은 입력 순서대로 호출됩니다.
pub async fn resolve_prices_with<S, F>(
    source: &S,
    tickers: &[Ticker],
    options: ResolveOptions,
    mut on_resolved: F,
) -> PriceBook
where
    S: PriceSource + ?Sized,
    F: FnMut(&Ticker, Option<Price>),
{
    let concurrency = options.concurrency.max(1);

    let mut results = stream::iter(tickers.iter())
        .map(|ticker| {
            let span = portfolio_span!("fetch_price", ticker);
            async move {
                let price = fetch_with_retry(source, ticker, options.retries).await;
                (ticker, price)
            }
            .instrument(span)
        })
        .buffered(concurrency);

    let mut book = PriceBook::new();
    while let Some((ticker, price)) = results.next().await {
        on_resolved(ticker, price);
        book.record(ticker.clone(), price);
    }

    debug!(
        source = source.name(),
        requested = tickers.len(),
        available = book.available_count(),
        "Prices resolved"
    );
    book
}

async fn fetch_with_retry<S>(source: &S, ticker: &Ticker, retries: u32) -> Option<Price>
where
    S: PriceSource + ?Sized,
{
    let mut attempt = 0;
    loop {
        match source.latest_price(ticker).await {
            Ok(price) => return price,
            Err(e) if e.is_retryable() && attempt < retries => {
                attempt += 1;
                debug!(attempt, error = %e, "Retrying price fetch");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "Price fetch failed");
                return None;
            }
        }
    }
}

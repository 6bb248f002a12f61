//! TTL 기반 시세 캐시.
//!
//! 반복 실행(`watch`)에서 같은 종목을 TTL 안에 다시 조회하지 않도록
//! 하위 소스를 감쌉니다. 시세 없음(`None`)과 오류는 캐시하지 않습니다.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use portfolio_core::{Price, Ticker};

use super::PriceSource;
use crate::error::Result;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    price: Price,
    fetched_at: Instant,
}

/// 캐시된 시세 소스.
pub struct CachedPriceSource<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<Ticker, CacheEntry>>,
}

impl<S: PriceSource> CachedPriceSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 하위 소스 참조.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// 모든 캐시 항목을 비웁니다.
    pub async fn invalidate(&self) {
        self.entries.write().await.clear();
    }

    /// 한 종목의 캐시 항목을 비웁니다.
    pub async fn invalidate_ticker(&self, ticker: &Ticker) {
        self.entries.write().await.remove(ticker);
    }

    /// 캐시된 종목 수 (만료 항목 포함).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn cached(&self, ticker: &Ticker) -> Option<Price> {
        let entries = self.entries.read().await;
        entries
            .get(ticker)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.price)
    }
}

#[async_trait]
impl<S: PriceSource> PriceSource for CachedPriceSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn latest_price(&self, ticker: &Ticker) -> Result<Option<Price>> {
        if let Some(price) = self.cached(ticker).await {
            debug!(ticker = %ticker, "Price cache hit");
            return Ok(Some(price));
        }

        let price = self.inner.latest_price(ticker).await?;
        let mut entries = self.entries.write().await;
        match price {
            Some(price) => {
                entries.insert(
                    ticker.clone(),
                    CacheEntry {
                        price,
                        fetched_at: Instant::now(),
                    },
                );
            }
            None => {
                entries.remove(ticker);
            }
        }
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// 호출 횟수를 세는 소스
    struct CountingSource {
        calls: AtomicU32,
        price: Option<Price>,
    }

    impl CountingSource {
        fn new(price: Option<Price>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                price,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn latest_price(&self, _ticker: &Ticker) -> Result<Option<Price>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.price)
        }
    }

    fn ticker() -> Ticker {
        Ticker::parse("TAEE11").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl_and_refetch_after() {
        let cache = CachedPriceSource::new(
            CountingSource::new(Some(dec!(35.2))),
            Duration::from_secs(60),
        );

        assert_eq!(cache.latest_price(&ticker()).await.unwrap(), Some(dec!(35.2)));
        assert_eq!(cache.latest_price(&ticker()).await.unwrap(), Some(dec!(35.2)));
        assert_eq!(cache.inner().calls(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.latest_price(&ticker()).await.unwrap();
        assert_eq!(cache.inner().calls(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_is_not_cached() {
        let cache = CachedPriceSource::new(CountingSource::new(None), Duration::from_secs(60));

        assert_eq!(cache.latest_price(&ticker()).await.unwrap(), None);
        assert_eq!(cache.latest_price(&ticker()).await.unwrap(), None);
        assert_eq!(cache.inner().calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = CachedPriceSource::new(
            CountingSource::new(Some(dec!(9.8))),
            Duration::from_secs(60),
        );

        cache.latest_price(&ticker()).await.unwrap();
        cache.invalidate().await;
        assert!(cache.is_empty().await);
        cache.latest_price(&ticker()).await.unwrap();
        assert_eq!(cache.inner().calls(), 2);
    }
}

//! 요청 속도 제한기.
//!
//! 가장 최근에 허용된 요청 시각을 기준으로 `period / rate_limit` 간격을 강제합니다.
//! 다음 슬롯은 잠금 안에서 예약하고 대기는 잠금 밖에서 수행하므로,
//! 동시에 호출해도 두 요청이 같은 슬롯을 받지 않습니다.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use twse_core::RateLimitConfig;

#[derive(Debug)]
struct LimiterState {
    rate_limit: u32,
    period: Duration,
    enabled: bool,
    last_granted: Option<Instant>,
}

impl LimiterState {
    fn interval(&self) -> Duration {
        self.period / self.rate_limit
    }
}

/// 고정 간격 요청 제한기.
///
/// `Arc<RateLimiter>`로 여러 클라이언트가 하나의 예산을 공유합니다.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<LimiterState>,
}

impl RateLimiter {
    /// `period` 동안 최대 `rate_limit`개의 요청을 허용하는 제한기를 생성합니다.
    ///
    /// `rate_limit`이 0이면 1로 보정합니다.
    pub fn new(rate_limit: u32, period: Duration) -> Self {
        Self {
            state: Mutex::new(LimiterState {
                rate_limit: rate_limit.max(1),
                period,
                enabled: true,
                last_granted: None,
            }),
        }
    }

    /// 비활성 상태의 제한기.
    pub fn disabled() -> Self {
        let limiter = Self::new(1, Duration::ZERO);
        limiter.disable();
        limiter
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let limiter = Self::new(config.rate_limit, config.period());
        if !config.enabled {
            limiter.disable();
        }
        limiter
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LimiterState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 요청 허용 시점까지 대기합니다. 비활성 상태면 즉시 반환합니다.
    pub async fn acquire(&self) {
        let slot = {
            let mut state = self.lock();
            if !state.enabled {
                return;
            }

            let now = Instant::now();
            let slot = match state.last_granted {
                Some(last) => (last + state.interval()).max(now),
                None => now,
            };
            state.last_granted = Some(slot);
            slot
        };

        if slot > Instant::now() {
            tracing::trace!(
                wait_ms = (slot - Instant::now()).as_millis() as u64,
                "Rate limit reached, waiting"
            );
            tokio::time::sleep_until(slot).await;
        }
    }

    /// 기간당 최대 요청 수를 변경합니다. 다음 `acquire()`부터 적용됩니다.
    pub fn set_rate_limit(&self, rate_limit: u32) {
        self.lock().rate_limit = rate_limit.max(1);
    }

    pub fn set_period(&self, period: Duration) {
        self.lock().period = period;
    }

    pub fn enable(&self) {
        self.lock().enabled = true;
    }

    pub fn disable(&self) {
        self.lock().enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn rate_limit(&self) -> u32 {
        self.lock().rate_limit
    }

    pub fn period(&self) -> Duration {
        self.lock().period
    }

    /// 연속된 요청 사이의 최소 간격.
    pub fn interval(&self) -> Duration {
        self.lock().interval()
    }
}

impl Default for RateLimiter {
    /// 5초에 5회.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_acquire_spaces_requests() {
        let limiter = RateLimiter::new(2, Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        // 5회 호출 → 4개 간격 × 500ms
        assert!(start.elapsed() >= Duration::from_millis(2000));
        assert!(start.elapsed() < Duration::from_millis(2100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_limiter_does_not_wait() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        limiter.disable();
        let start = Instant::now();

        for _ in 0..10 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!limiter.is_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_setters_apply_to_next_acquire() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        limiter.acquire().await;

        limiter.set_period(Duration::from_secs(1));
        limiter.set_rate_limit(4);
        assert_eq!(limiter.interval(), Duration::from_millis(250));

        let start = Instant::now();
        limiter.acquire().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(250));
        assert!(waited < Duration::from_millis(260));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquire_reserves_distinct_slots() {
        let limiter = Arc::new(RateLimiter::new(1, Duration::from_millis(100)));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                tokio::spawn(async move {
                    limiter.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut granted = Vec::new();
        for handle in handles {
            granted.push(handle.await.unwrap() - start);
        }
        granted.sort();

        for (i, elapsed) in granted.iter().enumerate() {
            let slot = Duration::from_millis(100 * i as u64);
            assert!(*elapsed >= slot, "request {} granted early: {:?}", i, elapsed);
            assert!(*elapsed < slot + Duration::from_millis(10));
        }
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        let limiter = RateLimiter::new(0, Duration::from_secs(2));
        assert_eq!(limiter.rate_limit(), 1);
        assert_eq!(limiter.interval(), Duration::from_secs(2));

        limiter.set_rate_limit(0);
        assert_eq!(limiter.rate_limit(), 1);
    }

    #[test]
    fn test_from_config_respects_enabled_flag() {
        let config = RateLimitConfig {
            enabled: false,
            rate_limit: 3,
            period_secs: 3.0,
        };
        let limiter = RateLimiter::from_config(&config);
        assert!(!limiter.is_enabled());
        assert_eq!(limiter.interval(), Duration::from_secs(1));
    }
}

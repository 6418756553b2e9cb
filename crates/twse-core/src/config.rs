//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`TWSE__SECTION__KEY`) 순으로 덮어씁니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP 설정
    #[serde(default)]
    pub http: HttpConfig,
    /// 요청 속도 제한 설정
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// 거래 캘린더 설정
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// TWSE 기본 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent 헤더
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Accept-Language 헤더
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    /// 프록시 (스킴 → URL). `https` 키만 있는 경우가 일반적입니다.
    #[serde(default)]
    pub proxy: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "https://www.twse.com.tw/rwd/zh".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0 Safari/537.36"
        .to_string()
}
fn default_accept_language() -> String {
    "zh-TW,zh;q=0.9,en;q=0.8".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            proxy: BTreeMap::new(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 요청 속도 제한 설정.
///
/// 연속된 요청 간 최소 간격은 `period_secs / rate_limit` 초입니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// 활성화 여부
    #[serde(default = "default_rate_enabled")]
    pub enabled: bool,
    /// 기간당 최대 요청 수
    #[serde(default = "default_rate_limit")]
    pub rate_limit: u32,
    /// 기간 (초)
    #[serde(default = "default_period_secs")]
    pub period_secs: f64,
}

fn default_rate_enabled() -> bool {
    true
}
fn default_rate_limit() -> u32 {
    5
}
fn default_period_secs() -> f64 {
    5.0
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_enabled(),
            rate_limit: default_rate_limit(),
            period_secs: default_period_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(self.period_secs.max(0.0))
    }
}

/// 거래 캘린더 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendarConfig {
    /// 캘린더 이름 (ISO 10383 MIC)
    #[serde(default = "default_calendar_name")]
    pub name: String,
    /// 평일 휴장일 목록. 생략하면 내장 목록(`XTAI_HOLIDAYS`)을 사용합니다.
    #[serde(default = "default_holidays")]
    pub holidays: Vec<NaiveDate>,
}

/// TWSE 평일 휴장일 (주말 제외, 결산만 하는 무거래일 포함).
pub const XTAI_HOLIDAYS: &[(i32, u32, u32)] = &[
    // 2023
    (2023, 1, 2),
    (2023, 1, 18),
    (2023, 1, 19),
    (2023, 1, 20),
    (2023, 1, 23),
    (2023, 1, 24),
    (2023, 1, 25),
    (2023, 1, 26),
    (2023, 1, 27),
    (2023, 2, 27),
    (2023, 2, 28),
    (2023, 4, 3),
    (2023, 4, 4),
    (2023, 4, 5),
    (2023, 5, 1),
    (2023, 6, 22),
    (2023, 6, 23),
    (2023, 9, 29),
    (2023, 10, 9),
    (2023, 10, 10),
    // 2024
    (2024, 1, 1),
    (2024, 2, 6),
    (2024, 2, 7),
    (2024, 2, 8),
    (2024, 2, 9),
    (2024, 2, 12),
    (2024, 2, 13),
    (2024, 2, 14),
    (2024, 2, 28),
    (2024, 4, 4),
    (2024, 4, 5),
    (2024, 5, 1),
    (2024, 6, 10),
    (2024, 7, 24),
    (2024, 7, 25),
    (2024, 9, 17),
    (2024, 10, 2),
    (2024, 10, 3),
    (2024, 10, 10),
    (2024, 10, 31),
    // 2025
    (2025, 1, 1),
    (2025, 1, 23),
    (2025, 1, 24),
    (2025, 1, 27),
    (2025, 1, 28),
    (2025, 1, 29),
    (2025, 1, 30),
    (2025, 1, 31),
    (2025, 2, 28),
    (2025, 4, 3),
    (2025, 4, 4),
    (2025, 5, 1),
    (2025, 5, 30),
    (2025, 9, 29),
    (2025, 10, 6),
    (2025, 10, 10),
    (2025, 10, 24),
    (2025, 12, 25),
    // 2026
    (2026, 1, 1),
    (2026, 2, 12),
    (2026, 2, 13),
    (2026, 2, 16),
    (2026, 2, 17),
    (2026, 2, 18),
    (2026, 2, 19),
    (2026, 2, 20),
    (2026, 2, 27),
    (2026, 4, 3),
    (2026, 4, 6),
    (2026, 5, 1),
    (2026, 6, 19),
    (2026, 9, 25),
    (2026, 9, 28),
    (2026, 10, 9),
    (2026, 10, 26),
    (2026, 12, 25),
];

fn default_calendar_name() -> String {
    "XTAI".to_string()
}

fn default_holidays() -> Vec<NaiveDate> {
    XTAI_HOLIDAYS
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            name: default_calendar_name(),
            holidays: default_holidays(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("http.base_url", default_base_url())?
            .set_default("rate_limit.enabled", default_rate_enabled())?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("TWSE")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.http.base_url.trim().is_empty() {
            return Err(CoreError::Config("http.base_url must not be empty".to_string()));
        }
        if self.rate_limit.rate_limit == 0 {
            return Err(CoreError::Config(
                "rate_limit.rate_limit must be greater than zero".to_string(),
            ));
        }
        if !self.rate_limit.period_secs.is_finite() || self.rate_limit.period_secs < 0.0 {
            return Err(CoreError::Config(
                "rate_limit.period_secs must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

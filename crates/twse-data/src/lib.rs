//! TWSE 과거 데이터 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - 공유 요청 속도 제한기 (`RateLimiter`)
//! - 엔드포인트 클라이언트와 응답 정규화 (`TwseClient`, `RawTable`)
//! - 거래 캘린더와 거래일 순회 (`TradingCalendarWalker`)
//! - 종목별 일별 시계열 조립 (`Ticker`)

pub mod calendar;
pub mod error;
pub mod progress;
pub mod provider;
pub mod rate_limiter;
pub mod table;
pub mod ticker;

pub use calendar::{HolidayCalendar, TradingCalendar, TradingCalendarWalker};
pub use error::{DataError, Result};
pub use progress::{NoopProgress, ProgressReporter, TracingProgress};
pub use provider::{
    Endpoint, EndpointQuery, ProxySetting, TwseClient, DEFAULT_BASE_URL,
    DEFAULT_CLOSING_TABLE_INDEX,
};
pub use rate_limiter::RateLimiter;
pub use table::RawTable;
pub use ticker::{DayState, DownloadSummary, Ticker, DEFAULT_FLOWS_SELECTOR};

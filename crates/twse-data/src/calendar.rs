//! 거래 캘린더와 거래일 순회.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::sync::Arc;

use twse_core::CalendarConfig;

/// 거래 캘린더.
pub trait TradingCalendar: Send + Sync {
    /// 캘린더 이름 (예: `XTAI`).
    fn name(&self) -> &str;

    /// `[start, end]` 구간의 거래일. 순서와 중복은 보장하지 않아도 됩니다.
    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate>;
}

/// 평일에서 휴장일을 뺀 캘린더.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    name: String,
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new(name: impl Into<String>, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            name: name.into(),
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::new(config.name.clone(), config.holidays.iter().copied())
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !self.is_holiday(date)
    }

    /// 휴장일 목록이 있는 마지막 연도.
    pub fn last_covered_year(&self) -> Option<i32> {
        self.holidays.last().map(|d| d.year())
    }

    /// 휴장일 목록이 `date`의 연도를 포함하는지 여부.
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.last_covered_year().is_some_and(|year| date.year() <= year)
    }
}

impl TradingCalendar for HolidayCalendar {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        if !self.covers(end) {
            tracing::warn!(
                calendar = %self.name,
                %end,
                last_covered_year = ?self.last_covered_year(),
                "휴장일 목록이 요청 구간을 포함하지 않습니다. 평일은 모두 거래일로 간주합니다"
            );
        }
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_trading_day(*d))
            .collect()
    }
}

/// 캘린더에서 거래일 목록을 뽑아 정렬/중복 제거/구간 절단합니다.
#[derive(Clone)]
pub struct TradingCalendarWalker {
    calendar: Arc<dyn TradingCalendar>,
}

impl TradingCalendarWalker {
    pub fn new(calendar: Arc<dyn TradingCalendar>) -> Self {
        Self { calendar }
    }

    pub fn calendar_name(&self) -> &str {
        self.calendar.name()
    }

    /// `[start, end]` 구간의 거래일을 오름차순으로 반환합니다. `start > end`면 비어 있습니다.
    pub fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        if start > end {
            return Vec::new();
        }
        let dates: BTreeSet<NaiveDate> = self
            .calendar
            .schedule(start, end)
            .into_iter()
            .filter(|d| (start..=end).contains(d))
            .collect();
        dates.into_iter().collect()
    }
}

impl std::fmt::Debug for TradingCalendarWalker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradingCalendarWalker")
            .field("calendar", &self.calendar.name())
            .finish()
    }
}

//! 거래일 목록 명령어.

use anyhow::Result;
use chrono::NaiveDate;
use std::io::Write;
use std::sync::Arc;

use twse_core::AppConfig;
use twse_data::{HolidayCalendar, TradingCalendarWalker};

/// `[start, end]` 구간의 거래일을 한 줄에 하나씩 씁니다.
pub fn print_trading_dates<W: Write>(
    writer: &mut W,
    start: NaiveDate,
    end: NaiveDate,
    app: &AppConfig,
) -> Result<usize> {
    if start > end {
        anyhow::bail!("Start date must be before end date");
    }

    let walker =
        TradingCalendarWalker::new(Arc::new(HolidayCalendar::from_config(&app.calendar)));
    let dates = walker.trading_dates(start, end);

    for date in &dates {
        writeln!(writer, "{}", date)?;
    }
    writer.flush()?;

    tracing::info!(
        calendar = walker.calendar_name(),
        trading_days = dates.len(),
        "거래일 목록 출력"
    );
    Ok(dates.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints_weekdays_only() {
        let mut app = AppConfig::default();
        app.calendar.holidays.clear();

        let mut out = Vec::new();
        // 2023-06-02(금) ~ 2023-06-05(월)
        let count = print_trading_dates(
            &mut out,
            NaiveDate::from_ymd_opt(2023, 6, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 5).unwrap(),
            &app,
        )
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "2023-06-02\n2023-06-05\n");
    }

    #[test]
    fn test_rejects_reversed_range() {
        let app = AppConfig::default();
        let mut out = Vec::new();
        let result = print_trading_dates(
            &mut out,
            NaiveDate::from_ymd_opt(2023, 6, 5).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 2).unwrap(),
            &app,
        );
        assert!(result.is_err());
    }
}

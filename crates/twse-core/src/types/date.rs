//! 거래일 표현 및 변환.
//!
//! TWSE 엔드포인트는 날짜를 `YYYYMMDD` 문자열로 주고받습니다.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

/// 쿼리 파라미터 날짜 형식.
pub const QUERY_DATE_FORMAT: &str = "%Y%m%d";

/// 거래일을 쿼리 파라미터 형식(`YYYYMMDD`)으로 변환합니다.
pub fn format_query_date(date: NaiveDate) -> String {
    date.format(QUERY_DATE_FORMAT).to_string()
}

/// `YYYYMMDD` 문자열을 날짜로 파싱합니다.
pub fn parse_query_date(s: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), QUERY_DATE_FORMAT)
        .map_err(|_| CoreError::InvalidDate(format!("{} (expected YYYYMMDD)", s)))
}

/// 사용자 입력 날짜를 파싱합니다.
///
/// `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD` 형식을 허용합니다.
pub fn parse_date_arg(s: &str) -> CoreResult<NaiveDate> {
    let trimmed = s.trim();
    let parsed = if trimmed.contains('-') {
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
    } else if trimmed.contains('/') {
        NaiveDate::parse_from_str(trimmed, "%Y/%m/%d")
    } else {
        NaiveDate::parse_from_str(trimmed, QUERY_DATE_FORMAT)
    };

    parsed.map_err(|_| {
        CoreError::InvalidDate(format!(
            "{} (expected YYYY-MM-DD, YYYY/MM/DD or YYYYMMDD)",
            s
        ))
    })
}

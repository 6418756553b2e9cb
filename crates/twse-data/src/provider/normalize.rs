//! 엔드포인트 응답(JSON)을 `RawTable`로 정규화.
//!
//! 응답 구조:
//! - MI_INDEX: `tables[i].{fields, data}`
//! - FMTQIK / BWIBBU_d / T86: 최상위 `{fields, data}`
//! - MI_MARGN: `tables[1].{fields, data}` (0번은 시장 합계)

use chrono::NaiveDate;
use serde_json::Value;

use twse_core::format_query_date;

use super::endpoint::Endpoint;
use crate::error::{DataError, Result};
use crate::table::RawTable;

/// 종가 테이블에서 마크업이 섞여 들어오는 컬럼 위치 (`漲跌(+/-)`).
pub const CHANGE_SIGN_COLUMN: usize = 9;

/// 신용거래 테이블에 추가되는 날짜 키 컬럼.
pub const MARGIN_DATE_COLUMN: &str = "Date";

/// 엔드포인트별 정규화 진입점.
pub fn normalize(
    endpoint: Endpoint,
    payload: &Value,
    date: NaiveDate,
    table_index: usize,
) -> Result<RawTable> {
    match endpoint {
        Endpoint::ClosingPrices => closing_prices(payload, date, table_index),
        Endpoint::MarketSummary | Endpoint::StockRatios | Endpoint::InstitutionalFlows => {
            top_level(endpoint, payload, date)
        }
        Endpoint::MarginTrading => margin_trading(payload, date),
    }
}

/// `tables[table_index]`를 꺼내고 등락 컬럼의 HTML 태그를 제거합니다.
pub fn closing_prices(payload: &Value, date: NaiveDate, table_index: usize) -> Result<RawTable> {
    let tables = sub_tables(payload);
    let Some(table) = tables.get(table_index) else {
        tracing::warn!(
            endpoint = Endpoint::ClosingPrices.code(),
            %date,
            table_index,
            available = tables.len(),
            "Table index out of range, returning empty table"
        );
        return Ok(RawTable::empty());
    };

    let mut raw = table_from(table)?;
    if raw.columns().len() > CHANGE_SIGN_COLUMN {
        raw.map_column(CHANGE_SIGN_COLUMN, strip_markup);
    }
    Ok(raw)
}

/// 최상위 `data`/`fields`를 테이블로 변환합니다. `data`가 없으면 빈 테이블입니다.
pub fn top_level(endpoint: Endpoint, payload: &Value, date: NaiveDate) -> Result<RawTable> {
    if payload.get("data").is_none() {
        tracing::warn!(
            endpoint = endpoint.code(),
            %date,
            stat = payload.get("stat").and_then(serde_json::Value::as_str).unwrap_or(""),
            "No data in response"
        );
        return Ok(RawTable::empty());
    }
    table_from(payload)
}

/// 두 번째 하위 테이블(종목별 신용거래)을 꺼내고 날짜 키 컬럼을 추가합니다.
pub fn margin_trading(payload: &Value, date: NaiveDate) -> Result<RawTable> {
    let tables = sub_tables(payload);
    let Some(table) = tables.get(1) else {
        tracing::warn!(
            endpoint = Endpoint::MarginTrading.code(),
            %date,
            available = tables.len(),
            "No per-stock margin table in response"
        );
        return Ok(RawTable::empty());
    };

    let mut raw = table_from(table)?;
    raw.push_constant_column(MARGIN_DATE_COLUMN, &format_query_date(date));
    raw.set_key_column(MARGIN_DATE_COLUMN)?;
    Ok(raw)
}

fn sub_tables(payload: &Value) -> &[Value] {
    payload
        .get("tables")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `{fields, data}` 객체를 테이블로 변환합니다.
fn table_from(value: &Value) -> Result<RawTable> {
    let columns: Vec<String> = match value.get("fields") {
        Some(Value::Array(fields)) => fields.iter().map(cell_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(DataError::InvalidData(format!(
                "fields must be an array, got {}",
                other
            )))
        }
    };

    let rows: Vec<Vec<String>> = match value.get("data") {
        Some(Value::Array(data)) => data
            .iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Array(cells) => Ok(cells.iter().map(cell_text).collect()),
                other => Err(DataError::InvalidData(format!(
                    "data row {} must be an array, got {}",
                    i, other
                ))),
            })
            .collect::<Result<_>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(DataError::InvalidData(format!(
                "data must be an array, got {}",
                other
            )))
        }
    };

    RawTable::new(columns, rows)
}

/// JSON 셀을 문자열로 변환합니다. `null`은 빈 문자열입니다.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// `<...>` 형태의 태그를 모두 제거합니다. 닫히지 않은 `<`는 그대로 둡니다.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        match rest[open..].find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

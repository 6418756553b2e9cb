//! 단일 엔드포인트 조회 명령어.
//!
//! 지정한 날짜의 정규화된 테이블을 그대로 출력합니다. 스키마 확인이나
//! 업스트림 응답 디버깅에 사용합니다.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use twse_core::AppConfig;
use twse_data::{Endpoint, EndpointQuery, RateLimiter, RawTable, TwseClient};

use super::output::{open_output, write_json, write_table_csv, OutputFormat};

/// 명령행 이름을 엔드포인트로 변환합니다. 보고서 코드(`MI_INDEX` 등)도 허용합니다.
pub fn parse_endpoint(s: &str) -> Result<Endpoint> {
    let name = s.trim();
    if let Some(endpoint) = Endpoint::ALL
        .into_iter()
        .find(|e| e.code().eq_ignore_ascii_case(name))
    {
        return Ok(endpoint);
    }

    match name.to_lowercase().as_str() {
        "closing" | "prices" => Ok(Endpoint::ClosingPrices),
        "summary" | "market" => Ok(Endpoint::MarketSummary),
        "ratios" => Ok(Endpoint::StockRatios),
        "margin" => Ok(Endpoint::MarginTrading),
        "flows" | "institutional" => Ok(Endpoint::InstitutionalFlows),
        _ => Err(anyhow::anyhow!(
            "Invalid endpoint: {}. Use: closing, summary, ratios, margin, flows",
            s
        )),
    }
}

/// 조회 설정.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub endpoint: Endpoint,
    pub date: NaiveDate,
    pub selector: Option<String>,
    /// 종가 응답의 테이블 위치
    pub table_index: usize,
    pub format: OutputFormat,
    /// 지정하지 않으면 stdout
    pub output: Option<String>,
}

/// 엔드포인트를 조회해 테이블을 출력하고 행 수를 반환합니다.
pub async fn fetch_table(config: FetchConfig, app: &AppConfig) -> Result<usize> {
    let limiter = Arc::new(RateLimiter::from_config(&app.rate_limit));
    let client = TwseClient::from_config(&app.http, limiter).context("Failed to build TWSE client")?;

    let mut query = EndpointQuery::new(config.date);
    if let Some(selector) = &config.selector {
        query = query.with_selector(selector.as_str());
    }

    let table = request(&client, &config, &query)
        .await
        .with_context(|| format!("Failed to fetch {} for {}", config.endpoint, config.date))?;

    info!(
        endpoint = config.endpoint.code(),
        date = %config.date,
        rows = table.len(),
        columns = table.columns().len(),
        "테이블 조회 완료"
    );

    let mut writer = open_output(config.output.as_deref())?;
    match config.format {
        OutputFormat::Csv => write_table_csv(&mut writer, &table),
        OutputFormat::Json => {
            write_json(&mut writer, &table)?;
            Ok(table.len())
        }
    }
}

async fn request(
    client: &TwseClient,
    config: &FetchConfig,
    query: &EndpointQuery,
) -> twse_data::Result<RawTable> {
    match config.endpoint {
        Endpoint::ClosingPrices => client.daily_closing_prices(query, config.table_index).await,
        endpoint => client.fetch(endpoint, query).await,
    }
}

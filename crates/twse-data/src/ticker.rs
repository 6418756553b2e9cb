//! 종목별 시계열 조립기.
//!
//! 거래일마다 네 엔드포인트(종가, 신용거래, 가치지표, 법인 매매)를 순서대로 조회하고,
//! 각 테이블에서 종목 행을 찾아 하나의 `InstrumentRow`로 합친 뒤 날짜 기준으로 업서트합니다.
//!
//! 조회 실패 시 전체 다운로드가 중단되지만, 그 이전 날짜의 행은 시계열에 남습니다.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::Instrument;

use twse_core::{FieldGroup, InstrumentRow, InstrumentSeries, StockCode, UpsertOutcome};

use crate::calendar::TradingCalendarWalker;
use crate::error::Result;
use crate::progress::{NoopProgress, ProgressReporter};
use crate::provider::{
    EndpointQuery, EndpointSchema, ProxySetting, TwseClient, DEFAULT_CLOSING_TABLE_INDEX,
};
use crate::table::RawTable;

/// 법인 매매 기본 선택자 (0999 워런트 제외 전 종목).
pub const DEFAULT_FLOWS_SELECTOR: &str = "ALLBUT0999";

/// 거래일 하나의 처리 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    Pending,
    Fetching(FieldGroup),
    Merged,
}

/// `download` 결과 요약.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    pub symbol: String,
    /// 처리한 거래일 수
    pub trading_days: usize,
    /// 새로 추가된 행 수
    pub inserted: usize,
    /// 기존 행에 병합된 수
    pub updated: usize,
    /// 종목 행을 찾지 못한 (거래일, 필드 그룹)
    pub missing: Vec<(NaiveDate, FieldGroup)>,
}

impl DownloadSummary {
    /// 모든 거래일의 모든 그룹을 찾았는지 여부.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// 한 종목의 과거 데이터 수집기.
pub struct Ticker {
    symbol: StockCode,
    series: InstrumentSeries,
    client: Arc<TwseClient>,
    walker: TradingCalendarWalker,
    progress: Arc<dyn ProgressReporter>,
    proxy: Option<ProxySetting>,
}

impl Ticker {
    pub fn new(symbol: StockCode, client: Arc<TwseClient>, walker: TradingCalendarWalker) -> Self {
        Self {
            series: InstrumentSeries::new(symbol.as_str()),
            symbol,
            client,
            walker,
            progress: Arc::new(NoopProgress),
            proxy: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// 이 종목의 모든 요청에 사용할 프록시.
    pub fn with_proxy(mut self, proxy: impl Into<ProxySetting>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn symbol(&self) -> &StockCode {
        &self.symbol
    }

    /// 지금까지 수집한 시계열.
    pub fn series(&self) -> &InstrumentSeries {
        &self.series
    }

    pub fn into_series(self) -> InstrumentSeries {
        self.series
    }

    /// `[start, end]` 구간의 거래일 데이터를 수집해 시계열에 업서트합니다.
    ///
    /// `select_type`은 법인 매매 조회 선택자이며 기본값은 `ALLBUT0999`입니다.
    pub async fn download(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        select_type: Option<&str>,
    ) -> Result<DownloadSummary> {
        let span = twse_core::collect_span!("download", self.symbol);
        self.download_dates(start, end, select_type.unwrap_or(DEFAULT_FLOWS_SELECTOR))
            .instrument(span)
            .await
    }

    async fn download_dates(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        select_type: &str,
    ) -> Result<DownloadSummary> {
        let dates = self.walker.trading_dates(start, end);
        let total = dates.len();
        let mut summary = DownloadSummary {
            symbol: self.symbol.to_string(),
            trading_days: total,
            ..Default::default()
        };

        tracing::info!(
            %start,
            %end,
            trading_days = total,
            calendar = self.walker.calendar_name(),
            "다운로드 시작"
        );

        for (i, date) in dates.into_iter().enumerate() {
            let row = self.assemble_day(date, select_type, &mut summary).await?;

            match self.series.upsert(row) {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
            }
            tracing::trace!(%date, state = ?DayState::Merged, "거래일 처리 완료");

            self.progress.report(i + 1, total, self.symbol.as_str());
        }

        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            missing = summary.missing.len(),
            rows = self.series.len(),
            "다운로드 완료"
        );
        Ok(summary)
    }

    /// 거래일 하나의 네 그룹을 조회해 한 행으로 합칩니다.
    async fn assemble_day(
        &self,
        date: NaiveDate,
        select_type: &str,
        summary: &mut DownloadSummary,
    ) -> Result<InstrumentRow> {
        let mut row = InstrumentRow::new(date);
        tracing::trace!(%date, state = ?DayState::Pending, "거래일 처리 시작");

        for group in FieldGroup::ALL {
            tracing::trace!(%date, state = ?DayState::Fetching(group));

            let table = self.fetch_group(group, date, select_type).await?;
            let schema = EndpointSchema::for_group(group);

            if !schema.extract_into(&table, self.symbol.as_str(), &mut row)? {
                tracing::debug!(
                    %date,
                    group = group.as_str(),
                    endpoint = schema.endpoint.code(),
                    rows = table.len(),
                    "종목 행 없음"
                );
                summary.missing.push((date, group));
            }
        }

        Ok(row)
    }

    /// 종목 프록시가 있으면 붙여 쿼리를 만듭니다. 없으면 클라이언트 기본 프록시를 씁니다.
    fn query(&self, date: NaiveDate, selector: &str) -> EndpointQuery {
        let query = EndpointQuery::new(date).with_selector(selector);
        match &self.proxy {
            Some(proxy) => query.with_proxy(proxy.clone()),
            None => query,
        }
    }

    async fn fetch_group(
        &self,
        group: FieldGroup,
        date: NaiveDate,
        select_type: &str,
    ) -> Result<RawTable> {
        let query = |selector: &str| self.query(date, selector);

        let result = match group {
            FieldGroup::Prices => {
                self.client
                    .daily_closing_prices(&query("ALL"), DEFAULT_CLOSING_TABLE_INDEX)
                    .await
            }
            FieldGroup::Margin => self.client.margin_trading(&query("STOCK")).await,
            FieldGroup::Ratios => self.client.daily_stock_ratios(&query("ALL")).await,
            FieldGroup::Flows => self.client.institutional_trading(&query(select_type)).await,
        };

        result.map_err(|e| {
            tracing::warn!(
                %date,
                group = group.as_str(),
                endpoint = EndpointSchema::for_group(group).endpoint.code(),
                error = %e,
                "조회 실패, 다운로드 중단"
            );
            e
        })
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("symbol", &self.symbol)
            .field("rows", &self.series.len())
            .field("walker", &self.walker)
            .finish()
    }
}

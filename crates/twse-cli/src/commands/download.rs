//! 종목별 과거 데이터 다운로드 명령어.
//!
//! 거래일마다 종가/신용거래/가치지표/법인 매매를 조회해 종목별 시계열로 합치고
//! CSV 또는 JSON으로 저장합니다. 여러 종목을 받으면 하나의 클라이언트와 속도 제한기를
//! 공유하고, 같은 날짜의 응답은 캐시에서 재사용합니다.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{error, info, warn};

use twse_core::{AppConfig, InstrumentSeries, StockCode};
use twse_data::{
    DownloadSummary, HolidayCalendar, ProgressReporter, RateLimiter, Ticker,
    TracingProgress, TradingCalendarWalker, TwseClient,
};

use super::output::{open_output, write_json, write_series_csv, OutputFormat};

/// 다운로드 설정.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub symbols: Vec<StockCode>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 법인 매매 선택자 (기본: ALLBUT0999)
    pub select_type: Option<String>,
    pub output_path: String,
    pub format: OutputFormat,
}

impl DownloadConfig {
    /// 출력 경로 자동 생성 (`data/twse/2330_20230601_to_20230630.csv`).
    pub fn default_output_path(
        symbols: &[StockCode],
        start: NaiveDate,
        end: NaiveDate,
        format: OutputFormat,
    ) -> String {
        let names: Vec<&str> = symbols.iter().map(StockCode::as_str).collect();
        format!(
            "data/twse/{}_{}_to_{}.{}",
            names.join("_"),
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
            format.extension()
        )
    }
}

/// indicatif 진행률 표시줄.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:>8} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl ProgressReporter for BarProgress {
    fn report(&self, current: usize, total: usize, label: &str) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
        self.bar.set_message(label.to_string());
        if current == total {
            self.bar.finish();
        }
    }
}

/// 모든 종목을 순서대로 다운로드하고 결과를 저장합니다.
pub async fn download_data(
    config: DownloadConfig,
    app: &AppConfig,
) -> Result<Vec<DownloadSummary>> {
    if config.start_date > config.end_date {
        anyhow::bail!("Start date must be before end date");
    }

    info!(
        "Downloading {} symbol(s) from {} to {}",
        config.symbols.len(),
        config.start_date,
        config.end_date
    );

    let limiter = Arc::new(RateLimiter::from_config(&app.rate_limit));
    let client = Arc::new(
        TwseClient::from_config(&app.http, limiter)
            .context("Failed to build TWSE client")?
            .with_cache(config.symbols.len() > 1),
    );
    info!(
        enabled = client.rate_limiter().is_enabled(),
        interval = ?client.rate_limiter().interval(),
        "요청 속도 제한"
    );
    let walker =
        TradingCalendarWalker::new(Arc::new(HolidayCalendar::from_config(&app.calendar)));

    let mut collected: Vec<InstrumentSeries> = Vec::with_capacity(config.symbols.len());
    let mut summaries = Vec::with_capacity(config.symbols.len());

    for symbol in &config.symbols {
        // 터미널이 아니면 진행률을 로그로 남깁니다
        let bar = std::io::stderr()
            .is_terminal()
            .then(|| Arc::new(BarProgress::new()));
        let progress: Arc<dyn ProgressReporter> = match &bar {
            Some(bar) => bar.clone(),
            None => Arc::new(TracingProgress),
        };
        let mut ticker = Ticker::new(symbol.clone(), Arc::clone(&client), walker.clone())
            .with_progress(progress);

        let result = ticker
            .download(
                config.start_date,
                config.end_date,
                config.select_type.as_deref(),
            )
            .await;
        if let Some(bar) = &bar {
            bar.bar.finish_and_clear();
        }

        match result {
            Ok(summary) => {
                if !summary.is_complete() {
                    warn!(
                        symbol = %symbol,
                        missing = summary.missing.len(),
                        "Some field groups were not found"
                    );
                }
                summaries.push(summary);
                collected.push(ticker.into_series());
            }
            Err(e) => {
                // 실패 이전 날짜까지는 저장합니다
                let partial = ticker.into_series();
                if !partial.is_empty() {
                    collected.push(partial);
                    if let Err(save_err) = save(&config, &collected) {
                        error!("Failed to save partial results: {:#}", save_err);
                    }
                }
                return Err(e).with_context(|| format!("Download failed for {}", symbol));
            }
        }
    }

    let rows = save(&config, &collected)?;
    info!("Saved {} rows to {}", rows, config.output_path);
    Ok(summaries)
}

fn save(config: &DownloadConfig, series: &[InstrumentSeries]) -> Result<usize> {
    let mut writer = open_output(Some(&config.output_path))?;
    match config.format {
        OutputFormat::Csv => write_series_csv(&mut writer, series),
        OutputFormat::Json => {
            write_json(&mut writer, series)?;
            Ok(series.iter().map(InstrumentSeries::len).sum())
        }
    }
}

//! TWSE 과거 데이터 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 台積電 6월 데이터 다운로드
//! twse download -s 2330 -f 2023-06-01 -t 2023-06-30
//!
//! # 여러 종목을 JSON으로 저장
//! twse download -s 2330 -s 2317 -f 2023-06-01 -t 2023-06-30 --format json
//!
//! # 특정 날짜의 신용거래 테이블 조회
//! twse fetch margin -d 2023-06-01
//!
//! # 거래일 목록
//! twse calendar -f 2023-06-01 -t 2023-06-30
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{error, info};

use twse_core::{init_logging, parse_date_arg, AppConfig, LogConfig, StockCode};
use twse_data::DEFAULT_CLOSING_TABLE_INDEX;

use twse_cli::commands::calendar::print_trading_dates;
use twse_cli::commands::download::{download_data, DownloadConfig};
use twse_cli::commands::fetch::{fetch_table, parse_endpoint, FetchConfig};
use twse_cli::commands::output::OutputFormat;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "twse")]
#[command(about = "TWSE 과거 시세/신용거래/가치지표/법인 매매 데이터 수집기", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (기본: config/default.toml, 없으면 내장 기본값)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목별 과거 데이터 다운로드
    Download {
        /// 종목 코드 (여러 번 지정 가능, 예: -s 2330 -s 2317)
        #[arg(short, long = "symbol", required = true)]
        symbols: Vec<String>,

        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: String,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: String,

        /// 법인 매매 선택자 (기본: ALLBUT0999)
        #[arg(long)]
        select_type: Option<String>,

        /// 출력 파일 경로 (자동 생성됨)
        #[arg(short, long)]
        output: Option<String>,

        /// 출력 형식 (csv, json)
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// 단일 엔드포인트 테이블 조회
    Fetch {
        /// 엔드포인트 (closing, summary, ratios, margin, flows)
        endpoint: String,

        /// 조회 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// 선택자 (type / selectType 파라미터)
        #[arg(long)]
        select_type: Option<String>,

        /// 종가 응답의 테이블 위치
        #[arg(long, default_value_t = DEFAULT_CLOSING_TABLE_INDEX)]
        table_index: usize,

        /// 출력 형식 (csv, json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 거래일 목록 출력
    Calendar {
        /// 시작 날짜 (YYYY-MM-DD)
        #[arg(short = 'f', long)]
        from: String,

        /// 종료 날짜 (YYYY-MM-DD)
        #[arg(short, long)]
        to: String,
    },
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            AppConfig::load(path).with_context(|| format!("Failed to load config: {}", path))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            AppConfig::load_default().context("Failed to load default config")
        }
        None => Ok(AppConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    // LOG_FORMAT이 있으면 설정 파일의 [logging]보다 우선
    let log_config = if std::env::var_os("LOG_FORMAT").is_some() {
        LogConfig::from_env()
    } else {
        LogConfig::from_settings(&config.logging)
    };
    init_logging(log_config).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Download {
            symbols,
            from,
            to,
            select_type,
            output,
            format,
        } => {
            let symbols = symbols
                .iter()
                .map(|s| StockCode::parse(s))
                .collect::<Result<Vec<_>, _>>()?;
            let start_date = parse_date_arg(&from)?;
            let end_date = parse_date_arg(&to)?;
            let format = OutputFormat::parse(&format)?;

            let output_path = output.unwrap_or_else(|| {
                DownloadConfig::default_output_path(&symbols, start_date, end_date, format)
            });

            let download = DownloadConfig {
                symbols,
                start_date,
                end_date,
                select_type,
                output_path: output_path.clone(),
                format,
            };

            match download_data(download, &config).await {
                Ok(summaries) => {
                    let rows: usize = summaries.iter().map(|s| s.inserted + s.updated).sum();
                    let missing: usize = summaries.iter().map(|s| s.missing.len()).sum();
                    info!("Successfully downloaded {} rows", rows);
                    println!("\n데이터 다운로드 완료: {} 행", rows);
                    if missing > 0 {
                        println!("누락된 필드 그룹: {}", missing);
                    }
                    println!("저장 위치: {}", output_path);
                }
                Err(e) => {
                    error!("Download failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Fetch {
            endpoint,
            date,
            select_type,
            table_index,
            format,
            output,
        } => {
            let fetch = FetchConfig {
                endpoint: parse_endpoint(&endpoint)?,
                date: parse_date_arg(&date)?,
                selector: select_type,
                table_index,
                format: OutputFormat::parse(&format)?,
                output,
            };

            let rows = fetch_table(fetch, &config).await?;
            info!("Fetched {} rows", rows);
        }

        Commands::Calendar { from, to } => {
            let start = parse_date_arg(&from)?;
            let end = parse_date_arg(&to)?;
            let mut stdout = std::io::stdout().lock();
            print_trading_dates(&mut stdout, start, end, &config)?;
        }
    }

    Ok(())
}

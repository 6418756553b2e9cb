//! 결과 출력 (CSV / JSON).

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use twse_core::InstrumentSeries;
use twse_data::RawTable;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: csv, json", s)),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// 파일 또는 stdout 출력 대상을 엽니다. 파일이면 상위 디렉토리를 만듭니다.
pub fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            info!("Output will be saved to: {}", path);
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// CSV 셀 이스케이프.
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn decimal_field(value: Option<Decimal>) -> String {
    value.map(|v| v.normalize().to_string()).unwrap_or_default()
}

/// 여러 종목 시계열을 하나의 CSV로 씁니다 (`symbol` + `date` + 39개 필드).
pub fn write_series_csv<W: Write>(writer: &mut W, series: &[InstrumentSeries]) -> Result<usize> {
    let header: Vec<&str> = std::iter::once("symbol")
        .chain(InstrumentSeries::column_names())
        .collect();
    writeln!(writer, "{}", header.join(","))?;

    let mut written = 0;
    for s in series {
        for row in s.rows() {
            let values: Vec<String> = row.iter().map(|(_, v)| decimal_field(v)).collect();
            writeln!(
                writer,
                "{},{},{}",
                csv_field(s.symbol()),
                row.date(),
                values.join(",")
            )?;
            written += 1;
        }
    }

    writer.flush()?;
    Ok(written)
}

/// 정규화된 테이블을 CSV로 씁니다.
pub fn write_table_csv<W: Write>(writer: &mut W, table: &RawTable) -> Result<usize> {
    let header: Vec<String> = table.columns().iter().map(|c| csv_field(c)).collect();
    writeln!(writer, "{}", header.join(","))?;

    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
        writeln!(writer, "{}", cells.join(","))?;
    }

    writer.flush()?;
    Ok(table.len())
}

/// 직렬화 가능한 값을 보기 좋은 JSON으로 씁니다.
pub fn write_json<W: Write, T: serde::Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).context("Failed to serialize JSON")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

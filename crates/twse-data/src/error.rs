//! 데이터 모듈 오류 타입.

use chrono::NaiveDate;
use thiserror::Error;

/// 데이터 수집 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 200이 아닌 HTTP 응답
    #[error("Request failed: {endpoint} on {date} (selector {selector:?}) returned status {status}")]
    RequestFailed {
        endpoint: &'static str,
        date: NaiveDate,
        selector: Option<String>,
        status: u16,
    },

    /// 200 응답이지만 JSON 파싱 실패. 원본 본문을 보관합니다.
    #[error("Failed to decode {endpoint} response for {date}: {message}")]
    Decode {
        endpoint: &'static str,
        date: NaiveDate,
        message: String,
        body: String,
    },

    /// 전송 계층 오류 (연결, 타임아웃, 본문 수신)
    #[error("Transport error: {0}")]
    Transport(String),

    /// 선언된 컬럼이 응답 헤더에 없음
    #[error("Schema mismatch: {endpoint} response has no column {column}")]
    SchemaMismatch {
        endpoint: &'static str,
        column: String,
    },

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 설정 오류 (프록시, 클라이언트 생성)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// 재시도로 해결될 가능성이 있는 오류인지 여부.
    pub fn is_retryable(&self) -> bool {
        match self {
            DataError::Transport(_) => true,
            DataError::RequestFailed { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            DataError::Config(err.to_string())
        } else {
            DataError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::InvalidData(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

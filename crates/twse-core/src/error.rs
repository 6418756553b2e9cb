//! 핵심 에러 타입.
//!
//! 설정 로드와 입력 검증 과정에서 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 날짜
    #[error("잘못된 날짜: {0}")]
    InvalidDate(String),

    /// 잘못된 종목 코드
    #[error("잘못된 종목 코드: {0}")]
    InvalidSymbol(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: CoreError = config::ConfigError::Message("missing key".to_string()).into();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("missing key")));
    }
}

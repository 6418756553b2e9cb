//! 종목 코드.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

const MAX_CODE_LEN: usize = 10;

/// TWSE 종목 코드 (예: `2330`, `00878`, `2881A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StockCode(String);

impl StockCode {
    /// 종목 코드를 검증하고 대문자로 정규화합니다.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidSymbol("empty stock code".to_string()));
        }
        if trimmed.len() > MAX_CODE_LEN {
            return Err(CoreError::InvalidSymbol(format!(
                "{} (longer than {} characters)",
                trimmed, MAX_CODE_LEN
            )));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidSymbol(format!(
                "{} (only ASCII letters and digits allowed)",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StockCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StockCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StockCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StockCode> for String {
    fn from(value: StockCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(StockCode::parse(" 2330 ").unwrap().as_str(), "2330");
        assert_eq!(StockCode::parse("2881a").unwrap().as_str(), "2881A");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(StockCode::parse("").is_err());
        assert!(StockCode::parse("23 30").is_err());
        assert!(StockCode::parse("12345678901").is_err());
    }
}

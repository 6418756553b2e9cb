//! # TWSE Core
//!
//! 대만증권거래소(TWSE) 과거 데이터 수집기의 핵심 타입을 제공합니다.
//!
//! - 필드 정의와 종목별 일별 행/시계열 (`domain`)
//! - 종목 코드와 쿼리 날짜 (`types`)
//! - 설정 관리 (`config`)
//! - 로깅 인프라 (`logging`)

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;

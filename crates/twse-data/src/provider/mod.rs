//! TWSE 엔드포인트 Provider 모듈.
//!
//! - `Endpoint`: 엔드포인트 경로와 선택자 파라미터
//! - `TwseClient`: 속도 제한이 적용된 HTTP 클라이언트
//! - `normalize`: JSON 응답 → `RawTable`
//! - `schema`: 필드 → 업스트림 컬럼 매핑과 셀 파싱

pub mod client;
pub mod endpoint;
pub mod normalize;
pub mod schema;

pub use client::{EndpointQuery, ProxySetting, TwseClient};
pub use endpoint::{Endpoint, DEFAULT_BASE_URL, DEFAULT_CLOSING_TABLE_INDEX};
pub use schema::{parse_cell, ColumnSpec, EndpointSchema, ResolvedSchema};

//! 종목 시계열 도메인 모델.
//!
//! - [`Field`] / [`FieldGroup`]: 고정된 39개 필드와 엔드포인트별 그룹
//! - [`InstrumentRow`]: 하루치 종목 데이터 (필드별 `Option<Decimal>`)
//! - [`InstrumentSeries`]: 날짜 기준 업서트되는 종목 시계열

mod field;
mod row;
mod series;

pub use field::{Field, FieldGroup, FIELD_COUNT};
pub use row::InstrumentRow;
pub use series::{InstrumentSeries, UpsertOutcome};

//! 수집기 전반에서 사용되는 공통 타입.

mod date;
mod symbol;

pub use date::*;
pub use symbol::*;

//! CLI 명령어 구현 모듈.

pub mod calendar;
pub mod download;
pub mod fetch;
pub mod output;

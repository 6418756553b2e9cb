//! TWSE 과거 데이터 CLI 도구 모음.
//!
//! - 종목별 과거 데이터 다운로드
//! - 단일 엔드포인트 조회
//! - 거래일 목록 출력

pub mod commands;

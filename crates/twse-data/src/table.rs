//! 정규화된 응답 테이블.

use serde::Serialize;

use crate::error::{DataError, Result};

/// 엔드포인트 응답 하나를 정규화한 문자열 테이블.
///
/// 모든 행은 `columns`와 같은 폭을 가집니다. 빈 테이블은 컬럼과 행이 모두 없습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    key_column: Option<String>,
}

impl RawTable {
    /// 행 폭을 검증하며 테이블을 생성합니다.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DataError::InvalidData(format!(
                "row {} has {} cells but the header has {} columns",
                index,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self {
            columns,
            rows,
            key_column: None,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn key_column(&self) -> Option<&str> {
        self.key_column.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    /// 행 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 이름이 `name`인 모든 컬럼의 위치 (헤더 순서).
    pub fn column_positions<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.columns
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.trim() == name)
            .map(|(i, _)| i)
    }

    /// 이름이 `name`인 첫 번째 컬럼의 위치.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_positions(name).next()
    }

    /// 모든 행에 같은 값을 가진 컬럼을 끝에 추가합니다.
    pub fn push_constant_column(&mut self, name: impl Into<String>, value: &str) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(value.to_string());
        }
    }

    /// 키 컬럼을 지정합니다. 존재하지 않는 컬럼이면 오류입니다.
    pub fn set_key_column(&mut self, name: &str) -> Result<()> {
        if self.column_index(name).is_none() {
            return Err(DataError::InvalidData(format!(
                "key column {} is not part of the table",
                name
            )));
        }
        self.key_column = Some(name.to_string());
        Ok(())
    }

    /// 지정한 위치의 모든 셀에 변환을 적용합니다. 범위를 벗어나면 아무것도 하지 않습니다.
    pub fn map_column<F>(&mut self, index: usize, f: F)
    where
        F: Fn(&str) -> String,
    {
        if index >= self.columns.len() {
            return;
        }
        for row in &mut self.rows {
            row[index] = f(&row[index]);
        }
    }

    /// `column` 위치의 값이 `value`인 첫 번째 행.
    pub fn find_row(&self, column: usize, value: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.get(column).map(|c| c.trim()) == Some(value))
            .map(Vec::as_slice)
    }
}

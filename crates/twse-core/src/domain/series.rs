//! 종목별 일별 시계열.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::field::Field;
use super::row::InstrumentRow;

/// 업서트 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 새 날짜가 추가됨
    Inserted,
    /// 기존 날짜의 행이 갱신됨
    Updated,
}

/// 한 종목의 날짜순 시계열.
///
/// 날짜당 최대 한 행만 보관하며, 순회는 항상 날짜 오름차순입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentSeries {
    symbol: String,
    #[serde(serialize_with = "serialize_rows")]
    rows: BTreeMap<NaiveDate, InstrumentRow>,
}

impl InstrumentSeries {
    /// 빈 시계열을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 날짜 기준으로 행을 추가하거나 기존 행에 병합합니다.
    pub fn upsert(&mut self, row: InstrumentRow) -> UpsertOutcome {
        match self.rows.get_mut(&row.date()) {
            Some(existing) => {
                existing.merge_from(&row);
                UpsertOutcome::Updated
            }
            None => {
                self.rows.insert(row.date(), row);
                UpsertOutcome::Inserted
            }
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&InstrumentRow> {
        self.rows.get(&date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.rows.contains_key(&date)
    }

    /// 날짜 오름차순 행 목록.
    pub fn rows(&self) -> impl Iterator<Item = &InstrumentRow> {
        self.rows.values()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    /// 출력용 컬럼 이름 (`date` + 39개 필드).
    pub fn column_names() -> Vec<&'static str> {
        std::iter::once("date")
            .chain(Field::ALL.iter().map(|f| f.as_str()))
            .collect()
    }
}

fn serialize_rows<S: serde::Serializer>(
    rows: &BTreeMap<NaiveDate, InstrumentRow>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(rows.values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FIELD_COUNT;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, day).unwrap()
    }

    #[test]
    fn test_upsert_keeps_one_row_per_date() {
        let mut series = InstrumentSeries::new("2330");

        assert_eq!(
            series.upsert(InstrumentRow::new(d(2)).with(Field::Close, dec!(530))),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            series.upsert(InstrumentRow::new(d(1)).with(Field::Close, dec!(520))),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            series.upsert(InstrumentRow::new(d(2)).with(Field::Close, dec!(531))),
            UpsertOutcome::Updated
        );

        assert_eq!(series.len(), 2);
        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![d(1), d(2)]);
        assert_eq!(series.get(d(2)).unwrap().get(Field::Close), Some(dec!(531)));
        assert_eq!(series.first_date(), Some(d(1)));
        assert_eq!(series.last_date(), Some(d(2)));
    }

    #[test]
    fn test_column_names() {
        let columns = InstrumentSeries::column_names();
        assert_eq!(columns.len(), FIELD_COUNT + 1);
        assert_eq!(columns[0], "date");
        assert_eq!(columns[1], "open");
        assert_eq!(columns[FIELD_COUNT], "institutional_net");
    }

    #[test]
    fn test_serialize_shape() {
        let mut series = InstrumentSeries::new("2330");
        series.upsert(InstrumentRow::new(d(1)));
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json["symbol"], "2330");
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_upsert_dates_unique_and_sorted(days in prop::collection::vec(1u32..=28, 0..40)) {
            let mut series = InstrumentSeries::new("2330");
            for day in &days {
                series.upsert(InstrumentRow::new(d(*day)));
            }

            let dates: Vec<_> = series.dates().collect();
            let mut expected: Vec<_> = days.iter().map(|day| d(*day)).collect();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(dates, expected);
        }
    }
}

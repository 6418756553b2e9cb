//! 하루치 종목 데이터 행.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::field::{Field, FieldGroup, FIELD_COUNT};

/// 한 거래일의 종목 데이터.
///
/// 39개 필드를 항상 모두 보유하며, 값을 얻지 못한 필드는 `None`입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentRow {
    date: NaiveDate,
    values: [Option<Decimal>; FIELD_COUNT],
}

impl InstrumentRow {
    /// 모든 필드가 비어 있는 행을 생성합니다.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: [None; FIELD_COUNT],
        }
    }

    /// 거래일.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// 필드 값.
    pub fn get(&self, field: Field) -> Option<Decimal> {
        self.values[field.index()]
    }

    /// 필드 값을 설정합니다.
    pub fn set(&mut self, field: Field, value: Option<Decimal>) {
        self.values[field.index()] = value;
    }

    /// 빌더 스타일 설정.
    pub fn with(mut self, field: Field, value: Decimal) -> Self {
        self.set(field, Some(value));
        self
    }

    /// `(필드, 값)` 쌍을 선언 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (Field, Option<Decimal>)> + '_ {
        Field::ALL.iter().map(move |f| (*f, self.get(*f)))
    }

    /// 그룹 내 필드 중 하나라도 값이 있는지 여부.
    pub fn has_group(&self, group: FieldGroup) -> bool {
        group.fields().any(|f| self.get(f).is_some())
    }

    /// 모든 필드에 값이 있는지 여부.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// 값이 없는 필드 목록.
    pub fn missing_fields(&self) -> Vec<Field> {
        self.iter()
            .filter(|(_, v)| v.is_none())
            .map(|(f, _)| f)
            .collect()
    }

    /// 다른 행의 값을 그룹 단위로 덮어씁니다.
    ///
    /// `other`에 값이 있는 그룹만 교체하고, 비어 있는 그룹은 기존 값을 유지합니다.
    /// 날짜가 다르면 아무것도 하지 않습니다.
    pub fn merge_from(&mut self, other: &InstrumentRow) {
        if self.date != other.date {
            return;
        }
        for group in FieldGroup::ALL {
            if other.has_group(group) {
                for field in group.fields() {
                    self.set(field, other.get(field));
                }
            }
        }
    }
}

impl Serialize for InstrumentRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
    }

    #[test]
    fn test_new_row_has_every_field_missing() {
        let row = InstrumentRow::new(date());
        assert_eq!(row.iter().count(), FIELD_COUNT);
        assert_eq!(row.missing_fields().len(), FIELD_COUNT);
        assert!(!row.is_complete());
    }

    #[test]
    fn test_merge_replaces_only_present_groups() {
        let mut stored = InstrumentRow::new(date())
            .with(Field::Close, dec!(520))
            .with(Field::PeRatio, dec!(15.2));

        let fresh = InstrumentRow::new(date()).with(Field::Close, dec!(523));
        stored.merge_from(&fresh);

        assert_eq!(stored.get(Field::Close), Some(dec!(523)));
        // 새 행에 가치지표 그룹이 없으므로 기존 값 유지
        assert_eq!(stored.get(Field::PeRatio), Some(dec!(15.2)));
    }

    #[test]
    fn test_merge_ignores_other_dates() {
        let mut stored = InstrumentRow::new(date()).with(Field::Close, dec!(520));
        let other = InstrumentRow::new(date().succ_opt().unwrap()).with(Field::Close, dec!(1));
        stored.merge_from(&other);
        assert_eq!(stored.get(Field::Close), Some(dec!(520)));
    }

    #[test]
    fn test_serialize_includes_all_columns() {
        let row = InstrumentRow::new(date()).with(Field::Volume, dec!(1000));
        let json = serde_json::to_value(&row).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj.len(), FIELD_COUNT + 1);
        assert_eq!(obj["date"], "2023-06-01");
        assert_eq!(obj["volume"], "1000");
        assert!(obj["close"].is_null());
    }
}

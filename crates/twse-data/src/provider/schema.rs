//! 엔드포인트별 컬럼 스키마.
//!
//! 각 필드를 업스트림 헤더 이름(별칭 목록)과 중복 헤더 내 순번으로 선언합니다.
//! MI_MARGN은 융자/대주 그룹이 `買進`, `賣出`, `前日餘額` 등을 같은 이름으로 반복하므로
//! 순번 0은 융자, 1은 대주를 가리킵니다.

use rust_decimal::Decimal;

use twse_core::{Field, FieldGroup, InstrumentRow};

use super::endpoint::Endpoint;
use crate::error::{DataError, Result};
use crate::table::RawTable;

/// 업스트림 컬럼 선언.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    /// 허용되는 헤더 이름 (앞쪽 우선)
    pub aliases: &'static [&'static str],
    /// 같은 이름의 헤더가 여러 개일 때의 순번 (0부터)
    pub occurrence: usize,
}

impl ColumnSpec {
    pub const fn named(aliases: &'static [&'static str]) -> Self {
        Self {
            aliases,
            occurrence: 0,
        }
    }

    pub const fn nth(aliases: &'static [&'static str], occurrence: usize) -> Self {
        Self {
            aliases,
            occurrence,
        }
    }

    /// 테이블에서 컬럼 위치를 찾습니다.
    pub fn locate(&self, table: &RawTable) -> Option<usize> {
        self.aliases
            .iter()
            .find_map(|alias| table.column_positions(alias).nth(self.occurrence))
    }

    /// 오류 메시지용 이름.
    pub fn label(&self) -> String {
        let name = self.aliases.first().copied().unwrap_or("?");
        if self.occurrence == 0 {
            name.to_string()
        } else {
            format!("{}#{}", name, self.occurrence + 1)
        }
    }
}

/// 종목 식별 컬럼.
pub const IDENTIFIER: ColumnSpec = ColumnSpec::named(&["證券代號", "代號", "股票代號"]);

/// 한 엔드포인트가 채우는 필드 그룹과 컬럼 매핑.
#[derive(Debug)]
pub struct EndpointSchema {
    pub endpoint: Endpoint,
    pub group: FieldGroup,
    pub identifier: ColumnSpec,
    pub columns: &'static [(Field, ColumnSpec)],
}

pub static PRICES: EndpointSchema = EndpointSchema {
    endpoint: Endpoint::ClosingPrices,
    group: FieldGroup::Prices,
    identifier: IDENTIFIER,
    columns: &[
        (Field::Open, ColumnSpec::named(&["開盤價"])),
        (Field::High, ColumnSpec::named(&["最高價"])),
        (Field::Low, ColumnSpec::named(&["最低價"])),
        (Field::Close, ColumnSpec::named(&["收盤價"])),
        (Field::Volume, ColumnSpec::named(&["成交股數"])),
        (Field::TransactionValue, ColumnSpec::named(&["成交金額"])),
    ],
};

const BUY: &[&str] = &["買進"];
const SELL: &[&str] = &["賣出"];
const PREVIOUS_BALANCE: &[&str] = &["前日餘額"];
const CURRENT_BALANCE: &[&str] = &["今日餘額"];
const NEXT_LIMIT: &[&str] = &["次一營業日限額", "限額"];

pub static MARGIN: EndpointSchema = EndpointSchema {
    endpoint: Endpoint::MarginTrading,
    group: FieldGroup::Margin,
    identifier: IDENTIFIER,
    columns: &[
        (Field::MarginBuy, ColumnSpec::nth(BUY, 0)),
        (Field::MarginSell, ColumnSpec::nth(SELL, 0)),
        (Field::MarginCashRepay, ColumnSpec::named(&["現金償還"])),
        (Field::MarginPreviousBalance, ColumnSpec::nth(PREVIOUS_BALANCE, 0)),
        (Field::MarginCurrentBalance, ColumnSpec::nth(CURRENT_BALANCE, 0)),
        (Field::MarginNextLimit, ColumnSpec::nth(NEXT_LIMIT, 0)),
        (Field::ShortBuy, ColumnSpec::nth(BUY, 1)),
        (Field::ShortSell, ColumnSpec::nth(SELL, 1)),
        (Field::ShortStockRepay, ColumnSpec::named(&["現券償還"])),
        (Field::ShortPreviousBalance, ColumnSpec::nth(PREVIOUS_BALANCE, 1)),
        (Field::ShortCurrentBalance, ColumnSpec::nth(CURRENT_BALANCE, 1)),
        (Field::ShortNextLimit, ColumnSpec::nth(NEXT_LIMIT, 1)),
        (Field::Offset, ColumnSpec::named(&["資券互抵"])),
    ],
};

pub static RATIOS: EndpointSchema = EndpointSchema {
    endpoint: Endpoint::StockRatios,
    group: FieldGroup::Ratios,
    identifier: IDENTIFIER,
    columns: &[
        (Field::DividendYield, ColumnSpec::named(&["殖利率(%)", "殖利率"])),
        (Field::PeRatio, ColumnSpec::named(&["本益比"])),
        (Field::PbRatio, ColumnSpec::named(&["股價淨值比"])),
    ],
};

pub static FLOWS: EndpointSchema = EndpointSchema {
    endpoint: Endpoint::InstitutionalFlows,
    group: FieldGroup::Flows,
    identifier: IDENTIFIER,
    columns: &[
        (Field::ForeignBuy, ColumnSpec::named(&["外陸資買進股數(不含外資自營商)"])),
        (Field::ForeignSell, ColumnSpec::named(&["外陸資賣出股數(不含外資自營商)"])),
        (Field::ForeignNet, ColumnSpec::named(&["外陸資買賣超股數(不含外資自營商)"])),
        (Field::ForeignDealerBuy, ColumnSpec::named(&["外資自營商買進股數"])),
        (Field::ForeignDealerSell, ColumnSpec::named(&["外資自營商賣出股數"])),
        (Field::ForeignDealerNet, ColumnSpec::named(&["外資自營商買賣超股數"])),
        (Field::InvestmentTrustBuy, ColumnSpec::named(&["投信買進股數"])),
        (Field::InvestmentTrustSell, ColumnSpec::named(&["投信賣出股數"])),
        (Field::InvestmentTrustNet, ColumnSpec::named(&["投信買賣超股數"])),
        (Field::DealerNet, ColumnSpec::named(&["自營商買賣超股數"])),
        (Field::DealerProprietaryBuy, ColumnSpec::named(&["自營商買進股數(自行買賣)"])),
        (Field::DealerProprietarySell, ColumnSpec::named(&["自營商賣出股數(自行買賣)"])),
        (Field::DealerProprietaryNet, ColumnSpec::named(&["自營商買賣超股數(自行買賣)"])),
        (Field::DealerHedgingBuy, ColumnSpec::named(&["自營商買進股數(避險)"])),
        (Field::DealerHedgingSell, ColumnSpec::named(&["自營商賣出股數(避險)"])),
        (Field::DealerHedgingNet, ColumnSpec::named(&["自營商買賣超股數(避險)"])),
        (Field::InstitutionalNet, ColumnSpec::named(&["三大法人買賣超股數"])),
    ],
};

impl EndpointSchema {
    /// 필드 그룹을 채우는 엔드포인트의 스키마.
    pub fn for_group(group: FieldGroup) -> &'static EndpointSchema {
        match group {
            FieldGroup::Prices => &PRICES,
            FieldGroup::Margin => &MARGIN,
            FieldGroup::Ratios => &RATIOS,
            FieldGroup::Flows => &FLOWS,
        }
    }

    /// 선언된 모든 컬럼의 위치를 확인합니다.
    ///
    /// 행이 없는 테이블은 `None`입니다. 행이 있는데 선언된 컬럼이 없으면
    /// `DataError::SchemaMismatch`입니다.
    pub fn resolve(&self, table: &RawTable) -> Result<Option<ResolvedSchema>> {
        if table.len() == 0 {
            return Ok(None);
        }

        let identifier = self.locate(&self.identifier, table)?;
        let columns = self
            .columns
            .iter()
            .map(|(field, spec)| Ok((*field, self.locate(spec, table)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(ResolvedSchema {
            identifier,
            columns,
        }))
    }

    fn locate(&self, spec: &ColumnSpec, table: &RawTable) -> Result<usize> {
        spec.locate(table).ok_or_else(|| DataError::SchemaMismatch {
            endpoint: self.endpoint.code(),
            column: spec.label(),
        })
    }

    /// 테이블에서 종목 행을 찾아 `row`에 이 그룹의 필드를 채웁니다.
    ///
    /// 종목 행이 있으면 `true`, 테이블이 비었거나 종목이 없으면 `false`입니다.
    pub fn extract_into(
        &self,
        table: &RawTable,
        symbol: &str,
        row: &mut InstrumentRow,
    ) -> Result<bool> {
        let Some(resolved) = self.resolve(table)? else {
            return Ok(false);
        };
        let Some(cells) = table.find_row(resolved.identifier, symbol) else {
            return Ok(false);
        };

        for (field, index) in &resolved.columns {
            row.set(*field, parse_cell(&cells[*index]));
        }
        Ok(true)
    }
}

/// 컬럼 위치가 확정된 스키마.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub identifier: usize,
    pub columns: Vec<(Field, usize)>,
}

/// 업스트림 셀을 숫자로 파싱합니다.
///
/// 천 단위 구분자, 공백, `%`, 선행 `+`를 제거합니다. 빈 값, `--`/`---`/`-`,
/// `X` 표시 값과 파싱할 수 없는 값은 `None`입니다.
pub fn parse_cell(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '%')
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '-') || cleaned.starts_with('X') {
        return None;
    }
    cleaned.parse().ok()
}

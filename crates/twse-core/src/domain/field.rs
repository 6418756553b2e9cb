//! 종목 시계열의 필드 정의.
//!
//! 네 개의 엔드포인트(종가, 신용거래, 가치지표, 기관 매매동향)에서 모은 값을
//! 고정된 39개 필드로 열거합니다. 각 필드는 정확히 하나의 [`FieldGroup`]에 속합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 필드 그룹 (데이터를 공급하는 엔드포인트 단위).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    /// 일별 종가 (MI_INDEX)
    Prices,
    /// 신용거래 잔고 (MI_MARGN)
    Margin,
    /// PER / PBR / 배당수익률 (BWIBBU_d)
    Ratios,
    /// 3대 기관 매매동향 (T86)
    Flows,
}

impl FieldGroup {
    /// 조회 순서대로 나열한 전체 그룹.
    pub const ALL: [FieldGroup; 4] = [
        FieldGroup::Prices,
        FieldGroup::Margin,
        FieldGroup::Ratios,
        FieldGroup::Flows,
    ];

    /// 그룹 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldGroup::Prices => "prices",
            FieldGroup::Margin => "margin",
            FieldGroup::Ratios => "ratios",
            FieldGroup::Flows => "flows",
        }
    }

    /// 이 그룹에 속한 필드 목록.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.iter().copied().filter(move |f| f.group() == *self)
    }
}

impl fmt::Display for FieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 종목 행의 개별 필드.
///
/// 선언 순서가 곧 출력 컬럼 순서이며 [`Field::index`]의 기준입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Field {
    // 가격
    Open,
    High,
    Low,
    Close,
    Volume,
    TransactionValue,

    // 융자 (신용매수)
    MarginBuy,
    MarginSell,
    MarginCashRepay,
    MarginPreviousBalance,
    MarginCurrentBalance,
    MarginNextLimit,
    // 대주 (공매도)
    ShortBuy,
    ShortSell,
    ShortStockRepay,
    ShortPreviousBalance,
    ShortCurrentBalance,
    ShortNextLimit,
    /// 융자/대주 상계
    Offset,

    // 가치지표
    DividendYield,
    PeRatio,
    PbRatio,

    // 외국인 (외국계 딜러 제외)
    ForeignBuy,
    ForeignSell,
    ForeignNet,
    // 외국계 딜러
    ForeignDealerBuy,
    ForeignDealerSell,
    ForeignDealerNet,
    // 투신
    InvestmentTrustBuy,
    InvestmentTrustSell,
    InvestmentTrustNet,
    // 딜러 (합계 / 자기매매 / 헤지)
    DealerNet,
    DealerProprietaryBuy,
    DealerProprietarySell,
    DealerProprietaryNet,
    DealerHedgingBuy,
    DealerHedgingSell,
    DealerHedgingNet,
    /// 3대 기관 순매수 합계
    InstitutionalNet,
}

/// 전체 필드 수.
pub const FIELD_COUNT: usize = 39;

impl Field {
    /// 선언 순서대로 나열한 전체 필드.
    pub const ALL: [Field; FIELD_COUNT] = [
        Field::Open,
        Field::High,
        Field::Low,
        Field::Close,
        Field::Volume,
        Field::TransactionValue,
        Field::MarginBuy,
        Field::MarginSell,
        Field::MarginCashRepay,
        Field::MarginPreviousBalance,
        Field::MarginCurrentBalance,
        Field::MarginNextLimit,
        Field::ShortBuy,
        Field::ShortSell,
        Field::ShortStockRepay,
        Field::ShortPreviousBalance,
        Field::ShortCurrentBalance,
        Field::ShortNextLimit,
        Field::Offset,
        Field::DividendYield,
        Field::PeRatio,
        Field::PbRatio,
        Field::ForeignBuy,
        Field::ForeignSell,
        Field::ForeignNet,
        Field::ForeignDealerBuy,
        Field::ForeignDealerSell,
        Field::ForeignDealerNet,
        Field::InvestmentTrustBuy,
        Field::InvestmentTrustSell,
        Field::InvestmentTrustNet,
        Field::DealerNet,
        Field::DealerProprietaryBuy,
        Field::DealerProprietarySell,
        Field::DealerProprietaryNet,
        Field::DealerHedgingBuy,
        Field::DealerHedgingSell,
        Field::DealerHedgingNet,
        Field::InstitutionalNet,
    ];

    /// 행 내부 배열 위치.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 필드가 속한 그룹.
    pub fn group(&self) -> FieldGroup {
        use Field::*;
        match self {
            Open | High | Low | Close | Volume | TransactionValue => FieldGroup::Prices,
            MarginBuy | MarginSell | MarginCashRepay | MarginPreviousBalance
            | MarginCurrentBalance | MarginNextLimit | ShortBuy | ShortSell | ShortStockRepay
            | ShortPreviousBalance | ShortCurrentBalance | ShortNextLimit | Offset => {
                FieldGroup::Margin
            }
            DividendYield | PeRatio | PbRatio => FieldGroup::Ratios,
            _ => FieldGroup::Flows,
        }
    }

    /// 출력 컬럼 이름 (snake_case).
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
            Field::TransactionValue => "transaction_value",
            Field::MarginBuy => "margin_buy",
            Field::MarginSell => "margin_sell",
            Field::MarginCashRepay => "margin_cash_repay",
            Field::MarginPreviousBalance => "margin_previous_balance",
            Field::MarginCurrentBalance => "margin_current_balance",
            Field::MarginNextLimit => "margin_next_limit",
            Field::ShortBuy => "short_buy",
            Field::ShortSell => "short_sell",
            Field::ShortStockRepay => "short_stock_repay",
            Field::ShortPreviousBalance => "short_previous_balance",
            Field::ShortCurrentBalance => "short_current_balance",
            Field::ShortNextLimit => "short_next_limit",
            Field::Offset => "offset",
            Field::DividendYield => "dividend_yield",
            Field::PeRatio => "pe_ratio",
            Field::PbRatio => "pb_ratio",
            Field::ForeignBuy => "foreign_buy",
            Field::ForeignSell => "foreign_sell",
            Field::ForeignNet => "foreign_net",
            Field::ForeignDealerBuy => "foreign_dealer_buy",
            Field::ForeignDealerSell => "foreign_dealer_sell",
            Field::ForeignDealerNet => "foreign_dealer_net",
            Field::InvestmentTrustBuy => "investment_trust_buy",
            Field::InvestmentTrustSell => "investment_trust_sell",
            Field::InvestmentTrustNet => "investment_trust_net",
            Field::DealerNet => "dealer_net",
            Field::DealerProprietaryBuy => "dealer_proprietary_buy",
            Field::DealerProprietarySell => "dealer_proprietary_sell",
            Field::DealerProprietaryNet => "dealer_proprietary_net",
            Field::DealerHedgingBuy => "dealer_hedging_buy",
            Field::DealerHedgingSell => "dealer_hedging_sell",
            Field::DealerHedgingNet => "dealer_hedging_net",
            Field::InstitutionalNet => "institutional_net",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == key)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

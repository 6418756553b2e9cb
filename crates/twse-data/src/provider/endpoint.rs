//! TWSE 엔드포인트 정의.

use std::fmt;

/// 기본 URL.
pub const DEFAULT_BASE_URL: &str = "https://www.twse.com.tw/rwd/zh";

/// `type=ALL` 응답에서 전 종목 시세가 담긴 테이블 위치.
pub const DEFAULT_CLOSING_TABLE_INDEX: usize = 8;

/// TWSE 과거 데이터 엔드포인트.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// 일별 종가 (MI_INDEX)
    ClosingPrices,
    /// 시장 거래 요약 (FMTQIK)
    MarketSummary,
    /// 개별 종목 PER/PBR/배당수익률 (BWIBBU_d)
    StockRatios,
    /// 신용거래 (MI_MARGN)
    MarginTrading,
    /// 3대 법인 매매 (T86)
    InstitutionalFlows,
}

impl Endpoint {
    pub const ALL: [Endpoint; 5] = [
        Endpoint::ClosingPrices,
        Endpoint::MarketSummary,
        Endpoint::StockRatios,
        Endpoint::MarginTrading,
        Endpoint::InstitutionalFlows,
    ];

    /// 업스트림 보고서 코드.
    pub fn code(&self) -> &'static str {
        match self {
            Endpoint::ClosingPrices => "MI_INDEX",
            Endpoint::MarketSummary => "FMTQIK",
            Endpoint::StockRatios => "BWIBBU_d",
            Endpoint::MarginTrading => "MI_MARGN",
            Endpoint::InstitutionalFlows => "T86",
        }
    }

    /// 기본 URL 기준 경로.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ClosingPrices => "/afterTrading/MI_INDEX",
            Endpoint::MarketSummary => "/afterTrading/FMTQIK",
            Endpoint::StockRatios => "/afterTrading/BWIBBU_d",
            Endpoint::MarginTrading => "/marginTrading/MI_MARGN",
            Endpoint::InstitutionalFlows => "/fund/T86",
        }
    }

    /// 선택자 쿼리 파라미터 이름. 시장 요약은 선택자가 없습니다.
    pub fn selector_param(&self) -> Option<&'static str> {
        match self {
            Endpoint::ClosingPrices => Some("type"),
            Endpoint::MarketSummary => None,
            Endpoint::StockRatios | Endpoint::MarginTrading | Endpoint::InstitutionalFlows => {
                Some("selectType")
            }
        }
    }

    pub fn default_selector(&self) -> Option<&'static str> {
        match self {
            Endpoint::ClosingPrices | Endpoint::StockRatios => Some("ALL"),
            Endpoint::MarketSummary => None,
            Endpoint::MarginTrading => Some("STOCK"),
            Endpoint::InstitutionalFlows => Some("ALLBUT0999"),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_params() {
        assert_eq!(Endpoint::ClosingPrices.selector_param(), Some("type"));
        assert_eq!(Endpoint::MarketSummary.selector_param(), None);
        assert_eq!(Endpoint::MarketSummary.default_selector(), None);
        assert_eq!(
            Endpoint::InstitutionalFlows.default_selector(),
            Some("ALLBUT0999")
        );
        for endpoint in Endpoint::ALL {
            assert_eq!(
                endpoint.selector_param().is_some(),
                endpoint.default_selector().is_some()
            );
            assert!(endpoint.path().ends_with(endpoint.code()));
        }
    }
}

//! Ticker 다운로드 통합 테스트.
//!
//! mockito 서버로 네 엔드포인트를 흉내 내고 public API만 사용합니다:
//! - Ticker::download()
//! - Ticker::series()
//! - TwseClient::with_cache()

use chrono::NaiveDate;
use mockito::{Matcher, Mock, ServerGuard};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use twse_core::{Field, FieldGroup, StockCode, FIELD_COUNT};
use twse_data::{
    DataError, HolidayCalendar, RateLimiter, Ticker, TradingCalendarWalker, TwseClient,
};

// ============================================================================
// 테스트 헬퍼 함수
// ============================================================================

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, day).unwrap()
}

fn client(server: &ServerGuard) -> Arc<TwseClient> {
    Arc::new(
        TwseClient::new(Arc::new(RateLimiter::disabled()))
            .unwrap()
            .with_base_url(server.url()),
    )
}

fn ticker(symbol: &str, client: Arc<TwseClient>) -> Ticker {
    let walker = TradingCalendarWalker::new(Arc::new(HolidayCalendar::new(
        "XTAI",
        Vec::<NaiveDate>::new(),
    )));
    Ticker::new(StockCode::parse(symbol).unwrap(), client, walker)
}

fn closing_payload() -> Value {
    let mut tables: Vec<Value> = (0..8)
        .map(|i| json!({ "title": format!("table {}", i), "fields": [], "data": [] }))
        .collect();
    tables.push(json!({
        "title": "每日收盤行情(全部)",
        "fields": [
            "證券代號", "證券名稱", "成交股數", "成交筆數", "成交金額", "開盤價",
            "最高價", "最低價", "收盤價", "漲跌(+/-)", "漲跌價差", "最後揭示買價",
            "最後揭示買量", "最後揭示賣價", "最後揭示賣量", "本益比"
        ],
        "data": [
            ["2317", "鴻海", "20,000,000", "9,000", "2,000,000,000", "100.00", "101.00",
             "99.50", "100.50", "<p style= color:red>+</p>", "0.50", "100.00", "10",
             "100.50", "20", "10.50"],
            ["2330", "台積電", "30,123,456", "40,000", "15,600,000,000", "518.00", "524.00",
             "517.00", "523.00", "<p style= color:green>-</p>", "2.00", "522.00", "100",
             "523.00", "200", "15.20"]
        ]
    }));
    json!({ "stat": "OK", "tables": tables })
}

fn margin_payload() -> Value {
    json!({
        "stat": "OK",
        "tables": [
            {
                "fields": ["項目", "買進", "賣出", "現金(券)償還", "前日餘額", "今日餘額"],
                "data": [["融資(交易單位)", "1", "2", "3", "4", "5"]]
            },
            {
                "fields": [
                    "代號", "名稱", "買進", "賣出", "現金償還", "前日餘額", "今日餘額", "限額",
                    "買進", "賣出", "現券償還", "前日餘額", "今日餘額", "限額", "資券互抵", "註記"
                ],
                "data": [
                    ["2330", "台積電", "1,200", "800", "10", "20,000", "20,390", "6,483,000",
                     "30", "45", "0", "500", "515", "6,483,000", "3", " "]
                ]
            }
        ]
    })
}

fn ratios_payload() -> Value {
    json!({
        "stat": "OK",
        "fields": ["證券代號", "證券名稱", "殖利率(%)", "股利年度", "本益比", "股價淨值比", "財報年/季"],
        "data": [["2330", "台積電", "2.10", "111", "15.20", "5.30", "112/1"]]
    })
}

fn flows_payload(symbols: &[&str]) -> Value {
    let data: Vec<Value> = symbols
        .iter()
        .map(|symbol| {
            json!([
                symbol, "名稱",
                "10,000", "4,000", "6,000",
                "0", "0", "0",
                "1,000", "500", "500",
                "-200",
                "100", "200", "-100",
                "50", "150", "-100",
                "6,300"
            ])
        })
        .collect();

    json!({
        "stat": "OK",
        "fields": [
            "證券代號", "證券名稱",
            "外陸資買進股數(不含外資自營商)", "外陸資賣出股數(不含外資自營商)", "外陸資買賣超股數(不含外資自營商)",
            "外資自營商買進股數", "外資自營商賣出股數", "外資自營商買賣超股數",
            "投信買進股數", "投信賣出股數", "投信買賣超股數",
            "自營商買賣超股數",
            "自營商買進股數(自行買賣)", "自營商賣出股數(自行買賣)", "自營商買賣超股數(自行買賣)",
            "自營商買進股數(避險)", "自營商賣出股數(避險)", "自營商買賣超股數(避險)",
            "三大法人買賣超股數"
        ],
        "data": data
    })
}

fn on_date(date: &str) -> Matcher {
    Matcher::UrlEncoded("date".into(), date.into())
}

async fn mock_json(server: &mut ServerGuard, path: &str, query: Matcher, body: &Value) -> Mock {
    server
        .mock("GET", path)
        .match_query(query)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

/// 네 엔드포인트 모두 모든 날짜에 2330 행을 돌려주는 서버.
async fn mock_full_market(server: &mut ServerGuard) -> Vec<Mock> {
    vec![
        mock_json(server, "/afterTrading/MI_INDEX", Matcher::Any, &closing_payload()).await,
        mock_json(server, "/marginTrading/MI_MARGN", Matcher::Any, &margin_payload()).await,
        mock_json(server, "/afterTrading/BWIBBU_d", Matcher::Any, &ratios_payload()).await,
        mock_json(server, "/fund/T86", Matcher::Any, &flows_payload(&["2330"])).await,
    ]
}

// ============================================================================
// 테스트
// ============================================================================

#[tokio::test]
async fn test_download_first_week_of_june() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_full_market(&mut server).await;

    let mut ticker = ticker("2330", client(&server));
    let summary = ticker.download(d(1), d(5), None).await.unwrap();

    assert_eq!(summary.trading_days, 3);
    assert_eq!(summary.inserted, 3);
    assert!(summary.is_complete());

    let series = ticker.series();
    let dates: Vec<_> = series.dates().collect();
    assert_eq!(dates, vec![d(1), d(2), d(5)]);
    assert!(dates.windows(2).all(|w| w[0] < w[1]));

    for row in series.rows() {
        assert!(row.is_complete(), "missing on {}: {:?}", row.date(), row.missing_fields());
        assert_eq!(row.iter().count(), FIELD_COUNT);
    }

    let first = series.get(d(1)).unwrap();
    assert_eq!(first.get(Field::Close), Some(dec!(523.00)));
    assert_eq!(first.get(Field::Volume), Some(dec!(30123456)));
    assert_eq!(first.get(Field::TransactionValue), Some(dec!(15600000000)));
    assert_eq!(first.get(Field::MarginBuy), Some(dec!(1200)));
    assert_eq!(first.get(Field::ShortBuy), Some(dec!(30)));
    assert_eq!(first.get(Field::PbRatio), Some(dec!(5.30)));
    assert_eq!(first.get(Field::DealerNet), Some(dec!(-200)));
    assert_eq!(first.get(Field::InstitutionalNet), Some(dec!(6300)));
}

#[tokio::test]
async fn test_overlapping_download_does_not_duplicate() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_full_market(&mut server).await;

    let mut ticker = ticker("2330", client(&server));
    ticker.download(d(1), d(5), None).await.unwrap();
    let summary = ticker.download(d(2), d(6), None).await.unwrap();

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.updated, 2);

    let dates: Vec<_> = ticker.series().dates().collect();
    assert_eq!(dates, vec![d(1), d(2), d(5), d(6)]);
}

#[tokio::test]
async fn test_missing_flows_row_keeps_day() {
    let mut server = mockito::Server::new_async().await;
    let _closing =
        mock_json(&mut server, "/afterTrading/MI_INDEX", Matcher::Any, &closing_payload()).await;
    let _margin =
        mock_json(&mut server, "/marginTrading/MI_MARGN", Matcher::Any, &margin_payload()).await;
    let _ratios =
        mock_json(&mut server, "/afterTrading/BWIBBU_d", Matcher::Any, &ratios_payload()).await;
    let _flows_1 =
        mock_json(&mut server, "/fund/T86", on_date("20230601"), &flows_payload(&["2330"])).await;
    let _flows_2 =
        mock_json(&mut server, "/fund/T86", on_date("20230602"), &flows_payload(&["2317"])).await;

    let mut ticker = ticker("2330", client(&server));
    let summary = ticker.download(d(1), d(2), None).await.unwrap();

    assert_eq!(summary.missing, vec![(d(2), FieldGroup::Flows)]);

    let day = ticker.series().get(d(2)).unwrap();
    assert!(day.has_group(FieldGroup::Prices));
    assert!(day.has_group(FieldGroup::Margin));
    assert!(day.has_group(FieldGroup::Ratios));
    for field in FieldGroup::Flows.fields() {
        assert_eq!(day.get(field), None, "{} should be empty", field);
    }
    assert!(ticker.series().get(d(1)).unwrap().is_complete());
}

#[tokio::test]
async fn test_request_failure_aborts_and_keeps_earlier_dates() {
    let mut server = mockito::Server::new_async().await;
    let _closing =
        mock_json(&mut server, "/afterTrading/MI_INDEX", Matcher::Any, &closing_payload()).await;
    let _margin =
        mock_json(&mut server, "/marginTrading/MI_MARGN", Matcher::Any, &margin_payload()).await;
    let _flows =
        mock_json(&mut server, "/fund/T86", Matcher::Any, &flows_payload(&["2330"])).await;
    let _ratios_ok =
        mock_json(&mut server, "/afterTrading/BWIBBU_d", on_date("20230601"), &ratios_payload())
            .await;
    let _ratios_down = server
        .mock("GET", "/afterTrading/BWIBBU_d")
        .match_query(on_date("20230602"))
        .with_status(500)
        .create_async()
        .await;

    let mut ticker = ticker("2330", client(&server));
    let err = ticker.download(d(1), d(5), None).await.unwrap_err();

    match err {
        DataError::RequestFailed {
            endpoint,
            date,
            status,
            ..
        } => {
            assert_eq!(endpoint, "BWIBBU_d");
            assert_eq!(date, d(2));
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let dates: Vec<_> = ticker.series().dates().collect();
    assert_eq!(dates, vec![d(1)]);
}

#[tokio::test]
async fn test_flows_selector_is_forwarded() {
    let mut server = mockito::Server::new_async().await;
    let _closing =
        mock_json(&mut server, "/afterTrading/MI_INDEX", Matcher::Any, &closing_payload()).await;
    let _margin =
        mock_json(&mut server, "/marginTrading/MI_MARGN", Matcher::Any, &margin_payload()).await;
    let _ratios =
        mock_json(&mut server, "/afterTrading/BWIBBU_d", Matcher::Any, &ratios_payload()).await;
    let flows = mock_json(
        &mut server,
        "/fund/T86",
        Matcher::UrlEncoded("selectType".into(), "24".into()),
        &flows_payload(&["2330"]),
    )
    .await;

    let mut ticker = ticker("2330", client(&server));
    ticker.download(d(1), d(1), Some("24")).await.unwrap();

    flows.assert_async().await;
}

#[tokio::test]
async fn test_shared_cached_client_fetches_each_day_once() {
    let mut server = mockito::Server::new_async().await;
    let closing = server
        .mock("GET", "/afterTrading/MI_INDEX")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(closing_payload().to_string())
        .expect(2)
        .create_async()
        .await;
    let _margin =
        mock_json(&mut server, "/marginTrading/MI_MARGN", Matcher::Any, &margin_payload()).await;
    let _ratios =
        mock_json(&mut server, "/afterTrading/BWIBBU_d", Matcher::Any, &ratios_payload()).await;
    let _flows = mock_json(
        &mut server,
        "/fund/T86",
        Matcher::Any,
        &flows_payload(&["2330", "2317"]),
    )
    .await;

    let shared = Arc::new(
        TwseClient::new(Arc::new(RateLimiter::disabled()))
            .unwrap()
            .with_base_url(server.url())
            .with_cache(true),
    );

    let mut tsmc = ticker("2330", Arc::clone(&shared));
    let mut foxconn = ticker("2317", Arc::clone(&shared));
    tsmc.download(d(1), d(2), None).await.unwrap();
    let summary = foxconn.download(d(1), d(2), None).await.unwrap();

    closing.assert_async().await;
    assert_eq!(shared.cached_tables(), 8);
    assert_eq!(
        foxconn.series().get(d(1)).unwrap().get(Field::Close),
        Some(dec!(100.50))
    );
    // 2317은 신용거래/가치지표 테이블에 없음
    assert!(summary.missing.contains(&(d(1), FieldGroup::Margin)));
    assert!(summary.missing.contains(&(d(2), FieldGroup::Ratios)));
}

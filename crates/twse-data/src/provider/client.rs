//! TWSE 엔드포인트 HTTP 클라이언트.
//!
//! 모든 요청은 공유 `RateLimiter`를 거치며, 요청마다 URL/파라미터/상태 코드를
//! `info` 레벨로 기록합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use twse_data::{EndpointQuery, RateLimiter, TwseClient, DEFAULT_CLOSING_TABLE_INDEX};
//!
//! let limiter = Arc::new(RateLimiter::default());
//! let client = TwseClient::new(limiter)?;
//!
//! let date = chrono::NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
//! let table = client
//!     .daily_closing_prices(&EndpointQuery::new(date), DEFAULT_CLOSING_TABLE_INDEX)
//!     .await?;
//! ```

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use twse_core::{format_query_date, HttpConfig};

use super::endpoint::{Endpoint, DEFAULT_CLOSING_TABLE_INDEX};
use super::normalize;
use crate::error::{DataError, Result};
use crate::rate_limiter::RateLimiter;
use crate::table::RawTable;

/// 프록시 설정.
///
/// 단일 URL은 `{https: url}`로, `https` 키를 가진 맵은 `{https: 해당 값}`으로
/// 정규화되며, 그 밖의 맵은 그대로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProxySetting {
    Url(String),
    Map(BTreeMap<String, String>),
}

impl ProxySetting {
    /// 스킴 → 프록시 URL 맵으로 정규화합니다.
    pub fn normalize(&self) -> BTreeMap<String, String> {
        match self {
            ProxySetting::Url(url) => BTreeMap::from([("https".to_string(), url.clone())]),
            ProxySetting::Map(map) => match map.get("https") {
                Some(https) => BTreeMap::from([("https".to_string(), https.clone())]),
                None => map.clone(),
            },
        }
    }

    /// 설정 파일의 `[http.proxy]` 맵. 비어 있으면 `None`입니다.
    pub fn from_map(map: &BTreeMap<String, String>) -> Option<Self> {
        if map.is_empty() {
            None
        } else {
            Some(ProxySetting::Map(map.clone()))
        }
    }
}

impl From<&str> for ProxySetting {
    fn from(url: &str) -> Self {
        ProxySetting::Url(url.to_string())
    }
}

impl From<String> for ProxySetting {
    fn from(url: String) -> Self {
        ProxySetting::Url(url)
    }
}

impl From<BTreeMap<String, String>> for ProxySetting {
    fn from(map: BTreeMap<String, String>) -> Self {
        ProxySetting::Map(map)
    }
}

/// 단일 날짜 엔드포인트 쿼리.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointQuery {
    /// 거래일
    pub date: NaiveDate,
    /// 선택자 (`type`/`selectType` 값). 없으면 엔드포인트 기본값
    pub selector: Option<String>,
    /// 요청별 프록시. 없으면 클라이언트 기본 프록시
    pub proxy: Option<ProxySetting>,
}

impl EndpointQuery {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            selector: None,
            proxy: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<ProxySetting>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    endpoint: Endpoint,
    date: NaiveDate,
    selector: Option<String>,
    table_index: usize,
}

/// HTTP 클라이언트 생성 설정.
#[derive(Debug, Clone)]
struct ClientSettings {
    timeout: Duration,
    user_agent: String,
    accept_language: String,
}

impl ClientSettings {
    fn build(&self, proxy: Option<&BTreeMap<String, String>>) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&self.accept_language)
                .map_err(|e| DataError::Config(format!("invalid Accept-Language: {}", e)))?,
        );

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        for (scheme, url) in proxy.into_iter().flatten() {
            let proxy = match scheme.as_str() {
                "https" => reqwest::Proxy::https(url.as_str()),
                "http" => reqwest::Proxy::http(url.as_str()),
                "all" => reqwest::Proxy::all(url.as_str()),
                other => {
                    tracing::warn!(scheme = other, "지원하지 않는 프록시 스킴, 무시합니다");
                    continue;
                }
            }
            .map_err(|e| DataError::Config(format!("invalid proxy {}: {}", url, e)))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| DataError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))
    }
}

/// TWSE 엔드포인트 클라이언트.
#[derive(Debug)]
pub struct TwseClient {
    http: reqwest::Client,
    settings: ClientSettings,
    base_url: String,
    limiter: Arc<RateLimiter>,
    default_proxy: Option<ProxySetting>,
    proxied: Mutex<HashMap<BTreeMap<String, String>, reqwest::Client>>,
    cache: Option<Mutex<HashMap<CacheKey, RawTable>>>,
}

impl TwseClient {
    /// 기본 HTTP 설정으로 클라이언트를 생성합니다.
    pub fn new(limiter: Arc<RateLimiter>) -> Result<Self> {
        Self::from_config(&HttpConfig::default(), limiter)
    }

    /// 설정 파일의 `[http]` 섹션으로 클라이언트를 생성합니다.
    pub fn from_config(config: &HttpConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let settings = ClientSettings {
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        };

        Ok(Self {
            http: settings.build(None)?,
            settings,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
            default_proxy: ProxySetting::from_map(&config.proxy),
            proxied: Mutex::new(HashMap::new()),
            cache: None,
        })
    }

    /// 기본 URL을 변경합니다.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// 정규화된 테이블의 메모리 캐시를 켜거나 끕니다.
    ///
    /// 캐시 적중 시 HTTP 요청과 속도 제한 대기를 모두 건너뜁니다.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled.then(|| Mutex::new(HashMap::new()));
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<ProxySetting>) -> Self {
        self.default_proxy = Some(proxy.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// 캐시된 테이블 수. 캐시가 꺼져 있으면 0입니다.
    pub fn cached_tables(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.lock().unwrap_or_else(|e| e.into_inner()).len())
            .unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }

    /// 일별 종가 (MI_INDEX). `table_index`는 응답의 `tables` 위치입니다.
    pub async fn daily_closing_prices(
        &self,
        query: &EndpointQuery,
        table_index: usize,
    ) -> Result<RawTable> {
        self.request(Endpoint::ClosingPrices, query, table_index)
            .await
    }

    /// 시장 거래 요약 (FMTQIK). 선택자는 무시됩니다.
    pub async fn market_trading_info(&self, query: &EndpointQuery) -> Result<RawTable> {
        self.request(Endpoint::MarketSummary, query, 0).await
    }

    /// 종목별 배당수익률/PER/PBR (BWIBBU_d).
    pub async fn daily_stock_ratios(&self, query: &EndpointQuery) -> Result<RawTable> {
        self.request(Endpoint::StockRatios, query, 0).await
    }

    /// 종목별 신용거래 (MI_MARGN). `Date` 키 컬럼이 추가됩니다.
    pub async fn margin_trading(&self, query: &EndpointQuery) -> Result<RawTable> {
        self.request(Endpoint::MarginTrading, query, 0).await
    }

    /// 3대 법인 매매 (T86).
    pub async fn institutional_trading(&self, query: &EndpointQuery) -> Result<RawTable> {
        self.request(Endpoint::InstitutionalFlows, query, 0).await
    }

    /// 엔드포인트를 지정해 조회합니다. 종가는 기본 테이블 위치를 사용합니다.
    pub async fn fetch(&self, endpoint: Endpoint, query: &EndpointQuery) -> Result<RawTable> {
        let table_index = match endpoint {
            Endpoint::ClosingPrices => DEFAULT_CLOSING_TABLE_INDEX,
            _ => 0,
        };
        self.request(endpoint, query, table_index).await
    }

    async fn request(
        &self,
        endpoint: Endpoint,
        query: &EndpointQuery,
        table_index: usize,
    ) -> Result<RawTable> {
        let selector = endpoint.selector_param().and_then(|_| {
            query
                .selector
                .clone()
                .or_else(|| endpoint.default_selector().map(str::to_string))
        });
        let key = CacheKey {
            endpoint,
            date: query.date,
            selector: selector.clone(),
            table_index,
        };

        if let Some(table) = self.cached(&key) {
            tracing::debug!(endpoint = endpoint.code(), date = %query.date, "캐시 적중");
            return Ok(table);
        }

        self.limiter.acquire().await;

        let http = self.client_for(query.proxy.as_ref().or(self.default_proxy.as_ref()))?;
        let url = format!("{}{}", self.base_url, endpoint.path());

        let mut params: Vec<(&str, String)> = vec![("date", format_query_date(query.date))];
        if let (Some(param), Some(value)) = (endpoint.selector_param(), &selector) {
            params.push((param, value.clone()));
        }
        params.push(("response", "json".to_string()));

        let response = http.get(&url).query(&params).send().await?;
        let status = response.status();

        tracing::info!(
            url = %url,
            params = ?params,
            status_code = status.as_u16(),
            "TWSE 요청"
        );

        if status != StatusCode::OK {
            return Err(DataError::RequestFailed {
                endpoint: endpoint.code(),
                date: query.date,
                selector,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body).map_err(|e| DataError::Decode {
            endpoint: endpoint.code(),
            date: query.date,
            message: e.to_string(),
            body: body.clone(),
        })?;

        let table = normalize::normalize(endpoint, &payload, query.date, table_index)?;
        tracing::debug!(
            endpoint = endpoint.code(),
            date = %query.date,
            rows = table.len(),
            "응답 정규화 완료"
        );

        if let Some(cache) = &self.cache {
            cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key, table.clone());
        }
        Ok(table)
    }

    fn cached(&self, key: &CacheKey) -> Option<RawTable> {
        self.cache
            .as_ref()?
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// 프록시별 HTTP 클라이언트. 프록시마다 한 번만 생성합니다.
    fn client_for(&self, proxy: Option<&ProxySetting>) -> Result<reqwest::Client> {
        let Some(proxy) = proxy else {
            return Ok(self.http.clone());
        };

        let normalized = proxy.normalize();
        let mut proxied = self.proxied.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = proxied.get(&normalized) {
            return Ok(client.clone());
        }

        let client = self.settings.build(Some(&normalized))?;
        proxied.insert(normalized, client.clone());
        Ok(client)
    }
}

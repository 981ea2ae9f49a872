//! The quote adapter: symbol resolution, request dispatch, envelope
//! validation and record normalization.

use std::sync::{Arc, OnceLock};

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AdapterConfig;
use crate::envelope::{normalize_candles, normalize_quote, Envelope};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{
    resolve, AdapterError, CandleRecord, DepthLadder, DetailRecord, Interval, QuoteRecord,
    ResolvedSymbol,
};

const QUOTE_PATH: &str = "/stock/quote";
const KLINE_PATH: &str = "/stock/kline";
pub const DEFAULT_CANDLE_LIMIT: usize = 100;

/// Parameters for [`QuoteAdapter::fetch_candles`].
///
/// `interval_code` is forwarded verbatim as the upstream `kType`; use
/// [`Interval::code`] for the documented values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    pub symbol: String,
    pub interval_code: String,
    pub limit: usize,
    /// Upper bound of the series in epoch milliseconds.
    pub end_time: Option<i64>,
}

impl CandleRequest {
    pub fn new(symbol: impl Into<String>, interval_code: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            interval_code: interval_code.into(),
            limit: DEFAULT_CANDLE_LIMIT,
            end_time: None,
        }
    }

    /// Candles for a named period, sent as its upstream code.
    pub fn for_interval(symbol: impl Into<String>, interval: Interval) -> Self {
        Self::new(symbol, interval.code())
    }

    /// Daily candles, the upstream default period.
    pub fn daily(symbol: impl Into<String>) -> Self {
        Self::for_interval(symbol, Interval::OneDay)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_end_time(mut self, end_time: i64) -> Self {
        self.end_time = Some(end_time);
        self
    }
}

/// Normalizes upstream quote and candle data into canonical records.
///
/// Stateless between calls. Construct one and pass it by reference, or use
/// [`QuoteAdapter::shared`] for a process-wide instance built from the
/// environment.
#[derive(Clone)]
pub struct QuoteAdapter {
    config: AdapterConfig,
    http_client: Arc<dyn HttpClient>,
}

impl Default for QuoteAdapter {
    fn default() -> Self {
        Self::new(AdapterConfig::from_env())
    }
}

impl QuoteAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::default()))
    }

    pub fn with_http_client(config: AdapterConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Lazily-built instance configured by [`AdapterConfig::from_env`].
    pub fn shared() -> &'static QuoteAdapter {
        static SHARED: OnceLock<QuoteAdapter> = OnceLock::new();
        SHARED.get_or_init(QuoteAdapter::default)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Fetch and normalize a single quote.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::InvalidSymbol`] when the symbol is not a 6-digit code
    /// - [`AdapterError::Upstream`] when the envelope reports a failure or is malformed
    /// - [`AdapterError::Transport`] on network failure, timeout or non-2xx status
    pub async fn fetch_quote(&self, symbol: &str) -> Result<QuoteRecord, AdapterError> {
        let resolved = resolve(symbol)?;
        let request = self.request(QUOTE_PATH, &resolved);

        let data = self.execute(request).await?;
        normalize_quote(symbol, resolved, data)
    }

    /// Fetch every symbol concurrently. Failed symbols are logged and left
    /// out; the successful records keep their input order.
    pub async fn fetch_batch<S>(&self, symbols: &[S]) -> Vec<QuoteRecord>
    where
        S: AsRef<str>,
    {
        let branches = symbols.iter().map(|symbol| async move {
            let symbol = symbol.as_ref();
            match self.fetch_quote(symbol).await {
                Ok(quote) => Some(quote),
                Err(error) => {
                    warn!(
                        symbol,
                        code = error.code(),
                        error = %error,
                        "quote fetch failed; omitting symbol from batch"
                    );
                    None
                }
            }
        });

        join_all(branches).await.into_iter().flatten().collect()
    }

    /// Fetch OHLCV candles in upstream order.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`fetch_quote`](Self::fetch_quote). A `null` payload
    /// yields an empty series.
    pub async fn fetch_candles(
        &self,
        request: &CandleRequest,
    ) -> Result<Vec<CandleRecord>, AdapterError> {
        let resolved = resolve(&request.symbol)?;
        let mut http_request = self
            .request(KLINE_PATH, &resolved)
            .with_query("kType", &request.interval_code)
            .with_query("limit", request.limit);
        if let Some(end_time) = request.end_time {
            http_request = http_request.with_query("et", end_time);
        }

        let data = self.execute(http_request).await?;
        normalize_candles(data)
    }

    /// Quote plus a synthetic depth ladder. Turnover rate and valuation ratio
    /// are reported as unavailable.
    pub async fn fetch_detail(&self, symbol: &str) -> Result<DetailRecord, AdapterError> {
        let quote = self.fetch_quote(symbol).await?;
        let mut rng = fastrand::Rng::new();
        let depth = DepthLadder::synthetic(quote.current_price, &mut rng);
        Ok(DetailRecord::new(quote, depth))
    }

    /// Liveness signal: `true` when the probe symbol can be fetched.
    pub async fn check_connection(&self) -> bool {
        match self.fetch_quote(&self.config.probe_symbol).await {
            Ok(_) => true,
            Err(error) => {
                warn!(
                    probe_symbol = %self.config.probe_symbol,
                    code = error.code(),
                    error = %error,
                    "upstream connectivity check failed"
                );
                false
            }
        }
    }

    fn request(&self, path: &str, resolved: &ResolvedSymbol) -> HttpRequest {
        HttpRequest::get(self.config.endpoint(path))
            .with_header("accept", "application/json")
            .with_auth(&self.config.auth())
            .with_timeout_ms(self.config.timeout_ms)
            .with_query("region", resolved.exchange().region())
            .with_query("code", resolved.code())
    }

    async fn execute(&self, request: HttpRequest) -> Result<Value, AdapterError> {
        debug!(
            url = %request.url,
            region = ?request.query_param("region"),
            code = ?request.query_param("code"),
            "dispatching upstream request"
        );

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(AdapterError::Transport {
                message: format!("upstream returned status {}", response.status),
                retryable: status_is_retryable(response.status),
            });
        }

        Envelope::parse(&response.body)?.into_data()
    }
}

/// Client errors cannot succeed on retry, except request timeout and rate limiting.
fn status_is_retryable(status: u16) -> bool {
    !(400..500).contains(&status) || status == 408 || status == 429
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::{AdapterErrorKind, Exchange};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn returning(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn json(body: &str) -> Self {
            Self::returning(Ok(HttpResponse::ok_json(body)))
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn adapter(client: Arc<RecordingHttpClient>) -> QuoteAdapter {
        let config = AdapterConfig::default()
            .with_base_url("https://upstream.test")
            .with_token("token-123");
        QuoteAdapter::with_http_client(config, client)
    }

    #[tokio::test]
    async fn quote_request_carries_region_code_and_token() {
        let client = Arc::new(RecordingHttpClient::json(r#"{"code":0,"data":{"ld":"1"}}"#));
        adapter(client.clone())
            .fetch_quote("sz000001")
            .await
            .expect("quote should succeed");

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://upstream.test/stock/quote");
        assert_eq!(requests[0].query_param("region"), Some("SZ"));
        assert_eq!(requests[0].query_param("code"), Some("000001"));
        assert_eq!(
            requests[0].headers.get("token").map(String::as_str),
            Some("token-123")
        );
        assert_eq!(requests[0].timeout_ms, 10_000);
    }

    #[tokio::test]
    async fn invalid_symbol_never_reaches_transport() {
        let client = Arc::new(RecordingHttpClient::json(r#"{"code":0,"data":{}}"#));
        let error = adapter(client.clone())
            .fetch_quote("12AB56")
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), AdapterErrorKind::InvalidSymbol);
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let client = Arc::new(RecordingHttpClient::returning(Ok(HttpResponse {
            status: 503,
            body: String::from("unavailable"),
        })));
        let error = adapter(client)
            .fetch_quote("600519")
            .await
            .expect_err("must fail");

        assert_eq!(error.kind(), AdapterErrorKind::Transport);
        assert!(error.retryable());
    }

    #[tokio::test]
    async fn client_error_status_is_not_retryable_except_timeout_and_throttling() {
        for (status, retryable) in [
            (400, false),
            (401, false),
            (403, false),
            (404, false),
            (408, true),
            (429, true),
            (500, true),
            (502, true),
        ] {
            let client = Arc::new(RecordingHttpClient::returning(Ok(HttpResponse {
                status,
                body: String::new(),
            })));
            let error = adapter(client)
                .fetch_quote("600519")
                .await
                .expect_err("must fail");

            assert_eq!(error.kind(), AdapterErrorKind::Transport, "{status}");
            assert_eq!(error.retryable(), retryable, "{status}");
            assert!(error.to_string().contains(&status.to_string()));
        }
    }

    #[tokio::test]
    async fn candle_request_forwards_interval_limit_and_end_time() {
        let client = Arc::new(RecordingHttpClient::json(r#"{"code":0,"data":[]}"#));
        let request = CandleRequest::new("600519", "5")
            .with_limit(20)
            .with_end_time(1_704_067_200_000);

        let candles = adapter(client.clone())
            .fetch_candles(&request)
            .await
            .expect("candles should succeed");
        assert!(candles.is_empty());

        let requests = client.recorded_requests();
        assert_eq!(requests[0].url, "https://upstream.test/stock/kline");
        assert_eq!(requests[0].query_param("region"), Some("SH"));
        assert_eq!(requests[0].query_param("kType"), Some("5"));
        assert_eq!(requests[0].query_param("limit"), Some("20"));
        assert_eq!(requests[0].query_param("et"), Some("1704067200000"));
    }

    #[tokio::test]
    async fn candle_request_defaults_to_daily_hundred_without_end_time() {
        let client = Arc::new(RecordingHttpClient::json(r#"{"code":0,"data":null}"#));
        adapter(client.clone())
            .fetch_candles(&CandleRequest::daily("300750"))
            .await
            .expect("candles should succeed");

        let requests = client.recorded_requests();
        assert_eq!(requests[0].query_param("kType"), Some("8"));
        assert_eq!(requests[0].query_param("limit"), Some("100"));
        assert_eq!(requests[0].query_param("et"), None);
    }

    #[tokio::test]
    async fn detail_flags_depth_as_synthetic() {
        let client = Arc::new(RecordingHttpClient::json(
            r#"{"code":0,"data":{"ld":"10.50","v":"200"}}"#,
        ));
        let detail = adapter(client)
            .fetch_detail("600519")
            .await
            .expect("detail should succeed");

        assert!(detail.depth.is_synthetic);
        assert!((detail.amount - 2_100.0).abs() < 1e-9);
        assert_eq!(detail.quote.resolved.exchange(), Exchange::Shanghai);
        assert_eq!(detail.turnover_rate.value(), None);
        assert_eq!(detail.valuation_ratio.value(), None);
    }

    #[tokio::test]
    async fn probe_uses_configured_symbol() {
        let client = Arc::new(RecordingHttpClient::json(r#"{"code":0,"data":{"ld":1}}"#));
        let config = AdapterConfig::default().with_probe_symbol("601318");
        let adapter = QuoteAdapter::with_http_client(config, client.clone());

        assert!(adapter.check_connection().await);
        assert_eq!(
            client.recorded_requests()[0].query_param("code"),
            Some("601318")
        );
    }

    #[test]
    fn named_interval_is_sent_as_upstream_code_not_label() {
        let request = CandleRequest::for_interval("600519", Interval::OneWeek);
        assert_eq!(request.interval_code, "9");
        assert_ne!(request.interval_code, Interval::OneWeek.to_string());
        assert_eq!(CandleRequest::daily("600519").interval_code, "8");
    }
}

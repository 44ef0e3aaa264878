//! Daily close history from the Yahoo Finance chart endpoint.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; drawdown-watch/1.0)";

#[async_trait]
pub trait PriceSource {
    /// Time-ordered daily unadjusted closes. `Ok(vec![])` when the provider has no data.
    async fn daily_closes(&self, symbol: &str, lookback_years: u32)
        -> Result<Vec<f64>, FetchError>;
}

pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: Option<String>) -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url, FetchError> {
        // url leaves '^' alone in path segments; Yahoo index symbols want it encoded
        let encoded = symbol.trim().replace('^', "%5E");
        let raw = format!(
            "{}/v8/finance/chart/{}",
            self.base_url.trim_end_matches('/'),
            encoded
        );
        Url::parse(&raw).map_err(|e| FetchError::Url(e.to_string()))
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn daily_closes(
        &self,
        symbol: &str,
        lookback_years: u32,
    ) -> Result<Vec<f64>, FetchError> {
        let url = self.chart_url(symbol)?;
        let range = format!("{}y", lookback_years);
        debug!("GET {} range={}", url, range);

        let resp = self
            .client
            .get(url)
            .query(&[
                ("range", range.as_str()),
                ("interval", "1d"),
                ("includeAdjustedClose", "false"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        let parsed = serde_json::from_str::<ChartResponse>(&body);

        // Unknown symbols come back as 404 with an error object in the body
        if let Ok(ChartResponse {
            chart: Chart { error: Some(e), .. },
        }) = &parsed
        {
            return Err(FetchError::Provider {
                code: e.code.clone(),
                description: e.description.clone(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        let parsed = parsed.map_err(|e| FetchError::Provider {
            code: "decode".into(),
            description: e.to_string(),
        })?;
        Ok(parsed.into_closes())
    }
}

// ---------- Wire format ----------

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Closes of the first result with null (holiday / halted) entries dropped.
    fn into_closes(self) -> Vec<f64> {
        self.chart
            .result
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.indicators.quote.into_iter().next())
            .map(|q| {
                q.close
                    .into_iter()
                    .flatten()
                    .filter(|c| c.is_finite())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> ChartResponse {
        serde_json::from_str(s).expect("valid chart json")
    }

    #[test]
    fn closes_in_order_without_nulls() {
        let r = decode(
            r#"{"chart":{"result":[{"meta":{"symbol":"TSLA"},"timestamp":[1,2,3,4],
                "indicators":{"quote":[{"open":[1,2,3,4],"close":[10.5,null,12.25,11.0]}]}}],
                "error":null}}"#,
        );
        assert_eq!(r.into_closes(), vec![10.5, 12.25, 11.0]);
    }

    #[test]
    fn empty_result_is_empty_series() {
        assert!(decode(r#"{"chart":{"result":[],"error":null}}"#)
            .into_closes()
            .is_empty());
        assert!(decode(r#"{"chart":{"result":null,"error":null}}"#)
            .into_closes()
            .is_empty());
        assert!(decode(r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#)
            .into_closes()
            .is_empty());
    }

    #[test]
    fn error_object_decodes() {
        let r = decode(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        let e = r.chart.error.unwrap();
        assert_eq!(e.code, "Not Found");
    }

    // ---------- daily_closes against a local one-shot HTTP stub ----------

    async fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut req = Vec::new();
            let mut buf = [0u8; 1024];
            while !req.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = sock.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                req.extend_from_slice(&buf[..n]);
            }
            let resp = format!(
                "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                content_type,
                body.len(),
                body
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
        });
        format!("http://{}", addr)
    }

    // bypass any HTTP(S)_PROXY in the test environment
    fn stub_client(base_url: String) -> YahooClient {
        YahooClient {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url,
        }
    }

    #[tokio::test]
    async fn not_found_with_error_object_is_provider_error() {
        let base = serve_once(
            "404 Not Found",
            "application/json",
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .await;
        let c = stub_client(base);
        match c.daily_closes("NOPE", 15).await {
            Err(FetchError::Provider { code, .. }) => assert_eq!(code, "Not Found"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_error_page_is_status_error() {
        let base = serve_once(
            "500 Internal Server Error",
            "text/html",
            "<html><body>upstream down</body></html>",
        )
        .await;
        let c = stub_client(base);
        match c.daily_closes("TSLA", 15).await {
            Err(FetchError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("upstream down"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn ok_with_empty_result_is_empty_series() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"{"chart":{"result":[],"error":null}}"#,
        )
        .await;
        let c = stub_client(base);
        assert_eq!(c.daily_closes("^IXIC", 15).await.unwrap(), Vec::<f64>::new());
    }

    #[tokio::test]
    async fn ok_with_closes_returns_series() {
        let base = serve_once(
            "200 OK",
            "application/json",
            r#"{"chart":{"result":[{"indicators":{"quote":[{"close":[100.0,null,84.0]}]}}],"error":null}}"#,
        )
        .await;
        let c = stub_client(base);
        assert_eq!(c.daily_closes("^IXIC", 15).await.unwrap(), vec![100.0, 84.0]);
    }

    #[tokio::test]
    async fn ok_with_non_json_body_is_decode_error() {
        let base = serve_once("200 OK", "text/html", "<html>consent wall</html>").await;
        let c = stub_client(base);
        match c.daily_closes("TSLA", 15).await {
            Err(FetchError::Provider { code, .. }) => assert_eq!(code, "decode"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn index_symbol_is_percent_encoded() {
        let c = YahooClient::new(Some("https://example.test/".into())).unwrap();
        let url = c.chart_url("^IXIC").unwrap();
        assert_eq!(url.as_str(), "https://example.test/v8/finance/chart/%5EIXIC");
    }
}

//! Page download with a two-stage transport strategy.
//!
//! The module uses a trait-based design:
//! - [`Transport`]: one way of performing an HTTP GET and returning text
//! - [`PooledTransport`]: the primary, full-featured `reqwest` client
//! - [`PlainTransport`]: a minimal HTTP/1.1 client with lossy UTF-8 decoding
//! - [`FallbackFetch`]: decorator that tries the primary and falls back to
//!   the secondary transport
//!
//! # Fallback policy
//!
//! Only network-class failures (connect, timeout, body read) of the primary
//! trigger the fallback. A non-2xx answer from the primary is reported as-is.

use crate::error::{ScrapeError, TransportError};
use reqwest::header::{CONNECTION, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};
use url::Url;

/// User agent sent by both transports.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; anki_tools/1.0)";

/// Per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A way of fetching a page as text.
pub trait Transport {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// GET `url` and return the body; non-2xx answers are errors.
    async fn get_text(&self, url: &Url) -> Result<String, TransportError>;
}

fn base_builder(user_agent: &str, timeout: Duration) -> ClientBuilder {
    Client::builder().user_agent(user_agent).timeout(timeout)
}

fn build(builder: ClientBuilder, which: &str) -> Result<Client, ScrapeError> {
    builder
        .build()
        .map_err(|e| ScrapeError::Config(format!("cannot build {which} HTTP client: {e}")))
}

/// Primary transport: pooled, HTTP/2 capable, charset-aware decoding.
#[derive(Debug, Clone)]
pub struct PooledTransport {
    client: Client,
}

impl PooledTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build(base_builder(user_agent, timeout), "primary")?,
        })
    }
}

impl Transport for PooledTransport {
    fn name(&self) -> &'static str {
        "pooled"
    }

    async fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

/// Fallback transport: HTTP/1.1 only, one connection per request, body
/// decoded as UTF-8 with invalid bytes replaced.
#[derive(Debug, Clone)]
pub struct PlainTransport {
    client: Client,
}

impl PlainTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build(Self::configure(base_builder(user_agent, timeout)), "fallback")?,
        })
    }

    fn configure(builder: ClientBuilder) -> ClientBuilder {
        builder.http1_only().pool_max_idle_per_host(0)
    }
}

impl Transport for PlainTransport {
    fn name(&self) -> &'static str {
        "plain"
    }

    async fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        let bytes = self
            .client
            .get(url.clone())
            .header(CONNECTION, HeaderValue::from_static("close"))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Tries `primary`, then `secondary` if the primary failed at the network level.
pub struct FallbackFetch<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackFetch<P, S>
where
    P: Transport,
    S: Transport,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    /// Fetch `url` as text.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::Http`] if the primary got a non-2xx answer
    /// - [`ScrapeError::Http`] if the fallback got a non-2xx answer
    /// - [`ScrapeError::Fetch`] if both transports failed at the network level
    #[instrument(level = "info", skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let primary_err = match self.primary.get_text(url).await {
            Ok(body) => {
                info!(
                    transport = self.primary.name(),
                    bytes = body.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched page"
                );
                return Ok(body);
            }
            Err(e) if !e.is_network() => {
                return Err(ScrapeError::Http {
                    url: url.to_string(),
                    source: e,
                });
            }
            Err(e) => e,
        };

        warn!(
            transport = self.primary.name(),
            error = %primary_err,
            fallback = self.secondary.name(),
            "Primary transport failed; trying fallback"
        );

        match self.secondary.get_text(url).await {
            Ok(body) => {
                info!(
                    transport = self.secondary.name(),
                    bytes = body.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Fetched page"
                );
                Ok(body)
            }
            Err(e @ TransportError::Status { .. }) => Err(ScrapeError::Http {
                url: url.to_string(),
                source: e,
            }),
            Err(e) => Err(ScrapeError::Fetch {
                url: url.to_string(),
                primary: primary_err,
                fallback: e,
            }),
        }
    }
}

impl<P, S> fmt::Debug for FallbackFetch<P, S>
where
    P: Transport,
    S: Transport,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackFetch")
            .field("primary", &self.primary.name())
            .field("secondary", &self.secondary.name())
            .finish()
    }
}

/// The default pipeline transport: pooled client first, plain client second.
pub fn default_fetcher(
    user_agent: &str,
    timeout: Duration,
) -> Result<FallbackFetch<PooledTransport, PlainTransport>, ScrapeError> {
    Ok(FallbackFetch::new(
        PooledTransport::new(user_agent, timeout)?,
        PlainTransport::new(user_agent, timeout)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `response` verbatim to every connection; returns the page URL
    /// and a connection counter.
    async fn serve(response: Vec<u8>) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut req = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = sock.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    req.extend_from_slice(&buf[..n]);
                    if req.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let _ = sock.write_all(&response).await;
                let _ = sock.shutdown().await;
            }
        });
        let url = Url::parse(&format!("http://{addr}/wiki/Foo_list")).unwrap();
        (url, hits)
    }

    fn http_response(status: &str, body: &[u8]) -> Vec<u8> {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        out.extend_from_slice(body);
        out
    }

    fn local_pooled() -> PooledTransport {
        PooledTransport {
            client: base_builder(USER_AGENT, Duration::from_secs(5))
                .no_proxy()
                .build()
                .unwrap(),
        }
    }

    fn local_plain() -> PlainTransport {
        PlainTransport {
            client: PlainTransport::configure(base_builder(USER_AGENT, Duration::from_secs(5)))
                .no_proxy()
                .build()
                .unwrap(),
        }
    }

    /// Scripted transport for exercising the fallback policy.
    #[derive(Debug)]
    struct Scripted {
        name: &'static str,
        outcome: fn() -> Result<String, TransportError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &'static str, outcome: fn() -> Result<String, TransportError>) -> Self {
            Self {
                name,
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for &Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn get_text(&self, _url: &Url) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn page_url() -> Url {
        Url::parse("https://example.org/wiki/Foo_list").unwrap()
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = Scripted::new("primary", || Ok("<table></table>".into()));
        let secondary = Scripted::new("secondary", || Ok("unused".into()));
        let fetch = FallbackFetch::new(&primary, &secondary);

        assert_eq!(fetch.fetch(&page_url()).await.unwrap(), "<table></table>");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_uses_fallback() {
        let primary = Scripted::new("primary", || {
            Err(TransportError::Network("connection reset".into()))
        });
        let secondary = Scripted::new("secondary", || Ok("from fallback".into()));
        let fetch = FallbackFetch::new(&primary, &secondary);

        assert_eq!(fetch.fetch(&page_url()).await.unwrap(), "from fallback");
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_status_error_is_not_retried() {
        let primary = Scripted::new("primary", || {
            Err(TransportError::Status {
                status: 404,
                url: "https://example.org/wiki/Foo_list".into(),
            })
        });
        let secondary = Scripted::new("secondary", || Ok("unused".into()));
        let fetch = FallbackFetch::new(&primary, &secondary);

        let err = fetch.fetch(&page_url()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Http { .. }));
        assert!(err.to_string().contains("404"));
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_both_transports_failing_reports_both() {
        let primary = Scripted::new("primary", || Err(TransportError::Network("timeout".into())));
        let secondary = Scripted::new("secondary", || {
            Err(TransportError::Network("refused".into()))
        });
        let fetch = FallbackFetch::new(&primary, &secondary);

        let err = fetch.fetch(&page_url()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
        let msg = err.to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("refused"));
    }

    #[tokio::test]
    async fn test_pooled_transport_reads_page() {
        let body = "<table><tr><th>Simplified</th></tr><tr><td>的</td></tr></table>";
        let (url, hits) = serve(http_response("200 OK", body.as_bytes())).await;

        let text = local_pooled().get_text(&url).await.unwrap();
        assert_eq!(text, body);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pooled_transport_maps_404_to_status() {
        let (url, _hits) = serve(http_response("404 Not Found", b"missing")).await;

        let err = local_pooled().get_text(&url).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_http_404_does_not_hit_fallback() {
        let (url, hits) = serve(http_response("404 Not Found", b"missing")).await;
        let fetch = FallbackFetch::new(local_pooled(), local_plain());

        let err = fetch.fetch(&url).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Http { .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_plain_transport_replaces_invalid_utf8() {
        let body = b"<p>ok \xff\xfe end</p>";
        let (url, _hits) = serve(http_response("200 OK", body)).await;

        let text = local_plain().get_text(&url).await.unwrap();
        assert!(text.starts_with("<p>ok "));
        assert!(text.contains('\u{FFFD}'));
        assert!(text.ends_with(" end</p>"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/wiki/Foo_list")).unwrap();

        let err = local_pooled().get_text(&url).await.unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_fallback_fetch_debug_names_transports() {
        let fetch = default_fetcher(USER_AGENT, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            format!("{fetch:?}"),
            r#"FallbackFetch { primary: "pooled", secondary: "plain" }"#
        );
    }
}

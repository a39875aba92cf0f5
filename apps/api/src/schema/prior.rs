//! Prior-Document Fetcher: obtains the JSON-LD currently published for the site.
//!
//! Two strategies:
//! - `HomepageFetcher`: GET the homepage and extract the first
//!   `application/ld+json` script block.
//! - `CapturedRender`: run a legacy head renderer in-process and keep what it
//!   would have written to the page.
//!
//! Neither ever fails: every error path yields [`PLACEHOLDER_DOCUMENT`].

use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use super::PLACEHOLDER_DOCUMENT;

#[async_trait]
pub trait PriorDocumentSource: Send + Sync {
    async fn fetch(&self) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// Network mode
// ────────────────────────────────────────────────────────────────────────────

fn ld_json_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?is)<script\b[^>]*\stype\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script\s*>"#,
        )
        .expect("ld+json pattern is valid")
    })
}

/// Returns the inner text of the first `application/ld+json` script block.
pub fn extract_ld_json(html: &str) -> Option<&str> {
    ld_json_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Fetches the site's own homepage and scrapes its structured-data block.
pub struct HomepageFetcher {
    client: Client,
    site_url: String,
}

impl HomepageFetcher {
    pub fn new(client: Client, site_url: impl Into<String>) -> Self {
        Self {
            client,
            site_url: site_url.into(),
        }
    }

    /// Builds its own client; a hung homepage is abandoned after `timeout`.
    pub fn with_timeout(
        site_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, site_url))
    }
}

#[async_trait]
impl PriorDocumentSource for HomepageFetcher {
    async fn fetch(&self) -> String {
        let response = match self.client.get(&self.site_url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Homepage fetch from {} failed: {e}", self.site_url);
                return PLACEHOLDER_DOCUMENT.to_string();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Homepage fetch from {} returned {}",
                self.site_url,
                response.status()
            );
            return PLACEHOLDER_DOCUMENT.to_string();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read homepage body from {}: {e}", self.site_url);
                return PLACEHOLDER_DOCUMENT.to_string();
            }
        };

        match extract_ld_json(&body) {
            Some(document) => {
                debug!("Found prior JSON-LD document ({} bytes)", document.len());
                document.to_string()
            }
            None => {
                debug!("No JSON-LD block on {}", self.site_url);
                PLACEHOLDER_DOCUMENT.to_string()
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-process render mode
// ────────────────────────────────────────────────────────────────────────────

/// A head renderer that writes its markup to an output stream.
pub trait HeadRenderer: Send + Sync {
    fn render_head(&self, out: &mut dyn fmt::Write) -> fmt::Result;
}

/// Replays fixed markup, e.g. output captured from the previously active generator.
#[derive(Debug, Clone)]
pub struct StaticMarkupRenderer {
    markup: String,
}

impl StaticMarkupRenderer {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl HeadRenderer for StaticMarkupRenderer {
    fn render_head(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        out.write_str(&self.markup)
    }
}

/// Captures everything a renderer would have written instead of making a network round trip.
pub struct CapturedRender<R> {
    renderer: R,
}

impl<R: HeadRenderer> CapturedRender<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    fn capture(&self) -> String {
        let mut buffer = String::new();
        if let Err(e) = self.renderer.render_head(&mut buffer) {
            warn!("Legacy head renderer failed: {e}");
            return PLACEHOLDER_DOCUMENT.to_string();
        }

        let captured = buffer.trim();
        if captured.is_empty() {
            debug!("Legacy head renderer produced no output");
            return PLACEHOLDER_DOCUMENT.to_string();
        }
        captured.to_string()
    }
}

#[async_trait]
impl<R: HeadRenderer> PriorDocumentSource for CapturedRender<R> {
    async fn fetch(&self) -> String {
        self.capture()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_extract_first_block() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"LocalBusiness"}</script>
            <script type="application/ld+json">{"@type":"WebSite"}</script>
        </head></html>"#;
        assert_eq!(extract_ld_json(html), Some(r#"{"@type":"LocalBusiness"}"#));
    }

    #[test]
    fn test_extract_multiline_block_with_extra_attributes() {
        let html = "<SCRIPT class='schema' type='application/ld+json' id=\"x\">\n{\n  \"name\": \"Acme\"\n}\n</script>";
        assert_eq!(
            extract_ld_json(html),
            Some("\n{\n  \"name\": \"Acme\"\n}\n")
        );
    }

    #[test]
    fn test_extract_ignores_other_scripts() {
        let html = r#"<script type="text/javascript">var a = 1;</script>"#;
        assert_eq!(extract_ld_json(html), None);
    }

    #[test]
    fn test_extract_ignores_prefixed_type_attribute() {
        let html = r#"<script data-type="application/ld+json">{"decoy":true}</script>
            <script type="application/ld+json">{"@type":"LocalBusiness"}</script>"#;
        assert_eq!(extract_ld_json(html), Some(r#"{"@type":"LocalBusiness"}"#));

        let html = r#"<script data-type="application/ld+json">{"decoy":true}</script>"#;
        assert_eq!(extract_ld_json(html), None);
    }

    #[tokio::test]
    async fn test_homepage_fetch_returns_embedded_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<head><script type="application/ld+json">{"name":"Acme Plumbing"}</script></head>"#,
            ))
            .mount(&server)
            .await;

        let fetcher = HomepageFetcher::new(Client::new(), format!("{}/", server.uri()));
        assert_eq!(fetcher.fetch().await, r#"{"name":"Acme Plumbing"}"#);
    }

    #[tokio::test]
    async fn test_homepage_without_block_is_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let fetcher = HomepageFetcher::new(Client::new(), server.uri());
        assert_eq!(fetcher.fetch().await, "{}");
    }

    #[tokio::test]
    async fn test_homepage_error_status_is_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string(
                r#"<script type="application/ld+json">{"stale":true}</script>"#,
            ))
            .mount(&server)
            .await;

        let fetcher = HomepageFetcher::new(Client::new(), server.uri());
        assert_eq!(fetcher.fetch().await, "{}");
    }

    #[tokio::test]
    async fn test_homepage_transport_failure_is_placeholder() {
        // Nothing listens on port 1
        let fetcher = HomepageFetcher::new(Client::new(), "http://127.0.0.1:1/");
        assert_eq!(fetcher.fetch().await, "{}");
    }

    #[tokio::test]
    async fn test_hung_homepage_times_out_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<script type="application/ld+json">{"late":true}</script>"#)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let fetcher =
            HomepageFetcher::with_timeout(server.uri(), Duration::from_millis(100)).unwrap();
        assert_eq!(fetcher.fetch().await, "{}");
    }

    struct FailingRenderer;

    impl HeadRenderer for FailingRenderer {
        fn render_head(&self, _out: &mut dyn fmt::Write) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[tokio::test]
    async fn test_captured_render_returns_written_text() {
        let source = CapturedRender::new(StaticMarkupRenderer::new(
            "  <script type=\"application/ld+json\">{\"a\":1}</script>\n",
        ));
        assert_eq!(
            source.fetch().await,
            "<script type=\"application/ld+json\">{\"a\":1}</script>"
        );
    }

    #[tokio::test]
    async fn test_captured_render_failure_or_silence_is_placeholder() {
        assert_eq!(CapturedRender::new(FailingRenderer).fetch().await, "{}");
        assert_eq!(
            CapturedRender::new(StaticMarkupRenderer::new("   ")).fetch().await,
            "{}"
        );
    }
}

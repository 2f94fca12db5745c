use std::sync::OnceLock;
use std::time::Duration;

use crawl_logging::{crawl_debug, crawl_info};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::convert::render_markdown;
use crate::decode::decode_page;
use crate::extract::main_content_html;
use crate::types::{EngineError, EngineFault, FailureKind, RenderOptions, RenderReply};

/// The fetch-and-render engine shared by every task of a run.
///
/// `render` reports page-level problems as [`RenderReply::Failed`]; an `Err`
/// means the call itself broke down. Implementations must accept concurrent
/// `render` calls, one per session id.
#[async_trait::async_trait]
pub trait RenderEngine: Send + Sync {
    async fn launch(&self) -> Result<(), EngineError> {
        Ok(())
    }

    async fn render(
        &self,
        url: &str,
        session_id: &str,
        options: &RenderOptions,
    ) -> Result<RenderReply, EngineFault>;

    async fn shutdown(&self) {}
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            user_agent: concat!("crawler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Plain HTTP engine: GET, decode, pick the main content, convert to markdown.
#[derive(Debug)]
pub struct HttpRenderEngine {
    settings: HttpSettings,
    client: OnceLock<reqwest::Client>,
}

struct FetchedBody {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

impl HttpRenderEngine {
    pub fn new(settings: HttpSettings) -> Self {
        Self {
            settings,
            client: OnceLock::new(),
        }
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    async fn fetch_body(
        &self,
        client: &reqwest::Client,
        url: reqwest::Url,
    ) -> Result<FetchedBody, RenderReply> {
        let response = client.get(url).send().await.map_err(failed_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderReply::failed(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(RenderReply::failed(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    format!("unsupported content type {ct}"),
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(failed_request)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }
}

impl Default for HttpRenderEngine {
    fn default() -> Self {
        Self::new(HttpSettings::default())
    }
}

#[async_trait::async_trait]
impl RenderEngine for HttpRenderEngine {
    async fn launch(&self) -> Result<(), EngineError> {
        if self.client.get().is_some() {
            return Ok(());
        }
        let client = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .user_agent(self.settings.user_agent.as_str())
            .build()
            .map_err(|err| EngineError::Launch(err.to_string()))?;
        let _ = self.client.set(client);
        crawl_info!(
            "HTTP render engine ready (timeout {:?}, max {} bytes)",
            self.settings.request_timeout,
            self.settings.max_bytes
        );
        Ok(())
    }

    async fn render(
        &self,
        url: &str,
        session_id: &str,
        options: &RenderOptions,
    ) -> Result<RenderReply, EngineFault> {
        let client = self
            .client
            .get()
            .ok_or_else(|| EngineFault::new("render engine used before launch"))?;
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| EngineFault::new(format!("invalid url {url}: {err}")))?;

        crawl_debug!("render start session={} url={}", session_id, url);
        let body = match self.fetch_body(client, parsed).await {
            Ok(body) => body,
            Err(reply) => return Ok(reply),
        };

        let page = match decode_page(&body.bytes, body.content_type.as_deref()) {
            Ok(page) => page,
            Err(err) => return Ok(RenderReply::failed(FailureKind::Decode, err.to_string())),
        };
        let markdown = render_markdown(&main_content_html(&page.html), options);
        crawl_debug!(
            "render done session={} encoding={} chars={}",
            session_id,
            page.encoding,
            markdown.len()
        );

        if markdown.trim().is_empty() {
            Ok(RenderReply::NoContent)
        } else {
            Ok(RenderReply::Content(markdown))
        }
    }
}

fn too_large(max_bytes: u64, actual: u64) -> RenderReply {
    RenderReply::failed(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn failed_request(err: reqwest::Error) -> RenderReply {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_redirect() {
        FailureKind::RedirectLimitExceeded
    } else {
        FailureKind::Network
    };
    let message = format!("{kind}: {err}");
    RenderReply::failed(kind, message)
}

use reqwest::Client;

use super::checked_text;
use super::error::ClientResult;

pub const DEFAULT_RENDERER_URL: &str = "https://kroki.io";

/// Pass-through client for a Kroki-compatible diagram rendering service
#[derive(Debug, Clone)]
pub struct DiagramRenderer {
    http: Client,
    base_url: String,
}

impl DiagramRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Render `source` of diagram type `kind` (e.g. `mermaid`) into `format`
    /// (e.g. `svg`).
    pub async fn render(&self, kind: &str, format: &str, source: &str) -> ClientResult<String> {
        let url = format!("{}/{}/{}", self.base_url, kind, format);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(source.to_string())
            .send()
            .await?;
        checked_text(response).await
    }

    pub async fn render_mermaid_svg(&self, source: &str) -> ClientResult<String> {
        self.render("mermaid", "svg", source).await
    }
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDERER_URL)
    }
}

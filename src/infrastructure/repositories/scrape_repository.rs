use async_trait::async_trait;

/// Fetches a web page and reduces it to plain text for retrieval
#[async_trait]
pub trait ScrapeRepository: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, String>;
}

/// HTTP implementation backed by reqwest + html2text
pub struct HttpScrapeRepository {
    http_client: reqwest::Client,
}

impl HttpScrapeRepository {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpScrapeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScrapeRepository for HttpScrapeRepository {
    async fn fetch_text(&self, url: &str) -> Result<String, String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("failed to fetch {}: {}", url, e))?;

        if !response.status().is_success() {
            return Err(format!("failed to fetch {}: HTTP {}", url, response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read body of {}: {}", url, e))?;

        let text = html2text::from_read(body.as_bytes(), 120);
        Ok(text.trim().to_string())
    }
}

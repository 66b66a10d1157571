//! PDF download and text extraction.
//!
//! The document is fetched with `reqwest`, size-checked, and handed to
//! `pdf-extract` on the blocking pool. Extracted text is trimmed; an empty
//! string means the PDF had no extractable text layer.

use async_trait::async_trait;

use research_harness_core::ProviderError;

use crate::config::PdfConfig;
use crate::http;
use crate::traits::PdfExtractor;

pub struct HttpPdfExtractor {
    client: reqwest::Client,
    max_bytes: usize,
}

impl HttpPdfExtractor {
    pub fn new(config: &PdfConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http::client(config.timeout_secs)?,
            max_bytes: config.max_bytes,
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("PDF download failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api(format!(
                "PDF download returned {} for {}",
                status, url
            )));
        }

        if let Some(len) = response.content_length() {
            if len as usize > self.max_bytes {
                return Err(ProviderError::Api(format!(
                    "PDF is {} bytes, limit is {}",
                    len, self.max_bytes
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(format!("PDF download failed: {}", e)))?;
        if bytes.len() > self.max_bytes {
            return Err(ProviderError::Api(format!(
                "PDF is {} bytes, limit is {}",
                bytes.len(),
                self.max_bytes
            )));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl PdfExtractor for HttpPdfExtractor {
    async fn extract_from_url(&self, url: &str) -> Result<String, ProviderError> {
        let bytes = self.download(url).await?;
        tracing::debug!(url, bytes = bytes.len(), "downloaded PDF");

        tokio::task::spawn_blocking(move || extract_text(&bytes))
            .await
            .map_err(|e| ProviderError::Parse(format!("PDF extraction task failed: {}", e)))?
    }
}

/// Extract and trim the text layer of an in-memory PDF.
pub fn extract_text(bytes: &[u8]) -> Result<String, ProviderError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map(|text| text.trim().to_string())
        .map_err(|e| ProviderError::Parse(format!("PDF extraction failed: {}", e)))
}

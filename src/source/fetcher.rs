use crate::model::{DatasetRequest, SourceError};
use crate::source::traits::RowSource;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing::info;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Largest export accepted, 10 MB.
pub const MAX_EXPORT_BYTES: u64 = 10 * 1024 * 1024;

/// True when the path part of `location` (query and fragment ignored) ends in `.csv`.
pub fn has_csv_extension(location: &str) -> bool {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    path.to_ascii_lowercase().ends_with(".csv")
}

fn check_size(size: u64) -> Result<(), SourceError> {
    if size == 0 {
        Err(SourceError::Empty)
    } else if size > MAX_EXPORT_BYTES {
        Err(SourceError::TooLarge {
            size,
            limit: MAX_EXPORT_BYTES,
        })
    } else {
        Ok(())
    }
}

/// Accepts non-empty `.csv` exports of at most [`MAX_EXPORT_BYTES`].
pub fn validate_file_format(location: &str, size: u64) -> Result<(), SourceError> {
    if !has_csv_extension(location) {
        return Err(SourceError::UnsupportedFormat(location.to_string()));
    }
    check_size(size)
}

fn http_error(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::HttpError(e.to_string())
    }
}

/// Reads exports from local paths or over HTTP(S).
pub struct SourceImpl {
    pub client: Client,
}

impl SourceImpl {
    pub fn new() -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("price-sniper/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SourceError::HttpError(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn is_remote(location: &str) -> bool {
        location.starts_with("http://") || location.starts_with("https://")
    }

    async fn read_local(&self, location: &str) -> Result<String, SourceError> {
        let file = tokio::fs::File::open(location).await?;
        let size = file.metadata().await?.len();
        validate_file_format(location, size)?;

        // the file may grow between the size check and the read
        let mut content = String::new();
        file.take(MAX_EXPORT_BYTES + 1)
            .read_to_string(&mut content)
            .await?;
        check_size(content.len() as u64)?;

        info!("Read {} bytes from {}", content.len(), location);
        Ok(content)
    }

    async fn read_remote(&self, location: &str) -> Result<String, SourceError> {
        let mut response = self.client.get(location).send().await.map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::InvalidResponse(status.as_u16()));
        }

        // API exports often lack an extension; a CSV content type is enough
        let csv_content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("csv"));
        if !csv_content_type && !has_csv_extension(location) {
            return Err(SourceError::UnsupportedFormat(location.to_string()));
        }
        if let Some(len) = response.content_length() {
            check_size(len)?;
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(http_error)? {
            let size = (body.len() + chunk.len()) as u64;
            if size > MAX_EXPORT_BYTES {
                return Err(SourceError::TooLarge {
                    size,
                    limit: MAX_EXPORT_BYTES,
                });
            }
            body.extend_from_slice(&chunk);
        }
        check_size(body.len() as u64)?;

        let body = String::from_utf8(body)
            .map_err(|e| SourceError::HttpError(format!("response is not UTF-8: {}", e)))?;
        info!("Downloaded {} bytes from {} [{}]", body.len(), location, status);
        Ok(body)
    }
}

#[async_trait::async_trait]
impl RowSource for SourceImpl {
    async fn fetch(&self, req: &DatasetRequest) -> Result<String, SourceError> {
        if Self::is_remote(&req.location) {
            self.read_remote(&req.location).await
        } else {
            self.read_local(&req.location).await
        }
    }
}

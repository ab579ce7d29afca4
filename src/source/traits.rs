use crate::model::{DatasetRequest, SourceError};

#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    /// Returns the raw CSV text behind the request.
    async fn fetch(&self, req: &DatasetRequest) -> Result<String, SourceError>;
}

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ExtractionRequest, ExtractionResult};

/// Turns one web page into one [`ExtractionResult`].
///
/// Implemented by [`ExtractionClient`](crate::client::ExtractionClient) and
/// by [`MockExtractor`](crate::testing::MockExtractor).
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult>;
}

#[async_trait]
impl<T: Extractor + ?Sized> Extractor for std::sync::Arc<T> {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult> {
        (**self).extract(request).await
    }
}

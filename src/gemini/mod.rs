pub mod client;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Seam between the pipeline and the model API, so tests can classify
/// without network access.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Match a file's text against the allowed keys. Returns the subset of
    /// keys the model assigned (possibly empty). Transport and parse
    /// failures are errors; the caller decides the fallback.
    async fn classify(
        &self,
        path: &Path,
        content: &str,
        allowed_keys: &[String],
    ) -> Result<Vec<String>>;
}

pub use client::GeminiClient;

//! Transformation provider abstraction
//!
//! A provider turns validated input into output text. Providers are looked up
//! by [`Mode`] through the [`ProviderRegistry`], which is the only place that
//! knows which implementation serves which mode.

mod canned;
mod error;
mod registry;
mod remote;

pub use canned::{CannedRefine, CannedStyleTone, CannedTranslate};
pub use error::ProviderError;
pub use registry::{ProviderRegistry, DEFAULT_DISPATCH_TIMEOUT};
pub use remote::RemoteProvider;

use crate::model::Mode;
use crate::validator::ValidatedInput;
use async_trait::async_trait;
use std::sync::Arc;

/// Capability every transformation backend implements
#[async_trait]
pub trait TransformProvider: Send + Sync {
    /// Transform the input into output text
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Logging wrapper for providers. Records timing and outcome, never text.
pub struct LoggingProvider {
    inner: Arc<dyn TransformProvider>,
    name: String,
}

impl LoggingProvider {
    pub fn new(inner: Arc<dyn TransformProvider>) -> Self {
        let name = inner.name().to_string();
        Self { inner, name }
    }
}

#[async_trait]
impl TransformProvider for LoggingProvider {
    async fn transform(&self, input: &ValidatedInput) -> Result<String, ProviderError> {
        let start = std::time::Instant::now();
        let result = self.inner.transform(input).await;
        let duration = start.elapsed();

        match &result {
            Ok(output) => {
                tracing::info!(
                    provider = %self.name,
                    mode = %input.mode(),
                    duration_ms = %duration.as_millis(),
                    input_chars = input.source_text().chars().count(),
                    output_chars = output.chars().count(),
                    "Transformation completed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.name,
                    mode = %input.mode(),
                    duration_ms = %duration.as_millis(),
                    error_kind = e.kind(),
                    "Transformation failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build the canned providers for every mode
pub fn canned_providers() -> Vec<(Mode, Arc<dyn TransformProvider>)> {
    vec![
        (Mode::Refine, Arc::new(CannedRefine) as Arc<dyn TransformProvider>),
        (Mode::Translate, Arc::new(CannedTranslate)),
        (Mode::StyleTone, Arc::new(CannedStyleTone)),
    ]
}

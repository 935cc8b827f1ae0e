//! External collaborators consumed by the qualification pipeline.
//!
//! Each provider may fail. The pipeline never lets those failures escape:
//! [`degrade_to_absent`] turns every fault into an absent signal and logs it.

use crate::errors::AppError;
use crate::models::{ClassificationRequest, EnrichmentData, RawClassification, VerificationSignal};
use async_trait::async_trait;

/// Email reputation lookup (disposable / webmail / score).
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    /// Provider identifier used in logs (e.g. "hunter_email_verifier").
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the provider answered without a verdict.
    async fn verify(&self, email: &str) -> Result<Option<VerificationSignal>, AppError>;
}

/// Person and company profile lookup keyed by email.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the provider has no record for this address.
    async fn enrich(&self, email: &str) -> Result<Option<EnrichmentData>, AppError>;
}

/// AI model that scores and buckets a lead from sanitized enrichment data.
#[async_trait]
pub trait ClassificationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` means the model produced no usable answer.
    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Option<RawClassification>, AppError>;
}

/// Converts a provider outcome into an optional signal.
///
/// Faults are logged with the email, provider and error class, then dropped.
/// They are never retried and never surfaced to the caller.
pub fn degrade_to_absent<T>(
    provider: &str,
    email: &str,
    outcome: Result<Option<T>, AppError>,
) -> Option<T> {
    match outcome {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            tracing::info!("{} returned no data for {}", provider, email);
            None
        }
        Err(e) => {
            tracing::warn!(
                provider = provider,
                error_kind = e.kind(),
                "{} failed for {}: {}",
                provider,
                email,
                e
            );
            None
        }
    }
}

//! Qualification pipeline: format check, reputation gate, enrichment and AI classification.
//!
//! Stages run strictly in order. Enrichment is only attempted when the
//! verification signal does not already reject the signup, and every provider
//! call degrades to an absent signal on failure.
use crate::classifier::{self, ClassificationContext};
use crate::email_format;
use crate::models::{Bucket, QualificationResult, SignupAttributes};
use crate::providers::{
    degrade_to_absent, ClassificationProvider, EnrichmentProvider, VerificationProvider,
};
use crate::reputation::{self, GateDecision};
use std::collections::HashSet;
use std::sync::Arc;

/// Explanations collected over one qualification run, in the order stages add them.
#[derive(Debug, Default)]
pub struct Explanations(Vec<String>);

impl Explanations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_mut_vec(&mut self) -> &mut Vec<String> {
        &mut self.0
    }

    pub fn extend(&mut self, more: impl IntoIterator<Item = String>) {
        self.0.extend(more);
    }

    /// Final list with duplicates removed, keeping first occurrences.
    pub fn into_deduplicated(self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.0
            .into_iter()
            .filter(|explanation| seen.insert(explanation.clone()))
            .collect()
    }
}

/// Runs the qualification pipeline against a set of providers.
///
/// Holds no per-request state, so one instance is shared across requests.
#[derive(Clone)]
pub struct Qualifier {
    verification: Arc<dyn VerificationProvider>,
    enrichment: Arc<dyn EnrichmentProvider>,
    classification: Arc<dyn ClassificationProvider>,
}

impl Qualifier {
    pub fn new(
        verification: Arc<dyn VerificationProvider>,
        enrichment: Arc<dyn EnrichmentProvider>,
        classification: Arc<dyn ClassificationProvider>,
    ) -> Self {
        Self {
            verification,
            enrichment,
            classification,
        }
    }

    /// Qualifies one signup. Always returns a well-formed result.
    pub async fn qualify(&self, attributes: &SignupAttributes) -> QualificationResult {
        let email = attributes.email.as_deref();
        if !email_format::is_valid_format(email) {
            tracing::info!("Rejected signup with invalid email format");
            return QualificationResult::invalid_email();
        }
        let email = email.unwrap_or_default().trim();
        let domain = email_format::extract_domain(Some(email)).unwrap_or_default();
        tracing::info!("Qualifying signup {} (domain: {})", email, domain);

        let mut explanations = Explanations::new();

        let outcome = self.verification.verify(email).await;
        let signal = degrade_to_absent(self.verification.name(), email, outcome);
        if let GateDecision::Reject(bucket) =
            reputation::evaluate(signal.as_ref(), explanations.as_mut_vec())
        {
            tracing::info!("Signup {} rejected by reputation gate: {}", email, bucket);
            return finish(bucket, explanations);
        }

        let outcome = self.enrichment.enrich(email).await;
        let enrichment = degrade_to_absent(self.enrichment.name(), email, outcome);

        let context = ClassificationContext {
            email,
            location: attributes.location.as_deref(),
            signup_source: attributes.signup_source.as_deref(),
        };
        let verdict =
            classifier::classify(self.classification.as_ref(), enrichment.as_ref(), &context).await;
        explanations.extend(verdict.explanation);

        tracing::info!("✓ Signup {} qualified as {}", email, verdict.bucket);
        finish(verdict.bucket, explanations)
    }
}

fn finish(bucket: Bucket, explanations: Explanations) -> QualificationResult {
    QualificationResult::new(bucket, explanations.into_deduplicated())
}

//! Early accept/reject decision from the email verification signal.

use crate::models::{Bucket, VerificationSignal};

/// Outcome of the reputation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Keep going to enrichment.
    Continue,
    /// Stop the pipeline with this bucket.
    Reject(Bucket),
}

/// Interprets a verification signal, appending its reasons to `explanations`.
///
/// Rules, first match wins:
/// - no signal: continue silently
/// - disposable address: reject
/// - webmail address: reject
/// - otherwise continue, noting the verifier score when there is one
pub fn evaluate(signal: Option<&VerificationSignal>, explanations: &mut Vec<String>) -> GateDecision {
    let Some(signal) = signal else {
        return GateDecision::Continue;
    };

    if signal.disposable {
        explanations.push("Disposable email address".to_string());
        explanations.push("Temporary email service".to_string());
        return GateDecision::Reject(Bucket::NotLikelyToBuy);
    }

    if signal.webmail {
        explanations.push("Personal email address".to_string());
        explanations.push("Webmail provider".to_string());
        return GateDecision::Reject(Bucket::NotLikelyToBuy);
    }

    if let Some(score) = signal.score {
        explanations.push(format!("Verified email address (score: {})", score));
    }

    GateDecision::Continue
}

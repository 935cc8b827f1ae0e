//! AI-assisted lead classification from enrichment data.
//!
//! The workflow is:
//! 1. Guard against missing enrichment data
//! 2. Sanitize a copy of the data (contact and tech-fingerprint fields removed)
//! 3. Build the chat request (fixed instructions + sanitized payload + context)
//! 4. Call the classification provider
//! 5. Normalize the untrusted answer into a closed bucket and string explanations
use crate::models::{
    coerce_score, Bucket, ChatMessage, ClassificationRequest, EnrichmentData, RawClassification,
    SanitizedEnrichmentData,
};
use crate::providers::{degrade_to_absent, ClassificationProvider};
use serde::Serialize;
use serde_json::Value;

/// Fields removed from `company.site` before the data leaves the service.
const SITE_CONTACT_FIELDS: [&str; 2] = ["emailAddresses", "phoneNumbers"];
/// Fields removed from `company`.
const COMPANY_TECH_FIELDS: [&str; 2] = ["tech", "techCategories"];

const SYSTEM_INSTRUCTIONS: &str = r#"You analyze companies and the people who work there to estimate how likely they are to buy an email finder and email verification service used for sales prospecting and lead generation.

From the company and person data provided, determine:
1. A purchase likelihood score from 0 to 100
2. One qualification bucket: enterprise, high_potential, or not_likely_to_buy
3. Between 2 and 4 short reasons for the decision

Weigh the following:
- Company size (headcount, revenue signals)
- Industry and sector
- The person's role and seniority
- Company type (public, private, startup)
- Geography, including whether a user-provided location is consistent with the company
- Business model and company description
- Signup source or referrer, when provided, as a sign of genuine interest

IMPORTANT: when a user location is provided, compare it with the company's apparent location. Treat a mismatch as a suspicious signup and say so in the reasons.

Buckets:
- enterprise: large organizations (usually 1000+ employees) with substantial sales or outreach activity
- high_potential: mid-sized organizations (usually 50 to 1000 employees) with growth and sales needs
- not_likely_to_buy: small companies, non-profits, or organizations with little use for email finding or verification

Reply with a single JSON object and nothing else, in exactly this shape:
{
  "score": <integer 0-100>,
  "bucket": "<enterprise|high_potential|not_likely_to_buy>",
  "explanations": ["<short reason>", "..."]
}"#;

/// Signup context forwarded alongside the enrichment data.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationContext<'a> {
    /// Used for log context only; never sent to the model.
    pub email: &'a str,
    pub location: Option<&'a str>,
    pub signup_source: Option<&'a str>,
}

/// Classifier verdict before it is merged with earlier explanations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierOutcome {
    pub bucket: Bucket,
    pub explanation: Vec<String>,
}

impl ClassifierOutcome {
    fn needs_review(message: impl Into<String>) -> Self {
        Self {
            bucket: Bucket::NeedsReview,
            explanation: vec![message.into()],
        }
    }
}

/// A model answer mapped onto the closed result types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedClassification {
    pub bucket: Bucket,
    /// Purchase likelihood in 0..=100. Informational: the bucket is authoritative.
    pub score: u8,
    pub explanations: Vec<String>,
}

/// Runs the classification stage end to end. Never fails: every fault maps to `needs_review`.
pub async fn classify(
    provider: &dyn ClassificationProvider,
    data: Option<&EnrichmentData>,
    context: &ClassificationContext<'_>,
) -> ClassifierOutcome {
    let Some(data) = data else {
        return ClassifierOutcome::needs_review("No enrichment data available");
    };

    let sanitized = sanitize(data);
    let request = match build_request(&sanitized, context) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(
                "Failed to build classification request for {}: {}",
                context.email,
                e
            );
            return ClassifierOutcome::needs_review(format!("AI analysis error: {}", e));
        }
    };

    let outcome = provider.classify(&request).await;
    let Some(raw) = degrade_to_absent(provider.name(), context.email, outcome) else {
        return ClassifierOutcome::needs_review("AI analysis failed");
    };

    if !raw.as_value().is_object() {
        tracing::error!(
            "Classification for {} is not a JSON object: {}",
            context.email,
            raw.as_value()
        );
        return ClassifierOutcome::needs_review("Invalid AI response format");
    }

    let normalized = normalize(&raw);
    tracing::debug!(
        "Classification for {}: bucket={} score={} reasons={}",
        context.email,
        normalized.bucket,
        normalized.score,
        normalized.explanations.len()
    );

    ClassifierOutcome {
        bucket: normalized.bucket,
        explanation: normalized.explanations,
    }
}

/// Returns a copy of `data` without site contact details and technology fingerprints.
///
/// Missing fields are fine; the input is left untouched.
pub fn sanitize(data: &EnrichmentData) -> SanitizedEnrichmentData {
    let mut value = data.as_value().clone();

    if let Some(company) = value.get_mut("company").and_then(Value::as_object_mut) {
        for field in COMPANY_TECH_FIELDS {
            company.remove(field);
        }
        if let Some(site) = company.get_mut("site").and_then(Value::as_object_mut) {
            for field in SITE_CONTACT_FIELDS {
                site.remove(field);
            }
        }
    }

    SanitizedEnrichmentData::from_value(value)
}

/// Builds the system + user messages for the classification provider.
pub fn build_request(
    data: &SanitizedEnrichmentData,
    context: &ClassificationContext<'_>,
) -> Result<ClassificationRequest, serde_json::Error> {
    let payload = serde_json::to_string(data)?;

    let mut user_message = format!("Analyze this company and person data:\n\n{}", payload);

    if let Some(location) = present(context.location) {
        user_message.push_str(&format!(
            "\n\n\nUser provided location: {}\nCheck whether this location matches the company's geographic location in the data above.",
            location
        ));
    }

    if let Some(source) = present(context.signup_source) {
        user_message.push_str(&format!("\n\n\nSignup source/referrer: {}", source));
    }

    Ok(ClassificationRequest {
        messages: vec![
            ChatMessage::system(SYSTEM_INSTRUCTIONS),
            ChatMessage::user(user_message),
        ],
    })
}

/// Maps an untrusted model answer onto closed types.
///
/// - `bucket`: one of the three business buckets, otherwise `needs_review`
/// - `score`: coerced to an integer clamped to 0..=100, absent or garbage is 0
/// - `explanations`: strings from a JSON array; anything else is an empty list
pub fn normalize(raw: &RawClassification) -> NormalizedClassification {
    let bucket = raw
        .field("bucket")
        .and_then(Value::as_str)
        .map(Bucket::from_business_label)
        .unwrap_or(Bucket::NeedsReview);

    let score = raw.field("score").and_then(coerce_score).unwrap_or(0);

    let explanations = match raw.field("explanations") {
        Some(Value::Array(items)) => items.iter().filter_map(explanation_text).collect(),
        _ => Vec::new(),
    };

    NormalizedClassification {
        bucket,
        score,
        explanations,
    }
}

fn explanation_text(item: &Value) -> Option<String> {
    let text = match item {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubClassifier {
        answer: Result<Option<Value>, AppError>,
        seen: Mutex<Vec<ClassificationRequest>>,
    }

    impl StubClassifier {
        fn answering(answer: Result<Option<Value>, AppError>) -> Self {
            Self {
                answer,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ClassificationProvider for StubClassifier {
        fn name(&self) -> &'static str {
            "stub_classifier"
        }

        async fn classify(
            &self,
            request: &ClassificationRequest,
        ) -> Result<Option<RawClassification>, AppError> {
            self.seen.lock().unwrap().push(request.clone());
            self.answer
                .clone()
                .map(|answer| answer.map(RawClassification::new))
        }
    }

    fn hunter_enrichment() -> EnrichmentData {
        EnrichmentData::new(json!({
            "person": {"name": {"fullName": "Sales Team"}, "employment": {"role": "sales", "seniority": "executive"}},
            "company": {
                "name": "Hunter",
                "metrics": {"employees": "5000"},
                "site": {"emailAddresses": ["contact@hunter.io"], "phoneNumbers": ["+33 1 23 45 67 89"], "url": "hunter.io"},
                "tech": ["stripe", "intercom"],
                "techCategories": ["payments"],
                "geo": {"country": "France"}
            },
            "meta": {"email": "sales@hunter.io"}
        }))
    }

    fn context<'a>(location: Option<&'a str>, source: Option<&'a str>) -> ClassificationContext<'a> {
        ClassificationContext {
            email: "sales@hunter.io",
            location,
            signup_source: source,
        }
    }

    #[test]
    fn test_sanitize_strips_contact_and_tech_fields() {
        let data = hunter_enrichment();
        let sanitized = sanitize(&data);
        let company = &sanitized.as_value()["company"];

        assert!(company.get("tech").is_none());
        assert!(company.get("techCategories").is_none());
        assert!(company["site"].get("emailAddresses").is_none());
        assert!(company["site"].get("phoneNumbers").is_none());
        assert_eq!(company["site"]["url"], "hunter.io");
        assert_eq!(company["geo"]["country"], "France");
        assert_eq!(sanitized.as_value()["person"], data.as_value()["person"]);
    }

    #[test]
    fn test_sanitize_leaves_original_untouched() {
        let data = hunter_enrichment();
        let before = data.clone();
        let _ = sanitize(&data);
        assert_eq!(data, before);
        assert!(data.as_value()["company"].get("tech").is_some());
    }

    #[test]
    fn test_sanitize_tolerates_missing_fields() {
        let data = EnrichmentData::new(json!({"person": {"name": "x"}, "company": {"site": null}}));
        let sanitized = sanitize(&data);
        assert_eq!(sanitized.as_value(), data.as_value());

        let data = EnrichmentData::new(json!({"company": "not an object"}));
        assert_eq!(sanitize(&data).as_value(), data.as_value());
    }

    #[test]
    fn test_build_request_embeds_payload_and_context() {
        let sanitized = sanitize(&hunter_enrichment());
        let request = build_request(&sanitized, &context(Some("nigeria"), Some("appsumo"))).unwrap();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, SYSTEM_INSTRUCTIONS);
        let user = &request.messages[1].content;
        assert!(user.contains(r#""name":"Hunter""#));
        assert!(!user.contains("contact@hunter.io"));
        assert!(!user.contains("intercom"));
        assert!(user.contains("User provided location: nigeria"));
        assert!(user.contains("Signup source/referrer: appsumo"));
    }

    #[test]
    fn test_build_request_skips_blank_context() {
        let sanitized = sanitize(&hunter_enrichment());
        let request = build_request(&sanitized, &context(Some("  "), None)).unwrap();

        let user = &request.messages[1].content;
        assert!(!user.contains("User provided location"));
        assert!(!user.contains("Signup source"));
    }

    #[test]
    fn test_system_instructions_require_location_cross_check() {
        assert!(SYSTEM_INSTRUCTIONS.contains("mismatch"));
        assert!(SYSTEM_INSTRUCTIONS.contains("single JSON object"));
    }

    #[test]
    fn test_normalize_valid_answer() {
        let raw = RawClassification::new(json!({
            "score": 88,
            "bucket": "enterprise",
            "explanations": ["Large company", "Sales-driven industry"]
        }));
        let normalized = normalize(&raw);

        assert_eq!(normalized.bucket, Bucket::Enterprise);
        assert_eq!(normalized.score, 88);
        assert_eq!(normalized.explanations, vec!["Large company", "Sales-driven industry"]);
    }

    #[test]
    fn test_normalize_score_boundaries() {
        for (score, expected) in [
            (json!(-1), 0),
            (json!(0), 0),
            (json!(100), 100),
            (json!(101), 100),
            (Value::Null, 0),
            (json!("garbage"), 0),
        ] {
            let raw = RawClassification::new(json!({"score": score, "bucket": "enterprise"}));
            assert_eq!(normalize(&raw).score, expected);
        }
    }

    #[test]
    fn test_normalize_unknown_buckets() {
        for bucket in [
            json!("needs_review"),
            json!("garbage"),
            json!(" enterprise\n"),
            json!("Enterprise"),
            json!(5),
            Value::Null,
            json!(["enterprise"]),
        ] {
            let raw = RawClassification::new(json!({"bucket": bucket}));
            assert_eq!(normalize(&raw).bucket, Bucket::NeedsReview);
        }
    }

    #[test]
    fn test_normalize_explanation_shapes() {
        let raw = RawClassification::new(json!({"explanations": "single reason"}));
        assert!(normalize(&raw).explanations.is_empty());

        let raw = RawClassification::new(json!({}));
        assert!(normalize(&raw).explanations.is_empty());

        let raw = RawClassification::new(json!({"explanations": [" padded ", 42, null, "", {"k": 1}]}));
        assert_eq!(
            normalize(&raw).explanations,
            vec!["padded".to_string(), "42".to_string(), r#"{"k":1}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_classify_without_data_skips_provider() {
        let provider = StubClassifier::answering(Ok(Some(json!({"bucket": "enterprise"}))));
        let outcome = classify(&provider, None, &context(None, None)).await;

        assert_eq!(outcome.bucket, Bucket::NeedsReview);
        assert_eq!(outcome.explanation, vec!["No enrichment data available"]);
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_classify_provider_error_needs_review() {
        let provider =
            StubClassifier::answering(Err(AppError::ExternalApiError("HTTP 500".to_string())));
        let data = hunter_enrichment();
        let outcome = classify(&provider, Some(&data), &context(None, None)).await;

        assert_eq!(outcome.bucket, Bucket::NeedsReview);
        assert_eq!(outcome.explanation, vec!["AI analysis failed"]);
    }

    #[tokio::test]
    async fn test_classify_empty_answer_needs_review() {
        let provider = StubClassifier::answering(Ok(None));
        let data = hunter_enrichment();
        let outcome = classify(&provider, Some(&data), &context(None, None)).await;

        assert_eq!(outcome.explanation, vec!["AI analysis failed"]);
    }

    #[tokio::test]
    async fn test_classify_non_object_answer() {
        let provider = StubClassifier::answering(Ok(Some(json!(["enterprise"]))));
        let data = hunter_enrichment();
        let outcome = classify(&provider, Some(&data), &context(None, None)).await;

        assert_eq!(outcome.bucket, Bucket::NeedsReview);
        assert_eq!(outcome.explanation, vec!["Invalid AI response format"]);
    }

    #[tokio::test]
    async fn test_classify_sends_sanitized_request() {
        let provider = StubClassifier::answering(Ok(Some(json!({
            "score": 95,
            "bucket": "enterprise",
            "explanations": ["Large public company"]
        }))));
        let data = hunter_enrichment();
        let outcome = classify(&provider, Some(&data), &context(Some("france"), None)).await;

        assert_eq!(outcome.bucket, Bucket::Enterprise);
        assert_eq!(outcome.explanation, vec!["Large public company"]);

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].messages[1].content.contains("+33 1 23 45 67 89"));
        assert!(seen[0].messages[1].content.contains("User provided location: france"));
    }
}

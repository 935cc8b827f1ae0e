use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

// ============ Signup Input ============

/// Attributes captured at signup. Created by the caller, never mutated by the pipeline.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignupAttributes {
    /// Email address; absent is treated as an invalid format.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Free-text region hint (e.g. "france", "US").
    #[serde(default)]
    pub location: Option<String>,
    /// Free-text referrer (e.g. "appsumo").
    #[serde(default)]
    pub signup_source: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl SignupAttributes {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }
}

// ============ Qualification Output ============

/// Closed qualification category assigned to a signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Enterprise,
    HighPotential,
    NotLikelyToBuy,
    NeedsReview,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Enterprise => "enterprise",
            Bucket::HighPotential => "high_potential",
            Bucket::NotLikelyToBuy => "not_likely_to_buy",
            Bucket::NeedsReview => "needs_review",
        }
    }

    /// Maps a model-supplied label onto the three business buckets.
    ///
    /// Matching is exact. Anything else, including `"needs_review"` itself or a
    /// padded label, becomes `NeedsReview`.
    pub fn from_business_label(label: &str) -> Self {
        match label {
            "enterprise" => Bucket::Enterprise,
            "high_potential" => Bucket::HighPotential,
            "not_likely_to_buy" => Bucket::NotLikelyToBuy,
            _ => Bucket::NeedsReview,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pipeline's sole output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationResult {
    pub bucket: Bucket,
    pub explanation: Vec<String>,
}

impl QualificationResult {
    pub fn new(bucket: Bucket, explanation: Vec<String>) -> Self {
        Self {
            bucket,
            explanation,
        }
    }

    pub fn invalid_email() -> Self {
        Self::new(Bucket::NeedsReview, vec!["Invalid email format".to_string()])
    }

    /// Fixed fallback returned by the HTTP layer when the pipeline faults unexpectedly.
    pub fn service_unavailable() -> Self {
        Self::new(
            Bucket::NeedsReview,
            vec!["Service temporarily unavailable".to_string()],
        )
    }
}

// ============ Verification Provider ============

/// Email reputation signal, as returned by the verification provider.
///
/// Field types are coerced on the way in: `disposable`/`webmail` are true only
/// for a literal JSON `true`, and `score` is clamped into 0..=100.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct VerificationSignal {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub disposable: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub webmail: bool,
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<u8>,
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_score))
}

/// Coerces a loosely-typed score into 0..=100.
///
/// Integers, floats (truncated) and numeric strings are accepted; anything else is `None`.
pub fn coerce_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| u.min(i64::MAX as u64) as i64))
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?
        }
        _ => return None,
    };
    Some(raw.clamp(0, 100) as u8)
}

// ============ Enrichment Provider ============

/// Aggregated person/company profile keyed by email (`person`, `company`, `meta`).
///
/// Kept as an opaque JSON tree: the classifier forwards it to the model rather
/// than interpreting individual fields.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EnrichmentData(Value);

impl EnrichmentData {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn person(&self) -> Option<&Value> {
        self.0.get("person").filter(|v| !v.is_null())
    }

    pub fn company(&self) -> Option<&Value> {
        self.0.get("company").filter(|v| !v.is_null())
    }

    /// True when the provider answered but found neither a person nor a company.
    pub fn is_empty(&self) -> bool {
        self.person().is_none() && self.company().is_none()
    }
}

/// Enrichment data with contact and technology-fingerprint fields removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SanitizedEnrichmentData(Value);

impl SanitizedEnrichmentData {
    pub(crate) fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

// ============ Classification Provider ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Ordered, role-tagged messages sent to the classification provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRequest {
    pub messages: Vec<ChatMessage>,
}

/// Untrusted classification as returned by the model. Nothing about its shape is guaranteed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RawClassification(Value);

impl RawClassification {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Looks up a top-level field, treating JSON `null` as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }
}

//! In-process fake providers shared by the integration tests.
//!
//! Each fake records what it was asked so tests can check what the pipeline sent.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use signup_qualifier::errors::AppError;
use signup_qualifier::models::{
    ClassificationRequest, EnrichmentData, RawClassification, VerificationSignal,
};
use signup_qualifier::providers::{
    ClassificationProvider, EnrichmentProvider, VerificationProvider,
};
use signup_qualifier::qualifier::Qualifier;
use std::sync::{Arc, Mutex};

pub struct FakeVerifier {
    answer: Result<Option<VerificationSignal>, AppError>,
    emails: Mutex<Vec<String>>,
}

impl FakeVerifier {
    pub fn answering(answer: Result<Option<VerificationSignal>, AppError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            emails: Mutex::new(Vec::new()),
        })
    }

    pub fn signal(disposable: bool, webmail: bool, score: Option<u8>) -> Arc<Self> {
        Self::answering(Ok(Some(VerificationSignal {
            disposable,
            webmail,
            score,
        })))
    }

    pub fn calls(&self) -> usize {
        self.emails.lock().unwrap().len()
    }

    pub fn emails(&self) -> Vec<String> {
        self.emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerificationProvider for FakeVerifier {
    fn name(&self) -> &'static str {
        "fake_verifier"
    }

    async fn verify(&self, email: &str) -> Result<Option<VerificationSignal>, AppError> {
        self.emails.lock().unwrap().push(email.to_string());
        self.answer.clone()
    }
}

pub struct FakeEnricher {
    answer: Result<Option<EnrichmentData>, AppError>,
    emails: Mutex<Vec<String>>,
}

impl FakeEnricher {
    pub fn answering(answer: Result<Option<EnrichmentData>, AppError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            emails: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.emails.lock().unwrap().len()
    }

    pub fn emails(&self) -> Vec<String> {
        self.emails.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrichmentProvider for FakeEnricher {
    fn name(&self) -> &'static str {
        "fake_enricher"
    }

    async fn enrich(&self, email: &str) -> Result<Option<EnrichmentData>, AppError> {
        self.emails.lock().unwrap().push(email.to_string());
        self.answer.clone()
    }
}

pub struct FakeClassifier {
    answer: Result<Option<Value>, AppError>,
    requests: Mutex<Vec<ClassificationRequest>>,
}

impl FakeClassifier {
    pub fn answering(answer: Result<Option<Value>, AppError>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_user_message(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.messages[1].content.clone())
    }
}

#[async_trait]
impl ClassificationProvider for FakeClassifier {
    fn name(&self) -> &'static str {
        "fake_classifier"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Option<RawClassification>, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer
            .clone()
            .map(|answer| answer.map(RawClassification::new))
    }
}

/// Classifier that panics, standing in for an unexpected internal fault.
pub struct PanickingClassifier;

#[async_trait]
impl ClassificationProvider for PanickingClassifier {
    fn name(&self) -> &'static str {
        "panicking_classifier"
    }

    async fn classify(
        &self,
        _request: &ClassificationRequest,
    ) -> Result<Option<RawClassification>, AppError> {
        panic!("classifier exploded");
    }
}

pub fn qualifier(
    verifier: Arc<FakeVerifier>,
    enricher: Arc<FakeEnricher>,
    classifier: Arc<dyn ClassificationProvider>,
) -> Qualifier {
    Qualifier::new(verifier, enricher, classifier)
}

/// A 5000-employee public company, with the fields sanitization must remove.
pub fn large_public_company() -> EnrichmentData {
    EnrichmentData::new(json!({
        "person": {
            "name": {"givenName": "Sales", "familyName": "Team"},
            "employment": {"role": "sales", "seniority": "executive", "title": "Head of Sales"}
        },
        "company": {
            "name": "Hunter",
            "domain": "hunter.io",
            "category": {"industry": "Internet Software & Services"},
            "metrics": {"employees": 5000},
            "type": "public",
            "geo": {"country": "France", "city": "Paris"},
            "site": {
                "emailAddresses": ["support@hunter.io"],
                "phoneNumbers": ["+33 1 00 00 00 00"]
            },
            "tech": ["google_analytics", "stripe"],
            "techCategories": ["analytics", "payments"]
        },
        "meta": {"email": "sales@hunter.io"}
    }))
}

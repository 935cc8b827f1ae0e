//! Signup Qualifier Library
//!
//! Classifies newly signed-up users into a qualification bucket
//! (`enterprise`, `high_potential`, `not_likely_to_buy`, `needs_review`) using
//! progressively more expensive signals: email format, email reputation
//! (Hunter email verifier) and AI analysis of enrichment data (Hunter combined
//! enrichment + an OpenAI-compatible chat model).
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `classifier`: Enrichment sanitization, prompt building and answer normalization.
//! - `config`: Configuration management.
//! - `email_format`: Email syntax checks.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `hunter_client`: Verification and enrichment provider.
//! - `models`: Core data models.
//! - `openai_client`: Classification provider.
//! - `providers`: Provider traits and the degrade-to-absent policy.
//! - `qualifier`: The qualification pipeline.
//! - `reputation`: Early decision from the verification signal.

pub mod api;
pub mod core;
pub mod integrations;

pub mod classifier;
pub mod config;
pub mod email_format;
pub mod errors;
pub mod handlers;
pub mod hunter_client;
pub mod models;
pub mod openai_client;
pub mod providers;
pub mod qualifier;
pub mod reputation;

use serde::Deserialize;

const DEFAULT_HUNTER_BASE_URL: &str = "https://api.hunter.io/v2";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Bearer token callers must present on the qualification endpoint.
    pub api_token: String,
    pub hunter_api_key: String,
    pub hunter_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    /// Timeout for verification and enrichment calls.
    pub provider_timeout_secs: u64,
    /// Timeout for the classification call.
    pub classifier_timeout_secs: u64,
    pub rate_limit_per_minute: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            api_token: required_secret("API_TOKEN")?,
            hunter_api_key: required_secret("HUNTER_API_KEY")?,
            hunter_base_url: base_url("HUNTER_BASE_URL", DEFAULT_HUNTER_BASE_URL)?,
            openai_api_key: required_secret("OPENAI_API_KEY")?,
            openai_base_url: base_url("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)?,
            openai_model: std::env::var("OPENAI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_temperature: std::env::var("OPENAI_TEMPERATURE")
                .unwrap_or_else(|_| "0.2".to_string())
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("OPENAI_TEMPERATURE must be a number"))
                .and_then(|t| {
                    if !(0.0..=2.0).contains(&t) {
                        anyhow::bail!("OPENAI_TEMPERATURE must be between 0 and 2");
                    }
                    Ok(t)
                })?,
            provider_timeout_secs: positive_number("PROVIDER_TIMEOUT_SECS", 10)?,
            classifier_timeout_secs: positive_number("CLASSIFIER_TIMEOUT_SECS", 30)?,
            rate_limit_per_minute: positive_number("RATE_LIMIT_PER_MINUTE", 10)? as u32,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Hunter Base URL: {}", config.hunter_base_url);
        tracing::debug!(
            "OpenAI Base URL: {} (model: {}, temperature: {})",
            config.openai_base_url,
            config.openai_model,
            config.openai_temperature
        );
        tracing::debug!(
            "Provider timeouts: {}s verification/enrichment, {}s classification",
            config.provider_timeout_secs,
            config.classifier_timeout_secs
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn required_secret(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    Ok(value)
}

fn base_url(name: &str, default: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());

    let parsed = url::Url::parse(&value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }

    Ok(value.trim_end_matches('/').to_string())
}

fn positive_number(name: &str, default: u64) -> anyhow::Result<u64> {
    let value = match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer", name))?,
        Err(_) => default,
    };
    if value == 0 {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

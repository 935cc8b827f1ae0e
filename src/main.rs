use axum::Router;
use signup_qualifier::api::handlers::{self, AppState};
use signup_qualifier::config::Config;
use signup_qualifier::core::qualifier::Qualifier;
use signup_qualifier::integrations::hunter_client::HunterClient;
use signup_qualifier::integrations::openai_client::OpenAiClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Hunter and OpenAI clients.
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signup_qualifier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let hunter = Arc::new(HunterClient::from_config(&config)?);
    tracing::info!("✓ Hunter client initialized: {}", config.hunter_base_url);

    let openai = Arc::new(OpenAiClient::from_config(&config)?);
    tracing::info!(
        "✓ OpenAI client initialized: {} ({})",
        config.openai_base_url,
        config.openai_model
    );

    let qualifier = Qualifier::new(hunter.clone(), hunter, openai);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        qualifier,
    });

    // Per-IP quota: `rate_limit_per_minute` requests, replenished evenly over the minute
    let per_minute = config.rate_limit_per_minute;
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond((60_000 / u64::from(per_minute)).max(1))
            .burst_size(per_minute)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
    );
    tracing::info!("Rate limit: {} requests/minute per IP", per_minute);

    let protected_routes = handlers::protected_routes(app_state.clone()).layer(
        ServiceBuilder::new()
            // Signup payloads are small
            .layer(RequestBodyLimitLayer::new(64 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", axum::routing::get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

use std::error::Error;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use query_sherpa::adapters::ai::{OpenAIConfig, OpenAIProvider};
use query_sherpa::adapters::http::{cors_layer, inquiry_router, InquiryAppState};
use query_sherpa::adapters::session::{InMemorySessionStore, RedisSessionStore};
use query_sherpa::application::{TurnConfig, TurnOrchestrator};
use query_sherpa::config::{AppConfig, SessionBackend};
use query_sherpa::ports::{AIProvider, SessionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .with(fmt::layer().with_target(true).with_line_number(true))
        .init();

    config.validate()?;

    let api_key = config
        .ai
        .openai_api_key
        .as_ref()
        .map(|key| key.expose_secret().clone())
        .unwrap_or_default();
    let provider: Arc<dyn AIProvider> = Arc::new(OpenAIProvider::new(
        OpenAIConfig::new(api_key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?);

    let store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Memory => {
            Arc::new(InMemorySessionStore::new().with_idle_ttl(config.session.idle_ttl()))
        }
        SessionBackend::Redis => Arc::new(
            RedisSessionStore::connect(&config.redis.url)
                .await?
                .with_idle_ttl(config.session.idle_ttl()),
        ),
    };
    let info = provider.provider_info();
    tracing::info!(
        provider = %info.name,
        model = %info.model,
        backend = ?config.session.backend,
        idle_ttl_secs = config.session.idle_ttl_secs,
        "Chat backend and session store ready"
    );

    let orchestrator = TurnOrchestrator::new(provider, store)
        .with_config(TurnConfig::default().with_temperature(config.ai.temperature));

    let app = inquiry_router(InquiryAppState::new(orchestrator))
        .layer(cors_layer(&config.server.cors_origins_list()))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Query Sherpa listening");

    axum::serve(listener, app).await?;
    Ok(())
}

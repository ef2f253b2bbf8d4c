use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use covergen_ai::{build_image_model, build_moderation_model, build_text_model, AiConfig};
use covergen_ai::CreativeDirector;
use covergen_billing::{BillingConfig, StripeClient};
use covergen_core::cache::TtlCache;
use covergen_core::rate_limit::FixedWindowLimiter;
use covergen_pipeline::{CoverPipeline, JobStore, PipelineConfig};
use covergen_storage::{build_store, StorageConfig};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covergen_api::background;
use covergen_api::config::ServerConfig;
use covergen_api::router::build_app_router;
use covergen_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covergen_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let ai_config = AiConfig::from_env();
    let storage_config = StorageConfig::from_env();
    let billing_config = BillingConfig::from_env();
    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = covergen_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    covergen_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    covergen_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Object storage ---
    let store = build_store(&storage_config)
        .await
        .expect("Failed to initialise object storage");

    // --- AI providers ---
    let text_model = build_text_model(&ai_config).expect("Text model is not configured");
    let image_model = build_image_model(&ai_config).expect("Image model is not configured");
    let moderation =
        build_moderation_model(&ai_config).expect("Moderation model is not configured");
    if moderation.is_none() {
        tracing::info!("Remote moderation disabled, using local rules only");
    }

    // --- Pipeline ---
    let directions = Arc::new(TtlCache::new(pipeline_config.direction_ttl));
    let pipeline = Arc::new(CoverPipeline::new(
        CreativeDirector::new(text_model),
        image_model,
        Arc::clone(&store),
        Arc::clone(&directions),
        pipeline_config,
    ));

    // --- Billing ---
    let stripe = match StripeClient::from_config(&billing_config) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::warn!(reason = %err, "Stripe billing disabled");
            None
        }
    };

    // --- Rate limiting ---
    let window = Duration::from_secs(config.rate_limit.window_secs);
    let api_limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit.requests_per_window,
        window,
    ));
    let generate_limiter = Arc::new(FixedWindowLimiter::new(
        config.rate_limit.generate_per_window,
        window,
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline,
        jobs: Arc::new(JobStore::new()),
        directions,
        api_limiter,
        generate_limiter,
        store,
        moderation,
        billing: Arc::new(billing_config),
        stripe,
    };

    // --- Sweeper ---
    let sweeper_cancel = CancellationToken::new();
    let sweeper_handle = tokio::spawn(background::sweeper::run(
        state.clone(),
        sweeper_cancel.clone(),
    ));

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweeper_cancel.cancel();
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        sweeper_handle,
    )
    .await;
    tracing::info!("Sweeper stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

//! Ledgerly billing service entry point.
//!
//! Loads configuration, wires adapters into the billing router, and
//! serves the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HeaderName;
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ledgerly::adapters::email::ResendEmailSender;
use ledgerly::adapters::gateway::{GatewaySettings, HttpPaymentGateway};
use ledgerly::adapters::http::billing::{billing_router, BillingAppState};
use ledgerly::adapters::postgres::PostgresUserPlanRepository;
use ledgerly::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    let state = BillingAppState {
        plans: Arc::new(PostgresUserPlanRepository::new(pool)),
        gateway: Arc::new(HttpPaymentGateway::new(GatewaySettings::from_config(
            &config.gateway,
        ))),
        mailer: Arc::new(ResendEmailSender::new(&config.email)),
        webhook_secret: config.gateway.webhook_secret.clone(),
        success_redirect_url: config.gateway.success_redirect_url.clone(),
        failure_redirect_url: config.gateway.failure_redirect_url.clone(),
        currency: config.gateway.currency.clone(),
    };

    let request_id_header = HeaderName::from_static("x-request-id");
    let app = billing_router()
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config));

    let addr = config.server.socket_addr();
    tracing::info!(%addr, environment = ?config.server.environment, "Starting billing service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone()));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(Any)
    }
}

use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod domain;
mod metrics;
mod service;
mod storage;

use api::ApiSettings;
use config::{Config, StorageBackend};
use domain::order::ItemRef;
use service::OrderService;
use storage::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pizza_orders=debug")),
        )
        .init();

    let config = Config::parse();
    tracing::info!("Starting pizza order service");

    // === 1. Storage backend ===
    let repository = connect_repository(&config).await?;

    // === 2. Metrics registry ===
    let metrics = Arc::new(metrics::Metrics::new()?);

    // === 3. Order service (the only path to the repository) ===
    let order_service = web::Data::new(OrderService::new(repository, metrics.clone()));

    // === 4. Shutdown: actix drains for the grace period, then store ops are cancelled ===
    let grace = config.shutdown_grace();
    let shutdown_rx = service::cancel_after_grace(
        async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        },
        grace,
    );

    let settings = web::Data::new(ApiSettings {
        auth_key: config.auth_key()?,
        request_timeout: config.request_timeout(),
        shutdown: Some(shutdown_rx),
    });
    let metrics = web::Data::new(metrics);

    // === 5. HTTP server ===
    let (host, port) = config.bind_address();
    tracing::info!("Listening on http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(order_service.clone())
            .app_data(settings.clone())
            .app_data(metrics.clone())
            .configure(api::configure_routes)
            .configure(metrics::configure_routes)
    })
    .shutdown_timeout(grace.as_secs())
    .bind((host.as_str(), port))?
    .run()
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_repository(config: &Config) -> anyhow::Result<Arc<dyn OrderRepository>> {
    match config.storage {
        StorageBackend::Postgres => {
            tracing::info!(
                host = %config.db_host,
                database = %config.db_name,
                max_connections = config.db_max_connections,
                "Connecting to Postgres..."
            );
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect_with(config.connect_options()?)
                .await?;

            if config.apply_schema {
                storage::apply_schema(&pool).await?;
            }

            Ok(Arc::new(PostgresOrderRepository::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!(
                catalog_size = config.memory_catalog.len(),
                "Using in-memory storage; orders are lost on restart"
            );
            let catalog = config.memory_catalog.iter().copied().map(ItemRef);
            Ok(Arc::new(InMemoryOrderRepository::with_catalog(catalog)))
        }
    }
}

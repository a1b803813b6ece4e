// ============================================================================
// API Module - HTTP adapter over OrderService
// ============================================================================
//
// Thin actix-web handlers: decode the request, build a RequestContext, call
// the service, map the outcome to a status code. No lifecycle rule lives
// here.
//
// ============================================================================

mod auth;
mod dto;
mod error;
mod handlers;

use actix_web::web;
use std::time::Duration;
use tokio::sync::watch;

use crate::service::RequestContext;

pub use auth::{AuthKey, Authenticated};
pub use error::ApiError;

/// Per-deployment settings the handlers need besides the service itself.
#[derive(Clone)]
pub struct ApiSettings {
    pub auth_key: AuthKey,
    pub request_timeout: Option<Duration>,
    pub shutdown: Option<watch::Receiver<bool>>,
}

impl ApiSettings {
    pub fn request_context(&self) -> RequestContext {
        let mut ctx = RequestContext::new();
        if let Some(timeout) = self.request_timeout {
            ctx = ctx.with_timeout(timeout);
        }
        if let Some(shutdown) = &self.shutdown {
            ctx = ctx.with_cancellation(shutdown.clone());
        }
        ctx
    }
}

/// Mount the order routes together with body/query decoding settings.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::create_order))
                .route("", web::get().to(handlers::list_orders))
                .route("/{order_id}", web::get().to(handlers::get_order))
                .route("/{order_id}/items", web::post().to(handlers::add_items_to_order))
                .route("/{order_id}/done", web::post().to(handlers::set_order_done)),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        ApiError::BadRequest("error decoding JSON".to_string()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected query string");
        ApiError::BadRequest("invalid query string".to_string()).into()
    })
}

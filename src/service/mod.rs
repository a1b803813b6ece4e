// ============================================================================
// Service Module - Order Service Façade
// ============================================================================
//
// Transport code talks to `OrderService` only. The service bounds every
// call by the caller's `RequestContext`, converts storage failures into the
// domain taxonomy, and records logs and metrics for each operation.
//
// ============================================================================

mod context;
mod order_service;

pub use context::{cancel_after_grace, RequestContext};
pub use order_service::OrderService;

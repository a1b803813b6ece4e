// ============================================================================
// Storage Module - Order Repository
// ============================================================================
//
// The repository owns persistence. Every mutating operation runs inside one
// store transaction: load current state, decide via the lifecycle state
// machine, write, commit. Any failure drops the transaction, which rolls it
// back, so a batch of items is attached completely or not at all.
//
// Backends:
// - postgres/ - sqlx PgPool, used by the running service
// - memory/   - tokio RwLock, used by tests and local runs without a database
//
// ============================================================================

mod memory;
mod postgres;
mod schema;

use async_trait::async_trait;

use crate::domain::order::{CreatedOrder, ItemRef, Order, OrderError, OrderId, OrderWithItems};

pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use schema::apply_schema;

/// Storage-level failure. Classified outcomes travel as `Domain`; everything
/// else is an infrastructure problem the caller only sees as a generic error.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Domain(#[from] OrderError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Create an order and attach `item_refs` to it, in input order, as one
    /// transaction. The first reference missing from the catalog aborts the
    /// whole call with `NotFound { item }`.
    async fn create_order(
        &self,
        item_refs: &[ItemRef],
        is_done: bool,
    ) -> Result<CreatedOrder, RepositoryError>;

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, RepositoryError>;

    async fn get_order_with_items(&self, order_id: &OrderId)
        -> Result<OrderWithItems, RepositoryError>;

    /// Attach items to an open order. Rejects done orders with `AlreadyDone`
    /// and rolls back the whole batch on the first missing item.
    async fn add_items_to_order(
        &self,
        order_id: &OrderId,
        item_refs: &[ItemRef],
    ) -> Result<(), RepositoryError>;

    /// Flip `done` from false to true. A second call fails with `AlreadyDone`.
    async fn set_order_done(&self, order_id: &OrderId) -> Result<(), RepositoryError>;

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn list_orders_by_done(&self, done: bool) -> Result<Vec<Order>, RepositoryError>;
}

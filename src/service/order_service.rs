use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::domain::order::{
    CreatedOrder, DoneFilter, ItemRef, Order, OrderError, OrderId, OrderWithItems,
};
use crate::metrics::Metrics;
use crate::storage::{OrderRepository, RepositoryError};

use super::context::RequestContext;

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: RequestContext → Repository transaction → OrderError
//
// Lifecycle rules (OrderStatus::apply) run inside the repository's
// transaction so the decision and the write commit together. No operation is
// retried: a failure is reported once to the caller.
//
// ============================================================================

pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    metrics: Arc<Metrics>,
}

impl OrderService {
    pub fn new(repository: Arc<dyn OrderRepository>, metrics: Arc<Metrics>) -> Self {
        Self { repository, metrics }
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        item_refs: &[ItemRef],
        is_done: bool,
    ) -> Result<CreatedOrder, OrderError> {
        let created = self
            .run(ctx, "create_order", self.repository.create_order(item_refs, is_done))
            .await?;
        self.metrics.record_items_attached(created.items.len());
        Ok(created)
    }

    #[allow(dead_code)]
    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn get_order(&self, ctx: &RequestContext, order_id: &OrderId) -> Result<Order, OrderError> {
        self.run(ctx, "get_order", self.repository.get_order(order_id)).await
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn get_order_with_items(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
    ) -> Result<OrderWithItems, OrderError> {
        self.run(ctx, "get_order_with_items", self.repository.get_order_with_items(order_id))
            .await
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn add_items_to_order(
        &self,
        ctx: &RequestContext,
        order_id: &OrderId,
        item_refs: &[ItemRef],
    ) -> Result<(), OrderError> {
        self.run(
            ctx,
            "add_items_to_order",
            self.repository.add_items_to_order(order_id, item_refs),
        )
        .await?;
        self.metrics.record_items_attached(item_refs.len());
        Ok(())
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn set_order_done(&self, ctx: &RequestContext, order_id: &OrderId) -> Result<(), OrderError> {
        self.run(ctx, "set_order_done", self.repository.set_order_done(order_id)).await
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>, OrderError> {
        self.run(ctx, "list_orders", self.repository.list_orders()).await
    }

    #[tracing::instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    pub async fn list_orders_by_done(
        &self,
        ctx: &RequestContext,
        done: bool,
    ) -> Result<Vec<Order>, OrderError> {
        self.run(ctx, "list_orders_by_done", self.repository.list_orders_by_done(done))
            .await
    }

    /// List orders according to a parsed `done` filter.
    pub async fn list(&self, ctx: &RequestContext, filter: DoneFilter) -> Result<Vec<Order>, OrderError> {
        match filter {
            DoneFilter::All => self.list_orders(ctx).await,
            DoneFilter::Only(done) => self.list_orders_by_done(ctx, done).await,
        }
    }

    /// Drive one repository call under the caller's context. Losing the race
    /// against the context drops `operation`, and with it any open
    /// transaction, which rolls back.
    async fn run<T, F>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        future: F,
    ) -> Result<T, OrderError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        let started = Instant::now();

        let result = tokio::select! {
            biased;
            result = future => result.map_err(|e| normalize(operation, e)),
            _ = ctx.done() => {
                tracing::warn!(operation, deadline = ?ctx.deadline(), "Operation cancelled before completion");
                Err(OrderError::Cancelled)
            }
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        self.metrics
            .record_operation(operation, outcome, started.elapsed().as_secs_f64());

        result
    }
}

/// Reduce a storage failure to the domain taxonomy. Unclassified detail is
/// logged here and never travels further than the `Storage` message.
fn normalize(operation: &str, error: RepositoryError) -> OrderError {
    match error {
        RepositoryError::Domain(e) => {
            tracing::debug!(operation, error = %e, "Order operation rejected");
            e
        }
        RepositoryError::Database(e) => {
            tracing::error!(operation, error = %e, "Database failure");
            OrderError::Storage(e.to_string())
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

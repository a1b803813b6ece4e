use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::order::{
    CreatedOrder, ItemRef, Order, OrderCommand, OrderError, OrderId, OrderItem, OrderStatus,
    OrderWithItems,
};

use super::{OrderRepository, RepositoryError};

/// SQLSTATE raised by Postgres when a write references a missing row.
const FOREIGN_KEY_VIOLATION: &str = "23503";

// ============================================================================
// Postgres Order Repository
// ============================================================================
//
// Responsibilities:
// 1. Run each mutating operation in a single transaction
// 2. Lock the order row (FOR UPDATE) before deciding on a transition, so two
//    concurrent "mark done" calls serialize and the second sees done = true
// 3. Translate foreign-key violations and missing rows into domain errors
//
// Returning early with `?` drops the open transaction, which rolls it back.
//
// ============================================================================

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the order row and return its current status.
    async fn lock_status(
        tx: &mut Transaction<'_, Postgres>,
        order_uuid: Uuid,
        order_id: &OrderId,
    ) -> Result<OrderStatus, RepositoryError> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT done FROM orders WHERE order_id = $1 FOR UPDATE")
                .bind(order_uuid)
                .fetch_optional(&mut **tx)
                .await?;

        match row {
            Some((done,)) => Ok(OrderStatus::from_done(done)),
            None => Err(OrderError::order_not_found(order_id).into()),
        }
    }

    async fn insert_item(
        tx: &mut Transaction<'_, Postgres>,
        order_uuid: Uuid,
        order_id: &OrderId,
        item_ref: ItemRef,
    ) -> Result<OrderItem, RepositoryError> {
        let (id, stored_ref): (i64, i32) = sqlx::query_as(
            "INSERT INTO order_items (order_id, item_id) VALUES ($1, $2) \
             RETURNING order_item_id, item_id",
        )
        .bind(order_uuid)
        .bind(item_ref.0)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| classify_item_insert_error(e, item_ref))?;

        Ok(OrderItem {
            id,
            order_id: order_id.clone(),
            item_ref: ItemRef(stored_ref),
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create_order(
        &self,
        item_refs: &[ItemRef],
        is_done: bool,
    ) -> Result<CreatedOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_uuid, done): (Uuid, bool) =
            sqlx::query_as("INSERT INTO orders (done) VALUES ($1) RETURNING order_id, done")
                .bind(is_done)
                .fetch_one(&mut *tx)
                .await?;
        let order_id = OrderId::new(order_uuid.to_string());

        let mut items = Vec::with_capacity(item_refs.len());
        for item_ref in item_refs {
            items.push(Self::insert_item(&mut tx, order_uuid, &order_id, *item_ref).await?);
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            item_count = items.len(),
            "Created order"
        );

        Ok(CreatedOrder {
            order: Order { id: order_id, done },
            items,
        })
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, RepositoryError> {
        let Some(order_uuid) = parse_order_uuid(order_id) else {
            return Err(OrderError::order_not_found(order_id).into());
        };

        let row: Option<(bool,)> = sqlx::query_as("SELECT done FROM orders WHERE order_id = $1")
            .bind(order_uuid)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((done,)) => Ok(Order {
                id: order_id.clone(),
                done,
            }),
            None => Err(OrderError::order_not_found(order_id).into()),
        }
    }

    async fn get_order_with_items(
        &self,
        order_id: &OrderId,
    ) -> Result<OrderWithItems, RepositoryError> {
        let Some(order_uuid) = parse_order_uuid(order_id) else {
            return Err(OrderError::order_not_found(order_id).into());
        };

        let row: Option<(bool, Vec<i32>)> = sqlx::query_as(
            "SELECT o.done, \
                    COALESCE(array_agg(oi.item_id ORDER BY oi.order_item_id) \
                             FILTER (WHERE oi.item_id IS NOT NULL), '{}') \
             FROM orders o \
             LEFT JOIN order_items oi ON oi.order_id = o.order_id \
             WHERE o.order_id = $1 \
             GROUP BY o.order_id, o.done",
        )
        .bind(order_uuid)
        .fetch_optional(&self.pool)
        .await?;

        let Some((done, item_ids)) = row else {
            return Err(OrderError::order_not_found(order_id).into());
        };

        tracing::debug!(order_id = %order_id, item_count = item_ids.len(), "Loaded order with items");

        Ok(OrderWithItems {
            order: Order {
                id: order_id.clone(),
                done,
            },
            items: item_ids.into_iter().map(ItemRef).collect(),
        })
    }

    async fn add_items_to_order(
        &self,
        order_id: &OrderId,
        item_refs: &[ItemRef],
    ) -> Result<(), RepositoryError> {
        let Some(order_uuid) = parse_order_uuid(order_id) else {
            return Err(OrderError::order_not_found(order_id).into());
        };

        let mut tx = self.pool.begin().await?;

        let status = Self::lock_status(&mut tx, order_uuid, order_id).await?;
        status.apply(order_id, OrderCommand::AddItems)?;

        for item_ref in item_refs {
            Self::insert_item(&mut tx, order_uuid, order_id, *item_ref).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            item_count = item_refs.len(),
            "Attached items to order"
        );

        Ok(())
    }

    async fn set_order_done(&self, order_id: &OrderId) -> Result<(), RepositoryError> {
        let Some(order_uuid) = parse_order_uuid(order_id) else {
            return Err(OrderError::order_not_found(order_id).into());
        };

        let mut tx = self.pool.begin().await?;

        let status = Self::lock_status(&mut tx, order_uuid, order_id).await?;
        let next = status.apply(order_id, OrderCommand::MarkDone)?;

        sqlx::query("UPDATE orders SET done = $2 WHERE order_id = $1")
            .bind(order_uuid)
            .bind(next.is_done())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = %order_id, "Marked order done");

        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<(Uuid, bool)> = sqlx::query_as("SELECT order_id, done FROM orders")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(into_order).collect())
    }

    async fn list_orders_by_done(&self, done: bool) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<(Uuid, bool)> =
            sqlx::query_as("SELECT order_id, done FROM orders WHERE done = $1")
                .bind(done)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(into_order).collect())
    }
}

fn into_order((order_uuid, done): (Uuid, bool)) -> Order {
    Order {
        id: OrderId::new(order_uuid.to_string()),
        done,
    }
}

/// Order ids are UUIDs in this store; anything else cannot match a row.
fn parse_order_uuid(order_id: &OrderId) -> Option<Uuid> {
    Uuid::parse_str(order_id.as_str()).ok()
}

fn is_foreign_key_violation(code: Option<&str>) -> bool {
    code == Some(FOREIGN_KEY_VIOLATION)
}

fn classify_item_insert_error(error: sqlx::Error, item_ref: ItemRef) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &error {
        if is_foreign_key_violation(db_error.code().as_deref()) {
            tracing::debug!(
                item = %item_ref,
                constraint = ?db_error.constraint(),
                "Item reference rejected by catalog foreign key"
            );
            return OrderError::item_not_found(item_ref).into();
        }
    }

    RepositoryError::Database(error)
}

// ============================================================================
// Unit Tests
// ============================================================================

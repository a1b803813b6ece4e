//! In-memory order repository.
//!
//! Keeps orders and the item catalog behind one `tokio::sync::RwLock`.
//! Every mutating call holds the write lock for its whole
//! load-decide-write sequence and validates the full batch before touching
//! any state, which gives the same all-or-nothing outcome as a store
//! transaction.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{
    CreatedOrder, ItemRef, Order, OrderCommand, OrderError, OrderId, OrderItem, OrderStatus,
    OrderWithItems,
};

use super::{OrderRepository, RepositoryError};

#[derive(Debug, Default)]
struct StoredOrder {
    done: bool,
    items: Vec<OrderItem>,
}

#[derive(Debug, Default)]
struct MemoryState {
    catalog: HashSet<ItemRef>,
    orders: HashMap<OrderId, StoredOrder>,
    next_item_id: i64,
}

impl MemoryState {
    /// First reference in input order that the catalog does not know.
    fn first_unknown(&self, item_refs: &[ItemRef]) -> Option<ItemRef> {
        item_refs
            .iter()
            .copied()
            .find(|item_ref| !self.catalog.contains(item_ref))
    }

    fn attach(&mut self, order_id: &OrderId, item_refs: &[ItemRef]) -> Vec<OrderItem> {
        let mut created = Vec::with_capacity(item_refs.len());
        for item_ref in item_refs {
            self.next_item_id += 1;
            created.push(OrderItem {
                id: self.next_item_id,
                order_id: order_id.clone(),
                item_ref: *item_ref,
            });
        }

        if let Some(order) = self.orders.get_mut(order_id) {
            order.items.extend(created.iter().cloned());
        }

        created
    }

    fn status(&self, order_id: &OrderId) -> Result<OrderStatus, RepositoryError> {
        self.orders
            .get(order_id)
            .map(|order| OrderStatus::from_done(order.done))
            .ok_or_else(|| OrderError::order_not_found(order_id).into())
    }
}

/// Order repository backed by process memory.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryOrderRepository {
    /// Creates a repository whose catalog contains `item_refs`.
    pub fn with_catalog(item_refs: impl IntoIterator<Item = ItemRef>) -> Self {
        let state = MemoryState {
            catalog: item_refs.into_iter().collect(),
            ..MemoryState::default()
        };

        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(
        &self,
        item_refs: &[ItemRef],
        is_done: bool,
    ) -> Result<CreatedOrder, RepositoryError> {
        let mut state = self.state.write().await;

        if let Some(missing) = state.first_unknown(item_refs) {
            return Err(OrderError::item_not_found(missing).into());
        }

        let order_id = OrderId::new(Uuid::new_v4().to_string());
        state.orders.insert(
            order_id.clone(),
            StoredOrder {
                done: is_done,
                items: Vec::new(),
            },
        );
        let items = state.attach(&order_id, item_refs);

        Ok(CreatedOrder {
            order: Order {
                id: order_id,
                done: is_done,
            },
            items,
        })
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Order, RepositoryError> {
        let state = self.state.read().await;
        let status = state.status(order_id)?;

        Ok(Order {
            id: order_id.clone(),
            done: status.is_done(),
        })
    }

    async fn get_order_with_items(
        &self,
        order_id: &OrderId,
    ) -> Result<OrderWithItems, RepositoryError> {
        let state = self.state.read().await;
        let order = state
            .orders
            .get(order_id)
            .ok_or_else(|| OrderError::order_not_found(order_id))?;

        Ok(OrderWithItems {
            order: Order {
                id: order_id.clone(),
                done: order.done,
            },
            items: order.items.iter().map(|item| item.item_ref).collect(),
        })
    }

    async fn add_items_to_order(
        &self,
        order_id: &OrderId,
        item_refs: &[ItemRef],
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;

        state.status(order_id)?.apply(order_id, OrderCommand::AddItems)?;

        if let Some(missing) = state.first_unknown(item_refs) {
            return Err(OrderError::item_not_found(missing).into());
        }

        state.attach(order_id, item_refs);
        Ok(())
    }

    async fn set_order_done(&self, order_id: &OrderId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;

        let next = state.status(order_id)?.apply(order_id, OrderCommand::MarkDone)?;

        if let Some(order) = state.orders.get_mut(order_id) {
            order.done = next.is_done();
        }
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .map(|(id, order)| Order {
                id: id.clone(),
                done: order.done,
            })
            .collect())
    }

    async fn list_orders_by_done(&self, done: bool) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|(_, order)| order.done == done)
            .map(|(id, order)| Order {
                id: id.clone(),
                done: order.done,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> InMemoryOrderRepository {
        InMemoryOrderRepository::with_catalog([ItemRef(1), ItemRef(2), ItemRef(5)])
    }

    fn assert_not_found_item(err: RepositoryError, expected: i32) {
        match err {
            RepositoryError::Domain(OrderError::NotFound { entity, id }) => {
                assert_eq!(entity, crate::domain::order::Entity::Item);
                assert_eq!(id, expected.to_string());
            }
            other => panic!("expected item not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_order_returns_items_in_input_order() {
        let repo = repo();

        let created = repo.create_order(&[ItemRef(2), ItemRef(1), ItemRef(2)], false).await.unwrap();

        assert!(!created.order.done);
        assert_eq!(created.item_refs(), vec![ItemRef(2), ItemRef(1), ItemRef(2)]);
        assert!(created.items.windows(2).all(|w| w[0].id < w[1].id));
        assert!(created.items.iter().all(|item| item.order_id == created.order.id));
    }

    #[tokio::test]
    async fn test_create_order_with_unknown_item_persists_nothing() {
        let repo = repo();

        let err = repo.create_order(&[ItemRef(1), ItemRef(2), ItemRef(3)], false).await.unwrap_err();

        assert_not_found_item(err, 3);
        assert!(repo.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_unknown_item_in_input_order_is_reported() {
        let repo = repo();

        let err = repo.create_order(&[ItemRef(9), ItemRef(8)], false).await.unwrap_err();

        assert_not_found_item(err, 9);
    }

    #[tokio::test]
    async fn test_get_order_with_items() {
        let repo = repo();
        let created = repo.create_order(&[ItemRef(1)], false).await.unwrap();
        repo.add_items_to_order(&created.order.id, &[ItemRef(5)]).await.unwrap();

        let loaded = repo.get_order_with_items(&created.order.id).await.unwrap();

        assert_eq!(loaded.order, created.order);
        assert_eq!(loaded.items, vec![ItemRef(1), ItemRef(5)]);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let repo = repo();
        let missing = OrderId::new("missing");

        for err in [
            repo.get_order(&missing).await.unwrap_err(),
            repo.get_order_with_items(&missing).await.unwrap_err(),
            repo.add_items_to_order(&missing, &[ItemRef(1)]).await.unwrap_err(),
            repo.set_order_done(&missing).await.unwrap_err(),
        ] {
            assert!(matches!(
                err,
                RepositoryError::Domain(OrderError::NotFound { entity: crate::domain::order::Entity::Order, .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_add_items_rolls_back_whole_batch() {
        let repo = repo();
        let created = repo.create_order(&[ItemRef(1)], false).await.unwrap();

        let err = repo
            .add_items_to_order(&created.order.id, &[ItemRef(2), ItemRef(42), ItemRef(5)])
            .await
            .unwrap_err();

        assert_not_found_item(err, 42);
        let loaded = repo.get_order_with_items(&created.order.id).await.unwrap();
        assert_eq!(loaded.items, vec![ItemRef(1)]);
    }

    #[tokio::test]
    async fn test_done_order_rejects_items_and_second_done() {
        let repo = repo();
        let created = repo.create_order(&[], false).await.unwrap();
        let id = created.order.id;

        repo.set_order_done(&id).await.unwrap();

        let err = repo.set_order_done(&id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(OrderError::AlreadyDone { .. })));

        let err = repo.add_items_to_order(&id, &[ItemRef(5)]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Domain(OrderError::AlreadyDone { .. })));

        let loaded = repo.get_order_with_items(&id).await.unwrap();
        assert!(loaded.order.done);
        assert!(loaded.items.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_mark_done_succeeds_once() {
        let repo = repo();
        let id = repo.create_order(&[], false).await.unwrap().order.id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                let id = id.clone();
                tokio::spawn(async move { repo.set_order_done(&id).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_list_by_done_partitions_all_orders() {
        let repo = repo();
        let a = repo.create_order(&[], false).await.unwrap().order.id;
        let b = repo.create_order(&[], false).await.unwrap().order.id;
        let _c = repo.create_order(&[ItemRef(1)], true).await.unwrap().order.id;
        repo.set_order_done(&a).await.unwrap();

        let mut all: Vec<_> = repo.list_orders().await.unwrap().into_iter().map(|o| o.id).collect();
        let done = repo.list_orders_by_done(true).await.unwrap();
        let open = repo.list_orders_by_done(false).await.unwrap();

        assert!(done.iter().all(|o| o.done));
        assert!(open.iter().all(|o| !o.done));
        assert_eq!(open.iter().map(|o| &o.id).collect::<Vec<_>>(), vec![&b]);

        let mut union: Vec<_> = done.into_iter().chain(open).map(|o| o.id).collect();
        all.sort();
        union.sort();
        assert_eq!(all, union);
    }
}

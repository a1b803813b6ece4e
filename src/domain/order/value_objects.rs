use serde::{Deserialize, Serialize};
use std::fmt;


// ============================================================================
// Order Value Objects
// ============================================================================

/// Opaque order identity, generated by the store when the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Reference into the externally owned items catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRef(pub i32);

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order row without its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub done: bool,
}

/// A catalog item attached to exactly one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// Row identity assigned by the store.
    pub id: i64,
    pub order_id: OrderId,
    pub item_ref: ItemRef,
}

/// An order together with the catalog references attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<ItemRef>,
}

/// Result of creating an order: the new row and the items inserted with it,
/// in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl CreatedOrder {
    pub fn item_refs(&self) -> Vec<ItemRef> {
        self.items.iter().map(|item| item.item_ref).collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_is_transparent_in_json() {
        let id = OrderId::new("3f2b");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"3f2b\"");
        assert_eq!(id.to_string(), "3f2b");
    }

    #[test]
    fn test_item_ref_is_transparent_in_json() {
        let refs: Vec<ItemRef> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(refs, vec![ItemRef(1), ItemRef(2), ItemRef(3)]);
    }

    #[test]
    fn test_created_order_item_refs_keep_insertion_order() {
        let order_id = OrderId::new("a");
        let created = CreatedOrder {
            order: Order { id: order_id.clone(), done: false },
            items: vec![
                OrderItem { id: 7, order_id: order_id.clone(), item_ref: ItemRef(2) },
                OrderItem { id: 8, order_id, item_ref: ItemRef(1) },
            ],
        };

        assert_eq!(created.item_refs(), vec![ItemRef(2), ItemRef(1)]);
    }
}

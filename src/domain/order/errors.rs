use std::fmt;

use super::value_objects::{ItemRef, OrderId};

// ============================================================================
// Order Error Taxonomy
// ============================================================================

/// The kind of entity a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Order,
    Item,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Order => f.write_str("order"),
            Entity::Item => f.write_str("item"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: Entity, id: String },

    #[error("order {order_id} is already done")]
    AlreadyDone { order_id: OrderId },

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl OrderError {
    pub fn order_not_found(order_id: &OrderId) -> Self {
        OrderError::NotFound {
            entity: Entity::Order,
            id: order_id.to_string(),
        }
    }

    pub fn item_not_found(item_ref: ItemRef) -> Self {
        OrderError::NotFound {
            entity: Entity::Item,
            id: item_ref.to_string(),
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "not_found",
            OrderError::AlreadyDone { .. } => "already_done",
            OrderError::Validation(_) => "validation",
            OrderError::Storage(_) => "storage",
            OrderError::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let order = OrderId::new("abc");

        assert_eq!(OrderError::order_not_found(&order).to_string(), "order abc does not exist");
        assert_eq!(OrderError::item_not_found(ItemRef(3)).to_string(), "item 3 does not exist");
        assert_eq!(
            OrderError::AlreadyDone { order_id: order }.to_string(),
            "order abc is already done"
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(OrderError::item_not_found(ItemRef(1)).kind(), "not_found");
        assert_eq!(OrderError::Storage("boom".into()).kind(), "storage");
        assert_eq!(OrderError::Cancelled.kind(), "cancelled");
    }
}

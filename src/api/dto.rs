use serde::{Deserialize, Serialize};

use crate::domain::order::{CreatedOrder, ItemRef, Order, OrderId, OrderWithItems};

/// Body of `POST /orders`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<ItemRef>,
}

/// Query of `GET /orders`.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub done: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub items: Vec<ItemRef>,
    pub done: bool,
}

impl From<CreatedOrder> for OrderResponse {
    fn from(created: CreatedOrder) -> Self {
        let items = created.item_refs();
        Self {
            order_id: created.order.id,
            items,
            done: created.order.done,
        }
    }
}

impl From<OrderWithItems> for OrderResponse {
    fn from(loaded: OrderWithItems) -> Self {
        Self {
            order_id: loaded.order.id,
            items: loaded.items,
            done: loaded.order.done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub done: bool,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            done: order.done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        assert!(serde_json::from_str::<CreateOrderRequest>(r#"{"item_ids": [1]}"#).is_err());

        let request: CreateOrderRequest = serde_json::from_str(r#"{"items": [1, 2]}"#).unwrap();
        assert_eq!(request.items, vec![ItemRef(1), ItemRef(2)]);
    }

    #[test]
    fn test_order_response_shape() {
        let response = OrderResponse {
            order_id: OrderId::new("abc"),
            items: vec![ItemRef(1), ItemRef(2)],
            done: false,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"order_id": "abc", "items": [1, 2], "done": false}));
    }
}

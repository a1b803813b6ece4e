use actix_web::{web, HttpResponse};

use crate::domain::order::{DoneFilter, ItemRef, OrderId};
use crate::service::OrderService;

use super::dto::{CreateOrderRequest, ListOrdersQuery, OrderResponse, OrderSummary};
use super::{ApiError, ApiSettings, Authenticated};

/// POST /orders
pub async fn create_order(
    service: web::Data<OrderService>,
    settings: web::Data<ApiSettings>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let ctx = settings.request_context();
    let created = service.create_order(&ctx, &body.items, false).await?;

    Ok(HttpResponse::Created().json(OrderResponse::from(created)))
}

/// POST /orders/{order_id}/items
pub async fn add_items_to_order(
    service: web::Data<OrderService>,
    settings: web::Data<ApiSettings>,
    path: web::Path<String>,
    body: web::Json<Vec<ItemRef>>,
) -> Result<HttpResponse, ApiError> {
    let ctx = settings.request_context();
    let order_id = OrderId::new(path.into_inner());
    service.add_items_to_order(&ctx, &order_id, &body).await?;

    Ok(HttpResponse::Ok().body("OK"))
}

/// GET /orders/{order_id}
pub async fn get_order(
    service: web::Data<OrderService>,
    settings: web::Data<ApiSettings>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let ctx = settings.request_context();
    let order_id = OrderId::new(path.into_inner());
    let order = service.get_order_with_items(&ctx, &order_id).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /orders/{order_id}/done
pub async fn set_order_done(
    _auth: Authenticated,
    service: web::Data<OrderService>,
    settings: web::Data<ApiSettings>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let ctx = settings.request_context();
    let order_id = OrderId::new(path.into_inner());
    service.set_order_done(&ctx, &order_id).await?;

    Ok(HttpResponse::Ok().body("OK"))
}

/// GET /orders?done=0|1
pub async fn list_orders(
    _auth: Authenticated,
    service: web::Data<OrderService>,
    settings: web::Data<ApiSettings>,
    query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = DoneFilter::parse(query.done.as_deref())?;
    let ctx = settings.request_context();
    let orders = service.list(&ctx, filter).await?;

    let body: Vec<OrderSummary> = orders.into_iter().map(OrderSummary::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

// ============================================================================
// Unit Tests
// ============================================================================

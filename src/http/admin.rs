use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Store;

use super::AppState;

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /admin/users
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = state.admin.list_users().await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// GET /admin/orders
pub async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = state.admin.list_orders().await?;
    Ok(HttpResponse::Ok().json(rows))
}

/// PUT /admin/order/{order_id}/status
pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<StatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let new_status = state.status.set_status(order_id, &body.status).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Status updated",
        "orderId": order_id,
        "newStatus": new_status
    })))
}

/// GET /admin/user/{user_id}/cards
///
/// Card numbers are returned unmasked; the admin view sees the raw rows.
pub async fn user_cards(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let cards = state.store.cards_for_user(path.into_inner()).await;
    Ok(HttpResponse::Ok().json(cards))
}

/// GET /admin/stats
pub async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = state.admin.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

use super::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: Uuid,
    pub article_id: Uuid,
}

/// GET /cart/user/{user_id} — resolve (or lazily create) the user's open
/// cart and return its priced view.
pub async fn get_user_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let view = state.cart.active_cart(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /cart/add
pub async fn add_to_cart(
    state: web::Data<AppState>,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, ApiError> {
    state.cart.add_item(body.user_id, body.article_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article added to cart"
    })))
}

/// DELETE /cart/remove/{cart_id}/{body_part_id}
pub async fn remove_from_cart(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (cart_id, body_part_id) = path.into_inner();
    state.cart.remove_item(cart_id, body_part_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article removed from cart"
    })))
}

/// DELETE /cart/clear/{cart_id}
pub async fn clear_cart(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    state.cart.clear_cart(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Cart cleared"
    })))
}

/// POST /cart/checkout/{cart_id}
pub async fn checkout(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let order_id = state.cart.checkout(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Order placed",
        "orderId": order_id
    })))
}

/// GET /cart/history/{user_id}
pub async fn order_history(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let orders = state.cart.order_history(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

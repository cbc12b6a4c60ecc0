use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::PaymentCard;
use crate::store::Store;

use super::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    pub user_id: Uuid,
    pub number: String,
    pub ccv: String,
    pub expiry: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    pub number: Option<String>,
    pub ccv: Option<String>,
    pub expiry: Option<String>,
}

/// GET /cards/user/{user_id}
pub async fn cards_for_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let cards = state.store.cards_for_user(path.into_inner()).await;
    Ok(HttpResponse::Ok().json(cards))
}

/// POST /cards
pub async fn add_card(
    state: web::Data<AppState>,
    body: web::Json<CardRequest>,
) -> Result<HttpResponse, ApiError> {
    if state.store.get_user(body.user_id).await.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let body = body.into_inner();
    let card = state
        .store
        .upsert_card(PaymentCard {
            id: Uuid::new_v4(),
            user_id: body.user_id,
            number: body.number,
            ccv: body.ccv,
            expiry: body.expiry,
        })
        .await;

    Ok(HttpResponse::Created().json(card))
}

/// PUT /cards/{card_id}
pub async fn update_card(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CardUpdate>,
) -> Result<HttpResponse, ApiError> {
    let Some(mut card) = state.store.get_card(path.into_inner()).await else {
        return Err(ApiError::not_found("Card not found"));
    };

    let body = body.into_inner();
    if let Some(number) = body.number {
        card.number = number;
    }
    if let Some(ccv) = body.ccv {
        card.ccv = ccv;
    }
    if let Some(expiry) = body.expiry {
        card.expiry = expiry;
    }

    let card = state.store.upsert_card(card).await;
    Ok(HttpResponse::Ok().json(card))
}

/// DELETE /cards/{card_id}
pub async fn delete_card(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    if !state.store.delete_card(path.into_inner()).await {
        return Err(ApiError::not_found("Card not found"));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Card deleted"
    })))
}

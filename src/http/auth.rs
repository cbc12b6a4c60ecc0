use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::User;
use crate::store::Store;

use super::AppState;

// Plaintext credential comparison, as in the rest of the system: these
// routes are plain single-table persistence, not an auth layer.

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    if state
        .store
        .find_user_by_username(&body.username)
        .await
        .is_some()
    {
        return Err(ApiError::conflict("This username already exists"));
    }

    let body = body.into_inner();
    let user = state
        .store
        .upsert_user(User {
            id: Uuid::new_v4(),
            username: body.username,
            password: body.password,
            address: body.address,
            role: "USER".to_string(),
        })
        .await;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": user.id,
        "username": user.username,
        "address": user.address,
        "role": user.role,
        "message": "Registration successful"
    })))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = state.store.find_user_by_username(&body.username).await;
    let Some(user) = user.filter(|u| u.password == body.password) else {
        return Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        ));
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": user.id,
        "username": user.username,
        "address": user.address,
        "role": user.role,
        "message": "Login successful"
    })))
}

/// GET /auth/check/{username}
pub async fn check_username(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let exists = state
        .store
        .find_user_by_username(&path.into_inner())
        .await
        .is_some();
    Ok(HttpResponse::Ok().json(serde_json::json!({ "exists": exists })))
}

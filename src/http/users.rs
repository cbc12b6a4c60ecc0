use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::User;
use crate::store::Store;

use super::AppState;

// Profile views never echo the password; every other field is public.

#[derive(Deserialize)]
pub struct UserUpdate {
    pub address: Option<String>,
    pub password: Option<String>,
}

fn profile(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "username": user.username,
        "address": user.address,
        "role": user.role,
    })
}

/// GET /users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let Some(user) = state.store.get_user(path.into_inner()).await else {
        return Err(ApiError::not_found("User not found"));
    };
    Ok(HttpResponse::Ok().json(profile(&user)))
}

/// GET /users/all
pub async fn list_users(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let users: Vec<_> = state.store.list_users().await.iter().map(profile).collect();
    Ok(HttpResponse::Ok().json(users))
}

/// PUT /users/{id}
///
/// Partial update of address and password. An empty password in the
/// payload is ignored rather than stored; the username is immutable.
pub async fn update_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UserUpdate>,
) -> Result<HttpResponse, ApiError> {
    let Some(mut user) = state.store.get_user(path.into_inner()).await else {
        return Err(ApiError::not_found("User not found"));
    };

    let body = body.into_inner();
    if let Some(address) = body.address {
        user.address = address;
    }
    if let Some(password) = body.password {
        if !password.is_empty() {
            user.password = password;
        }
    }

    let user = state.store.upsert_user(user).await;
    let mut view = profile(&user);
    view["message"] = serde_json::json!("Profile updated");
    Ok(HttpResponse::Ok().json(view))
}

/// DELETE /users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.store.delete_user(id).await {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!(user_id = %id, "user deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "User deleted"
    })))
}

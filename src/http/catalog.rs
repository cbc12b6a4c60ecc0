use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Article, BodyPart};
use crate::store::Store;

use super::AppState;

// Catalog CRUD: plain single-table persistence over the store. Listings
// only show available articles; retired inventory disappears from them.

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub state: String,
    #[serde(default)]
    pub description: String,
    pub price: Option<Decimal>,
    pub extracted_at: Option<DateTime<Utc>>,
    #[serde(default = "default_available")]
    pub available: bool,
    pub body_part_id: Option<Uuid>,
}

fn default_available() -> bool {
    true
}

#[derive(Deserialize)]
pub struct BodyPartInput {
    pub name: String,
}

impl ArticleInput {
    fn into_article(self, id: Uuid) -> Article {
        Article {
            id,
            state: self.state,
            description: self.description,
            price: self.price,
            extracted_at: self.extracted_at,
            available: self.available,
            body_part_id: self.body_part_id,
        }
    }
}

/// GET /articles — available articles only.
pub async fn list_articles(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let articles: Vec<Article> = state
        .store
        .list_articles()
        .await
        .into_iter()
        .filter(|a| a.available)
        .collect();
    Ok(HttpResponse::Ok().json(articles))
}

/// GET /article/{id}
pub async fn get_article(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let Some(article) = state.store.get_article(path.into_inner()).await else {
        return Err(ApiError::not_found("Article not found"));
    };
    Ok(HttpResponse::Ok().json(article))
}

/// POST /articles
pub async fn create_article(
    state: web::Data<AppState>,
    body: web::Json<ArticleInput>,
) -> Result<HttpResponse, ApiError> {
    let article = state
        .store
        .upsert_article(body.into_inner().into_article(Uuid::new_v4()))
        .await;
    Ok(HttpResponse::Created().json(article))
}

/// PUT /article/{id}
pub async fn update_article(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ArticleInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if state.store.get_article(id).await.is_none() {
        return Err(ApiError::not_found("Article not found"));
    }
    let article = state
        .store
        .upsert_article(body.into_inner().into_article(id))
        .await;
    Ok(HttpResponse::Ok().json(article))
}

/// DELETE /article/{id}
pub async fn delete_article(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    if !state.store.delete_article(path.into_inner()).await {
        return Err(ApiError::not_found("Article not found"));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Article deleted"
    })))
}

/// GET /articles/bodyPart/{body_part_id} — available articles listed
/// under one body part.
pub async fn articles_for_body_part(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let articles: Vec<Article> = state
        .store
        .articles_for_body_part(path.into_inner())
        .await
        .into_iter()
        .filter(|a| a.available)
        .collect();
    Ok(HttpResponse::Ok().json(articles))
}

/// GET /bodyParts
pub async fn list_body_parts(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let parts = state.store.list_body_parts().await;
    Ok(HttpResponse::Ok().json(parts))
}

/// GET /bodyPart/{id}
pub async fn get_body_part(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let Some(part) = state.store.get_body_part(path.into_inner()).await else {
        return Err(ApiError::not_found("Body part not found"));
    };
    Ok(HttpResponse::Ok().json(part))
}

/// POST /bodyParts
pub async fn create_body_part(
    state: web::Data<AppState>,
    body: web::Json<BodyPartInput>,
) -> Result<HttpResponse, ApiError> {
    let part = state
        .store
        .upsert_body_part(BodyPart {
            id: Uuid::new_v4(),
            name: body.into_inner().name,
        })
        .await;
    Ok(HttpResponse::Created().json(part))
}

/// PUT /bodyPart/{id}
pub async fn update_body_part(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<BodyPartInput>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if state.store.get_body_part(id).await.is_none() {
        return Err(ApiError::not_found("Body part not found"));
    }
    let part = state
        .store
        .upsert_body_part(BodyPart {
            id,
            name: body.into_inner().name,
        })
        .await;
    Ok(HttpResponse::Ok().json(part))
}

/// DELETE /bodyPart/{id}
pub async fn delete_body_part(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    if !state.store.delete_body_part(path.into_inner()).await {
        return Err(ApiError::not_found("Body part not found"));
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Body part deleted"
    })))
}

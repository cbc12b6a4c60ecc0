use actix_web::web;
use std::sync::Arc;

use crate::domain::admin::AdminService;
use crate::domain::cart::CartService;
use crate::domain::order::OrderStatusService;
use crate::metrics::{self, Metrics};
use crate::store::Store;

mod admin;
mod auth;
mod cards;
mod cart;
mod catalog;
mod users;

// ============================================================================
// HTTP Layer - actix-web route handlers
// ============================================================================

/// Shared application state: one service per concern over the injected
/// store. Cloned cheaply into each worker via `web::Data`.
pub struct AppState {
    pub cart: CartService,
    pub status: OrderStatusService,
    pub admin: AdminService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        Self {
            cart: CartService::new(store.clone(), metrics.clone()),
            status: OrderStatusService::new(store.clone(), metrics),
            admin: AdminService::new(store.clone()),
            store,
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("/user/{user_id}", web::get().to(cart::get_user_cart))
            .route("/add", web::post().to(cart::add_to_cart))
            .route(
                "/remove/{cart_id}/{body_part_id}",
                web::delete().to(cart::remove_from_cart),
            )
            .route("/clear/{cart_id}", web::delete().to(cart::clear_cart))
            .route("/checkout/{cart_id}", web::post().to(cart::checkout))
            .route("/history/{user_id}", web::get().to(cart::order_history)),
    )
    .service(
        web::scope("/admin")
            .route("/users", web::get().to(admin::list_users))
            .route("/orders", web::get().to(admin::list_orders))
            .route(
                "/order/{order_id}/status",
                web::put().to(admin::update_order_status),
            )
            .route("/user/{user_id}/cards", web::get().to(admin::user_cards))
            .route("/stats", web::get().to(admin::stats)),
    )
    .service(
        web::scope("/users")
            // "/all" must register before "/{id}" so it is not captured
            // as an id.
            .route("/all", web::get().to(users::list_users))
            .service(
                web::resource("/{id}")
                    .route(web::get().to(users::get_user))
                    .route(web::put().to(users::update_user))
                    .route(web::delete().to(users::delete_user)),
            ),
    )
    .service(
        web::scope("/auth")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .route("/check/{username}", web::get().to(auth::check_username)),
    )
    .service(
        web::scope("/cards")
            .route("/user/{user_id}", web::get().to(cards::cards_for_user))
            .service(web::resource("").route(web::post().to(cards::add_card)))
            .service(
                web::resource("/{card_id}")
                    .route(web::put().to(cards::update_card))
                    .route(web::delete().to(cards::delete_card)),
            ),
    )
    .service(
        web::resource("/articles")
            .route(web::get().to(catalog::list_articles))
            .route(web::post().to(catalog::create_article)),
    )
    .route(
        "/articles/bodyPart/{body_part_id}",
        web::get().to(catalog::articles_for_body_part),
    )
    .service(
        web::resource("/article/{id}")
            .route(web::get().to(catalog::get_article))
            .route(web::put().to(catalog::update_article))
            .route(web::delete().to(catalog::delete_article)),
    )
    .service(
        web::resource("/bodyParts")
            .route(web::get().to(catalog::list_body_parts))
            .route(web::post().to(catalog::create_body_part)),
    )
    .service(
        web::resource("/bodyPart/{id}")
            .route(web::get().to(catalog::get_body_part))
            .route(web::put().to(catalog::update_body_part))
            .route(web::delete().to(catalog::delete_body_part)),
    )
    .route("/health", web::get().to(metrics::health_handler))
    .route("/metrics", web::get().to(metrics::metrics_handler));
}

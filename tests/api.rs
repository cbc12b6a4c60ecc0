//! End-to-end exercises of the REST surface against an in-memory store.

use actix_web::{test, web, App};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use chopshop::http::{self, AppState};
use chopshop::metrics::Metrics;
use chopshop::models::{Article, BodyPart, User};
use chopshop::store::{MemoryStore, Store};

struct TestContext {
    state: web::Data<AppState>,
    metrics: web::Data<Arc<Metrics>>,
    store: Arc<MemoryStore>,
}

fn context() -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let metrics = Arc::new(Metrics::new().unwrap());
    let state = web::Data::new(AppState::new(store.clone(), metrics.clone()));
    TestContext {
        state,
        metrics: web::Data::new(metrics),
        store,
    }
}

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data($ctx.state.clone())
                .app_data($ctx.metrics.clone())
                .configure(http::configure),
        )
        .await
    };
}

async fn seed_user(store: &MemoryStore, username: &str) -> Uuid {
    store
        .upsert_user(User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: "secret".to_string(),
            address: "13 Morgue Lane".to_string(),
            role: "USER".to_string(),
        })
        .await
        .id
}

async fn seed_article(store: &MemoryStore, name: &str, price: i64) -> Article {
    let part = store
        .upsert_body_part(BodyPart {
            id: Uuid::new_v4(),
            name: name.to_string(),
        })
        .await;
    store
        .upsert_article(Article {
            id: Uuid::new_v4(),
            state: "Excellent".to_string(),
            description: String::new(),
            price: Some(Decimal::from(price)),
            extracted_at: None,
            available: true,
            body_part_id: Some(part.id),
        })
        .await
}

#[actix_web::test]
async fn cart_is_created_lazily_and_is_stable() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "u1").await;

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{user_id}"))
        .to_request();
    let first: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(first["itemCount"], 0);
    assert_eq!(first["totalPrice"], "0.00");

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{user_id}"))
        .to_request();
    let second: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second["cartId"], first["cartId"]);
}

#[actix_web::test]
async fn unknown_user_cart_is_404_with_message() {
    let ctx = context();
    let app = init_app!(ctx);

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User not found");
}

#[actix_web::test]
async fn add_item_then_view_then_duplicate_conflict() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "u1").await;
    let article = seed_article(&ctx.store, "Rein gauche", 5000).await;

    let add = || {
        test::TestRequest::post()
            .uri("/cart/add")
            .set_json(serde_json::json!({
                "userId": user_id,
                "articleId": article.id
            }))
            .to_request()
    };

    let resp = test::call_service(&app, add()).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{user_id}"))
        .to_request();
    let view: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["itemCount"], 1);
    assert_eq!(view["items"][0]["price"], "5000");
    assert_eq!(view["items"][0]["articleName"], "Rein gauche - Excellent");
    assert_eq!(view["totalPrice"], "5000.00");
    assert!(view["items"][0].get("dateAjout").is_some());

    let resp = test::call_service(&app, add()).await;
    assert_eq!(resp.status(), 409);

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{user_id}"))
        .to_request();
    let view: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["itemCount"], 1);
}

#[actix_web::test]
async fn add_item_error_paths() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "u1").await;

    // Unknown article.
    let req = test::TestRequest::post()
        .uri("/cart/add")
        .set_json(serde_json::json!({
            "userId": user_id,
            "articleId": Uuid::new_v4()
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // Article without a body part.
    let orphan = ctx
        .store
        .upsert_article(Article {
            id: Uuid::new_v4(),
            state: "Inconnu".to_string(),
            description: String::new(),
            price: None,
            extracted_at: None,
            available: true,
            body_part_id: None,
        })
        .await;
    let req = test::TestRequest::post()
        .uri("/cart/add")
        .set_json(serde_json::json!({
            "userId": user_id,
            "articleId": orphan.id
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_web::test]
async fn remove_and_clear_semantics() {
    let ctx = context();
    let app = init_app!(ctx);

    // Removing an item that is not there is 404.
    let req = test::TestRequest::delete()
        .uri(&format!("/cart/remove/{}/{}", Uuid::new_v4(), Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // Clearing an unknown cart succeeds as a no-op.
    let req = test::TestRequest::delete()
        .uri(&format!("/cart/clear/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
}

#[actix_web::test]
async fn checkout_retires_inventory_and_builds_history() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "u1").await;
    let kidney = seed_article(&ctx.store, "Rein gauche", 5000).await;
    let liver = seed_article(&ctx.store, "Foie", 250).await;

    for article in [&kidney, &liver] {
        let req = test::TestRequest::post()
            .uri("/cart/add")
            .set_json(serde_json::json!({
                "userId": user_id,
                "articleId": article.id
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{user_id}"))
        .to_request();
    let view: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let cart_id = view["cartId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/cart/checkout/{cart_id}"))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["orderId"].as_str().unwrap(), cart_id);

    // Retired articles vanish from the catalog listing.
    let req = test::TestRequest::get().uri("/articles").to_request();
    let listing: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listing.as_array().unwrap().len(), 0);

    // History shows one pending order with the purchase snapshot.
    let req = test::TestRequest::get()
        .uri(&format!("/cart/history/{user_id}"))
        .to_request();
    let history: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let orders = history.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "PENDING");
    assert_eq!(orders[0]["totalPrice"], "5250.00");
    assert_eq!(orders[0]["itemCount"], 2);
}

#[actix_web::test]
async fn checkout_unknown_cart_is_404() {
    let ctx = context();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri(&format!("/cart/checkout/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn admin_status_workflow_and_stats() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "admin-target").await;
    let article = seed_article(&ctx.store, "Coeur", 10_000).await;

    let req = test::TestRequest::post()
        .uri("/cart/add")
        .set_json(serde_json::json!({
            "userId": user_id,
            "articleId": article.id
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/cart/user/{user_id}"))
        .to_request();
    let view: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let cart_id = view["cartId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/cart/checkout/{cart_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    // Invalid status is rejected and the stored status is unchanged.
    let req = test::TestRequest::put()
        .uri(&format!("/admin/order/{cart_id}/status"))
        .set_json(serde_json::json!({ "status": "SHIPPED" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get().uri("/admin/orders").to_request();
    let orders: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(orders[0]["status"], "PENDING");

    // Valid overwrite.
    let req = test::TestRequest::put()
        .uri(&format!("/admin/order/{cart_id}/status"))
        .set_json(serde_json::json!({ "status": "DELIVERED" }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["newStatus"], "DELIVERED");

    let req = test::TestRequest::get().uri("/admin/stats").to_request();
    let stats: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["totalOrders"], 1);
    assert_eq!(stats["totalRevenue"], "10000.00");
    assert_eq!(stats["ordersByStatus"]["DELIVERED"], 1);
    assert_eq!(stats["ordersByStatus"]["PENDING"], 0);

    let req = test::TestRequest::get().uri("/admin/users").to_request();
    let users: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let row = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "admin-target")
        .unwrap();
    assert_eq!(row["orderCount"], 1);
}

#[actix_web::test]
async fn auth_register_login_and_duplicate_username() {
    let ctx = context();
    let app = init_app!(ctx);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(serde_json::json!({
            "username": "graverobber",
            "password": "secret",
            "address": "13 Morgue Lane"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(created["role"], "USER");

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(serde_json::json!({
            "username": "graverobber",
            "password": "other",
            "address": ""
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(serde_json::json!({
            "username": "graverobber",
            "password": "wrong"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(serde_json::json!({
            "username": "graverobber",
            "password": "secret"
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["role"], "USER");

    let req = test::TestRequest::get()
        .uri("/auth/check/graverobber")
        .to_request();
    let check: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(check["exists"], true);
}

#[actix_web::test]
async fn cards_crud() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "payer").await;

    // Unknown user cannot attach a card.
    let req = test::TestRequest::post()
        .uri("/cards")
        .set_json(serde_json::json!({
            "userId": Uuid::new_v4(),
            "number": "4970100000000000",
            "ccv": "123",
            "expiry": "12/27"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::post()
        .uri("/cards")
        .set_json(serde_json::json!({
            "userId": user_id,
            "number": "4970100000000000",
            "ccv": "123",
            "expiry": "12/27"
        }))
        .to_request();
    let card: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let card_id = card["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/cards/user/{user_id}"))
        .to_request();
    let cards: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cards.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/cards/{card_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);

    let req = test::TestRequest::delete()
        .uri(&format!("/cards/{card_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn user_profiles_update_and_delete() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "donor").await;
    seed_user(&ctx.store, "courier").await;

    // Profile view carries no password field.
    let req = test::TestRequest::get()
        .uri(&format!("/users/{user_id}"))
        .to_request();
    let profile: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["username"], "donor");
    assert_eq!(profile["address"], "13 Morgue Lane");
    assert!(profile.get("password").is_none());

    let req = test::TestRequest::get().uri("/users/all").to_request();
    let users: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    // Partial update: new address sticks, empty password is ignored.
    let req = test::TestRequest::put()
        .uri(&format!("/users/{user_id}"))
        .set_json(serde_json::json!({ "address": "4 Crypt Row", "password": "" }))
        .to_request();
    let updated: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["address"], "4 Crypt Row");
    assert_eq!(updated["message"], "Profile updated");
    let stored = ctx.store.get_user(user_id).await.unwrap();
    assert_eq!(stored.address, "4 Crypt Row");
    assert_eq!(stored.password, "secret");

    let req = test::TestRequest::put()
        .uri(&format!("/users/{}", Uuid::new_v4()))
        .set_json(serde_json::json!({ "address": "nowhere" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    // Deletion frees the username for re-registration.
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{user_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 200);
    let req = test::TestRequest::delete()
        .uri(&format!("/users/{user_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
    let req = test::TestRequest::get()
        .uri("/auth/check/donor")
        .to_request();
    let check: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(check["exists"], false);
}

#[actix_web::test]
async fn admin_lists_a_users_cards() {
    let ctx = context();
    let app = init_app!(ctx);
    let user_id = seed_user(&ctx.store, "payer").await;
    let other_id = seed_user(&ctx.store, "bystander").await;

    for (owner, number) in [(user_id, "4970100000000000"), (other_id, "5100000000000000")] {
        let req = test::TestRequest::post()
            .uri("/cards")
            .set_json(serde_json::json!({
                "userId": owner,
                "number": number,
                "ccv": "123",
                "expiry": "12/27"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/admin/user/{user_id}/cards"))
        .to_request();
    let cards: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let cards = cards.as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["number"], "4970100000000000");

    // Unknown users simply have no cards.
    let req = test::TestRequest::get()
        .uri(&format!("/admin/user/{}/cards", Uuid::new_v4()))
        .to_request();
    let cards: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(cards.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn health_and_metrics_exposed() {
    let ctx = context();
    let app = init_app!(ctx);

    let req = test::TestRequest::get().uri("/health").to_request();
    let health: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(health["status"], "healthy");

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

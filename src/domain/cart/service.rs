use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::models::{Cart, CartItem, OrderStatus};
use crate::store::{Store, StoreError};

use super::view::{assemble_lines, format_amount, CartView, OrderView};

// ============================================================================
// Cart Service
// ============================================================================
//
// Orchestrates the cart-to-order lifecycle: resolve the single open cart,
// add/remove/clear items, convert the cart into a purchased order, and
// rebuild the user's order history. The atomic read-then-write sequences
// (get-or-create cart, duplicate-checked insert, checkout commit) live in
// the store; this layer does entity validation and error mapping.
//
// ============================================================================

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
}

impl CartService {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Get-or-create the user's open cart and assemble its priced view.
    pub async fn active_cart(&self, user_id: Uuid) -> Result<CartView, ApiError> {
        if self.store.get_user(user_id).await.is_none() {
            return Err(ApiError::not_found("User not found"));
        }

        let cart = self.resolve_open_cart(user_id).await;
        let (items, total) = assemble_lines(self.store.as_ref(), cart.id, true).await;

        Ok(CartView {
            cart_id: cart.id,
            item_count: items.len(),
            items,
            total_price: format_amount(total),
            date_creation: cart.created_at,
        })
    }

    /// Add the article's body part to the user's open cart. The duplicate
    /// guard is keyed on body-part identity, not article identity: two
    /// articles sharing a body part are indistinguishable here.
    pub async fn add_item(&self, user_id: Uuid, article_id: Uuid) -> Result<(), ApiError> {
        let user = self.store.get_user(user_id).await;
        let article = self.store.get_article(article_id).await;
        let (Some(_), Some(article)) = (user, article) else {
            return Err(ApiError::not_found("User or article not found"));
        };

        let Some(body_part_id) = article.body_part_id else {
            return Err(ApiError::bad_request("Article has no associated body part"));
        };

        let cart = self.resolve_open_cart(user_id).await;

        self.store
            .insert_cart_item(CartItem {
                cart_id: cart.id,
                body_part_id,
                added_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateItem { .. } => {
                    ApiError::conflict("This article is already in your cart")
                }
                other => ApiError::Internal(other.into()),
            })?;

        self.metrics.cart_items_added.inc();
        tracing::debug!(%user_id, %article_id, cart_id = %cart.id, "item added to cart");
        Ok(())
    }

    pub async fn remove_item(&self, cart_id: Uuid, body_part_id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete_cart_item(cart_id, body_part_id).await {
            return Err(ApiError::not_found("Article not found in cart"));
        }
        self.metrics.cart_items_removed.inc();
        Ok(())
    }

    /// Delete every item of the cart. No existence check on the cart
    /// itself: clearing an unknown or empty cart succeeds as a no-op.
    pub async fn clear_cart(&self, cart_id: Uuid) -> Result<usize, ApiError> {
        let removed = self.store.clear_cart_items(cart_id).await;
        tracing::debug!(%cart_id, removed, "cart cleared");
        Ok(removed)
    }

    /// Convert the cart into a purchased order: retire the backing
    /// articles, freeze the total snapshot and stamp the purchase time,
    /// all as one atomic store commit. Emptiness and openness are not
    /// re-validated.
    pub async fn checkout(&self, cart_id: Uuid) -> Result<Uuid, ApiError> {
        let committed = self
            .store
            .commit_checkout(cart_id, Utc::now())
            .await
            .map_err(|e| match e {
                StoreError::CartNotFound(_) => ApiError::not_found("Cart not found"),
                other => ApiError::Internal(other.into()),
            })?;

        self.metrics.checkouts.inc();
        tracing::info!(order_id = %committed.id, total = %committed.total_price, "cart checked out");
        Ok(committed.id)
    }

    /// Purchased orders for a user, newest first, each with its assembled
    /// line items and a total recomputed from current catalog prices.
    pub async fn order_history(&self, user_id: Uuid) -> Result<Vec<OrderView>, ApiError> {
        if self.store.get_user(user_id).await.is_none() {
            return Err(ApiError::not_found("User not found"));
        }

        let mut views = Vec::new();
        for order in self.store.orders_for_user(user_id).await {
            views.push(self.order_view(&order).await);
        }
        Ok(views)
    }

    async fn order_view(&self, order: &Cart) -> OrderView {
        let (items, total) = assemble_lines(self.store.as_ref(), order.id, false).await;
        OrderView {
            order_id: order.id,
            order_date: order.purchased_at.unwrap_or(order.created_at),
            creation_date: order.created_at,
            status: order.status.unwrap_or(OrderStatus::Pending),
            item_count: items.len(),
            items,
            total_price: format_amount(total),
        }
    }

    async fn resolve_open_cart(&self, user_id: Uuid) -> Cart {
        let (cart, created) = self.store.resolve_open_cart(user_id, Utc::now()).await;
        if created {
            self.metrics.carts_created.inc();
            tracing::debug!(%user_id, cart_id = %cart.id, "created open cart");
        }
        cart
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

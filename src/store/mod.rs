use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Article, BodyPart, Cart, CartItem, PaymentCard, User};

mod memory;

pub use memory::MemoryStore;

// ============================================================================
// Storage Interface
// ============================================================================
//
// All state lives behind this trait; services receive an injected
// `Arc<dyn Store>`. The capability set is deliberately narrow:
// get-by-id, get-by-owner, upsert, delete, plus three compound operations
// (`resolve_open_cart`, `insert_cart_item`, `commit_checkout`) whose
// read-then-write sequences the implementation must execute atomically.
// This is where the single-open-cart and unique-(cart, bodyPart)
// guarantees are enforced, and where checkout either fully commits or
// leaves nothing behind.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("cart item already exists for (cart {cart_id}, body part {body_part_id})")]
    DuplicateItem { cart_id: Uuid, body_part_id: Uuid },

    #[error("cart not found: {0}")]
    CartNotFound(Uuid),
}

#[async_trait]
pub trait Store: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> Option<User>;
    async fn find_user_by_username(&self, username: &str) -> Option<User>;
    async fn list_users(&self) -> Vec<User>;
    async fn upsert_user(&self, user: User) -> User;
    /// Removes the user row only; the user's carts, orders and cards
    /// stay in place under the now-dangling id.
    async fn delete_user(&self, id: Uuid) -> bool;

    // --- Body parts ---
    async fn get_body_part(&self, id: Uuid) -> Option<BodyPart>;
    async fn list_body_parts(&self) -> Vec<BodyPart>;
    async fn upsert_body_part(&self, part: BodyPart) -> BodyPart;
    async fn delete_body_part(&self, id: Uuid) -> bool;

    // --- Articles ---
    async fn get_article(&self, id: Uuid) -> Option<Article>;
    async fn list_articles(&self) -> Vec<Article>;
    async fn articles_for_body_part(&self, body_part_id: Uuid) -> Vec<Article>;
    /// First catalog article listed under the body part, in insertion
    /// order and regardless of availability. This is the join rule used
    /// to resolve a cart item back to a priced article.
    async fn first_article_for_body_part(&self, body_part_id: Uuid) -> Option<Article>;
    async fn upsert_article(&self, article: Article) -> Article;
    async fn delete_article(&self, id: Uuid) -> bool;

    // --- Carts / orders ---
    async fn get_cart(&self, id: Uuid) -> Option<Cart>;
    /// Get-or-create the single open cart for a user. The lookup and the
    /// insert happen under one write guard, so two concurrent calls for
    /// the same user can never create two open carts. Returns the cart
    /// and whether it was freshly created.
    async fn resolve_open_cart(&self, user_id: Uuid, now: DateTime<Utc>) -> (Cart, bool);
    /// Purchased carts for a user, newest purchase first.
    async fn orders_for_user(&self, user_id: Uuid) -> Vec<Cart>;
    /// All purchased carts, newest purchase first.
    async fn all_orders(&self) -> Vec<Cart>;
    async fn count_orders_for_user(&self, user_id: Uuid) -> u64;
    async fn upsert_cart(&self, cart: Cart) -> Cart;
    /// Atomically retire every first-match article backing the cart's
    /// items, freeze the total snapshot from their prices, and flip the
    /// cart to purchased (status Pending). Article lookup misses are
    /// skipped; the commit succeeds or fails as one unit.
    async fn commit_checkout(&self, cart_id: Uuid, now: DateTime<Utc>) -> Result<Cart, StoreError>;

    // --- Cart items ---
    /// Insert-if-absent keyed on (cart_id, body_part_id); the duplicate
    /// check and the insert are one atomic step.
    async fn insert_cart_item(&self, item: CartItem) -> Result<(), StoreError>;
    async fn delete_cart_item(&self, cart_id: Uuid, body_part_id: Uuid) -> bool;
    async fn items_for_cart(&self, cart_id: Uuid) -> Vec<CartItem>;
    /// Unconditional delete-all for the cart; returns how many were
    /// removed. A no-op for unknown carts.
    async fn clear_cart_items(&self, cart_id: Uuid) -> usize;

    // --- Payment cards ---
    async fn get_card(&self, id: Uuid) -> Option<PaymentCard>;
    async fn cards_for_user(&self, user_id: Uuid) -> Vec<PaymentCard>;
    async fn upsert_card(&self, card: PaymentCard) -> PaymentCard;
    async fn delete_card(&self, id: Uuid) -> bool;
}

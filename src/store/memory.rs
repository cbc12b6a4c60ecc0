use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Article, BodyPart, Cart, CartItem, OrderStatus, PaymentCard, User};

use super::{Store, StoreError};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// One RwLock over the whole dataset: reads share the read guard, every
// compound read-then-write sequence holds the write guard for its full
// extent. Association lookups are indexed rather than scanned —
// cart items by composite (cart_id, body_part_id) key, the open cart by
// owner, articles by body part in catalog insertion order (so the
// "first article for a body part" join rule stays deterministic).
//
// ============================================================================

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    user_order: Vec<Uuid>,
    username_index: HashMap<String, Uuid>,

    body_parts: HashMap<Uuid, BodyPart>,
    body_part_order: Vec<Uuid>,

    articles: HashMap<Uuid, Article>,
    article_order: Vec<Uuid>,
    articles_by_part: HashMap<Uuid, Vec<Uuid>>,

    carts: HashMap<Uuid, Cart>,
    open_cart_by_user: HashMap<Uuid, Uuid>,

    cart_items: BTreeMap<(Uuid, Uuid), CartItem>,

    cards: HashMap<Uuid, PaymentCard>,
    card_order: Vec<Uuid>,
}

impl Inner {
    fn item_keys_for_cart(&self, cart_id: Uuid) -> Vec<Uuid> {
        self.cart_items
            .range((cart_id, Uuid::nil())..=(cart_id, Uuid::max()))
            .map(|((_, body_part_id), _)| *body_part_id)
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    // --- Users ---

    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    async fn find_user_by_username(&self, username: &str) -> Option<User> {
        let inner = self.inner.read().await;
        let id = inner.username_index.get(username)?;
        inner.users.get(id).cloned()
    }

    async fn list_users(&self) -> Vec<User> {
        let inner = self.inner.read().await;
        inner
            .user_order
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect()
    }

    async fn upsert_user(&self, user: User) -> User {
        let mut inner = self.inner.write().await;
        if let Some(prev) = inner.users.get(&user.id) {
            let prev_name = prev.username.clone();
            if prev_name != user.username {
                inner.username_index.remove(&prev_name);
            }
        } else {
            inner.user_order.push(user.id);
        }
        inner.username_index.insert(user.username.clone(), user.id);
        inner.users.insert(user.id, user.clone());
        user
    }

    async fn delete_user(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let Some(user) = inner.users.remove(&id) else {
            return false;
        };
        inner.username_index.remove(&user.username);
        inner.user_order.retain(|u| *u != id);
        true
    }

    // --- Body parts ---

    async fn get_body_part(&self, id: Uuid) -> Option<BodyPart> {
        self.inner.read().await.body_parts.get(&id).cloned()
    }

    async fn list_body_parts(&self) -> Vec<BodyPart> {
        let inner = self.inner.read().await;
        inner
            .body_part_order
            .iter()
            .filter_map(|id| inner.body_parts.get(id).cloned())
            .collect()
    }

    async fn upsert_body_part(&self, part: BodyPart) -> BodyPart {
        let mut inner = self.inner.write().await;
        if !inner.body_parts.contains_key(&part.id) {
            inner.body_part_order.push(part.id);
        }
        inner.body_parts.insert(part.id, part.clone());
        part
    }

    async fn delete_body_part(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        inner.body_part_order.retain(|p| *p != id);
        inner.body_parts.remove(&id).is_some()
    }

    // --- Articles ---

    async fn get_article(&self, id: Uuid) -> Option<Article> {
        self.inner.read().await.articles.get(&id).cloned()
    }

    async fn list_articles(&self) -> Vec<Article> {
        let inner = self.inner.read().await;
        inner
            .article_order
            .iter()
            .filter_map(|id| inner.articles.get(id).cloned())
            .collect()
    }

    async fn articles_for_body_part(&self, body_part_id: Uuid) -> Vec<Article> {
        let inner = self.inner.read().await;
        inner
            .articles_by_part
            .get(&body_part_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.articles.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn first_article_for_body_part(&self, body_part_id: Uuid) -> Option<Article> {
        let inner = self.inner.read().await;
        let id = inner.articles_by_part.get(&body_part_id)?.first()?;
        inner.articles.get(id).cloned()
    }

    async fn upsert_article(&self, article: Article) -> Article {
        let mut inner = self.inner.write().await;
        match inner.articles.get(&article.id).map(|a| a.body_part_id) {
            Some(prev_part) if prev_part != article.body_part_id => {
                if let Some(old) = prev_part {
                    if let Some(ids) = inner.articles_by_part.get_mut(&old) {
                        ids.retain(|id| *id != article.id);
                    }
                }
                if let Some(new) = article.body_part_id {
                    inner.articles_by_part.entry(new).or_default().push(article.id);
                }
            }
            Some(_) => {}
            None => {
                inner.article_order.push(article.id);
                if let Some(part) = article.body_part_id {
                    inner.articles_by_part.entry(part).or_default().push(article.id);
                }
            }
        }
        inner.articles.insert(article.id, article.clone());
        article
    }

    async fn delete_article(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let Some(article) = inner.articles.remove(&id) else {
            return false;
        };
        inner.article_order.retain(|a| *a != id);
        if let Some(part) = article.body_part_id {
            if let Some(ids) = inner.articles_by_part.get_mut(&part) {
                ids.retain(|a| *a != id);
            }
        }
        true
    }

    // --- Carts / orders ---

    async fn get_cart(&self, id: Uuid) -> Option<Cart> {
        self.inner.read().await.carts.get(&id).cloned()
    }

    async fn resolve_open_cart(&self, user_id: Uuid, now: DateTime<Utc>) -> (Cart, bool) {
        let mut inner = self.inner.write().await;
        if let Some(cart_id) = inner.open_cart_by_user.get(&user_id).copied() {
            if let Some(cart) = inner.carts.get(&cart_id) {
                return (cart.clone(), false);
            }
        }
        let cart = Cart {
            id: Uuid::new_v4(),
            user_id,
            created_at: now,
            purchased_at: None,
            total_price: "0".to_string(),
            status: None,
        };
        inner.carts.insert(cart.id, cart.clone());
        inner.open_cart_by_user.insert(user_id, cart.id);
        (cart, true)
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Vec<Cart> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Cart> = inner
            .carts
            .values()
            .filter(|c| c.user_id == user_id && !c.is_open())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        orders
    }

    async fn all_orders(&self) -> Vec<Cart> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Cart> = inner
            .carts
            .values()
            .filter(|c| !c.is_open())
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        orders
    }

    async fn count_orders_for_user(&self, user_id: Uuid) -> u64 {
        let inner = self.inner.read().await;
        inner
            .carts
            .values()
            .filter(|c| c.user_id == user_id && !c.is_open())
            .count() as u64
    }

    async fn upsert_cart(&self, cart: Cart) -> Cart {
        let mut inner = self.inner.write().await;
        if cart.is_open() {
            inner.open_cart_by_user.insert(cart.user_id, cart.id);
        } else if inner.open_cart_by_user.get(&cart.user_id) == Some(&cart.id) {
            inner.open_cart_by_user.remove(&cart.user_id);
        }
        inner.carts.insert(cart.id, cart.clone());
        cart
    }

    async fn commit_checkout(&self, cart_id: Uuid, now: DateTime<Utc>) -> Result<Cart, StoreError> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;

        if !inner.carts.contains_key(&cart_id) {
            return Err(StoreError::CartNotFound(cart_id));
        }

        // Retire the first matching article per item; misses are skipped.
        let body_part_ids = inner.item_keys_for_cart(cart_id);
        let mut total = Decimal::ZERO;
        for body_part_id in body_part_ids {
            let first = inner
                .articles_by_part
                .get(&body_part_id)
                .and_then(|ids| ids.first())
                .copied();
            if let Some(article_id) = first {
                if let Some(article) = inner.articles.get_mut(&article_id) {
                    article.available = false;
                    if let Some(price) = article.price {
                        total += price;
                    }
                }
            }
        }

        let Some(cart) = inner.carts.get_mut(&cart_id) else {
            return Err(StoreError::CartNotFound(cart_id));
        };
        cart.purchased_at = Some(now);
        cart.status = Some(OrderStatus::Pending);
        cart.total_price = crate::models::format_amount(total);

        let user_id = cart.user_id;
        let committed = cart.clone();
        if inner.open_cart_by_user.get(&user_id) == Some(&cart_id) {
            inner.open_cart_by_user.remove(&user_id);
        }

        Ok(committed)
    }

    // --- Cart items ---

    async fn insert_cart_item(&self, item: CartItem) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = (item.cart_id, item.body_part_id);
        if inner.cart_items.contains_key(&key) {
            return Err(StoreError::DuplicateItem {
                cart_id: item.cart_id,
                body_part_id: item.body_part_id,
            });
        }
        inner.cart_items.insert(key, item);
        Ok(())
    }

    async fn delete_cart_item(&self, cart_id: Uuid, body_part_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        inner.cart_items.remove(&(cart_id, body_part_id)).is_some()
    }

    async fn items_for_cart(&self, cart_id: Uuid) -> Vec<CartItem> {
        let inner = self.inner.read().await;
        inner
            .cart_items
            .range((cart_id, Uuid::nil())..=(cart_id, Uuid::max()))
            .map(|(_, item)| item.clone())
            .collect()
    }

    async fn clear_cart_items(&self, cart_id: Uuid) -> usize {
        let mut inner = self.inner.write().await;
        let keys: Vec<(Uuid, Uuid)> = inner
            .cart_items
            .range((cart_id, Uuid::nil())..=(cart_id, Uuid::max()))
            .map(|(key, _)| *key)
            .collect();
        for key in &keys {
            inner.cart_items.remove(key);
        }
        keys.len()
    }

    // --- Payment cards ---

    async fn get_card(&self, id: Uuid) -> Option<PaymentCard> {
        self.inner.read().await.cards.get(&id).cloned()
    }

    async fn cards_for_user(&self, user_id: Uuid) -> Vec<PaymentCard> {
        let inner = self.inner.read().await;
        inner
            .card_order
            .iter()
            .filter_map(|id| inner.cards.get(id))
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }

    async fn upsert_card(&self, card: PaymentCard) -> PaymentCard {
        let mut inner = self.inner.write().await;
        if !inner.cards.contains_key(&card.id) {
            inner.card_order.push(card.id);
        }
        inner.cards.insert(card.id, card.clone());
        card
    }

    async fn delete_card(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        inner.card_order.retain(|c| *c != id);
        inner.cards.remove(&id).is_some()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

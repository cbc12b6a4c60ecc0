use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

pub use crate::models::format_amount;
use crate::models::OrderStatus;
use crate::store::Store;

// ============================================================================
// Line Item Assembler
// ============================================================================
//
// Joins each cart item to its body part and to the FIRST catalog article
// listed under that body part. There is no direct link from a cart item
// to a specific article instance; the join is reconstructed by body-part
// match, so multiple articles sharing a body part resolve to whichever
// was listed first. That is the join rule, kept as observed.
//
// The same assembly feeds the open-cart view, the order-history view and
// the admin order listing, so the field set and rounding here are the
// single output contract for all three.
//
// ============================================================================

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub body_part_id: Uuid,
    pub body_part_name: String,
    pub article_id: Uuid,
    pub article_name: String,
    pub price: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_ajout: Option<DateTime<Utc>>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: Uuid,
    pub items: Vec<LineItem>,
    pub total_price: String,
    pub item_count: usize,
    pub date_creation: DateTime<Utc>,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub creation_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total_price: String,
    pub item_count: usize,
}

/// Assemble the priced line-item view of a cart. Items whose body part
/// has no catalog article are skipped entirely; prices that are absent
/// render as "0" and contribute nothing to the total. `with_added_at`
/// distinguishes the open-cart view (which carries the timestamp) from
/// the order views (which do not).
pub async fn assemble_lines(
    store: &dyn Store,
    cart_id: Uuid,
    with_added_at: bool,
) -> (Vec<LineItem>, Decimal) {
    let mut lines = Vec::new();
    let mut total = Decimal::ZERO;

    for item in store.items_for_cart(cart_id).await {
        let Some(body_part) = store.get_body_part(item.body_part_id).await else {
            continue;
        };
        let Some(article) = store.first_article_for_body_part(body_part.id).await else {
            continue;
        };

        if let Some(price) = article.price {
            total += price;
        }
        lines.push(LineItem {
            body_part_id: body_part.id,
            body_part_name: body_part.name.clone(),
            article_id: article.id,
            article_name: format!("{} - {}", body_part.name, article.state),
            price: article
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "0".to_string()),
            state: article.state,
            date_ajout: with_added_at.then_some(item.added_at),
        });
    }

    (lines, total)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Article, BodyPart, CartItem};
    use crate::store::MemoryStore;

    async fn seed_part_with_article(
        store: &MemoryStore,
        name: &str,
        state: &str,
        price: Option<Decimal>,
    ) -> (BodyPart, Article) {
        let part = store
            .upsert_body_part(BodyPart {
                id: Uuid::new_v4(),
                name: name.to_string(),
            })
            .await;
        let article = store
            .upsert_article(Article {
                id: Uuid::new_v4(),
                state: state.to_string(),
                description: String::new(),
                price,
                extracted_at: None,
                available: true,
                body_part_id: Some(part.id),
            })
            .await;
        (part, article)
    }

    #[test]
    fn test_format_amount_two_decimals() {
        assert_eq!(format_amount(Decimal::ZERO), "0.00");
        assert_eq!(format_amount(Decimal::from(5000)), "5000.00");
        assert_eq!(format_amount("12.5".parse().unwrap()), "12.50");
        assert_eq!(format_amount("0.005".parse().unwrap()), "0.01");
    }

    #[tokio::test]
    async fn test_assemble_composes_name_and_total() {
        let store = MemoryStore::new();
        let (part, article) =
            seed_part_with_article(&store, "Rein gauche", "Excellent", Some(Decimal::from(5000)))
                .await;
        let cart_id = Uuid::new_v4();
        store
            .insert_cart_item(CartItem {
                cart_id,
                body_part_id: part.id,
                added_at: Utc::now(),
            })
            .await
            .unwrap();

        let (lines, total) = assemble_lines(&store, cart_id, true).await;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].article_id, article.id);
        assert_eq!(lines[0].article_name, "Rein gauche - Excellent");
        assert_eq!(lines[0].price, "5000");
        assert!(lines[0].date_ajout.is_some());
        assert_eq!(format_amount(total), "5000.00");
    }

    #[tokio::test]
    async fn test_missing_price_renders_zero() {
        let store = MemoryStore::new();
        let (part, _) = seed_part_with_article(&store, "Foie", "Moyen", None).await;
        let cart_id = Uuid::new_v4();
        store
            .insert_cart_item(CartItem {
                cart_id,
                body_part_id: part.id,
                added_at: Utc::now(),
            })
            .await
            .unwrap();

        let (lines, total) = assemble_lines(&store, cart_id, false).await;
        assert_eq!(lines[0].price, "0");
        assert!(lines[0].date_ajout.is_none());
        assert_eq!(total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_item_without_article_is_skipped() {
        let store = MemoryStore::new();
        let part = store
            .upsert_body_part(BodyPart {
                id: Uuid::new_v4(),
                name: "Coeur".to_string(),
            })
            .await;
        let cart_id = Uuid::new_v4();
        store
            .insert_cart_item(CartItem {
                cart_id,
                body_part_id: part.id,
                added_at: Utc::now(),
            })
            .await
            .unwrap();

        let (lines, total) = assemble_lines(&store, cart_id, true).await;
        assert!(lines.is_empty());
        assert_eq!(total, Decimal::ZERO);
    }
}

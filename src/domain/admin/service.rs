use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::cart::view::{assemble_lines, format_amount, LineItem};
use crate::error::ApiError;
use crate::models::OrderStatus;
use crate::store::Store;

// ============================================================================
// Admin Aggregator
// ============================================================================
//
// Cross-order reporting. Two different total sources coexist on purpose:
// `list_orders` recomputes each order's total from current catalog prices
// (so it drifts if prices change after purchase), while `stats` sums the
// per-order snapshot frozen at checkout. Snapshot strings that fail to
// parse contribute zero, so reporting stays available over partially
// corrupt data.
//
// ============================================================================

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRow {
    pub id: Uuid,
    pub username: String,
    pub address: String,
    pub role: String,
    pub order_count: u64,
    pub card_count: u64,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderRow {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub user_address: String,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    pub total_price: String,
    pub item_count: usize,
}

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub total_orders: u64,
    pub total_revenue: String,
    pub orders_by_status: HashMap<String, u64>,
}

#[derive(Clone)]
pub struct AdminService {
    store: Arc<dyn Store>,
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every user decorated with purchased-order and payment-card counts.
    pub async fn list_users(&self) -> Result<Vec<AdminUserRow>, ApiError> {
        let mut rows = Vec::new();
        for user in self.store.list_users().await {
            let order_count = self.store.count_orders_for_user(user.id).await;
            let card_count = self.store.cards_for_user(user.id).await.len() as u64;
            rows.push(AdminUserRow {
                id: user.id,
                username: user.username,
                address: user.address,
                role: user.role,
                order_count,
                card_count,
            });
        }
        Ok(rows)
    }

    /// All purchased orders, newest purchase first, with assembled line
    /// items and a total recomputed from current catalog prices.
    pub async fn list_orders(&self) -> Result<Vec<AdminOrderRow>, ApiError> {
        let mut rows = Vec::new();
        for order in self.store.all_orders().await {
            let (items, total) = assemble_lines(self.store.as_ref(), order.id, false).await;
            let user = self.store.get_user(order.user_id).await;
            rows.push(AdminOrderRow {
                order_id: order.id,
                order_date: order.purchased_at.unwrap_or(order.created_at),
                user_id: order.user_id,
                username: user.as_ref().map(|u| u.username.clone()).unwrap_or_default(),
                user_address: user.map(|u| u.address).unwrap_or_default(),
                status: order.status.unwrap_or(OrderStatus::Pending),
                item_count: items.len(),
                items,
                total_price: format_amount(total),
            });
        }
        Ok(rows)
    }

    /// Headline numbers: user and order counts, revenue from the stored
    /// total snapshots, and a per-status order tally.
    pub async fn stats(&self) -> Result<AdminStats, ApiError> {
        let orders = self.store.all_orders().await;

        let revenue: Decimal = orders
            .iter()
            .map(|o| o.total_price.parse::<Decimal>().unwrap_or(Decimal::ZERO))
            .sum();

        let mut orders_by_status = HashMap::new();
        for status in OrderStatus::ALL {
            let count = orders.iter().filter(|o| o.status == Some(status)).count() as u64;
            orders_by_status.insert(status.as_str().to_string(), count);
        }

        Ok(AdminStats {
            total_users: self.store.list_users().await.len() as u64,
            total_orders: orders.len() as u64,
            total_revenue: format_amount(revenue),
            orders_by_status,
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

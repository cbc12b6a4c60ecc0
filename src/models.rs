use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Domain Models
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub address: String,
    pub role: String,
}

/// Catalog category a sellable article is listed under.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BodyPart {
    pub id: Uuid,
    pub name: String,
}

/// A specific sellable instance of a body part. There is no quantity:
/// the `available` flag is the sole inventory signal.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub state: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub extracted_at: Option<DateTime<Utc>>,
    pub available: bool,
    pub body_part_id: Option<Uuid>,
}

/// Pre-purchase aggregate of selected items for one user. A cart is open
/// iff `purchased_at` is None; once purchased it is treated as an order
/// (same record, different state).
///
/// `total_price` is a string snapshot: "0" at creation, frozen to the
/// assembled total at checkout, never recomputed on mutation.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub purchased_at: Option<DateTime<Utc>>,
    pub total_price: String,
    pub status: Option<OrderStatus>,
}

impl Cart {
    pub fn is_open(&self) -> bool {
        self.purchased_at.is_none()
    }
}

/// Association record linking a cart to a body part the user selected.
/// Composite identity: (cart_id, body_part_id) — at most one per pair.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_id: Uuid,
    pub body_part_id: Uuid,
    pub added_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub number: String,
    pub ccv: String,
    pub expiry: String,
}

/// Format a decimal amount as the two-decimal string used everywhere a
/// total is exposed ("0.00" style). Half-up rounding.
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    )
}

// ============================================================================
// Order Status
// ============================================================================

/// Post-checkout workflow status. Set to `Pending` at checkout; any status
/// may transition to any other (no forward-only ordering is enforced).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Delivered,
    Completed,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid order status: {0}")]
pub struct InvalidStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "COMPLETED" => Ok(OrderStatus::Completed),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

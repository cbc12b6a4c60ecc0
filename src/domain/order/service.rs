use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::models::OrderStatus;
use crate::store::Store;

// ============================================================================
// Order Status Service
// ============================================================================

#[derive(Clone)]
pub struct OrderStatusService {
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
}

impl OrderStatusService {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Overwrite an order's workflow status. The value must be one of the
    /// four enumerated statuses; beyond that, any transition is allowed,
    /// backward ones included.
    pub async fn set_status(&self, order_id: Uuid, status: &str) -> Result<OrderStatus, ApiError> {
        let Some(mut order) = self.store.get_cart(order_id).await else {
            return Err(ApiError::not_found("Order not found"));
        };

        let new_status: OrderStatus = status
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid status"))?;

        order.status = Some(new_status);
        self.store.upsert_cart(order).await;

        self.metrics
            .status_updates
            .with_label_values(&[new_status.as_str()])
            .inc();
        tracing::info!(%order_id, status = %new_status, "order status updated");
        Ok(new_status)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

use actix_web::{web, HttpResponse, Responder};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Counters for the cart-to-order lifecycle, registered with a dedicated
// registry and scraped via GET /metrics on the main server.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub carts_created: IntCounter,
    pub cart_items_added: IntCounter,
    pub cart_items_removed: IntCounter,
    pub checkouts: IntCounter,
    pub status_updates: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let carts_created = IntCounter::with_opts(Opts::new(
            "carts_created_total",
            "Open carts lazily created for users",
        ))?;
        registry.register(Box::new(carts_created.clone()))?;

        let cart_items_added = IntCounter::with_opts(Opts::new(
            "cart_items_added_total",
            "Items successfully added to open carts",
        ))?;
        registry.register(Box::new(cart_items_added.clone()))?;

        let cart_items_removed = IntCounter::with_opts(Opts::new(
            "cart_items_removed_total",
            "Items removed from open carts",
        ))?;
        registry.register(Box::new(cart_items_removed.clone()))?;

        let checkouts = IntCounter::with_opts(Opts::new(
            "checkouts_total",
            "Carts converted into purchased orders",
        ))?;
        registry.register(Box::new(checkouts.clone()))?;

        let status_updates = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Order status overwrites"),
            &["status"],
        )?;
        registry.register(Box::new(status_updates.clone()))?;

        Ok(Self {
            registry,
            carts_created,
            cart_items_added,
            cart_items_removed,
            checkouts,
            status_updates,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

pub async fn metrics_handler(metrics: web::Data<Arc<Metrics>>) -> impl Responder {
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry().gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(buffer)
}

pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "chopshop",
    }))
}

// ============================================================================
// Unit Tests
// ============================================================================

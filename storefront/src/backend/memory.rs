//! In-memory persistence backend
//!
//! Serves tests and single-process embeddings. Failure-injection knobs
//! mimic the backend behaviors the order pipeline has to survive: a
//! missing place-order RPC, structural schema rejections, transient
//! connectivity loss, and slow reads.

use super::{BackendError, BackendResult, PersistenceBackend};
use async_trait::async_trait;
use rust_decimal::prelude::*;
use shared::models::{
    Order, OrderInsert, OrderInsertMinimal, OrderRef, OrderRpcPayload, Review, ShippingProfile,
};
use shared::util::now_millis;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Raw status the backend stamps on freshly created orders
const INITIAL_STATUS: &str = "pending";

#[derive(Debug, Default)]
pub struct CallCounts {
    pub rpc_calls: AtomicU32,
    pub primary_inserts: AtomicU32,
    pub minimal_inserts: AtomicU32,
    pub order_list_fetches: AtomicU32,
    pub order_fetches: AtomicU32,
    pub status_updates: AtomicU32,
    pub profile_upserts: AtomicU32,
}

#[derive(Default)]
pub struct MemoryBackend {
    /// User the backend considers authenticated for the RPC path
    auth_user: RwLock<Option<String>>,
    orders: RwLock<HashMap<String, Order>>,
    profiles: RwLock<HashMap<String, ShippingProfile>>,
    /// Review rows; duplicates per (user, product) are allowed so the
    /// latest-wins filtering on the client side is actually exercised
    reviews: RwLock<Vec<Review>>,
    /// Server-side catalog prices consulted by the RPC path
    product_prices: RwLock<HashMap<String, f64>>,

    // Failure-injection knobs
    rpc_supported: AtomicBool,
    reject_primary_schema: AtomicBool,
    reject_minimal_schema: AtomicBool,
    fail_profile_upserts: AtomicBool,
    /// Remaining reads that fail with `Unavailable` before recovering
    transient_read_failures: AtomicU32,
    /// Artificial delay on reads, for timeout tests (milliseconds)
    read_delay_ms: AtomicU64,

    pub calls: CallCounts,
}

impl MemoryBackend {
    pub fn new() -> Self {
        let backend = Self::default();
        backend.rpc_supported.store(true, Ordering::SeqCst);
        backend
    }

    // ==================== Test setup ====================

    pub async fn sign_in(&self, user_id: impl Into<String>) {
        *self.auth_user.write().await = Some(user_id.into());
    }

    pub async fn set_product_price(&self, product_id: impl Into<String>, price: f64) {
        self.product_prices.write().await.insert(product_id.into(), price);
    }

    pub fn set_rpc_supported(&self, supported: bool) {
        self.rpc_supported.store(supported, Ordering::SeqCst);
    }

    pub fn set_reject_primary_schema(&self, reject: bool) {
        self.reject_primary_schema.store(reject, Ordering::SeqCst);
    }

    pub fn set_reject_minimal_schema(&self, reject: bool) {
        self.reject_minimal_schema.store(reject, Ordering::SeqCst);
    }

    pub fn set_fail_profile_upserts(&self, fail: bool) {
        self.fail_profile_upserts.store(fail, Ordering::SeqCst);
    }

    pub fn set_transient_read_failures(&self, count: u32) {
        self.transient_read_failures.store(count, Ordering::SeqCst);
    }

    pub fn set_read_delay_ms(&self, millis: u64) {
        self.read_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Insert an order row directly, bypassing the placement pipeline
    pub async fn seed_order(&self, order: Order) {
        self.orders.write().await.insert(order.id.clone(), order);
    }

    pub async fn order_status(&self, order_id: &str) -> Option<String> {
        self.orders
            .read()
            .await
            .get(order_id)
            .map(|o| o.status.clone())
    }

    // ==================== Internals ====================

    async fn check_read_health(&self) -> BackendResult<()> {
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        // Consume one transient failure if any are armed
        let mut remaining = self.transient_read_failures.load(Ordering::SeqCst);
        while remaining > 0 {
            match self.transient_read_failures.compare_exchange(
                remaining,
                remaining - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return Err(BackendError::Unavailable("connection reset".into())),
                Err(actual) => remaining = actual,
            }
        }
        Ok(())
    }

    fn round2(value: f64) -> f64 {
        Decimal::from_f64(value)
            .unwrap_or_default()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(0.0)
    }

    fn store_order(
        orders: &mut HashMap<String, Order>,
        order: Order,
    ) -> OrderRef {
        let order_ref = OrderRef {
            id: order.id.clone(),
            total: order.total,
            created_at: order.created_at,
        };
        orders.insert(order.id.clone(), order);
        order_ref
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn place_order(&self, payload: OrderRpcPayload) -> BackendResult<OrderRef> {
        self.calls.rpc_calls.fetch_add(1, Ordering::SeqCst);

        if !self.rpc_supported.load(Ordering::SeqCst) {
            return Err(BackendError::Unsupported("place_order rpc"));
        }

        let user_id = self
            .auth_user
            .read()
            .await
            .clone()
            .ok_or(BackendError::Unauthorized)?;

        // The RPC consults the server-side catalog for prices
        let prices = self.product_prices.read().await;
        let mut lines = Vec::with_capacity(payload.items.len());
        let mut subtotal = 0.0;
        for item in &payload.items {
            let price = *prices.get(&item.product_id).ok_or_else(|| {
                BackendError::Internal(format!("unknown product {}", item.product_id))
            })?;
            subtotal += price * item.quantity as f64;
            let mut line = shared::models::CartLine::new(&item.product_id, &item.product_id, price);
            line.quantity = item.quantity;
            lines.push(line);
        }
        drop(prices);

        let subtotal = Self::round2(subtotal);
        let total = Self::round2((subtotal - payload.discount).max(0.0) + payload.shipping_fee);

        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            lines,
            subtotal,
            discount: payload.discount,
            shipping_fee: payload.shipping_fee,
            total,
            zone: payload.zone.clone(),
            payment_method: payload.payment_method,
            coupon_code: payload.coupon_code,
            shipping_profile: ShippingProfile {
                full_name: payload.shipping_name,
                contact_number: payload.shipping_contact,
                zone: payload.zone,
                street_address: payload.shipping_address,
            },
            status: INITIAL_STATUS.to_string(),
            created_at: now_millis(),
        };

        let mut orders = self.orders.write().await;
        Ok(Self::store_order(&mut orders, order))
    }

    async fn insert_order(&self, order: OrderInsert) -> BackendResult<OrderRef> {
        self.calls.primary_inserts.fetch_add(1, Ordering::SeqCst);

        if self.reject_primary_schema.load(Ordering::SeqCst) {
            return Err(BackendError::SchemaRejected(
                "column \"discount\" does not exist".into(),
            ));
        }

        let row = Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: order.user_id,
            lines: order.lines,
            subtotal: order.subtotal,
            discount: order.discount,
            shipping_fee: order.shipping_fee,
            total: order.total,
            zone: order.zone,
            payment_method: order.payment_method,
            coupon_code: order.coupon_code,
            shipping_profile: order.shipping_profile,
            status: order.status,
            created_at: order.created_at,
        };

        let mut orders = self.orders.write().await;
        Ok(Self::store_order(&mut orders, row))
    }

    async fn insert_order_minimal(&self, order: OrderInsertMinimal) -> BackendResult<OrderRef> {
        self.calls.minimal_inserts.fetch_add(1, Ordering::SeqCst);

        if self.reject_minimal_schema.load(Ordering::SeqCst) {
            return Err(BackendError::SchemaRejected(
                "minimal schema rejected".into(),
            ));
        }

        let row = Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: order.user_id,
            lines: order.lines,
            subtotal: 0.0,
            discount: 0.0,
            shipping_fee: 0.0,
            total: order.total,
            zone: String::new(),
            payment_method: String::new(),
            coupon_code: None,
            shipping_profile: ShippingProfile::default(),
            status: order.status,
            created_at: order.created_at,
        };

        let mut orders = self.orders.write().await;
        Ok(Self::store_order(&mut orders, row))
    }

    async fn fetch_orders(&self, user_id: &str) -> BackendResult<Vec<Order>> {
        self.calls.order_list_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read_health().await?;

        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn fetch_order(&self, order_id: &str) -> BackendResult<Order> {
        self.calls.order_fetches.fetch_add(1, Ordering::SeqCst);
        self.check_read_health().await?;

        self.orders
            .read()
            .await
            .get(order_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("order {order_id}")))
    }

    async fn update_order_status(&self, order_id: &str, status: &str) -> BackendResult<()> {
        self.calls.status_updates.fetch_add(1, Ordering::SeqCst);

        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| BackendError::NotFound(format!("order {order_id}")))?;
        order.status = status.to_string();
        Ok(())
    }

    async fn upsert_profile(&self, user_id: &str, profile: &ShippingProfile) -> BackendResult<()> {
        self.calls.profile_upserts.fetch_add(1, Ordering::SeqCst);

        if self.fail_profile_upserts.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("profile service down".into()));
        }

        self.profiles
            .write()
            .await
            .insert(user_id.to_string(), profile.clone());
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> BackendResult<Option<ShippingProfile>> {
        self.check_read_health().await?;
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn fetch_reviews(
        &self,
        user_id: &str,
        product_ids: &[String],
    ) -> BackendResult<Vec<Review>> {
        self.check_read_health().await?;

        let reviews = self.reviews.read().await;
        Ok(reviews
            .iter()
            .filter(|r| r.user_id == user_id && product_ids.contains(&r.product_id))
            .cloned()
            .collect())
    }

    async fn find_review(&self, user_id: &str, product_id: &str) -> BackendResult<Option<Review>> {
        self.check_read_health().await?;

        let reviews = self.reviews.read().await;
        Ok(reviews
            .iter()
            .filter(|r| r.user_id == user_id && r.product_id == product_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert_review(&self, review: Review) -> BackendResult<()> {
        self.reviews.write().await.push(review);
        Ok(())
    }

    async fn update_review(&self, review: Review) -> BackendResult<()> {
        let mut reviews = self.reviews.write().await;
        let existing = reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| BackendError::NotFound(format!("review {}", review.id)))?;
        *existing = review;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rpc_requires_auth() {
        let backend = MemoryBackend::new();
        backend.set_product_price("p1", 10.0).await;

        let payload = OrderRpcPayload {
            items: vec![shared::models::OrderRpcItem {
                product_id: "p1".into(),
                quantity: 1,
            }],
            discount: 0.0,
            shipping_fee: 20.0,
            zone: "Poblacion".into(),
            payment_method: "COD".into(),
            coupon_code: None,
            shipping_name: "Maria".into(),
            shipping_contact: "0917".into(),
            shipping_address: "Rizal St".into(),
            payment_ref: None,
        };

        let err = backend.place_order(payload.clone()).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));

        backend.sign_in("u1").await;
        let order_ref = backend.place_order(payload).await.unwrap();
        assert_eq!(order_ref.total, 30.0);
    }

    #[tokio::test]
    async fn test_rpc_order_keeps_full_profile_snapshot() {
        let backend = MemoryBackend::new();
        backend.sign_in("u1").await;
        backend.set_product_price("p1", 10.0).await;

        let payload = OrderRpcPayload {
            items: vec![shared::models::OrderRpcItem {
                product_id: "p1".into(),
                quantity: 1,
            }],
            discount: 0.0,
            shipping_fee: 20.0,
            zone: "Poblacion".into(),
            payment_method: "COD".into(),
            coupon_code: None,
            shipping_name: "Maria".into(),
            shipping_contact: "0917".into(),
            shipping_address: "Rizal St".into(),
            payment_ref: None,
        };

        let order_ref = backend.place_order(payload).await.unwrap();
        let order = backend.fetch_order(&order_ref.id).await.unwrap();
        assert_eq!(order.zone, "Poblacion");
        assert_eq!(order.shipping_profile.zone, "Poblacion");
        assert!(order.shipping_profile.first_blank_field().is_none());
    }

    #[tokio::test]
    async fn test_transient_failures_recover() {
        let backend = MemoryBackend::new();
        backend.set_transient_read_failures(2);

        assert!(backend.fetch_orders("u1").await.is_err());
        assert!(backend.fetch_orders("u1").await.is_err());
        assert!(backend.fetch_orders("u1").await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_orders_newest_first() {
        let backend = MemoryBackend::new();
        for (id, ts) in [("a", 100), ("b", 300), ("c", 200)] {
            backend
                .seed_order(Order {
                    id: id.into(),
                    user_id: "u1".into(),
                    lines: vec![],
                    subtotal: 0.0,
                    discount: 0.0,
                    shipping_fee: 0.0,
                    total: 0.0,
                    zone: String::new(),
                    payment_method: String::new(),
                    coupon_code: None,
                    shipping_profile: ShippingProfile::default(),
                    status: "pending".into(),
                    created_at: ts,
                })
                .await;
        }

        let orders = backend.fetch_orders("u1").await.unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }
}

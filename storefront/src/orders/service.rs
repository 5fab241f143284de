//! Order placement and lifecycle

use crate::auth::SessionProvider;
use crate::backend::{BackendError, PersistenceBackend};
use crate::cart::CartStore;
use crate::config::Config;
use crate::orders::retry::retry_read;
use crate::orders::status::normalize_status;
use crate::pricing;
use shared::models::{
    Order, OrderInsert, OrderRef, OrderRpcItem, OrderRpcPayload, OrderStatus, ShippingProfile,
};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clears the in-flight flag on every exit path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Order placement, cancellation and reads against the backend
pub struct OrderService {
    backend: Arc<dyn PersistenceBackend>,
    session: Arc<dyn SessionProvider>,
    config: Config,
    /// Set while a placement is running; concurrent submissions are
    /// rejected rather than queued
    placing: AtomicBool,
}

impl OrderService {
    pub fn new(
        backend: Arc<dyn PersistenceBackend>,
        session: Arc<dyn SessionProvider>,
        config: Config,
    ) -> Self {
        Self {
            backend,
            session,
            config,
            placing: AtomicBool::new(false),
        }
    }

    /// Place an order from the current cart contents.
    ///
    /// Validation happens before any backend call: the user must be
    /// signed in, the cart non-empty, and every shipping field filled.
    /// On success the cart is cleared.
    pub async fn place_order(
        &self,
        cart: &CartStore,
        profile: &ShippingProfile,
        payment_method: &str,
        coupon_code: Option<&str>,
        payment_ref: Option<&str>,
    ) -> AppResult<OrderRef> {
        let user = self.session.require_user()?;

        if self
            .placing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AppError::new(ErrorCode::OrderInFlight));
        }
        let _guard = InFlightGuard(&self.placing);

        let lines = cart.lines();
        if lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if let Some(field) = profile.first_blank_field() {
            return Err(
                AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
                    .with_detail("field", field),
            );
        }
        if payment_method.trim().is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "payment_method is required",
            )
            .with_detail("field", "payment_method"));
        }

        let coupon = normalize_coupon(coupon_code);
        let quote = pricing::quote(&lines, &profile.zone, coupon.as_deref());

        // Saving the profile for next time is best-effort and never
        // blocks the order
        if let Err(err) = self.backend.upsert_profile(&user.id, profile).await {
            tracing::warn!(user_id = %user.id, error = %err, "Failed to save shipping profile");
        }

        let payload = OrderRpcPayload {
            items: lines
                .iter()
                .map(|l| OrderRpcItem {
                    product_id: l.product_id.clone(),
                    quantity: l.quantity,
                })
                .collect(),
            discount: quote.discount,
            shipping_fee: quote.shipping_fee,
            zone: profile.zone.clone(),
            payment_method: payment_method.to_string(),
            coupon_code: coupon.clone(),
            shipping_name: profile.full_name.clone(),
            shipping_contact: profile.contact_number.clone(),
            shipping_address: profile.street_address.clone(),
            payment_ref: payment_ref.map(str::to_string),
        };

        let insert = OrderInsert {
            user_id: user.id.clone(),
            lines,
            subtotal: quote.subtotal,
            discount: quote.discount,
            shipping_fee: quote.shipping_fee,
            total: quote.total,
            zone: profile.zone.clone(),
            payment_method: payment_method.to_string(),
            coupon_code: coupon,
            shipping_profile: profile.clone(),
            status: OrderStatus::ToShip.display_name().to_string(),
            created_at: now_millis(),
        };

        let order_ref = self.submit(payload, insert).await?;

        // The order exists now; a failure to clear the local cart must
        // not look like a failed placement
        if let Err(err) = cart.clear() {
            tracing::warn!(order_id = %order_ref.id, error = %err, "Placed order but failed to clear cart");
        }

        tracing::info!(
            order_id = %order_ref.id,
            user_id = %user.id,
            total = order_ref.total,
            "Order placed"
        );
        Ok(order_ref)
    }

    /// Submit through the preferred RPC, falling back to direct inserts
    /// when the backend lacks the capability or rejects the schema
    async fn submit(&self, payload: OrderRpcPayload, insert: OrderInsert) -> AppResult<OrderRef> {
        match self.backend.place_order(payload).await {
            Ok(order_ref) => Ok(order_ref),
            Err(BackendError::Unsupported(cap)) => {
                tracing::debug!(capability = cap, "RPC unavailable, using direct insert");
                match self.backend.insert_order(insert.clone()).await {
                    Ok(order_ref) => Ok(order_ref),
                    Err(BackendError::SchemaRejected(msg)) => {
                        tracing::warn!(error = %msg, "Primary insert rejected, trying minimal schema");
                        self.backend
                            .insert_order_minimal(insert.into_minimal())
                            .await
                            .map_err(AppError::from)
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// All orders of the signed-in user, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        let user = self.session.require_user()?;
        let backend = self.backend.clone();
        let user_id = user.id;

        retry_read(&self.config, "list_orders", || {
            let backend = backend.clone();
            let user_id = user_id.clone();
            async move { backend.fetch_orders(&user_id).await.map_err(AppError::from) }
        })
        .await
    }

    /// Re-read a single order
    pub async fn refresh_order(&self, order_id: &str) -> AppResult<Order> {
        self.session.require_user()?;
        let backend = self.backend.clone();
        let order_id = order_id.to_string();

        retry_read(&self.config, "refresh_order", || {
            let backend = backend.clone();
            let order_id = order_id.clone();
            async move { backend.fetch_order(&order_id).await.map_err(AppError::from) }
        })
        .await
    }

    /// Cancel an order that has not left fulfillment yet.
    ///
    /// The current status is re-read from the backend; only orders whose
    /// normalized status is still `ToShip` may be cancelled.
    pub async fn cancel_order(&self, order_id: &str) -> AppResult<()> {
        self.session.require_user()?;

        let order = self.refresh_order(order_id).await?;
        let status = normalize_status(&order.status);
        if status != OrderStatus::ToShip {
            return Err(AppError::with_message(
                ErrorCode::OrderNotCancellable,
                format!("Order is already {}", status.display_name()),
            )
            .with_detail("status", status.display_name()));
        }

        self.backend
            .update_order_status(order_id, OrderStatus::Cancelled.display_name())
            .await?;

        tracing::info!(order_id = %order_id, "Order cancelled");
        Ok(())
    }
}

/// Trim and uppercase a coupon code; blank codes count as absent
fn normalize_coupon(code: Option<&str>) -> Option<String> {
    code.map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
}

//! Shopping cart
//!
//! [`CartStore`] owns the in-memory working copy of one session's cart
//! and writes every mutation through to a [`CartStorage`] snapshot.
//! Several handles may share one storage; they reconcile through change
//! events and last-write-wins snapshots rather than merging.

pub mod redb_store;
pub mod storage;

pub use redb_store::RedbCartStorage;
pub use storage::{CartEvent, CartStorage, MemoryCartStorage};

use shared::models::CartLine;
use shared::AppResult;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Cart state for one session key
pub struct CartStore {
    key: String,
    storage: Arc<dyn CartStorage>,
    lines: RwLock<Vec<CartLine>>,
}

impl CartStore {
    /// Bind to a session key, loading whatever snapshot already exists
    pub fn open(storage: Arc<dyn CartStorage>, key: impl Into<String>) -> AppResult<Self> {
        let key = key.into();
        let lines = storage.load(&key)?;
        Ok(Self {
            key,
            storage,
            lines: RwLock::new(lines),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Add a line, merging into an existing line with the same product id
    /// by summing quantities. Unit prices must be non-negative.
    pub fn add_line(&self, line: CartLine) -> AppResult<()> {
        if !line.unit_price.is_finite() || line.unit_price < 0.0 {
            return Err(shared::AppError::with_message(
                shared::ErrorCode::ValueOutOfRange,
                "unit_price must be a non-negative number",
            )
            .with_detail("unit_price", line.unit_price)
            .with_detail("product_id", line.product_id));
        }
        self.mutate(|lines| {
            let quantity = line.quantity.max(1);
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => existing.quantity += quantity,
                None => {
                    let mut line = line;
                    line.quantity = quantity;
                    lines.push(line);
                }
            }
        })
    }

    /// Set the quantity of a line; values below 1 clamp to 1.
    /// Unknown product ids are ignored.
    pub fn set_quantity(&self, product_id: &str, quantity: i64) -> AppResult<()> {
        self.mutate(|lines| {
            if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
                line.quantity = quantity.max(1);
            }
        })
    }

    /// Remove a line; absent product ids are a no-op
    pub fn remove_line(&self, product_id: &str) -> AppResult<()> {
        self.mutate(|lines| {
            lines.retain(|l| l.product_id != product_id);
        })
    }

    pub fn clear(&self) -> AppResult<()> {
        self.mutate(|lines| lines.clear())
    }

    /// Snapshot of the current lines
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.read().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.read().map(|l| l.is_empty()).unwrap_or(true)
    }

    /// Sum of line totals for the current cart contents
    pub fn total(&self) -> f64 {
        crate::pricing::subtotal(&self.lines())
    }

    /// Total unit count across all lines
    pub fn count(&self) -> i64 {
        self.lines
            .read()
            .map(|l| l.iter().map(|line| line.quantity).sum())
            .unwrap_or(0)
    }

    /// Discard the working copy and re-read the stored snapshot.
    /// Call after observing a change event from another handle.
    pub fn reload(&self) -> AppResult<()> {
        let fresh = self.storage.load(&self.key)?;
        if let Ok(mut lines) = self.lines.write() {
            *lines = fresh;
        }
        Ok(())
    }

    /// Change events for the whole storage; filter on [`CartEvent::key`]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.storage.subscribe()
    }

    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLine>)) -> AppResult<()> {
        let snapshot = {
            let mut lines = self
                .lines
                .write()
                .map_err(|_| shared::AppError::storage("cart lock poisoned"))?;
            f(&mut lines);
            lines.clone()
        };
        self.storage.save(&self.key, &snapshot)
    }
}

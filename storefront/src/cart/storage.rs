//! Cart snapshot storage
//!
//! Carts persist locally as whole-snapshot values keyed by session. Every
//! save replaces the previous snapshot and notifies subscribers, so
//! concurrent writers resolve by last-write-wins.

use shared::models::CartLine;
use shared::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Capacity of the change notification channel
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Emitted after a snapshot is replaced, carrying the new state
#[derive(Debug, Clone)]
pub struct CartEvent {
    pub key: String,
    pub lines: Vec<CartLine>,
}

/// Snapshot store for cart state
///
/// `load` of a key never written returns an empty cart.
pub trait CartStorage: Send + Sync {
    fn load(&self, key: &str) -> AppResult<Vec<CartLine>>;

    /// Replace the snapshot for `key` and notify subscribers
    fn save(&self, key: &str, lines: &[CartLine]) -> AppResult<()>;

    fn subscribe(&self) -> broadcast::Receiver<CartEvent>;
}

/// Volatile storage for tests and ephemeral sessions
pub struct MemoryCartStorage {
    carts: Mutex<HashMap<String, Vec<CartLine>>>,
    events: broadcast::Sender<CartEvent>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            carts: Mutex::new(HashMap::new()),
            events,
        }
    }
}

impl Default for MemoryCartStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, key: &str) -> AppResult<Vec<CartLine>> {
        let carts = self
            .carts
            .lock()
            .map_err(|_| AppError::storage("cart lock poisoned"))?;
        Ok(carts.get(key).cloned().unwrap_or_default())
    }

    fn save(&self, key: &str, lines: &[CartLine]) -> AppResult<()> {
        let mut carts = self
            .carts
            .lock()
            .map_err(|_| AppError::storage("cart lock poisoned"))?;
        carts.insert(key.to_string(), lines.to_vec());
        drop(carts);

        // Send fails only when nobody is subscribed
        let _ = self.events.send(CartEvent {
            key: key.to_string(),
            lines: lines.to_vec(),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }
}

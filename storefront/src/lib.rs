//! Storefront service layer - cart-to-order pipeline
//!
//! # Architecture overview
//!
//! This crate owns the business logic between a client-held cart and the
//! opaque persistence backend:
//!
//! - **Cart** (`cart`): client-held cart state over a pluggable local
//!   key-value store, last-write-wins across views
//! - **Pricing** (`pricing`): pure fee/discount/total computation
//! - **Orders** (`orders`): order placement, cancellation, listing,
//!   status normalization, timeout+retry read policy
//! - **Reviews** (`reviews`): post-fulfillment feedback, latest-wins
//! - **Backend** (`backend`): the persistence collaborator trait and an
//!   in-memory implementation for tests and embedding
//!
//! # Module structure
//!
//! ```text
//! storefront/src/
//! ├── auth.rs        # session provider seam
//! ├── config.rs      # env-driven configuration
//! ├── backend/       # persistence API trait + memory impl
//! ├── cart/          # CartStore + storage backends
//! ├── pricing/       # shipping fees, coupons, totals
//! ├── orders/        # OrderService, status normalizer, retry policy
//! ├── reviews/       # ReviewService
//! └── utils/         # logging setup
//! ```

pub mod auth;
pub mod backend;
pub mod cart;
pub mod config;
pub mod orders;
pub mod pricing;
pub mod reviews;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, SessionProvider, StaticSession};
pub use backend::{BackendError, BackendResult, MemoryBackend, PersistenceBackend};
pub use cart::{CartEvent, CartStore, CartStorage, MemoryCartStorage, RedbCartStorage};
pub use config::Config;
pub use orders::{OrderService, normalize_status};
pub use reviews::ReviewService;

// Re-export unified error types from shared
pub use shared::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

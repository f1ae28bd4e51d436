//! # kho-db: Local State Store for the Kho Back-office
//!
//! A small SQLite key-value store for client-side values that must survive
//! a restart. It is a cache: nothing here is authoritative, the backend is.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kho Back-office Data Flow                        │
//! │                                                                         │
//! │  Command (load_form_data, confirm_summary, save_stocktake_draft)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kho-db (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌─────────────┐  │   │
//! │  │   │   Database    │    │  Repositories    │   │ Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ LocalState       │   │ (embedded)  │  │   │
//! │  │   │ SqlitePool    │    │ StocktakeDraft   │   │ 001_local_  │  │   │
//! │  │   └───────────────┘    └──────────────────┘   │ state.sql   │  │   │
//! │  │                                               └─────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  <data dir>/kho.db                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kho_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("kho.db")).await?;
//! db.local_state().set_staff_store_id("s-1").await?;
//! let banner = db.local_state().take_sale_success_message().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::local_state::LocalStateRepository;
pub use repository::stocktake_draft::StocktakeDraftRepository;

//! # Database State
//!
//! Wraps the local `Database` for use in commands.
//!
//! ## Thread Safety
//! The `Database` struct from `kho-db` contains a `SqlitePool` which
//! is inherently thread-safe. Commands can read and write local state
//! concurrently without explicit locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! async fn take_success_message(ctx: &AppContext) -> ApiResult<Option<String>> {
//!     Ok(ctx.db().local_state().take_sale_success_message().await?)
//! }
//! ```

use kho_db::{Database, LocalStateRepository, StocktakeDraftRepository};

/// Wrapper around `Database` owned by the app context.
#[derive(Debug)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn local_state(&self) -> LocalStateRepository {
        self.db.local_state()
    }

    pub fn stocktake_drafts(&self) -> StocktakeDraftRepository {
        self.db.stocktake_drafts()
    }
}

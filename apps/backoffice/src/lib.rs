//! # Kho Back-office Library
//!
//! Command layer of the back-office: the UI host calls these functions,
//! they drive the editor in `kho-core`, the backend through `kho-client`
//! and local state through `kho-db`.
//!
//! ## Module Organization
//! ```text
//! kho_backoffice/
//! ├── lib.rs            ◄─── You are here (context, startup, logging)
//! ├── config.rs         ◄─── AppConfig (toml + KHO_* env)
//! ├── error.rs          ◄─── API error type for commands
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── db.rs         ◄─── Database state wrapper
//! │   ├── editor.rs     ◄─── Editor session + navigation guard
//! │   └── notices.rs    ◄─── Self-dismissing banners
//! └── commands/
//!     ├── mod.rs        ◄─── Command exports
//!     ├── form_data.rs  ◄─── Reference data loader
//!     ├── sale.rs       ◄─── Editor actions, persistence
//!     ├── navigation.rs ◄─── Leave prompt
//!     ├── transaction.rs◄─── Sale transaction list
//!     ├── stocktake.rs  ◄─── Counting and stock balance
//!     └── audit.rs      ◄─── Change-status log
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use error::ApiResult;
use kho_client::{BackofficeApi, RestClient};
use kho_db::{Database, DbConfig};
use state::{DbState, EditorState, NoticeBoard};

/// Everything a command can touch.
pub struct AppContext {
    config: AppConfig,
    api: Arc<dyn BackofficeApi>,
    db: DbState,
    editor: EditorState,
    notices: NoticeBoard,
}

impl AppContext {
    /// Wires a context from its parts.
    pub fn new(config: AppConfig, api: Arc<dyn BackofficeApi>, db: Database) -> Self {
        let notices = NoticeBoard::new(config.notice_ttl());
        AppContext {
            config,
            api,
            db: DbState::new(db),
            editor: EditorState::new(today()),
            notices,
        }
    }

    /// Startup with the REST backend and the on-disk local store.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │                       Application Startup                               │
    /// │                                                                         │
    /// │  1. Resolve Database Path ────────────────────────────────────────────► │
    /// │     • KHO_DB_PATH / db_path, else the platform data dir                 │
    /// │                                                                         │
    /// │  2. Connect to Database ──────────────────────────────────────────────► │
    /// │     • SQLite with WAL mode                                              │
    /// │     • Run pending migrations                                            │
    /// │                                                                         │
    /// │  3. Build REST Client ────────────────────────────────────────────────► │
    /// │     • base URL, bearer token, timeout                                   │
    /// │                                                                         │
    /// │  4. Initialize State Objects ─────────────────────────────────────────► │
    /// │     • EditorState: blank create form dated today                        │
    /// │     • NoticeBoard: configured TTL                                       │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn bootstrap(config: AppConfig) -> ApiResult<Self> {
        let db_path = config.database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        let api = RestClient::new(&config.client_config())?;
        info!(base_url = %config.api_base_url, "Backend client ready");

        Ok(Self::new(config, Arc::new(api), db))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn api(&self) -> &dyn BackofficeApi {
        self.api.as_ref()
    }

    pub fn db(&self) -> &DbState {
        &self.db
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }
}

/// Today in the local timezone; sale dates are calendar days.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kho_core=trace` - Show trace for the editor only
/// - Default: `info,kho=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kho=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

//! # State Module
//!
//! Application state owned by the [`AppContext`](crate::AppContext).
//!
//! ## Why Multiple State Types?
//! Instead of one struct holding everything behind a single lock, each
//! concern has its own type:
//!
//! 1. **Separation of Concerns**: each state type has a single responsibility
//! 2. **Easier Testing**: individual states are built and checked alone
//! 3. **Reduced Contention**: notices and local storage never wait on the editor
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────────┐  ┌──────────────────┐      │
//! │  │   DbState    │  │     EditorState      │  │   NoticeBoard    │      │
//! │  │              │  │                      │  │                  │      │
//! │  │  Database    │  │  Arc<Mutex<          │  │  notices +       │      │
//! │  │  (SQLite     │  │    Editor +          │  │  tokio timers    │      │
//! │  │   pool)      │  │    NavigationGuard>> │  │                  │      │
//! │  └──────────────┘  └──────────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • EditorState: Arc<Mutex<T>>, never held across an await              │
//! │  • NoticeBoard: short critical sections, timers abort on drop          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod db;
mod editor;
mod notices;

pub use db::DbState;
pub use editor::{EditorSession, EditorState, EditorView, HostHooks};
pub use notices::NoticeBoard;

//! # Commands Module
//!
//! Everything the UI host can call.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── form_data.rs   ◄─── Reference data for the form
//! ├── sale.rs        ◄─── Editor actions, save/update/balance
//! ├── navigation.rs  ◄─── Leave prompt while the form is dirty
//! ├── transaction.rs ◄─── Sale transaction list
//! ├── stocktake.rs   ◄─── Counting, import-detail patches, balance
//! └── audit.rs       ◄─── Change-status log
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  UI host                                                                │
//! │  ───────                                                                │
//! │  dispatch(&ctx, EditorAction::ChangeQuantity { id, delta: 1 })          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn dispatch(                                                     │
//! │      ctx: &AppContext,        ◄── editor, api, db, notices             │
//! │      action: EditorAction,    ◄── typed action from the UI             │
//! │  ) -> ApiResult<EditorView>                                             │
//! │         │                                                               │
//! │         │ (serde, camelCase)                                            │
//! │         ▼                                                               │
//! │  UI receives: EditorView or { code, message, field }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod form_data;
pub mod navigation;
pub mod sale;
pub mod stocktake;
pub mod transaction;

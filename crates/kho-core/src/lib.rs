//! # kho-core: Pure Business Logic for the Kho Back-office
//!
//! This crate holds the sale-transaction editor and everything it needs as
//! pure functions and plain data. No I/O happens here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kho Back-office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI host (web view / shell)                   │   │
//! │  │    Product table ──► Summary ──► Confirm ──► Leave prompt       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ typed actions                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              kho-backoffice (commands, state)                   │   │
//! │  └───────┬─────────────────────┬─────────────────────────┬─────────┘   │
//! │          │                     │                         │             │
//! │  ┌───────▼──────────────┐ ┌────▼──────────────┐ ┌────────▼─────────┐   │
//! │  │ ★ kho-core ★         │ │ kho-client (REST) │ │ kho-db (local KV)│   │
//! │  │                      │ └───────────────────┘ └──────────────────┘   │
//! │  │ types   money  unit  │                                              │
//! │  │ line_item  draft     │                                              │
//! │  │ guard  validation    │                                              │
//! │  │ stocktake  audit     │                                              │
//! │  │ listing  notice      │                                              │
//! │  │ form_data            │                                              │
//! │  │                      │                                              │
//! │  │ NO I/O • NO NETWORK  │                                              │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, ProductBatch, SaleTransaction, ...)
//! - [`money`] - Integer đồng
//! - [`unit`] - quả / khay conversion
//! - [`line_item`] - Product table and its reducers
//! - [`draft`] - Editor state machine (create, edit, balance)
//! - [`guard`] - Unsaved-changes snapshots and navigation guard
//! - [`validation`] - Summary gate and input checks
//! - [`stocktake`] - Counting, discrepancies, balance lines
//! - [`audit`] - Change-status log
//! - [`listing`] - Client-side filters and paging
//! - [`form_data`] - Form reference data and store pre-selection
//! - [`notice`] - Transient banners
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use kho_core::draft::{Editor, EditorAction};
//! use kho_core::line_item::SelectOptions;
//! use kho_core::{Money, ProductBatch, Unit};
//!
//! let mut editor = Editor::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
//! let batch = ProductBatch {
//!     product_id: "p-1".into(),
//!     batch_id: Some("b-1".into()),
//!     product_name: "Trứng gà".into(),
//!     batch_code: Some("L01".into()),
//!     unit_sale_price: Money::from_dong(3_000),
//!     remain_quantity: 50,
//!     expiry_date: None,
//!     zone_real: vec![],
//! };
//!
//! editor
//!     .dispatch(EditorAction::SelectProduct { batch, options: SelectOptions::default() })
//!     .unwrap();
//! editor
//!     .dispatch(EditorAction::ChangeUnit { id: "b-1".into(), unit: Unit::Khay })
//!     .unwrap();
//!
//! assert_eq!(editor.draft().total_amount().dong(), 90_000);
//! assert!(editor.is_dirty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod draft;
pub mod error;
pub mod form_data;
pub mod guard;
pub mod line_item;
pub mod listing;
pub mod money;
pub mod notice;
pub mod stocktake;
pub mod types;
pub mod unit;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FormField, ValidationError};
pub use money::Money;
pub use types::*;
pub use unit::{Unit, ITEMS_PER_PACK};

// =============================================================================
// Local Storage Keys
// =============================================================================

/// Cached store of a store-restricted user.
pub const STAFF_STORE_ID_KEY: &str = "staffStoreId";

/// Success message carried across a navigation.
pub const SALE_SUCCESS_MESSAGE_KEY: &str = "saleSuccessMessage";

/// Key of the cached counting draft of one stocktake.
pub fn stocktake_draft_key(stocktake_id: &str) -> String {
    format!("stocktake_draft_{}", stocktake_id)
}

//! # Domain Types
//!
//! Canonical domain types shared by every crate of the workspace.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ Customer, Store │   │  ProductBatch   │   │ SaleTransaction │       │
//! │  │ Category, Zone  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │ UserProfile     │   │  product_id     │   │  code, status   │       │
//! │  └─────────────────┘   │  batch_id       │   │  customer/store │       │
//! │                        │  unit_sale_price│   │  detail[]       │       │
//! │                        │  remain_quantity│   └────────┬────────┘       │
//! │                        └─────────────────┘            │                │
//! │                                              ┌────────▼────────┐       │
//! │                                              │   DetailLine    │       │
//! │                                              │ (wire line)     │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These are the shapes AFTER normalization. Backend payloads with
//! optional/fallback field names are mapped onto them once, at the API
//! boundary (`kho-client::dto`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::unit::Unit;

// =============================================================================
// Reference Data
// =============================================================================

/// A customer that can be billed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A store (cửa hàng) transactions are booked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Default per-item price.
    pub unit_sale_price: Money,
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Storage zone inside a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
}

// =============================================================================
// Product Batch
// =============================================================================

/// One inventory batch (lô) of a product, in canonical shape.
///
/// ## Stock
/// `remain_quantity` is always in items (quả), whatever unit the line
/// that consumes it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductBatch {
    pub product_id: String,
    /// `None` when the payload only identified the product.
    pub batch_id: Option<String>,
    pub product_name: String,
    pub batch_code: Option<String>,
    /// Per-item price.
    pub unit_sale_price: Money,
    pub remain_quantity: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub zone_real: Vec<String>,
}

// =============================================================================
// Users
// =============================================================================

/// Role of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Manager,
    /// Store staff: restricted to a single store.
    Staff,
    /// Fallback when the profile could not be loaded.
    #[default]
    Guest,
}

impl UserRole {
    /// Whether this role may only book transactions for its own store.
    pub const fn is_store_restricted(self) -> bool {
        matches!(self, UserRole::Staff)
    }
}

/// The current user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
}

impl UserProfile {
    /// Guest-like profile used when the live profile call fails.
    pub fn guest() -> Self {
        UserProfile {
            id: String::new(),
            username: "guest".to_string(),
            full_name: "Khách".to_string(),
            role: UserRole::Guest,
            store_id: None,
            store_name: None,
        }
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Saved but not finalized; editable.
    #[default]
    Draft,
    /// Finalized.
    Complete,
    /// Submitted, waiting for a manager; still editable.
    WaitingForApprove,
    /// Cancelled.
    Cancel,
}

impl TransactionStatus {
    /// Draft and waiting transactions can be reopened in the editor.
    pub const fn is_editable(self) -> bool {
        matches!(
            self,
            TransactionStatus::Draft | TransactionStatus::WaitingForApprove
        )
    }

    /// Vietnamese label for messages.
    pub const fn label(self) -> &'static str {
        match self {
            TransactionStatus::Draft => "Nháp",
            TransactionStatus::Complete => "Hoàn thành",
            TransactionStatus::WaitingForApprove => "Chờ duyệt",
            TransactionStatus::Cancel => "Đã hủy",
        }
    }
}

/// What the user asked the summary step to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryAction {
    /// Save as draft.
    Draft,
    /// Finalize.
    Complete,
}

impl SummaryAction {
    /// Status the transaction gets once the action is persisted.
    pub const fn target_status(self) -> TransactionStatus {
        match self {
            SummaryAction::Draft => TransactionStatus::Draft,
            SummaryAction::Complete => TransactionStatus::Complete,
        }
    }
}

// =============================================================================
// Sale Transaction (wire shape)
// =============================================================================

/// One line of a persisted transaction, in the backend's `detail` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DetailLine {
    pub product_id: String,
    pub batch_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_code: Option<String>,
    /// Quantity in `unit`.
    pub quantity: i64,
    #[serde(default)]
    pub unit: Unit,
    /// Per-item price.
    pub unit_sale_price: Money,
    pub total: Money,
    /// Remaining batch stock in items, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remain_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zone_real: Vec<String>,
}

/// A persisted sale transaction as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleTransaction {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub store_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub paid_amount: Money,
    #[serde(default)]
    pub total_amount: Money,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub detail: Vec<DetailLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /sale-transactions/save`, `save-from-balance` and
/// `PUT /sale-transactions/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaveTransactionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub customer_id: String,
    pub store_id: String,
    #[ts(as = "String")]
    pub sale_date: NaiveDate,
    pub note: String,
    pub paid_amount: Money,
    pub total_amount: Money,
    pub status: TransactionStatus,
    pub detail: Vec<DetailLine>,
    /// Set for stock-balance transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stocktake_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_staff_is_store_restricted() {
        assert!(UserRole::Staff.is_store_restricted());
        assert!(!UserRole::Admin.is_store_restricted());
        assert!(!UserRole::Manager.is_store_restricted());
        assert!(!UserRole::Guest.is_store_restricted());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::WaitingForApprove).unwrap(),
            "\"WAITING_FOR_APPROVE\""
        );
        let parsed: TransactionStatus = serde_json::from_str("\"COMPLETE\"").unwrap();
        assert_eq!(parsed, TransactionStatus::Complete);
    }

    #[test]
    fn test_editable_statuses() {
        assert!(TransactionStatus::Draft.is_editable());
        assert!(TransactionStatus::WaitingForApprove.is_editable());
        assert!(!TransactionStatus::Complete.is_editable());
        assert!(!TransactionStatus::Cancel.is_editable());
    }

    #[test]
    fn test_summary_action_targets() {
        assert_eq!(SummaryAction::Draft.target_status(), TransactionStatus::Draft);
        assert_eq!(
            SummaryAction::Complete.target_status(),
            TransactionStatus::Complete
        );
    }

    #[test]
    fn test_transaction_deserializes_with_defaults() {
        let json = r#"{
            "id": "tx-1",
            "customerId": "c-1",
            "storeId": "s-1",
            "saleDate": "2026-03-01",
            "detail": [{
                "productId": "p-1",
                "batchId": "b-1",
                "quantity": 2,
                "unit": "khay",
                "unitSalePrice": 3500,
                "total": 210000
            }]
        }"#;
        let tx: SaleTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.status, TransactionStatus::Draft);
        assert_eq!(tx.detail[0].unit, Unit::Khay);
        assert_eq!(tx.detail[0].remain_quantity, None);
    }
}

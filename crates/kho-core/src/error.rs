//! # Error Types
//!
//! Domain-specific error types for kho-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kho-core errors (this file)                                           │
//! │  ├── CoreError        - Stock limits, state-machine misuse             │
//! │  └── ValidationError  - Missing selections, bad input                  │
//! │                                                                         │
//! │  kho-db errors        - DbError (local store)                          │
//! │  kho-client errors    - ClientError (REST backend)                     │
//! │  backoffice errors    - ApiError (what the UI host sees)               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → notice banner          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Messages
//! Every message is the Vietnamese text shown in the error banner, so it
//! names the product and the numeric limit that was violated.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::unit::{Unit, ITEMS_PER_PACK};

// =============================================================================
// Form Fields
// =============================================================================

/// Form fields that a failed validation can flag for highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Customer,
    Store,
    Products,
    SaleDate,
}

impl FormField {
    /// Banner text when the field is left empty.
    pub const fn required_message(self) -> &'static str {
        match self {
            FormField::Customer => "Vui lòng chọn khách hàng",
            FormField::Store => "Vui lòng chọn cửa hàng",
            FormField::Products => "Vui lòng chọn ít nhất một sản phẩm",
            FormField::SaleDate => "Vui lòng chọn ngày bán",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FormField::Customer => "Khách hàng",
            FormField::Store => "Cửa hàng",
            FormField::Products => "Sản phẩm",
            FormField::SaleDate => "Ngày bán",
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// A reducer that returns one of these has left its input untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Requested quantity does not fit in the batch's remaining stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Line: Trứng gà (lô L01), remain 50 quả, quantity 10 quả
    ///      │
    ///      ▼  change_quantity(+45)
    /// 55 quả > 50 quả
    ///      │
    ///      ▼
    /// "Trứng gà (lô L01) chỉ còn 50 quả trong kho, tối đa 50 quả"
    /// ```
    #[error("{item} chỉ còn {available} quả trong kho, tối đa {max} {unit} (yêu cầu {requested} {unit})")]
    ExceedsStock {
        item: String,
        requested: i64,
        unit: Unit,
        available: i64,
        max: i64,
    },

    /// Switching to packs needs at least one full pack of stock.
    #[error("{item} chỉ còn {available} quả, không đủ 1 khay ({pack} quả)", pack = ITEMS_PER_PACK)]
    PackUnavailable { item: String, available: i64 },

    /// No line with this local id.
    #[error("Không tìm thấy dòng sản phẩm: {0}")]
    LineNotFound(String),

    /// A line reached submission without a batch.
    #[error("Sản phẩm {product} chưa chọn lô hàng")]
    MissingBatch { product: String },

    /// The editor is not in a phase that accepts the action.
    #[error("Không thể {action} ở bước {phase}")]
    InvalidTransition { phase: String, action: String },

    /// A selected customer or store is missing from the loaded form data.
    #[error("{} {id} không còn trong danh sách, vui lòng chọn lại", .field.label())]
    UnknownReference { field: FormField, id: String },

    /// The transaction's status no longer allows edits.
    #[error("Phiếu {code} đang ở trạng thái {status}, không thể chỉnh sửa")]
    NotEditable { code: String, status: String },

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// The form field the UI should highlight, if any.
    pub fn highlight(&self) -> Option<FormField> {
        match self {
            CoreError::Validation(ValidationError::Required { field }) => Some(*field),
            CoreError::MissingBatch { .. } => Some(FormField::Products),
            CoreError::UnknownReference { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub(crate) fn transition(phase: impl Into<String>, action: impl Into<String>) -> Self {
        CoreError::InvalidTransition {
            phase: phase.into(),
            action: action.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These never reach the network: they block the attempted transition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required selection is missing.
    #[error("{}", .field.required_message())]
    Required { field: FormField },

    /// Value must be positive.
    #[error("{field} phải lớn hơn 0")]
    MustBePositive { field: String },

    /// Value is not in the allowed set.
    #[error("{field} không hợp lệ: '{value}' (chấp nhận: {})", .allowed.join(", "))]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Invalid format (e.g. malformed date).
    #[error("{field} sai định dạng: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub fn required(field: FormField) -> Self {
        ValidationError::Required { field }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

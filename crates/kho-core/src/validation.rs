//! # Validation Module
//!
//! Form validation for the sale-transaction editor and the list screens.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Reducers (line_item)                                          │
//! │  ├── Stock ceiling, quantity ≥ 1, price ≥ 0                             │
//! │  └── Rejects the mutation, state unchanged                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Summary gate (THIS MODULE)                                    │
//! │  ├── Customer, store, sale date selected                                │
//! │  └── At least one line                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                       │
//! │  └── Authoritative; its message is shown verbatim                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checks run in form order so the first empty field is the one that gets
//! highlighted.

use chrono::NaiveDate;

use crate::draft::SaleDraft;
use crate::error::{FormField, ValidationError};
use crate::line_item::LineItems;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Largest page size the list screens request.
pub const MAX_PAGE_SIZE: usize = 200;

// =============================================================================
// Selection Validators
// =============================================================================

/// Requires a non-blank selection, returning it trimmed.
///
/// ## Example
/// ```rust
/// use kho_core::error::FormField;
/// use kho_core::validation::require_selection;
///
/// assert_eq!(require_selection(Some(" c-1 "), FormField::Customer).unwrap(), "c-1");
/// assert!(require_selection(Some("  "), FormField::Customer).is_err());
/// assert!(require_selection(None, FormField::Store).is_err());
/// ```
pub fn require_selection(value: Option<&str>, field: FormField) -> ValidationResult<&str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::required(field)),
    }
}

/// Requires at least one line.
pub fn require_lines(lines: &LineItems) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::required(FormField::Products));
    }
    Ok(())
}

/// Gate for the summary step.
///
/// ## Order
/// customer, store, products, sale date
pub fn validate_for_summary(draft: &SaleDraft) -> ValidationResult<()> {
    require_selection(draft.customer_id.as_deref(), FormField::Customer)?;
    require_selection(draft.store_id.as_deref(), FormField::Store)?;
    require_lines(&draft.lines)?;
    if draft.sale_date.is_none() {
        return Err(ValidationError::required(FormField::SaleDate));
    }
    Ok(())
}

// =============================================================================
// Format Validators
// =============================================================================

/// Parses an ISO `YYYY-MM-DD` date typed into a filter or the sale date.
pub fn parse_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Validates list paging (1-based page).
pub fn validate_paging(page: usize, size: usize) -> ValidationResult<()> {
    if page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ValidationError::NotAllowed {
            field: "size".to_string(),
            value: size.to_string(),
            allowed: vec![format!("1..={}", MAX_PAGE_SIZE)],
        });
    }
    Ok(())
}

/// Validates a counted stock value typed into a stocktake line.
pub fn validate_counted(value: i64) -> ValidationResult<i64> {
    if value < 0 {
        return Err(ValidationError::InvalidFormat {
            field: "Số lượng kiểm".to_string(),
            reason: "không được âm".to_string(),
        });
    }
    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_item::tests::batch;
    use crate::line_item::SelectOptions;

    fn filled() -> SaleDraft {
        let mut draft = SaleDraft::blank(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        draft.customer_id = Some("c-1".to_string());
        draft.store_id = Some("s-1".to_string());
        draft.lines = draft
            .lines
            .select_product(&batch("B", 10, 1_000), SelectOptions::default())
            .unwrap();
        draft
    }

    #[test]
    fn test_summary_gate_passes_filled_form() {
        assert!(validate_for_summary(&filled()).is_ok());
    }

    #[test]
    fn test_summary_gate_reports_first_missing_field() {
        let mut draft = filled();
        draft.store_id = None;
        draft.customer_id = Some(" ".to_string());
        assert_eq!(
            validate_for_summary(&draft).unwrap_err(),
            ValidationError::required(FormField::Customer)
        );
    }

    #[test]
    fn test_empty_product_list_message() {
        let mut draft = filled();
        draft.lines = LineItems::new();
        let err = validate_for_summary(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Vui lòng chọn ít nhất một sản phẩm");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("Ngày bán", "2026-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
        assert!(matches!(
            parse_date("Ngày bán", "01/03/2026"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_paging_bounds() {
        assert!(validate_paging(1, 20).is_ok());
        assert!(validate_paging(0, 20).is_err());
        assert!(validate_paging(1, 0).is_err());
        assert!(validate_paging(1, MAX_PAGE_SIZE + 1).is_err());
    }

    #[test]
    fn test_counted_never_negative() {
        assert_eq!(validate_counted(0).unwrap(), 0);
        assert!(validate_counted(-1).is_err());
    }
}

//! # Stocktake & Stock Balance
//!
//! A stocktake records, per batch, what the system believes is left and
//! what was actually counted. Shortfalls can be booked as a sale
//! (cân bằng kho) through a balance-mode [`crate::draft::Editor`].
//!
//! ```text
//!   StocktakeLine { system 50, counted 44 } ──► shortfall 6
//!                                                 │
//!                               balance_lines()   ▼
//!   LineItem { 6 quả, remain 50, zone_real } ──► Editor::for_balance
//! ```
//!
//! Counting in progress is cached per stocktake as a [`StocktakeDraft`]
//! so a reload does not lose it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::line_item::{LineItem, LineItems};
use crate::money::Money;
use crate::types::ProductBatch;
use crate::unit::Unit;
use crate::validation::validate_counted;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StocktakeStatus {
    #[default]
    Draft,
    Complete,
    Balanced,
    Cancel,
}

/// One counted batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StocktakeLine {
    /// Import detail the batch came in on; target of the PATCH endpoints.
    pub import_detail_id: String,
    pub product_id: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub batch_code: Option<String>,
    /// What the system believes is left, in items.
    pub system_quantity: i64,
    /// What was counted, in items.
    #[serde(default)]
    pub counted_quantity: Option<i64>,
    #[serde(default)]
    pub is_check: bool,
    #[serde(default)]
    pub unit_sale_price: Money,
    #[serde(default)]
    pub zone_real: Vec<String>,
}

impl StocktakeLine {
    /// counted − system; `None` until counted.
    pub fn difference(&self) -> Option<i64> {
        self.counted_quantity.map(|c| c - self.system_quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Stocktake {
    pub id: String,
    #[serde(default)]
    pub code: String,
    pub store_id: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub status: StocktakeStatus,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub lines: Vec<StocktakeLine>,
}

/// A counted line that disagrees with the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub import_detail_id: String,
    pub product_name: String,
    pub batch_code: Option<String>,
    pub system_quantity: i64,
    pub counted_quantity: i64,
    /// Negative for a shortfall.
    pub difference: i64,
}

impl Stocktake {
    pub fn discrepancies(&self) -> Vec<Discrepancy> {
        self.lines
            .iter()
            .filter_map(|line| {
                let counted = line.counted_quantity?;
                let difference = counted - line.system_quantity;
                (difference != 0).then(|| Discrepancy {
                    import_detail_id: line.import_detail_id.clone(),
                    product_name: line.product_name.clone(),
                    batch_code: line.batch_code.clone(),
                    system_quantity: line.system_quantity,
                    counted_quantity: counted,
                    difference,
                })
            })
            .collect()
    }

    /// Shortfalls as sale lines, in quả.
    ///
    /// Lines without a batch are carried too; the editor refuses to submit
    /// them, naming the product.
    pub fn balance_lines(&self) -> CoreResult<LineItems> {
        let mut lines = Vec::new();
        for line in &self.lines {
            let shortfall = match line.counted_quantity {
                Some(counted) if counted < line.system_quantity => {
                    line.system_quantity - counted.max(0)
                }
                _ => continue,
            };
            let batch = ProductBatch {
                product_id: line.product_id.clone(),
                batch_id: line.batch_id.clone(),
                product_name: line.product_name.clone(),
                batch_code: line.batch_code.clone(),
                unit_sale_price: line.unit_sale_price,
                remain_quantity: line.system_quantity,
                expiry_date: None,
                zone_real: line.zone_real.clone(),
            };
            lines.push(LineItem::from_batch(&batch, shortfall, Unit::Qua)?);
        }
        Ok(LineItems::from_lines(lines))
    }

    /// Applies a cached counting draft; unknown line ids are ignored.
    pub fn apply_draft(&mut self, draft: &StocktakeDraft) {
        for line in self.lines.iter_mut() {
            if let Some(counted) = draft.counted.get(&line.import_detail_id) {
                line.counted_quantity = Some(*counted);
            }
            if draft.checked.contains(&line.import_detail_id) {
                line.is_check = true;
            }
        }
    }

    /// Body for `POST /stocktakes` and `PUT /stocktakes/{id}`.
    pub fn to_request(&self) -> StocktakeRequest {
        StocktakeRequest {
            store_id: self.store_id.clone(),
            note: self.note.trim().to_string(),
            status: self.status,
            lines: self
                .lines
                .iter()
                .map(|l| StocktakeRequestLine {
                    import_detail_id: l.import_detail_id.clone(),
                    counted_quantity: l.counted_quantity,
                    is_check: l.is_check,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StocktakeRequestLine {
    pub import_detail_id: String,
    pub counted_quantity: Option<i64>,
    pub is_check: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StocktakeRequest {
    pub store_id: String,
    pub note: String,
    pub status: StocktakeStatus,
    pub lines: Vec<StocktakeRequestLine>,
}

// =============================================================================
// Local Draft
// =============================================================================

/// Counting in progress, cached locally per stocktake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StocktakeDraft {
    pub stocktake_id: String,
    /// import_detail_id → counted items.
    #[serde(default)]
    pub counted: BTreeMap<String, i64>,
    #[serde(default)]
    pub checked: BTreeSet<String>,
}

impl StocktakeDraft {
    pub fn new(stocktake_id: impl Into<String>) -> Self {
        StocktakeDraft {
            stocktake_id: stocktake_id.into(),
            ..Default::default()
        }
    }

    pub fn record_count(&mut self, import_detail_id: &str, counted: i64) -> CoreResult<()> {
        let counted = validate_counted(counted)?;
        self.counted.insert(import_detail_id.to_string(), counted);
        Ok(())
    }

    pub fn mark_checked(&mut self, import_detail_id: &str, checked: bool) {
        if checked {
            self.checked.insert(import_detail_id.to_string());
        } else {
            self.checked.remove(import_detail_id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counted.is_empty() && self.checked.is_empty()
    }
}

//! # Line-Item Collection
//!
//! The editable product table of a sale transaction and the reducers that
//! mutate it.
//!
//! ## Reducer Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  validate-then-apply, never clamp                       │
//! │                                                                         │
//! │   lines ──► reducer(&lines, args) ──┬── Ok(new_lines)   (new Arc)       │
//! │                                     │                                   │
//! │                                     └── Err(CoreError)  lines untouched │
//! │                                                                         │
//! │  Every Ok result satisfies, for every line:                             │
//! │     quantity × factor(unit) ≤ remain_quantity                           │
//! │     total == price × quantity × factor(unit)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reducers take `&self` and build their result on a scratch copy, so a
//! rejected mutation cannot leak a partial change. Callers keep the old
//! [`LineItems`] on error; [`LineItems::same_as`] proves nothing moved.
//!
//! ## Unit Switch Policy
//! Both directions convert proportionally (see [`crate::unit`]); switching
//! to khay then caps the quantity at `floor(remain / 30)` packs. The same
//! policy applies to single-line and bulk switches.

use serde::Serialize;
use std::sync::Arc;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{DetailLine, ProductBatch};
use crate::unit::Unit;

// =============================================================================
// Line Item
// =============================================================================

/// One row of the product table.
///
/// Quantity, unit, price and stock are private: they only change through
/// the reducers on [`LineItems`], which keep `total` in step.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    id: String,
    product_id: String,
    batch_id: Option<String>,
    product_name: String,
    batch_code: Option<String>,
    quantity: i64,
    unit: Unit,
    price: Money,
    remain_quantity: i64,
    total: Money,
    zone_real: Vec<String>,
}

impl LineItem {
    /// Creates a line seeded from a batch, validating the stock ceiling.
    pub fn from_batch(batch: &ProductBatch, quantity: i64, unit: Unit) -> CoreResult<Self> {
        let id = batch
            .batch_id
            .clone()
            .unwrap_or_else(|| format!("tmp-{}", Uuid::new_v4()));

        let mut line = LineItem {
            id,
            product_id: batch.product_id.clone(),
            batch_id: batch.batch_id.clone(),
            product_name: batch.product_name.clone(),
            batch_code: batch.batch_code.clone(),
            quantity,
            unit,
            price: batch.unit_sale_price.non_negative(),
            remain_quantity: batch.remain_quantity,
            total: Money::zero(),
            zone_real: batch.zone_real.clone(),
        };

        validate_quantity(quantity)?;
        if unit == Unit::Khay && Unit::Khay.ceiling(line.remain_quantity) < 1 {
            return Err(line.pack_unavailable());
        }
        line.check_fits(quantity, unit)?;
        line.recompute();
        Ok(line)
    }

    /// Rebuilds a line from a persisted transaction detail.
    ///
    /// The reported remaining stock is raised to the line's own item count
    /// when lower, so a hydrated line never starts out of bounds.
    pub fn from_detail(detail: &DetailLine) -> Self {
        let quantity = detail.quantity.max(1);
        let items = detail.unit.to_items(quantity);
        let mut line = LineItem {
            id: detail.batch_id.clone(),
            product_id: detail.product_id.clone(),
            batch_id: Some(detail.batch_id.clone()),
            product_name: detail.product_name.clone(),
            batch_code: detail.batch_code.clone(),
            quantity,
            unit: detail.unit,
            price: detail.unit_sale_price.non_negative(),
            remain_quantity: detail.remain_quantity.unwrap_or(items).max(items),
            total: Money::zero(),
            zone_real: detail.zone_real.clone(),
        };
        line.recompute();
        line
    }

    /// Serializes the line into the backend `detail` shape.
    ///
    /// ## Errors
    /// [`CoreError::MissingBatch`] when the line has no batch.
    pub fn to_detail(&self) -> CoreResult<DetailLine> {
        let batch_id = self
            .batch_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| CoreError::MissingBatch {
                product: self.product_name.clone(),
            })?;

        Ok(DetailLine {
            product_id: self.product_id.clone(),
            batch_id,
            product_name: self.product_name.clone(),
            batch_code: self.batch_code.clone(),
            quantity: self.quantity,
            unit: self.unit,
            unit_sale_price: self.price,
            total: self.total,
            remain_quantity: Some(self.remain_quantity),
            zone_real: self.zone_real.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref()
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn batch_code(&self) -> Option<&str> {
        self.batch_code.as_deref()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Per-item price.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Remaining batch stock, in items.
    pub fn remain_quantity(&self) -> i64 {
        self.remain_quantity
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn zone_real(&self) -> &[String] {
        &self.zone_real
    }

    /// Item-equivalent of the line quantity.
    pub fn items(&self) -> i64 {
        self.unit.to_items(self.quantity)
    }

    /// "Product (lô CODE)" label used in messages.
    pub fn label(&self) -> String {
        match &self.batch_code {
            Some(code) if !code.is_empty() => format!("{} (lô {})", self.product_name, code),
            _ => self.product_name.clone(),
        }
    }

    fn same_source(&self, batch: &ProductBatch) -> bool {
        match (&self.batch_id, &batch.batch_id) {
            (Some(mine), Some(theirs)) => mine == theirs,
            (None, None) => self.product_id == batch.product_id,
            _ => false,
        }
    }

    fn check_fits(&self, quantity: i64, unit: Unit) -> CoreResult<()> {
        if unit.to_items(quantity) > self.remain_quantity {
            return Err(CoreError::ExceedsStock {
                item: self.label(),
                requested: quantity,
                unit,
                available: self.remain_quantity,
                max: unit.ceiling(self.remain_quantity),
            });
        }
        Ok(())
    }

    fn pack_unavailable(&self) -> CoreError {
        CoreError::PackUnavailable {
            item: self.label(),
            available: self.remain_quantity,
        }
    }

    fn recompute(&mut self) {
        self.total = self.price.multiply_quantity(self.unit.to_items(self.quantity));
    }

    /// Converts the line to `target`, capping packs at the stock ceiling.
    fn switch_unit(&mut self, target: Unit) -> CoreResult<()> {
        if self.unit == target {
            return Ok(());
        }
        let ceiling = target.ceiling(self.remain_quantity);
        if target == Unit::Khay && ceiling < 1 {
            return Err(self.pack_unavailable());
        }
        let converted = self.unit.convert(self.quantity, target);
        self.quantity = converted.min(ceiling).max(1);
        self.unit = target;
        self.recompute();
        Ok(())
    }
}

fn validate_quantity(quantity: i64) -> CoreResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "Số lượng".to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// Reducer Inputs
// =============================================================================

/// Options for [`LineItems::select_product`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Defaults to 1.
    pub quantity: Option<i64>,
    /// Defaults to quả.
    pub unit: Option<Unit>,
}

/// One pick from the batch-selection dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSelection {
    pub batch: ProductBatch,
    pub quantity: i64,
    pub unit: Unit,
}

// =============================================================================
// Line Items
// =============================================================================

/// Ordered, immutable collection of lines.
///
/// Cloning is cheap (one `Arc`); every successful reducer returns a fresh
/// allocation, every failed one returns an error and nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LineItems(Arc<Vec<LineItem>>);

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from lines, making local ids unique.
    pub fn from_lines(lines: Vec<LineItem>) -> Self {
        let mut lines = lines;
        let mut seen = std::collections::HashSet::new();
        for line in lines.iter_mut() {
            if !seen.insert(line.id.clone()) {
                let mut n = 2;
                while !seen.insert(format!("{}#{}", line.id, n)) {
                    n += 1;
                }
                line.id = format!("{}#{}", line.id, n);
            }
        }
        LineItems(Arc::new(lines))
    }

    /// Hydrates the table from a persisted transaction's detail.
    pub fn from_details(details: &[DetailLine]) -> Self {
        Self::from_lines(details.iter().map(LineItem::from_detail).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LineItem] {
        &self.0
    }

    pub fn find(&self, id: &str) -> Option<&LineItem> {
        self.0.iter().find(|l| l.id == id)
    }

    /// True when both handles point at the same allocation.
    pub fn same_as(&self, other: &LineItems) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Sum of all line totals.
    pub fn total_amount(&self) -> Money {
        self.0.iter().map(|l| l.total).sum()
    }

    /// Serializes every line into the backend detail shape.
    ///
    /// Fails on the first line without a batch; nothing is returned for
    /// the others.
    pub fn to_details(&self) -> CoreResult<Vec<DetailLine>> {
        self.0.iter().map(LineItem::to_detail).collect()
    }

    // =========================================================================
    // Reducers
    // =========================================================================

    /// Adds a batch to the table, or increases the matching line.
    ///
    /// ## Behavior
    /// - A line for the same batch (or the same batch-less product) gets
    ///   `options.quantity` more, converted into the line's unit
    /// - Otherwise a new line is appended: unit quả, price from
    ///   `unit_sale_price`, quantity 1, unless overridden by `options`
    pub fn select_product(&self, batch: &ProductBatch, options: SelectOptions) -> CoreResult<Self> {
        let mut lines = (*self.0).clone();
        merge_into(
            &mut lines,
            batch,
            options.quantity.unwrap_or(1),
            options.unit.unwrap_or_default(),
        )?;
        Ok(LineItems(Arc::new(lines)))
    }

    /// Applies every pick from the batch dialog, or none of them.
    ///
    /// ## Errors
    /// The first pick that does not fit its batch's stock; the message
    /// names that batch.
    pub fn add_products_from_dialog(&self, selections: &[BatchSelection]) -> CoreResult<Self> {
        let mut lines = (*self.0).clone();
        for pick in selections {
            merge_into(&mut lines, &pick.batch, pick.quantity, pick.unit)?;
        }
        Ok(LineItems(Arc::new(lines)))
    }

    /// Adds `delta` to a line's quantity (never below 1).
    pub fn change_quantity(&self, id: &str, delta: i64) -> CoreResult<Self> {
        self.update(id, |line| {
            let next = line.quantity.saturating_add(delta).max(1);
            line.check_fits(next, line.unit)?;
            line.quantity = next;
            Ok(())
        })
    }

    /// Sets a line's quantity directly (never below 1).
    pub fn set_quantity(&self, id: &str, value: i64) -> CoreResult<Self> {
        self.update(id, |line| {
            let next = value.max(1);
            line.check_fits(next, line.unit)?;
            line.quantity = next;
            Ok(())
        })
    }

    /// Sets a line's per-item price (never below 0).
    pub fn change_price(&self, id: &str, price: Money) -> CoreResult<Self> {
        self.update(id, |line| {
            line.price = price.non_negative();
            Ok(())
        })
    }

    /// Switches one line's unit.
    ///
    /// ## Errors
    /// [`CoreError::PackUnavailable`] when switching to khay with less than
    /// one full pack of stock.
    pub fn change_unit(&self, id: &str, unit: Unit) -> CoreResult<Self> {
        self.update(id, |line| line.switch_unit(unit))
    }

    /// Switches every line's unit; all lines switch or none do.
    pub fn set_unit_all(&self, unit: Unit) -> CoreResult<Self> {
        let mut lines = (*self.0).clone();
        for line in lines.iter_mut() {
            line.switch_unit(unit)?;
        }
        Ok(LineItems(Arc::new(lines)))
    }

    /// Removes a line. Unknown ids leave the collection as it is.
    pub fn delete_line(&self, id: &str) -> Self {
        if self.find(id).is_none() {
            return self.clone();
        }
        let lines = self.0.iter().filter(|l| l.id != id).cloned().collect();
        LineItems(Arc::new(lines))
    }

    fn update<F>(&self, id: &str, f: F) -> CoreResult<Self>
    where
        F: FnOnce(&mut LineItem) -> CoreResult<()>,
    {
        let index = self
            .0
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| CoreError::LineNotFound(id.to_string()))?;

        let mut line = self.0[index].clone();
        f(&mut line)?;
        line.recompute();

        let mut lines = (*self.0).clone();
        lines[index] = line;
        Ok(LineItems(Arc::new(lines)))
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn merge_into(
    lines: &mut Vec<LineItem>,
    batch: &ProductBatch,
    quantity: i64,
    unit: Unit,
) -> CoreResult<()> {
    validate_quantity(quantity)?;

    if let Some(line) = lines.iter_mut().find(|l| l.same_source(batch)) {
        let incoming = unit.convert(quantity, line.unit);
        let next = line.quantity.saturating_add(incoming);
        line.check_fits(next, line.unit)?;
        line.quantity = next;
        line.recompute();
        return Ok(());
    }

    let mut line = LineItem::from_batch(batch, quantity, unit)?;
    if lines.iter().any(|l| l.id == line.id) {
        line.id = format!("tmp-{}", Uuid::new_v4());
    }
    lines.push(line);
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn batch(batch_id: &str, remain: i64, price: i64) -> ProductBatch {
        ProductBatch {
            product_id: format!("p-{}", batch_id),
            batch_id: Some(batch_id.to_string()),
            product_name: "Trứng gà".to_string(),
            batch_code: Some(format!("L-{}", batch_id)),
            unit_sale_price: Money::from_dong(price),
            remain_quantity: remain,
            expiry_date: None,
            zone_real: vec!["Z1".to_string()],
        }
    }

    fn assert_invariants(lines: &LineItems) {
        for line in lines {
            assert!(line.items() <= line.remain_quantity(), "stock ceiling broken");
            assert_eq!(
                line.total(),
                line.price().multiply_quantity(line.unit().to_items(line.quantity()))
            );
        }
    }

    fn one_line(remain: i64, quantity: i64) -> LineItems {
        LineItems::new()
            .select_product(
                &batch("X", remain, 3_000),
                SelectOptions {
                    quantity: Some(quantity),
                    unit: None,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_select_product_appends_with_defaults() {
        let lines = LineItems::new()
            .select_product(&batch("X", 50, 3_000), SelectOptions::default())
            .unwrap();

        let line = &lines.as_slice()[0];
        assert_eq!(line.id(), "X");
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.unit(), Unit::Qua);
        assert_eq!(line.price().dong(), 3_000);
        assert_eq!(line.total().dong(), 3_000);
    }

    #[test]
    fn test_select_same_batch_increments() {
        let lines = one_line(50, 10);
        let lines = lines
            .select_product(
                &batch("X", 50, 3_000),
                SelectOptions {
                    quantity: Some(5),
                    unit: None,
                },
            )
            .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines.as_slice()[0].quantity(), 15);
        assert_invariants(&lines);
    }

    #[test]
    fn test_select_without_batch_gets_temporary_id() {
        let mut payload = batch("X", 10, 1_000);
        payload.batch_id = None;
        let lines = LineItems::new()
            .select_product(&payload, SelectOptions::default())
            .unwrap();
        assert!(lines.as_slice()[0].id().starts_with("tmp-"));
        assert_eq!(lines.as_slice()[0].batch_id(), None);
    }

    /// Scenario: remain 50, quantity 10, +45 rejected mentioning 50,
    /// then switch to khay capped at 1 pack.
    #[test]
    fn test_stock_scenario() {
        let lines = one_line(50, 10);
        assert_eq!(lines.as_slice()[0].total().dong(), 30_000);

        let err = lines.change_quantity("X", 45).unwrap_err();
        assert!(matches!(err, CoreError::ExceedsStock { available: 50, .. }));
        assert!(err.to_string().contains("50"));
        assert_eq!(lines.as_slice()[0].quantity(), 10);

        let packs = lines.change_unit("X", Unit::Khay).unwrap();
        let line = &packs.as_slice()[0];
        assert_eq!(line.unit(), Unit::Khay);
        assert_eq!(line.quantity(), 1);
        assert_eq!(line.total().dong(), 90_000);
        assert_invariants(&packs);
    }

    #[test]
    fn test_rejected_mutation_keeps_allocation() {
        let lines = one_line(50, 10);
        let before = lines.clone();
        assert!(lines.set_quantity("X", 51).is_err());
        assert!(lines.same_as(&before));
        assert_eq!(lines, before);
    }

    #[test]
    fn test_change_quantity_floor_is_one() {
        let lines = one_line(50, 3).change_quantity("X", -10).unwrap();
        assert_eq!(lines.as_slice()[0].quantity(), 1);
    }

    #[test]
    fn test_set_quantity_in_packs_uses_pack_ceiling() {
        let lines = one_line(95, 1).change_unit("X", Unit::Khay).unwrap();
        assert!(lines.set_quantity("X", 3).is_ok());
        let err = lines.set_quantity("X", 4).unwrap_err();
        assert!(matches!(err, CoreError::ExceedsStock { max: 3, .. }));
    }

    #[test]
    fn test_change_price_clamps_and_recomputes() {
        let lines = one_line(50, 4);
        let lines = lines.change_price("X", Money::from_dong(2_000)).unwrap();
        assert_eq!(lines.as_slice()[0].total().dong(), 8_000);

        let lines = lines.change_price("X", Money::from_dong(-5)).unwrap();
        assert_eq!(lines.as_slice()[0].price(), Money::zero());
        assert_eq!(lines.as_slice()[0].total(), Money::zero());
    }

    #[test]
    fn test_huge_item_pick_on_pack_line_exceeds_stock() {
        let lines = LineItems::new()
            .select_product(
                &batch("X", 90, 3_000),
                SelectOptions {
                    quantity: Some(1),
                    unit: Some(Unit::Khay),
                },
            )
            .unwrap();

        let err = lines
            .select_product(
                &batch("X", 90, 3_000),
                SelectOptions {
                    quantity: Some(i64::MAX),
                    unit: Some(Unit::Qua),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::ExceedsStock { available: 90, .. }));
        assert_eq!(lines.as_slice()[0].quantity(), 1);
        assert_eq!(lines.as_slice()[0].unit(), Unit::Khay);
    }

    #[test]
    fn test_extreme_prices_saturate_the_total() {
        let lines = LineItems::new()
            .select_product(&batch("A", 50, 1_000), SelectOptions::default())
            .unwrap()
            .select_product(&batch("B", 50, 1_000), SelectOptions::default())
            .unwrap()
            .change_price("A", Money::from_dong(i64::MAX))
            .unwrap()
            .change_price("B", Money::from_dong(i64::MAX))
            .unwrap();

        assert_eq!(lines.total_amount(), Money::from_dong(i64::MAX));
    }

    #[test]
    fn test_change_unit_needs_a_full_pack() {
        let lines = one_line(29, 5);
        let err = lines.change_unit("X", Unit::Khay).unwrap_err();
        assert!(matches!(err, CoreError::PackUnavailable { available: 29, .. }));
    }

    #[test]
    fn test_unit_round_trip_is_lossy() {
        let lines = one_line(100, 10);
        let packs = lines.change_unit("X", Unit::Khay).unwrap();
        let back = packs.change_unit("X", Unit::Qua).unwrap();
        assert_eq!(back.as_slice()[0].quantity(), 30);
        assert_invariants(&back);
    }

    #[test]
    fn test_unknown_line_is_reported() {
        let lines = one_line(10, 1);
        assert_eq!(
            lines.change_quantity("nope", 1).unwrap_err(),
            CoreError::LineNotFound("nope".to_string())
        );
    }

    #[test]
    fn test_dialog_is_all_or_nothing() {
        let lines = one_line(50, 10);
        let picks = vec![
            BatchSelection {
                batch: batch("A", 100, 1_000),
                quantity: 20,
                unit: Unit::Qua,
            },
            BatchSelection {
                batch: batch("B", 10, 1_000),
                quantity: 11,
                unit: Unit::Qua,
            },
        ];

        let err = lines.add_products_from_dialog(&picks).unwrap_err();
        assert!(err.to_string().contains("L-B"));
        assert_eq!(lines.len(), 1);

        let ok = lines.add_products_from_dialog(&picks[..1]).unwrap();
        assert_eq!(ok.len(), 2);
        assert_invariants(&ok);
    }

    #[test]
    fn test_dialog_counts_duplicates_against_stock() {
        let pick = BatchSelection {
            batch: batch("A", 30, 1_000),
            quantity: 20,
            unit: Unit::Qua,
        };
        let err = LineItems::new()
            .add_products_from_dialog(&[pick.clone(), pick])
            .unwrap_err();
        assert!(matches!(err, CoreError::ExceedsStock { requested: 40, .. }));
    }

    #[test]
    fn test_bulk_unit_switch() {
        let lines = LineItems::new()
            .add_products_from_dialog(&[
                BatchSelection {
                    batch: batch("A", 100, 1_000),
                    quantity: 31,
                    unit: Unit::Qua,
                },
                BatchSelection {
                    batch: batch("B", 60, 1_000),
                    quantity: 10,
                    unit: Unit::Qua,
                },
            ])
            .unwrap();

        let packs = lines.set_unit_all(Unit::Khay).unwrap();
        assert_eq!(packs.as_slice()[0].quantity(), 2);
        assert_eq!(packs.as_slice()[1].quantity(), 1);
        assert_invariants(&packs);

        let items = packs.set_unit_all(Unit::Qua).unwrap();
        assert_eq!(items.as_slice()[0].quantity(), 60);
        assert_eq!(items.as_slice()[1].quantity(), 30);
        assert_invariants(&items);
    }

    #[test]
    fn test_bulk_switch_rejects_when_any_line_lacks_a_pack() {
        let lines = LineItems::new()
            .add_products_from_dialog(&[
                BatchSelection {
                    batch: batch("A", 100, 1_000),
                    quantity: 5,
                    unit: Unit::Qua,
                },
                BatchSelection {
                    batch: batch("B", 20, 1_000),
                    quantity: 5,
                    unit: Unit::Qua,
                },
            ])
            .unwrap();
        assert!(lines.set_unit_all(Unit::Khay).is_err());
    }

    #[test]
    fn test_delete_line() {
        let lines = one_line(10, 1);
        assert!(lines.delete_line("X").is_empty());
        assert!(lines.delete_line("missing").same_as(&lines));
    }

    #[test]
    fn test_totals_and_details() {
        let lines = one_line(50, 10)
            .select_product(&batch("Y", 60, 2_000), SelectOptions::default())
            .unwrap();
        assert_eq!(lines.total_amount().dong(), 32_000);

        let details = lines.to_details().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[1].batch_id, "Y");
    }

    #[test]
    fn test_missing_batch_blocks_serialization() {
        let mut payload = batch("Z", 10, 1_000);
        payload.batch_id = None;
        payload.product_name = "Trứng vịt".to_string();
        let lines = one_line(50, 1)
            .select_product(&payload, SelectOptions::default())
            .unwrap();

        let err = lines.to_details().unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingBatch {
                product: "Trứng vịt".to_string()
            }
        );
    }

    #[test]
    fn test_hydrated_lines_get_unique_ids() {
        let detail = DetailLine {
            product_id: "p".to_string(),
            batch_id: "b".to_string(),
            product_name: "Trứng".to_string(),
            batch_code: None,
            quantity: 2,
            unit: Unit::Khay,
            unit_sale_price: Money::from_dong(100),
            total: Money::from_dong(1),
            remain_quantity: Some(10),
            zone_real: vec![],
        };
        let lines = LineItems::from_details(&[detail.clone(), detail]);
        assert_eq!(lines.as_slice()[0].id(), "b");
        assert_eq!(lines.as_slice()[1].id(), "b#2");
        // total is recomputed, never taken from the payload
        assert_eq!(lines.as_slice()[0].total().dong(), 6_000);
        assert_eq!(lines.as_slice()[0].remain_quantity(), 60);
        assert_invariants(&lines);
    }
}

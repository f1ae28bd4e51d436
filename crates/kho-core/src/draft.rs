//! # Draft / Summary State Machine
//!
//! One editor drives creating, editing and stock-balancing sale
//! transactions. The host sends typed [`EditorAction`]s; the editor answers
//! with an [`Effect`] telling it whether a request must be sent.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌─────────┐ show_summary  ┌────────────────┐ confirm  ┌────────────┐  │
//! │   │ Editing │──────────────►│ SummaryPending │─────────►│ Persisting │  │
//! │   └─────────┘◄──────────────└────────────────┘          └─────┬──────┘  │
//! │     ▲  ▲      back_to_editing        │ missing batch          │         │
//! │     │  └─────────────────────────────┘                        │         │
//! │     │                                                         │         │
//! │     │  persist_failed (backend message or fallback)           │         │
//! │     └─────────────────────────────────────────────────────────┤         │
//! │                                                               ▼         │
//! │   begin_new ◄──────────────────────────────────────────── Committed     │
//! │                                      persist_succeeded: blank form,     │
//! │                                      success message, guard clean       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modes
//! | Mode      | Submit                                  | Seeded from           |
//! |-----------|-----------------------------------------|-----------------------|
//! | `Create`  | `POST /sale-transactions/save`          | blank form            |
//! | `Edit`    | `PUT /sale-transactions/{id}`           | `hydrate(transaction)`|
//! | `Balance` | `POST /sale-transactions/save-from-balance` | stocktake shortfalls |
//!
//! Line edits are only accepted while `Editing`. Every accepted edit
//! recomputes the unsaved-changes flag; every rejected one records the
//! error (and the field to highlight) and leaves the draft as it was.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult, FormField};
use crate::form_data::Directory;
use crate::guard::{Snapshot, UnsavedChangesGuard};
use crate::line_item::{BatchSelection, LineItems, SelectOptions};
use crate::money::Money;
use crate::types::{
    Customer, ProductBatch, SaleTransaction, SaveTransactionRequest, Store, SummaryAction,
    TransactionStatus,
};
use crate::unit::Unit;
use crate::validation::validate_for_summary;

/// Shown when a save fails without a backend message.
pub const SAVE_FAILED_FALLBACK: &str = "Đã xảy ra lỗi khi lưu phiếu bán hàng, vui lòng thử lại";

// =============================================================================
// Mode
// =============================================================================

/// What the editor is working on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditorMode {
    Create,
    Edit {
        #[serde(rename = "transactionId")]
        transaction_id: String,
    },
    Balance {
        #[serde(rename = "stocktakeId")]
        stocktake_id: String,
    },
}

impl EditorMode {
    pub fn submit_target(&self) -> SubmitTarget {
        match self {
            EditorMode::Create => SubmitTarget::Save,
            EditorMode::Edit { transaction_id } => SubmitTarget::Update {
                transaction_id: transaction_id.clone(),
            },
            EditorMode::Balance { .. } => SubmitTarget::SaveFromBalance,
        }
    }

    fn success_message(&self, action: SummaryAction) -> &'static str {
        match (self, action) {
            (EditorMode::Create, SummaryAction::Draft) => "Lưu nháp phiếu bán hàng thành công",
            (EditorMode::Create, SummaryAction::Complete) => "Tạo phiếu bán hàng thành công",
            (EditorMode::Edit { .. }, _) => "Cập nhật phiếu bán hàng thành công",
            (EditorMode::Balance { .. }, _) => "Cân bằng kho thành công",
        }
    }
}

/// Endpoint a submission goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Save,
    Update { transaction_id: String },
    SaveFromBalance,
}

// =============================================================================
// Draft
// =============================================================================

/// The transaction being edited.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    pub code: Option<String>,
    pub customer_id: Option<String>,
    pub store_id: Option<String>,
    pub sale_date: Option<NaiveDate>,
    pub note: String,
    pub paid_amount: Money,
    pub status: TransactionStatus,
    pub lines: LineItems,
}

impl SaleDraft {
    /// An empty form dated `today`.
    pub fn blank(today: NaiveDate) -> Self {
        SaleDraft {
            code: None,
            customer_id: None,
            store_id: None,
            sale_date: Some(today),
            note: String::new(),
            paid_amount: Money::zero(),
            status: TransactionStatus::Draft,
            lines: LineItems::new(),
        }
    }

    /// Seeds a draft from a persisted transaction.
    pub fn from_transaction(tx: &SaleTransaction) -> Self {
        SaleDraft {
            code: Some(tx.code.clone()).filter(|c| !c.is_empty()),
            customer_id: Some(tx.customer_id.clone()),
            store_id: Some(tx.store_id.clone()),
            sale_date: Some(tx.sale_date),
            note: tx.note.clone(),
            paid_amount: tx.paid_amount,
            status: tx.status,
            lines: LineItems::from_details(&tx.detail),
        }
    }

    pub fn total_amount(&self) -> Money {
        self.lines.total_amount()
    }

    /// Builds the request body.
    ///
    /// ## Errors
    /// - the summary gate (customer, store, lines, date)
    /// - [`CoreError::MissingBatch`] for the first line without a batch
    pub fn to_request(
        &self,
        action: SummaryAction,
        stocktake_id: Option<String>,
    ) -> CoreResult<SaveTransactionRequest> {
        validate_for_summary(self)?;
        let detail = self.lines.to_details()?;

        Ok(SaveTransactionRequest {
            code: self.code.clone(),
            customer_id: self.customer_id.clone().unwrap_or_default(),
            store_id: self.store_id.clone().unwrap_or_default(),
            sale_date: self.sale_date.unwrap_or_default(),
            note: self.note.trim().to_string(),
            paid_amount: self.paid_amount,
            total_amount: self.total_amount(),
            status: action.target_status(),
            detail,
            stocktake_id,
        })
    }
}

// =============================================================================
// Phase
// =============================================================================

/// What the confirmation step shows.
///
/// Customer and store are the loaded records, not just their ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub action: SummaryAction,
    pub code: Option<String>,
    pub customer: Customer,
    pub store: Store,
    pub sale_date: Option<NaiveDate>,
    pub note: String,
    pub paid_amount: Money,
    pub total_amount: Money,
    pub lines: LineItems,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "data", rename_all = "camelCase")]
pub enum Phase {
    Editing,
    SummaryPending(SummaryData),
    Persisting(SummaryAction),
    Committed,
}

impl Phase {
    pub const fn name(&self) -> &'static str {
        match self {
            Phase::Editing => "chỉnh sửa",
            Phase::SummaryPending(_) => "xác nhận",
            Phase::Persisting(_) => "đang lưu",
            Phase::Committed => "đã lưu",
        }
    }
}

// =============================================================================
// Actions & Effects
// =============================================================================

/// Everything the host can ask the editor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    SetCustomer(Option<String>),
    SetStore(Option<String>),
    SetSaleDate(Option<NaiveDate>),
    SetNote(String),
    SetPaidAmount(Money),
    SetCode(Option<String>),
    SelectProduct {
        batch: ProductBatch,
        options: SelectOptions,
    },
    AddFromDialog(Vec<BatchSelection>),
    ChangeQuantity {
        id: String,
        delta: i64,
    },
    SetQuantity {
        id: String,
        value: i64,
    },
    ChangePrice {
        id: String,
        price: Money,
    },
    ChangeUnit {
        id: String,
        unit: Unit,
    },
    SetUnitAll(Unit),
    DeleteLine {
        id: String,
    },
    ShowSummary(SummaryAction),
    BackToEditing,
    ConfirmSummary,
    Cancel,
}

/// A request the host must send.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub target: SubmitTarget,
    pub request: SaveTransactionRequest,
}

/// What the host must do after a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Submit(Submission),
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub message: String,
    pub status: TransactionStatus,
}

// =============================================================================
// Editor
// =============================================================================

/// The sale-transaction editor.
#[derive(Debug, Clone)]
pub struct Editor {
    mode: EditorMode,
    today: NaiveDate,
    original: SaleDraft,
    draft: SaleDraft,
    guard: UnsavedChangesGuard,
    phase: Phase,
    error: Option<String>,
    highlight: Option<FormField>,
    directory: Directory,
}

impl Editor {
    /// A create-mode editor with a blank form.
    pub fn new(today: NaiveDate) -> Self {
        Self::seeded(EditorMode::Create, today, SaleDraft::blank(today))
    }

    /// A balance-mode editor seeded with stocktake shortfalls.
    pub fn for_balance(
        stocktake_id: impl Into<String>,
        store_id: Option<String>,
        lines: LineItems,
        today: NaiveDate,
    ) -> Self {
        let mut draft = SaleDraft::blank(today);
        draft.store_id = store_id;
        draft.lines = lines;
        Self::seeded(
            EditorMode::Balance {
                stocktake_id: stocktake_id.into(),
            },
            today,
            draft,
        )
    }

    fn seeded(mode: EditorMode, today: NaiveDate, draft: SaleDraft) -> Self {
        Editor {
            mode,
            today,
            guard: UnsavedChangesGuard::new(Snapshot::of(&draft)),
            original: draft.clone(),
            draft,
            phase: Phase::Editing,
            error: None,
            highlight: None,
            directory: Directory::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn draft(&self) -> &SaleDraft {
        &self.draft
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_dirty(&self) -> bool {
        self.guard.is_dirty()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn highlight(&self) -> Option<FormField> {
        self.highlight
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.draft)
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Replaces the records the summary resolves customer and store from.
    pub fn set_directory(&mut self, directory: Directory) {
        self.directory = directory;
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Applies one action.
    pub fn dispatch(&mut self, action: EditorAction) -> CoreResult<Effect> {
        match action {
            EditorAction::SetCustomer(id) => self.edit("chọn khách hàng", |d| {
                d.customer_id = id;
                Ok(())
            }),
            EditorAction::SetStore(id) => self.edit("chọn cửa hàng", |d| {
                d.store_id = id;
                Ok(())
            }),
            EditorAction::SetSaleDate(date) => self.edit("chọn ngày bán", |d| {
                d.sale_date = date;
                Ok(())
            }),
            EditorAction::SetNote(note) => self.edit("sửa ghi chú", |d| {
                d.note = note;
                Ok(())
            }),
            EditorAction::SetPaidAmount(amount) => self.edit("sửa số tiền trả", |d| {
                d.paid_amount = amount.non_negative();
                Ok(())
            }),
            EditorAction::SetCode(code) => self.edit("đặt mã phiếu", |d| {
                d.code = code;
                Ok(())
            }),
            EditorAction::SelectProduct { batch, options } => self.edit("chọn sản phẩm", |d| {
                d.lines = d.lines.select_product(&batch, options)?;
                Ok(())
            }),
            EditorAction::AddFromDialog(picks) => self.edit("thêm sản phẩm", |d| {
                d.lines = d.lines.add_products_from_dialog(&picks)?;
                Ok(())
            }),
            EditorAction::ChangeQuantity { id, delta } => self.edit("đổi số lượng", |d| {
                d.lines = d.lines.change_quantity(&id, delta)?;
                Ok(())
            }),
            EditorAction::SetQuantity { id, value } => self.edit("đổi số lượng", |d| {
                d.lines = d.lines.set_quantity(&id, value)?;
                Ok(())
            }),
            EditorAction::ChangePrice { id, price } => self.edit("đổi đơn giá", |d| {
                d.lines = d.lines.change_price(&id, price)?;
                Ok(())
            }),
            EditorAction::ChangeUnit { id, unit } => self.edit("đổi đơn vị", |d| {
                d.lines = d.lines.change_unit(&id, unit)?;
                Ok(())
            }),
            EditorAction::SetUnitAll(unit) => self.edit("đổi đơn vị", |d| {
                d.lines = d.lines.set_unit_all(unit)?;
                Ok(())
            }),
            EditorAction::DeleteLine { id } => self.edit("xóa dòng", |d| {
                d.lines = d.lines.delete_line(&id);
                Ok(())
            }),
            EditorAction::ShowSummary(action) => self.show_summary(action).map(|_| Effect::None),
            EditorAction::BackToEditing => self.back_to_editing().map(|_| Effect::None),
            EditorAction::ConfirmSummary => self.confirm_summary().map(Effect::Submit),
            EditorAction::Cancel => self.cancel().map(|_| Effect::None),
        }
    }

    fn edit<F>(&mut self, action: &str, f: F) -> CoreResult<Effect>
    where
        F: FnOnce(&mut SaleDraft) -> CoreResult<()>,
    {
        if !matches!(self.phase, Phase::Editing) {
            return self.fail(CoreError::transition(self.phase.name(), action));
        }

        let mut next = self.draft.clone();
        if let Err(e) = f(&mut next) {
            return self.fail(e);
        }
        self.draft = next;
        self.clear_error();
        let dirty = self.guard.reconcile(&Snapshot::of(&self.draft));
        debug!(action, dirty, lines = self.draft.lines.len(), "Draft edited");
        Ok(Effect::None)
    }

    fn fail<T>(&mut self, err: CoreError) -> CoreResult<T> {
        debug!(error = %err, "Editor rejected action");
        self.error = Some(err.to_string());
        self.highlight = err.highlight();
        Err(err)
    }

    fn clear_error(&mut self) {
        self.error = None;
        self.highlight = None;
    }

    // -------------------------------------------------------------------------
    // Summary / Commit
    // -------------------------------------------------------------------------

    /// Opens the confirmation step, or records why it cannot open.
    ///
    /// ## Errors
    /// - the summary gate (customer, store, lines, date)
    /// - [`CoreError::UnknownReference`] when the chosen customer or store
    ///   is not in the loaded [`Directory`]
    pub fn show_summary(&mut self, action: SummaryAction) -> CoreResult<&SummaryData> {
        if !matches!(self.phase, Phase::Editing) {
            return self.fail(CoreError::transition(self.phase.name(), "xem tổng kết"));
        }
        if let Err(e) = validate_for_summary(&self.draft) {
            return self.fail(e.into());
        }
        let (customer, store) = match self.resolve_parties() {
            Ok(parties) => parties,
            Err(e) => return self.fail(e),
        };

        self.clear_error();
        let d = &self.draft;
        self.phase = Phase::SummaryPending(SummaryData {
            action,
            code: d.code.clone(),
            customer,
            store,
            sale_date: d.sale_date,
            note: d.note.clone(),
            paid_amount: d.paid_amount,
            total_amount: d.total_amount(),
            lines: d.lines.clone(),
        });

        match &self.phase {
            Phase::SummaryPending(summary) => Ok(summary),
            _ => Err(CoreError::transition("xác nhận", "xem tổng kết")),
        }
    }

    fn resolve_parties(&self) -> CoreResult<(Customer, Store)> {
        let customer_id = self.draft.customer_id.as_deref().unwrap_or_default();
        let customer = self.directory.customer(customer_id).cloned().ok_or_else(|| {
            CoreError::UnknownReference {
                field: FormField::Customer,
                id: customer_id.to_string(),
            }
        })?;

        let store_id = self.draft.store_id.as_deref().unwrap_or_default();
        let store = self.directory.store(store_id).cloned().ok_or_else(|| {
            CoreError::UnknownReference {
                field: FormField::Store,
                id: store_id.to_string(),
            }
        })?;
        Ok((customer, store))
    }

    pub fn back_to_editing(&mut self) -> CoreResult<()> {
        match self.phase {
            Phase::SummaryPending(_) => {
                self.phase = Phase::Editing;
                Ok(())
            }
            _ => self.fail(CoreError::transition(self.phase.name(), "quay lại")),
        }
    }

    /// Serializes the confirmed draft into a request.
    ///
    /// A missing batch sends the editor back to `Editing` with the product
    /// named; no request is produced.
    pub fn confirm_summary(&mut self) -> CoreResult<Submission> {
        let action = match &self.phase {
            Phase::SummaryPending(summary) => summary.action,
            other => {
                let err = CoreError::transition(other.name(), "xác nhận");
                return self.fail(err);
            }
        };

        let stocktake_id = match &self.mode {
            EditorMode::Balance { stocktake_id } => Some(stocktake_id.clone()),
            _ => None,
        };

        match self.draft.to_request(action, stocktake_id) {
            Ok(request) => {
                self.phase = Phase::Persisting(action);
                Ok(Submission {
                    target: self.mode.submit_target(),
                    request,
                })
            }
            Err(e) => {
                warn!(error = %e, "Submission aborted before request");
                self.phase = Phase::Editing;
                self.fail(e)
            }
        }
    }

    /// The backend accepted the save: blank form, clean guard.
    pub fn persist_succeeded(&mut self) -> CoreResult<CommitReceipt> {
        let action = match self.phase {
            Phase::Persisting(action) => action,
            _ => return self.fail(CoreError::transition(self.phase.name(), "hoàn tất lưu")),
        };

        let receipt = CommitReceipt {
            message: self.mode.success_message(action).to_string(),
            status: action.target_status(),
        };
        info!(mode = ?self.mode, status = ?receipt.status, "Sale transaction persisted");

        self.reset_form();
        self.phase = Phase::Committed;
        Ok(receipt)
    }

    /// The backend rejected the save: back to editing, edits kept.
    pub fn persist_failed(&mut self, backend_message: Option<&str>) -> CoreResult<String> {
        if !matches!(self.phase, Phase::Persisting(_)) {
            return self.fail(CoreError::transition(self.phase.name(), "báo lỗi lưu"));
        }
        let message = backend_message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(SAVE_FAILED_FALLBACK)
            .to_string();

        warn!(%message, "Sale transaction save failed");
        self.phase = Phase::Editing;
        self.error = Some(message.clone());
        self.highlight = None;
        Ok(message)
    }

    /// Drops every edit since load.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if matches!(self.phase, Phase::Persisting(_)) {
            return self.fail(CoreError::transition(self.phase.name(), "hủy"));
        }
        self.draft = self.original.clone();
        self.guard.reconcile(&Snapshot::of(&self.draft));
        self.phase = Phase::Editing;
        self.clear_error();
        Ok(())
    }

    /// Starts a fresh create-mode form after a commit.
    pub fn begin_new(&mut self) -> CoreResult<()> {
        if matches!(self.phase, Phase::Persisting(_)) {
            return self.fail(CoreError::transition(self.phase.name(), "tạo phiếu mới"));
        }
        self.mode = EditorMode::Create;
        self.reset_form();
        self.phase = Phase::Editing;
        Ok(())
    }

    /// Loads a persisted transaction into edit mode.
    ///
    /// ## Errors
    /// [`CoreError::NotEditable`] unless the status is Draft or
    /// WaitingForApprove.
    pub fn hydrate(&mut self, tx: &SaleTransaction) -> CoreResult<()> {
        if matches!(self.phase, Phase::Persisting(_)) {
            return self.fail(CoreError::transition(self.phase.name(), "mở phiếu"));
        }
        if !tx.status.is_editable() {
            return self.fail(CoreError::NotEditable {
                code: tx.code.clone(),
                status: tx.status.label().to_string(),
            });
        }

        let draft = SaleDraft::from_transaction(tx);
        self.mode = EditorMode::Edit {
            transaction_id: tx.id.clone(),
        };
        self.guard.rebase(Snapshot::of(&draft));
        self.original = draft.clone();
        self.draft = draft;
        self.phase = Phase::Editing;
        self.clear_error();
        debug!(id = %tx.id, lines = self.draft.lines.len(), "Transaction hydrated");
        Ok(())
    }

    /// Fills the store of a store-restricted user.
    ///
    /// Only an empty store on an untouched form is filled, and the filled
    /// form becomes the new baseline. Returns whether the store was set.
    pub fn preselect_store(&mut self, store_id: &str) -> bool {
        if !matches!(self.phase, Phase::Editing)
            || self.draft.store_id.is_some()
            || self.guard.is_dirty()
        {
            return false;
        }
        self.draft.store_id = Some(store_id.to_string());
        self.original.store_id = Some(store_id.to_string());
        self.guard.rebase(Snapshot::of(&self.draft));
        debug!(store = %store_id, "Store preselected");
        true
    }

    /// Fills the transaction code from the backend sequence.
    ///
    /// Applies only while `Editing` and only over a code the user has not
    /// changed. The code joins the baseline, so cancel keeps it. Returns
    /// whether the code was set.
    pub fn apply_code(&mut self, code: &str) -> bool {
        if !matches!(self.phase, Phase::Editing) || self.draft.code != self.original.code {
            return false;
        }
        self.draft.code = Some(code.to_string());
        self.original.code = Some(code.to_string());
        debug!(%code, "Code applied");
        true
    }

    fn reset_form(&mut self) {
        let blank = SaleDraft::blank(self.today);
        self.guard.rebase(Snapshot::of(&blank));
        self.original = blank.clone();
        self.draft = blank;
        self.clear_error();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::line_item::tests::batch;
    use crate::types::DetailLine;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn directory() -> Directory {
        Directory::new(
            vec![Customer {
                id: "c-1".to_string(),
                name: "Cô Lan".to_string(),
                phone: None,
                address: None,
            }],
            vec![Store {
                id: "s-1".to_string(),
                name: "Kho Quận 1".to_string(),
                address: None,
            }],
        )
    }

    fn ready_editor() -> Editor {
        let mut editor = Editor::new(today());
        editor.set_directory(directory());
        editor
            .dispatch(EditorAction::SetCustomer(Some("c-1".to_string())))
            .unwrap();
        editor
            .dispatch(EditorAction::SetStore(Some("s-1".to_string())))
            .unwrap();
        editor
            .dispatch(EditorAction::SelectProduct {
                batch: batch("X", 50, 3_000),
                options: SelectOptions {
                    quantity: Some(10),
                    unit: None,
                },
            })
            .unwrap();
        editor
    }

    fn transaction(status: TransactionStatus) -> SaleTransaction {
        SaleTransaction {
            id: "tx-1".to_string(),
            code: "BH-0001".to_string(),
            customer_id: "c-1".to_string(),
            customer_name: None,
            store_id: "s-1".to_string(),
            store_name: None,
            sale_date: today(),
            note: "giao sáng".to_string(),
            paid_amount: Money::from_dong(0),
            total_amount: Money::from_dong(60_000),
            status,
            detail: vec![DetailLine {
                product_id: "p-1".to_string(),
                batch_id: "b-1".to_string(),
                product_name: "Trứng gà".to_string(),
                batch_code: Some("L01".to_string()),
                quantity: 20,
                unit: Unit::Qua,
                unit_sale_price: Money::from_dong(3_000),
                total: Money::from_dong(60_000),
                remain_quantity: Some(100),
                zone_real: vec![],
            }],
            created_at: None,
        }
    }

    #[test]
    fn test_empty_products_block_summary() {
        let mut editor = Editor::new(today());
        editor
            .dispatch(EditorAction::SetCustomer(Some("c-1".to_string())))
            .unwrap();
        editor
            .dispatch(EditorAction::SetStore(Some("s-1".to_string())))
            .unwrap();

        let err = editor
            .dispatch(EditorAction::ShowSummary(SummaryAction::Complete))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::Validation(ValidationError::required(FormField::Products))
        );
        assert_eq!(editor.error(), Some("Vui lòng chọn ít nhất một sản phẩm"));
        assert_eq!(editor.highlight(), Some(FormField::Products));
        assert_eq!(editor.phase(), &Phase::Editing);
    }

    #[test]
    fn test_rejected_edit_records_error_and_keeps_draft() {
        let mut editor = ready_editor();
        let before = editor.draft().clone();

        let err = editor
            .dispatch(EditorAction::ChangeQuantity {
                id: "X".to_string(),
                delta: 45,
            })
            .unwrap_err();
        assert!(err.to_string().contains("50"));
        assert!(editor.error().unwrap_or_default().contains("50"));
        assert!(editor.draft().lines.same_as(&before.lines));

        editor
            .dispatch(EditorAction::ChangeUnit {
                id: "X".to_string(),
                unit: Unit::Khay,
            })
            .unwrap();
        assert_eq!(editor.error(), None);
        assert_eq!(editor.draft().lines.as_slice()[0].quantity(), 1);
    }

    #[test]
    fn test_dirty_flag_edit_then_revert() {
        let mut editor = Editor::new(today());
        assert!(!editor.is_dirty());
        editor
            .dispatch(EditorAction::SetNote("gấp".to_string()))
            .unwrap();
        assert!(editor.is_dirty());
        editor.dispatch(EditorAction::SetNote(String::new())).unwrap();
        assert!(!editor.is_dirty());
    }

    #[test]
    fn test_full_create_flow() {
        let mut editor = ready_editor();
        let summary = editor.show_summary(SummaryAction::Complete).unwrap();
        assert_eq!(summary.total_amount.dong(), 30_000);

        // line edits are locked while the summary is open
        assert!(matches!(
            editor.dispatch(EditorAction::SetNote("x".to_string())),
            Err(CoreError::InvalidTransition { .. })
        ));

        let submission = editor.confirm_summary().unwrap();
        assert_eq!(submission.target, SubmitTarget::Save);
        assert_eq!(submission.request.status, TransactionStatus::Complete);
        assert_eq!(submission.request.detail[0].batch_id, "X");
        assert_eq!(submission.request.total_amount.dong(), 30_000);
        assert!(matches!(editor.phase(), Phase::Persisting(SummaryAction::Complete)));

        let receipt = editor.persist_succeeded().unwrap();
        assert_eq!(receipt.message, "Tạo phiếu bán hàng thành công");
        assert_eq!(editor.phase(), &Phase::Committed);
        assert!(editor.draft().lines.is_empty());
        assert_eq!(editor.draft().customer_id, None);
        assert!(!editor.is_dirty());

        editor.begin_new().unwrap();
        assert_eq!(editor.phase(), &Phase::Editing);
    }

    #[test]
    fn test_summary_carries_customer_and_store_records() {
        let mut editor = ready_editor();
        let summary = editor.show_summary(SummaryAction::Draft).unwrap();
        assert_eq!(summary.customer.name, "Cô Lan");
        assert_eq!(summary.store.name, "Kho Quận 1");
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.action, SummaryAction::Draft);
    }

    #[test]
    fn test_unknown_customer_or_store_blocks_summary() {
        let mut editor = ready_editor();
        editor
            .dispatch(EditorAction::SetCustomer(Some("c-gone".to_string())))
            .unwrap();
        let err = editor.show_summary(SummaryAction::Complete).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownReference {
                field: FormField::Customer,
                id: "c-gone".to_string()
            }
        );
        assert_eq!(editor.highlight(), Some(FormField::Customer));
        assert_eq!(editor.phase(), &Phase::Editing);

        editor
            .dispatch(EditorAction::SetCustomer(Some("c-1".to_string())))
            .unwrap();
        let customers = directory().customer("c-1").cloned().into_iter().collect();
        editor.set_directory(Directory::new(customers, vec![]));
        assert!(editor.show_summary(SummaryAction::Complete).is_err());
        assert_eq!(editor.highlight(), Some(FormField::Store));
    }

    #[test]
    fn test_missing_batch_aborts_before_request() {
        let mut editor = ready_editor();
        let mut no_batch = batch("N", 10, 1_000);
        no_batch.batch_id = None;
        no_batch.product_name = "Trứng cút".to_string();
        editor
            .dispatch(EditorAction::SelectProduct {
                batch: no_batch,
                options: SelectOptions::default(),
            })
            .unwrap();

        editor.show_summary(SummaryAction::Draft).unwrap();
        let effect = editor.dispatch(EditorAction::ConfirmSummary);
        assert_eq!(
            effect.unwrap_err(),
            CoreError::MissingBatch {
                product: "Trứng cút".to_string()
            }
        );
        assert_eq!(editor.phase(), &Phase::Editing);
        assert_eq!(editor.highlight(), Some(FormField::Products));
        assert_eq!(editor.draft().lines.len(), 2);
    }

    #[test]
    fn test_failed_save_keeps_edits() {
        let mut editor = ready_editor();
        editor.show_summary(SummaryAction::Draft).unwrap();
        editor.confirm_summary().unwrap();

        let msg = editor.persist_failed(Some("Lô hàng đã hết")).unwrap();
        assert_eq!(msg, "Lô hàng đã hết");
        assert_eq!(editor.phase(), &Phase::Editing);
        assert_eq!(editor.draft().lines.len(), 1);
        assert!(editor.is_dirty());

        editor.show_summary(SummaryAction::Draft).unwrap();
        editor.confirm_summary().unwrap();
        assert_eq!(editor.persist_failed(None).unwrap(), SAVE_FAILED_FALLBACK);
    }

    #[test]
    fn test_edit_mode_update_scenario() {
        let mut editor = Editor::new(today());
        editor.set_directory(directory());
        editor
            .hydrate(&transaction(TransactionStatus::WaitingForApprove))
            .unwrap();
        assert!(!editor.is_dirty());
        assert_eq!(editor.draft().lines.as_slice()[0].id(), "b-1");

        editor
            .dispatch(EditorAction::ChangeQuantity {
                id: "b-1".to_string(),
                delta: 5,
            })
            .unwrap();
        assert!(editor.is_dirty());

        editor.show_summary(SummaryAction::Complete).unwrap();
        let submission = editor.confirm_summary().unwrap();
        assert_eq!(
            submission.target,
            SubmitTarget::Update {
                transaction_id: "tx-1".to_string()
            }
        );
        assert_eq!(submission.request.code.as_deref(), Some("BH-0001"));

        let receipt = editor.persist_succeeded().unwrap();
        assert_eq!(receipt.message, "Cập nhật phiếu bán hàng thành công");
        assert!(!editor.is_dirty());
        assert!(editor.draft().lines.is_empty());
    }

    #[test]
    fn test_completed_transaction_is_not_editable() {
        let mut editor = Editor::new(today());
        let err = editor
            .hydrate(&transaction(TransactionStatus::Complete))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotEditable { .. }));
        assert_eq!(editor.mode(), &EditorMode::Create);
    }

    #[test]
    fn test_cancel_restores_loaded_state() {
        let mut editor = Editor::new(today());
        editor.hydrate(&transaction(TransactionStatus::Draft)).unwrap();
        editor
            .dispatch(EditorAction::DeleteLine {
                id: "b-1".to_string(),
            })
            .unwrap();
        assert!(editor.is_dirty());

        editor.dispatch(EditorAction::Cancel).unwrap();
        assert!(!editor.is_dirty());
        assert_eq!(editor.draft().lines.len(), 1);
    }

    #[test]
    fn test_balance_mode_submits_with_stocktake() {
        let lines = LineItems::new()
            .select_product(
                &batch("B", 40, 2_000),
                SelectOptions {
                    quantity: Some(4),
                    unit: None,
                },
            )
            .unwrap();
        let mut editor = Editor::for_balance("st-9", Some("s-1".to_string()), lines, today());
        editor.set_directory(directory());
        assert!(!editor.is_dirty());
        editor
            .dispatch(EditorAction::SetCustomer(Some("c-1".to_string())))
            .unwrap();

        editor.show_summary(SummaryAction::Complete).unwrap();
        let submission = editor.confirm_summary().unwrap();
        assert_eq!(submission.target, SubmitTarget::SaveFromBalance);
        assert_eq!(submission.request.stocktake_id.as_deref(), Some("st-9"));
        assert_eq!(
            editor.persist_succeeded().unwrap().message,
            "Cân bằng kho thành công"
        );
    }

    #[test]
    fn test_out_of_order_transitions_are_rejected() {
        let mut editor = Editor::new(today());
        assert!(editor.confirm_summary().is_err());
        assert!(editor.persist_succeeded().is_err());
        assert!(editor.persist_failed(None).is_err());
        assert!(editor.back_to_editing().is_err());
    }

    #[test]
    fn test_applied_code_survives_cancel() {
        let mut editor = ready_editor();
        assert!(editor.apply_code("PBH0009"));
        assert_eq!(editor.draft().code.as_deref(), Some("PBH0009"));

        editor.cancel().unwrap();
        assert_eq!(editor.draft().code.as_deref(), Some("PBH0009"));
        assert_eq!(editor.error(), None);
    }

    #[test]
    fn test_code_is_not_applied_outside_editing_or_over_user_code() {
        let mut editor = ready_editor();
        editor.show_summary(SummaryAction::Draft).unwrap();
        assert!(!editor.apply_code("PBH0009"));
        assert_eq!(editor.error(), None);
        assert_eq!(editor.draft().code, None);

        editor.back_to_editing().unwrap();
        editor
            .dispatch(EditorAction::SetCode(Some("TAY-01".to_string())))
            .unwrap();
        assert!(!editor.apply_code("PBH0009"));
        assert_eq!(editor.draft().code.as_deref(), Some("TAY-01"));
    }

    #[test]
    fn test_preselected_store_is_not_an_edit() {
        let mut editor = Editor::new(today());
        assert!(editor.preselect_store("s-2"));
        assert_eq!(editor.draft().store_id.as_deref(), Some("s-2"));
        assert!(!editor.is_dirty());

        // cancel keeps the preselection
        editor
            .dispatch(EditorAction::SetNote("ghi chú".to_string()))
            .unwrap();
        editor.cancel().unwrap();
        assert_eq!(editor.draft().store_id.as_deref(), Some("s-2"));

        // a chosen store is never overwritten
        assert!(!editor.preselect_store("s-3"));
        assert_eq!(editor.draft().store_id.as_deref(), Some("s-2"));
    }
}

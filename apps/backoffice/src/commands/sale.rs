//! # Sale Commands
//!
//! Editor actions and persistence of the sale transaction.
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dispatch(ConfirmSummary)                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Editor ── Effect::Submit { target, request } ── (lock released)        │
//! │         │                                                               │
//! │         ├── Save            → POST /sale-transactions/save              │
//! │         ├── Update { id }   → PUT  /sale-transactions/{id}              │
//! │         └── SaveFromBalance → POST /sale-transactions/save-from-balance │
//! │                  │                                                      │
//! │        ┌─────────┴──────────┐                                           │
//! │        ▼                    ▼                                           │
//! │   persist_succeeded    persist_failed(backend message)                  │
//! │   • success notice     • error notice                                   │
//! │   • message cached     • edits kept, phase Editing                      │
//! │   • blank clean form                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use kho_core::draft::{Editor, EditorAction, EditorMode, Effect, Phase, Submission, SubmitTarget};
use kho_core::notice::Notice;
use kho_core::ProductBatch;

use crate::error::{ApiError, ApiResult};
use crate::state::EditorView;
use crate::AppContext;

/// Current editor state.
pub fn get_editor(ctx: &AppContext) -> EditorView {
    ctx.editor().view()
}

/// Applies one editor action; a confirmed summary is sent to the backend.
pub async fn dispatch(ctx: &AppContext, action: EditorAction) -> ApiResult<EditorView> {
    debug!(?action, "dispatch command");

    let (effect, view) = ctx.editor().update(|e| e.dispatch(action))?;
    match effect {
        Effect::None => Ok(view),
        Effect::Submit(submission) => persist(ctx, submission).await,
    }
}

/// Sends a submission and settles the editor with the outcome.
pub(crate) async fn persist(ctx: &AppContext, submission: Submission) -> ApiResult<EditorView> {
    let Submission { target, request } = submission;
    let api = ctx.api();

    let sent = match &target {
        SubmitTarget::Save => api.save_transaction(&request).await,
        SubmitTarget::Update { transaction_id } => {
            api.update_transaction(transaction_id, &request).await
        }
        SubmitTarget::SaveFromBalance => api.save_from_balance(&request).await,
    };

    match sent {
        Ok(()) => {
            let (receipt, view) = ctx.editor().update(Editor::persist_succeeded)?;

            if let Err(e) = ctx
                .db()
                .local_state()
                .set_sale_success_message(&receipt.message)
                .await
            {
                warn!(error = %e, "Could not cache success message");
            }
            if let Some(stocktake_id) = &request.stocktake_id {
                match ctx.db().stocktake_drafts().discard(stocktake_id).await {
                    Ok(discarded) => debug!(%stocktake_id, discarded, "Count draft cleared"),
                    Err(e) => warn!(error = %e, %stocktake_id, "Could not clear count draft"),
                }
            }
            ctx.notices().success(receipt.message.clone());

            info!(
                ?target,
                status = ?receipt.status,
                lines = request.detail.len(),
                total = request.total_amount.dong(),
                "Sale transaction saved"
            );
            Ok(view)
        }
        Err(e) => {
            let (message, _) = ctx
                .editor()
                .update(|ed| ed.persist_failed(e.backend_message()))?;
            ctx.notices().error(message.clone());

            let mut err = ApiError::from(e);
            err.message = message;
            Err(err)
        }
    }
}

/// Opens a persisted transaction in edit mode.
pub async fn open_for_edit(ctx: &AppContext, transaction_id: &str) -> ApiResult<EditorView> {
    debug!(%transaction_id, "open_for_edit command");

    let tx = ctx.api().get_transaction(transaction_id).await?;
    let ((), view) = ctx.editor().update(|e| e.hydrate(&tx))?;

    info!(id = %tx.id, code = %tx.code, lines = tx.detail.len(), "Transaction opened for edit");
    Ok(view)
}

/// Fresh create-mode form, e.g. after a commit.
pub fn start_new(ctx: &AppContext) -> ApiResult<EditorView> {
    debug!("start_new command");
    let ((), view) = ctx.editor().update(Editor::begin_new)?;
    Ok(view)
}

/// Fills the code of a new transaction from the backend sequence.
///
/// Edit mode keeps the persisted code and makes no request; neither does
/// an editor outside `Editing`. A code that arrives after the editor moved
/// on is dropped.
pub async fn load_next_code(ctx: &AppContext) -> ApiResult<EditorView> {
    let (mode, editing) = ctx.editor().with_session(|s| {
        let editor = s.editor();
        (editor.mode().clone(), matches!(editor.phase(), Phase::Editing))
    });
    if !editing {
        return Ok(ctx.editor().view());
    }
    let code = match mode {
        EditorMode::Create => ctx.api().next_code().await?,
        EditorMode::Balance { .. } => ctx.api().next_code_balance().await?,
        EditorMode::Edit { .. } => return Ok(ctx.editor().view()),
    };

    let applied = ctx.editor().with_session_mut(|s| s.editor.apply_code(&code));
    debug!(%code, applied, "Next code loaded");
    Ok(ctx.editor().view())
}

/// Batches of a product for the selection dialog.
pub async fn product_batches(ctx: &AppContext, product_id: &str) -> ApiResult<Vec<ProductBatch>> {
    if product_id.trim().is_empty() {
        return Err(ApiError::validation("Vui lòng chọn sản phẩm"));
    }
    Ok(ctx.api().product_batches(product_id).await?)
}

/// The last success message, once; the list page shows it after a save.
pub async fn take_success_message(ctx: &AppContext) -> ApiResult<Option<String>> {
    Ok(ctx.db().local_state().take_sale_success_message().await?)
}

pub fn active_notices(ctx: &AppContext) -> Vec<Notice> {
    ctx.notices().active()
}

pub fn dismiss_notice(ctx: &AppContext, id: u64) -> bool {
    ctx.notices().dismiss(id)
}

//! # Stocktake Commands
//!
//! Counting, import-detail corrections and stock balance.
//!
//! ## Counting Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open_stocktake ── GET /stocktakes/{id} + local draft ──► StocktakeView │
//! │                                                                         │
//! │  record_count      ── local draft only (survives reloads)               │
//! │  set_line_checked  ── PATCH /import-details/{id}/is-check, then draft   │
//! │  correct_remain    ── PATCH /import-details/{id}/remain                 │
//! │                                                                         │
//! │  save_stocktake    ── POST /stocktakes | PUT /stocktakes/{id}           │
//! │                       then the local draft is dropped                   │
//! │                                                                         │
//! │  start_balance     ── shortfalls ──► Editor::for_balance                │
//! │                       code from next-code-balance                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use kho_core::draft::Editor;
use kho_core::stocktake::{Discrepancy, Stocktake, StocktakeDraft};
use kho_core::validation::validate_counted;
use kho_core::CoreError;

use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::EditorView;
use crate::AppContext;

/// A stocktake with the local counting draft applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StocktakeView {
    pub stocktake: Stocktake,
    pub discrepancies: Vec<Discrepancy>,
    pub has_local_draft: bool,
}

impl StocktakeView {
    fn new(stocktake: Stocktake, has_local_draft: bool) -> Self {
        StocktakeView {
            discrepancies: stocktake.discrepancies(),
            stocktake,
            has_local_draft,
        }
    }
}

pub async fn list_stocktakes(ctx: &AppContext) -> ApiResult<Vec<Stocktake>> {
    debug!("list_stocktakes command");
    Ok(ctx.api().list_stocktakes().await?)
}

pub async fn open_stocktake(ctx: &AppContext, stocktake_id: &str) -> ApiResult<StocktakeView> {
    debug!(%stocktake_id, "open_stocktake command");
    let (stocktake, has_local_draft) = load_with_draft(ctx, stocktake_id).await?;
    Ok(StocktakeView::new(stocktake, has_local_draft))
}

/// Fetches a stocktake and overlays the cached counts.
///
/// An unreadable cache is logged and ignored.
async fn load_with_draft(ctx: &AppContext, stocktake_id: &str) -> ApiResult<(Stocktake, bool)> {
    let mut stocktake = ctx.api().get_stocktake(stocktake_id).await?;

    let draft = match ctx.db().stocktake_drafts().load(stocktake_id).await {
        Ok(draft) => draft.filter(|d| !d.is_empty()),
        Err(e) => {
            warn!(error = %e, %stocktake_id, "Count draft unreadable, ignoring");
            None
        }
    };
    if let Some(draft) = &draft {
        stocktake.apply_draft(draft);
    }
    Ok((stocktake, draft.is_some()))
}

async fn current_draft(ctx: &AppContext, stocktake_id: &str) -> ApiResult<StocktakeDraft> {
    Ok(ctx
        .db()
        .stocktake_drafts()
        .load(stocktake_id)
        .await?
        .unwrap_or_else(|| StocktakeDraft::new(stocktake_id)))
}

/// Records a counted value locally.
pub async fn record_count(
    ctx: &AppContext,
    stocktake_id: &str,
    import_detail_id: &str,
    counted: i64,
) -> ApiResult<StocktakeDraft> {
    let mut draft = current_draft(ctx, stocktake_id).await?;
    draft.record_count(import_detail_id, counted)?;
    ctx.db().stocktake_drafts().save(&draft).await?;

    debug!(%stocktake_id, %import_detail_id, counted, "Count recorded");
    Ok(draft)
}

/// Marks an import line as checked on the backend, then in the draft.
pub async fn set_line_checked(
    ctx: &AppContext,
    stocktake_id: &str,
    import_detail_id: &str,
    checked: bool,
) -> ApiResult<StocktakeDraft> {
    ctx.api()
        .set_import_checked(import_detail_id, checked)
        .await?;

    let mut draft = current_draft(ctx, stocktake_id).await?;
    draft.mark_checked(import_detail_id, checked);
    ctx.db().stocktake_drafts().save(&draft).await?;
    Ok(draft)
}

/// Corrects the remaining quantity of an import line.
pub async fn correct_remain(ctx: &AppContext, import_detail_id: &str, remain: i64) -> ApiResult<()> {
    let remain = validate_counted(remain).map_err(CoreError::from)?;
    ctx.api()
        .update_import_remain(import_detail_id, remain)
        .await?;
    info!(%import_detail_id, remain, "Import remain corrected");
    Ok(())
}

/// Creates the stocktake when it has no id yet, updates it otherwise.
pub async fn save_stocktake(ctx: &AppContext, stocktake: &Stocktake) -> ApiResult<()> {
    if stocktake.store_id.trim().is_empty() {
        return Err(ApiError::validation("Vui lòng chọn cửa hàng"));
    }
    let request = stocktake.to_request();

    if stocktake.id.is_empty() {
        ctx.api().create_stocktake(&request).await?;
        info!(lines = request.lines.len(), "Stocktake created");
        return Ok(());
    }

    ctx.api().update_stocktake(&stocktake.id, &request).await?;
    if let Err(e) = ctx.db().stocktake_drafts().discard(&stocktake.id).await {
        warn!(error = %e, id = %stocktake.id, "Could not clear count draft");
    }
    info!(id = %stocktake.id, lines = request.lines.len(), "Stocktake updated");
    Ok(())
}

pub async fn discard_count_draft(ctx: &AppContext, stocktake_id: &str) -> ApiResult<bool> {
    Ok(ctx.db().stocktake_drafts().discard(stocktake_id).await?)
}

/// Opens the editor in balance mode, seeded with the shortfalls.
///
/// ## Errors
/// Business logic when nothing was counted short; the editor is untouched.
pub async fn start_balance(ctx: &AppContext, stocktake_id: &str) -> ApiResult<EditorView> {
    debug!(%stocktake_id, "start_balance command");

    let (stocktake, _) = load_with_draft(ctx, stocktake_id).await?;
    let lines = stocktake.balance_lines()?;
    if lines.is_empty() {
        return Err(ApiError::new(
            ErrorCode::BusinessLogic,
            "Phiếu kiểm kho không có sản phẩm thiếu để cân bằng",
        ));
    }

    let code = match ctx.api().next_code_balance().await {
        Ok(code) => Some(code),
        Err(e) => {
            warn!(error = %e, "Balance code unavailable, leaving it blank");
            None
        }
    };

    let store_id = Some(stocktake.store_id.clone()).filter(|s| !s.is_empty());
    let mut editor = Editor::for_balance(&stocktake.id, store_id, lines, crate::today());
    if let Some(code) = &code {
        editor.apply_code(code);
    }

    let view = ctx.editor().replace(editor)?;
    info!(
        %stocktake_id,
        lines = view.draft.lines.len(),
        total = view.total_amount.dong(),
        "Balance started"
    );
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kho_core::draft::{EditorAction, EditorMode};
    use kho_core::stocktake::{StocktakeLine, StocktakeStatus};
    use kho_core::Money;

    use crate::testing::{context, FakeApi};

    fn line(id: &str, system: i64, counted: Option<i64>) -> StocktakeLine {
        StocktakeLine {
            import_detail_id: id.to_string(),
            product_id: format!("p-{}", id),
            batch_id: Some(format!("b-{}", id)),
            product_name: format!("Trứng {}", id),
            batch_code: None,
            system_quantity: system,
            counted_quantity: counted,
            is_check: false,
            unit_sale_price: Money::from_dong(3_000),
            zone_real: vec![],
        }
    }

    fn stocktake() -> Stocktake {
        Stocktake {
            id: "st-1".to_string(),
            code: "KK0001".to_string(),
            store_id: "s-1".to_string(),
            store_name: None,
            status: StocktakeStatus::Draft,
            note: String::new(),
            created_at: None,
            lines: vec![line("d-1", 50, None), line("d-2", 30, Some(30))],
        }
    }

    fn api() -> FakeApi {
        FakeApi {
            stocktakes: vec![stocktake()],
            next_code: "CBK0001".to_string(),
            ..FakeApi::default()
        }
    }

    #[tokio::test]
    async fn test_local_counts_survive_reopen() {
        let (ctx, _) = context(api()).await;

        record_count(&ctx, "st-1", "d-1", 44).await.unwrap();
        let view = open_stocktake(&ctx, "st-1").await.unwrap();

        assert!(view.has_local_draft);
        assert_eq!(view.stocktake.lines[0].counted_quantity, Some(44));
        assert_eq!(view.discrepancies.len(), 1);
        assert_eq!(view.discrepancies[0].difference, -6);
    }

    #[tokio::test]
    async fn test_negative_count_is_rejected() {
        let (ctx, _) = context(api()).await;
        let err = record_count(&ctx, "st-1", "d-1", -1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!open_stocktake(&ctx, "st-1").await.unwrap().has_local_draft);
    }

    #[tokio::test]
    async fn test_check_patches_then_caches() {
        let (ctx, api) = context(api()).await;
        let draft = set_line_checked(&ctx, "st-1", "d-2", true).await.unwrap();
        assert!(draft.checked.contains("d-2"));
        assert_eq!(api.calls(), vec!["is-check d-2 true".to_string()]);

        correct_remain(&ctx, "d-2", 28).await.unwrap();
        assert!(correct_remain(&ctx, "d-2", -3).await.is_err());
        assert_eq!(api.calls().last().map(String::as_str), Some("remain d-2 28"));
    }

    #[tokio::test]
    async fn test_save_clears_local_draft() {
        let (ctx, api) = context(api()).await;
        record_count(&ctx, "st-1", "d-1", 44).await.unwrap();
        let view = open_stocktake(&ctx, "st-1").await.unwrap();

        save_stocktake(&ctx, &view.stocktake).await.unwrap();

        let sent = api.stocktake_requests.lock().unwrap().clone();
        assert_eq!(sent[0].lines[0].counted_quantity, Some(44));
        assert!(!open_stocktake(&ctx, "st-1").await.unwrap().has_local_draft);
    }

    #[tokio::test]
    async fn test_new_stocktake_is_created() {
        let (ctx, api) = context(api()).await;
        let mut fresh = stocktake();
        fresh.id = String::new();

        save_stocktake(&ctx, &fresh).await.unwrap();
        assert_eq!(api.calls(), vec!["create stocktake".to_string()]);
    }

    #[tokio::test]
    async fn test_balance_seeds_editor_with_shortfalls() {
        let (ctx, _) = context(api()).await;
        record_count(&ctx, "st-1", "d-1", 44).await.unwrap();

        let view = start_balance(&ctx, "st-1").await.unwrap();
        assert_eq!(
            view.mode,
            EditorMode::Balance {
                stocktake_id: "st-1".to_string()
            }
        );
        assert_eq!(view.draft.code.as_deref(), Some("CBK0001"));
        assert_eq!(view.draft.store_id.as_deref(), Some("s-1"));
        assert_eq!(view.draft.lines.len(), 1);
        assert_eq!(view.draft.lines.as_slice()[0].quantity(), 6);
        assert_eq!(view.total_amount, Money::from_dong(18_000));
        assert!(!view.dirty);

        ctx.editor()
            .update(|e| -> Result<(), CoreError> {
                e.dispatch(EditorAction::SetNote("bù hàng".to_string()))?;
                e.cancel()
            })
            .unwrap();
        assert_eq!(ctx.editor().view().draft.code.as_deref(), Some("CBK0001"));
    }

    #[tokio::test]
    async fn test_balance_without_shortfall_is_refused() {
        let (ctx, _) = context(api()).await;
        let err = start_balance(&ctx, "st-1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessLogic);
        assert_eq!(ctx.editor().view().mode, EditorMode::Create);
    }
}

//! # Navigation Commands
//!
//! The leave prompt shown while the form holds unsaved changes.
//!
//! ```text
//! host: back / tab close / link click
//!        │
//!        ▼
//!   intercept ──── clean ────► Proceed
//!        │
//!      dirty
//!        ▼
//!   Prompt { Discard | Stay | SaveDraftThenLeave }
//!        │
//!   resolve_leave
//!        ├── Discard            → cancel edits, Navigate
//!        ├── Stay               → Stay
//!        └── SaveDraftThenLeave → summary(Draft) → save
//!                                   ok  → Navigate
//!                                   err → Stay { error }
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use kho_core::draft::{Phase, Submission};
use kho_core::guard::{GuardDecision, LeaveChoice, NavigationAttempt, Resolution};
use kho_core::{CoreResult, SummaryAction};

use super::sale::persist;
use crate::error::{ApiError, ApiResult};
use crate::AppContext;

/// What the host does once the prompt is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum LeaveOutcome {
    /// Perform the original navigation.
    Navigate { attempt: NavigationAttempt },
    /// Keep the user on the form.
    Stay {
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

/// Asks the guard whether an attempt to leave may go ahead.
pub fn intercept(ctx: &AppContext, attempt: NavigationAttempt) -> GuardDecision {
    let decision = ctx
        .editor()
        .with_session_mut(|s| s.navigation.intercept(attempt));
    debug!(?decision, "Navigation intercepted");
    decision
}

/// Answers the open leave prompt.
///
/// ## Errors
/// Validation when no prompt is open.
pub async fn resolve_leave(ctx: &AppContext, choice: LeaveChoice) -> ApiResult<LeaveOutcome> {
    debug!(?choice, "resolve_leave command");

    let resolution = ctx.editor().with_session_mut(|s| {
        let resolution = s.navigation.resolve(choice);
        if let Some(Resolution::Leave(_)) = &resolution {
            // Dropped edits must not re-arm the guard on sync.
            if let Err(e) = s.editor.cancel() {
                warn!(error = %e, "Could not drop edits before leaving");
            }
        }
        resolution
    });

    match resolution {
        None => Err(ApiError::validation("Không có yêu cầu rời trang nào đang chờ")),
        Some(Resolution::Stay) => Ok(LeaveOutcome::Stay { error: None }),
        Some(Resolution::Leave(attempt)) => {
            info!(?attempt, "Leaving without saving");
            Ok(LeaveOutcome::Navigate { attempt })
        }
        Some(Resolution::SaveDraft(attempt)) => save_draft_then_leave(ctx, attempt).await,
    }
}

async fn save_draft_then_leave(
    ctx: &AppContext,
    attempt: NavigationAttempt,
) -> ApiResult<LeaveOutcome> {
    let submission = ctx.editor().with_session_mut(|s| -> CoreResult<Submission> {
        if matches!(s.editor.phase(), Phase::SummaryPending(_)) {
            s.editor.back_to_editing()?;
        }
        s.editor.show_summary(SummaryAction::Draft)?;
        s.editor.confirm_summary()
    });

    let submission = match submission {
        Ok(submission) => submission,
        Err(e) => {
            debug!(error = %e, "Draft cannot be saved, staying");
            return Ok(LeaveOutcome::Stay {
                error: Some(e.to_string()),
            });
        }
    };

    match persist(ctx, submission).await {
        Ok(_) => {
            info!(?attempt, "Draft saved, leaving");
            Ok(LeaveOutcome::Navigate { attempt })
        }
        Err(e) => Ok(LeaveOutcome::Stay {
            error: Some(e.message),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{dispatch, get_editor};
    use crate::testing::{context, directory, FakeApi};
    use kho_core::draft::EditorAction;
    use kho_core::line_item::SelectOptions;
    use kho_core::{FormField, Money, ProductBatch, TransactionStatus};

    fn batch() -> ProductBatch {
        ProductBatch {
            product_id: "p-1".to_string(),
            batch_id: Some("b-1".to_string()),
            product_name: "Trứng vịt".to_string(),
            batch_code: Some("L02".to_string()),
            unit_sale_price: Money::from_dong(4_000),
            remain_quantity: 60,
            expiry_date: None,
            zone_real: vec![],
        }
    }

    async fn complete_form(ctx: &AppContext) {
        ctx.editor().set_directory(directory());
        for action in [
            EditorAction::SetCustomer(Some("c-1".to_string())),
            EditorAction::SetStore(Some("s-1".to_string())),
            EditorAction::SelectProduct {
                batch: batch(),
                options: SelectOptions::default(),
            },
        ] {
            dispatch(ctx, action).await.unwrap();
        }
    }

    fn back() -> NavigationAttempt {
        NavigationAttempt::Back
    }

    #[tokio::test]
    async fn test_clean_form_proceeds() {
        let (ctx, _) = context(FakeApi::default()).await;
        assert_eq!(intercept(&ctx, back()), GuardDecision::Proceed);
    }

    #[tokio::test]
    async fn test_discard_drops_edits_and_leaves() {
        let (ctx, api) = context(FakeApi::default()).await;
        complete_form(&ctx).await;

        let decision = intercept(&ctx, back());
        assert!(matches!(decision, GuardDecision::Prompt { .. }));

        let outcome = resolve_leave(&ctx, LeaveChoice::Discard).await.unwrap();
        assert_eq!(outcome, LeaveOutcome::Navigate { attempt: back() });

        let view = get_editor(&ctx);
        assert!(!view.dirty);
        assert!(!view.interceptors_installed);
        assert!(view.draft.lines.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stay_keeps_prompting() {
        let (ctx, _) = context(FakeApi::default()).await;
        complete_form(&ctx).await;

        intercept(&ctx, NavigationAttempt::TabClose);
        let outcome = resolve_leave(&ctx, LeaveChoice::Stay).await.unwrap();
        assert_eq!(outcome, LeaveOutcome::Stay { error: None });
        assert!(get_editor(&ctx).dirty);

        assert!(matches!(
            intercept(&ctx, back()),
            GuardDecision::Prompt { .. }
        ));
    }

    #[tokio::test]
    async fn test_save_draft_then_leave() {
        let (ctx, api) = context(FakeApi::default()).await;
        complete_form(&ctx).await;
        let link = NavigationAttempt::LinkClick {
            href: "/sale-transactions".to_string(),
        };

        intercept(&ctx, link.clone());
        let outcome = resolve_leave(&ctx, LeaveChoice::SaveDraftThenLeave)
            .await
            .unwrap();

        assert_eq!(outcome, LeaveOutcome::Navigate { attempt: link });
        let saved = api.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].status, TransactionStatus::Draft);
        assert!(!get_editor(&ctx).dirty);
    }

    #[tokio::test]
    async fn test_incomplete_draft_stays_with_reason() {
        let (ctx, api) = context(FakeApi::default()).await;
        dispatch(&ctx, EditorAction::SetNote("gọi trước".to_string()))
            .await
            .unwrap();

        intercept(&ctx, back());
        let outcome = resolve_leave(&ctx, LeaveChoice::SaveDraftThenLeave)
            .await
            .unwrap();

        assert!(matches!(outcome, LeaveOutcome::Stay { error: Some(_) }));
        let view = get_editor(&ctx);
        assert!(view.dirty);
        assert_eq!(view.highlight, Some(FormField::Customer));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_draft_stays_with_backend_message() {
        let (ctx, _) = context(FakeApi {
            save_rejection: Some("Khách hàng đã bị khóa".to_string()),
            ..FakeApi::default()
        })
        .await;
        complete_form(&ctx).await;

        intercept(&ctx, back());
        let outcome = resolve_leave(&ctx, LeaveChoice::SaveDraftThenLeave)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            LeaveOutcome::Stay {
                error: Some("Khách hàng đã bị khóa".to_string())
            }
        );
        assert!(get_editor(&ctx).dirty);
    }

    #[tokio::test]
    async fn test_resolve_without_prompt_is_rejected() {
        let (ctx, _) = context(FakeApi::default()).await;
        assert!(resolve_leave(&ctx, LeaveChoice::Stay).await.is_err());
    }
}

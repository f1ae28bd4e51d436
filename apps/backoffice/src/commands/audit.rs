//! # Audit Commands
//!
//! Read-only access to the change-status log.
//!
//! The filter is sent to the backend, which may or may not honor it; the
//! response is narrowed again and paged here so both cases look the same.

use tracing::debug;

use kho_core::audit::{timeline, ChangeLogFilter, ChangeStatusLog, ModelHistoryQuery};
use kho_core::listing::{paginate, Page};
use kho_core::validation::validate_paging;
use kho_core::CoreError;

use crate::error::{ApiError, ApiResult};
use crate::AppContext;

pub async fn list_change_logs(
    ctx: &AppContext,
    filter: &ChangeLogFilter,
) -> ApiResult<Page<ChangeStatusLog>> {
    debug!(?filter, "list_change_logs command");
    validate_paging(filter.page, filter.size).map_err(CoreError::from)?;

    let logs = ctx.api().list_change_logs(filter).await?;
    let mut matching: Vec<_> = logs.into_iter().filter(|l| filter.matches(l)).collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(paginate(&matching, filter.page, filter.size).map_err(CoreError::from)?)
}

pub async fn get_change_log(ctx: &AppContext, id: &str) -> ApiResult<ChangeStatusLog> {
    Ok(ctx.api().get_change_log(id).await?)
}

/// Route of the record a log entry describes.
pub async fn change_log_source(ctx: &AppContext, id: &str) -> ApiResult<String> {
    ctx.api()
        .change_log_source(id)
        .await?
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::not_found("nguồn nhật ký", id))
}

/// Status history of one record, oldest first.
pub async fn model_history(
    ctx: &AppContext,
    query: &ModelHistoryQuery,
) -> ApiResult<Vec<ChangeStatusLog>> {
    if query.model_name.trim().is_empty() || query.model_id.trim().is_empty() {
        return Err(ApiError::validation("Thiếu loại hoặc mã bản ghi"));
    }
    let logs = ctx.api().change_logs_by_model(query).await?;
    Ok(timeline(logs))
}

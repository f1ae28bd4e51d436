//! # Transaction List Commands

use tracing::debug;

use kho_core::listing::{paginate, Page, TransactionFilter};
use kho_core::validation::validate_paging;
use kho_core::{CoreError, SaleTransaction};

use crate::error::ApiResult;
use crate::AppContext;

/// One page of the sale-transaction list, newest first.
///
/// The backend returns every transaction; filtering and paging are local.
pub async fn list_transactions(
    ctx: &AppContext,
    filter: &TransactionFilter,
    page: usize,
    size: usize,
) -> ApiResult<Page<SaleTransaction>> {
    debug!(?filter, page, size, "list_transactions command");

    validate_paging(page, size).map_err(CoreError::from)?;
    let all = ctx.api().list_transactions().await?;
    let matching = filter.apply(&all);
    Ok(paginate(&matching, page, size).map_err(CoreError::from)?)
}

pub async fn get_transaction(ctx: &AppContext, id: &str) -> ApiResult<SaleTransaction> {
    Ok(ctx.api().get_transaction(id).await?)
}

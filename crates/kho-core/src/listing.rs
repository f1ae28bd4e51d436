//! # List Screens
//!
//! Client-side filtering and paging for the sale-transaction list and the
//! audit log. The backend returns whole lists; narrowing happens here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{SaleTransaction, TransactionStatus};
use crate::validation::{validate_paging, ValidationResult};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub size: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Cuts page `page` (1-based) of `size` rows out of `items`.
///
/// Pages past the end are empty, not an error.
pub fn paginate<T: Clone>(items: &[T], page: usize, size: usize) -> ValidationResult<Page<T>> {
    validate_paging(page, size)?;
    let start = (page - 1).saturating_mul(size);
    let slice = items.iter().skip(start).take(size).cloned().collect();
    Ok(Page {
        items: slice,
        page,
        size,
        total: items.len(),
    })
}

/// Case-insensitive substring match; a blank needle matches everything.
pub fn matches_keyword(keyword: &str, haystacks: &[&str]) -> bool {
    let needle = keyword.trim().to_lowercase();
    needle.is_empty() || haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
}

/// Filter of the sale-transaction list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    /// Matches code or customer name.
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub to: Option<NaiveDate>,
}

impl TransactionFilter {
    pub fn matches(&self, tx: &SaleTransaction) -> bool {
        if self.status.is_some_and(|s| s != tx.status) {
            return false;
        }
        if self.from.is_some_and(|from| tx.sale_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.sale_date > to) {
            return false;
        }
        let customer = tx.customer_name.as_deref().unwrap_or_default();
        matches_keyword(&self.keyword, &[&tx.code, customer])
    }

    /// Filters, newest sale date first.
    pub fn apply(&self, txs: &[SaleTransaction]) -> Vec<SaleTransaction> {
        let mut out: Vec<_> = txs.iter().filter(|tx| self.matches(tx)).cloned().collect();
        out.sort_by(|a, b| b.sale_date.cmp(&a.sale_date).then_with(|| b.code.cmp(&a.code)));
        out
    }
}

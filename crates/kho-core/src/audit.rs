//! # Change-Status Audit Log
//!
//! Read-only history of status changes across models (sale transactions,
//! stocktakes, imports). Each entry can point back to the screen of the
//! record it describes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::listing::{matches_keyword, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatusLog {
    pub id: String,
    pub model_name: String,
    pub model_id: String,
    #[serde(default)]
    pub previous_status: Option<String>,
    pub next_status: String,
    #[serde(default)]
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Frontend route of the record, when the backend knows it.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Body of `POST /change-statuslog/list-all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub keyword: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub to: Option<NaiveDate>,
    pub page: usize,
    pub size: usize,
}

impl Default for ChangeLogFilter {
    fn default() -> Self {
        ChangeLogFilter {
            model_name: None,
            status: None,
            keyword: String::new(),
            from: None,
            to: None,
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ChangeLogFilter {
    /// Same narrowing as the backend, for lists already in memory.
    pub fn matches(&self, log: &ChangeStatusLog) -> bool {
        if self
            .model_name
            .as_deref()
            .is_some_and(|m| !m.eq_ignore_ascii_case(&log.model_name))
        {
            return false;
        }
        if self
            .status
            .as_deref()
            .is_some_and(|s| !s.eq_ignore_ascii_case(&log.next_status))
        {
            return false;
        }
        let day = log.created_at.date_naive();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }
        matches_keyword(&self.keyword, &[&log.description, &log.model_id])
    }
}

/// Body of `POST /change-statuslog/by-model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ModelHistoryQuery {
    pub model_name: String,
    pub model_id: String,
}

/// Entries oldest first, as a status timeline.
pub fn timeline(mut logs: Vec<ChangeStatusLog>) -> Vec<ChangeStatusLog> {
    logs.sort_by_key(|l| l.created_at);
    logs
}

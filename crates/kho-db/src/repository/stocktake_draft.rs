//! # Stocktake Draft Repository
//!
//! Counting in progress is written after every change so a reload or crash
//! does not lose it. Entries live in `local_state` under
//! `stocktake_draft_<id>`.

use tracing::{debug, warn};

use kho_core::stocktake::StocktakeDraft;
use kho_core::stocktake_draft_key;

use crate::error::{DbError, DbResult};
use crate::repository::local_state::LocalStateRepository;

const KEY_PREFIX: &str = "stocktake_draft_";

#[derive(Debug, Clone)]
pub struct StocktakeDraftRepository {
    state: LocalStateRepository,
}

impl StocktakeDraftRepository {
    pub fn new(state: LocalStateRepository) -> Self {
        StocktakeDraftRepository { state }
    }

    /// Loads the cached draft of a stocktake.
    ///
    /// An unreadable entry is dropped and reported as absent.
    pub async fn load(&self, stocktake_id: &str) -> DbResult<Option<StocktakeDraft>> {
        let key = stocktake_draft_key(stocktake_id);
        match self.state.get_json::<StocktakeDraft>(&key).await {
            Ok(draft) => Ok(draft),
            Err(DbError::InvalidValue { message, .. }) => {
                warn!(%key, %message, "Discarding unreadable stocktake draft");
                self.state.remove(&key).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Saves a draft; an empty one removes the entry.
    pub async fn save(&self, draft: &StocktakeDraft) -> DbResult<()> {
        let key = stocktake_draft_key(&draft.stocktake_id);
        if draft.is_empty() {
            self.state.remove(&key).await?;
            return Ok(());
        }
        debug!(%key, counted = draft.counted.len(), "Caching stocktake draft");
        self.state.set_json(&key, draft).await
    }

    pub async fn discard(&self, stocktake_id: &str) -> DbResult<bool> {
        self.state.remove(&stocktake_draft_key(stocktake_id)).await
    }

    /// Ids of every stocktake with a cached draft.
    pub async fn list_ids(&self) -> DbResult<Vec<String>> {
        let keys = self.state.keys_with_prefix(KEY_PREFIX).await?;
        Ok(keys
            .into_iter()
            .filter_map(|k| k.strip_prefix(KEY_PREFIX).map(str::to_string))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use kho_core::stocktake::StocktakeDraft;

    #[tokio::test]
    async fn test_save_load_discard() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stocktake_drafts();

        let mut draft = StocktakeDraft::new("st-1");
        draft.record_count("imp-1", 44).unwrap();
        repo.save(&draft).await.unwrap();

        assert_eq!(repo.load("st-1").await.unwrap(), Some(draft));
        assert_eq!(repo.list_ids().await.unwrap(), vec!["st-1"]);

        assert!(repo.discard("st-1").await.unwrap());
        assert_eq!(repo.load("st-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_draft_clears_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stocktake_drafts();

        let mut draft = StocktakeDraft::new("st-2");
        draft.mark_checked("imp-1", true);
        repo.save(&draft).await.unwrap();
        draft.mark_checked("imp-1", false);
        repo.save(&draft).await.unwrap();

        assert!(repo.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_dropped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.local_state()
            .set("stocktake_draft_st-3", "[oops")
            .await
            .unwrap();

        assert_eq!(db.stocktake_drafts().load("st-3").await.unwrap(), None);
        assert_eq!(db.local_state().get("stocktake_draft_st-3").await.unwrap(), None);
    }
}

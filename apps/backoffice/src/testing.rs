//! In-memory backend and context for command tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use kho_client::{BackofficeApi, ClientError, ClientResult};
use kho_core::audit::{ChangeLogFilter, ChangeStatusLog, ModelHistoryQuery};
use kho_core::form_data::{CreateFormData, Directory};
use kho_core::stocktake::{Stocktake, StocktakeRequest};
use kho_core::{
    Category, Customer, ProductBatch, SaleTransaction, SaveTransactionRequest, Store, UserProfile,
    Zone,
};
use kho_db::{Database, DbConfig};

use crate::config::AppConfig;
use crate::AppContext;

/// Canned responses plus a log of the calls made.
#[derive(Default)]
pub struct FakeApi {
    pub form_data: CreateFormData,
    pub form_data_down: bool,
    pub categories: Vec<Category>,
    pub zones: Vec<Zone>,
    /// `None` answers `/users/me` with 401.
    pub user: Option<UserProfile>,
    pub transactions: Vec<SaleTransaction>,
    pub batches: Vec<ProductBatch>,
    pub stocktakes: Vec<Stocktake>,
    pub logs: Vec<ChangeStatusLog>,
    pub source_url: Option<String>,
    /// Backend message returned by every save, update and balance call.
    pub save_rejection: Option<String>,
    pub next_code: String,
    pub calls: Mutex<Vec<String>>,
    pub saved: Mutex<Vec<SaveTransactionRequest>>,
    pub stocktake_requests: Mutex<Vec<StocktakeRequest>>,
}

impl FakeApi {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn saved(&self) -> Vec<SaveTransactionRequest> {
        self.saved.lock().unwrap().clone()
    }

    fn save(&self, call: String, request: &SaveTransactionRequest) -> ClientResult<()> {
        self.record(call);
        match &self.save_rejection {
            Some(message) => Err(ClientError::Validation(message.clone())),
            None => {
                self.saved.lock().unwrap().push(request.clone());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl BackofficeApi for FakeApi {
    async fn create_form_data(&self) -> ClientResult<CreateFormData> {
        self.record("create-form-data");
        if self.form_data_down {
            return Err(ClientError::Server {
                status: 503,
                message: "Hệ thống đang bảo trì".to_string(),
            });
        }
        Ok(self.form_data.clone())
    }

    async fn list_transactions(&self) -> ClientResult<Vec<SaleTransaction>> {
        self.record("list-all");
        Ok(self.transactions.clone())
    }

    async fn get_transaction(&self, id: &str) -> ClientResult<SaleTransaction> {
        self.record(format!("get {}", id));
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(String::new()))
    }

    async fn save_transaction(&self, request: &SaveTransactionRequest) -> ClientResult<()> {
        self.save("save".to_string(), request)
    }

    async fn save_from_balance(&self, request: &SaveTransactionRequest) -> ClientResult<()> {
        self.save("save-from-balance".to_string(), request)
    }

    async fn update_transaction(
        &self,
        id: &str,
        request: &SaveTransactionRequest,
    ) -> ClientResult<()> {
        self.save(format!("update {}", id), request)
    }

    async fn next_code(&self) -> ClientResult<String> {
        self.record("next-code");
        Ok(self.next_code.clone())
    }

    async fn next_code_balance(&self) -> ClientResult<String> {
        self.record("next-code-balance");
        Ok(self.next_code.clone())
    }

    async fn product_batches(&self, product_id: &str) -> ClientResult<Vec<ProductBatch>> {
        self.record(format!("product-response {}", product_id));
        Ok(self
            .batches
            .iter()
            .filter(|b| b.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn zones(&self) -> ClientResult<Vec<Zone>> {
        self.record("zones");
        Ok(self.zones.clone())
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.record("categories");
        Ok(self.categories.clone())
    }

    async fn current_user(&self) -> ClientResult<UserProfile> {
        self.record("users/me");
        self.user.clone().ok_or(ClientError::Unauthorized)
    }

    async fn list_stocktakes(&self) -> ClientResult<Vec<Stocktake>> {
        self.record("stocktakes");
        Ok(self.stocktakes.clone())
    }

    async fn get_stocktake(&self, id: &str) -> ClientResult<Stocktake> {
        self.record(format!("stocktake {}", id));
        self.stocktakes
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(String::new()))
    }

    async fn create_stocktake(&self, request: &StocktakeRequest) -> ClientResult<()> {
        self.record("create stocktake");
        self.stocktake_requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn update_stocktake(&self, id: &str, request: &StocktakeRequest) -> ClientResult<()> {
        self.record(format!("update stocktake {}", id));
        self.stocktake_requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn update_import_remain(&self, import_detail_id: &str, remain: i64) -> ClientResult<()> {
        self.record(format!("remain {} {}", import_detail_id, remain));
        Ok(())
    }

    async fn set_import_checked(&self, import_detail_id: &str, checked: bool) -> ClientResult<()> {
        self.record(format!("is-check {} {}", import_detail_id, checked));
        Ok(())
    }

    async fn list_change_logs(&self, _filter: &ChangeLogFilter) -> ClientResult<Vec<ChangeStatusLog>> {
        self.record("change-statuslog/list-all");
        Ok(self.logs.clone())
    }

    async fn get_change_log(&self, id: &str) -> ClientResult<ChangeStatusLog> {
        self.record(format!("change-statuslog {}", id));
        self.logs
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(String::new()))
    }

    async fn change_log_source(&self, id: &str) -> ClientResult<Option<String>> {
        self.record(format!("change-statuslog source {}", id));
        Ok(self.source_url.clone())
    }

    async fn change_logs_by_model(
        &self,
        query: &ModelHistoryQuery,
    ) -> ClientResult<Vec<ChangeStatusLog>> {
        self.record("change-statuslog/by-model");
        Ok(self
            .logs
            .iter()
            .filter(|l| l.model_name == query.model_name && l.model_id == query.model_id)
            .cloned()
            .collect())
    }
}

/// Customer `c-1` and store `s-1`, as a loaded form holds them.
pub fn directory() -> Directory {
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

/// A context over `api` and a fresh in-memory local store.
pub async fn context(api: FakeApi) -> (AppContext, Arc<FakeApi>) {
    let api = Arc::new(api);
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let ctx = AppContext::new(AppConfig::default(), api.clone(), db);
    (ctx, api)
}

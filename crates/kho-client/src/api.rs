//! # Backend API
//!
//! [`BackofficeApi`] is the seam between the app layer and the network:
//! commands depend on the trait, production wires [`RestClient`], tests wire
//! an in-memory fake.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │ Sale transactions                                                        │
//! │   GET  /sale-transactions/create-form-data     customers, stores, products│
//! │   GET  /sale-transactions/list-all             list                      │
//! │   GET  /sale-transactions/{id}                 one                       │
//! │   POST /sale-transactions/save                 create                    │
//! │   POST /sale-transactions/save-from-balance    create from stocktake     │
//! │   PUT  /sale-transactions/{id}                 update                    │
//! │   GET  /sale-transactions/next-code[-balance]  next code                 │
//! │   GET  /sale-transactions/product-response/{productId}   batches         │
//! │ Reference data                                                           │
//! │   GET  /zones   GET /categories   GET /users/me                          │
//! │ Stocktakes                                                               │
//! │   GET/POST /stocktakes   GET/PUT /stocktakes/{id}                        │
//! │   PATCH /import-details/{id}/remain   PATCH /import-details/{id}/is-check│
//! │ Audit log                                                                │
//! │   POST /change-statuslog/list-all   POST /change-statuslog/by-model      │
//! │   GET  /change-statuslog/{id}       GET  /change-statuslog/{id}/source   │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No call is retried. A failure surfaces once, as a [`ClientError`](crate::ClientError).

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use kho_core::audit::{ChangeLogFilter, ChangeStatusLog, ModelHistoryQuery};
use kho_core::form_data::CreateFormData;
use kho_core::stocktake::{Stocktake, StocktakeRequest};
use kho_core::{Category, ProductBatch, SaleTransaction, SaveTransactionRequest, UserProfile, Zone};

use crate::dto;
use crate::http::HttpClient;
use crate::{ClientConfig, ClientResult};

/// Every backend call the back-office makes.
#[async_trait]
pub trait BackofficeApi: Send + Sync {
    // Sale transactions
    async fn create_form_data(&self) -> ClientResult<CreateFormData>;
    async fn list_transactions(&self) -> ClientResult<Vec<SaleTransaction>>;
    async fn get_transaction(&self, id: &str) -> ClientResult<SaleTransaction>;
    async fn save_transaction(&self, request: &SaveTransactionRequest) -> ClientResult<()>;
    async fn save_from_balance(&self, request: &SaveTransactionRequest) -> ClientResult<()>;
    async fn update_transaction(&self, id: &str, request: &SaveTransactionRequest)
        -> ClientResult<()>;
    async fn next_code(&self) -> ClientResult<String>;
    async fn next_code_balance(&self) -> ClientResult<String>;
    async fn product_batches(&self, product_id: &str) -> ClientResult<Vec<ProductBatch>>;

    // Reference data
    async fn zones(&self) -> ClientResult<Vec<Zone>>;
    async fn categories(&self) -> ClientResult<Vec<Category>>;
    async fn current_user(&self) -> ClientResult<UserProfile>;

    // Stocktakes
    async fn list_stocktakes(&self) -> ClientResult<Vec<Stocktake>>;
    async fn get_stocktake(&self, id: &str) -> ClientResult<Stocktake>;
    async fn create_stocktake(&self, request: &StocktakeRequest) -> ClientResult<()>;
    async fn update_stocktake(&self, id: &str, request: &StocktakeRequest) -> ClientResult<()>;
    async fn update_import_remain(&self, import_detail_id: &str, remain: i64) -> ClientResult<()>;
    async fn set_import_checked(&self, import_detail_id: &str, checked: bool)
        -> ClientResult<()>;

    // Audit log
    async fn list_change_logs(&self, filter: &ChangeLogFilter)
        -> ClientResult<Vec<ChangeStatusLog>>;
    async fn get_change_log(&self, id: &str) -> ClientResult<ChangeStatusLog>;
    async fn change_log_source(&self, id: &str) -> ClientResult<Option<String>>;
    async fn change_logs_by_model(
        &self,
        query: &ModelHistoryQuery,
    ) -> ClientResult<Vec<ChangeStatusLog>>;
}

// =============================================================================
// REST implementation
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemainBody {
    remain_quantity: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IsCheckBody {
    is_check: bool,
}

/// [`BackofficeApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: HttpClient,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait]
impl BackofficeApi for RestClient {
    async fn create_form_data(&self) -> ClientResult<CreateFormData> {
        let value: Value = self.http.get("sale-transactions/create-form-data").await?;
        Ok(CreateFormData {
            customers: dto::decode_list(value.get("customers").unwrap_or(&Value::Null))?,
            stores: dto::decode_list(value.get("stores").unwrap_or(&Value::Null))?,
            products: dto::decode_list(value.get("products").unwrap_or(&Value::Null))?,
        })
    }

    async fn list_transactions(&self) -> ClientResult<Vec<SaleTransaction>> {
        let value: Value = self.http.get("sale-transactions/list-all").await?;
        dto::normalize_transactions(&value)
    }

    async fn get_transaction(&self, id: &str) -> ClientResult<SaleTransaction> {
        let value: Value = self.http.get(&format!("sale-transactions/{}", id)).await?;
        dto::normalize_transaction(&value)
    }

    async fn save_transaction(&self, request: &SaveTransactionRequest) -> ClientResult<()> {
        info!(lines = request.detail.len(), status = ?request.status, "Saving sale transaction");
        self.http
            .execute(Method::POST, "sale-transactions/save", request)
            .await
    }

    async fn save_from_balance(&self, request: &SaveTransactionRequest) -> ClientResult<()> {
        info!(stocktake = ?request.stocktake_id, "Saving balance transaction");
        self.http
            .execute(Method::POST, "sale-transactions/save-from-balance", request)
            .await
    }

    async fn update_transaction(
        &self,
        id: &str,
        request: &SaveTransactionRequest,
    ) -> ClientResult<()> {
        info!(%id, status = ?request.status, "Updating sale transaction");
        self.http
            .execute(Method::PUT, &format!("sale-transactions/{}", id), request)
            .await
    }

    async fn next_code(&self) -> ClientResult<String> {
        let value: Value = self.http.get("sale-transactions/next-code").await?;
        dto::normalize_code(&value)
    }

    async fn next_code_balance(&self) -> ClientResult<String> {
        let value: Value = self.http.get("sale-transactions/next-code-balance").await?;
        dto::normalize_code(&value)
    }

    async fn product_batches(&self, product_id: &str) -> ClientResult<Vec<ProductBatch>> {
        let value: Value = self
            .http
            .get(&format!("sale-transactions/product-response/{}", product_id))
            .await?;
        dto::normalize_batches(&value, Some(product_id))
    }

    async fn zones(&self) -> ClientResult<Vec<Zone>> {
        let value: Value = self.http.get("zones").await?;
        dto::decode_list(&value)
    }

    async fn categories(&self) -> ClientResult<Vec<Category>> {
        let value: Value = self.http.get("categories").await?;
        dto::decode_list(&value)
    }

    async fn current_user(&self) -> ClientResult<UserProfile> {
        let value: Value = self.http.get("users/me").await?;
        dto::normalize_user(&value)
    }

    async fn list_stocktakes(&self) -> ClientResult<Vec<Stocktake>> {
        let value: Value = self.http.get("stocktakes").await?;
        dto::decode_list(&value)
    }

    async fn get_stocktake(&self, id: &str) -> ClientResult<Stocktake> {
        self.http.get(&format!("stocktakes/{}", id)).await
    }

    async fn create_stocktake(&self, request: &StocktakeRequest) -> ClientResult<()> {
        self.http.execute(Method::POST, "stocktakes", request).await
    }

    async fn update_stocktake(&self, id: &str, request: &StocktakeRequest) -> ClientResult<()> {
        self.http
            .execute(Method::PUT, &format!("stocktakes/{}", id), request)
            .await
    }

    async fn update_import_remain(&self, import_detail_id: &str, remain: i64) -> ClientResult<()> {
        let body = RemainBody {
            remain_quantity: remain,
        };
        self.http
            .execute(
                Method::PATCH,
                &format!("import-details/{}/remain", import_detail_id),
                &body,
            )
            .await
    }

    async fn set_import_checked(&self, import_detail_id: &str, checked: bool) -> ClientResult<()> {
        let body = IsCheckBody { is_check: checked };
        self.http
            .execute(
                Method::PATCH,
                &format!("import-details/{}/is-check", import_detail_id),
                &body,
            )
            .await
    }

    async fn list_change_logs(&self, filter: &ChangeLogFilter) -> ClientResult<Vec<ChangeStatusLog>> {
        let value: Value = self.http.post("change-statuslog/list-all", filter).await?;
        dto::decode_list(&value)
    }

    async fn get_change_log(&self, id: &str) -> ClientResult<ChangeStatusLog> {
        self.http.get(&format!("change-statuslog/{}", id)).await
    }

    async fn change_log_source(&self, id: &str) -> ClientResult<Option<String>> {
        let value: Value = self
            .http
            .get(&format!("change-statuslog/{}/source", id))
            .await?;
        Ok(dto::normalize_source(&value))
    }

    async fn change_logs_by_model(
        &self,
        query: &ModelHistoryQuery,
    ) -> ClientResult<Vec<ChangeStatusLog>> {
        let value: Value = self.http.post("change-statuslog/by-model", query).await?;
        dto::decode_list(&value)
    }
}

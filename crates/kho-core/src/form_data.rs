//! Reference data behind the sale-transaction form.
//!
//! Loading happens in the app layer; this module holds the result and the
//! store pre-selection rule for store-restricted roles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Category, Customer, Product, Store, UserProfile, Zone};

/// Response of `GET /sale-transactions/create-form-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormData {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub stores: Vec<Store>,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Everything the form needs. A failed fetch leaves its collection empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub customers: Vec<Customer>,
    pub stores: Vec<Store>,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub zones: Vec<Zone>,
    pub user: Option<UserProfile>,
    /// Store forced on a store-restricted user.
    pub preselected_store_id: Option<String>,
    /// First load failure, shown in the banner.
    pub error: Option<String>,
}

impl FormData {
    /// Keeps only the first failure message.
    pub fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }
}

/// Customers and stores the confirmation step resolves selections against.
///
/// Cloning shares the lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directory {
    customers: Arc<Vec<Customer>>,
    stores: Arc<Vec<Store>>,
}

impl Directory {
    pub fn new(customers: Vec<Customer>, stores: Vec<Store>) -> Self {
        Directory {
            customers: Arc::new(customers),
            stores: Arc::new(stores),
        }
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    pub fn store(&self, id: &str) -> Option<&Store> {
        self.stores.iter().find(|s| s.id == id)
    }
}

impl From<&FormData> for Directory {
    fn from(data: &FormData) -> Self {
        Directory::new(data.customers.clone(), data.stores.clone())
    }
}

/// The store a store-restricted user must book against.
///
/// Matches the profile's store by id, then by name (case-insensitive).
/// `None` for unrestricted roles or when nothing matches.
pub fn preselect_store(user: &UserProfile, stores: &[Store]) -> Option<String> {
    if !user.role.is_store_restricted() {
        return None;
    }
    if let Some(id) = user.store_id.as_deref().filter(|id| !id.is_empty()) {
        if let Some(store) = stores.iter().find(|s| s.id == id) {
            return Some(store.id.clone());
        }
    }
    let name = user.store_name.as_deref()?.trim();
    stores
        .iter()
        .find(|s| s.name.trim().to_lowercase() == name.to_lowercase())
        .map(|s| s.id.clone())
}

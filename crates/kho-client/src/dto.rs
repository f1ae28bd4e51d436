//! # Payload Normalization
//!
//! Backend payloads are not uniform: the same batch may arrive as
//! `{ batchId, productName, unitSalePrice }`, as
//! `{ id, product: { id, name }, salePrice: "3500.0" }`, wrapped in
//! `{ content: [...] }`, and so on. Everything is mapped onto the canonical
//! `kho-core` types here, once, so nothing past this module guesses at
//! field names.
//!
//! ```text
//!   serde_json::Value ──► pick(["batchId", "importDetailId", "id"]) ──► ProductBatch
//!                         (first key present and non-null wins)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use kho_core::{
    DetailLine, Money, ProductBatch, SaleTransaction, TransactionStatus, Unit, UserProfile,
    UserRole,
};

use crate::{ClientError, ClientResult};

// =============================================================================
// Field Access
// =============================================================================

fn object<'a>(value: &'a Value, what: &str) -> ClientResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ClientError::InvalidResponse(format!("{} is not an object", what)))
}

/// First of `keys` present with a non-null value. Dotted keys descend into
/// nested objects (`"product.name"`).
fn pick<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = obj.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        (!current.is_null()).then_some(current)
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn pick_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    pick(obj, keys).and_then(text)
}

fn pick_money(obj: &Map<String, Value>, keys: &[&str]) -> Money {
    pick(obj, keys)
        .and_then(number)
        .map(|v| Money::from_dong(v.round() as i64))
        .unwrap_or_default()
}

fn pick_count(obj: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    pick(obj, keys).and_then(number).map(|v| v.round() as i64)
}

fn pick_date(obj: &Map<String, Value>, keys: &[&str]) -> Option<NaiveDate> {
    let raw = pick_text(obj, keys)?;
    let day = raw.get(..10).unwrap_or(&raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn pick_datetime(obj: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    let raw = pick_text(obj, keys)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Zones as a list of names: strings, or objects with `name`/`code`/`id`.
fn pick_zones(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let Some(Value::Array(items)) = pick(obj, keys) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(zone) => pick_text(zone, &["name", "code", "id"]),
            other => text(other),
        })
        .collect()
}

/// The rows of a list payload: a bare array or one wrapped in
/// `content`/`items`/`data`/`rows`.
pub fn list_items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(obj) => ["content", "items", "data", "rows", "batches", "importDetails"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Decodes every row of a list payload into `T`.
pub fn decode_list<T: DeserializeOwned>(value: &Value) -> ClientResult<Vec<T>> {
    list_items(value)
        .into_iter()
        .map(|v| serde_json::from_value(v).map_err(ClientError::from))
        .collect()
}

// =============================================================================
// Batches
// =============================================================================

/// One batch payload, in any of the shapes the backend uses.
///
/// `product_id_hint` fills the product id when the payload omits it (the
/// per-product endpoint often does).
pub fn normalize_batch(value: &Value, product_id_hint: Option<&str>) -> ClientResult<ProductBatch> {
    let obj = object(value, "batch")?;

    let product_id = pick_text(obj, &["productId", "product.id"])
        .or_else(|| product_id_hint.map(str::to_string))
        .ok_or_else(|| ClientError::InvalidResponse("batch without product id".to_string()))?;

    Ok(ProductBatch {
        batch_id: pick_text(obj, &["batchId", "importDetailId", "batch.id", "id"]),
        product_name: pick_text(obj, &["productName", "product.name", "name"])
            .unwrap_or_else(|| product_id.clone()),
        product_id,
        batch_code: pick_text(obj, &["batchCode", "batch.code", "lotCode", "code"]),
        unit_sale_price: pick_money(
            obj,
            &["unitSalePrice", "salePrice", "price", "product.unitSalePrice"],
        ),
        remain_quantity: pick_count(obj, &["remainQuantity", "remain", "quantityRemain"])
            .unwrap_or(0)
            .max(0),
        expiry_date: pick_date(obj, &["expiryDate", "expiredDate", "expDate"]),
        zone_real: pick_zones(obj, &["zoneReal", "zones"]),
    })
}

pub fn normalize_batches(
    value: &Value,
    product_id_hint: Option<&str>,
) -> ClientResult<Vec<ProductBatch>> {
    list_items(value)
        .iter()
        .map(|v| normalize_batch(v, product_id_hint))
        .collect()
}

// =============================================================================
// Transactions
// =============================================================================

fn normalize_detail(value: &Value) -> ClientResult<DetailLine> {
    let obj = object(value, "detail line")?;

    let product_id = pick_text(obj, &["productId", "product.id"])
        .ok_or_else(|| ClientError::InvalidResponse("detail without product id".to_string()))?;
    let unit = pick_text(obj, &["unit"])
        .and_then(|u| u.parse::<Unit>().ok())
        .unwrap_or_default();

    Ok(DetailLine {
        batch_id: pick_text(obj, &["batchId", "importDetailId", "batch.id"]).unwrap_or_default(),
        product_name: pick_text(obj, &["productName", "product.name"])
            .unwrap_or_else(|| product_id.clone()),
        product_id,
        batch_code: pick_text(obj, &["batchCode", "batch.code", "lotCode"]),
        quantity: pick_count(obj, &["quantity", "qty"]).unwrap_or(1).max(1),
        unit,
        unit_sale_price: pick_money(obj, &["unitSalePrice", "salePrice", "price"]),
        total: pick_money(obj, &["total", "amount"]),
        remain_quantity: pick_count(
            obj,
            &["remainQuantity", "batch.remainQuantity", "remain"],
        ),
        zone_real: pick_zones(obj, &["zoneReal", "zones"]),
    })
}

fn parse_status(obj: &Map<String, Value>) -> TransactionStatus {
    let Some(raw) = pick_text(obj, &["status"]) else {
        return TransactionStatus::default();
    };
    serde_json::from_value(Value::String(raw.to_uppercase())).unwrap_or_else(|_| {
        warn!(status = %raw, "Unknown transaction status, treating as draft");
        TransactionStatus::default()
    })
}

pub fn normalize_transaction(value: &Value) -> ClientResult<SaleTransaction> {
    let obj = object(value, "transaction")?;

    let id = pick_text(obj, &["id", "transactionId"])
        .ok_or_else(|| ClientError::InvalidResponse("transaction without id".to_string()))?;
    let detail = pick(obj, &["detail", "details", "items"])
        .and_then(Value::as_array)
        .map(|rows| rows.iter().map(normalize_detail).collect::<ClientResult<Vec<_>>>())
        .transpose()?
        .unwrap_or_default();

    let sale_date = pick_date(obj, &["saleDate", "date", "createdAt"]).ok_or_else(|| {
        ClientError::InvalidResponse(format!("transaction {} without sale date", id))
    })?;

    Ok(SaleTransaction {
        code: pick_text(obj, &["code", "transactionCode"]).unwrap_or_default(),
        customer_id: pick_text(obj, &["customerId", "customer.id"]).unwrap_or_default(),
        customer_name: pick_text(obj, &["customerName", "customer.name"]),
        store_id: pick_text(obj, &["storeId", "store.id"]).unwrap_or_default(),
        store_name: pick_text(obj, &["storeName", "store.name"]),
        sale_date,
        note: pick_text(obj, &["note", "description"]).unwrap_or_default(),
        paid_amount: pick_money(obj, &["paidAmount", "paid"]),
        total_amount: pick_money(obj, &["totalAmount", "total"]),
        status: parse_status(obj),
        detail,
        created_at: pick_datetime(obj, &["createdAt"]),
        id,
    })
}

pub fn normalize_transactions(value: &Value) -> ClientResult<Vec<SaleTransaction>> {
    list_items(value).iter().map(normalize_transaction).collect()
}

// =============================================================================
// Users & Codes
// =============================================================================

fn parse_role(raw: &str) -> UserRole {
    let role = raw.trim().to_uppercase();
    match role.strip_prefix("ROLE_").unwrap_or(&role) {
        "ADMIN" => UserRole::Admin,
        "MANAGER" => UserRole::Manager,
        "STAFF" | "EMPLOYEE" => UserRole::Staff,
        _ => UserRole::Guest,
    }
}

pub fn normalize_user(value: &Value) -> ClientResult<UserProfile> {
    let obj = object(value, "user")?;

    let role = pick(obj, &["role", "roles"])
        .and_then(|r| match r {
            Value::Array(roles) => roles.first().and_then(text),
            other => text(other),
        })
        .map(|r| parse_role(&r))
        .unwrap_or_default();

    Ok(UserProfile {
        id: pick_text(obj, &["id", "userId"]).unwrap_or_default(),
        username: pick_text(obj, &["username", "userName", "email"]).unwrap_or_default(),
        full_name: pick_text(obj, &["fullName", "name"]).unwrap_or_default(),
        role,
        store_id: pick_text(obj, &["storeId", "store.id"]),
        store_name: pick_text(obj, &["storeName", "store.name"]),
    })
}

/// A transaction code: a bare string, or `{ code }` / `{ nextCode }`.
pub fn normalize_code(value: &Value) -> ClientResult<String> {
    let code = match value {
        Value::Object(obj) => pick_text(obj, &["code", "nextCode"]),
        other => text(other),
    };
    code.ok_or_else(|| ClientError::InvalidResponse("missing transaction code".to_string()))
}

/// Navigation target of an audit entry: a bare string or `{ url }`.
pub fn normalize_source(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => pick_text(obj, &["sourceUrl", "url", "path"]),
        other => text(other),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Form Data Commands
//!
//! Loads the reference data behind the sale-transaction form.
//!
//! ```text
//! ┌──────────────────┐ ┌────────────┐ ┌───────┐ ┌───────────┐
//! │ create-form-data │ │ categories │ │ zones │ │ users/me  │   tokio::join!
//! └────────┬─────────┘ └─────┬──────┘ └───┬───┘ └─────┬─────┘
//!          │ fail: banner,   │            │           │ fail: cached
//!          │ empty lists     │            │           │ staffStoreId
//!          ▼                 ▼            ▼           ▼
//!      ┌────────────────────────────────────────────────────┐
//!      │ FormData + preselected store (store-restricted)    │
//!      └────────────────────────────────────────────────────┘
//! ```
//!
//! Loading never fails as a whole. The customers and stores become the
//! editor's directory, which the confirmation step resolves against.

use tracing::{debug, info, warn};

use kho_core::form_data::{preselect_store, Directory, FormData};
use kho_core::{UserProfile, UserRole};

use crate::AppContext;

pub async fn load_form_data(ctx: &AppContext) -> FormData {
    debug!("load_form_data command");

    let api = ctx.api();
    let (form, categories, zones, user) = tokio::join!(
        api.create_form_data(),
        api.categories(),
        api.zones(),
        api.current_user(),
    );

    let mut data = FormData::default();

    match form {
        Ok(form) => {
            data.customers = form.customers;
            data.stores = form.stores;
            data.products = form.products;
        }
        Err(e) => {
            warn!(error = %e, "Create-form data failed to load");
            data.record_error(e.user_message());
        }
    }
    match categories {
        Ok(categories) => data.categories = categories,
        Err(e) => {
            warn!(error = %e, "Categories failed to load");
            data.record_error(e.user_message());
        }
    }
    match zones {
        Ok(zones) => data.zones = zones,
        Err(e) => {
            warn!(error = %e, "Zones failed to load");
            data.record_error(e.user_message());
        }
    }

    let (user, live) = match user {
        Ok(user) => (user, true),
        Err(e) => {
            warn!(error = %e, "Profile unavailable, using cached store");
            (cached_profile(ctx).await, false)
        }
    };

    ctx.editor().set_directory(Directory::from(&data));

    data.preselected_store_id = preselect_store(&user, &data.stores);
    if let Some(store_id) = &data.preselected_store_id {
        ctx.editor()
            .with_session_mut(|s| s.editor.preselect_store(store_id));
    }

    if live && user.role.is_store_restricted() {
        let store_id = data
            .preselected_store_id
            .clone()
            .or_else(|| user.store_id.clone());
        if let Some(store_id) = store_id {
            if let Err(e) = ctx.db().local_state().set_staff_store_id(&store_id).await {
                warn!(error = %e, "Could not cache staff store");
            }
        }
    }

    info!(
        customers = data.customers.len(),
        stores = data.stores.len(),
        products = data.products.len(),
        preselected = ?data.preselected_store_id,
        "Form data loaded"
    );
    data.user = Some(user);
    data
}

/// Guest profile, store-restricted to the cached store when there is one.
async fn cached_profile(ctx: &AppContext) -> UserProfile {
    let cached = match ctx.db().local_state().staff_store_id().await {
        Ok(cached) => cached,
        Err(e) => {
            warn!(error = %e, "Could not read cached staff store");
            None
        }
    };

    match cached {
        Some(store_id) => UserProfile {
            role: UserRole::Staff,
            store_id: Some(store_id),
            ..UserProfile::guest()
        },
        None => UserProfile::guest(),
    }
}

//! # Repository Module
//!
//! ## Available Repositories
//!
//! - [`LocalStateRepository`](local_state::LocalStateRepository) - raw and
//!   JSON key-value access, plus the typed keys the sale form uses
//! - [`StocktakeDraftRepository`](stocktake_draft::StocktakeDraftRepository) -
//!   counting in progress, one entry per stocktake

pub mod local_state;
pub mod stocktake_draft;

//! # kho-client: REST Client for the Kho Backend
//!
//! Talks to the back-office REST API and hands back `kho-core` types.
//!
//! ## Request Path
//! ```text
//! ┌──────────────┐   typed call    ┌──────────────┐  JSON   ┌──────────────┐
//! │ kho-backoffice│ ─────────────► │  RestClient  │ ──────► │  HttpClient  │
//! │  (commands)  │                 │ (BackofficeApi)│        │  reqwest     │
//! └──────────────┘                 └──────┬───────┘         └──────┬───────┘
//!        ▲                                │                        │
//!        │   kho-core types               ▼                        ▼
//!        └──────────────────────── dto normalizers ◄──── {data} / bare body
//! ```
//!
//! ## Modules
//!
//! - [`api`] - The [`BackofficeApi`] trait and its REST implementation
//! - [`http`] - Transport, bearer auth, status mapping
//! - [`dto`] - Lenient payload normalization
//! - [`config`] - Connection settings
//! - [`error`] - [`ClientError`] and user-facing messages

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod http;

pub use api::{BackofficeApi, RestClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

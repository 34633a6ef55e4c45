//! REST client for the club administration API.
//!
//! Provides the uniform HTTP wrapper ([`api::ApiClient`]), typed
//! per-module endpoints, the query cache, and the two controllers every
//! console screen is built from: the list controller (search, sort,
//! paging, filters with stale-response protection) and the form
//! submission controller.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod form;
pub mod list;
pub mod resources;
pub mod session_store;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use form::{FormController, FormMode, SubmitOutcome};
pub use list::{Completion, FetchTicket, ListController, ListView};
pub use resources::{ExportFormat, ResourceApi};
pub use session_store::SessionStore;

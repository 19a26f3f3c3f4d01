pub mod api_client;
pub mod app_context;
pub mod auth;
pub mod crud;
pub mod dashboard;
pub mod pagination;
pub mod query_cache;

pub use crate::domain::ports::{ConfigProvider, SessionStore, StoredSession};
pub use crate::utils::error::Result;
pub use api_client::ApiClient;
pub use crud::{Crud, DataLayer};
pub use query_cache::{QueryCache, QueryKey, QueryState, QueryStatus};

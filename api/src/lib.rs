use std::sync::Arc;

mod client;
mod error;
pub mod lookups;
pub mod models;
mod search;
mod session;

pub use client::{
    Backend, BackendConfig, CORE_API_BASE_URL, DEFAULT_AVAILABILITY_URL, DEFAULT_LOGIN_URL,
};
pub use error::ApiError;
pub use search::{normalize, search};
pub use session::{Session, Tokens};

pub const PAGE_SIZE: usize = 10;

pub type Api = Arc<Backend>;

pub fn new_api(config: BackendConfig) -> Result<Api, ApiError> {
    Ok(Arc::new(Backend::new(config)?))
}

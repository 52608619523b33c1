mod authed;
mod with_api;

pub use authed::{authed, Unauthorized};
pub use with_api::with_api;

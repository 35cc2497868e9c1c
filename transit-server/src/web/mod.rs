//! Web layer for the real-time passages server.
//!
//! Exposes stop monitoring queries and source status over HTTP.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

//! Transport layer (HTTP)

pub mod http;

pub use http::{build_router, start_http_server, AppState};

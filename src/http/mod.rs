//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, fallback dispatcher)
//!     → routing::matcher (first matching rule, lookup captures)
//!     → request.rs (parse body, token, locale, query)
//!     → method map → Handler::call(action) / Handler::handle(method)
//!     → response.rs (JSON rendering) / ApiError → status + JSON body
//!     → default CORS headers, request ID → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::ApiRequest;
pub use server::{AppState, HttpServer};

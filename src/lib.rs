//! REST resource router library

pub mod config;
pub mod demo;
pub mod error;
pub mod http;
pub mod i18n;
pub mod observability;
pub mod routing;
pub mod security;
pub mod serializer;

pub use config::schema::Settings;
pub use error::{ApiError, ApiResult, RouterError, RouterResult};
pub use http::{ApiRequest, HttpServer};
pub use routing::{GenericRouter, Handler, HandlerSpec, ResourceRouter, RouteRule, Router};

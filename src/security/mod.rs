//! Security subsystem.
//!
//! # Components
//! - `headers.rs`: default CORS response headers
//! - `access_control.rs`: bearer token extraction and the verifier seam
//! - `jwt.rs`: HMAC-signed JSON Web Tokens behind that seam
//!
//! # Design Decisions
//! - Tokens are parsed for every request; verification happens once and
//!   the resulting claims travel with the request
//! - Handlers opt into authentication by calling `authenticated()`

pub mod access_control;
pub mod headers;
pub mod jwt;

pub use access_control::{parse_token, RejectAll, TokenVerifier};
pub use headers::default_headers;
pub use jwt::{JwtCodec, JwtError};

//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Generation (at startup):
//!     register(resources, handler) → handler.rs (capability record)
//!     → resource.rs (lookups, method maps, patterns)
//!     → router.rs (prefix + trailing slash finalization)
//!     → matcher.rs (compile, freeze as immutable RouteTable)
//!
//! Incoming Request (path)
//!     → matcher.rs (first matching rule, lookup captures)
//!     → http dispatch (method map → handler action)
//! ```
//!
//! # Design Decisions
//! - Registries are append-only; rules are recomputed on every read
//! - Configuration errors surface at registration or first read
//! - First match wins (registration order)

pub mod generic;
pub mod handler;
pub mod inflect;
pub mod matcher;
pub mod resource;
pub mod router;

pub use generic::GenericRouter;
pub use handler::{Action, Handler, HandlerSpec, Kwargs, MethodMap};
pub use matcher::RouteTable;
pub use resource::{ResourceRouter, RouteTemplate};
pub use router::{collect_routes, PathConfig, RouteRule, Router};

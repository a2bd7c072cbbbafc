//! One pattern, one handler.

use std::sync::Arc;

use crate::error::RouterResult;
use crate::routing::handler::{Handler, Kwargs};
use crate::routing::router::{PathConfig, RouteRule, Router};

#[derive(Clone)]
struct Registration {
    pattern: String,
    handler: Arc<dyn Handler>,
    kwargs: Option<Kwargs>,
    name: Option<String>,
}

/// Router that maps each registration to exactly one rule.
///
/// No method map is derived: requests reach [`Handler::handle`] with the
/// raw HTTP method.
#[derive(Clone, Default)]
pub struct GenericRouter {
    config: PathConfig,
    registry: Vec<Registration>,
}

impl GenericRouter {
    pub fn new(config: PathConfig) -> Self {
        Self {
            config,
            registry: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        pattern: impl Into<String>,
        handler: Arc<dyn Handler>,
        kwargs: Option<Kwargs>,
        name: Option<&str>,
    ) {
        self.registry.push(Registration {
            pattern: pattern.into(),
            handler,
            kwargs,
            name: name.map(str::to_string),
        });
    }

    pub fn set_api_prefix(&mut self, api_prefix: impl Into<String>) {
        self.config.api_prefix = api_prefix.into();
    }

    pub fn set_trailing_slash(&mut self, trailing_slash: bool) {
        self.config.trailing_slash = trailing_slash;
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Router for GenericRouter {
    fn path_config(&self) -> &PathConfig {
        &self.config
    }

    fn get_rules(&self) -> RouterResult<Vec<RouteRule>> {
        Ok(self
            .registry
            .iter()
            .map(|r| {
                RouteRule::new(
                    r.pattern.clone(),
                    r.handler.clone(),
                    r.kwargs.clone().unwrap_or_default(),
                    r.name.clone(),
                )
            })
            .collect())
    }
}

//! Router base contract and path finalization.
//!
//! # Responsibilities
//! - Define the rule unit handed to the HTTP layer
//! - Finalize raw patterns with the prefix and trailing slash settings
//! - Aggregate rules across several routers
//!
//! # Design Decisions
//! - Finalization happens on every read, never at registration
//! - Reads do not cache; each call returns a fresh snapshot

use std::fmt;
use std::sync::Arc;

use crate::config::RoutingConfig;
use crate::error::RouterResult;
use crate::routing::handler::{Handler, Kwargs};

/// Prefix and trailing slash applied to raw patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    pub api_prefix: String,
    pub trailing_slash: bool,
}

impl PathConfig {
    pub fn new(api_prefix: impl Into<String>, trailing_slash: bool) -> Self {
        Self {
            api_prefix: api_prefix.into(),
            trailing_slash,
        }
    }

    /// Join the prefix with the stripped pattern, then apply the trailing slash.
    pub fn finalize(&self, pattern: &str) -> String {
        let stripped = pattern.trim_matches('/');
        let mut path = self.api_prefix.clone();
        // A plain path join would leave an empty prefix relative
        // ("widgets") and double the slash for an empty pattern ("/api//").
        // Both are normalised here to a rooted path with a single slash.
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(stripped);
        if self.trailing_slash && !path.ends_with('/') {
            path.push('/');
        }
        path
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self::new("/", false)
    }
}

impl From<&RoutingConfig> for PathConfig {
    fn from(config: &RoutingConfig) -> Self {
        Self::new(config.api_prefix.clone(), config.trailing_slash)
    }
}

/// A concrete route: pattern, handler, construction arguments and name.
#[derive(Clone)]
pub struct RouteRule {
    pub pattern: String,
    pub handler: Arc<dyn Handler>,
    pub kwargs: Kwargs,
    pub name: Option<String>,
}

impl RouteRule {
    pub fn new(
        pattern: impl Into<String>,
        handler: Arc<dyn Handler>,
        kwargs: Kwargs,
        name: Option<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            handler,
            kwargs,
            name,
        }
    }

    /// Methods this rule answers, as listed in its method map.
    pub fn methods(&self) -> Vec<String> {
        match &self.kwargs.method_map {
            Some(map) => map.methods().map(|m| m.to_string()).collect(),
            None => Vec::new(),
        }
    }
}

impl PartialEq for RouteRule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && Arc::ptr_eq(&self.handler, &other.handler)
            && self.kwargs == other.kwargs
            && self.name == other.name
    }
}

impl fmt::Debug for RouteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRule")
            .field("pattern", &self.pattern)
            .field("handler", &self.handler.spec().name)
            .field("kwargs", &self.kwargs)
            .field("name", &self.name)
            .finish()
    }
}

/// A source of route rules.
pub trait Router {
    /// Path configuration used by [`Router::rules`].
    fn path_config(&self) -> &PathConfig;

    /// Raw rules, patterns not yet finalized.
    fn get_rules(&self) -> RouterResult<Vec<RouteRule>>;

    /// Finalized rules using the router's own configuration.
    fn rules(&self) -> RouterResult<Vec<RouteRule>> {
        self.rules_with(self.path_config())
    }

    /// Finalized rules using an explicit configuration.
    fn rules_with(&self, config: &PathConfig) -> RouterResult<Vec<RouteRule>> {
        let rules = self
            .get_rules()?
            .into_iter()
            .map(|mut rule| {
                rule.pattern = config.finalize(&rule.pattern);
                rule
            })
            .collect();
        Ok(rules)
    }
}

/// Collect finalized rules from several routers, in order, using one
/// shared path configuration.
pub fn collect_routes(routers: &[&dyn Router], config: &PathConfig) -> RouterResult<Vec<RouteRule>> {
    let mut routes = Vec::new();
    for router in routers {
        routes.extend(router.rules_with(config)?);
    }
    tracing::debug!(
        routers = routers.len(),
        rules = routes.len(),
        api_prefix = %config.api_prefix,
        trailing_slash = config.trailing_slash,
        "Route table collected"
    );
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_with_prefix_and_slash() {
        let config = PathConfig::new("/api/v1", true);
        assert_eq!(
            config.finalize("widgets/(?P<pk>[^/.]+)"),
            "/api/v1/widgets/(?P<pk>[^/.]+)/"
        );
    }

    #[test]
    fn test_finalize_strips_pattern_slashes() {
        let config = PathConfig::default();
        assert_eq!(config.finalize("/widgets/"), "/widgets");

        let config = PathConfig::new("/api/", false);
        assert_eq!(config.finalize("widgets"), "/api/widgets");
    }

    #[test]
    fn test_finalize_empty_pattern() {
        assert_eq!(PathConfig::new("/api", false).finalize(""), "/api/");
        assert_eq!(PathConfig::new("/api", true).finalize("/"), "/api/");
        assert_eq!(PathConfig::new("", false).finalize("widgets"), "/widgets");
    }
}

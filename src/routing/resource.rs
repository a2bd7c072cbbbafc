//! Resource router.
//!
//! Derives collection and detail rules from resource registrations.
//!
//! ```text
//! register(["authors", "books"], handler)
//!     → lookups:  (?P<author_pk>[^/.]+), (?P<book_pk>[^/.]+)
//!     → flat:     authors / lookup₁ / books / lookup₂
//!     → collection rule: authors/lookup₁/books          {GET: list, POST: create}
//!     → detail rule:     authors/lookup₁/books/lookup₂  {GET: retrieve, PUT: update, ...}
//! ```
//!
//! A template whose actions the handler exposes none of is skipped.
//! Standalone handlers only get the detail template, and its pattern drops
//! the final lookup segment.

use std::sync::{Arc, LazyLock};

use axum::http::Method;
use regex::Regex;

use crate::error::{RouterError, RouterResult};
use crate::routing::handler::{Action, Handler, HandlerSpec, Kwargs, MethodMap};
use crate::routing::inflect::singularize;
use crate::routing::router::{PathConfig, RouteRule, Router};

static RESOURCE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("resource name pattern must compile"));

/// One of the two fixed route shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTemplate {
    Collection,
    Detail,
}

impl RouteTemplate {
    /// Templates in emission order.
    pub const ALL: [RouteTemplate; 2] = [RouteTemplate::Collection, RouteTemplate::Detail];

    /// Detail routes carry the final lookup variable.
    pub fn is_detail(self) -> bool {
        self == RouteTemplate::Detail
    }

    pub fn mapping(self) -> Vec<(Method, Action)> {
        match self {
            RouteTemplate::Collection => vec![(Method::GET, Action::List), (Method::POST, Action::Create)],
            RouteTemplate::Detail => vec![
                (Method::GET, Action::Retrieve),
                (Method::PUT, Action::Update),
                (Method::PATCH, Action::PartialUpdate),
                (Method::DELETE, Action::Destroy),
            ],
        }
    }
}

/// Anything that names one or more resources.
pub trait IntoResources {
    fn into_resources(self) -> Vec<String>;
}

impl IntoResources for &str {
    fn into_resources(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoResources for String {
    fn into_resources(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoResources for &[&str] {
    fn into_resources(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoResources for [&str; N] {
    fn into_resources(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoResources for Vec<String> {
    fn into_resources(self) -> Vec<String> {
        self
    }
}

impl IntoResources for Vec<&str> {
    fn into_resources(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

#[derive(Clone)]
struct Registration {
    resources: Vec<String>,
    handler: Arc<dyn Handler>,
    kwargs: Option<Kwargs>,
    name: Option<String>,
}

/// Router generating list/detail rules for registered resources.
#[derive(Clone, Default)]
pub struct ResourceRouter {
    config: PathConfig,
    registry: Vec<Registration>,
}

impl ResourceRouter {
    pub fn new(config: PathConfig) -> Self {
        Self {
            config,
            registry: Vec::new(),
        }
    }

    /// Register a handler under one resource name or a nested sequence.
    ///
    /// Every name must match `^[a-zA-Z0-9_-]+$`. Lookup overrides are
    /// checked here so a misconfigured handler fails before any rule is read.
    pub fn register(
        &mut self,
        resources: impl IntoResources,
        handler: Arc<dyn Handler>,
        kwargs: Option<Kwargs>,
        name: Option<&str>,
    ) -> RouterResult<()> {
        let resources = resources.into_resources();
        if resources.is_empty() {
            return Err(RouterError::InvalidResourceName(String::new()));
        }
        if let Some(invalid) = resources.iter().find(|r| !RESOURCE_NAME.is_match(r)) {
            tracing::error!(resource = %invalid, "Invalid resource name");
            return Err(RouterError::InvalidResourceName(invalid.clone()));
        }
        lookup_regexs(&resources, &handler.spec())?;

        self.registry.push(Registration {
            resources,
            handler,
            kwargs,
            name: name.map(str::to_string),
        });
        Ok(())
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

impl Router for ResourceRouter {
    fn path_config(&self) -> &PathConfig {
        &self.config
    }

    fn get_rules(&self) -> RouterResult<Vec<RouteRule>> {
        let mut rules = Vec::new();
        for registration in &self.registry {
            let spec = registration.handler.spec();
            let kwargs = registration.kwargs.clone().unwrap_or_default();
            let regexs = lookup_regexs(&registration.resources, &spec)?;
            let flat: Vec<&str> = registration
                .resources
                .iter()
                .zip(&regexs)
                .flat_map(|(resource, regex)| [resource.as_str(), regex.as_str()])
                .collect();

            for template in RouteTemplate::ALL {
                let method_map = method_map(&spec, template);
                if method_map.is_empty() {
                    continue;
                }
                if spec.standalone && !template.is_detail() {
                    continue;
                }
                let segments = if template.is_detail() && !spec.standalone {
                    &flat[..]
                } else {
                    &flat[..flat.len() - 1]
                };
                let pattern = segments.join("/");

                tracing::debug!(
                    handler = %spec.name,
                    pattern = %pattern,
                    detail = template.is_detail(),
                    methods = method_map.len(),
                    "Generated rule"
                );

                let mut rule_kwargs = kwargs.clone();
                rule_kwargs.method_map = Some(method_map);
                rules.push(RouteRule::new(
                    pattern,
                    registration.handler.clone(),
                    rule_kwargs,
                    registration.name.clone(),
                ));
            }
        }
        Ok(rules)
    }
}

/// Build one `(?P<kwarg>regex)` segment per resource.
pub fn lookup_regexs(resources: &[String], spec: &HandlerSpec) -> RouterResult<Vec<String>> {
    let kwargs: Vec<String> = if !spec.lookup_url_kwargs.is_empty() {
        spec.lookup_url_kwargs.clone()
    } else if resources.len() == 1 {
        vec![spec.lookup_url_kwarg.clone()]
    } else {
        resources
            .iter()
            .map(|r| format!("{}_{}", singularize(r), spec.lookup_url_kwarg))
            .collect()
    };
    let regexs: Vec<String> = if !spec.lookup_value_regexs.is_empty() {
        spec.lookup_value_regexs.clone()
    } else {
        vec![spec.lookup_value_regex.clone(); resources.len()]
    };

    if kwargs.len() != regexs.len() || kwargs.len() != resources.len() {
        tracing::error!(
            handler = %spec.name,
            resources = resources.len(),
            kwargs = kwargs.len(),
            regexs = regexs.len(),
            "Lookup override lengths do not match"
        );
        return Err(RouterError::LookupLengthMismatch {
            handler: spec.name.clone(),
            resources: resources.len(),
            kwargs: kwargs.len(),
            regexs: regexs.len(),
        });
    }

    Ok(kwargs
        .iter()
        .zip(&regexs)
        .map(|(kwarg, regex)| format!("(?P<{kwarg}>{regex})"))
        .collect())
}

/// Keep the template entries whose action the handler exposes.
pub fn method_map(spec: &HandlerSpec, template: RouteTemplate) -> MethodMap {
    template
        .mapping()
        .into_iter()
        .filter(|(_, action)| spec.exposes(*action))
        .collect()
}

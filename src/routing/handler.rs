//! Handler capability contract.
//!
//! A handler tells the router what it can do through a [`HandlerSpec`]
//! record: which actions it exposes, whether it is standalone, and how its
//! lookup variables are named and matched. The router never inspects the
//! handler any other way.

use std::collections::BTreeSet;
use std::fmt;

use axum::http::Method;
use axum::response::Response;
use futures_util::future::BoxFuture;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::http::request::ApiRequest;

/// Default name of the per-item lookup variable.
pub const DEFAULT_LOOKUP_URL_KWARG: &str = "pk";

/// Default expression matched by a lookup variable.
pub const DEFAULT_LOOKUP_VALUE_REGEX: &str = "[^/.]+";

/// Resource actions a handler may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Retrieve => "retrieve",
            Action::Update => "update",
            Action::PartialUpdate => "partial_update",
            Action::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability record declared by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSpec {
    /// Identifier used in logs and route listings.
    pub name: String,

    /// Singleton resource without a collection endpoint.
    pub standalone: bool,

    /// Lookup variable name used for single-resource registrations.
    pub lookup_url_kwarg: String,

    /// Expression matched by every lookup variable.
    pub lookup_value_regex: String,

    /// Per-resource lookup variable names. Empty means undeclared.
    pub lookup_url_kwargs: Vec<String>,

    /// Per-resource lookup expressions. Empty means undeclared.
    pub lookup_value_regexs: Vec<String>,

    /// Actions the handler implements.
    pub actions: BTreeSet<Action>,
}

impl HandlerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            standalone: false,
            lookup_url_kwarg: DEFAULT_LOOKUP_URL_KWARG.to_string(),
            lookup_value_regex: DEFAULT_LOOKUP_VALUE_REGEX.to_string(),
            lookup_url_kwargs: Vec::new(),
            lookup_value_regexs: Vec::new(),
            actions: BTreeSet::new(),
        }
    }

    pub fn standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn lookup_url_kwarg(mut self, kwarg: impl Into<String>) -> Self {
        self.lookup_url_kwarg = kwarg.into();
        self
    }

    pub fn lookup_value_regex(mut self, regex: impl Into<String>) -> Self {
        self.lookup_value_regex = regex.into();
        self
    }

    pub fn lookup_url_kwargs<I, S>(mut self, kwargs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lookup_url_kwargs = kwargs.into_iter().map(Into::into).collect();
        self
    }

    pub fn lookup_value_regexs<I, S>(mut self, regexs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lookup_value_regexs = regexs.into_iter().map(Into::into).collect();
        self
    }

    pub fn exposes(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

/// A request handler registered with a router.
///
/// Resource handlers answer [`Handler::call`] for the actions their spec
/// declares. Handlers mounted through a generic router answer
/// [`Handler::handle`] with the raw HTTP method instead.
pub trait Handler: Send + Sync + 'static {
    fn spec(&self) -> HandlerSpec;

    fn call(&self, action: Action, request: ApiRequest) -> BoxFuture<'_, ApiResult<Response>> {
        let _ = (action, request);
        Box::pin(async { Err(ApiError::method_not_allowed()) })
    }

    fn handle(&self, method: Method, request: ApiRequest) -> BoxFuture<'_, ApiResult<Response>> {
        let _ = (method, request);
        Box::pin(async { Err(ApiError::method_not_allowed()) })
    }
}

/// Ordered HTTP method to action table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodMap {
    entries: Vec<(Method, Action)>,
}

impl MethodMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: Method, action: Action) {
        match self.entries.iter_mut().find(|(m, _)| *m == method) {
            Some(entry) => entry.1 = action,
            None => self.entries.push((method, action)),
        }
    }

    pub fn get(&self, method: &Method) -> Option<Action> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, action)| *action)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Method, Action)> {
        self.entries.iter().map(|(m, a)| (m, *a))
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.entries.iter().map(|(m, _)| m)
    }
}

impl FromIterator<(Method, Action)> for MethodMap {
    fn from_iter<T: IntoIterator<Item = (Method, Action)>>(iter: T) -> Self {
        let mut map = MethodMap::new();
        for (method, action) in iter {
            map.insert(method, action);
        }
        map
    }
}

/// Construction arguments attached to a rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kwargs {
    /// Free-form arguments supplied at registration.
    pub extra: Map<String, Value>,

    /// Dispatch table derived by the resource router.
    pub method_map: Option<MethodMap>,
}

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

impl From<Map<String, Value>> for Kwargs {
    fn from(extra: Map<String, Value>) -> Self {
        Self {
            extra,
            method_map: None,
        }
    }
}

//! Request path matching against finalized rules.
//!
//! # Responsibilities
//! - Compile each finalized pattern, anchored at both ends
//! - Find the first rule whose pattern matches a request path
//! - Extract named lookup captures as path kwargs
//!
//! # Design Decisions
//! - Rules are tried in registration order; first match wins
//! - The table is immutable once built and shared via Arc

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::error::{RouterError, RouterResult};
use crate::routing::router::RouteRule;

/// A rule together with its compiled pattern.
#[derive(Debug)]
pub struct CompiledRoute {
    pub rule: RouteRule,
    regex: Regex,
}

impl CompiledRoute {
    pub fn compile(rule: RouteRule) -> RouterResult<Self> {
        let anchored = format!("^{}$", rule.pattern);
        let regex = Regex::new(&anchored).map_err(|source| RouterError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        Ok(Self { rule, regex })
    }

    /// Named captures of `path`, percent-decoded, or `None` when the
    /// pattern does not match. Invalid UTF-8 is decoded lossily.
    pub fn captures(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        let kwargs = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                captures
                    .name(name)
                    .map(|m| (name.to_string(), unquote(m.as_str())))
            })
            .collect();
        Some(kwargs)
    }
}

fn unquote(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a CompiledRoute,
    pub path_kwargs: HashMap<String, String>,
}

/// Ordered, compiled route table.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> RouterResult<Self> {
        let routes = rules
            .into_iter()
            .map(CompiledRoute::compile)
            .collect::<RouterResult<Vec<_>>>()?;
        Ok(Self { routes })
    }

    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .captures(path)
                .map(|path_kwargs| RouteMatch { route, path_kwargs })
        })
    }

    /// All patterns, sorted.
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = self.routes.iter().map(|r| r.rule.pattern.clone()).collect();
        patterns.sort();
        patterns
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

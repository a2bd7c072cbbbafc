//! In-memory demo API served by the binary.
//!
//! ```text
//! /notes                                   GET list, POST create
//! /notes/(?P<pk>[^/.]+)                    GET, PUT, PATCH, DELETE
//! /authors/(?P<author_pk>..)/books         GET list
//! /authors/(?P<author_pk>..)/books/(?P<book_pk>..)  GET retrieve
//! /profile                                 GET, PUT (standalone)
//! /health                                  GET (generic)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::Method;
use axum::response::Response;
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult, RouterResult};
use crate::http::request::ApiRequest;
use crate::http::response::{created, no_content, ok};
use crate::routing::{
    collect_routes, Action, GenericRouter, Handler, HandlerSpec, PathConfig, ResourceRouter,
    RouteRule, Router,
};
use crate::serializer::{FieldErrors, Serializer, Validate};

/// A stored note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl Validate for Note {
    fn validate(&self) -> Result<(), FieldErrors> {
        if self.title.trim().is_empty() {
            let mut errors = FieldErrors::new();
            errors.insert("title".into(), vec!["may not be blank".into()]);
            return Err(errors);
        }
        Ok(())
    }
}

/// Full CRUD over notes.
#[derive(Default)]
pub struct NotesHandler {
    notes: DashMap<u64, Note>,
    next_id: AtomicU64,
}

impl NotesHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, request: &ApiRequest) -> ApiResult<Note> {
        let id: u64 = request
            .path_kwarg("pk")
            .and_then(|pk| pk.parse().ok())
            .ok_or_else(ApiError::not_found)?;
        self.notes
            .get(&id)
            .map(|n| n.value().clone())
            .ok_or_else(ApiError::not_found)
    }

    fn list(&self, request: &ApiRequest) -> ApiResult<Response> {
        let (limit, offset) = request.paginate()?;
        let mut notes: Vec<Note> = self.notes.iter().map(|n| n.value().clone()).collect();
        notes.sort_by_key(|n| n.id);
        let page: Vec<Note> = notes
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok(ok(&page))
    }

    fn create(&self, request: &ApiRequest) -> ApiResult<Response> {
        let data = request.data().cloned().ok_or_else(ApiError::bad_request)?;
        let mut serializer = Serializer::<Note>::with_data(data);
        serializer.is_valid(true)?;
        let mut note = serializer.into_validated()?;
        note.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.notes.insert(note.id, note.clone());
        tracing::debug!(id = note.id, "Note created");
        Ok(created(&note))
    }

    fn update(&self, request: &ApiRequest, partial: bool) -> ApiResult<Response> {
        let current = self.lookup(request)?;
        let mut data = request.data().cloned().ok_or_else(ApiError::bad_request)?;
        if partial {
            let mut merged = serde_json::to_value(&current).map_err(|_| ApiError::internal())?;
            if let (Some(target), Some(patch)) = (merged.as_object_mut(), data.as_object()) {
                for (key, value) in patch {
                    target.insert(key.clone(), value.clone());
                }
            }
            data = merged;
        }
        let mut serializer = Serializer::for_update(current.clone(), data);
        serializer.is_valid(true)?;
        let mut note = serializer.into_validated()?;
        note.id = current.id;
        self.notes.insert(note.id, note.clone());
        Ok(ok(&note))
    }

    fn destroy(&self, request: &ApiRequest) -> ApiResult<Response> {
        let note = self.lookup(request)?;
        self.notes.remove(&note.id);
        Ok(no_content())
    }
}

impl Handler for NotesHandler {
    fn spec(&self) -> HandlerSpec {
        HandlerSpec::new("notes").actions([
            Action::List,
            Action::Create,
            Action::Retrieve,
            Action::Update,
            Action::PartialUpdate,
            Action::Destroy,
        ])
    }

    fn call(&self, action: Action, request: ApiRequest) -> BoxFuture<'_, ApiResult<Response>> {
        Box::pin(async move {
            match action {
                Action::List => self.list(&request),
                Action::Create => self.create(&request),
                Action::Retrieve => self.lookup(&request).map(|n| ok(&n)),
                Action::Update => self.update(&request, false),
                Action::PartialUpdate => self.update(&request, true),
                Action::Destroy => self.destroy(&request),
            }
        })
    }
}

/// Read-only books nested under authors.
pub struct BooksHandler;

impl BooksHandler {
    fn book(author: &str, book: &str) -> Value {
        json!({"author": author, "id": book, "title": format!("Book {book} by author {author}")})
    }

    async fn run(&self, action: Action, request: ApiRequest) -> ApiResult<Response> {
        let author = request.path_kwarg("author_pk").ok_or_else(ApiError::not_found)?;
        match action {
            Action::List => {
                let books: Vec<Value> = ["1", "2"].iter().map(|b| Self::book(author, b)).collect();
                Ok(ok(&books))
            }
            Action::Retrieve => {
                let book = request.path_kwarg("book_pk").ok_or_else(ApiError::not_found)?;
                Ok(ok(&Self::book(author, book)))
            }
            _ => Err(ApiError::method_not_allowed()),
        }
    }
}

impl Handler for BooksHandler {
    fn spec(&self) -> HandlerSpec {
        HandlerSpec::new("books").actions([Action::List, Action::Retrieve])
    }

    fn call(&self, action: Action, request: ApiRequest) -> BoxFuture<'_, ApiResult<Response>> {
        Box::pin(self.run(action, request))
    }
}

/// The caller's own profile; a singleton resource.
pub struct ProfileHandler;

impl ProfileHandler {
    async fn run(&self, action: Action, request: ApiRequest) -> ApiResult<Response> {
        let user = request.authenticated()?;
        match action {
            Action::Retrieve => Ok(ok(user)),
            Action::Update => {
                let mut profile = user.clone();
                if let (Some(target), Some(patch)) =
                    (profile.as_object_mut(), request.data().and_then(Value::as_object))
                {
                    target.extend(patch.clone());
                }
                Ok(ok(&profile))
            }
            _ => Err(ApiError::method_not_allowed()),
        }
    }
}

impl Handler for ProfileHandler {
    fn spec(&self) -> HandlerSpec {
        HandlerSpec::new("profile")
            .standalone(true)
            .actions([Action::Retrieve, Action::Update])
    }

    fn call(&self, action: Action, request: ApiRequest) -> BoxFuture<'_, ApiResult<Response>> {
        Box::pin(self.run(action, request))
    }
}

/// Liveness check mounted on a generic router.
pub struct HealthHandler;

impl HealthHandler {
    async fn run(&self, method: Method, request: ApiRequest) -> ApiResult<Response> {
        if method != Method::GET {
            return Err(ApiError::method_not_allowed());
        }
        Ok(ok(&json!({
            "status": request.t("ok", &[]),
            "version": env!("CARGO_PKG_VERSION"),
        })))
    }
}

impl Handler for HealthHandler {
    fn spec(&self) -> HandlerSpec {
        HandlerSpec::new("health")
    }

    fn handle(&self, method: Method, request: ApiRequest) -> BoxFuture<'_, ApiResult<Response>> {
        Box::pin(self.run(method, request))
    }
}

/// Routers for the demo API.
pub fn routers() -> RouterResult<(ResourceRouter, GenericRouter)> {
    let mut resources = ResourceRouter::default();
    resources.register("notes", Arc::new(NotesHandler::new()), None, Some("notes"))?;
    resources.register(["authors", "books"], Arc::new(BooksHandler), None, Some("books"))?;
    resources.register("profile", Arc::new(ProfileHandler), None, Some("profile"))?;

    let mut generic = GenericRouter::default();
    generic.register("health", Arc::new(HealthHandler), None, Some("health"));

    Ok((resources, generic))
}

/// Finalized demo route table.
pub fn routes(config: &PathConfig) -> RouterResult<Vec<RouteRule>> {
    let (resources, generic) = routers()?;
    let routers: [&dyn Router; 2] = [&resources, &generic];
    collect_routes(&routers, config)
}

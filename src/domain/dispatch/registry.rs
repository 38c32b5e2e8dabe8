//! Command registry - exact method + path routing.
//!
//! The registry is assembled once at startup through
//! [`CommandRegistryBuilder`] and is read-only afterwards. Lookups are a
//! single hash probe on the `(method, path)` pair; paths are literal
//! strings, never templates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::{CommandError, HandlerResult, HttpMethod, NormalizedRequest};

/// One logical operation behind a route.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Executes the command for a normalized request.
    async fn handle(&self, request: &NormalizedRequest) -> Result<HandlerResult, CommandError>;
}

/// Exact routing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: HttpMethod,
    path: String,
}

impl RouteKey {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Immutable pairing of a route key with its handler.
#[derive(Clone)]
pub struct CommandEntry {
    key: RouteKey,
    name: &'static str,
    handler: Arc<dyn CommandHandler>,
}

impl CommandEntry {
    pub fn key(&self) -> &RouteKey {
        &self.key
    }

    /// Command name used in logs.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Errors raised while assembling the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("route registered twice: {0}")]
    DuplicateRoute(RouteKey),

    #[error("route path must start with '/': {0}")]
    InvalidPath(String),
}

/// Read-only map from route key to command entry.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    entries: HashMap<RouteKey, CommandEntry>,
}

impl CommandRegistry {
    pub fn builder() -> CommandRegistryBuilder {
        CommandRegistryBuilder::default()
    }

    /// Finds the entry for an exact method + path.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::RouteNotFound` when nothing matches.
    pub fn route(&self, method: &HttpMethod, path: &str) -> Result<&CommandEntry, CommandError> {
        self.entries
            .get(&RouteKey::new(method.clone(), path))
            .ok_or_else(|| CommandError::RouteNotFound {
                method: method.clone(),
                path: path.to_string(),
            })
    }

    /// Routes a normalized request.
    pub fn route_request(&self, request: &NormalizedRequest) -> Result<&CommandEntry, CommandError> {
        self.route(request.method(), request.path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered route keys in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteKey> {
        self.entries.keys()
    }
}

/// Collects routes from the static table and validates them once.
#[derive(Default)]
pub struct CommandRegistryBuilder {
    entries: Vec<CommandEntry>,
}

impl CommandRegistryBuilder {
    /// Adds a route.
    pub fn register(
        mut self,
        method: HttpMethod,
        path: impl Into<String>,
        name: &'static str,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        self.entries.push(CommandEntry {
            key: RouteKey::new(method, path),
            name,
            handler,
        });
        self
    }

    /// Freezes the registry.
    ///
    /// # Errors
    ///
    /// Rejects duplicate keys and paths not starting with `/`.
    pub fn build(self) -> Result<CommandRegistry, RegistryError> {
        let mut entries = HashMap::with_capacity(self.entries.len());

        for entry in self.entries {
            if !entry.key.path.starts_with('/') {
                return Err(RegistryError::InvalidPath(entry.key.path));
            }
            if entries.contains_key(&entry.key) {
                return Err(RegistryError::DuplicateRoute(entry.key));
            }
            entries.insert(entry.key.clone(), entry);
        }

        Ok(CommandRegistry { entries })
    }
}

use std::collections::HashMap;
use std::fmt::Debug;

use serde_json::Value;

use crate::error::{JsonLdError, Result};

/// Resolves a remote context reference (a URL appearing as a string in
/// `@context`) to its document.
///
/// Context processing never performs network access itself; callers plug in a
/// loader that fetches, caches or bundles context documents as they see fit.
pub trait ContextLoader: Send + Sync + Debug {
    fn load_context(&self, url: &str) -> Result<Value>;
}

/// A [`ContextLoader`] backed by an in-memory map of URL to context document.
#[derive(Clone, Debug, Default)]
pub struct StaticContextLoader {
    contexts: HashMap<String, Value>,
}

impl StaticContextLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context document for a URL, replacing any previous entry.
    pub fn with_context(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.contexts.insert(url.into(), document);
    }
}

impl ContextLoader for StaticContextLoader {
    fn load_context(&self, url: &str) -> Result<Value> {
        self.contexts
            .get(url)
            .cloned()
            .ok_or_else(|| JsonLdError::remote_context(format!("no context registered for {url}")))
    }
}

/// Extract the context from a loaded document: the value of its `@context`
/// member when present, otherwise the document itself.
pub(crate) fn unwrap_context_document(url: &str, document: Value) -> Result<Value> {
    match document {
        Value::Object(mut map) => match map.remove("@context") {
            Some(inner) => Ok(inner),
            None => Ok(Value::Object(map)),
        },
        other => Err(JsonLdError::remote_context(format!(
            "context document at {url} is not an object: {other}"
        ))),
    }
}

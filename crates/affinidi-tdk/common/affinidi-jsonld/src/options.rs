/*!
 * JSON-LD processing options
 */

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;

use crate::context::loader::ContextLoader;
use crate::error::{JsonLdError, Result};
use crate::iri::is_absolute_iri;

const DEFAULT_MAX_DEPTH: usize = 512;

/// Read-only configuration threaded through every expansion and compaction call.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonLdOptions {
    /// Document base IRI used to resolve relative IRIs. Empty means no base.
    pub base: String,
    /// Reject ambiguous compaction of several lists onto one term
    pub processing_strict: bool,
    /// Replace single-element sequences by their element when compacting
    pub compact_arrays: bool,
    /// Give every expanded node object without `@id` a fresh blank node label
    pub produce_blank_node_ids: bool,
    /// Keys copied verbatim by both engines without interpretation
    pub ignored_keys: BTreeSet<String>,
    /// Maximum nesting depth of a processed document
    pub max_depth: usize,
    #[serde(skip)]
    pub context_loader: Option<Arc<dyn ContextLoader>>,
}

impl Default for JsonLdOptions {
    fn default() -> Self {
        JsonLdOptions {
            base: String::new(),
            processing_strict: false,
            compact_arrays: true,
            produce_blank_node_ids: false,
            ignored_keys: BTreeSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            context_loader: None,
        }
    }
}

impl JsonLdOptions {
    /// Returns a builder for `JsonLdOptions`
    /// Example:
    /// ```
    /// use affinidi_jsonld::JsonLdOptions;
    ///
    /// let options = JsonLdOptions::builder().build().unwrap();
    /// assert!(options.compact_arrays);
    /// ```
    pub fn builder() -> JsonLdOptionsBuilder {
        JsonLdOptionsBuilder::default()
    }

    pub(crate) fn base(&self) -> Option<&str> {
        if self.base.is_empty() {
            None
        } else {
            Some(&self.base)
        }
    }

    pub(crate) fn is_ignored(&self, key: &str) -> bool {
        self.ignored_keys.contains(key)
    }
}

/// Builder for `JsonLdOptions`.
/// Example:
/// ```
/// use affinidi_jsonld::JsonLdOptions;
///
/// let options = JsonLdOptions::builder()
///     .with_base("http://example.com/docs/")
///     .with_compact_arrays(false)
///     .build()
///     .unwrap();
/// assert_eq!(options.base, "http://example.com/docs/");
/// ```
#[derive(Debug)]
pub struct JsonLdOptionsBuilder {
    /// Document base IRI
    /// Default: none
    base: Option<String>,

    /// Strict list compaction
    /// Default: false
    processing_strict: bool,

    /// Array simplification during compaction
    /// Default: true
    compact_arrays: bool,

    /// Blank node labels for anonymous nodes during expansion
    /// Default: false
    produce_blank_node_ids: bool,

    ignored_keys: BTreeSet<String>,

    /// Default: 512
    max_depth: usize,

    /// Resolver for string `@context` references
    /// NOTE: without a loader any remote context reference is an error
    context_loader: Option<Arc<dyn ContextLoader>>,
}

impl Default for JsonLdOptionsBuilder {
    fn default() -> Self {
        JsonLdOptionsBuilder {
            base: None,
            processing_strict: false,
            compact_arrays: true,
            produce_blank_node_ids: false,
            ignored_keys: BTreeSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            context_loader: None,
        }
    }
}

impl JsonLdOptionsBuilder {
    pub fn new() -> JsonLdOptionsBuilder {
        JsonLdOptionsBuilder::default()
    }

    /// Build the `JsonLdOptions` from the builder
    /// Fails if a base IRI was given that is not absolute
    pub fn build(self) -> Result<JsonLdOptions> {
        let base = self.base.unwrap_or_default();
        if !base.is_empty() && !is_absolute_iri(&base) {
            return Err(JsonLdError::not_absolute(format!("base IRI '{base}'")));
        }

        Ok(JsonLdOptions {
            base,
            processing_strict: self.processing_strict,
            compact_arrays: self.compact_arrays,
            produce_blank_node_ids: self.produce_blank_node_ids,
            ignored_keys: self.ignored_keys,
            max_depth: self.max_depth,
            context_loader: self.context_loader,
        })
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_processing_strict(mut self, processing_strict: bool) -> Self {
        self.processing_strict = processing_strict;
        self
    }

    pub fn with_compact_arrays(mut self, compact_arrays: bool) -> Self {
        self.compact_arrays = compact_arrays;
        self
    }

    pub fn with_produce_blank_node_ids(mut self, produce_blank_node_ids: bool) -> Self {
        self.produce_blank_node_ids = produce_blank_node_ids;
        self
    }

    /// Add a key that both engines copy through untouched
    pub fn with_ignored_key(mut self, key: impl Into<String>) -> Self {
        self.ignored_keys.insert(key.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Provide a loader for remote `@context` references
    /// Example:
    /// ```
    /// use std::sync::Arc;
    /// use affinidi_jsonld::{JsonLdOptions, StaticContextLoader};
    /// use serde_json::json;
    ///
    /// let loader = StaticContextLoader::new()
    ///     .with_context("https://example.com/ctx", json!({"@context": {"ex": "http://example.com/"}}));
    /// let options = JsonLdOptions::builder()
    ///     .with_context_loader(Arc::new(loader))
    ///     .build()
    ///     .unwrap();
    /// assert!(options.context_loader.is_some());
    /// ```
    pub fn with_context_loader(mut self, loader: Arc<dyn ContextLoader>) -> Self {
        self.context_loader = Some(loader);
        self
    }
}

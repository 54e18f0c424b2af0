//! JSON-LD processing over [`serde_json::Value`] trees.
//!
//! * [`ActiveContext::process`] turns local `@context` values into term definitions
//! * [`expand_document`] removes the context, leaving absolute IRIs and explicit value objects
//! * [`compact_document`] applies a context to expanded data, choosing the best term per value

pub mod blank_node;
pub mod compact;
pub mod context;
pub mod error;
pub mod expand;
pub mod iri;
pub mod keywords;
pub mod options;
pub mod value;

pub use compact::{Compactor, compact_document, compact_iri};
pub use context::loader::{ContextLoader, StaticContextLoader};
pub use context::{ActiveContext, ContainerType, LanguageMapping, TermDefinition, TypeMapping};
pub use error::{JsonLdError, Result};
pub use expand::{Expander, expand_document};
pub use options::{JsonLdOptions, JsonLdOptionsBuilder};

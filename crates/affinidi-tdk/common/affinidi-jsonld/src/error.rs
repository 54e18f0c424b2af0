use std::fmt;

/// Errors that can occur during JSON-LD context processing, expansion or compaction.
///
/// Every error aborts the whole top-level call; no partial output is returned.
#[derive(Debug, thiserror::Error)]
pub enum JsonLdError {
    #[error("cyclical context definition: {0}")]
    CyclicalContextDefinition(String),

    #[error("invalid context entry: {0}")]
    InvalidContextEntry(String),

    #[error("missing @id in term definition: {0}")]
    MissingIdInTermDefinition(String),

    #[error("invalid @id value: {0}")]
    InvalidIdValue(String),

    #[error("invalid @type value: {0}")]
    InvalidTypeValue(String),

    #[error("invalid value object: {0}")]
    InvalidValueObject(String),

    #[error("invalid language-tagged string: {0}")]
    InvalidLanguageTaggedString(String),

    #[error("invalid @graph value: {0}")]
    InvalidGraphValue(String),

    #[error("invalid @set or @list object: {0}")]
    InvalidSetOrListObject(String),

    #[error("list of lists not permitted: {0}")]
    ListOfListsNotPermitted(String),

    #[error("IRI is not absolute: {0}")]
    IriNotAbsolute(String),

    #[error("ambiguous list compaction: {0}")]
    AmbiguousListCompaction(String),

    #[error("loading remote context failed: {0}")]
    LoadingRemoteContextFailed(String),

    #[error("recursive context inclusion: {0}")]
    RecursiveContextInclusion(String),

    #[error("document nesting exceeds the maximum depth of {0}")]
    RecursionLimitExceeded(usize),
}

/// Result type alias for JSON-LD operations.
pub type Result<T> = std::result::Result<T, JsonLdError>;

impl JsonLdError {
    pub fn context_entry(msg: impl fmt::Display) -> Self {
        Self::InvalidContextEntry(msg.to_string())
    }

    pub fn not_absolute(msg: impl fmt::Display) -> Self {
        Self::IriNotAbsolute(msg.to_string())
    }

    pub fn value_object(msg: impl fmt::Display) -> Self {
        Self::InvalidValueObject(msg.to_string())
    }

    pub fn list_of_lists(msg: impl fmt::Display) -> Self {
        Self::ListOfListsNotPermitted(msg.to_string())
    }

    pub fn remote_context(msg: impl fmt::Display) -> Self {
        Self::LoadingRemoteContextFailed(msg.to_string())
    }
}

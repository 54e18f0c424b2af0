pub mod loader;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{JsonLdError, Result};
use crate::iri::{is_absolute_iri, is_blank_node, resolve_base_relative};
use crate::keywords::{self, is_keyword};
use crate::options::JsonLdOptions;
use loader::unwrap_context_document;

/// Upper bound on term-to-term hops while resolving a single name.
const MAX_TERM_CHAIN: usize = 64;

/// A processed JSON-LD context: the resolution environment for one subtree of a document.
///
/// Contexts are never mutated once handed out. Processing a local context
/// clones the active one and returns the derived result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveContext {
    terms: BTreeMap<String, TermDefinition>,
    /// Keyword to the terms aliasing it, shortest then lexicographically least first.
    keyword_aliases: BTreeMap<String, Vec<String>>,
    pub vocab: Option<String>,
    pub base: Option<String>,
    pub default_language: Option<String>,
}

/// A single term definition within a JSON-LD context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermDefinition {
    /// Absolute IRI or keyword the term stands for.
    pub iri: String,
    pub type_mapping: Option<TypeMapping>,
    pub container: Option<ContainerType>,
    pub language: Option<LanguageMapping>,
}

impl TermDefinition {
    fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            type_mapping: None,
            container: None,
            language: None,
        }
    }

    /// True when the term places no type or language constraint on its values.
    pub fn is_unconstrained(&self) -> bool {
        self.type_mapping.is_none() && self.language.is_none()
    }
}

/// Type coercion applied to values of a term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeMapping {
    /// `"@type": "@id"`: string values are IRIs.
    Id,
    Datatype(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerType {
    #[serde(rename = "@list")]
    List,
    #[serde(rename = "@set")]
    Set,
    #[serde(rename = "@language")]
    Language,
}

/// Language override of a term; `NoLanguage` is an explicit `"@language": null`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageMapping {
    Tag(String),
    NoLanguage,
}

impl ActiveContext {
    /// A fresh context with no terms, resolving relative IRIs against `base`.
    pub fn new(base: Option<&str>) -> Self {
        Self {
            base: base.map(str::to_string),
            ..Self::default()
        }
    }

    /// Get the term definition for a given term name.
    pub fn get_term(&self, term: &str) -> Option<&TermDefinition> {
        self.terms.get(term)
    }

    /// Iterate over all term definitions in term order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &TermDefinition)> {
        self.terms.iter().map(|(term, def)| (term.as_str(), def))
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Terms currently aliasing `keyword`, preferred alias first.
    pub fn aliases(&self, keyword: &str) -> &[String] {
        self.keyword_aliases
            .get(keyword)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Container mapping of a term, if it has one.
    pub fn container(&self, term: &str) -> Option<&ContainerType> {
        self.terms.get(term).and_then(|def| def.container.as_ref())
    }

    /// The language applied to plain strings under `term`: the term's own
    /// mapping, else the context default.
    pub fn effective_language(&self, term: Option<&str>) -> Option<&str> {
        match term.and_then(|t| self.terms.get(t)).and_then(|def| def.language.as_ref()) {
            Some(LanguageMapping::Tag(tag)) => Some(tag.as_str()),
            Some(LanguageMapping::NoLanguage) => None,
            None => self.default_language.as_deref(),
        }
    }

    /// Resolve a term, compact IRI or relative IRI to an absolute IRI or keyword.
    ///
    /// `is_key` marks property keys, `is_type_value` values of `@type`; both
    /// may be resolved against the vocabulary mapping. Everything that is
    /// not a key may be resolved against the base IRI. Names that cannot be
    /// resolved are returned unchanged; callers check absoluteness.
    pub fn expand_iri(&self, name: &str, is_key: bool, is_type_value: bool) -> Result<String> {
        self.resolve_term(name, is_key, is_type_value, 0)
    }

    fn resolve_term(
        &self,
        name: &str,
        is_key: bool,
        is_type_value: bool,
        hops: usize,
    ) -> Result<String> {
        if let Some(def) = self.terms.get(name) {
            if def.iri == name {
                return Ok(name.to_string());
            }
            if hops >= MAX_TERM_CHAIN {
                return Err(JsonLdError::CyclicalContextDefinition(format!(
                    "term '{name}' does not resolve to an IRI"
                )));
            }
            return self.resolve_term(&def.iri, is_key, is_type_value, hops + 1);
        }

        if let Some((prefix, suffix)) = name.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Ok(name.to_string());
            }
            if self.terms.contains_key(prefix) {
                let prefix_iri = self.resolve_term(prefix, true, false, hops + 1)?;
                return Ok(format!("{prefix_iri}{suffix}"));
            }
            return Ok(name.to_string());
        }

        if is_keyword(name) {
            return Ok(name.to_string());
        }

        if (is_key || is_type_value)
            && let Some(vocab) = &self.vocab
        {
            return Ok(format!("{vocab}{name}"));
        }

        if !is_key && let Some(base) = &self.base {
            return Ok(resolve_base_relative(base, name));
        }

        Ok(name.to_string())
    }

    /// Process a local `@context` value (object, URL string, `null` or an
    /// array of those) and return the derived context.
    pub fn process(&self, local_context: &Value, options: &JsonLdOptions) -> Result<ActiveContext> {
        let mut result = self.clone();
        let mut remote_stack = Vec::new();
        result.process_fragments(local_context, options, &mut remote_stack)?;
        Ok(result)
    }

    fn process_fragments(
        &mut self,
        local_context: &Value,
        options: &JsonLdOptions,
        remote_stack: &mut Vec<String>,
    ) -> Result<()> {
        let fragments: Vec<&Value> = match local_context {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for fragment in fragments {
            match fragment {
                Value::Null => {
                    *self = ActiveContext::new(options.base());
                }
                Value::String(url) => {
                    self.process_remote(url, options, remote_stack)?;
                }
                Value::Object(map) => {
                    self.process_context_object(map)?;
                }
                other => {
                    return Err(JsonLdError::context_entry(format!(
                        "invalid @context value: {other}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn process_remote(
        &mut self,
        url: &str,
        options: &JsonLdOptions,
        remote_stack: &mut Vec<String>,
    ) -> Result<()> {
        let url = match &self.base {
            Some(base) => resolve_base_relative(base, url),
            None => url.to_string(),
        };
        if remote_stack.contains(&url) {
            return Err(JsonLdError::RecursiveContextInclusion(url));
        }

        let loader = options.context_loader.as_ref().ok_or_else(|| {
            JsonLdError::remote_context(format!("no context loader configured for {url}"))
        })?;
        tracing::debug!(url = %url, "loading remote context");
        let document = loader.load_context(&url)?;
        let context = unwrap_context_document(&url, document)?;

        remote_stack.push(url);
        self.process_fragments(&context, options, remote_stack)?;
        remote_stack.pop();
        Ok(())
    }

    fn process_context_object(&mut self, local: &Map<String, Value>) -> Result<()> {
        let mut definer = TermDefiner::new(self, local);

        // Context-wide settings first so term definitions observe them
        for key in [keywords::BASE, keywords::VOCAB, keywords::LANGUAGE] {
            if local.contains_key(key) {
                definer.define(key)?;
            }
        }
        for key in local.keys() {
            definer.define(key)?;
        }
        Ok(())
    }

    fn add_alias(&mut self, keyword: &str, term: &str) {
        let aliases = self.keyword_aliases.entry(keyword.to_string()).or_default();
        let probe = (term.len(), term);
        if let Err(pos) = aliases.binary_search_by(|alias| (alias.len(), alias.as_str()).cmp(&probe))
        {
            aliases.insert(pos, term.to_string());
        }
    }

    fn remove_term(&mut self, term: &str) {
        let Some(old) = self.terms.remove(term) else {
            return;
        };
        if is_keyword(&old.iri)
            && let Some(aliases) = self.keyword_aliases.get_mut(&old.iri)
        {
            aliases.retain(|alias| alias != term);
            if aliases.is_empty() {
                self.keyword_aliases.remove(&old.iri);
            }
        }
        tracing::debug!(term, "term definition removed");
    }

    fn install_term(&mut self, term: &str, def: TermDefinition) {
        self.remove_term(term);
        if is_keyword(&def.iri) {
            self.add_alias(&def.iri, term);
        }
        tracing::debug!(term, iri = %def.iri, "term defined");
        self.terms.insert(term.to_string(), def);
    }
}

/// Per-term progress while processing one local context object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DefinitionState {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

/// Defines the terms of one local context object into an active context,
/// resolving dependencies between them on demand.
struct TermDefiner<'a> {
    ctx: &'a mut ActiveContext,
    local: &'a Map<String, Value>,
    defined: HashMap<String, DefinitionState>,
}

impl<'a> TermDefiner<'a> {
    fn new(ctx: &'a mut ActiveContext, local: &'a Map<String, Value>) -> Self {
        Self {
            ctx,
            local,
            defined: HashMap::new(),
        }
    }

    fn define(&mut self, term: &str) -> Result<()> {
        match self.defined.get(term).copied().unwrap_or_default() {
            DefinitionState::Done => return Ok(()),
            DefinitionState::InProgress => {
                return Err(JsonLdError::CyclicalContextDefinition(format!(
                    "term '{term}'"
                )));
            }
            DefinitionState::NotStarted => {}
        }
        let local = self.local;
        let Some(value) = local.get(term) else {
            return Ok(());
        };
        self.defined
            .insert(term.to_string(), DefinitionState::InProgress);

        if let Some((prefix, _)) = term.split_once(':')
            && self.local.contains_key(prefix)
        {
            self.define(prefix)?;
        }

        match term {
            keywords::VOCAB => self.define_vocab(value)?,
            keywords::LANGUAGE => self.define_language(value)?,
            keywords::BASE => self.define_base(value)?,
            _ if is_keyword(term) => {
                return Err(JsonLdError::context_entry(format!(
                    "keyword '{term}' cannot be redefined"
                )));
            }
            _ => self.define_term(term, value)?,
        }

        self.defined.insert(term.to_string(), DefinitionState::Done);
        Ok(())
    }

    fn define_vocab(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.ctx.vocab = None,
            Value::String(vocab) if is_absolute_iri(vocab) || is_blank_node(vocab) => {
                self.ctx.vocab = Some(vocab.clone());
            }
            Value::String(vocab) => {
                return Err(JsonLdError::not_absolute(format!("@vocab '{vocab}'")));
            }
            other => {
                return Err(JsonLdError::context_entry(format!(
                    "@vocab must be a string or null: {other}"
                )));
            }
        }
        Ok(())
    }

    fn define_language(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.ctx.default_language = None,
            Value::String(language) => self.ctx.default_language = Some(language.clone()),
            other => {
                return Err(JsonLdError::context_entry(format!(
                    "@language must be a string or null: {other}"
                )));
            }
        }
        Ok(())
    }

    fn define_base(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.ctx.base = None,
            Value::String(base) if is_absolute_iri(base) => self.ctx.base = Some(base.clone()),
            Value::String(base) => match &self.ctx.base {
                Some(current) => self.ctx.base = Some(resolve_base_relative(current, base)),
                None => {
                    return Err(JsonLdError::not_absolute(format!(
                        "@base '{base}' without an absolute base to resolve against"
                    )));
                }
            },
            other => {
                return Err(JsonLdError::context_entry(format!(
                    "@base must be a string or null: {other}"
                )));
            }
        }
        Ok(())
    }

    fn define_term(&mut self, term: &str, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.ctx.remove_term(term),
            Value::Object(map) if map.get(keywords::ID) == Some(&Value::Null) => {
                self.ctx.remove_term(term)
            }
            Value::String(target) => {
                let iri = if is_keyword(target) {
                    target.clone()
                } else {
                    self.expand_local_iri(target, true, false)?
                };
                check_term_iri(term, &iri)?;
                self.ctx.install_term(term, TermDefinition::new(iri));
            }
            Value::Object(map) => {
                let def = self.expanded_term_definition(term, map)?;
                self.ctx.install_term(term, def);
            }
            other => {
                return Err(JsonLdError::context_entry(format!(
                    "invalid term definition for '{term}': {other}"
                )));
            }
        }
        Ok(())
    }

    fn expanded_term_definition(
        &mut self,
        term: &str,
        map: &Map<String, Value>,
    ) -> Result<TermDefinition> {
        let prefix = term.split_once(':');

        // A compact-IRI term starts from a copy of its prefix's definition
        let mut def = prefix
            .and_then(|(prefix, _)| self.ctx.get_term(prefix))
            .cloned()
            .unwrap_or_else(|| TermDefinition::new(""));

        def.iri = match map.get(keywords::ID) {
            Some(Value::String(id)) if id == keywords::TYPE => id.clone(),
            Some(Value::String(id)) => {
                let iri = if is_keyword(id) {
                    id.clone()
                } else {
                    self.expand_local_iri(id, true, false)?
                };
                check_term_iri(term, &iri)?;
                iri
            }
            Some(other) => {
                return Err(JsonLdError::context_entry(format!(
                    "@id of term '{term}' must be a string: {other}"
                )));
            }
            None => match prefix {
                Some(("_", _)) => term.to_string(),
                Some((_, suffix)) if suffix.starts_with("//") => term.to_string(),
                Some((prefix, suffix)) => match self.ctx.get_term(prefix) {
                    Some(parent) => format!("{}{suffix}", parent.iri),
                    None => term.to_string(),
                },
                None => match &self.ctx.vocab {
                    Some(vocab) => format!("{vocab}{term}"),
                    None => {
                        return Err(JsonLdError::MissingIdInTermDefinition(format!(
                            "term '{term}'"
                        )));
                    }
                },
            },
        };

        match map.get(keywords::TYPE) {
            None => {}
            Some(Value::String(coercion)) if coercion == keywords::ID => {
                def.type_mapping = Some(TypeMapping::Id);
            }
            Some(Value::String(coercion)) => {
                let iri = self.expand_local_iri(coercion, false, true)?;
                if !is_absolute_iri(&iri) && !is_blank_node(&iri) {
                    return Err(JsonLdError::not_absolute(format!(
                        "@type '{coercion}' of term '{term}'"
                    )));
                }
                def.type_mapping = Some(TypeMapping::Datatype(iri));
            }
            Some(other) => {
                return Err(JsonLdError::context_entry(format!(
                    "@type of term '{term}' must be a string: {other}"
                )));
            }
        }

        match map.get(keywords::CONTAINER) {
            None => {}
            Some(Value::Null) => def.container = None,
            Some(container) => {
                let container = serde_json::from_value(container.clone()).map_err(|_| {
                    JsonLdError::context_entry(format!(
                        "@container of term '{term}' must be @list, @set or @language: {container}"
                    ))
                })?;
                def.container = Some(container);
            }
        }

        match map.get(keywords::LANGUAGE) {
            None => {}
            Some(Value::Null) => def.language = Some(LanguageMapping::NoLanguage),
            Some(Value::String(tag)) => def.language = Some(LanguageMapping::Tag(tag.clone())),
            Some(other) => {
                return Err(JsonLdError::context_entry(format!(
                    "@language of term '{term}' must be a string or null: {other}"
                )));
            }
        }

        Ok(def)
    }

    /// Resolve `value` after defining any term of this local context it depends on.
    fn expand_local_iri(&mut self, value: &str, is_key: bool, is_type_value: bool) -> Result<String> {
        if !is_keyword(value) && self.local.contains_key(value) {
            self.define(value)?;
        }
        if let Some((prefix, _)) = value.split_once(':')
            && self.local.contains_key(prefix)
        {
            self.define(prefix)?;
        }
        self.ctx.expand_iri(value, is_key, is_type_value)
    }
}

fn check_term_iri(term: &str, iri: &str) -> Result<()> {
    if iri == keywords::CONTEXT || iri == keywords::PRESERVE {
        return Err(JsonLdError::context_entry(format!(
            "term '{term}' cannot alias {iri}"
        )));
    }
    if is_keyword(iri) || is_absolute_iri(iri) || is_blank_node(iri) {
        Ok(())
    } else {
        Err(JsonLdError::not_absolute(format!(
            "term '{term}' resolves to '{iri}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::loader::StaticContextLoader;
    use super::*;

    fn process(local: Value) -> Result<ActiveContext> {
        ActiveContext::default().process(&local, &JsonLdOptions::default())
    }

    #[test]
    fn simple_prefix_and_curie() {
        let ctx = process(json!({"ex": "http://example.com/"})).unwrap();
        assert_eq!(ctx.get_term("ex").unwrap().iri, "http://example.com/");
        assert_eq!(
            ctx.expand_iri("ex:name", true, false).unwrap(),
            "http://example.com/name"
        );
    }

    #[test]
    fn mutual_cycle_detected() {
        let err = process(json!({"a": "b:x", "b": "a:x"})).unwrap_err();
        assert!(matches!(err, JsonLdError::CyclicalContextDefinition(_)));
    }

    #[test]
    fn self_reference_detected() {
        let err = process(json!({"a": {"@id": "a:x"}})).unwrap_err();
        assert!(matches!(err, JsonLdError::CyclicalContextDefinition(_)));
    }

    #[test]
    fn dependent_terms_defined_out_of_order() {
        // "a" sorts before "z" but depends on it
        let ctx = process(json!({"a": "z:thing", "z": "http://z.example/"})).unwrap();
        assert_eq!(ctx.get_term("a").unwrap().iri, "http://z.example/thing");
    }

    #[test]
    fn keyword_aliases_sorted_by_length_then_lexically() {
        let ctx = process(json!({
            "identifier": "@id",
            "url": "@id",
            "id": "@id",
            "ab": "@id"
        }))
        .unwrap();
        assert_eq!(ctx.aliases("@id"), ["ab", "id", "url", "identifier"]);
        assert_eq!(ctx.expand_iri("url", true, false).unwrap(), "@id");
    }

    #[test]
    fn null_removes_term_and_alias() {
        let ctx = process(json!([{"id": "@id", "ex": "http://ex/"}, {"id": null, "ex": {"@id": null}}]))
            .unwrap();
        assert!(ctx.get_term("id").is_none());
        assert!(ctx.get_term("ex").is_none());
        assert!(ctx.aliases("@id").is_empty());
    }

    #[test]
    fn redefining_alias_drops_old_registration() {
        let ctx = process(json!([{"type": "@type"}, {"type": "http://ex/type"}])).unwrap();
        assert!(ctx.aliases("@type").is_empty());
        assert_eq!(ctx.get_term("type").unwrap().iri, "http://ex/type");
    }

    #[test]
    fn vocab_and_language() {
        let ctx = process(json!({"@vocab": "http://vocab/", "@language": "en"})).unwrap();
        assert_eq!(ctx.vocab.as_deref(), Some("http://vocab/"));
        assert_eq!(ctx.default_language.as_deref(), Some("en"));
        assert_eq!(ctx.expand_iri("knows", true, false).unwrap(), "http://vocab/knows");
        assert_eq!(ctx.expand_iri("Person", false, true).unwrap(), "http://vocab/Person");

        let cleared = ctx
            .process(&json!({"@vocab": null, "@language": null}), &JsonLdOptions::default())
            .unwrap();
        assert!(cleared.vocab.is_none());
        assert!(cleared.default_language.is_none());
    }

    #[test]
    fn vocab_must_be_absolute() {
        let err = process(json!({"@vocab": "relative/"})).unwrap_err();
        assert!(matches!(err, JsonLdError::IriNotAbsolute(_)));
        let err = process(json!({"@vocab": 5})).unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContextEntry(_)));
        let err = process(json!({"@language": true})).unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContextEntry(_)));
    }

    #[test]
    fn other_keywords_cannot_be_redefined() {
        let err = process(json!({"@id": "http://ex/id"})).unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContextEntry(_)));
    }

    #[test]
    fn context_keyword_cannot_be_aliased() {
        let err = process(json!({"ctx": "@context"})).unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContextEntry(_)));
    }

    #[test]
    fn relative_term_is_an_error() {
        let err = process(json!({"name": "relative"})).unwrap_err();
        assert!(matches!(err, JsonLdError::IriNotAbsolute(_)));
    }

    #[test]
    fn missing_id() {
        let err = process(json!({"name": {"@type": "@id"}})).unwrap_err();
        assert!(matches!(err, JsonLdError::MissingIdInTermDefinition(_)));

        let ctx = process(json!({"@vocab": "http://v/", "name": {"@type": "@id"}})).unwrap();
        let def = ctx.get_term("name").unwrap();
        assert_eq!(def.iri, "http://v/name");
        assert_eq!(def.type_mapping, Some(TypeMapping::Id));
    }

    #[test]
    fn expanded_definition_fields() {
        let ctx = process(json!({
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "age": {"@id": "http://ex/age", "@type": "xsd:integer"},
            "tags": {"@id": "http://ex/tags", "@container": "@set"},
            "label": {"@id": "http://ex/label", "@container": "@language"},
            "title": {"@id": "http://ex/title", "@language": null},
            "kind": {"@id": "@type"}
        }))
        .unwrap();
        assert_eq!(
            ctx.get_term("age").unwrap().type_mapping,
            Some(TypeMapping::Datatype(
                "http://www.w3.org/2001/XMLSchema#integer".to_string()
            ))
        );
        assert_eq!(ctx.container("tags"), Some(&ContainerType::Set));
        assert_eq!(ctx.container("label"), Some(&ContainerType::Language));
        assert_eq!(
            ctx.get_term("title").unwrap().language,
            Some(LanguageMapping::NoLanguage)
        );
        assert_eq!(ctx.aliases("@type"), ["kind"]);
    }

    #[test]
    fn invalid_container_rejected() {
        let err = process(json!({"a": {"@id": "http://ex/a", "@container": "@index"}})).unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContextEntry(_)));
        let err = process(json!({"a": 42})).unwrap_err();
        assert!(matches!(err, JsonLdError::InvalidContextEntry(_)));
    }

    #[test]
    fn curie_term_inherits_prefix_definition() {
        let ctx = process(json!({
            "ex": {"@id": "http://ex/", "@type": "@id"},
            "ex:list": {"@container": "@list"}
        }))
        .unwrap();
        let def = ctx.get_term("ex:list").unwrap();
        assert_eq!(def.iri, "http://ex/list");
        assert_eq!(def.type_mapping, Some(TypeMapping::Id));
        assert_eq!(def.container, Some(ContainerType::List));
    }

    #[test]
    fn term_chains_resolve() {
        let ctx = process(json!([
            {"ex": "http://ex/"},
            {"name": "ex:name"},
            {"fullName": "name"}
        ]))
        .unwrap();
        assert_eq!(ctx.get_term("fullName").unwrap().iri, "http://ex/name");
    }

    #[test]
    fn values_resolve_against_base() {
        let ctx = ActiveContext::new(Some("http://example.com/docs/"));
        assert_eq!(
            ctx.expand_iri("../img.png", false, false).unwrap(),
            "http://example.com/img.png"
        );
        // keys never use the base
        assert_eq!(ctx.expand_iri("name", true, false).unwrap(), "name");
    }

    #[test]
    fn base_in_context() {
        let ctx = ActiveContext::new(Some("http://example.com/a/"))
            .process(&json!({"@base": "b/"}), &JsonLdOptions::default())
            .unwrap();
        assert_eq!(ctx.base.as_deref(), Some("http://example.com/a/b/"));
    }

    #[test]
    fn null_fragment_resets() {
        let options = JsonLdOptions::builder()
            .with_base("http://example.com/")
            .build()
            .unwrap();
        let ctx = ActiveContext::new(options.base())
            .process(&json!([{"ex": "http://ex/"}, null, {"@vocab": "http://v/"}]), &options)
            .unwrap();
        assert!(ctx.get_term("ex").is_none());
        assert_eq!(ctx.vocab.as_deref(), Some("http://v/"));
        assert_eq!(ctx.base.as_deref(), Some("http://example.com/"));
    }

    #[test]
    fn later_fragments_override_earlier() {
        let ctx = process(json!([{"a": "http://one/"}, {"a": "http://two/"}])).unwrap();
        assert_eq!(ctx.get_term("a").unwrap().iri, "http://two/");
    }

    #[test]
    fn processing_never_mutates_the_source_context() {
        let base = process(json!({"a": "http://one/"})).unwrap();
        let derived = base
            .process(&json!({"a": null}), &JsonLdOptions::default())
            .unwrap();
        assert!(base.get_term("a").is_some());
        assert!(derived.get_term("a").is_none());
    }

    #[test]
    fn remote_contexts_through_loader() {
        let loader = StaticContextLoader::new()
            .with_context("http://ctx/one", json!({"@context": {"ex": "http://ex/"}}))
            .with_context("http://ctx/loop", json!({"@context": ["http://ctx/loop"]}));
        let options = JsonLdOptions::builder()
            .with_context_loader(Arc::new(loader))
            .build()
            .unwrap();

        let ctx = ActiveContext::default()
            .process(&json!("http://ctx/one"), &options)
            .unwrap();
        assert_eq!(ctx.get_term("ex").unwrap().iri, "http://ex/");

        let err = ActiveContext::default()
            .process(&json!("http://ctx/loop"), &options)
            .unwrap_err();
        assert!(matches!(err, JsonLdError::RecursiveContextInclusion(_)));
    }

    #[test]
    fn remote_context_without_loader() {
        let err = process(json!("http://ctx/one")).unwrap_err();
        assert!(matches!(err, JsonLdError::LoadingRemoteContextFailed(_)));
    }
}

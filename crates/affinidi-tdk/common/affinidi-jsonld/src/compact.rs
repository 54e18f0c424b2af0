use serde_json::{Map, Value};

use crate::context::{ActiveContext, ContainerType, LanguageMapping, TermDefinition, TypeMapping};
use crate::error::{JsonLdError, Result};
use crate::expand::expand_document;
use crate::keywords::{self, is_keyword};
use crate::options::JsonLdOptions;
use crate::value::{as_slice, into_vec, is_list_object, is_node_reference, is_value_object};

/// Compact a JSON-LD document against `context`.
///
/// The input is expanded first, so both compact and already-expanded
/// documents are accepted. `context` may be a bare context value or a
/// `{"@context": ...}` wrapper; it is echoed into the result unless empty.
pub fn compact_document(input: &Value, context: &Value, options: &JsonLdOptions) -> Result<Value> {
    let local_context = match context {
        Value::Object(map) if map.contains_key(keywords::CONTEXT) => &map[keywords::CONTEXT],
        other => other,
    };

    let expanded = expand_document(input, options)?;
    let active = ActiveContext::new(options.base()).process(local_context, options)?;
    let compacted = Compactor::new(options).compact(&active, None, &expanded)?;

    let mut result = match compacted {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        Value::Array(items) if items.is_empty() => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert(
                compact_iri(&active, keywords::GRAPH, None, true),
                Value::Array(into_vec(other)),
            );
            map
        }
    };

    let has_context = match local_context {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    };
    if has_context {
        result.insert(keywords::CONTEXT.to_string(), local_context.clone());
    }

    Ok(Value::Object(result))
}

/// Recursive-descent compaction of expanded JSON-LD.
pub struct Compactor<'a> {
    options: &'a JsonLdOptions,
}

impl<'a> Compactor<'a> {
    pub fn new(options: &'a JsonLdOptions) -> Self {
        Self { options }
    }

    /// Compact `element`, the value of `property` (a term, keyword or `None` at the top level).
    pub fn compact(
        &self,
        context: &ActiveContext,
        property: Option<&str>,
        element: &Value,
    ) -> Result<Value> {
        self.compact_element(context, property, element, 0)
    }

    fn compact_element(
        &self,
        context: &ActiveContext,
        property: Option<&str>,
        element: &Value,
        depth: usize,
    ) -> Result<Value> {
        if depth > self.options.max_depth {
            return Err(JsonLdError::RecursionLimitExceeded(self.options.max_depth));
        }
        match element {
            Value::Array(items) => {
                let mut result = Vec::with_capacity(items.len());
                for item in items {
                    let compacted = self.compact_element(context, property, item, depth + 1)?;
                    if !compacted.is_null() {
                        result.push(compacted);
                    }
                }
                let container = property.and_then(|p| context.container(p));
                if self.options.compact_arrays
                    && result.len() == 1
                    && !matches!(container, Some(ContainerType::List | ContainerType::Set))
                {
                    return Ok(result.remove(0));
                }
                Ok(Value::Array(result))
            }
            Value::Object(map) if is_value_object(element) => {
                Ok(compact_value(context, property, map))
            }
            Value::Object(map) => {
                if is_node_reference(element)
                    && let Some(Value::String(id)) = map.get(keywords::ID)
                    && self.references_as_strings(context, property)?
                {
                    return Ok(Value::String(compact_id(context, id)));
                }
                self.compact_object(context, map, depth)
            }
            other => Ok(other.clone()),
        }
    }

    /// Node references under an IRI-coerced term or `@graph` compact to bare IRI strings.
    fn references_as_strings(&self, context: &ActiveContext, property: Option<&str>) -> Result<bool> {
        let Some(property) = property else {
            return Ok(false);
        };
        let coerces_to_id = context
            .get_term(property)
            .is_some_and(|def| def.type_mapping == Some(TypeMapping::Id));
        Ok(coerces_to_id || context.expand_iri(property, true, false)? == keywords::GRAPH)
    }

    fn compact_object(
        &self,
        context: &ActiveContext,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Value> {
        let mut result: Map<String, Value> = Map::new();

        for (key, value) in map {
            if self.options.is_ignored(key) {
                result.insert(key.clone(), value.clone());
                continue;
            }

            match key.as_str() {
                keywords::ID => {
                    let alias = compact_iri(context, keywords::ID, None, true);
                    let id = match value {
                        Value::String(id) => Value::String(compact_id(context, id)),
                        other => other.clone(),
                    };
                    result.insert(alias, id);
                }
                keywords::TYPE => {
                    let alias = compact_iri(context, keywords::TYPE, None, true);
                    let mut types: Vec<Value> = as_slice(value)
                        .iter()
                        .map(|datatype| match datatype {
                            Value::String(iri) => Value::String(compact_iri(context, iri, None, true)),
                            other => other.clone(),
                        })
                        .collect();
                    let types = if self.options.compact_arrays && types.len() == 1 {
                        types.remove(0)
                    } else {
                        Value::Array(types)
                    };
                    result.insert(alias, types);
                }
                keyword if is_keyword(keyword) => {
                    let alias = compact_iri(context, keyword, None, true);
                    let compacted = self.compact_element(context, Some(keyword), value, depth + 1)?;
                    result.insert(alias, compacted);
                }
                _ => self.compact_property(context, &mut result, key, value, depth)?,
            }
        }

        Ok(Value::Object(result))
    }

    /// Compact the values of one expanded property, choosing a term per value.
    fn compact_property(
        &self,
        context: &ActiveContext,
        result: &mut Map<String, Value>,
        iri: &str,
        value: &Value,
        depth: usize,
    ) -> Result<()> {
        let items = as_slice(value);
        if items.is_empty() {
            let term = compact_iri(context, iri, None, true);
            result
                .entry(term)
                .or_insert_with(|| Value::Array(Vec::new()));
            return Ok(());
        }

        for item in items {
            let term = compact_iri(context, iri, Some(item), true);
            let container = context.container(&term).cloned();
            let as_array = !self.options.compact_arrays
                || matches!(container, Some(ContainerType::List | ContainerType::Set));

            if container == Some(ContainerType::Language)
                && let Some((tag, text)) = language_tagged(item)
            {
                let entry = result
                    .entry(term)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(by_language) = entry {
                    add_value(by_language, tag, text.clone(), !self.options.compact_arrays);
                }
                continue;
            }

            let Some(list) = item.as_object().and_then(|map| map.get(keywords::LIST)) else {
                let compacted = self.compact_element(context, Some(&term), item, depth + 1)?;
                add_value(result, &term, compacted, as_array);
                continue;
            };

            let compacted = self.compact_element(context, Some(&term), list, depth + 1)?;
            let members = into_vec(compacted);

            if container == Some(ContainerType::List) {
                match result.get_mut(&term) {
                    Some(existing) => {
                        self.ambiguous_list(&term)?;
                        if let Value::Array(existing) = existing {
                            existing.extend(members);
                        }
                    }
                    None => {
                        result.insert(term, Value::Array(members));
                    }
                }
                continue;
            }

            let list_alias = compact_iri(context, keywords::LIST, None, true);
            let already_has_list = result.get(&term).is_some_and(|existing| {
                as_slice(existing).iter().any(|entry| {
                    entry
                        .as_object()
                        .is_some_and(|map| map.contains_key(&list_alias))
                })
            });
            if already_has_list {
                self.ambiguous_list(&term)?;
            }

            let mut wrapped = Map::new();
            wrapped.insert(list_alias, Value::Array(members));
            add_value(result, &term, Value::Object(wrapped), as_array);
        }
        Ok(())
    }

    fn ambiguous_list(&self, term: &str) -> Result<()> {
        if self.options.processing_strict {
            return Err(JsonLdError::AmbiguousListCompaction(format!(
                "more than one list compacts to term '{term}'"
            )));
        }
        tracing::warn!(term, "merging more than one list onto a single term");
        Ok(())
    }
}

/// Compact a value object to a bare scalar when the term's coercion makes
/// the annotations redundant.
fn compact_value(context: &ActiveContext, property: Option<&str>, map: &Map<String, Value>) -> Value {
    let value = &map[keywords::VALUE];
    let term = property.and_then(|p| context.get_term(p));
    let language = context.effective_language(property);

    if map.len() == 1 {
        if value.is_string() && language.is_some() {
            let mut wrapped = Map::new();
            wrapped.insert(compact_iri(context, keywords::VALUE, None, true), value.clone());
            return Value::Object(wrapped);
        }
        return value.clone();
    }

    if let Some(Value::String(datatype)) = map.get(keywords::TYPE)
        && let Some(TypeMapping::Datatype(coerced)) = term.and_then(|def| def.type_mapping.as_ref())
        && datatype == coerced
    {
        return value.clone();
    }

    if let Some(Value::String(tag)) = map.get(keywords::LANGUAGE)
        && language == Some(tag.as_str())
    {
        return value.clone();
    }

    let mut result = Map::new();
    for (key, entry) in map {
        let alias = compact_iri(context, key, None, true);
        let entry = match (key.as_str(), entry) {
            (keywords::TYPE, Value::String(datatype)) => {
                Value::String(compact_iri(context, datatype, None, true))
            }
            _ => entry.clone(),
        };
        result.insert(alias, entry);
    }
    Value::Object(result)
}

/// Select the best term, compact IRI or vocabulary-relative name for `iri`.
///
/// `value` is the expanded value the name will carry (`None` for `@id` and
/// `@type` positions). `is_key` marks property and type positions, which try
/// the vocabulary mapping before synthesizing compact IRIs; other positions
/// try compact IRIs first.
pub fn compact_iri(context: &ActiveContext, iri: &str, value: Option<&Value>, is_key: bool) -> String {
    select_name(context, iri, value, is_key, true)
}

/// Compact an `@id` value. Node identifiers never resolve against the
/// vocabulary mapping, so no vocabulary-relative name is produced.
fn compact_id(context: &ActiveContext, id: &str) -> String {
    select_name(context, id, None, false, false)
}

fn select_name(
    context: &ActiveContext,
    iri: &str,
    value: Option<&Value>,
    is_key: bool,
    vocab_relative_allowed: bool,
) -> String {
    if is_keyword(iri) {
        return context
            .aliases(iri)
            .first()
            .cloned()
            .unwrap_or_else(|| iri.to_string());
    }

    let value_is_list = value.is_some_and(is_list_object);
    let mut candidates: Vec<String> = Vec::new();
    let mut highest_rank = 0;
    let mut list_container = false;

    for (term, def) in context.terms() {
        if def.iri != iri {
            continue;
        }
        let container = def.container.as_ref();
        if value_is_list && container == Some(&ContainerType::Set) {
            continue;
        }
        if !value_is_list && value.is_some() && container == Some(&ContainerType::List) {
            continue;
        }
        if list_container && container != Some(&ContainerType::List) {
            continue;
        }
        // Language maps can only hold language-tagged strings
        if container == Some(&ContainerType::Language)
            && value.is_some_and(|value| language_tagged(value).is_none())
        {
            continue;
        }

        let mut rank = rank_term(context, def, value);
        tracing::trace!(term, rank, iri, "ranked term");
        if rank == 0 {
            continue;
        }
        if container == Some(&ContainerType::Set) {
            rank += 1;
        }

        if !list_container && value_is_list && container == Some(&ContainerType::List) {
            list_container = true;
            candidates.clear();
            highest_rank = rank;
            candidates.push(term.to_string());
        } else if rank >= highest_rank {
            if rank > highest_rank {
                candidates.clear();
                highest_rank = rank;
            }
            candidates.push(term.to_string());
        }
    }

    if candidates.is_empty() {
        let vocab_suffix = || {
            vocab_relative_allowed
                .then(|| vocab_relative(context, iri))
                .flatten()
        };
        if is_key {
            if let Some(suffix) = vocab_suffix() {
                return suffix;
            }
            candidates = compact_iri_candidates(context, iri);
        } else {
            candidates = compact_iri_candidates(context, iri);
            if candidates.is_empty()
                && let Some(suffix) = vocab_suffix()
            {
                return suffix;
            }
        }
    }

    candidates
        .into_iter()
        .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
        .unwrap_or_else(|| iri.to_string())
}

/// How well `def` fits `value`; 0 means the term must not be used.
pub fn rank_term(context: &ActiveContext, def: &TermDefinition, value: Option<&Value>) -> u32 {
    let Some(value) = value else {
        return 3;
    };

    if let Some(list) = value.as_object().and_then(|map| map.get(keywords::LIST)) {
        let items = as_slice(list);
        if items.is_empty() {
            return u32::from(def.container == Some(ContainerType::List));
        }
        return items
            .iter()
            .map(|item| rank_term(context, def, Some(item)))
            .sum();
    }

    let unconstrained = def.is_unconstrained();

    let Some(map) = value
        .as_object()
        .filter(|map| map.contains_key(keywords::VALUE))
    else {
        // Node objects and references
        return if def.type_mapping == Some(TypeMapping::Id) {
            3
        } else {
            u32::from(unconstrained)
        };
    };

    if let Some(datatype) = map.get(keywords::TYPE) {
        return match &def.type_mapping {
            Some(TypeMapping::Datatype(coerced)) if datatype.as_str() == Some(coerced.as_str()) => 3,
            _ => u32::from(unconstrained),
        };
    }

    if !map[keywords::VALUE].is_string() {
        return match (&def.type_mapping, &def.language) {
            (None, None) => 2,
            (None, Some(_)) => 1,
            _ => 0,
        };
    }

    match map.get(keywords::LANGUAGE).and_then(Value::as_str) {
        None => {
            let explicit_none = def.language == Some(LanguageMapping::NoLanguage);
            if explicit_none || (unconstrained && context.default_language.is_none()) {
                3
            } else {
                u32::from(unconstrained)
            }
        }
        Some(tag) => {
            let term_match = matches!(&def.language, Some(LanguageMapping::Tag(own)) if own == tag);
            let default_match = unconstrained && context.default_language.as_deref() == Some(tag);
            if term_match || default_match {
                3
            } else {
                u32::from(unconstrained)
            }
        }
    }
}

/// The tag and text of a language-tagged string value object.
fn language_tagged(value: &Value) -> Option<(&str, &Value)> {
    let map = value.as_object()?;
    let text = map.get(keywords::VALUE).filter(|text| text.is_string())?;
    let tag = map.get(keywords::LANGUAGE)?.as_str()?;
    (map.len() == 2).then_some((tag, text))
}

/// `iri` relative to the vocabulary mapping, unless the suffix would be read
/// back as a term or compact IRI.
fn vocab_relative(context: &ActiveContext, iri: &str) -> Option<String> {
    let vocab = context.vocab.as_deref()?;
    let suffix = iri.strip_prefix(vocab)?;
    if suffix.is_empty() || suffix.contains(':') || context.has_term(suffix) {
        return None;
    }
    Some(suffix.to_string())
}

/// Compact IRIs for `iri` built from every prefix-like term (no colon, IRI
/// ending in `/` or `#`) that does not collide with a defined term.
fn compact_iri_candidates(context: &ActiveContext, iri: &str) -> Vec<String> {
    context
        .terms()
        .filter(|(term, def)| {
            !term.contains(':')
                && (def.iri.ends_with('/') || def.iri.ends_with('#'))
                && iri.len() > def.iri.len()
                && iri.starts_with(def.iri.as_str())
        })
        .map(|(term, def)| format!("{term}:{}", &iri[def.iri.len()..]))
        .filter(|curie| !context.has_term(curie))
        .collect()
}

/// Store a compacted value under `term`, growing an existing entry into a sequence.
fn add_value(result: &mut Map<String, Value>, term: &str, value: Value, as_array: bool) {
    match result.get_mut(term) {
        Some(existing) => {
            if !existing.is_array() {
                *existing = Value::Array(vec![existing.take()]);
            }
            if let Value::Array(items) = existing {
                items.push(value);
            }
        }
        None => {
            let value = if as_array && !value.is_array() {
                Value::Array(vec![value])
            } else {
                value
            };
            result.insert(term.to_string(), value);
        }
    }
}

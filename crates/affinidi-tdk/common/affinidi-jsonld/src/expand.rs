use serde_json::{Map, Value, json};

use crate::blank_node::BlankNodeIssuer;
use crate::context::{ActiveContext, ContainerType, TypeMapping};
use crate::error::{JsonLdError, Result};
use crate::iri::{is_absolute_iri, is_blank_node};
use crate::keywords::{self, is_keyword};
use crate::options::JsonLdOptions;
use crate::value::{as_slice, into_vec, is_list_object};

/// Expand a JSON-LD document to its expanded form.
///
/// The expanded form has all terms replaced with absolute IRIs, all context
/// processing resolved, and all values in a normalized array/object structure.
/// The result is always a sequence of node objects.
pub fn expand_document(document: &Value, options: &JsonLdOptions) -> Result<Value> {
    let context = ActiveContext::new(options.base());
    let mut expander = Expander::new(options);
    let result = expander.expand(&context, None, document)?;

    // A top-level object holding only @graph stands for the graph contents
    let result = match result {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(keywords::GRAPH) => {
            map.remove(keywords::GRAPH).unwrap_or(Value::Null)
        }
        other => other,
    };

    match result {
        Value::Array(_) => Ok(result),
        Value::Null => Ok(json!([])),
        _ => Ok(json!([result])),
    }
}

/// Recursive-descent expansion over one document.
///
/// Holds the per-call state: the options in force and, when blank node
/// identifiers are produced, the issuer handing them out.
pub struct Expander<'a> {
    options: &'a JsonLdOptions,
    issuer: Option<BlankNodeIssuer>,
}

impl<'a> Expander<'a> {
    pub fn new(options: &'a JsonLdOptions) -> Self {
        Self {
            options,
            issuer: options
                .produce_blank_node_ids
                .then(BlankNodeIssuer::default),
        }
    }

    /// Expand `element` as the value of `active_property` (`None` at the top level).
    ///
    /// Returns `Value::Null` when the element expands to nothing.
    pub fn expand(
        &mut self,
        context: &ActiveContext,
        active_property: Option<&str>,
        element: &Value,
    ) -> Result<Value> {
        self.expand_element(context, active_property, element, 0)
    }

    fn expand_element(
        &mut self,
        context: &ActiveContext,
        active_property: Option<&str>,
        element: &Value,
        depth: usize,
    ) -> Result<Value> {
        if depth > self.options.max_depth {
            return Err(JsonLdError::RecursionLimitExceeded(self.options.max_depth));
        }
        match element {
            Value::Array(items) => self.expand_array(context, active_property, items, depth),
            Value::Object(map) => self.expand_object(context, active_property, map, depth, true),
            scalar => self.expand_value(context, active_property, scalar),
        }
    }

    fn expand_array(
        &mut self,
        context: &ActiveContext,
        active_property: Option<&str>,
        items: &[Value],
        depth: usize,
    ) -> Result<Value> {
        let in_list = active_property.is_some_and(|property| {
            property == keywords::LIST
                || context.container(property) == Some(&ContainerType::List)
        });

        let mut result = Vec::new();
        for item in items {
            let expanded = self.expand_element(context, active_property, item, depth + 1)?;
            if in_list && (expanded.is_array() || is_list_object(&expanded)) {
                return Err(JsonLdError::list_of_lists(format!(
                    "nested list under '{}'",
                    active_property.unwrap_or_default()
                )));
            }
            match expanded {
                Value::Null => {}
                Value::Array(inner) => result.extend(inner),
                other => result.push(other),
            }
        }
        Ok(Value::Array(result))
    }

    fn expand_object(
        &mut self,
        parent_context: &ActiveContext,
        active_property: Option<&str>,
        map: &Map<String, Value>,
        depth: usize,
        language_maps: bool,
    ) -> Result<Value> {
        if language_maps
            && let Some(property) = active_property
            && parent_context.container(property) == Some(&ContainerType::Language)
        {
            return self.expand_language_map(parent_context, property, map, depth);
        }

        let scoped;
        let context = match map.get(keywords::CONTEXT) {
            Some(local) => {
                scoped = parent_context.process(local, self.options)?;
                &scoped
            }
            None => parent_context,
        };

        let mut result: Map<String, Value> = Map::new();

        for (key, value) in map {
            if key == keywords::CONTEXT {
                continue;
            }
            if self.options.is_ignored(key) {
                result.insert(key.clone(), value.clone());
                continue;
            }

            let property = context.expand_iri(key, true, false)?;
            if !is_keyword(&property) && !is_absolute_iri(&property) && !is_blank_node(&property) {
                tracing::debug!(key, "dropping key that does not expand to an absolute IRI");
                continue;
            }
            if value.is_null() && property != keywords::VALUE {
                continue;
            }

            let expanded = match property.as_str() {
                keywords::ID => {
                    if !value.is_string() {
                        return Err(JsonLdError::InvalidIdValue(value.to_string()));
                    }
                    self.expand_element(context, Some(key), value, depth + 1)?
                }
                keywords::TYPE => {
                    validate_type_value(context, value)?;
                    let types = self.expand_element(context, Some(key), value, depth + 1)?;
                    simplify_type_references(types)
                }
                keywords::VALUE => {
                    if value.is_array() || value.is_object() {
                        return Err(JsonLdError::value_object(format!(
                            "@value must be a scalar: {value}"
                        )));
                    }
                    value.clone()
                }
                keywords::LANGUAGE => {
                    if !value.is_string() {
                        return Err(JsonLdError::InvalidLanguageTaggedString(format!(
                            "@language must be a string: {value}"
                        )));
                    }
                    value.clone()
                }
                keywords::GRAPH => {
                    if !value.is_array() && !value.is_object() {
                        return Err(JsonLdError::InvalidGraphValue(value.to_string()));
                    }
                    self.expand_element(context, Some(key), value, depth + 1)?
                }
                keywords::LIST => {
                    Value::Array(self.expand_list_items(context, active_property, value, depth)?)
                }
                keywords::SET => self.expand_element(context, active_property, value, depth + 1)?,
                _ if is_keyword(&property) => {
                    self.expand_element(context, Some(key), value, depth + 1)?
                }
                _ => {
                    let expanded = self.expand_element(context, Some(key), value, depth + 1)?;
                    if context.container(key) == Some(&ContainerType::List)
                        && !expanded.is_null()
                        && !is_list_object(&expanded)
                    {
                        json!({"@list": into_vec(expanded)})
                    } else {
                        expanded
                    }
                }
            };

            if expanded.is_null() && property != keywords::VALUE {
                continue;
            }
            add_expanded_value(&mut result, property, expanded);
        }

        self.finish_object(active_property, context, result)
    }

    /// Validate the accumulated entries of one expanded object and shape the result.
    fn finish_object(
        &mut self,
        active_property: Option<&str>,
        context: &ActiveContext,
        mut result: Map<String, Value>,
    ) -> Result<Value> {
        let interpreted = |key: &String| !self.options.is_ignored(key);

        if result.contains_key(keywords::VALUE) {
            let has_type = result.contains_key(keywords::TYPE);
            let has_language = result.contains_key(keywords::LANGUAGE);
            let extra = result
                .keys()
                .filter(|key| interpreted(*key))
                .any(|key| key != keywords::VALUE && key != keywords::TYPE && key != keywords::LANGUAGE);
            if extra || (has_type && has_language) {
                return Err(JsonLdError::value_object(format!(
                    "@value may only be combined with one of @type or @language: {}",
                    Value::Object(result)
                )));
            }
            if let Some(datatype) = result.get(keywords::TYPE)
                && !datatype.is_string()
            {
                return Err(JsonLdError::InvalidTypeValue(format!(
                    "@type of a value object must be a string: {datatype}"
                )));
            }
            let value = &result[keywords::VALUE];
            if value.is_null() {
                return Ok(Value::Null);
            }
            if has_language && !value.is_string() {
                return Err(JsonLdError::InvalidLanguageTaggedString(format!(
                    "@language requires a string @value: {value}"
                )));
            }
            return Ok(Value::Object(result));
        }

        if let Some(types) = result.get_mut(keywords::TYPE)
            && !types.is_array()
        {
            *types = Value::Array(vec![types.take()]);
        }

        for container in [keywords::SET, keywords::LIST] {
            if result.contains_key(container) {
                let others = result
                    .keys()
                    .filter(|key| interpreted(*key))
                    .any(|key| key != container);
                if others {
                    return Err(JsonLdError::InvalidSetOrListObject(format!(
                        "{container} must be the only key: {}",
                        Value::Object(result)
                    )));
                }
                if container == keywords::SET {
                    return Ok(result.remove(keywords::SET).unwrap_or(Value::Null));
                }
                return Ok(Value::Object(result));
            }
        }

        if result.len() == 1 && result.contains_key(keywords::LANGUAGE) {
            return Ok(Value::Null);
        }

        // Free-floating nodes without properties carry no information
        let free_floating = match active_property {
            Some(property) => context.expand_iri(property, true, false)? == keywords::GRAPH,
            None => true,
        };
        if free_floating
            && (result.is_empty() || (result.len() == 1 && result.contains_key(keywords::ID)))
        {
            return Ok(Value::Null);
        }

        let in_type_position = match active_property {
            Some(property) => context.expand_iri(property, true, false)? == keywords::TYPE,
            None => false,
        };
        let top_level_graph =
            active_property.is_none() && result.len() == 1 && result.contains_key(keywords::GRAPH);
        if !in_type_position
            && !top_level_graph
            && !result.contains_key(keywords::ID)
            && let Some(issuer) = self.issuer.as_mut()
        {
            result.insert(keywords::ID.to_string(), Value::String(issuer.fresh()));
        }

        Ok(Value::Object(result))
    }

    /// Expand the members of a `@list` value, rejecting nested lists.
    fn expand_list_items(
        &mut self,
        context: &ActiveContext,
        active_property: Option<&str>,
        value: &Value,
        depth: usize,
    ) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        for item in as_slice(value) {
            let expanded = self.expand_element(context, active_property, item, depth + 1)?;
            if expanded.is_array() || is_list_object(&expanded) {
                return Err(JsonLdError::list_of_lists(format!(
                    "@list member expands to a list: {item}"
                )));
            }
            if !expanded.is_null() {
                items.push(expanded);
            }
        }
        Ok(items)
    }

    /// Expand a language map: every key is a language tag applied to the
    /// strings found under it.
    fn expand_language_map(
        &mut self,
        context: &ActiveContext,
        active_property: &str,
        map: &Map<String, Value>,
        depth: usize,
    ) -> Result<Value> {
        let mut result = Vec::new();
        for (language, value) in map {
            for item in as_slice(value) {
                let expanded = match item {
                    Value::Null => continue,
                    Value::String(text) => {
                        json!({"@value": text, "@language": language})
                    }
                    Value::Object(object) => {
                        self.expand_object(context, Some(active_property), object, depth + 1, false)?
                    }
                    other => self.expand_element(context, Some(active_property), other, depth + 1)?,
                };
                match tag_language(expanded, language) {
                    Value::Null => {}
                    Value::Array(inner) => result.extend(inner),
                    other => result.push(other),
                }
            }
        }
        Ok(Value::Array(result))
    }

    /// Turn a scalar into its expanded form under `active_property`.
    fn expand_value(
        &mut self,
        context: &ActiveContext,
        active_property: Option<&str>,
        value: &Value,
    ) -> Result<Value> {
        // Free-floating scalars carry no information
        let Some(property) = active_property else {
            return Ok(Value::Null);
        };
        let expanded_property = context.expand_iri(property, true, false)?;

        match expanded_property.as_str() {
            keywords::GRAPH => return Ok(Value::Null),
            keywords::ID => {
                return match value {
                    Value::String(id) => Ok(Value::String(self.node_id(context, id)?)),
                    other => Ok(other.clone()),
                };
            }
            keywords::TYPE => {
                return match value {
                    Value::String(datatype) => {
                        Ok(Value::String(context.expand_iri(datatype, false, true)?))
                    }
                    other => Ok(other.clone()),
                };
            }
            keyword if is_keyword(keyword) => return Ok(value.clone()),
            _ => {}
        }

        let type_mapping = context
            .get_term(property)
            .and_then(|def| def.type_mapping.as_ref());
        match (type_mapping, value) {
            (Some(TypeMapping::Id), Value::String(id)) => {
                return Ok(json!({"@id": self.node_id(context, id)?}));
            }
            (Some(TypeMapping::Datatype(datatype)), _) => {
                return Ok(json!({"@value": value, "@type": datatype}));
            }
            _ => {}
        }

        let mut object = Map::new();
        object.insert(keywords::VALUE.to_string(), value.clone());
        if value.is_string()
            && let Some(language) = context.effective_language(Some(property))
        {
            object.insert(keywords::LANGUAGE.to_string(), json!(language));
        }
        Ok(Value::Object(object))
    }

    /// Resolve a node identifier against the base IRI. Existing blank node
    /// labels are mapped into the issuer's namespace so that generated labels
    /// never collide with them.
    fn node_id(&mut self, context: &ActiveContext, id: &str) -> Result<String> {
        let iri = context.expand_iri(id, false, false)?;
        if is_blank_node(&iri) {
            return Ok(match self.issuer.as_mut() {
                Some(issuer) => issuer.issue(&iri),
                None => iri,
            });
        }
        if !is_absolute_iri(&iri) {
            return Err(JsonLdError::InvalidIdValue(format!(
                "'{id}' does not resolve to an absolute IRI"
            )));
        }
        Ok(iri)
    }
}

/// `@type` accepts a string, an empty map, a node reference, or a sequence of
/// strings and node references.
fn validate_type_value(context: &ActiveContext, value: &Value) -> Result<()> {
    let is_reference = |map: &Map<String, Value>| -> Result<bool> {
        if map.is_empty() {
            return Ok(true);
        }
        let Some((key, id)) = map.iter().next() else {
            return Ok(false);
        };
        Ok(map.len() == 1 && id.is_string() && context.expand_iri(key, true, false)? == keywords::ID)
    };

    let valid = match value {
        Value::String(_) => true,
        Value::Object(map) => is_reference(map)?,
        Value::Array(items) => {
            let mut valid = true;
            for item in items {
                valid &= match item {
                    Value::String(_) => true,
                    Value::Object(map) if !map.is_empty() => is_reference(map)?,
                    _ => false,
                };
            }
            valid
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(JsonLdError::InvalidTypeValue(value.to_string()))
    }
}

/// Reduce node references among expanded `@type` values to their IRI.
fn simplify_type_references(types: Value) -> Value {
    match types {
        Value::Array(items) => Value::Array(items.into_iter().map(simplify_type_references).collect()),
        Value::Object(mut map) if map.len() == 1 && map.contains_key(keywords::ID) => {
            map.remove(keywords::ID).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Apply a language-map tag to every plain string produced under it.
fn tag_language(value: Value, language: &str) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| tag_language(item, language))
                .collect(),
        ),
        Value::Object(mut map) => {
            if let Some(list) = map.remove(keywords::LIST) {
                map.insert(keywords::LIST.to_string(), tag_language(list, language));
            } else if map.get(keywords::VALUE).is_some_and(Value::is_string)
                && !map.contains_key(keywords::TYPE)
            {
                map.insert(keywords::LANGUAGE.to_string(), json!(language));
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Store an expanded entry; everything but @id, @type, @value and @language
/// accumulates into a sequence.
fn add_expanded_value(result: &mut Map<String, Value>, property: String, expanded: Value) {
    match property.as_str() {
        keywords::ID | keywords::VALUE | keywords::LANGUAGE => {
            result.insert(property, expanded);
        }
        keywords::TYPE => match result.remove(keywords::TYPE) {
            Some(existing) => {
                let mut types = into_vec(existing);
                types.extend(into_vec(expanded));
                result.insert(property, Value::Array(types));
            }
            None => {
                result.insert(property, expanded);
            }
        },
        _ => {
            let entry = result
                .entry(property)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.extend(into_vec(expanded));
            }
        }
    }
}

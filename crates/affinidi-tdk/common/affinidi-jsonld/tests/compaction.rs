use affinidi_jsonld::{
    ActiveContext, JsonLdError, JsonLdOptions, compact_document, compact_iri, expand_document,
};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn compact(input: &Value, context: &Value) -> Value {
    compact_document(input, context, &JsonLdOptions::default()).unwrap()
}

fn person_context() -> Value {
    json!({
        "schema": "http://schema.org/",
        "name": "schema:name",
        "knows": {"@id": "schema:knows", "@type": "@id"},
        "tags": {"@id": "schema:keywords", "@container": "@list"},
        "born": {"@id": "schema:birthDate", "@type": "http://www.w3.org/2001/XMLSchema#date"}
    })
}

fn expanded_person() -> Value {
    json!([{
        "@id": "http://example.com/alice",
        "@type": ["http://schema.org/Person"],
        "http://schema.org/name": [{"@value": "Alice"}],
        "http://schema.org/knows": [{"@id": "http://example.com/bob"}],
        "http://schema.org/keywords": [{"@list": [{"@value": "a"}, {"@value": "b"}]}],
        "http://schema.org/birthDate": [{
            "@value": "1990-01-01",
            "@type": "http://www.w3.org/2001/XMLSchema#date"
        }]
    }])
}

#[test]
fn compact_to_prefix() {
    let expanded = json!([{"http://example.com/name": [{"@value": "A"}]}]);
    let context = json!({"ex": "http://example.com/"});
    assert_eq!(
        compact(&expanded, &context),
        json!({"@context": {"ex": "http://example.com/"}, "ex:name": "A"})
    );
}

#[test]
fn compact_iri_synthesizes_curie() {
    let ctx = ActiveContext::default()
        .process(&json!({"ex": "http://example.com/"}), &JsonLdOptions::default())
        .unwrap();
    assert_eq!(
        compact_iri(&ctx, "http://example.com/knows", None, true),
        "ex:knows"
    );
}

#[test]
fn terms_chosen_by_coercion() {
    assert_eq!(
        compact(&expanded_person(), &person_context()),
        json!({
            "@context": person_context(),
            "@id": "http://example.com/alice",
            "@type": "schema:Person",
            "name": "Alice",
            "knows": "http://example.com/bob",
            "tags": ["a", "b"],
            "born": "1990-01-01"
        })
    );
}

#[test]
fn compaction_round_trips_through_expansion() {
    let options = JsonLdOptions::default();
    let compacted = compact(&expanded_person(), &person_context());
    assert_eq!(
        expand_document(&compacted, &options).unwrap(),
        expanded_person()
    );
}

#[test]
fn context_wrapper_accepted() {
    let expanded = json!([{"http://example.com/name": [{"@value": "A"}]}]);
    let wrapped = json!({"@context": {"ex": "http://example.com/"}});
    assert_eq!(
        compact(&expanded, &wrapped),
        json!({"@context": {"ex": "http://example.com/"}, "ex:name": "A"})
    );
}

#[test]
fn empty_context_not_echoed() {
    let expanded = json!([{"http://ex/p": [{"@value": "x"}]}]);
    assert_eq!(compact(&expanded, &json!({})), json!({"http://ex/p": "x"}));
}

#[test]
fn keyword_aliases_in_output() {
    let expanded = json!([{
        "@id": "http://example.com/a",
        "http://example.com/p": [{"@value": "x"}]
    }]);
    let context = json!({"id": "@id", "ex": "http://example.com/"});
    assert_eq!(
        compact(&expanded, &context),
        json!({"@context": context, "id": "ex:a", "ex:p": "x"})
    );
}

#[test]
fn vocab_for_keys_curies_for_values() {
    let expanded = json!([{
        "@id": "http://example.com/a",
        "@type": ["http://example.com/Thing"],
        "http://example.com/knows": [{"@id": "http://example.com/b"}]
    }]);
    let context = json!({"@vocab": "http://example.com/", "ex": "http://example.com/"});
    assert_eq!(
        compact(&expanded, &context),
        json!({
            "@context": context,
            "@id": "ex:a",
            "@type": "Thing",
            "knows": {"@id": "ex:b"}
        })
    );
}

#[test]
fn default_language_stripped() {
    let expanded = json!([{
        "http://ex/label": [
            {"@value": "Hi", "@language": "en"},
            {"@value": "Salut", "@language": "fr"}
        ]
    }]);
    let context = json!({"@language": "en", "label": "http://ex/label"});
    assert_eq!(
        compact(&expanded, &context),
        json!({
            "@context": context,
            "label": ["Hi", {"@value": "Salut", "@language": "fr"}]
        })
    );
}

#[test]
fn several_nodes_wrapped_in_graph() {
    let expanded = json!([
        {"@id": "http://example.com/a", "http://example.com/p": [{"@value": "1"}]},
        {"@id": "http://example.com/b", "http://example.com/p": [{"@value": "2"}]}
    ]);
    let context = json!({"ex": "http://example.com/", "graph": "@graph"});
    assert_eq!(
        compact(&expanded, &context),
        json!({
            "@context": context,
            "graph": [
                {"@id": "ex:a", "ex:p": "1"},
                {"@id": "ex:b", "ex:p": "2"}
            ]
        })
    );
}

#[test]
fn arrays_kept_when_not_compacting_arrays() {
    let options = JsonLdOptions::builder()
        .with_compact_arrays(false)
        .build()
        .unwrap();
    let expanded = json!([{"http://example.com/name": [{"@value": "A"}]}]);
    let context = json!({"ex": "http://example.com/"});
    assert_eq!(
        compact_document(&expanded, &context, &options).unwrap(),
        json!({
            "@context": context,
            "@graph": [{"ex:name": ["A"]}]
        })
    );
}

#[test]
fn ambiguous_lists_rejected_in_strict_mode() {
    init_logging();
    let expanded = json!([{
        "http://ex/p": [
            {"@list": [{"@value": "a"}]},
            {"@list": [{"@value": "b"}]}
        ]
    }]);
    let context = json!({"p": "http://ex/p"});

    let strict = JsonLdOptions::builder()
        .with_processing_strict(true)
        .build()
        .unwrap();
    let err = compact_document(&expanded, &context, &strict).unwrap_err();
    assert!(matches!(err, JsonLdError::AmbiguousListCompaction(_)));

    assert_eq!(
        compact(&expanded, &context),
        json!({
            "@context": context,
            "p": [{"@list": ["a"]}, {"@list": ["b"]}]
        })
    );
}

#[test]
fn term_selection_is_deterministic() {
    init_logging();
    let context = json!({
        "zeta": "http://ex/p",
        "ab": "http://ex/p",
        "b": "http://ex/p",
        "a": "http://ex/p"
    });
    let expanded = json!([{"http://ex/p": [{"@value": "x"}]}]);
    for _ in 0..3 {
        assert_eq!(
            compact(&expanded, &context),
            json!({"@context": context, "a": "x"})
        );
    }
}

#[test]
fn compacting_compact_input_expands_first() {
    let input = json!({
        "@context": {"name": "http://schema.org/name"},
        "name": "Carol"
    });
    let context = json!({"schema": "http://schema.org/"});
    assert_eq!(
        compact(&input, &context),
        json!({"@context": context, "schema:name": "Carol"})
    );
}

#[test]
fn language_container_compacts_to_language_map() {
    let context = json!({"label": {"@id": "http://ex/label", "@container": "@language"}});
    let expanded = json!([{
        "http://ex/label": [
            {"@value": "Farbe", "@language": "de"},
            {"@value": "colour", "@language": "en"},
            {"@value": "color", "@language": "en"}
        ]
    }]);

    let compacted = compact(&expanded, &context);
    assert_eq!(
        compacted,
        json!({
            "@context": context,
            "label": {"de": "Farbe", "en": ["colour", "color"]}
        })
    );
    assert_eq!(
        expand_document(&compacted, &JsonLdOptions::default()).unwrap(),
        expanded
    );
}

#[test]
fn untagged_values_skip_language_container() {
    let context = json!({"label": {"@id": "http://ex/label", "@container": "@language"}});
    let expanded = json!([{"http://ex/label": [{"@value": "plain"}]}]);
    assert_eq!(
        compact(&expanded, &context),
        json!({"@context": context, "http://ex/label": "plain"})
    );
}

#[test]
fn node_ids_round_trip_under_vocab() {
    let context = json!({"@vocab": "http://example.com/"});
    let expanded = json!([{
        "@id": "http://example.com/alice",
        "http://example.com/name": [{"@value": "A"}]
    }]);

    let compacted = compact(&expanded, &context);
    assert_eq!(
        compacted,
        json!({"@context": context, "@id": "http://example.com/alice", "name": "A"})
    );
    assert_eq!(
        expand_document(&compacted, &JsonLdOptions::default()).unwrap(),
        expanded
    );
}

#[test]
fn plain_string_under_default_language_keeps_term() {
    let context = json!({"@language": "en", "label": "http://ex/label"});
    let expanded = json!([{"http://ex/label": [{"@value": "hi"}]}]);

    let compacted = compact(&expanded, &context);
    assert_eq!(
        compacted,
        json!({"@context": context, "label": {"@value": "hi"}})
    );
    assert_eq!(
        expand_document(&compacted, &JsonLdOptions::default()).unwrap(),
        expanded
    );
}

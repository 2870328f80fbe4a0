use prism::document::DocumentTranslator;
use prism::ir::{AllConditions, ConditionField, FieldOption, FieldsMap, Operator};
use serde_json::json;

fn translator() -> DocumentTranslator {
    DocumentTranslator::new(
        FieldsMap::new()
            .with("key", FieldOption::new("keyword"))
            .with("log", FieldOption::new("text"))
            .with("nested", FieldOption::new("nested"))
            .with("nested.key", FieldOption::new("keyword"))
            .with("nested.flag", FieldOption::new("boolean")),
    )
}

fn render(all: AllConditions) -> String {
    translator()
        .conditions(&all)
        .unwrap()
        .map(|q| q.to_string())
        .unwrap_or_default()
}

#[test]
fn test_single_value_collapses() {
    assert_eq!(
        render(vec![vec![ConditionField::new("key", Operator::Eq, ["val-1"])]]),
        r#"{"match_phrase":{"key":{"query":"val-1"}}}"#
    );
}

#[test]
fn test_multiple_values_are_should() {
    assert_eq!(
        render(vec![vec![ConditionField::new("key", Operator::Eq, ["a", "b"])]]),
        r#"{"bool":{"should":[{"match_phrase":{"key":{"query":"a"}}},{"match_phrase":{"key":{"query":"b"}}}]}}"#
    );
}

#[test]
fn test_prefix_match() {
    assert_eq!(
        render(vec![vec![
            ConditionField::new("log", Operator::Eq, ["time"]).prefix()
        ]]),
        r#"{"match_phrase_prefix":{"log":{"query":"time"}}}"#
    );
}

#[test]
fn test_gte_keeps_value_as_string() {
    assert_eq!(
        render(vec![vec![ConditionField::new("key", Operator::Gte, ["9"])]]),
        r#"{"range":{"key":{"from":"9","include_lower":true,"include_upper":true,"to":null}}}"#
    );
    assert_eq!(
        render(vec![vec![ConditionField::new("key", Operator::Lte, ["9"])]]),
        r#"{"range":{"key":{"from":null,"include_lower":true,"include_upper":true,"to":"9"}}}"#
    );
}

#[test]
fn test_two_groups() {
    let q = translator()
        .conditions(&vec![
            vec![
                ConditionField::new("key", Operator::Eq, ["a"]),
                ConditionField::new("log", Operator::Contains, ["err"]),
            ],
            vec![ConditionField::new("key", Operator::Existed, Vec::<String>::new())],
        ])
        .unwrap()
        .unwrap();
    assert_eq!(
        q,
        json!({"bool": {"should": [
            {"bool": {"must": [
                {"match_phrase": {"key": {"query": "a"}}},
                {"wildcard": {"log": {"value": "*err*"}}}
            ]}},
            {"exists": {"field": "key"}}
        ]}})
    );
}

#[test]
fn test_nested_group_wraps_once() {
    let q = translator()
        .conditions(&vec![vec![
            ConditionField::new("nested.key", Operator::Eq, ["a"]),
            ConditionField::new("nested.flag", Operator::Ne, [""]),
        ]])
        .unwrap()
        .unwrap();
    assert_eq!(
        q,
        json!({"nested": {"path": "nested", "query": {"bool": {"must": [
            {"match_phrase": {"nested.key": {"query": "a"}}},
            {"exists": {"field": "nested.flag"}}
        ]}}}})
    );
}

#[test]
fn test_nested_paths_in_separate_groups_are_wrapped_separately() {
    let q = translator()
        .conditions(&vec![
            vec![ConditionField::new("nested.key", Operator::Eq, ["a"])],
            vec![ConditionField::new("nested.key", Operator::Eq, ["b"])],
        ])
        .unwrap()
        .unwrap();
    assert_eq!(
        q,
        json!({"bool": {"should": [
            {"nested": {"path": "nested", "query": {"match_phrase": {"nested.key": {"query": "a"}}}}},
            {"nested": {"path": "nested", "query": {"match_phrase": {"nested.key": {"query": "b"}}}}}
        ]}})
    );
}

#[test]
fn test_all_noop_renders_nothing() {
    assert!(translator()
        .conditions(&vec![vec![ConditionField::new("key", Operator::Eq, Vec::<String>::new())]])
        .unwrap()
        .is_none());
    assert!(translator().conditions(&vec![]).unwrap().is_none());
}

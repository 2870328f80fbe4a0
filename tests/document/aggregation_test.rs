use insta::assert_snapshot;
use prism::document::{scope_transitions, AggStep, DocumentTranslator};
use prism::ir::{
    Aggregate, FieldOption, FieldsMap, Order, TimeField, TimeFieldType, TimeUnit, FIELD_VALUE,
};
use serde_json::json;
use std::time::Duration;

fn mapping() -> FieldsMap {
    FieldsMap::from_mapping(&json!({
        "properties": {
            "time": {"type": "date"},
            "value": {"type": "long"},
            "gseIndex": {"type": "keyword"},
            "user": {
                "type": "nested",
                "properties": {
                    "name": {"type": "keyword"},
                    "age": {"type": "long"}
                }
            },
            "events": {
                "type": "nested",
                "properties": {
                    "name": {"type": "keyword"},
                    "attributes": {
                        "type": "nested",
                        "properties": {"key": {"type": "keyword"}}
                    }
                }
            }
        }
    }))
}

fn translator() -> DocumentTranslator {
    DocumentTranslator::new(mapping())
        .with_time_field(TimeField::new("time", TimeFieldType::Date, TimeUnit::Second))
        .with_value_field("value")
        .with_range(1721024820, 1721046420)
}

fn scopes(steps: &[AggStep]) -> Vec<String> {
    steps
        .iter()
        .map(|s| match s {
            AggStep::Nested { path } => format!("nested({path})"),
            AggStep::ReverseNested { path: Some(p) } => format!("reverse({p})"),
            AggStep::ReverseNested { path: None } => "reverse(root)".to_string(),
            other => other.name().to_string(),
        })
        .collect()
}

#[test]
fn test_common_ancestor_transition_is_minimal() {
    let fields = FieldsMap::new()
        .with("a", FieldOption::new("nested"))
        .with("a.b", FieldOption::new("nested"))
        .with("a.b.c", FieldOption::new("nested"))
        .with("a.d", FieldOption::new("nested"));

    let steps = scope_transitions(&fields, "a.b.c", "a.d");
    let exits = steps
        .iter()
        .filter(|s| matches!(s, AggStep::ReverseNested { .. }))
        .count();
    let entries: Vec<_> = steps
        .iter()
        .filter_map(|s| match s {
            AggStep::Nested { path } => Some(path.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(exits, 2);
    assert_eq!(entries, vec!["a.d"]);
    assert!(matches!(steps.last(), Some(AggStep::Nested { .. })));
}

#[test]
fn test_deeper_nested_dimension() {
    let steps = translator()
        .aggregation_steps(
            &vec![Aggregate::new("count").with_dimensions(["events.name", "events.attributes.key"])],
            &vec![],
        )
        .unwrap();
    assert_eq!(
        scopes(&steps),
        vec![
            "nested(events)",
            "events.name",
            "nested(events.attributes)",
            "events.attributes.key",
            "reverse(events)",
            "reverse(root)",
            "_value"
        ]
    );
}

#[test]
fn test_nested_value_field() {
    let steps = translator()
        .with_value_field("user.age")
        .aggregation_steps(
            &vec![Aggregate::new("avg").with_dimensions(["gseIndex", "user.name"])],
            &vec![],
        )
        .unwrap();
    assert_eq!(
        scopes(&steps),
        vec!["gseIndex", "nested(user)", "user.name", "_value"]
    );
}

#[test]
fn test_histogram_leaves_nested_scope() {
    let steps = translator()
        .aggregation_steps(
            &vec![Aggregate::new("sum")
                .with_dimensions(["user.name"])
                .with_window(Duration::from_secs(60))],
            &vec![],
        )
        .unwrap();
    assert_eq!(
        scopes(&steps),
        vec!["nested(user)", "user.name", "reverse(root)", "time", "_value"]
    );
}

#[test]
fn test_count_by_dimension_tree() {
    let tree = translator()
        .aggregations(
            &vec![Aggregate::new("count")
                .with_dimensions(["gseIndex"])
                .with_window(Duration::from_secs(60))
                .with_time_zone("Asia/ShangHai")],
            &vec![],
        )
        .unwrap();
    assert_snapshot!(tree.to_string(), @r#"{"gseIndex":{"aggregations":{"time":{"aggregations":{"_value":{"value_count":{"field":"value"}}},"date_histogram":{"extended_bounds":{"max":1721046420,"min":1721024820},"field":"time","fixed_interval":"1m","min_doc_count":0,"time_zone":"Asia/ShangHai"}}},"terms":{"field":"gseIndex"}}}"#);
}

#[test]
fn test_cardinality_with_value_order() {
    let tree = translator()
        .with_size(10)
        .aggregations(
            &vec![Aggregate::new("cardinality").with_dimensions(["gseIndex"])],
            &vec![Order::desc(FIELD_VALUE)],
        )
        .unwrap();
    assert_eq!(
        tree,
        json!({"gseIndex": {
            "aggregations": {"_value": {"cardinality": {"field": "value"}}},
            "terms": {"field": "gseIndex", "order": [{"_value": "desc"}], "size": 10}
        }})
    );
}

#[test]
fn test_nested_tree_shape() {
    let tree = translator()
        .aggregations(&vec![Aggregate::new("max").with_dimensions(["user.name"])], &vec![])
        .unwrap();
    assert_eq!(
        tree,
        json!({"user": {
            "nested": {"path": "user"},
            "aggregations": {"user.name": {
                "terms": {"field": "user.name"},
                "aggregations": {"reverse_nested": {
                    "reverse_nested": {},
                    "aggregations": {"_value": {"max": {"field": "value"}}}
                }}
            }}
        }})
    );
}

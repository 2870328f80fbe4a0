use insta::assert_snapshot;
use prism::config::Settings;
use prism::document::DocumentTranslator;
use prism::ir::{FieldsMap, Query};
use prism::TranslateError;
use serde_json::json;

fn mapping() -> FieldsMap {
    FieldsMap::from_mapping(&json!({
        "properties": {
            "dtEventTimeStamp": {"type": "date"},
            "log": {"type": "text"},
            "serverIp": {"type": "keyword"},
            "latency": {"type": "long"}
        }
    }))
}

fn settings() -> Settings {
    Settings::from_toml(
        r#"
[fields]
time_field = "dtEventTimeStamp"
time_type = "date"
time_unit = "second"
value_field = "latency"

[document]
size = 50
query_string_fields = ["log"]
"#,
    )
    .unwrap()
}

#[test]
fn test_hits_body() {
    let query: Query = serde_json::from_value(json!({
        "conditions": [[{"field_name": "serverIp", "op": "eq", "value": ["127.0.0.1"]}]],
        "orders": [{"name": "_time", "ast": false}, {"name": "_value", "ast": true}],
        "query_string": "timeout",
        "start": 100,
        "end": 200
    }))
    .unwrap();

    let body = DocumentTranslator::from_settings(&settings())
        .with_fields(mapping())
        .search_body(&query)
        .unwrap();

    assert_snapshot!(body.to_string(), @r#"{"query":{"bool":{"must":[{"range":{"dtEventTimeStamp":{"format":"epoch_second","from":100,"include_lower":true,"include_upper":true,"to":200}}},{"match_phrase":{"serverIp":{"query":"127.0.0.1"}}},{"query_string":{"analyze_wildcard":true,"fields":["log"],"lenient":true,"query":"timeout"}}]}},"size":50,"sort":[{"dtEventTimeStamp":{"order":"desc"}},{"latency":{"order":"asc"}}]}"#);
}

#[test]
fn test_aggregation_body() {
    let query: Query = serde_json::from_value(json!({
        "aggregates": [{"name": "avg", "dimensions": ["serverIp"], "window": 60000, "time_zone": "Asia/Shanghai"}],
        "start": 60,
        "end": 120
    }))
    .unwrap();

    let body = DocumentTranslator::from_settings(&settings())
        .with_fields(mapping())
        .search_body(&query)
        .unwrap();

    assert_eq!(
        body,
        json!({
            "aggregations": {"serverIp": {
                "aggregations": {"dtEventTimeStamp": {
                    "aggregations": {"_value": {"avg": {"field": "latency"}}},
                    "date_histogram": {
                        "extended_bounds": {"max": 120, "min": 60},
                        "field": "dtEventTimeStamp",
                        "fixed_interval": "1m",
                        "min_doc_count": 0,
                        "time_zone": "Asia/Shanghai"
                    }
                }},
                "terms": {"field": "serverIp", "size": 50}
            }},
            "query": {"range": {"dtEventTimeStamp": {
                "format": "epoch_second", "from": 60,
                "include_lower": true, "include_upper": true, "to": 120
            }}},
            "size": 0
        })
    );
}

#[test]
fn test_query_string_error_propagates() {
    let query = Query {
        query_string: "log:(broken".to_string(),
        ..Default::default()
    };
    let err = DocumentTranslator::new(mapping()).search_body(&query).unwrap_err();
    assert!(matches!(err, TranslateError::QueryString(_)));
}

#[test]
fn test_aggregation_buckets_follow_filter() {
    let query: Query = serde_json::from_value(json!({
        "conditions": [[
            {"field_name": "serverIp", "op": "eq", "value": ["10.0.0.1", "10.0.0.2"]},
            {"field_name": "serverIp", "op": "ne", "value": ["10.0.0.9"]}
        ]],
        "aggregates": [{"name": "count", "dimensions": ["serverIp"]}],
        "orders": [{"name": "_value", "ast": false}]
    }))
    .unwrap();

    let body = DocumentTranslator::from_settings(&settings())
        .with_fields(mapping())
        .search_body(&query)
        .unwrap();

    assert_eq!(
        body["aggregations"]["serverIp"]["terms"],
        json!({
            "exclude": ["10.0.0.9"],
            "field": "serverIp",
            "include": ["10.0.0.1", "10.0.0.2"],
            "missing": " ",
            "order": [{"_value": "desc"}],
            "size": 50
        })
    );
}

#[test]
fn test_labels_from_conditions_and_query_string() {
    let query: Query = serde_json::from_value(json!({
        "conditions": [
            [{"field_name": "serverIp", "op": "eq", "value": ["127.0.0.1"]}],
            [{"field_name": "serverIp", "op": "ne", "value": ["10.0.0.9"]}]
        ],
        "query_string": "timeout AND NOT level:debug AND service:web*"
    }))
    .unwrap();

    let labels = DocumentTranslator::from_settings(&settings())
        .with_fields(mapping())
        .labels(&query)
        .unwrap();

    assert_snapshot!(serde_json::to_string(&labels).unwrap(), @r#"{"log":[{"value":"timeout","operator":"eq"}],"serverIp":[{"value":"127.0.0.1","operator":"eq"}],"service":[{"value":"web*","operator":"contains"}]}"#);
}

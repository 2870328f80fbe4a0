use insta::assert_snapshot;
use prism::config::Settings;
use prism::ir::{Aggregate, ConditionField, FieldOption, FieldsMap, Operator, Order, Query};
use prism::sql::{Dialect, SqlTranslator};
use std::time::Duration;

fn query_json() -> &'static str {
    r#"{
        "conditions": [[
            {"field_name": "level", "op": "eq", "value": ["error"]},
            {"field_name": "service", "op": "contains", "value": ["pay*"], "is_wildcard": true}
        ]],
        "aggregates": [{"name": "count", "dimensions": ["service"], "window": 60000}],
        "orders": [{"name": "_value", "ast": false}],
        "query_string": "NOT region:test",
        "start": 1700000000,
        "end": 1700003600,
        "size": 10
    }"#
}

#[test]
fn test_statement_from_wire_query() {
    let query: Query = serde_json::from_str(query_json()).unwrap();
    let t = SqlTranslator::new(Dialect::Default).with_time_field("dtEventTimeStamp");
    let stmt = t.statement(&query, &["2_bklog_pay".to_string()]).unwrap();

    assert_snapshot!(stmt.sql, @"SELECT `service`, COUNT(*) AS `_value_`, MAX(FLOOR((`dtEventTimeStamp` + 0) / 60000) * 60000 - 0) AS `_timestamp_` FROM `2_bklog_pay` WHERE `dtEventTimeStamp` >= 1700000000000 AND `dtEventTimeStamp` < 1700003600000 AND (NOT (`region` = 'test')) AND `level` = 'error' AND `service` LIKE 'pay%' GROUP BY `service`, (FLOOR((`dtEventTimeStamp` + 0) / 60000) * 60000 - 0) ORDER BY `_value_` DESC LIMIT 10");

    assert!(stmt.labels.get("region").is_none());
    assert_eq!(stmt.labels.get("level").map(<[_]>::len), Some(1));
    assert_eq!(stmt.labels.get("service").map(<[_]>::len), Some(1));
}

#[test]
fn test_statement_from_settings() {
    let settings = Settings::from_toml(
        r#"
[fields]
default_field = "log"
time_field = "time"

[sql]
dialect = "doris"
"#,
    )
    .unwrap();
    let t = SqlTranslator::from_settings(&settings)
        .with_fields(FieldsMap::new().with("log", FieldOption::new("text")));
    let query = Query {
        query_string: "timeout".to_string(),
        ..Default::default()
    };
    let stmt = t.statement(&query, &["logs".to_string()]).unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT *, `time` AS `_timestamp_` FROM `logs` WHERE (`log` MATCH_PHRASE_PREFIX 'timeout')"
    );
}

#[test]
fn test_statement_paging_and_value_override() {
    let query = Query {
        conditions: vec![vec![ConditionField::new("os", Operator::Eq, ["linux"])]],
        aggregates: vec![Aggregate::new("sum")
            .with_dimensions(["host"])
            .with_window(Duration::from_secs(60))],
        orders: vec![Order::asc("host")],
        value_field: "bytes".to_string(),
        size: 20,
        from: 40,
        ..Default::default()
    };
    let stmt = SqlTranslator::default()
        .statement(&query, &["t".to_string()])
        .unwrap();
    assert!(stmt.sql.contains("SUM(`bytes`) AS `_value_`"));
    assert!(stmt.sql.ends_with("ORDER BY `host` ASC LIMIT 20 OFFSET 40"));
    assert_eq!(stmt.where_clause, "`os` = 'linux'");
}

#[test]
fn test_order_by_keeps_tie_break_sequence() {
    let query = Query {
        aggregates: vec![Aggregate::new("sum").with_dimensions(["host"])],
        orders: vec![Order::asc("host"), Order::desc("_value")],
        ..Default::default()
    };
    let stmt = SqlTranslator::default()
        .statement(&query, &["t".to_string()])
        .unwrap();
    assert_eq!(stmt.plan.order_by_fields, vec!["`host` ASC", "`_value_` DESC"]);
    assert!(stmt
        .sql
        .ends_with("GROUP BY `host` ORDER BY `host` ASC, `_value_` DESC"));
}

use chrono::{TimeZone, Utc};
use insta::assert_snapshot;
use prism::ir::{Aggregate, Order, FIELD_TIME, FIELD_VALUE};
use prism::sql::{Dialect, SqlTranslator, TimeAggregate};
use std::time::Duration;

fn reference_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_default_minute_buckets() {
    let t = SqlTranslator::new(Dialect::Default).with_value_field("latency");
    let plan = t
        .build_select(
            &vec![Aggregate::new("avg")
                .with_dimensions(["host", "region"])
                .with_window(Duration::from_secs(300))],
            &vec![Order::desc(FIELD_TIME), Order::asc("host")],
        )
        .unwrap();

    assert_snapshot!(plan.select_fields.join(", "), @"`host`, `region`, AVG(`latency`) AS `_value_`, MAX(FLOOR((`dtEventTimeStamp` + 0) / 300000) * 300000 - 0) AS `_timestamp_`");
    assert_eq!(
        plan.group_by_fields,
        vec![
            "`host`",
            "`region`",
            "(FLOOR((`dtEventTimeStamp` + 0) / 300000) * 300000 - 0)"
        ]
    );
    assert_eq!(plan.order_by_fields, vec!["`_timestamp_` DESC", "`host` ASC"]);
    assert_eq!(
        plan.time_aggregate,
        Some(TimeAggregate {
            window: Duration::from_secs(300),
            offset_millis: 0
        })
    );
}

#[test]
fn test_doris_shard_key_buckets() {
    let t = SqlTranslator::new(Dialect::Doris);
    let plan = t
        .build_select(
            &vec![Aggregate::new("count").with_window(Duration::from_secs(300))],
            &vec![],
        )
        .unwrap();
    assert_eq!(
        plan.select_fields,
        vec![
            "COUNT(*) AS `_value_`",
            "((CAST((FLOOR(__shard_key__ / 1000) + 0) / 5 AS INT) * 5 - 0) * 60 * 1000) AS `_timestamp_`"
        ]
    );
    assert_eq!(plan.group_by_fields, vec!["`_timestamp_`"]);
}

#[test]
fn test_doris_day_buckets_with_time_zone() {
    let t = SqlTranslator::new(Dialect::Doris).with_reference_time(reference_time());
    let plan = t
        .build_select(
            &vec![Aggregate::new("sum")
                .with_window(Duration::from_secs(86400))
                .with_time_zone("Asia/Shanghai")],
            &vec![],
        )
        .unwrap();
    assert_eq!(
        plan.select_fields[1],
        "((CAST((FLOOR(__shard_key__ / 1000) + 480) / 1440 AS INT) * 1440 - 480) * 60 * 1000) AS `_timestamp_`"
    );
    assert_eq!(plan.time_aggregate.map(|a| a.offset_millis), Some(28_800_000));
}

#[test]
fn test_doris_sub_minute_window_casts_raw_time() {
    let t = SqlTranslator::new(Dialect::Doris);
    let plan = t
        .build_select(
            &vec![Aggregate::new("max").with_window(Duration::from_secs(90))],
            &vec![],
        )
        .unwrap();
    assert_eq!(
        plan.select_fields[1],
        "(CAST((FLOOR(`dtEventTimeStamp` + 0) / 90000) AS INT) * 90000 - 0) AS `_timestamp_`"
    );
}

#[test]
fn test_orders_outside_dimensions_dropped() {
    let t = SqlTranslator::default();
    let plan = t
        .build_select(
            &vec![Aggregate::new("count").with_dimensions(["host"])],
            &vec![Order::asc("ip"), Order::desc(FIELD_VALUE), Order::asc(FIELD_TIME)],
        )
        .unwrap();
    assert_eq!(plan.order_by_fields, vec!["`_value_` DESC"]);
    assert!(plan.dimensions.contains("host"));
    assert!(!plan.dimensions.contains(FIELD_TIME));
}

#[test]
fn test_custom_alias_codec() {
    let codec = prism::ir::FieldCodec::new(|s| s.replace('.', "__"), |s| s.replace("__", "."));
    let t = SqlTranslator::new(Dialect::Doris).with_codec(codec);
    let plan = t
        .build_select(&vec![Aggregate::new("count").with_dimensions(["k8s.pod"])], &vec![])
        .unwrap();
    assert_eq!(
        plan.select_fields[0],
        r#"CAST(k8s["pod"] AS STRING) AS `k8s__pod`"#
    );
    assert_eq!(t.codec().decode("k8s__pod"), "k8s.pod");
}

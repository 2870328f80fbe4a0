use insta::assert_snapshot;
use prism::config::Settings;
use prism::ir::QueryReference;
use prism::reference::ReferenceMerger;
use prism::TranslateError;
use serde_json::json;

fn reference() -> QueryReference {
    serde_json::from_value(json!({
        "a": [{
            "query_list": [
                {
                    "table_id": "result_table.vm",
                    "vm_rt": "vm_result_table",
                    "vm_condition": "__name__=\"cpu_value\", result_table_id=\"vm_result_table\"",
                    "storage_name": "vm_cluster_1"
                },
                {
                    "table_id": "result_table.vm_1",
                    "vm_rt": "",
                    "vm_condition": "__name__=\"cpu_value\", result_table_id=\"vm_result_table_1\"",
                    "storage_name": "vm_cluster_1"
                }
            ]
        }],
        "b": [
            {
                "query_list": [
                    {
                        "table_id": "result_table.vm",
                        "vm_rt": "vm_result_table",
                        "vm_condition": "__name__=\"mem_value\", result_table_id=\"vm_result_table\"",
                        "storage_name": "vm_cluster_1"
                    },
                    {
                        "table_id": "result_table.vm_1",
                        "vm_rt": "vm_result_table_1",
                        "vm_condition": "__name__=\"mem_value\", result_table_id=\"vm_result_table_1\"",
                        "storage_name": "vm_cluster_1"
                    }
                ]
            },
            {
                "query_list": [{
                    "table_id": "result_table.vm_2",
                    "vm_rt": "vm_result_table_2",
                    "vm_condition": "__name__=\"mem_value\"",
                    "storage_name": "vm_cluster_2"
                }]
            }
        ]
    }))
    .unwrap()
}

#[test]
fn test_merge_reference() {
    let expand = ReferenceMerger::default().merge(&reference()).unwrap().unwrap();

    assert_snapshot!(serde_json::to_string(&expand).unwrap(), @r#"{"metric_filter_condition":{"a":"__name__=\"cpu_value\", result_table_id=\"vm_result_table\"","b":"__name__=\"mem_value\", result_table_id=\"vm_result_table\" or __name__=\"mem_value\", result_table_id=\"vm_result_table_1\""},"result_table_list":["vm_result_table","vm_result_table_1"],"cluster_name":"vm_cluster_1"}"#);
}

#[test]
fn test_merge_is_deterministic() {
    let merger = ReferenceMerger::default();
    let first = merger.merge(&reference()).unwrap();
    let second = merger.merge(&reference()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_conflict_from_settings() {
    let settings = Settings::from_toml(
        r#"
[reference]
forbidden_clusters = [["vm_cluster_1", "vm_cluster_3"]]
"#,
    )
    .unwrap();
    let merger = ReferenceMerger::from_settings(&settings);
    assert!(merger.merge(&reference()).is_ok());

    let mut conflicting = reference();
    if let Some(variants) = conflicting.get_mut("a") {
        variants[0].query_list[0].storage_name = "vm_cluster_3".to_string();
    }
    assert!(matches!(
        merger.merge(&conflicting),
        Err(TranslateError::ClusterConflict)
    ));
}

#[test]
fn test_nothing_resolved() {
    let reference: QueryReference = serde_json::from_value(json!({
        "a": [{"query_list": [{"table_id": "result_table.vm", "vm_rt": ""}]}]
    }))
    .unwrap();
    assert_eq!(ReferenceMerger::default().merge(&reference).unwrap(), None);
}

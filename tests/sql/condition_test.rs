use insta::assert_snapshot;
use prism::ir::{ConditionField, FieldOption, FieldsMap, LabelMap, Operator};
use prism::sql::{Dialect, SqlTranslator};
use prism::TranslateError;

fn doris_fields() -> FieldsMap {
    FieldsMap::new()
        .with("log", FieldOption::new("text"))
        .with("message", FieldOption::new("varchar").analyzed())
        .with("host", FieldOption::new("varchar"))
        .with("tags", FieldOption::new("ARRAY<TEXT>"))
}

#[test]
fn test_or_of_and_groups() {
    let t = SqlTranslator::default();
    let cond = t
        .conditions(&vec![
            vec![
                ConditionField::new("os", Operator::Eq, ["linux"]),
                ConditionField::new("status", Operator::Gt, ["5"]),
            ],
            vec![ConditionField::new("region", Operator::Eq, ["north", "south"])],
        ])
        .unwrap();

    assert_snapshot!(cond.expr, @"(`os` = 'linux' AND `status` > 5 OR `region` IN ('north', 'south'))");
    assert_eq!(cond.labels.get("region").map(<[_]>::len), Some(2));
    assert!(cond.labels.get("status").is_none());
}

#[test]
fn test_negative_matches_are_and_joined() {
    let t = SqlTranslator::default();
    let cond = t
        .conditions(&vec![vec![
            ConditionField::new("os", Operator::Ne, ["linux", "windows"]),
            ConditionField::new("host", Operator::Ncontains, ["web*"]).wildcard(),
        ]])
        .unwrap();
    assert_eq!(
        cond.expr,
        "`os` NOT IN ('linux', 'windows') AND `host` NOT LIKE 'web%'"
    );
    assert!(cond.labels.is_empty());
}

#[test]
fn test_regexp_per_dialect() {
    let conds = vec![vec![ConditionField::new("path", Operator::Req, ["a.*", "b.*"])]];

    let default = SqlTranslator::new(Dialect::Default).conditions(&conds).unwrap();
    assert_eq!(default.expr, "`path` REGEXP 'a.*|b.*'");

    let hdfs = SqlTranslator::new(Dialect::Hdfs).conditions(&conds).unwrap();
    assert_eq!(hdfs.expr, "regexp_like(`path`, 'a.*|b.*')");
}

#[test]
fn test_doris_match_styles() {
    let t = SqlTranslator::new(Dialect::Doris).with_fields(doris_fields());
    let render = |c: ConditionField| t.render_condition(&c, &mut LabelMap::new()).unwrap();

    assert_eq!(
        render(ConditionField::new("log", Operator::Eq, ["timeout"])),
        "`log` MATCH_PHRASE_PREFIX 'timeout'"
    );
    assert_eq!(
        render(ConditionField::new("message", Operator::Eq, ["disk full"])),
        "`message` MATCH_PHRASE 'disk full'"
    );
    assert_eq!(
        render(ConditionField::new("host", Operator::Eq, ["a", "b"])),
        "`host` IN ('a', 'b')"
    );
    assert_eq!(
        render(ConditionField::new("resource.host", Operator::Eq, ["web"])),
        r#"CAST(resource["host"] AS STRING) = 'web'"#
    );
}

#[test]
fn test_doris_empty_value_is_null_check() {
    let t = SqlTranslator::new(Dialect::Doris).with_fields(doris_fields());
    let cond = t
        .conditions(&vec![vec![
            ConditionField::new("host", Operator::Eq, [""]),
            ConditionField::new("log", Operator::Ne, [""]),
        ]])
        .unwrap();
    assert_eq!(cond.expr, "`host` IS NULL AND `log` IS NOT NULL");
}

#[test]
fn test_doris_array_fields() {
    let t = SqlTranslator::new(Dialect::Doris).with_fields(doris_fields());
    let cond = t
        .conditions(&vec![vec![ConditionField::new(
            "tags",
            Operator::Eq,
            ["a", "b"],
        )]])
        .unwrap();
    assert_eq!(
        cond.expr,
        "(ARRAY_CONTAINS(`tags`, 'a') == 1 OR ARRAY_CONTAINS(`tags`, 'b') == 1)"
    );
}

#[test]
fn test_existence_and_noop() {
    let t = SqlTranslator::default();
    let cond = t
        .conditions(&vec![vec![
            ConditionField::new("host", Operator::Existed, Vec::<String>::new()),
            ConditionField::new("os", Operator::Eq, Vec::<String>::new()),
            ConditionField::new("ip", Operator::Nexisted, Vec::<String>::new()),
        ]])
        .unwrap();
    assert_eq!(cond.expr, "`host` IS NOT NULL AND `ip` IS NULL");
}

#[test]
fn test_errors() {
    let t = SqlTranslator::default();

    let err = t
        .conditions(&vec![vec![ConditionField::new("a.b", Operator::Eq, ["x"])]])
        .unwrap_err();
    assert!(matches!(err, TranslateError::UnsupportedFieldShape(_)));

    let err = t
        .conditions(&vec![vec![ConditionField::new("n", Operator::Lte, ["1", "2"])]])
        .unwrap_err();
    assert_eq!(err.to_string(), "operator <= only support 1 value");

    let err = t
        .conditions(&vec![vec![ConditionField::new("", Operator::Eq, ["x"])]])
        .unwrap_err();
    assert!(matches!(err, TranslateError::MatchAllUnsupported(_)));
}

#[test]
fn test_unfielded_condition_uses_default_field() {
    let t = SqlTranslator::default().with_default_field("log");
    let cond = t
        .conditions(&vec![vec![ConditionField::new("*", Operator::Eq, ["x"])]])
        .unwrap();
    assert_eq!(cond.expr, "`log` = 'x'");
}

#[test]
fn test_shared_condition_rendered_once() {
    let t = SqlTranslator::default();
    let os = ConditionField::new("os", Operator::Eq, ["linux"]);
    let cond = t
        .conditions(&vec![
            vec![os.clone(), ConditionField::new("region", Operator::Eq, ["north"])],
            vec![os.clone(), ConditionField::new("status", Operator::Gte, ["500"])],
        ])
        .unwrap();
    assert_snapshot!(cond.expr, @"`os` = 'linux' AND (`region` = 'north' OR `status` >= 500)");
    assert_eq!(cond.labels.get("os").map(<[_]>::len), Some(1));
}

#[test]
fn test_comparison_operand_rejected() {
    let t = SqlTranslator::new(Dialect::Doris);
    for value in ["5 OR 1=1", "", "abc", "inf"] {
        let err = t
            .conditions(&vec![vec![ConditionField::new("status", Operator::Gt, [value])]])
            .unwrap_err();
        assert!(
            matches!(err, TranslateError::NonNumericOperand { value: ref v, .. } if v == value),
            "{value:?} accepted"
        );
    }

    let err = t
        .query_string("status:{1 TO x}", &mut LabelMap::new())
        .unwrap_err();
    assert!(matches!(err, TranslateError::NonNumericOperand { .. }));
}

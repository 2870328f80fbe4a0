use insta::assert_snapshot;
use prism::querystring::{parse, Expr, Range};

fn parsed(source: &str) -> Expr {
    parse(source).unwrap().unwrap()
}

#[test]
fn test_match_all() {
    assert!(parse("").unwrap().is_none());
    assert!(parse("   ").unwrap().is_none());
    assert!(parse("*").unwrap().is_none());
}

#[test]
fn test_fielded_terms() {
    assert_snapshot!(
        parsed("level:error AND -service:web*").to_string(),
        @r#"(level:"error" AND NOT (service:web*))"#
    );
    assert_eq!(
        parsed("path:/api.*/"),
        Expr::Regexp {
            field: "path".to_string(),
            value: "api.*".to_string()
        }
    );
}

#[test]
fn test_precedence() {
    assert_eq!(
        parsed("a AND b OR c").to_string(),
        r#"(("a" AND "b") OR "c")"#
    );
    assert_eq!(
        parsed("a b c").to_string(),
        r#"("a" OR ("b" OR "c"))"#
    );
    assert_eq!(
        parsed("a && !b || c").to_string(),
        r#"(("a" AND NOT ("b")) OR "c")"#
    );
}

#[test]
fn test_field_group_binds_leaves() {
    assert_eq!(
        parsed("level:(error OR warn)"),
        Expr::or(Expr::matches("level", "error"), Expr::matches("level", "warn"))
    );
}

#[test]
fn test_comparisons() {
    assert_eq!(
        parsed("ms: >500"),
        Expr::NumberRange(Range {
            field: "ms".to_string(),
            start: Some("500".to_string()),
            end: None,
            include_start: false,
            include_end: false,
        })
    );
    assert_eq!(parsed("ms >= 500").to_string(), "ms:[500 TO *}");
    assert_eq!(parsed("ms:<=9").to_string(), "ms:{* TO 9]");
}

#[test]
fn test_ranges() {
    assert_eq!(parsed("count:[1 TO 5}").to_string(), "count:[1 TO 5}");
    assert!(matches!(
        parsed(r#"time:["2020-01-01" TO *]"#),
        Expr::TimeRange(Range { ref field, .. }) if field == "time"
    ));
}

#[test]
fn test_phrases_and_escapes() {
    assert_eq!(parsed(r#""connection reset""#), Expr::matches("", "connection reset"));
    assert_eq!(parsed(r"test\ value"), Expr::matches("", "test value"));
    assert_eq!(parsed(r"a\*b"), Expr::matches("", "a*b"));
}

#[test]
fn test_errors_carry_spans() {
    let err = parse("level:(error").unwrap_err();
    assert_eq!(err.source, "level:(error");
    assert!(!err.diagnostics.is_empty());
    assert!(err.diagnostics.iter().all(|d| d.span.end <= err.source.len()));

    assert!(parse(r#"log: "oops"#).is_err());
}

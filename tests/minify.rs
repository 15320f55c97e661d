//! Minification: same data, no optional whitespace, comments and blank
//! lines carried through when the policy keeps them.

use neatjson::{CommentPolicy, Formatter};
use serde_json::Value;

fn minify(text: &str) -> String {
    Formatter::new().minify(text).unwrap()
}

fn minify_preserving(text: &str) -> String {
    let mut formatter = Formatter::new();
    formatter.options.comment_policy = CommentPolicy::Preserve;
    formatter.options.preserve_blank_lines = true;
    formatter.minify(text).unwrap()
}

#[test]
fn strips_all_optional_whitespace() {
    assert_eq!(
        minify("{ \"a\" : 1 ,\n  \"b\" : [ 1 , 2 ] }"),
        r#"{"a":1,"b":[1,2]}"#
    );
}

#[test]
fn scalar_documents_minify_to_themselves() {
    assert_eq!(minify("  null  "), "null");
    assert_eq!(minify("\"text\""), "\"text\"");
    assert_eq!(minify("-1.5e3"), "-1.5e3");
}

#[test]
fn round_trips_the_data() {
    let inputs = [
        r#"{"a":1,"b":[true,false,null],"c":{"d":"e"}}"#,
        "[0.5, 100, -3]",
        r#"{"nested":[[1,2],[3,4]]}"#,
    ];
    for input in inputs {
        let minified = minify(input);
        let before: Value = serde_json::from_str(input).unwrap();
        let after: Value = serde_json::from_str(&minified).unwrap();
        assert_eq!(before, after);
    }
}

#[test]
fn no_adjacent_spaces_outside_strings() {
    let input = r#"{ "spaced  out": "a  b",  "n": [ 1,   2 ] }"#;
    let minified = minify(input);
    let mut in_string = false;
    let mut escaped = false;
    let mut prev_space = false;
    for ch in minified.chars() {
        match ch {
            '"' if !escaped => in_string = !in_string,
            '\\' if in_string => escaped = !escaped,
            _ => {}
        }
        if ch != '\\' {
            escaped = false;
        }
        if ch == ' ' && !in_string {
            assert!(!prev_space, "double space outside string in {minified:?}");
            prev_space = true;
        } else {
            prev_space = false;
        }
    }
    assert!(minified.contains("\"spaced  out\""));
}

#[test]
fn preserved_comments_survive_minification() {
    let minified = minify_preserving("{ \"a\": 1 /* keep */, \"b\": 2 }");
    assert_eq!(minified, r#"{"a":1/* keep */,"b":2}"#);
    let parsed: Value = serde_json::from_str(&minified.replace("/* keep */", "")).unwrap();
    assert_eq!(parsed["b"], Value::from(2));
}

#[test]
fn line_comments_keep_their_line_break() {
    let minified = minify_preserving("[\n  1, // one\n  2\n]");
    assert_eq!(minified, "[1,// one\n2]");
}

#[test]
fn blank_lines_remain_when_preserved() {
    let minified = minify_preserving("[\n1,\n\n2\n]");
    assert_eq!(minified, "[1,\n\n2]");
}

#[test]
fn no_line_breaks_without_comments_or_blanks() {
    let minified = minify("{\n  \"a\": [1,\n 2],\n  \"b\": {\"c\": 3}\n}");
    assert!(!minified.contains('\n'));
}

#[test]
fn minify_reports_errors_like_reformat() {
    assert!(Formatter::new().minify("{bad}").is_err());
    assert!(Formatter::new().minify("[1, // c\n2]").is_err());
}

//! The comment-policy contract and comment/blank-line placement through a
//! full reformat.

use neatjson::{CommentPolicy, Formatter};

fn preserving() -> Formatter {
    let mut formatter = Formatter::new();
    formatter.options.comment_policy = CommentPolicy::Preserve;
    formatter.options.preserve_blank_lines = true;
    formatter
}

#[test]
fn comments_are_errors_by_default() {
    let err = Formatter::new().reformat(r#"{"a":1 /* c */}"#, 0).unwrap_err();
    assert!(err.message.contains("Comments not allowed"));
    let pos = err.position.unwrap();
    assert_eq!(pos.row, 0);
    assert_eq!(pos.index, 7);
}

#[test]
fn line_comments_are_errors_by_default_too() {
    let err = Formatter::new().reformat("[1] // t", 0).unwrap_err();
    assert!(err.position.is_some());
}

#[test]
fn remove_policy_strips_all_comment_text() {
    let mut formatter = Formatter::new();
    formatter.options.comment_policy = CommentPolicy::Remove;
    let input = "[ /*a*/ 1, // b\n 2 /*c*/ ]";
    let output = formatter.reformat(input, 0).unwrap();
    assert!(!output.contains("/*"));
    assert!(!output.contains("//"));
    assert_eq!(output, "[ 1, 2 ]\n");
}

#[test]
fn prefix_comment_stays_on_the_value_line() {
    let output = preserving().reformat("[ /* lead */ 17 ]", 0).unwrap();
    assert_eq!(output, "[ /* lead */ 17 ]\n");
}

#[test]
fn postfix_block_comment_stays_inline() {
    let output = preserving().reformat(r#"{"a":1 /* c */}"#, 0).unwrap();
    assert_eq!(output, "{ \"a\": 1 /* c */ }\n");
}

#[test]
fn line_comment_forces_comma_before_it() {
    let input = "[\n  1, // one\n  2\n]";
    let output = preserving().reformat(input, 0).unwrap();
    let one_line = output.lines().find(|l| l.contains("// one")).unwrap();
    let comma = one_line.find(',').unwrap();
    let comment = one_line.find("//").unwrap();
    assert!(comma < comment, "comma must precede the comment: {one_line:?}");
}

#[test]
fn standalone_comment_keeps_its_own_row() {
    let input = "[\n  1,\n  // alone\n  2\n]";
    let output = preserving().reformat(input, 0).unwrap();
    assert!(output.lines().any(|l| l.trim() == "// alone"), "{output}");
}

#[test]
fn multiline_block_comment_is_reindented() {
    let input = "[\n    1,\n    /* first\n       second */\n    2\n]";
    let output = preserving().reformat(input, 0).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    let first = lines.iter().position(|l| l.contains("/* first")).unwrap();
    assert_eq!(lines[first], "    /* first");
    // The comment's own indent is replaced, relative indentation kept.
    assert_eq!(lines[first + 1], "       second */");
}

#[test]
fn middle_comment_stays_between_name_and_value() {
    let output = preserving().reformat(r#"{"a": /* mid */ 1}"#, 0).unwrap();
    assert_eq!(output, "{ \"a\": /* mid */ 1 }\n");
}

#[test]
fn multiline_middle_comment_splits_the_member() {
    let input = "{\"a\": // why\n 1}";
    let output = preserving().reformat(input, 0).unwrap();
    let expected = "\
{
    \"a\":
        // why
        1
}
";
    assert_eq!(output, expected);
}

#[test]
fn top_level_comments_surround_the_value() {
    let input = "// head\n{ \"a\": 1 }\n// tail";
    let output = preserving().reformat(input, 0).unwrap();
    let expected = "\
// head
{ \"a\": 1 }
// tail
";
    assert_eq!(output, expected);
}

#[test]
fn blank_lines_survive_between_members() {
    let input = "{\n\"a\": 1,\n\n\"b\": 2\n}";
    let output = preserving().reformat(input, 0).unwrap();
    let expected = "\
{
    \"a\": 1,

    \"b\": 2
}
";
    assert_eq!(output, expected);
}

#[test]
fn blank_lines_are_dropped_without_the_option() {
    let mut formatter = Formatter::new();
    formatter.options.comment_policy = CommentPolicy::Preserve;
    let output = formatter.reformat("[\n1,\n\n2\n]", 0).unwrap();
    assert_eq!(output, "[ 1, 2 ]\n");
}

#[test]
fn comment_only_document() {
    let output = preserving().reformat("// nothing else\n", 0).unwrap();
    assert_eq!(output, "// nothing else\n");
}

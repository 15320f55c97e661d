//! Cross-cutting guarantees: the output is the same data, formatting is a
//! fixed point, lines respect the width budget, and no line carries
//! trailing whitespace.

use neatjson::{CommentPolicy, Formatter, NumberListAlignment};
use rstest::rstest;
use serde_json::Value;

const CORPUS: &[&str] = &[
    "null",
    "true",
    "-0.5",
    r#""plain string""#,
    "[]",
    "{}",
    r#"{"a":1,"b":2}"#,
    "[1,2,3,4,5]",
    r#"[{"name":"Alice","age":30},{"name":"Bob","age":25}]"#,
    r#"{"xs":[1.5, 2.25, 3],"ys":[10, 200, 3000]}"#,
    "[1, 22, 333, 4444, 55, 6, 77, 888, 9999, 10]",
    r#"{"a":{"b":{"c":{"d":[1,2,3]}}}}"#,
    r#"[{"p":{"x":1,"y":2}},{"p":{"x":30,"y":40}},{"p":null}]"#,
    r#"{"k":"v","list":[[1,2],[3,4],[5,6]],"emptyish":[[],{}]}"#,
    r#"[0.1, -2.5, 3e2, 0.0001]"#,
    r#"{"unicode":"héllo — 世界","esc":"a\nbA"}"#,
];

fn formatter_for(width: usize, alignment: NumberListAlignment) -> Formatter {
    let mut formatter = Formatter::new();
    formatter.options.max_total_line_length = width;
    formatter.options.number_list_alignment = alignment;
    formatter
}

#[rstest]
#[case(120, NumberListAlignment::Decimal)]
#[case(40, NumberListAlignment::Decimal)]
#[case(25, NumberListAlignment::Left)]
#[case(60, NumberListAlignment::Right)]
#[case(60, NumberListAlignment::Normalize)]
fn reformat_preserves_the_data(#[case] width: usize, #[case] alignment: NumberListAlignment) {
    // Normalize may rewrite digits, so compare data only in the modes that
    // keep the original text.
    let check_data = alignment != NumberListAlignment::Normalize;
    for input in CORPUS {
        let output = formatter_for(width, alignment).reformat(input, 0).unwrap();
        if check_data {
            let before: Value = serde_json::from_str(input).unwrap();
            let after: Value = serde_json::from_str(&output)
                .unwrap_or_else(|e| panic!("unparseable output for {input}: {e}\n{output}"));
            assert_eq!(before, after, "data changed for {input}");
        } else {
            serde_json::from_str::<Value>(&output)
                .unwrap_or_else(|e| panic!("unparseable output for {input}: {e}\n{output}"));
        }
    }
}

#[rstest]
#[case(120, NumberListAlignment::Decimal)]
#[case(40, NumberListAlignment::Decimal)]
#[case(25, NumberListAlignment::Left)]
#[case(60, NumberListAlignment::Normalize)]
fn reformat_is_idempotent(#[case] width: usize, #[case] alignment: NumberListAlignment) {
    for input in CORPUS {
        let mut formatter = formatter_for(width, alignment);
        let once = formatter.reformat(input, 0).unwrap();
        let twice = formatter.reformat(&once, 0).unwrap();
        assert_eq!(once, twice, "not a fixed point for {input}");
    }
}

#[rstest]
#[case(120)]
#[case(40)]
#[case(25)]
fn no_line_ever_ends_with_whitespace(#[case] width: usize) {
    for input in CORPUS {
        let output = formatter_for(width, NumberListAlignment::Decimal)
            .reformat(input, 0)
            .unwrap();
        for line in output.lines() {
            assert!(
                !line.ends_with(' ') && !line.ends_with('\t'),
                "trailing whitespace in {line:?} for {input}"
            );
        }
    }
}

#[test]
fn lines_respect_the_width_budget() {
    // Short scalars throughout, so the single-value exemption never applies.
    let inputs = [
        r#"[{"name":"Alice","age":30},{"name":"Bob","age":25}]"#,
        "[1, 22, 333, 4444, 55, 6, 77, 888, 9999, 10]",
        r#"{"a":{"b":{"c":{"d":[1,2,3]}}}}"#,
        r#"{"k":"v","list":[[1,2],[3,4],[5,6]]}"#,
    ];
    for width in [30usize, 50, 80] {
        for input in inputs {
            let output = formatter_for(width, NumberListAlignment::Decimal)
                .reformat(input, 0)
                .unwrap();
            for line in output.lines() {
                assert!(
                    line.chars().count() <= width,
                    "line wider than {width} for {input}: {line:?}"
                );
            }
        }
    }
}

#[test]
fn comments_and_blanks_survive_idempotently() {
    let mut formatter = Formatter::new();
    formatter.options.comment_policy = CommentPolicy::Preserve;
    formatter.options.preserve_blank_lines = true;
    let input = "\
{
    // leading note
    \"a\": 1, // inline note

    \"b\": [1, 2] /* block */
}
";
    let once = formatter.reformat(input, 0).unwrap();
    let twice = formatter.reformat(&once, 0).unwrap();
    assert_eq!(once, twice);
    for text in ["// leading note", "// inline note", "/* block */"] {
        assert!(once.contains(text), "lost {text}: {once}");
    }
}

#[test]
fn custom_width_hook_drives_layout() {
    let mut formatter = Formatter::new();
    formatter.options.max_total_line_length = 20;
    formatter.set_string_width_fn(|s| 2 * s.chars().count());
    let output = formatter.reformat(r#"{"ab":1}"#, 0).unwrap();
    // Under a double-width measure the object no longer fits inline.
    assert_eq!(output, "{\n    \"ab\": 1\n}\n");
}

#[test]
fn serialized_values_format_like_parsed_text() {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Player {
        name: String,
        scores: Vec<i64>,
    }

    let player = Player { name: "Ada".into(), scores: vec![95, 87, 92] };
    let mut formatter = Formatter::new();
    let from_value = formatter.serialize(&player, 0, 100).unwrap();
    let from_text = formatter
        .reformat(r#"{"name":"Ada","scores":[95,87,92]}"#, 0)
        .unwrap();
    assert_eq!(from_value, from_text);
}

#[test]
fn serialize_honors_the_recursion_limit() {
    let deep = serde_json::json!([[[[[[1]]]]]]);
    let mut formatter = Formatter::new();
    let err = formatter.serialize(&deep, 0, 3).unwrap_err();
    assert!(err.message.contains("Depth limit"));
    assert!(formatter.serialize(&deep, 0, 100).is_ok());
}

use crate::dom::{Element, ElementKind};
use crate::error::FormatError;

/// Build an element tree from an in-memory value.
///
/// `depth_budget` bounds the recursion; running out of it means the value
/// is deeper than any sane document, most likely a structure that expands
/// without end. No identity-based cycle detection is attempted.
pub fn element_from_value(
    value: &serde_json::Value,
    prop_name: Option<&str>,
    depth_budget: usize,
) -> Result<Element, FormatError> {
    if depth_budget == 0 {
        return Err(FormatError::plain(
            "Depth limit exceeded while serializing, possible circular reference",
        ));
    }

    let mut element = Element::default();
    if let Some(name) = prop_name {
        element.name = quote_string(name);
    }

    match value {
        serde_json::Value::Null => {
            element.kind = ElementKind::Null;
            element.value = "null".to_string();
        }
        serde_json::Value::Bool(b) => {
            element.kind = if *b { ElementKind::True } else { ElementKind::False };
            element.value = b.to_string();
        }
        serde_json::Value::Number(n) => {
            element.kind = ElementKind::Number;
            element.value = n.to_string();
        }
        serde_json::Value::String(s) => {
            element.kind = ElementKind::String;
            element.value = quote_string(s);
        }
        serde_json::Value::Array(items) => {
            element.kind = ElementKind::Array;
            element.children = items
                .iter()
                .map(|item| element_from_value(item, None, depth_budget - 1))
                .collect::<Result<_, _>>()?;
        }
        serde_json::Value::Object(map) => {
            element.kind = ElementKind::Object;
            element.children = map
                .iter()
                .map(|(key, val)| element_from_value(val, Some(key), depth_budget - 1))
                .collect::<Result<_, _>>()?;
        }
    }

    if let Some(deepest) = element.children.iter().map(|c| c.complexity).max() {
        element.complexity = deepest + 1;
    }
    Ok(element)
}

fn quote_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_convert_with_quoted_strings() {
        let element = element_from_value(&json!("hi"), Some("greeting"), 10).unwrap();
        assert_eq!(element.kind, ElementKind::String);
        assert_eq!(element.name, "\"greeting\"");
        assert_eq!(element.value, "\"hi\"");
    }

    #[test]
    fn containers_track_complexity() {
        let element = element_from_value(&json!({"a": [1, 2], "b": 3}), None, 10).unwrap();
        assert_eq!(element.complexity, 2);
        assert_eq!(element.children[0].complexity, 1);
    }

    #[test]
    fn depth_budget_stops_runaway_recursion() {
        let deep = json!([[[[[1]]]]]);
        assert!(element_from_value(&deep, None, 3).is_err());
        assert!(element_from_value(&deep, None, 10).is_ok());
    }
}

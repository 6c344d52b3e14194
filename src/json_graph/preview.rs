//! Textual content shown inside a node card.

use serde_json::Value;

/// Number of scalar entries shown for a container.
pub const PREVIEW_LIMIT: usize = 5;

/// Objects and arrays get nodes of their own; everything else is a scalar.
pub fn is_container(value: &Value) -> bool {
	matches!(value, Value::Object(_) | Value::Array(_))
}

/// Content string for a node created from `value`.
///
/// Containers list their scalar entries as `key: literal`. Nested containers
/// are dropped before truncating to [`PREVIEW_LIMIT`], so a wide object still
/// shows its first five scalars no matter where its children sit.
pub fn node_content(value: &Value) -> String {
	match value {
		Value::Object(map) => {
			let lines = scalar_lines(map.iter().map(|(k, v)| (k.clone(), v)));
			if lines.is_empty() {
				"Object {}".to_string()
			} else {
				lines.join("\n")
			}
		}
		Value::Array(items) => {
			let lines = scalar_lines(items.iter().enumerate().map(|(i, v)| (i.to_string(), v)));
			if lines.is_empty() {
				format!("Array [{}]", items.len())
			} else {
				lines.join("\n")
			}
		}
		scalar => scalar_text(scalar),
	}
}

fn scalar_lines<'a>(entries: impl Iterator<Item = (String, &'a Value)>) -> Vec<String> {
	entries
		.filter(|(_, v)| !is_container(v))
		.take(PREVIEW_LIMIT)
		.map(|(k, v)| format!("{}: {}", k, v))
		.collect()
}

/// Primitive rendering; strings come out without quotes.
pub fn scalar_text(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn scalars_render_as_literals() {
		assert_eq!(node_content(&json!(null)), "null");
		assert_eq!(node_content(&json!(true)), "true");
		assert_eq!(node_content(&json!(42)), "42");
		assert_eq!(node_content(&json!(1.5)), "1.5");
		assert_eq!(node_content(&json!("hello")), "hello");
	}

	#[test]
	fn object_preview_quotes_strings() {
		let v = json!({"name": "ada", "age": 36, "admin": false, "tag": null});
		assert_eq!(node_content(&v), "name: \"ada\"\nage: 36\nadmin: false\ntag: null");
	}

	#[test]
	fn array_preview_uses_indices() {
		assert_eq!(node_content(&json!([1, "x", {"a": 1}, 3])), "0: 1\n1: \"x\"\n3: 3");
	}

	#[test]
	fn nested_entries_are_filtered_before_truncation() {
		let v = json!({
			"a": {}, "b": 1, "c": [], "d": 2, "e": 3, "f": {"x": 1}, "g": 4, "h": 5, "i": 6
		});
		assert_eq!(node_content(&v), "b: 1\nd: 2\ne: 3\ng: 4\nh: 5");
	}

	#[test]
	fn containers_without_scalars_use_placeholders() {
		assert_eq!(node_content(&json!({})), "Object {}");
		assert_eq!(node_content(&json!({"a": {"b": 1}})), "Object {}");
		assert_eq!(node_content(&json!([])), "Array [0]");
		assert_eq!(node_content(&json!([[1], {"a": 2}])), "Array [2]");
	}
}

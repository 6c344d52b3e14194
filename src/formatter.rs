//! Parsing, pretty-printing and minifying user supplied JSON text.

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

/// Indent widths offered by the formatter.
pub const INDENT_CHOICES: [usize; 2] = [2, 4];

/// Reasons the formatter rejects input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum JsonToolError {
	/// Nothing but whitespace.
	#[error("input is empty")]
	Empty,
	/// Text is not valid JSON.
	#[error("line {line}, column {column}: {message}")]
	Syntax {
		/// 1-based line of the failure.
		line: usize,
		/// 1-based column of the failure.
		column: usize,
		/// Parser message without its position suffix.
		message: String,
	},
	/// Writing the value back out failed.
	#[error("failed to write json: {0}")]
	Serialize(String),
}

impl From<serde_json::Error> for JsonToolError {
	fn from(err: serde_json::Error) -> Self {
		// serde_json appends " at line X column Y" to Display; keep the bare reason.
		let full = err.to_string();
		let message = match full.rfind(" at line ") {
			Some(at) => full[..at].to_string(),
			None => full,
		};
		JsonToolError::Syntax {
			line: err.line(),
			column: err.column(),
			message,
		}
	}
}

/// Parses `text`, rejecting blank input.
pub fn parse_json(text: &str) -> Result<Value, JsonToolError> {
	if text.trim().is_empty() {
		return Err(JsonToolError::Empty);
	}
	Ok(serde_json::from_str(text)?)
}

/// Pretty prints `text` with `indent` spaces per level, keeping key order.
pub fn format_json(text: &str, indent: usize) -> Result<String, JsonToolError> {
	let value = parse_json(text)?;
	let pad = " ".repeat(indent);
	let mut out = Vec::new();
	let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(pad.as_bytes()));
	value
		.serialize(&mut ser)
		.map_err(|e| JsonToolError::Serialize(e.to_string()))?;
	String::from_utf8(out).map_err(|e| JsonToolError::Serialize(e.to_string()))
}

/// Re-emits `text` without insignificant whitespace.
pub fn minify_json(text: &str) -> Result<String, JsonToolError> {
	let value = parse_json(text)?;
	serde_json::to_string(&value).map_err(|e| JsonToolError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn blank_input_is_empty_error() {
		assert_eq!(parse_json("  \n\t"), Err(JsonToolError::Empty));
	}

	#[test]
	fn syntax_errors_carry_position() {
		let err = parse_json("{\n  \"a\": 1,\n  \"b\": }").unwrap_err();
		match &err {
			JsonToolError::Syntax { line, column, message } => {
				assert_eq!(*line, 3);
				assert!(*column > 0);
				assert!(!message.contains("at line"), "{}", message);
			}
			other => panic!("unexpected error {:?}", other),
		}
		assert!(err.to_string().starts_with("line 3, column "));
	}

	#[test]
	fn format_keeps_key_order_and_indent() {
		let out = format_json(r#"{"z":1,"a":[true,null]}"#, 4).unwrap();
		assert_eq!(out, "{\n    \"z\": 1,\n    \"a\": [\n        true,\n        null\n    ]\n}");
		let two = format_json(r#"{"k":{}}"#, 2).unwrap();
		assert_eq!(two, "{\n  \"k\": {}\n}");
	}

	#[test]
	fn minify_strips_whitespace() {
		let out = minify_json("{ \"b\" : [ 1, 2 ],\n \"a\" : \"x y\" }").unwrap();
		assert_eq!(out, r#"{"b":[1,2],"a":"x y"}"#);
	}

	#[test]
	fn minify_reports_parse_errors() {
		assert!(matches!(minify_json("[1,"), Err(JsonToolError::Syntax { .. })));
	}
}

//! Corpus records and the JSON loader feeding them to the model.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::io;

/// A titled document. Title and content are tokenized and trained as one
/// continuous stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Record {
	pub title: String,
	pub content: String,
}

impl Record {
	pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
		Self { title: title.into(), content: content.into() }
	}

	/// Builds a record from a parsed JSON value.
	///
	/// Strings are taken as-is. Every other value is coerced to text the way
	/// the legacy corpora were rendered: `null` becomes `None`, booleans
	/// become `True`/`False`, arrays and objects are written out with their
	/// nested values rendered the same way.
	///
	/// # Errors
	/// `MalformedRecord` carrying `index` if the record is not an object or a
	/// field is missing.
	pub fn from_value(index: usize, value: &Value) -> Result<Self> {
		let object = value.as_object().ok_or_else(|| ModelError::MalformedRecord {
			index,
			reason: format!("expected an object, got {}", kind(value)),
		})?;

		Ok(Self {
			title: coerce_field(index, object, "title")?,
			content: coerce_field(index, object, "content")?,
		})
	}
}

fn coerce_field(index: usize, object: &Map<String, Value>, field: &str) -> Result<String> {
	match object.get(field) {
		Some(Value::String(s)) => Ok(s.clone()),
		Some(other) => {
			let mut text = String::new();
			render(other, &mut text);
			Ok(text)
		}
		None => Err(ModelError::MalformedRecord { index, reason: format!("missing field `{field}`") }),
	}
}

/// Writes `value` as text. Nested strings are single-quoted.
fn render(value: &Value, out: &mut String) {
	match value {
		Value::Null => out.push_str("None"),
		Value::Bool(true) => out.push_str("True"),
		Value::Bool(false) => out.push_str("False"),
		Value::Number(n) => out.push_str(&n.to_string()),
		Value::String(s) => {
			out.push('\'');
			out.push_str(s);
			out.push('\'');
		}
		Value::Array(items) => {
			out.push('[');
			for (i, item) in items.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				render(item, out);
			}
			out.push(']');
		}
		Value::Object(map) => {
			out.push('{');
			for (i, (key, item)) in map.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				out.push('\'');
				out.push_str(key);
				out.push_str("': ");
				render(item, out);
			}
			out.push('}');
		}
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Parses a JSON array of `{title, content}` objects.
///
/// The first malformed record aborts parsing; records are never skipped.
pub fn parse_records(json: &str) -> Result<Vec<Record>> {
	let values: Vec<Value> = serde_json::from_str(json)?;
	values.iter().enumerate().map(|(index, value)| Record::from_value(index, value)).collect()
}

/// Reads and parses a JSON corpus file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
	let contents = io::read_file(&path)?;
	let records = parse_records(&contents)?;
	log::info!("Loaded {} record(s) from {}", records.len(), path.as_ref().display());
	Ok(records)
}

/// Reads every `.json` corpus directly contained in `folder`, in file name order.
///
/// # Errors
/// Returns an error if `folder` is not a directory or if any corpus fails to load.
pub fn load_folder<P: AsRef<Path>>(folder: P) -> Result<Vec<Record>> {
	let folder = folder.as_ref();
	if !folder.is_dir() {
		return Err(ModelError::InvalidParameter(format!(
			"expected a directory, got: {}",
			folder.display()
		)));
	}

	let mut records = Vec::new();
	for file in io::list_files(folder, "json")? {
		records.extend(load_records(folder.join(file))?);
	}
	Ok(records)
}

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Payload equality constraints. An array value matches any of its elements.
pub type PayloadFilter = Map<String, Value>;

/// One similarity-index result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexHit {
	pub candidate_id: String,
	/// Similarity in `0.0..=1.0`.
	pub score: f32,
	pub metadata: Map<String, Value>,
}

pub(crate) fn clamp_similarity(score: f32) -> f32 {
	if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.0 }
}

/// In-process counterpart of the Qdrant `must` filter: every field must equal the filter value,
/// or one of its elements when the filter value is an array.
pub fn payload_matches(metadata: &Map<String, Value>, filter: &PayloadFilter) -> bool {
	filter.iter().all(|(field, expected)| {
		let Some(actual) = metadata.get(field) else {
			return false;
		};

		match expected {
			Value::Array(options) => options.iter().any(|option| option == actual),
			other => other == actual,
		}
	})
}

/// Filters every index adapter accepts: each value is a string, an integer, a boolean, or a
/// non-empty array of only strings or only integers.
pub fn check_filter(filter: &PayloadFilter) -> Result<()> {
	for (field, value) in filter {
		let supported = match value {
			Value::String(_) | Value::Bool(_) => true,
			Value::Number(number) => number.as_i64().is_some(),
			Value::Array(items) =>
				!items.is_empty()
					&& (items.iter().all(Value::is_string)
						|| items.iter().all(|item| item.as_i64().is_some())),
			Value::Null | Value::Object(_) => false,
		};

		if !supported {
			return Err(unsupported_filter(field));
		}
	}

	Ok(())
}

pub(crate) fn unsupported_filter(field: &str) -> Error {
	Error::InvalidArgument(format!(
		"Filter {field} must be a string, integer, boolean, or a homogeneous array of strings or integers."
	))
}

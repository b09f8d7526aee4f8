//! JSON-backed candidate document store.
//!
//! Accepts either flat records or documents whose profile sits under `parsed_info`, with the
//! resume text in `full_text` or `extracted_text`. Experience and education entries may be plain
//! strings or objects; objects are flattened to one line of text.

use std::{collections::HashMap, fs, path::Path};

use serde_json::{Map, Value};

use sift_domain::CandidateRecord;

use crate::{Error, Result};

const ID_FIELDS: [&str; 2] = ["id", "_id"];
const PROFILE_FIELD: &str = "parsed_info";
const FULL_TEXT_FIELDS: [&str; 2] = ["full_text", "extracted_text"];
/// Object keys rendered first when flattening an entry; the rest follow in key order.
const LEADING_KEYS: [&str; 10] = [
	"title",
	"position",
	"role",
	"degree",
	"field",
	"company",
	"institution",
	"duration",
	"year",
	"description",
];

#[derive(Debug, Default)]
pub struct JsonCandidateStore {
	records: HashMap<String, CandidateRecord>,
}
impl JsonCandidateStore {
	pub fn from_path(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;
		let json: Value = serde_json::from_str(&raw)?;
		let store = Self::from_json(&json)?;

		tracing::info!(path = %path.display(), candidates = store.len(), "Loaded candidate store.");

		Ok(store)
	}

	/// Builds the store from a JSON array of candidate documents. Ids must be unique.
	pub fn from_json(json: &Value) -> Result<Self> {
		let Some(items) = json.as_array() else {
			return Err(Error::InvalidArgument(
				"Candidate file must hold a JSON array of records.".to_string(),
			));
		};
		let mut records = Vec::with_capacity(items.len());

		for (position, item) in items.iter().enumerate() {
			records.push(parse_record(position, item)?);
		}

		Self::from_records(records)
	}

	pub fn from_records(records: impl IntoIterator<Item = CandidateRecord>) -> Result<Self> {
		let mut store = Self::default();

		for record in records {
			if store.records.contains_key(&record.id) {
				return Err(Error::InvalidArgument(format!("Duplicate candidate id {}.", record.id)));
			}

			store.records.insert(record.id.clone(), record);
		}

		Ok(store)
	}

	pub fn find_by_id(&self, id: &str) -> Option<&CandidateRecord> {
		self.records.get(id)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Records in ascending id order.
	pub fn records(&self) -> Vec<&CandidateRecord> {
		let mut records: Vec<&CandidateRecord> = self.records.values().collect();

		records.sort_by(|a, b| a.id.cmp(&b.id));

		records
	}
}

fn parse_record(position: usize, item: &Value) -> Result<CandidateRecord> {
	let Some(doc) = item.as_object() else {
		return Err(Error::InvalidArgument(format!("Candidate #{position} must be an object.")));
	};
	let id = ID_FIELDS
		.iter()
		.find_map(|field| doc.get(*field).and_then(scalar_text))
		.filter(|id| !id.trim().is_empty())
		.ok_or_else(|| {
			Error::InvalidArgument(format!("Candidate #{position} is missing an id."))
		})?;
	let profile = doc.get(PROFILE_FIELD).and_then(Value::as_object).unwrap_or(doc);

	Ok(CandidateRecord {
		id,
		file_name: text_field(doc, "file_name"),
		name: text_field(profile, "name"),
		skills: skills(profile.get("skills")),
		experience: entries(profile.get("experience")),
		education: entries(profile.get("education")),
		summary: text_field(profile, "summary"),
		full_text: FULL_TEXT_FIELDS
			.iter()
			.find_map(|field| doc.get(*field).and_then(Value::as_str))
			.unwrap_or_default()
			.to_string(),
	})
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
	object.get(key).and_then(scalar_text).unwrap_or_default()
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.trim().to_string()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}

/// Skills may be an array or one comma-separated string.
fn skills(value: Option<&Value>) -> Vec<String> {
	match value {
		Some(Value::String(text)) => text
			.split(',')
			.map(str::trim)
			.filter(|skill| !skill.is_empty())
			.map(str::to_string)
			.collect(),
		Some(Value::Array(_)) => entries(value),
		_ => Vec::new(),
	}
}

fn entries(value: Option<&Value>) -> Vec<String> {
	let Some(Value::Array(items)) = value else {
		return Vec::new();
	};

	items.iter().map(flatten_entry).filter(|entry| !entry.is_empty()).collect()
}

fn flatten_entry(value: &Value) -> String {
	match value {
		Value::Object(object) => {
			let mut parts: Vec<String> = Vec::new();

			for key in LEADING_KEYS {
				if let Some(text) = object.get(key).map(flatten_entry) {
					parts.push(text);
				}
			}
			for (key, nested) in object {
				if !LEADING_KEYS.contains(&key.as_str()) {
					parts.push(flatten_entry(nested));
				}
			}

			join_nonempty(parts)
		},
		Value::Array(items) => join_nonempty(items.iter().map(flatten_entry).collect()),
		other => scalar_text(other).unwrap_or_default(),
	}
}

fn join_nonempty(parts: Vec<String>) -> String {
	parts.into_iter().filter(|part| !part.is_empty()).collect::<Vec<_>>().join(" ")
}

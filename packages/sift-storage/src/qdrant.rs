use std::collections::HashMap;

use qdrant_client::qdrant::{
	Condition, Filter, PointId, Query, QueryPointsBuilder, ScoredPoint, Value,
	point_id::PointIdOptions, value::Kind,
};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{
	Error, Result,
	models::{self, IndexHit, PayloadFilter},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	pub candidate_id_field: String,
}
impl QdrantStore {
	pub fn new(cfg: &sift_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			candidate_id_field: cfg.candidate_id_field.clone(),
		})
	}

	/// Nearest-neighbour search over the collection, best first.
	pub async fn query(
		&self,
		vector: &[f32],
		limit: u32,
		filter: Option<&PayloadFilter>,
	) -> Result<Vec<IndexHit>> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; collection expects {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		let mut search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.with_payload(true)
			.limit(u64::from(limit));

		if let Some(filter) = filter.filter(|filter| !filter.is_empty()) {
			search = search.filter(build_filter(filter)?);
		}

		let response = self.client.query(search).await?;
		let hits: Vec<IndexHit> = response
			.result
			.into_iter()
			.filter_map(|point| scored_point_to_hit(point, &self.candidate_id_field))
			.collect();

		tracing::debug!(collection = %self.collection, hits = hits.len(), "Qdrant query finished.");

		Ok(hits)
	}
}

/// Every entry becomes a `must` match condition.
pub fn build_filter(filter: &PayloadFilter) -> Result<Filter> {
	let mut conditions = Vec::with_capacity(filter.len());

	for (field, value) in filter {
		let condition = match value {
			JsonValue::String(text) => Condition::matches(field.clone(), text.clone()),
			JsonValue::Bool(flag) => Condition::matches(field.clone(), *flag),
			JsonValue::Number(number) => match number.as_i64() {
				Some(integer) => Condition::matches(field.clone(), integer),
				None => return Err(models::unsupported_filter(field)),
			},
			JsonValue::Array(items) => array_condition(field, items)?,
			_ => return Err(models::unsupported_filter(field)),
		};

		conditions.push(condition);
	}

	Ok(Filter::must(conditions))
}

fn array_condition(field: &str, items: &[JsonValue]) -> Result<Condition> {
	if items.is_empty() {
		return Err(models::unsupported_filter(field));
	}

	let keywords: Option<Vec<String>> =
		items.iter().map(|item| item.as_str().map(str::to_string)).collect();

	if let Some(keywords) = keywords {
		return Ok(Condition::matches(field.to_string(), keywords));
	}

	let integers: Option<Vec<i64>> = items.iter().map(JsonValue::as_i64).collect();

	match integers {
		Some(integers) => Ok(Condition::matches(field.to_string(), integers)),
		None => Err(models::unsupported_filter(field)),
	}
}

fn scored_point_to_hit(point: ScoredPoint, candidate_id_field: &str) -> Option<IndexHit> {
	let candidate_id = payload_id(&point.payload, candidate_id_field)
		.or_else(|| point.id.as_ref().and_then(point_id_to_string))?;
	let metadata: Map<String, JsonValue> =
		point.payload.into_iter().map(|(key, value)| (key, value_to_json(value))).collect();

	Some(IndexHit { candidate_id, score: models::clamp_similarity(point.score), metadata })
}

fn payload_id(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) if !text.trim().is_empty() => Some(text.to_string()),
		Some(Kind::IntegerValue(value)) => Some(value.to_string()),
		_ => None,
	}
}

fn point_id_to_string(point_id: &PointId) -> Option<String> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Some(id.clone()),
		Some(PointIdOptions::Num(num)) => Some(num.to_string()),
		None => None,
	}
}

fn value_to_json(value: Value) -> JsonValue {
	match value.kind {
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(flag),
		Some(Kind::IntegerValue(integer)) => JsonValue::from(integer),
		Some(Kind::DoubleValue(double)) =>
			Number::from_f64(double).map(JsonValue::Number).unwrap_or(JsonValue::Null),
		Some(Kind::StringValue(text)) => JsonValue::String(text),
		Some(Kind::ListValue(list)) =>
			JsonValue::Array(list.values.into_iter().map(value_to_json).collect()),
		Some(Kind::StructValue(object)) => JsonValue::Object(
			object.fields.into_iter().map(|(key, value)| (key, value_to_json(value))).collect(),
		),
		Some(Kind::NullValue(_)) | None => JsonValue::Null,
	}
}

//! Weightage storage and per-request resolution.
//!
//! Resolution order: request override, then the weightage source (session, then global when the
//! session value is missing or rejected), then the configured default, then the built-in default.
//! Each layer is validated on read; a layer that fails validation is skipped and reported as a
//! warning.

use std::{
	collections::HashMap,
	sync::{PoisonError, RwLock},
};

use serde::Serialize;

use sift_config::Config;
use sift_domain::{WeightageError, WeightageParameters};

use crate::{BoxFuture, WeightageSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightageOrigin {
	Request,
	Store,
	Config,
	Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWeightage {
	pub parameters: WeightageParameters,
	pub origin: WeightageOrigin,
	/// One entry per rejected layer.
	pub warnings: Vec<String>,
}
impl ResolvedWeightage {
	fn new(
		parameters: WeightageParameters,
		origin: WeightageOrigin,
		warnings: Vec<String>,
	) -> Self {
		Self { parameters, origin, warnings }
	}
}

/// Layered in-memory weightage: per-session values over one global default.
#[derive(Debug, Default)]
pub struct InMemoryWeightageStore {
	global: RwLock<Option<WeightageParameters>>,
	sessions: RwLock<HashMap<String, WeightageParameters>>,
}
impl InMemoryWeightageStore {
	/// Stores `weightage` for `session_id`, or as the global default when no session is given.
	///
	/// Invalid weightage is rejected and the previous value stays active.
	pub fn set_weightage(
		&self,
		session_id: Option<&str>,
		weightage: WeightageParameters,
	) -> Result<(), WeightageError> {
		weightage.validate()?;

		match session_id {
			Some(session_id) => {
				self.sessions
					.write()
					.unwrap_or_else(PoisonError::into_inner)
					.insert(session_id.to_string(), weightage);
			},
			None => {
				*self.global.write().unwrap_or_else(PoisonError::into_inner) = Some(weightage);
			},
		}

		Ok(())
	}

	pub fn weightage(&self, session_id: Option<&str>) -> Option<WeightageParameters> {
		let session = session_id.and_then(|session_id| {
			self.sessions.read().unwrap_or_else(PoisonError::into_inner).get(session_id).copied()
		});

		session.or_else(|| *self.global.read().unwrap_or_else(PoisonError::into_inner))
	}

	/// Returns whether a session value was removed.
	pub fn delete_session_weightage(&self, session_id: &str) -> bool {
		self.sessions.write().unwrap_or_else(PoisonError::into_inner).remove(session_id).is_some()
	}
}

impl WeightageSource for InMemoryWeightageStore {
	fn get_weightage<'a>(
		&'a self,
		session_id: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Option<WeightageParameters>>> {
		let weightage = self.weightage(session_id);

		Box::pin(async move { Ok(weightage) })
	}
}

pub(crate) async fn resolve(
	cfg: &Config,
	source: &dyn WeightageSource,
	requested: Option<WeightageParameters>,
	session_id: Option<&str>,
) -> ResolvedWeightage {
	let mut warnings = Vec::new();

	if let Some(requested) = requested {
		match requested.validate() {
			Ok(()) => return ResolvedWeightage::new(requested, WeightageOrigin::Request, warnings),
			Err(err) => reject(&mut warnings, WeightageOrigin::Request, &err.to_string()),
		}
	}

	// A rejected session value falls back to the stored global value before config.
	let layers = [session_id, None];
	let layer_count = if session_id.is_some() { 2 } else { 1 };
	let mut rejected: Option<WeightageParameters> = None;

	for layer in &layers[..layer_count] {
		match source.get_weightage(*layer).await {
			Ok(Some(stored)) if rejected == Some(stored) => {},
			Ok(Some(stored)) => match stored.validate() {
				Ok(()) => return ResolvedWeightage::new(stored, WeightageOrigin::Store, warnings),
				Err(err) => {
					reject(&mut warnings, WeightageOrigin::Store, &err.to_string());

					rejected = Some(stored);
				},
			},
			Ok(None) => {},
			Err(err) => reject(&mut warnings, WeightageOrigin::Store, &err.to_string()),
		}
	}

	let configured = WeightageParameters::from(&cfg.weightage);

	match configured.validate() {
		Ok(()) => ResolvedWeightage::new(configured, WeightageOrigin::Config, warnings),
		Err(err) => {
			reject(&mut warnings, WeightageOrigin::Config, &err.to_string());

			ResolvedWeightage::new(WeightageParameters::DEFAULT, WeightageOrigin::Default, warnings)
		},
	}
}

fn reject(warnings: &mut Vec<String>, origin: WeightageOrigin, reason: &str) {
	tracing::warn!(?origin, reason, "Weightage rejected; falling back.");

	warnings.push(format!("{origin:?} weightage rejected ({reason}); using the next fallback."));
}

#[cfg(test)]
mod tests {
	use super::*;

	fn weights(education: f64, skill: f64, experience: f64, domain: f64) -> WeightageParameters {
		WeightageParameters {
			education,
			skill_match: skill,
			experience,
			domain_relevance: domain,
		}
	}

	#[test]
	fn session_value_shadows_global() {
		let store = InMemoryWeightageStore::default();
		let global = weights(0.25, 0.25, 0.25, 0.25);
		let session = weights(0.1, 0.6, 0.2, 0.1);

		store.set_weightage(None, global).expect("global weightage is valid");
		store.set_weightage(Some("s1"), session).expect("session weightage is valid");

		assert_eq!(store.weightage(Some("s1")), Some(session));
		assert_eq!(store.weightage(Some("s2")), Some(global));
		assert_eq!(store.weightage(None), Some(global));
	}

	#[test]
	fn invalid_set_keeps_previous_value() {
		let store = InMemoryWeightageStore::default();
		let valid = weights(0.4, 0.3, 0.2, 0.1);

		store.set_weightage(Some("s1"), valid).expect("weightage is valid");

		let err = store
			.set_weightage(Some("s1"), weights(0.5, 0.5, 0.5, 0.5))
			.expect_err("sum of 2.0 must be rejected");

		assert!(matches!(err, WeightageError::BadSum { .. }));
		assert_eq!(store.weightage(Some("s1")), Some(valid));
	}

	#[test]
	fn deleting_a_session_reveals_global() {
		let store = InMemoryWeightageStore::default();

		store.set_weightage(Some("s1"), weights(0.4, 0.3, 0.2, 0.1)).expect("weightage is valid");

		assert!(store.delete_session_weightage("s1"));
		assert!(!store.delete_session_weightage("s1"));
		assert_eq!(store.weightage(Some("s1")), None);
	}
}

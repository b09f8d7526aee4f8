use std::{sync::Arc, time::Duration};

use serde_json::json;

use sift_domain::{CandidateRecord, WeightageParameters, analyze, expand_query};
use sift_service::{
	BoxFuture, CandidateStore, Collaborators, Error, InMemoryWeightageStore, RankRequest,
	RankingService, SimilarityIndex, VariantKind, WeightageOrigin, WeightageSource,
	search::plan_variants,
};
use sift_testkit::{
	FailingEmbedding, FlakyStore, HashingEmbedding, ScriptedIndex, candidate, collaborators, hit,
	hit_with, test_config,
};

const RICH_QUERY: &str = "senior backend engineer with python and docker";

fn records() -> Vec<CandidateRecord> {
	vec![
		candidate("a")
			.name("Ada")
			.file_name("ada.pdf")
			.skills(&["Python", "Docker", "PostgreSQL"])
			.experience(&["Backend Engineer at Shop", "Developer at Agency"])
			.education(&["MSc Computer Science"])
			.summary("Senior backend engineer, 6 years")
			.full_text("Ada Lovelace. Wrote Python services for payments. Enjoys chess.")
			.build(),
		candidate("b")
			.name("Bo")
			.file_name("bo.pdf")
			.skills(&["Java", "Spring"])
			.experience(&["Engineer at Bank"])
			.summary("Java developer")
			.build(),
		candidate("c")
			.name("Cy")
			.skills(&["Go"])
			.summary("Infrastructure")
			.build(),
	]
}

/// Answers every lookup with the same record, whose own id is left empty.
struct AnonymousStore;
impl CandidateStore for AnonymousStore {
	fn find_by_id<'a>(
		&'a self,
		_id: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Option<CandidateRecord>>> {
		let record = CandidateRecord {
			name: "Anon".to_string(),
			skills: vec!["Rust".to_string()],
			summary: "Engineer with 99999999999 years".to_string(),
			..CandidateRecord::default()
		};

		Box::pin(async move { Ok(Some(record)) })
	}
}

/// Stores a session value and a global value independently, without validating either.
struct LayeredWeightage {
	session: WeightageParameters,
	global: WeightageParameters,
}
impl WeightageSource for LayeredWeightage {
	fn get_weightage<'a>(
		&'a self,
		session_id: Option<&'a str>,
	) -> BoxFuture<'a, color_eyre::Result<Option<WeightageParameters>>> {
		let weightage = if session_id.is_some() { self.session } else { self.global };

		Box::pin(async move { Ok(Some(weightage)) })
	}
}

fn service_with(index: Arc<dyn SimilarityIndex>, records: Vec<CandidateRecord>) -> RankingService {
	let store = sift_testkit::store(records).expect("candidate ids are unique");

	RankingService::new(test_config(), collaborators(index, Arc::new(store)))
}

fn request(query: &str) -> RankRequest {
	RankRequest { query: query.to_string(), ..RankRequest::default() }
}

fn variant_texts(query: &str) -> Vec<String> {
	plan_variants(&expand_query(query), &analyze(query, None), 4)
		.into_iter()
		.map(|variant| variant.text)
		.collect()
}

fn ids(response: &sift_service::RankResponse) -> Vec<&str> {
	response.matches.iter().map(|item| item.candidate_id.as_str()).collect()
}

#[tokio::test]
async fn no_hits_is_an_empty_result_not_an_error() {
	let index = Arc::new(ScriptedIndex::new());
	let service = service_with(index.clone(), records());
	let response = service.rank(request(RICH_QUERY)).await.expect("ranking succeeds");

	assert!(response.matches.is_empty());
	assert_eq!(response.diagnostics.raw_hits, 0);
	assert_eq!(response.diagnostics.unique_candidates, 0);
	assert_eq!(response.diagnostics.variants.len(), 4);
	assert!(response.diagnostics.variants.iter().all(|report| report.error.is_none()));
	assert_eq!(response.diagnostics.quality.top_score, 0.0);
	assert_eq!(index.calls(), 4);
}

#[tokio::test]
async fn duplicate_hits_keep_the_best_similarity() {
	let texts = variant_texts(RICH_QUERY);

	assert_eq!(texts.len(), 4);

	let index = ScriptedIndex::new()
		.with_hits(&texts[0], vec![hit("a", 0.4)])
		.with_hits(&texts[1], vec![hit("a", 0.9)])
		.with_failure(&texts[2], "shard offline")
		.otherwise_hits(vec![hit("b", 0.5)]);
	let service = service_with(Arc::new(index), records());
	let response = service.rank(request(RICH_QUERY)).await.expect("one failed variant is tolerated");
	let best = &response.matches[0];

	assert_eq!(ids(&response), vec!["a", "b"]);
	assert_eq!(best.explain.max_similarity, 0.9);
	assert_eq!(best.explain.variants, vec![VariantKind::Base, VariantKind::Role]);
	assert_eq!(response.diagnostics.raw_hits, 3);
	assert_eq!(response.diagnostics.unique_candidates, 2);
	assert!(response.diagnostics.variants[2].error.is_some());
	assert_eq!(response.diagnostics.variants[2].kind, VariantKind::Seniority);
}

#[tokio::test]
async fn every_variant_failing_is_a_retrieval_failure() {
	let index = ScriptedIndex::new().otherwise_fail("index unreachable");
	let service = service_with(Arc::new(index), records());
	let err = service.rank(request(RICH_QUERY)).await.expect_err("all variants failed");

	assert!(matches!(err, Error::RetrievalFailed { .. }), "{err}");
}

#[tokio::test]
async fn embedding_failure_is_a_retrieval_failure() {
	let index = Arc::new(ScriptedIndex::new());
	let store = sift_testkit::store(records()).expect("candidate ids are unique");
	let service = RankingService::new(
		test_config(),
		Collaborators {
			embedding: Arc::new(FailingEmbedding),
			index: index.clone(),
			store: Arc::new(store),
			weightage: Arc::new(InMemoryWeightageStore::default()),
		},
	);
	let err = service.rank(request(RICH_QUERY)).await.expect_err("embedding failed");

	assert!(matches!(err, Error::RetrievalFailed { .. }), "{err}");
	assert_eq!(index.calls(), 0);
}

#[tokio::test]
async fn variants_are_embedded_in_one_batch() {
	let embedding = HashingEmbedding::new();
	let store = sift_testkit::store(records()).expect("candidate ids are unique");
	let service = RankingService::new(
		test_config(),
		Collaborators {
			embedding: Arc::new(embedding.clone()),
			index: Arc::new(ScriptedIndex::new()),
			store: Arc::new(store),
			weightage: Arc::new(InMemoryWeightageStore::default()),
		},
	);

	service.rank(request(RICH_QUERY)).await.expect("ranking succeeds");

	assert_eq!(embedding.batches(), 1);
}

#[tokio::test]
async fn stalled_variant_times_out_without_failing_the_request() {
	let query = "senior python developer";
	let texts = variant_texts(query);
	let index = ScriptedIndex::new()
		.with_stall(&texts[0], Duration::from_secs(5))
		.otherwise_hits(vec![hit("a", 0.8)]);
	let service = service_with(Arc::new(index), records());
	let response = service.rank(request(query)).await.expect("other variants answered");
	let base = &response.diagnostics.variants[0];

	assert_eq!(ids(&response), vec!["a"]);
	assert_eq!(base.kind, VariantKind::Base);
	assert!(base.error.as_deref().is_some_and(|err| err.starts_with("Timed out")));
}

#[tokio::test]
async fn stale_references_are_skipped() {
	let index = ScriptedIndex::new().otherwise_hits(vec![hit("ghost", 0.95), hit("a", 0.6)]);
	let service = service_with(Arc::new(index), records());
	let response = service.rank(request("python developer")).await.expect("ranking succeeds");

	assert_eq!(ids(&response), vec!["a"]);
	assert_eq!(response.diagnostics.unique_candidates, 2);
	assert_eq!(response.diagnostics.stale_skipped, 1);
}

#[tokio::test]
async fn store_errors_are_skipped_like_stale_references() {
	let index = ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.9), hit("b", 0.8)]);
	let store = sift_testkit::store(records()).expect("candidate ids are unique");
	let service = RankingService::new(
		test_config(),
		collaborators(Arc::new(index), Arc::new(FlakyStore::new(store, &["a"]))),
	);
	let response = service.rank(request("python developer")).await.expect("ranking succeeds");

	assert_eq!(ids(&response), vec!["b"]);
	assert_eq!(response.diagnostics.stale_skipped, 1);
}

#[tokio::test]
async fn base_rerank_output_is_clamped_but_ordered_by_raw_score() {
	let index = ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.95), hit("b", 0.97)]);
	let service = service_with(Arc::new(index), records());
	let response = service.rank(request("python developer")).await.expect("ranking succeeds");
	let best = &response.matches[0];

	assert_eq!(ids(&response), vec!["a", "b"]);
	assert_eq!(best.final_score, 1.0);
	assert!(best.explain.rerank_score > 1.0);
	assert_eq!(best.explain.alignment_bonus, 1.0);
	assert!(best.breakdown.is_none());
	assert!(response.matches.iter().all(|item| (0.0..=1.0).contains(&item.final_score)));
}

#[tokio::test]
async fn equal_scores_break_ties_by_candidate_id() {
	let twins = vec![
		candidate("c2").skills(&["Rust"]).summary("Systems").build(),
		candidate("c1").skills(&["Rust"]).summary("Systems").build(),
	];
	let index = ScriptedIndex::new().otherwise_hits(vec![hit("c2", 0.7), hit("c1", 0.7)]);
	let service = service_with(Arc::new(index), twins);
	let first = service.rank(request("rust engineer")).await.expect("ranking succeeds");
	let second = service.rank(request("rust engineer")).await.expect("ranking succeeds");

	assert_eq!(ids(&first), vec!["c1", "c2"]);
	assert_eq!(ids(&first), ids(&second));
	assert_eq!(
		first.matches.iter().map(|item| item.final_score.to_bits()).collect::<Vec<_>>(),
		second.matches.iter().map(|item| item.final_score.to_bits()).collect::<Vec<_>>()
	);
}

#[tokio::test]
async fn invalid_request_weightage_falls_back_and_is_reported() {
	let index = ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.8), hit("b", 0.7)]);
	let service = service_with(Arc::new(index), records());
	let response = service
		.rank(RankRequest {
			weighted: true,
			include_breakdown: true,
			weightage: Some(WeightageParameters {
				education: 0.5,
				skill_match: 0.5,
				experience: 0.5,
				domain_relevance: 0.5,
			}),
			..request("5+ years python backend engineer")
		})
		.await
		.expect("ranking succeeds");
	let diagnostics = &response.diagnostics;

	assert_eq!(diagnostics.weightage, WeightageParameters::DEFAULT);
	assert_eq!(diagnostics.weightage_origin, WeightageOrigin::Config);
	assert!(diagnostics.warnings.iter().any(|warning| warning.contains("rejected")));

	for item in &response.matches {
		let breakdown = item.breakdown.as_ref().expect("breakdown requested");

		assert_eq!(breakdown.weightage, WeightageParameters::DEFAULT);
		assert_eq!(item.final_score, breakdown.final_score);
	}
}

#[tokio::test]
async fn session_weightage_comes_from_the_weightage_source() {
	let weightage = WeightageParameters::new(0.1, 0.6, 0.2, 0.1).expect("valid weightage");
	let source = InMemoryWeightageStore::default();

	source.set_weightage(Some("s1"), weightage).expect("valid weightage is stored");

	let store = sift_testkit::store(records()).expect("candidate ids are unique");
	let service = RankingService::new(
		test_config(),
		Collaborators {
			embedding: Arc::new(HashingEmbedding::new()),
			index: Arc::new(ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.8)])),
			store: Arc::new(store),
			weightage: Arc::new(source),
		},
	);
	let response = service
		.rank(RankRequest {
			weighted: true,
			session_id: Some("s1".to_string()),
			..request("python developer")
		})
		.await
		.expect("ranking succeeds");

	assert_eq!(response.diagnostics.weightage, weightage);
	assert_eq!(response.diagnostics.weightage_origin, WeightageOrigin::Store);
	assert!(response.diagnostics.warnings.is_empty());
}

#[tokio::test]
async fn empty_query_returns_nothing_with_a_warning() {
	let index = Arc::new(ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.9)]));
	let service = service_with(index.clone(), records());
	let response = service.rank(request("  ?! ")).await.expect("empty query is not an error");

	assert!(response.matches.is_empty());
	assert!(!response.diagnostics.warnings.is_empty());
	assert_eq!(index.calls(), 0);
}

#[tokio::test]
async fn top_k_truncates_and_is_clamped() {
	let hits = vec![hit("a", 0.9), hit("b", 0.8), hit("c", 0.7)];
	let index = Arc::new(ScriptedIndex::new().otherwise_hits(hits));
	let service = service_with(index.clone(), records());
	let two = service
		.rank(RankRequest { top_k: Some(2), ..request("python developer") })
		.await
		.expect("ranking succeeds");
	let calls = index.calls();
	let none = service
		.rank(RankRequest { top_k: Some(0), ..request("python developer") })
		.await
		.expect("ranking succeeds");
	let huge = service
		.rank(RankRequest { top_k: Some(10_000), ..request("python developer") })
		.await
		.expect("ranking succeeds");

	assert_eq!(two.matches.len(), 2);
	assert!(none.matches.is_empty());
	assert!(huge.diagnostics.warnings.iter().any(|warning| warning.contains("clamped")));
	assert_eq!(huge.matches.len(), 3);
	assert!(index.calls() > calls);
}

#[tokio::test]
async fn filters_reach_the_index_and_metadata_fills_file_names() {
	let index = ScriptedIndex::new().otherwise_hits(vec![
		hit_with("b", 0.95, json!({ "location": "bergen" })),
		hit_with("c", 0.9, json!({ "location": "oslo", "file_name": "cy.pdf" })),
	]);
	let service = service_with(Arc::new(index), records());
	let mut filters = serde_json::Map::new();

	filters.insert("location".to_string(), json!("oslo"));

	let response = service
		.rank(RankRequest { filters: Some(filters), ..request("go engineer") })
		.await
		.expect("ranking succeeds");

	assert_eq!(ids(&response), vec!["c"]);
	assert_eq!(response.matches[0].file_name, "cy.pdf");
}

#[tokio::test]
async fn nested_filter_values_are_rejected() {
	let service = service_with(Arc::new(ScriptedIndex::new()), records());
	let mut filters = serde_json::Map::new();

	filters.insert("location".to_string(), json!({ "city": "oslo" }));

	let err = service
		.rank(RankRequest { filters: Some(filters), ..request("go engineer") })
		.await
		.expect_err("nested filters are invalid");

	assert!(matches!(err, Error::InvalidRequest { .. }), "{err}");
}

#[tokio::test]
async fn snippets_keep_sentences_that_mention_the_query() {
	let index = ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.9)]);
	let service = service_with(Arc::new(index), records());
	let response = service.rank(request("python developer")).await.expect("ranking succeeds");

	assert_eq!(response.matches[0].snippet, "Wrote Python services for payments");
	assert_eq!(response.matches[0].name, "Ada");
	assert_eq!(response.matches[0].file_name, "ada.pdf");
}

#[tokio::test]
async fn matches_carry_the_retrieved_id_not_the_stored_one() {
	let index =
		ScriptedIndex::new().otherwise_hits(vec![hit("y", 0.7), hit("x", 0.7), hit("z", 0.9)]);
	let service = RankingService::new(
		test_config(),
		collaborators(Arc::new(index), Arc::new(AnonymousStore)),
	);
	let response = service
		.rank(RankRequest { weighted: true, ..request("rust engineer") })
		.await
		.expect("ranking succeeds");

	assert_eq!(ids(&response), vec!["z", "x", "y"]);
	assert!(response.matches.iter().all(|item| item.name == "Anon"));
	assert_eq!(response.diagnostics.degraded_candidates, vec!["z", "x", "y"]);
}

#[tokio::test]
async fn filters_the_index_cannot_apply_are_invalid_requests() {
	let index = Arc::new(ScriptedIndex::new());
	let service = service_with(index.clone(), records());

	for value in [json!(2.5), json!(["a", 1]), json!([null]), json!([])] {
		let mut filters = serde_json::Map::new();

		filters.insert("years".to_string(), value.clone());

		let err = service
			.rank(RankRequest { filters: Some(filters), ..request("go engineer") })
			.await
			.expect_err("unsupported filter values are invalid");

		assert!(matches!(err, Error::InvalidRequest { .. }), "{value}: {err}");
	}

	assert_eq!(index.calls(), 0);
}

#[tokio::test]
async fn each_variant_overfetches_the_requested_top_k() {
	let ten = Arc::new(ScriptedIndex::new());
	let two = Arc::new(ScriptedIndex::new());

	service_with(ten.clone(), records())
		.rank(RankRequest { top_k: Some(10), ..request(RICH_QUERY) })
		.await
		.expect("ranking succeeds");
	service_with(two.clone(), records())
		.rank(RankRequest { top_k: Some(2), ..request(RICH_QUERY) })
		.await
		.expect("ranking succeeds");

	assert_eq!(ten.limits(), vec![20; 4]);
	assert_eq!(two.limits(), vec![4; 4]);
}

#[tokio::test]
async fn rejected_session_weightage_falls_back_to_the_stored_global() {
	let global = WeightageParameters::new(0.1, 0.6, 0.2, 0.1).expect("valid weightage");
	let source = LayeredWeightage {
		session: WeightageParameters {
			education: 0.5,
			skill_match: 0.5,
			experience: 0.5,
			domain_relevance: 0.5,
		},
		global,
	};
	let store = sift_testkit::store(records()).expect("candidate ids are unique");
	let service = RankingService::new(
		test_config(),
		Collaborators {
			embedding: Arc::new(HashingEmbedding::new()),
			index: Arc::new(ScriptedIndex::new().otherwise_hits(vec![hit("a", 0.8)])),
			store: Arc::new(store),
			weightage: Arc::new(source),
		},
	);
	let response = service
		.rank(RankRequest {
			weighted: true,
			session_id: Some("s1".to_string()),
			..request("python developer")
		})
		.await
		.expect("ranking succeeds");
	let diagnostics = &response.diagnostics;

	assert_eq!(diagnostics.weightage, global);
	assert_eq!(diagnostics.weightage_origin, WeightageOrigin::Store);
	assert_eq!(diagnostics.warnings.len(), 1);
	assert!(diagnostics.warnings[0].contains("rejected"));
}

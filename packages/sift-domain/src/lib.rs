pub mod candidate;
pub mod expansion;
pub mod intent;
pub mod scoring;
pub mod taxonomy;
pub mod text;
pub mod weightage;

pub use candidate::CandidateRecord;
pub use expansion::expand_query;
pub use intent::{
	BusinessDomain, ExperienceIndicators, Intent, Level, QueryKind, RoleType, Seniority,
	SkillDomainMatch, analyze,
};
pub use scoring::{
	Component, ComponentError, ComponentScores, ScoreBreakdown, ScoringContext, score_candidate,
};
pub use weightage::{WeightageError, WeightageParameters};

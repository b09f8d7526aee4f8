//! Static hiring taxonomy: skill contexts, synonyms, education levels, scoring domains.
//!
//! Every table is immutable. Derived lookups are built once on first use.

use std::{collections::BTreeSet, sync::LazyLock};

use crate::intent::{BusinessDomain, QueryKind, RoleType, Seniority};

pub struct SkillContext {
	pub name: &'static str,
	pub primary: &'static [&'static str],
	pub related: &'static [&'static str],
}

pub struct SynonymEntry {
	pub canonical: &'static str,
	pub synonyms: &'static [&'static str],
}

pub struct EducationLevel {
	pub name: &'static str,
	pub score: f64,
	pub aliases: &'static [&'static str],
}

pub struct ScoringDomain {
	pub name: &'static str,
	pub keywords: &'static [&'static str],
	pub technologies: &'static [&'static str],
}

pub struct StudyField {
	pub name: &'static str,
	pub keywords: &'static [&'static str],
	/// Scoring domains whose technologies count as related to this field.
	pub domains: &'static [&'static str],
}

pub static SKILL_CONTEXTS: [SkillContext; 5] = [
	SkillContext {
		name: "frontend",
		primary: &["react", "angular", "vue", "javascript", "typescript"],
		related: &["html", "css", "sass", "webpack", "redux", "nextjs"],
	},
	SkillContext {
		name: "backend",
		primary: &["python", "java", "node.js", "c#", "go", "rust"],
		related: &["django", "flask", "spring", "express", "fastapi"],
	},
	SkillContext {
		name: "cloud",
		primary: &["aws", "azure", "gcp", "docker", "kubernetes"],
		related: &["terraform", "jenkins", "ci/cd", "devops", "lambda"],
	},
	SkillContext {
		name: "data",
		primary: &["python", "sql", "machine learning", "data science"],
		related: &["pandas", "numpy", "tensorflow", "pytorch", "tableau"],
	},
	SkillContext {
		name: "mobile",
		primary: &["react native", "flutter", "swift", "kotlin"],
		related: &["ios", "android", "mobile", "app development"],
	},
];

pub static SKILL_SYNONYMS: [SynonymEntry; 28] = [
	SynonymEntry {
		canonical: "python",
		synonyms: &["python", "py", "django", "flask", "fastapi", "pandas", "numpy"],
	},
	SynonymEntry {
		canonical: "javascript",
		synonyms: &[
			"javascript",
			"js",
			"typescript",
			"ts",
			"node",
			"nodejs",
			"react",
			"angular",
			"vue",
		],
	},
	SynonymEntry { canonical: "java", synonyms: &["java", "spring", "hibernate", "maven", "gradle"] },
	SynonymEntry { canonical: "c#", synonyms: &["csharp", "c#", "dotnet", ".net", "asp.net"] },
	SynonymEntry { canonical: "go", synonyms: &["golang", "go"] },
	SynonymEntry { canonical: "rust", synonyms: &["rust", "cargo"] },
	SynonymEntry { canonical: "php", synonyms: &["php", "laravel", "symfony", "wordpress"] },
	SynonymEntry { canonical: "react", synonyms: &["react", "reactjs", "react.js", "jsx"] },
	SynonymEntry { canonical: "angular", synonyms: &["angular", "angularjs", "angular.js"] },
	SynonymEntry { canonical: "vue", synonyms: &["vue", "vuejs", "vue.js", "nuxt"] },
	SynonymEntry {
		canonical: "nodejs",
		synonyms: &["node", "nodejs", "node.js", "express", "nestjs"],
	},
	SynonymEntry { canonical: "django", synonyms: &["django", "python web framework"] },
	SynonymEntry { canonical: "flask", synonyms: &["flask", "python microframework"] },
	SynonymEntry { canonical: "spring", synonyms: &["spring", "spring boot", "java framework"] },
	SynonymEntry {
		canonical: "aws",
		synonyms: &["aws", "amazon web services", "ec2", "s3", "lambda", "cloud"],
	},
	SynonymEntry { canonical: "azure", synonyms: &["azure", "microsoft cloud"] },
	SynonymEntry { canonical: "gcp", synonyms: &["gcp", "google cloud", "google cloud platform"] },
	SynonymEntry { canonical: "docker", synonyms: &["docker", "containers", "containerization"] },
	SynonymEntry {
		canonical: "kubernetes",
		synonyms: &["kubernetes", "k8s", "container orchestration"],
	},
	SynonymEntry {
		canonical: "terraform",
		synonyms: &["terraform", "infrastructure as code", "iac"],
	},
	SynonymEntry {
		canonical: "sql",
		synonyms: &["sql", "mysql", "postgresql", "sqlite", "database"],
	},
	SynonymEntry {
		canonical: "mongodb",
		synonyms: &["mongodb", "mongo", "nosql", "document database"],
	},
	SynonymEntry { canonical: "redis", synonyms: &["redis", "cache", "in-memory database"] },
	SynonymEntry {
		canonical: "machine learning",
		synonyms: &["ml", "machine learning", "ai", "artificial intelligence"],
	},
	SynonymEntry {
		canonical: "deep learning",
		synonyms: &["deep learning", "neural networks", "cnn", "rnn", "lstm"],
	},
	SynonymEntry { canonical: "tensorflow", synonyms: &["tensorflow", "tf", "keras"] },
	SynonymEntry { canonical: "pytorch", synonyms: &["pytorch", "torch"] },
	SynonymEntry {
		canonical: "scikit-learn",
		synonyms: &["sklearn", "scikit-learn", "scikit learn"],
	},
];

/// Seniority vocabulary used by the query expander. Not part of skill alignment.
pub static SENIORITY_SYNONYMS: [SynonymEntry; 3] = [
	SynonymEntry {
		canonical: "senior",
		synonyms: &["senior", "sr", "lead", "principal", "experienced"],
	},
	SynonymEntry {
		canonical: "junior",
		synonyms: &["junior", "jr", "entry level", "graduate", "fresh"],
	},
	SynonymEntry { canonical: "mid level", synonyms: &["mid level", "intermediate", "regular"] },
];

/// Tested in order. The first level with a hit wins.
pub static SENIORITY_TERMS: [(Seniority, &[&str]); 3] = [
	(Seniority::Senior, &["senior", "sr", "experienced", "lead"]),
	(Seniority::Mid, &["mid", "mid-level", "intermediate", "regular"]),
	(Seniority::Junior, &["junior", "jr", "entry", "graduate", "fresh"]),
];

pub static QUERY_KIND_TERMS: [(QueryKind, f32, &[&str]); 4] = [
	(QueryKind::SkillSearch, 0.8, &["find", "search", "looking for", "need", "want", "require"]),
	(
		QueryKind::ExperienceQuery,
		0.7,
		&["senior", "junior", "years", "experience", "experienced", "level"],
	),
	(
		QueryKind::ComparisonQuery,
		0.9,
		&["compare", "vs", "versus", "difference", "better", "best"],
	),
	(
		QueryKind::RoleSpecific,
		0.6,
		&[
			"developer",
			"developers",
			"engineer",
			"engineers",
			"architect",
			"analyst",
			"scientist",
			"manager",
		],
	),
];

pub static ROLE_TERMS: [(RoleType, &[&str]); 5] = [
	(RoleType::Frontend, &["frontend", "front-end", "ui", "ux"]),
	(RoleType::Backend, &["backend", "back-end", "api", "server"]),
	(RoleType::Fullstack, &["fullstack", "full-stack", "full stack"]),
	(RoleType::Devops, &["devops", "sre", "infrastructure"]),
	(RoleType::DataScience, &["data scientist", "ml engineer", "ai engineer"]),
];

pub static BUSINESS_DOMAIN_TERMS: [(BusinessDomain, &[&str]); 4] = [
	(BusinessDomain::Fintech, &["fintech", "finance", "banking"]),
	(BusinessDomain::Healthcare, &["healthcare", "medical", "health"]),
	(BusinessDomain::Ecommerce, &["ecommerce", "e-commerce", "retail"]),
	(BusinessDomain::Gaming, &["gaming", "game", "entertainment"]),
];

pub static STOP_WORDS: [&str; 66] = [
	"i", "me", "my", "we", "our", "you", "your", "the", "a", "an", "and", "or", "but", "in", "on",
	"at", "to", "for", "of", "with", "by", "from", "up", "about", "into", "through", "during",
	"before", "after", "above", "below", "over", "under", "again", "further", "then", "once",
	"here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
	"most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
	"very", "can", "will", "just",
];

/// Query verbs that carry no retrieval meaning.
pub static QUERY_VERBS: [&str; 9] =
	["should", "now", "find", "search", "looking", "need", "want", "show", "get"];

/// Ordered from highest to lowest. Names match `sift_config::EDUCATION_LEVELS`.
pub static EDUCATION_LEVELS: [EducationLevel; 5] = [
	EducationLevel { name: "doctoral", score: 1.0, aliases: &["doctorate", "doctoral", "ph.d", "phd"] },
	EducationLevel {
		name: "masters",
		score: 0.8,
		aliases: &["master", "masters", "msc", "m.sc", "mba", "ms", "m.s", "m.tech"],
	},
	EducationLevel {
		name: "bachelors",
		score: 0.6,
		aliases: &["bachelor", "bachelors", "bsc", "b.sc", "ba", "b.s", "b.tech", "be", "b.e"],
	},
	EducationLevel {
		name: "associate",
		score: 0.4,
		aliases: &["associate", "associate degree", "diploma", "certificate"],
	},
	EducationLevel {
		name: "secondary",
		score: 0.2,
		aliases: &["high school", "secondary", "12th", "intermediate"],
	},
];

/// Aliases that read as ordinary words or job titles in a job description. They identify a level
/// inside an education entry but never state a requirement.
pub static AMBIGUOUS_REQUIREMENT_ALIASES: [&str; 5] = ["be", "ba", "ms", "associate", "intermediate"];

pub static SCORING_DOMAINS: [ScoringDomain; 8] = [
	ScoringDomain {
		name: "software_engineering",
		keywords: &["software", "development", "programming", "coding", "engineer"],
		technologies: &["java", "python", "javascript", "react", "node", "angular", "spring"],
	},
	ScoringDomain {
		name: "data_science",
		keywords: &["data", "analytics", "machine learning", "ai", "statistics"],
		technologies: &["python", "r", "sql", "pandas", "numpy", "tensorflow", "pytorch"],
	},
	ScoringDomain {
		name: "devops",
		keywords: &["devops", "deployment", "infrastructure", "cloud", "automation"],
		technologies: &["docker", "kubernetes", "aws", "azure", "jenkins", "terraform"],
	},
	ScoringDomain {
		name: "frontend",
		keywords: &["frontend", "ui", "ux", "web design", "user interface"],
		technologies: &["html", "css", "javascript", "react", "angular", "vue", "figma"],
	},
	ScoringDomain {
		name: "backend",
		keywords: &["backend", "server", "api", "database", "microservices"],
		technologies: &["java", "python", "node", "sql", "mongodb", "spring", "express"],
	},
	ScoringDomain {
		name: "mobile",
		keywords: &["mobile", "android", "ios", "app development"],
		technologies: &["swift", "kotlin", "java", "react native", "flutter", "xamarin"],
	},
	ScoringDomain {
		name: "cybersecurity",
		keywords: &["security", "cybersecurity", "penetration", "vulnerability", "encryption"],
		technologies: &["kali", "metasploit", "wireshark", "burp suite", "nmap"],
	},
	ScoringDomain {
		name: "finance",
		keywords: &["finance", "banking", "trading", "investment", "fintech"],
		technologies: &["excel", "bloomberg", "matlab", "r", "python", "sql"],
	},
];

pub static STUDY_FIELDS: [StudyField; 5] = [
	StudyField {
		name: "computer",
		keywords: &["software", "programming", "development", "tech"],
		domains: &[
			"software_engineering",
			"data_science",
			"devops",
			"frontend",
			"backend",
			"mobile",
			"cybersecurity",
		],
	},
	StudyField {
		name: "engineering",
		keywords: &["engineer", "technical", "development"],
		domains: &["software_engineering", "devops", "backend", "mobile"],
	},
	StudyField {
		name: "business",
		keywords: &["business", "management", "finance", "marketing"],
		domains: &["finance"],
	},
	StudyField {
		name: "data",
		keywords: &["data", "analytics", "statistics", "science"],
		domains: &["data_science"],
	},
	StudyField {
		name: "design",
		keywords: &["design", "ui", "ux", "creative"],
		domains: &["frontend"],
	},
];

/// Summary words that earn the seniority multiplier in experience scoring.
pub static SUMMARY_SENIORITY_TERMS: [&str; 4] = ["senior", "lead", "principal", "manager"];

/// Every skill-context term, deduplicated.
pub static TECHNICAL_TERMS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
	let terms: BTreeSet<&'static str> = SKILL_CONTEXTS
		.iter()
		.flat_map(|context| context.primary.iter().chain(context.related.iter()).copied())
		.collect();

	terms.into_iter().collect()
});

/// Per study field: its keywords followed by the technologies of the domains it feeds.
pub static FIELD_RELATED_TERMS: LazyLock<Vec<(&'static str, Vec<&'static str>)>> =
	LazyLock::new(|| {
		STUDY_FIELDS
			.iter()
			.map(|field| {
				let mut terms: Vec<&'static str> = field.keywords.to_vec();

				for domain in SCORING_DOMAINS.iter().filter(|domain| field.domains.contains(&domain.name))
				{
					for tech in domain.technologies {
						if !terms.contains(tech) {
							terms.push(tech);
						}
					}
				}

				(field.name, terms)
			})
			.collect()
	});

pub fn education_level_index(name: &str) -> Option<usize> {
	EDUCATION_LEVELS.iter().position(|level| level.name == name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn education_levels_align_with_config_names() {
		let names: Vec<&str> = EDUCATION_LEVELS.iter().map(|level| level.name).collect();

		assert_eq!(names, sift_config::EDUCATION_LEVELS.to_vec());
	}

	#[test]
	fn education_scores_descend() {
		for pair in EDUCATION_LEVELS.windows(2) {
			assert!(pair[0].score > pair[1].score);
		}
	}

	#[test]
	fn computer_field_relates_to_python_and_aws() {
		let (_, terms) = FIELD_RELATED_TERMS
			.iter()
			.find(|(name, _)| *name == "computer")
			.expect("computer field must exist");

		assert!(terms.contains(&"python"));
		assert!(terms.contains(&"aws"));
		assert!(terms.contains(&"software"));
	}

	#[test]
	fn technical_terms_are_unique() {
		let unique: BTreeSet<&str> = TECHNICAL_TERMS.iter().copied().collect();

		assert_eq!(unique.len(), TECHNICAL_TERMS.len());
		assert!(TECHNICAL_TERMS.contains(&"ci/cd"));
	}
}

use serde::{Deserialize, Serialize};

/// Read-only candidate profile owned by the document store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
	pub id: String,
	pub file_name: String,
	pub name: String,
	pub skills: Vec<String>,
	/// One entry per role held, most recent first when the source says so.
	pub experience: Vec<String>,
	pub education: Vec<String>,
	pub summary: String,
	pub full_text: String,
}
impl CandidateRecord {
	/// Summary, experience entries, and skills joined for keyword analysis.
	pub fn profile_text(&self) -> String {
		let mut out = String::with_capacity(self.summary.len() + 64);

		out.push_str(&self.summary);

		for entry in self.experience.iter().chain(self.skills.iter()) {
			out.push('\n');
			out.push_str(entry);
		}

		out
	}
}

use serde::{Deserialize, Serialize};

/// Structured filters applied on top of whatever predicate a strategy selects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub industry: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_experience: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_experience: Option<u32>,
	/// Any-of: a profile qualifies when it lists at least one of these skills.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub skills: Vec<String>,
}
impl SearchFilters {
	pub fn is_empty(&self) -> bool {
		self.industry_value().is_none()
			&& self.min_experience.is_none()
			&& self.max_experience.is_none()
			&& self.skill_values().next().is_none()
	}

	/// The industry filter, ignoring blank values.
	pub fn industry_value(&self) -> Option<&str> {
		self.industry.as_deref().map(str::trim).filter(|industry| !industry.is_empty())
	}

	/// Non-blank requested skills.
	pub fn skill_values(&self) -> impl Iterator<Item = &str> {
		self.skills.iter().map(|skill| skill.trim()).filter(|skill| !skill.is_empty())
	}
}

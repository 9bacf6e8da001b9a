use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Ranking strategy shared by the query builder and the result ranker. Each variant names an
/// engine-side ranking profile of the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
	#[default]
	Default,
	Semantic,
	Hybrid,
	ExperienceFocused,
	SkillsFocused,
}
impl RankingStrategy {
	pub const ALL: [Self; 5] =
		[Self::Default, Self::Semantic, Self::Hybrid, Self::ExperienceFocused, Self::SkillsFocused];

	pub fn profile_name(self) -> &'static str {
		match self {
			Self::Default => "default",
			Self::Semantic => "semantic",
			Self::Hybrid => "hybrid",
			Self::ExperienceFocused => "experience_focused",
			Self::SkillsFocused => "skills_focused",
		}
	}

	/// Whether a query vector should be produced before building the query.
	pub fn wants_vector(self) -> bool {
		matches!(self, Self::Semantic | Self::Hybrid)
	}

	/// Whether the engine score is the final score. Only hybrid may blend component scores.
	pub fn is_single_pass(self) -> bool {
		!matches!(self, Self::Hybrid)
	}
}
impl fmt::Display for RankingStrategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.profile_name())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown ranking strategy '{0}'.")]
pub struct UnknownStrategy(pub String);

impl FromStr for RankingStrategy {
	type Err = UnknownStrategy;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|strategy| strategy.profile_name() == raw.trim())
			.ok_or_else(|| UnknownStrategy(raw.to_string()))
	}
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Index field names. The engine schema uses the same camelCase names as the profile record.
pub mod fields {
	pub const USER_ID: &str = "userId";
	pub const FULL_NAME: &str = "fullName";
	pub const JOB_ROLE: &str = "jobRole";
	pub const COMPANY_NAME: &str = "companyName";
	pub const ABOUT: &str = "about";
	pub const EDUCATION: &str = "education";
	pub const INDUSTRY: &str = "industry";
	pub const YEARS_OF_EXPERIENCE: &str = "yearsOfExperience";
	pub const SKILLS: &str = "skills";
	pub const INTERESTS: &str = "interests";
	pub const SEARCHABLE_CONTENT: &str = "searchableContent";
	pub const IS_ONBOARDING_COMPLETE: &str = "isOnboardingComplete";
	pub const CREATED_AT: &str = "createdAt";
	pub const UPDATED_AT: &str = "updatedAt";

	/// Fields matched by lexical predicates, in the order they are queried.
	pub const LEXICAL: [&str; 8] = [
		FULL_NAME,
		JOB_ROLE,
		SKILLS,
		ABOUT,
		COMPANY_NAME,
		EDUCATION,
		INTERESTS,
		SEARCHABLE_CONTENT,
	];
}

/// Profile record as read from the structured record store. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSource {
	pub full_name: Option<String>,
	pub job_role: Option<String>,
	pub company_name: Option<String>,
	pub about: Option<String>,
	pub education: Option<String>,
	pub industry: Option<String>,
	pub years_of_experience: Option<u32>,
	pub skills: Option<Vec<String>>,
	pub interests: Option<Vec<String>>,
	pub is_onboarding_complete: Option<bool>,
}

impl ProfileSource {
	/// Recovers the source fields from a stored document.
	pub fn from_view(view: &ProfileView) -> Self {
		Self {
			full_name: view.full_name.clone(),
			job_role: view.job_role.clone(),
			company_name: view.company_name.clone(),
			about: view.about.clone(),
			education: view.education.clone(),
			industry: view.industry.clone(),
			years_of_experience: view.years_of_experience,
			skills: view.skills.clone(),
			interests: view.interests.clone(),
			is_onboarding_complete: view.is_onboarding_complete,
		}
	}

	/// Fields present in `patch` win. A blank string in `patch` still wins, which clears the
	/// field once composed.
	pub fn overlay(&self, patch: &Self) -> Self {
		Self {
			full_name: patch.full_name.clone().or_else(|| self.full_name.clone()),
			job_role: patch.job_role.clone().or_else(|| self.job_role.clone()),
			company_name: patch.company_name.clone().or_else(|| self.company_name.clone()),
			about: patch.about.clone().or_else(|| self.about.clone()),
			education: patch.education.clone().or_else(|| self.education.clone()),
			industry: patch.industry.clone().or_else(|| self.industry.clone()),
			years_of_experience: patch.years_of_experience.or(self.years_of_experience),
			skills: patch.skills.clone().or_else(|| self.skills.clone()),
			interests: patch.interests.clone().or_else(|| self.interests.clone()),
			is_onboarding_complete: patch.is_onboarding_complete.or(self.is_onboarding_complete),
		}
	}

	/// Index field names this source carries a value for, blank strings included.
	pub fn present_fields(&self) -> Vec<&'static str> {
		[
			(fields::FULL_NAME, self.full_name.is_some()),
			(fields::JOB_ROLE, self.job_role.is_some()),
			(fields::COMPANY_NAME, self.company_name.is_some()),
			(fields::ABOUT, self.about.is_some()),
			(fields::EDUCATION, self.education.is_some()),
			(fields::INDUSTRY, self.industry.is_some()),
			(fields::YEARS_OF_EXPERIENCE, self.years_of_experience.is_some()),
			(fields::SKILLS, self.skills.is_some()),
			(fields::INTERESTS, self.interests.is_some()),
			(fields::IS_ONBOARDING_COMPLETE, self.is_onboarding_complete.is_some()),
		]
		.into_iter()
		.filter_map(|(name, present)| present.then_some(name))
		.collect()
	}
}

/// The document that is embedded and indexed for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableProfile {
	pub user_id: String,
	pub full_name: Option<String>,
	pub job_role: Option<String>,
	pub company_name: Option<String>,
	pub about: Option<String>,
	pub education: Option<String>,
	pub industry: Option<String>,
	pub years_of_experience: Option<u32>,
	pub skills: Vec<String>,
	pub interests: Vec<String>,
	/// Derived from the other text fields. Regenerate it with [`compose`], never edit it.
	pub searchable_content: String,
	pub is_onboarding_complete: bool,
	pub profile_vector: Option<Vec<f32>>,
	pub created_at: Option<i64>,
	pub updated_at: Option<i64>,
}
impl SearchableProfile {
	/// Engine document fields. Absent optionals are omitted rather than written as null.
	pub fn to_fields(&self, vector_field: &str) -> Map<String, Value> {
		let mut out = Map::new();

		out.insert(fields::USER_ID.to_string(), Value::from(self.user_id.as_str()));

		for (name, value) in [
			(fields::FULL_NAME, &self.full_name),
			(fields::JOB_ROLE, &self.job_role),
			(fields::COMPANY_NAME, &self.company_name),
			(fields::ABOUT, &self.about),
			(fields::EDUCATION, &self.education),
			(fields::INDUSTRY, &self.industry),
		] {
			if let Some(value) = value {
				out.insert(name.to_string(), Value::from(value.as_str()));
			}
		}

		if let Some(years) = self.years_of_experience {
			out.insert(fields::YEARS_OF_EXPERIENCE.to_string(), Value::from(years));
		}

		out.insert(fields::SKILLS.to_string(), Value::from(self.skills.clone()));
		out.insert(fields::INTERESTS.to_string(), Value::from(self.interests.clone()));
		out.insert(
			fields::SEARCHABLE_CONTENT.to_string(),
			Value::from(self.searchable_content.as_str()),
		);
		out.insert(
			fields::IS_ONBOARDING_COMPLETE.to_string(),
			Value::from(self.is_onboarding_complete),
		);

		if let Some(vector) = self.profile_vector.as_ref() {
			out.insert(vector_field.to_string(), serde_json::json!({ "values": vector }));
		}
		if let Some(ts) = self.created_at {
			out.insert(fields::CREATED_AT.to_string(), Value::from(ts));
		}
		if let Some(ts) = self.updated_at {
			out.insert(fields::UPDATED_AT.to_string(), Value::from(ts));
		}

		out
	}
}

/// Read-shaped subset of a profile as returned by the engine. Nothing here is defaulted: a field
/// the hit did not carry stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub full_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub job_role: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub company_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub about: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub education: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub industry: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub years_of_experience: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub skills: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub interests: Option<Vec<String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_onboarding_complete: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub created_at: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub updated_at: Option<i64>,
}
impl ProfileView {
	/// Maps stored engine fields back to the profile shape. Values of the wrong type are treated
	/// as missing.
	pub fn from_fields(map: &Map<String, Value>) -> Self {
		Self {
			user_id: string_field(map, fields::USER_ID),
			full_name: string_field(map, fields::FULL_NAME),
			job_role: string_field(map, fields::JOB_ROLE),
			company_name: string_field(map, fields::COMPANY_NAME),
			about: string_field(map, fields::ABOUT),
			education: string_field(map, fields::EDUCATION),
			industry: string_field(map, fields::INDUSTRY),
			years_of_experience: map
				.get(fields::YEARS_OF_EXPERIENCE)
				.and_then(Value::as_u64)
				.and_then(|years| u32::try_from(years).ok()),
			skills: list_field(map, fields::SKILLS),
			interests: list_field(map, fields::INTERESTS),
			is_onboarding_complete: map.get(fields::IS_ONBOARDING_COMPLETE).and_then(Value::as_bool),
			created_at: map.get(fields::CREATED_AT).and_then(Value::as_i64),
			updated_at: map.get(fields::UPDATED_AT).and_then(Value::as_i64),
		}
	}
}

/// Builds the searchable document for `user_id`. Pure: no embedding, no timestamps.
pub fn compose(user_id: &str, source: &ProfileSource) -> SearchableProfile {
	let skills = clean_list(source.skills.as_deref());
	let interests = clean_list(source.interests.as_deref());
	let searchable_content = searchable_content(source, &skills, &interests);

	SearchableProfile {
		user_id: user_id.to_string(),
		full_name: non_empty(source.full_name.as_deref()),
		job_role: non_empty(source.job_role.as_deref()),
		company_name: non_empty(source.company_name.as_deref()),
		about: non_empty(source.about.as_deref()),
		education: non_empty(source.education.as_deref()),
		industry: non_empty(source.industry.as_deref()),
		years_of_experience: source.years_of_experience,
		skills,
		interests,
		searchable_content,
		is_onboarding_complete: source.is_onboarding_complete.unwrap_or(false),
		profile_vector: None,
		created_at: None,
		updated_at: None,
	}
}

fn searchable_content(source: &ProfileSource, skills: &[String], interests: &[String]) -> String {
	let head = [
		source.full_name.as_deref(),
		source.job_role.as_deref(),
		source.company_name.as_deref(),
		source.about.as_deref(),
		source.education.as_deref(),
	];

	head.into_iter()
		.flatten()
		.chain(skills.iter().map(String::as_str))
		.chain(interests.iter().map(String::as_str))
		.map(str::trim)
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}

fn non_empty(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

fn clean_list(values: Option<&[String]>) -> Vec<String> {
	values
		.unwrap_or_default()
		.iter()
		.map(|value| value.trim())
		.filter(|value| !value.is_empty())
		.map(str::to_string)
		.collect()
}

fn string_field(map: &Map<String, Value>, name: &str) -> Option<String> {
	map.get(name).and_then(Value::as_str).map(str::to_string)
}

fn list_field(map: &Map<String, Value>, name: &str) -> Option<Vec<String>> {
	let items = map.get(name)?.as_array()?;

	Some(items.iter().filter_map(Value::as_str).map(str::to_string).collect())
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No search engine authentication configured: set either a client certificate and key or a bearer token.")]
	NoAuthConfigured,
	#[error("Search engine parameter {name} is missing or still a placeholder.")]
	MissingParameter { name: String },
	#[error("Failed to read search engine parameter {name}: {message}")]
	Parameter { name: String, message: String },
	#[error("Invalid search engine configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Query vector has {actual} dimensions, expected {expected}.")]
	VectorDimension { expected: usize, actual: usize },
	#[error("Search engine returned {status} {reason}: {body}")]
	Status { status: u16, reason: String, body: String },
	#[error("Invalid search engine response: {message}")]
	InvalidResponse { message: String },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
impl Error {
	/// Errors an operator has to fix; retrying will not help.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			Self::NoAuthConfigured
				| Self::MissingParameter { .. }
				| Self::Parameter { .. }
				| Self::InvalidConfig { .. }
		)
	}

	/// Errors caused by the caller's request rather than the engine.
	pub fn is_invalid_input(&self) -> bool {
		matches!(self, Self::InvalidQuery { .. } | Self::VectorDimension { .. })
	}
}

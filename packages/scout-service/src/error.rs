pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Unknown action '{action}'.")]
	UnknownAction { action: String },
	#[error("Configuration error: {message}")]
	Configuration { message: String },
	#[error("Search engine error: {message}")]
	Engine { message: String },
}
impl From<scout_engine::Error> for Error {
	fn from(err: scout_engine::Error) -> Self {
		if err.is_configuration() {
			Self::Configuration { message: err.to_string() }
		} else if err.is_invalid_input() {
			Self::InvalidRequest { message: err.to_string() }
		} else {
			Self::Engine { message: err.to_string() }
		}
	}
}

pub mod builder;
pub mod client;
pub mod query;
pub mod settings;

mod error;

pub use builder::{EngineQuery, QueryLayout, VectorInput, build};
pub use client::{EngineClient, RawHit, RawHits};
pub use error::{Error, Result};
pub use query::{LexicalMode, Literal, Predicate};
pub use settings::{
	EngineAuth, EngineSettings, EngineSettingsCell, EnvParameterStore, ParameterNames,
	ParameterStore, StaticParameterStore, parameter_store, resolve_settings,
};

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

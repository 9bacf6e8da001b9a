pub mod filters;
pub mod profile;
pub mod request;
pub mod strategy;

pub use filters::SearchFilters;
pub use profile::{ProfileSource, ProfileView, SearchableProfile, compose, fields};
pub use request::{DEFAULT_LIMIT, SearchRequest};
pub use strategy::{RankingStrategy, UnknownStrategy};

//! User profile parsing and validation.
//!
//! Profiles are structured data validated against JSON Schema.
//! This module handles parsing YAML/JSON profiles and validating them.

mod parser;
mod schema;

pub use parser::{HealthProfile, ProfileError, UserProfile, ValueProfile};
pub use schema::validate_profile_schema;

//! # hourfill config
//!
//! Configuration for the hourfill run.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then the
//! process environment (optionally seeded from a `.env` file). The account
//! identifier and secret have no default and must be present after layering.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::{ConfigLoader, env_vars};
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};

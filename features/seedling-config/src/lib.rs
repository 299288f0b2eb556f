//! Seedling Config provides a registry of default creation arguments, applied to every
//! construction of a kind - including the dependencies seedling creates on its own.
//!
//! Defaults are registered in code or loaded from JSON keyed by kind name,
//! and plugged into a [Creator](seedling::Creator) through [seedling::DefaultArgs].
//!
//! # Examples
//!
//! ```rust
//! use seedling::{Args, Creatable, Creation, CreateError, Creator, KindRegistry};
//! use seedling_config::provider::ConfigProvider;
//!
//! struct Organization {
//!     name: String,
//! }
//! impl Creatable for Organization {
//!     fn create(_: &mut Creation<'_>, mut args: Args) -> Result<Self, CreateError> {
//!         let name = args
//!             .take_field("name")
//!             .and_then(|name| name.as_str().map(String::from))
//!             .unwrap_or_default();
//!         Ok(Organization { name })
//!     }
//! }
//!
//! let registry = KindRegistry::new().add::<Organization>();
//! let config = serde_json::json!({ "organization": { "name": "Default" } });
//!
//! let provider = match ConfigProvider::from_json(&registry, &config) {
//!     Ok(p) => p,
//!     Err(e) => {
//!         eprintln!("{e}");
//!         return;
//!     }
//! };
//!
//! let organization = Creator::with_defaults(provider)
//!     .create::<Organization>(Args::new())
//!     .unwrap();
//! assert_eq!(organization.downcast::<Organization>().unwrap().name, "Default");
//! ```
//!
//! Seedling Config consists of the following components:
//!
//! 1. Provider - for registering, loading and retrieving defaults
//! 2. Errors - for config errors

pub mod errors;
pub mod provider;

pub use errors::ConfigError;
pub use provider::ConfigProvider;

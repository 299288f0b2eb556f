//! Seedling creates objects together with everything they depend on.
//!
//! Types declare which other types they need, mandatory or optional, as [Dependency] slots.
//! From these declarations seedling builds a [DependencyGraph], sorts it into batches
//! which can be created in order, and constructs every missing dependency exactly once,
//! sharing it with everything in the tree asking for the same kind.
//!
//! Seedling is split into the following parts:
//! 1. Graph builder - [dependency_graph] and [optional_dependency_graph]
//! 2. Sorter - [creation_order], [page_creation_order] and the stagger pass [separate_async_optionals]
//! 3. Creation - the [Creatable] trait, the [Creator] and the resulting [Instance] handles
//! 4. Registry - [KindRegistry] for kinds only known by name at runtime
//!
//! # Examples
//!
//! ```rust
//! use seedling::{create, Args, Creatable, Creation, CreateError, Dependency, Provide};
//!
//! struct Organization;
//! impl Creatable for Organization {
//!     fn create(_: &mut Creation<'_>, _: Args) -> Result<Self, CreateError> {
//!         Ok(Organization)
//!     }
//! }
//!
//! struct Project;
//! impl Creatable for Project {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![Dependency::required::<Organization>()]
//!     }
//!     fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
//!         cx.create_and_update_dependencies(&args)?;
//!         Ok(Project)
//!     }
//! }
//!
//! struct Inventory;
//! impl Creatable for Inventory {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![Dependency::required::<Organization>()]
//!     }
//!     fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
//!         cx.create_and_update_dependencies(&args)?;
//!         Ok(Inventory)
//!     }
//! }
//!
//! struct JobTemplate;
//! impl Creatable for JobTemplate {
//!     fn dependencies() -> Vec<Dependency> {
//!         vec![
//!             Dependency::required::<Project>(),
//!             Dependency::required::<Inventory>(),
//!         ]
//!     }
//!     fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
//!         cx.create_and_update_dependencies(&args)?;
//!         Ok(JobTemplate)
//!     }
//! }
//!
//! let template = create::<JobTemplate>(Args::new()).unwrap();
//! let project = template.ds().get("project").unwrap();
//! let inventory = template.ds().get("inventory").unwrap();
//!
//! // Both were created with the same organization
//! assert_eq!(
//!     project.ds().get("organization").unwrap(),
//!     inventory.ds().get("organization").unwrap(),
//! );
//!
//! // Explicit arguments opt out of sharing
//! let project_args =
//!     Args::new().provide::<Organization>(Provide::construct::<Organization>(Args::new()));
//! let template = create::<JobTemplate>(
//!     Args::new().provide::<Project>(Provide::construct::<Project>(project_args)),
//! )
//! .unwrap();
//! assert_ne!(
//!     template.ds().get("project").unwrap().ds().get("organization").unwrap(),
//!     template.ds().get("inventory").unwrap().ds().get("organization").unwrap(),
//! );
//!
//! template.teardown();
//! assert!(template.ds().get("project").is_err());
//! ```

pub mod args;
pub mod creatable;
pub mod creation;
pub mod dependency_graph;
pub mod errors;
pub mod instance;
pub mod order;
pub mod registry;
pub mod types;

pub use args::{Args, Provide};
pub use creatable::Creatable;
pub use creation::{create, Creation, Creator, DefaultArgs};
pub use dependency_graph::{dependency_graph, optional_dependency_graph, DependencyGraph};
pub use errors::{CircularDependencyError, CreateError, MissingDependencyError, RegistryError};
pub use instance::{all_instantiated_dependencies, DependencyStore, Ds, Instance};
pub use order::{
    creation_order, mandatory_creation_order, page_creation_order, separate_async_optionals,
    CreationOrder,
};
pub use registry::KindRegistry;
pub use types::{Dependency, DynError, Injectable, Kind, TypeInfo};

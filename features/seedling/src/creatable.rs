use crate::{
    args::Args,
    creation::Creation,
    errors::CreateError,
    types::{Dependency, Injectable, Kind},
};

/// A type which can be created together with the objects it depends on
///
/// Dependencies are declared statically, a [Creator](crate::Creator) uses these declarations
/// to order, share and construct dependency instances before handing them to [Creatable::create].
///
/// # Example
/// ```rust
/// use seedling::{Args, Creatable, Creation, CreateError, Dependency};
///
/// struct Organization;
/// impl Creatable for Organization {
///     fn create(_: &mut Creation<'_>, _: Args) -> Result<Self, CreateError> {
///         Ok(Organization)
///     }
/// }
///
/// struct Team;
/// impl Creatable for Team {
///     fn dependencies() -> Vec<Dependency> {
///         vec![Dependency::required::<Organization>()]
///     }
///
///     fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
///         cx.create_and_update_dependencies(&args)?;
///         Ok(Team)
///     }
/// }
///
/// let team = seedling::create::<Team>(Args::new()).unwrap();
/// assert!(team.ds().get("organization").is_ok());
/// ```
pub trait Creatable: Injectable + Sized {
    /// Returns the dependency slots of this type, mandatory and optional
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }

    /// Returns the base kinds an instance of this type can stand in for
    fn provides() -> Vec<Kind> {
        Vec::new()
    }

    /// Constructs a new value
    ///
    /// Implementations resolve their dependencies with [Creation::create_and_update_dependencies].
    /// Failures of the type itself should be returned as [CreateError::Other].
    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError>;

    /// Releases whatever the value holds, called at most once during teardown
    fn cleanup(&self) {}
}

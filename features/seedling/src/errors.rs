use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use thiserror::Error;

use crate::types::{DynError, Kind, TypeInfo};

/// The dependency graph contains a cycle, no creation order exists
///
/// Holds the part of the graph which could not be resolved,
/// with all dependencies on already ordered items removed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Circular dependencies exist among these items: {remaining:?}")]
pub struct CircularDependencyError<N: Debug> {
    pub remaining: BTreeMap<N, BTreeSet<N>>,
}

/// Errors while creating an instance and its dependencies
#[derive(Error, Debug)]
pub enum CreateError {
    /// The declared dependencies can not be ordered
    #[error(transparent)]
    CircularDependency(#[from] CircularDependencyError<Kind>),

    /// A marker kind was asked to be constructed
    #[error("'{0}' is not creatable - provide an instance or a kind which provides it")]
    NotCreatable(Kind),

    /// The value passed for a slot can not fill it
    #[error("'{provided}' can not satisfy the '{slot}' dependency of '{owner}'")]
    InvalidArgument {
        owner: Kind,
        slot: Kind,
        provided: Kind,
    },

    /// A slot was passed which the kind never declared
    #[error("'{slot}' is not a declared dependency of '{owner}'")]
    UndeclaredDependency { owner: Kind, slot: TypeInfo },

    /// A kind could not be looked up
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The create function of a kind failed
    #[error("Creating '{product}' failed - error: {error:?}")]
    CreateFailed { product: Kind, error: DynError },

    /// Generic error returned from a create function
    #[error("Error during creation: {0}")]
    Other(DynError),
}

impl CreateError {
    pub fn other(error: impl Into<DynError>) -> Self {
        Self::Other(error.into())
    }
}

/// Lookup of a dependency through the dotted accessor failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{owner}' has no dependency named '{name}'")]
pub struct MissingDependencyError {
    pub owner: Kind,
    pub name: String,
}

/// Errors of the [KindRegistry](crate::registry::KindRegistry)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A kind has been registered twice
    #[error("A kind has been registered twice: '{0}'")]
    Duplicate(Kind),
    /// No kind is registered under this name
    #[error("No kind is registered as '{0}'")]
    Unknown(String),
}

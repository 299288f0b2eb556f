use seedling::Kind;

/// Errors when registering or loading default arguments
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Defaults for this kind are already registered
    #[error("Defaults for '{0}' are already registered")]
    AlreadyRegistered(Kind),

    /// The configuration names a kind which is not in the registry
    #[error("The configured kind '{0}' is not known")]
    UnknownKind(String),

    /// The defaults of a kind are not a JSON object
    #[error("Defaults for '{name}' must be an object, found {found}")]
    InvalidDefaults { name: String, found: &'static str },
}

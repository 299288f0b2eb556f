use std::collections::HashMap;

use seedling::{Args, Creatable, DefaultArgs, Kind, KindRegistry};
use serde_json::Value;

use crate::errors::ConfigError;

/// A provider of default creation arguments.
///
/// Defaults are registered per kind and merged under the explicit arguments
/// of every construction of that kind, see [DefaultArgs].
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    defaults: HashMap<Kind, Args>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads defaults from a JSON object keyed by kind name
    ///
    /// Names are resolved through `registry`, every value must be an object of fields.
    /// ```json
    /// { "organization": { "name": "Default" }, "job_template": { "verbosity": 2 } }
    /// ```
    pub fn from_json(registry: &KindRegistry, config: &Value) -> Result<Self, ConfigError> {
        let Value::Object(entries) = config else {
            return Err(ConfigError::InvalidDefaults {
                name: String::from("<root>"),
                found: json_type(config),
            });
        };

        let mut provider = Self::new();
        for (name, fields) in entries {
            let kind = registry
                .lookup(name)
                .map_err(|_| ConfigError::UnknownKind(name.clone()))?;

            let Value::Object(fields) = fields else {
                return Err(ConfigError::InvalidDefaults {
                    name: name.clone(),
                    found: json_type(fields),
                });
            };

            let args = fields
                .iter()
                .fold(Args::new(), |args, (field, value)| args.field(field.clone(), value.clone()));
            provider.add_kind_defaults(kind, args)?;
        }

        tracing::debug!("Loaded defaults for {} kinds", provider.defaults.len());
        Ok(provider)
    }

    /// Retrieve the defaults of `T`, if any are registered
    pub fn get_defaults<T: Creatable>(&self) -> Option<&Args> {
        self.defaults.get(&Kind::of::<T>())
    }

    /// Add defaults for `T`.
    ///
    /// If defaults for `T` are already registered, it will return a
    /// [`ConfigError::AlreadyRegistered`] error
    pub fn add_defaults<T: Creatable>(&mut self, args: Args) -> Result<&mut Self, ConfigError> {
        self.add_kind_defaults(Kind::of::<T>(), args)
    }

    pub fn add_kind_defaults(&mut self, kind: Kind, args: Args) -> Result<&mut Self, ConfigError> {
        if self.defaults.contains_key(&kind) {
            return Err(ConfigError::AlreadyRegistered(kind));
        }

        self.defaults.insert(kind, args);
        Ok(self)
    }

    /// Can optionally add defaults for `T`.
    ///
    /// If `args` is `Some`, it will be the same as calling [`ConfigProvider::add_defaults`]
    /// If it is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_defaults<T: Creatable>(
        &mut self,
        args: Option<Args>,
    ) -> Result<&mut Self, ConfigError> {
        match args {
            Some(args) => self.add_defaults::<T>(args),
            None => Ok(self),
        }
    }
}

impl DefaultArgs for ConfigProvider {
    fn defaults_for(&self, kind: &Kind) -> Option<Args> {
        self.defaults.get(kind).cloned()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

use std::collections::BTreeMap;

use crate::{creatable::Creatable, errors::RegistryError, types::Kind};

/// Lookup table from names to kinds
///
/// Used where the kind to create is only known as a string at runtime, e.g. from configuration.
/// Names are matched ignoring case and underscores, so `mixin_user_a`, `MixinUserA`
/// and `mixinusera` all find the same kind.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, Kind>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a creatable type, replacing any kind of the same name
    pub fn add<T: Creatable>(self) -> Self {
        self.add_kind(Kind::of::<T>())
    }

    /// Registers a kind, replacing any kind of the same name
    pub fn add_kind(mut self, kind: Kind) -> Self {
        if let Some(replaced) = self.kinds.insert(normalize(kind.name()), kind) {
            tracing::warn!("Kind '{}' replaced '{}' in registry", kind.type_name(), replaced.type_name());
        }
        self
    }

    /// Registers a kind, failing if the name is already taken
    pub fn try_add_kind(&mut self, kind: Kind) -> Result<&mut Self, RegistryError> {
        let key = normalize(kind.name());
        if let Some(existing) = self.kinds.get(&key) {
            return Err(RegistryError::Duplicate(*existing));
        }

        self.kinds.insert(key, kind);
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Result<Kind, RegistryError> {
        self.kinds
            .get(&normalize(name))
            .copied()
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.kinds.values().copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

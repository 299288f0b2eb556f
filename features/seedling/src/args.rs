use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{instance::Instance, types::{Kind, TypeInfo}};

/// How a dependency slot is filled during creation
#[derive(Debug, Clone)]
pub enum Provide {
    /// Leave the slot empty
    Skip,
    /// Construct the slot's default kind, shared with siblings asking for the same kind
    Auto,
    /// Construct the given kind, shared with siblings asking for the same kind
    Kind(Kind),
    /// Construct a new, unshared instance of the kind with these arguments
    Construct(Kind, Args),
    /// Use an existing instance
    Instance(Instance),
}

impl Provide {
    pub fn construct<T: crate::Creatable>(args: Args) -> Self {
        Provide::Construct(Kind::of::<T>(), args)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Provide::Skip)
    }
}

impl From<bool> for Provide {
    fn from(wanted: bool) -> Self {
        if wanted {
            Provide::Auto
        } else {
            Provide::Skip
        }
    }
}
impl From<Kind> for Provide {
    fn from(kind: Kind) -> Self {
        Provide::Kind(kind)
    }
}
impl From<Instance> for Provide {
    fn from(instance: Instance) -> Self {
        Provide::Instance(instance)
    }
}
impl From<(Kind, Args)> for Provide {
    fn from((kind, args): (Kind, Args)) -> Self {
        Provide::Construct(kind, args)
    }
}

/// Arguments of a create call
///
/// Slots tell the creation which instances to use for declared dependencies,
/// fields are free-form values for the created type itself.
#[derive(Debug, Clone, Default)]
pub struct Args {
    slots: BTreeMap<TypeInfo, Provide>,
    fields: Map<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how the slot declared as `T` is filled
    pub fn provide<T: 'static + ?Sized>(mut self, provide: impl Into<Provide>) -> Self {
        self.slots.insert(TypeInfo::of::<T>(), provide.into());
        self
    }

    /// Sets how the slot declared as `slot` is filled
    pub fn provide_kind(mut self, slot: Kind, provide: impl Into<Provide>) -> Self {
        self.set_slot(slot, provide);
        self
    }

    pub fn set_slot(&mut self, slot: Kind, provide: impl Into<Provide>) {
        self.slots.insert(slot.info(), provide.into());
    }

    pub fn slot(&self, slot: &Kind) -> Option<&Provide> {
        self.slots.get(&slot.info())
    }

    pub fn slots(&self) -> impl Iterator<Item = (&TypeInfo, &Provide)> {
        self.slots.iter()
    }

    /// Whether the slot declared as `T` was explicitly skipped
    pub fn is_skipped<T: 'static + ?Sized>(&self) -> bool {
        self.slots
            .get(&TypeInfo::of::<T>())
            .is_some_and(Provide::is_skip)
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn take_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Fills every slot and field not set here from `defaults`
    pub fn merged_over(mut self, defaults: Args) -> Self {
        for (slot, provide) in defaults.slots {
            self.slots.entry(slot).or_insert(provide);
        }
        for (name, value) in defaults.fields {
            self.fields.entry(name).or_insert(value);
        }
        self
    }
}

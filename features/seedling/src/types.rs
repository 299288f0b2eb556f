use std::{
    any::TypeId,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use crate::{args::Args, creatable::Creatable, creation::Creator, errors::CreateError, instance::Instance};

/// All errors must be Send + Sync
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Anything created by seedling may be handed across threads once built,
/// so it needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(short_name(self.type_name))
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// Static declarations of a creatable type
#[derive(Clone, Copy)]
struct KindTable {
    dependencies: fn() -> Vec<Dependency>,
    provides: fn() -> Vec<Kind>,
    construct: fn(&Creator, Args) -> Result<Instance, CreateError>,
}

/// Token for a kind of object which can appear in a dependency graph.
///
/// Kinds made with [Kind::of] are creatable and carry their declared dependencies.
/// Kinds made with [Kind::marker] are base types without a constructor, they are
/// leaves in every graph and can only be satisfied by kinds which [provide](Creatable::provides) them.
///
/// Two kinds are equal when they name the same type.
#[derive(Clone, Copy)]
pub struct Kind {
    info: TypeInfo,
    table: Option<KindTable>,
}

impl Kind {
    pub fn of<T: Creatable>() -> Kind {
        Kind {
            info: TypeInfo::of::<T>(),
            table: Some(KindTable {
                dependencies: T::dependencies,
                provides: T::provides,
                construct: crate::creation::construct_as::<T>,
            }),
        }
    }

    /// A non-creatable base type, usually a `dyn Trait`
    pub fn marker<T: 'static + ?Sized>() -> Kind {
        Kind {
            info: TypeInfo::of::<T>(),
            table: None,
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn type_name(&self) -> &'static str {
        self.info.type_name
    }

    /// Type name without module path or generics, e.g. `MultipleWordClassName`
    pub fn name(&self) -> &'static str {
        short_name(self.info.type_name)
    }

    /// Name of the slot this kind occupies in a dependency store, e.g. `multiple_word_class_name`
    pub fn slot_name(&self) -> String {
        to_snake(self.name())
    }

    pub fn is_creatable(&self) -> bool {
        self.table.is_some()
    }

    /// All declared dependency slots, mandatory and optional, in declaration order
    pub fn declared(&self) -> Vec<Dependency> {
        self.table
            .map(|table| (table.dependencies)())
            .unwrap_or_default()
    }

    /// Kinds which must exist before this kind can be created
    pub fn dependencies(&self) -> Vec<Kind> {
        self.declared()
            .into_iter()
            .filter(|dependency| !dependency.optional)
            .map(|dependency| dependency.kind)
            .collect()
    }

    /// Kinds which are linked if they are available, but not required
    pub fn optional_dependencies(&self) -> Vec<Kind> {
        self.declared()
            .into_iter()
            .filter(|dependency| dependency.optional)
            .map(|dependency| dependency.kind)
            .collect()
    }

    /// Base kinds an instance of this kind can stand in for
    pub fn provides(&self) -> Vec<Kind> {
        self.table
            .map(|table| (table.provides)())
            .unwrap_or_default()
    }

    /// Whether an instance of this kind can fill a slot declared as `other`
    pub fn satisfies(&self, other: &Kind) -> bool {
        self == other || self.provides().contains(other)
    }

    pub(crate) fn construct(&self, creator: &Creator, args: Args) -> Result<Instance, CreateError> {
        match self.table {
            Some(table) => (table.construct)(creator, args),
            None => Err(CreateError::NotCreatable(*self)),
        }
    }
}

impl PartialEq for Kind {
    fn eq(&self, other: &Self) -> bool {
        self.info == other.info
    }
}
impl Eq for Kind {}
impl Hash for Kind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.info.hash(state);
    }
}
impl PartialOrd for Kind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Kind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.info.cmp(&other.info)
    }
}
impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared dependency slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// The kind the slot is keyed by
    pub kind: Kind,
    /// If it is optional or required
    pub optional: bool,
    /// The kind constructed when the slot is filled automatically
    pub default: Kind,
}

impl Dependency {
    pub fn required<T: Creatable>() -> Self {
        Self::required_kind(Kind::of::<T>())
    }

    pub fn optional<T: Creatable>() -> Self {
        Self::optional_kind(Kind::of::<T>())
    }

    pub fn required_kind(kind: Kind) -> Self {
        Dependency {
            kind,
            optional: false,
            default: kind,
        }
    }

    pub fn optional_kind(kind: Kind) -> Self {
        Dependency {
            kind,
            optional: true,
            default: kind,
        }
    }

    /// Construct `T` instead of the slot's own kind when the slot is filled automatically
    pub fn with_default<T: Creatable>(self) -> Self {
        Dependency {
            default: Kind::of::<T>(),
            ..self
        }
    }
}

fn short_name(type_name: &str) -> &str {
    let name = type_name.split('<').next().unwrap_or(type_name);
    let name = name.split(" + ").next().unwrap_or(name);
    let name = name.trim_start_matches("dyn ");
    name.rsplit("::").next().unwrap_or(name)
}

/// `MultipleWordClassName` -> `multiple_word_class_name`
pub(crate) fn to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut snake = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let previous = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if previous != '_' && (previous.is_lowercase() || next_is_lower) {
                snake.push('_');
            }
        }
        snake.extend(c.to_lowercase());
    }

    snake
}

use std::{
    any::{type_name, Any},
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use crate::{
    creatable::Creatable,
    errors::{CircularDependencyError, MissingDependencyError},
    order::page_creation_order,
    types::{Dependency, Kind},
};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a created object
///
/// Cloning the handle does not clone the object, all clones refer to the same instance.
/// Equality, hashing and ordering use the instance's identity.
#[derive(Clone)]
pub struct Instance(Arc<InstanceInner>);

struct InstanceInner {
    id: u64,
    kind: Kind,
    value: Arc<dyn Any + Send + Sync>,
    cleanup: fn(&(dyn Any + Send + Sync)),
    store: Mutex<DependencyStore>,
    cleaned: AtomicBool,
}

impl Instance {
    pub(crate) fn new<T: Creatable>(kind: Kind, value: T, store: DependencyStore) -> Self {
        Instance(Arc::new(InstanceInner {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            value: Arc::new(value),
            cleanup: cleanup_hook::<T>,
            store: Mutex::new(store),
            cleaned: AtomicBool::new(false),
        }))
    }

    /// Identity of the instance, later instances have larger ids
    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.0.value.is::<T>()
    }

    pub fn downcast<T: Creatable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.0.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.0.kind.type_name()),
        }
    }

    /// Snapshot of the dependency store
    pub fn dependency_store(&self) -> DependencyStore {
        self.store().clone()
    }

    /// The instance filling the slot declared as `slot`, if any
    pub fn dependency(&self, slot: &Kind) -> Option<Instance> {
        self.store().get(slot).cloned()
    }

    /// Attribute style access to dependencies by slot name
    pub fn ds(&self) -> Ds<'_> {
        Ds { instance: self }
    }

    /// Whether the cleanup hook already ran
    pub fn is_cleaned(&self) -> bool {
        self.0.cleaned.load(Ordering::Acquire)
    }

    /// Cleans up this instance and every instance it depends on
    ///
    /// Dependents are cleaned before their dependencies, starting with `self`.
    /// Every instance's cleanup hook runs at most once and its dependency store is cleared,
    /// so calling this again does nothing.
    pub fn teardown(&self) {
        let order = self.teardown_order();
        tracing::debug!("Tearing down {self} and {} dependencies", order.len() - 1);

        for instance in order {
            instance.cleanup_once();
            instance.store().clear();
        }
    }

    /// Reverse post order of the instantiated tree - dependents before dependencies
    fn teardown_order(&self) -> Vec<Instance> {
        let mut visited = HashSet::new();
        let mut post_order = Vec::new();
        visit(self, &mut visited, &mut post_order);
        post_order.reverse();
        return post_order;

        fn visit(instance: &Instance, visited: &mut HashSet<u64>, post_order: &mut Vec<Instance>) {
            if !visited.insert(instance.id()) {
                return;
            }
            // Snapshot so the lock is not held while descending
            let dependencies = instance.store().instances();
            for dependency in &dependencies {
                visit(dependency, visited, post_order);
            }
            post_order.push(instance.clone());
        }
    }

    fn cleanup_once(&self) {
        if self.0.cleaned.swap(true, Ordering::AcqRel) {
            return;
        }
        (self.0.cleanup)(&*self.0.value);
        tracing::debug!("Cleaned up {self}");
    }

    fn store(&self) -> MutexGuard<'_, DependencyStore> {
        self.0.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn cleanup_hook<T: Creatable>(value: &(dyn Any + Send + Sync)) {
    match value.downcast_ref::<T>() {
        Some(value) => value.cleanup(),
        None => tracing::error!("Instance does not hold a '{}'", type_name::<T>()),
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
impl Eq for Instance {}
impl Hash for Instance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}
impl PartialOrd for Instance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Instance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id().cmp(&other.id())
    }
}
impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance of {} (#{})", self.kind(), self.id())
    }
}
impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The instances filling an instance's declared dependency slots
///
/// Holds one entry per declared slot, empty until filled.
/// Slots filled with an instance the owner did not create itself are marked as borrowed.
#[derive(Debug, Clone, Default)]
pub struct DependencyStore {
    slots: BTreeMap<Kind, Option<Instance>>,
    borrowed: BTreeSet<Kind>,
}

impl DependencyStore {
    pub(crate) fn for_slots(declared: &[Dependency]) -> Self {
        DependencyStore {
            slots: declared.iter().map(|dependency| (dependency.kind, None)).collect(),
            borrowed: BTreeSet::new(),
        }
    }

    pub(crate) fn fill(&mut self, slot: Kind, instance: Instance, borrowed: bool) {
        if borrowed {
            self.borrowed.insert(slot);
        } else {
            self.borrowed.remove(&slot);
        }
        self.slots.insert(slot, Some(instance));
    }

    pub fn get(&self, slot: &Kind) -> Option<&Instance> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Whether the slot is declared, filled or not
    pub fn has_slot(&self, slot: &Kind) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Kind, Option<&Instance>)> {
        self.slots.iter().map(|(slot, instance)| (slot, instance.as_ref()))
    }

    /// All filled slots' instances
    pub fn instances(&self) -> Vec<Instance> {
        self.slots.values().flatten().cloned().collect()
    }

    /// Whether the slot holds an instance its owner did not create
    pub fn is_borrowed(&self, slot: &Kind) -> bool {
        self.borrowed.contains(slot)
    }

    /// True if no slot is filled
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Option::is_none)
    }

    /// Empties every slot, slots stay declared
    pub fn clear(&mut self) {
        for instance in self.slots.values_mut() {
            *instance = None;
        }
        self.borrowed.clear();
    }
}

/// Dotted accessor over an instance's dependency store
///
/// Dependencies are named after the snake cased name of their slot's kind,
/// e.g. a slot of `MultipleWordClassName` is `multiple_word_class_name`.
pub struct Ds<'a> {
    instance: &'a Instance,
}

impl Ds<'_> {
    pub fn get(&self, name: &str) -> Result<Instance, MissingDependencyError> {
        self.instance
            .store()
            .iter()
            .find_map(|(slot, instance)| match instance {
                Some(instance) if slot.slot_name() == name => Some(instance.clone()),
                _ => None,
            })
            .ok_or_else(|| MissingDependencyError {
                owner: self.instance.kind(),
                name: name.to_string(),
            })
    }

    /// Names of all filled slots
    pub fn names(&self) -> Vec<String> {
        self.instance
            .store()
            .iter()
            .filter(|(_, instance)| instance.is_some())
            .map(|(slot, _)| slot.slot_name())
            .collect()
    }
}

/// Every instance reachable from `instances`, including themselves, in creation order
///
/// Instances are deduplicated by identity and ordered by the [page_creation_order] of their kinds,
/// instances of the same kind by age. If `kinds` is not empty, only instances satisfying
/// one of them are returned.
pub fn all_instantiated_dependencies(
    instances: &[Instance],
    kinds: &[Kind],
) -> Result<Vec<Instance>, CircularDependencyError<Kind>> {
    let mut reachable = BTreeSet::new();
    for instance in instances {
        collect(instance, &mut reachable);
    }

    let mut by_kind: HashMap<Kind, Vec<Instance>> = HashMap::new();
    for instance in &reachable {
        by_kind.entry(instance.kind()).or_default().push(instance.clone());
    }

    let present: Vec<Kind> = by_kind.keys().copied().collect::<BTreeSet<_>>().into_iter().collect();
    let Some((root, additional)) = present.split_first() else {
        return Ok(Vec::new());
    };

    let mut ordered = Vec::with_capacity(reachable.len());
    for batch in page_creation_order(*root, additional)? {
        for kind in batch {
            // Sorted by id already, as `reachable` is ordered
            if let Some(group) = by_kind.remove(&kind) {
                ordered.extend(group);
            }
        }
    }

    if !kinds.is_empty() {
        ordered.retain(|instance| kinds.iter().any(|kind| instance.kind().satisfies(kind)));
    }

    return Ok(ordered);

    fn collect(instance: &Instance, reachable: &mut BTreeSet<Instance>) {
        if !reachable.insert(instance.clone()) {
            return;
        }
        let dependencies = instance.store().instances();
        for dependency in &dependencies {
            collect(dependency, reachable);
        }
    }
}

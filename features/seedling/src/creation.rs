use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    sync::Arc,
};

use crate::{
    args::{Args, Provide},
    creatable::Creatable,
    errors::CreateError,
    instance::{all_instantiated_dependencies, DependencyStore, Instance},
    order::{defaulted_page_creation_order, CreationOrder},
    types::{Dependency, Kind},
};

/// Source of default arguments, merged under the explicit arguments of every construction
pub trait DefaultArgs: Send + Sync {
    fn defaults_for(&self, kind: &Kind) -> Option<Args>;
}

/// Creates instances together with their dependencies
#[derive(Clone, Default)]
pub struct Creator {
    defaults: Option<Arc<dyn DefaultArgs>>,
}

impl Creator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: impl DefaultArgs + 'static) -> Self {
        Creator {
            defaults: Some(Arc::new(defaults)),
        }
    }

    pub fn create<T: Creatable>(&self, args: Args) -> Result<Instance, CreateError> {
        self.construct(Kind::of::<T>(), args)
    }

    /// `args` with the registered defaults of `kind` merged underneath
    fn defaulted(&self, kind: &Kind, args: Args) -> Args {
        match self
            .defaults
            .as_ref()
            .and_then(|defaults| defaults.defaults_for(kind))
        {
            Some(defaults) => args.merged_over(defaults),
            None => args,
        }
    }

    /// Creates an instance of a kind only known at runtime
    pub fn construct(&self, kind: Kind, args: Args) -> Result<Instance, CreateError> {
        let args = self.defaulted(&kind, args);
        kind.construct(self, args)
    }
}

/// Creates an instance of `T` and its dependencies, without default arguments
pub fn create<T: Creatable>(args: Args) -> Result<Instance, CreateError> {
    Creator::new().create::<T>(args)
}

pub(crate) fn construct_as<T: Creatable>(creator: &Creator, args: Args) -> Result<Instance, CreateError> {
    let kind = Kind::of::<T>();
    let _span = tracing::debug_span!("create", %kind).entered();

    let mut cx = Creation::new(creator, kind);
    let value = T::create(&mut cx, args).map_err(|error| match error {
        CreateError::Other(error) => CreateError::CreateFailed {
            product: kind,
            error,
        },
        error => error,
    })?;

    let instance = Instance::new(kind, value, cx.store);
    tracing::debug!("Created {instance}");
    Ok(instance)
}

/// How a slot gets its instance
enum Claim {
    /// Passed in by the caller
    Supplied(Instance),
    /// Whatever instance of the kind the creation produces or already holds
    Shared(Kind),
    /// A fresh instance built from explicit arguments, index into the fresh requests
    Fresh(usize),
}

/// State of a single instance under construction
///
/// Handed to [Creatable::create] to resolve the declared dependencies of the type.
pub struct Creation<'c> {
    creator: &'c Creator,
    kind: Kind,
    declared: Vec<Dependency>,
    store: DependencyStore,
}

impl<'c> Creation<'c> {
    fn new(creator: &'c Creator, kind: Kind) -> Self {
        let declared = kind.declared();
        Creation {
            creator,
            kind,
            store: DependencyStore::for_slots(&declared),
            declared,
        }
    }

    /// The kind under construction
    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn creator(&self) -> &'c Creator {
        self.creator
    }

    /// The instance filling the slot declared as `slot`, once resolved
    pub fn dependency(&self, slot: &Kind) -> Option<&Instance> {
        self.store.get(slot)
    }

    /// Resolves every declared slot and records the result in the dependency store
    ///
    /// Slots missing from `args` are filled automatically when mandatory and left empty when optional.
    /// Automatically filled slots share instances: every kind is constructed once per call and
    /// handed to every other construction declaring it, all the way down the tree.
    /// Instances supplied by the caller, and everything they already depend on, are reused.
    /// [Provide::Construct] always creates a new instance for its own slot. That instance joins the
    /// pool for later constructions only when no instance of its kind is pooled yet.
    pub fn create_and_update_dependencies(&mut self, args: &Args) -> Result<(), CreateError> {
        for (slot, _) in args.slots() {
            if !self.declared.iter().any(|dependency| dependency.kind.info() == *slot) {
                return Err(CreateError::UndeclaredDependency {
                    owner: self.kind,
                    slot: *slot,
                });
            }
        }

        let mut claims: Vec<(Kind, Claim)> = Vec::new();
        let mut supplied: Vec<Instance> = Vec::new();
        let mut shared: BTreeSet<Kind> = BTreeSet::new();
        let mut fresh: Vec<(Kind, Args)> = Vec::new();

        for dependency in &self.declared {
            let provide = match args.slot(&dependency.kind) {
                Some(provide) => provide.clone(),
                None if dependency.optional => Provide::Skip,
                None => Provide::Auto,
            };

            match provide {
                Provide::Skip => {
                    tracing::trace!("Leaving '{}' of {} empty", dependency.kind, self.kind);
                }
                Provide::Auto => {
                    self.check_satisfies(dependency, dependency.default)?;
                    shared.insert(dependency.default);
                    claims.push((dependency.kind, Claim::Shared(dependency.default)));
                }
                Provide::Kind(kind) => {
                    self.check_satisfies(dependency, kind)?;
                    shared.insert(kind);
                    claims.push((dependency.kind, Claim::Shared(kind)));
                }
                Provide::Construct(kind, construct_args) => {
                    self.check_satisfies(dependency, kind)?;
                    if !kind.is_creatable() {
                        return Err(CreateError::NotCreatable(kind));
                    }
                    claims.push((dependency.kind, Claim::Fresh(fresh.len())));
                    fresh.push((kind, construct_args));
                }
                Provide::Instance(instance) => {
                    self.check_satisfies(dependency, instance.kind())?;
                    supplied.push(instance.clone());
                    claims.push((dependency.kind, Claim::Supplied(instance)));
                }
            }
        }

        // Everything the supplied instances already hold is reused before creating anything new
        let mut pool: BTreeMap<Kind, Instance> = BTreeMap::new();
        for instance in all_instantiated_dependencies(&supplied, &[])? {
            pool.entry(instance.kind()).or_insert(instance);
        }
        for instance in &supplied {
            pool.insert(instance.kind(), instance.clone());
        }

        let mut additional: Vec<Kind> = shared
            .iter()
            .copied()
            .chain(fresh.iter().map(|(kind, _)| *kind))
            .chain(supplied.iter().map(Instance::kind))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        additional.retain(|kind| *kind != self.kind);
        let order = defaulted_page_creation_order(self.kind, &additional)?;
        let demanded = self.demanded_kinds(&order, &shared, &fresh, &pool);

        let mut built: Vec<Option<Instance>> = vec![None; fresh.len()];
        let mut created: HashSet<u64> = HashSet::new();

        for kind in order.into_iter().flatten() {
            if kind == self.kind || !demanded.contains(&kind) || !kind.is_creatable() {
                continue;
            }

            let fresh_requests: Vec<usize> = fresh
                .iter()
                .enumerate()
                .filter(|(_, (fresh_kind, _))| *fresh_kind == kind)
                .map(|(index, _)| index)
                .collect();

            if !fresh_requests.is_empty() {
                for index in fresh_requests {
                    let instance = self.build(kind, fresh[index].1.clone(), &pool)?;
                    created.insert(instance.id());
                    pool.entry(kind).or_insert_with(|| instance.clone());
                    built[index] = Some(instance);
                }
                continue;
            }

            if satisfying(&pool, &kind).is_some() {
                continue;
            }

            let instance = self.build(kind, Args::new(), &pool)?;
            created.insert(instance.id());
            pool.insert(kind, instance);
        }

        for (slot, claim) in claims {
            let instance = match claim {
                Claim::Supplied(instance) => instance,
                Claim::Shared(kind) => match satisfying(&pool, &kind) {
                    Some(instance) => instance.clone(),
                    None => return Err(CreateError::NotCreatable(kind)),
                },
                Claim::Fresh(index) => match built[index].take() {
                    Some(instance) => instance,
                    None => return Err(CreateError::NotCreatable(fresh[index].0)),
                },
            };

            let borrowed = !created.contains(&instance.id());
            tracing::debug!(
                "{}.{} = {instance}{}",
                self.kind,
                slot.slot_name(),
                if borrowed { " (borrowed)" } else { "" }
            );
            self.store.fill(slot, instance, borrowed);
        }

        Ok(())
    }

    /// Kinds which will be consumed by this creation
    ///
    /// Starts from the requested kinds and walks the order backwards, adding the default kind of
    /// every mandatory slot which a kind going to be built is left to fill itself.
    /// Slots declared as a base type demand the kind providing it, so siblings share one instance.
    fn demanded_kinds(
        &self,
        order: &CreationOrder,
        shared: &BTreeSet<Kind>,
        fresh: &[(Kind, Args)],
        pool: &BTreeMap<Kind, Instance>,
    ) -> BTreeSet<Kind> {
        let mut demanded = shared.clone();
        demanded.extend(fresh.iter().map(|(kind, _)| *kind));

        for kind in order.iter().rev().flatten() {
            if *kind == self.kind || !demanded.contains(kind) {
                continue;
            }

            let mut requests: Vec<Args> = fresh
                .iter()
                .filter(|(fresh_kind, _)| fresh_kind == kind)
                .map(|(_, args)| args.clone())
                .collect();
            if requests.is_empty() {
                if satisfying(pool, kind).is_some() {
                    continue;
                }
                requests.push(Args::new());
            }

            for args in requests {
                let args = self.creator.defaulted(kind, args);
                for dependency in kind.declared() {
                    if !dependency.optional
                        && args.slot(&dependency.kind).is_none()
                        && satisfying(pool, &dependency.kind).is_none()
                    {
                        demanded.insert(dependency.default);
                    }
                }
            }
        }

        demanded
    }

    /// Constructs `kind`, handing it every pooled instance it declares and was not given explicitly
    fn build(
        &self,
        kind: Kind,
        mut args: Args,
        pool: &BTreeMap<Kind, Instance>,
    ) -> Result<Instance, CreateError> {
        for dependency in kind.declared() {
            if args.slot(&dependency.kind).is_some() {
                continue;
            }
            let pooled = pool
                .get(&dependency.default)
                .or_else(|| satisfying(pool, &dependency.kind));
            if let Some(instance) = pooled {
                tracing::trace!("Sharing {instance} with new {kind}");
                args.set_slot(dependency.kind, instance.clone());
            }
        }

        self.creator.construct(kind, args)
    }

    fn check_satisfies(&self, dependency: &Dependency, provided: Kind) -> Result<(), CreateError> {
        if provided.satisfies(&dependency.kind) {
            return Ok(());
        }

        Err(CreateError::InvalidArgument {
            owner: self.kind,
            slot: dependency.kind,
            provided,
        })
    }
}

/// The pooled instance of `kind`, or else the first pooled instance providing it
fn satisfying<'p>(pool: &'p BTreeMap<Kind, Instance>, kind: &Kind) -> Option<&'p Instance> {
    pool.get(kind)
        .or_else(|| pool.values().find(|instance| instance.kind().satisfies(kind)))
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use seedling::{
    Args, Creatable, CreateError, Creation, Dependency, Instance, Kind, KindRegistry, Provide,
};
use serde_json::{Map, Value};

/// Fixture types remember their fields and how often they were cleaned up
pub trait Tracked {
    fn kw(&self) -> &Map<String, Value>;
    fn cleanups(&self) -> usize;
}

macro_rules! kinds {
    ($(
        $name:ident {
            $(requires: [$($required:ty),* $(,)?],)?
            $(optional: [$($optional:ty),* $(,)?],)?
            $(provides: [$($provided:expr),* $(,)?],)?
        }
    )*) => {$(
        #[derive(Debug, Default)]
        pub struct $name {
            pub kw: Map<String, Value>,
            pub cleanups: AtomicUsize,
        }

        impl Creatable for $name {
            fn dependencies() -> Vec<Dependency> {
                #[allow(unused_mut)]
                let mut dependencies = Vec::new();
                $($(dependencies.push(Dependency::required::<$required>());)*)?
                $($(dependencies.push(Dependency::optional::<$optional>());)*)?
                dependencies
            }

            fn provides() -> Vec<Kind> {
                vec![$($($provided),*)?]
            }

            fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
                cx.create_and_update_dependencies(&args)?;
                Ok($name {
                    kw: args.into_fields(),
                    cleanups: AtomicUsize::new(0),
                })
            }

            fn cleanup(&self) {
                self.cleanups.fetch_add(1, Ordering::SeqCst);
            }
        }

        impl Tracked for $name {
            fn kw(&self) -> &Map<String, Value> {
                &self.kw
            }

            fn cleanups(&self) -> usize {
                self.cleanups.load(Ordering::SeqCst)
            }
        }
    )*};
}

kinds! {
    A {}
    B { optional: [A], }
    C { requires: [A, B], }
    D { requires: [A], optional: [B], }
    E { requires: [D, C], }
    F { requires: [B], optional: [E], }
    G { requires: [D], optional: [F, E], }
    H { optional: [E, A], }

    MultipleWordClassName {}
    AnotherMultipleWordClassName { optional: [MultipleWordClassName], }

    One {}
    Two { requires: [One], }
    Three { requires: [Two, One], }
    Four { optional: [Two], }
    Five { requires: [Two], optional: [One], }
    Six { requires: [Two], provides: [isnt_a_has_create()], }

    OneWithArgs {}
    ThreeWithArgs { requires: [OneWithArgs], optional: [TwoWithArgs], }
    FourWithArgs { requires: [TwoWithArgs, ThreeWithArgs], }

    MixinUserA { provides: [not_has_create()], }
    MixinUserB { provides: [not_has_create()], }
    MixinUserC { provides: [Kind::of::<MixinUserB>(), not_has_create()], }
    MixinUserD {
        provides: [Kind::of::<MixinUserC>(), Kind::of::<MixinUserB>(), not_has_create()],
    }

    SharesNotHasCreate { requires: [NotHasCreateDependencyHolder, NotHasCreateSibling], }
    NestsHasCreateParent { requires: [HasCreateParentDependencyHolder], }

    LoopStart { requires: [LoopEnd], }
    LoopEnd { requires: [LoopStart], }
    SelfReferencing { requires: [SelfReferencing], }
}

/// Base types nothing can be created as directly
pub trait IsntAHasCreate {}
pub trait NotHasCreate {}

pub fn isnt_a_has_create() -> Kind {
    Kind::marker::<dyn IsntAHasCreate>()
}

pub fn not_has_create() -> Kind {
    Kind::marker::<dyn NotHasCreate>()
}

/// Depends on a base type only
#[derive(Debug, Default)]
pub struct Seven;
impl Creatable for Seven {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required_kind(isnt_a_has_create())]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(Seven)
    }
}

/// Creates its `OneWithArgs` from fixed arguments when asked to and none was given
#[derive(Debug, Default)]
pub struct TwoWithArgs {
    pub kw: Map<String, Value>,
    pub cleanups: AtomicUsize,
}
impl Creatable for TwoWithArgs {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<OneWithArgs>()]
    }

    fn create(cx: &mut Creation<'_>, mut args: Args) -> Result<Self, CreateError> {
        if args.is_skipped::<OneWithArgs>()
            && args
                .take_field("make_one_with_args")
                .is_some_and(|make| make == true)
        {
            let one_args = Args::new().field("a", "a").field("b", "b").field("c", "c");
            args.set_slot(
                Kind::of::<OneWithArgs>(),
                Provide::construct::<OneWithArgs>(one_args),
            );
        }

        cx.create_and_update_dependencies(&args)?;
        Ok(TwoWithArgs {
            kw: args.into_fields(),
            cleanups: AtomicUsize::new(0),
        })
    }

    fn cleanup(&self) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
    }
}
impl Tracked for TwoWithArgs {
    fn kw(&self) -> &Map<String, Value> {
        &self.kw
    }

    fn cleanups(&self) -> usize {
        self.cleanups.load(Ordering::SeqCst)
    }
}

/// Depends on a base type, filled with a `MixinUserA` by default
#[derive(Debug, Default)]
pub struct NotHasCreateDependencyHolder;
impl Creatable for NotHasCreateDependencyHolder {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required_kind(not_has_create()).with_default::<MixinUserA>()]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(NotHasCreateDependencyHolder)
    }
}

/// Declares the same base type dependency as [NotHasCreateDependencyHolder]
#[derive(Debug, Default)]
pub struct NotHasCreateSibling;
impl Creatable for NotHasCreateSibling {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required_kind(not_has_create()).with_default::<MixinUserA>()]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(NotHasCreateSibling)
    }
}

/// Depends on `MixinUserB`, filled with a `MixinUserC` by default
#[derive(Debug, Default)]
pub struct HasCreateParentDependencyHolder;
impl Creatable for HasCreateParentDependencyHolder {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<MixinUserB>().with_default::<MixinUserC>()]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(HasCreateParentDependencyHolder)
    }
}

/// Picks the kind filling its base type dependency by the name in the `not_has_create` field
#[derive(Debug, Default)]
pub struct DynamicallyDeclaresNotHasCreateDependency;
impl Creatable for DynamicallyDeclaresNotHasCreateDependency {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required_kind(not_has_create()).with_default::<MixinUserA>()]
    }

    fn create(cx: &mut Creation<'_>, mut args: Args) -> Result<Self, CreateError> {
        if let Some(Value::String(name)) = args.take_field("not_has_create") {
            let kind = mixin_registry().lookup(&name)?;
            args.set_slot(not_has_create(), kind);
        }

        cx.create_and_update_dependencies(&args)?;
        Ok(DynamicallyDeclaresNotHasCreateDependency)
    }
}

/// Picks the kind filling its `MixinUserB` dependency by the name in the `mixin_user_b` field
#[derive(Debug, Default)]
pub struct DynamicallyDeclaresHasCreateDependency;
impl Creatable for DynamicallyDeclaresHasCreateDependency {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<MixinUserB>()]
    }

    fn create(cx: &mut Creation<'_>, mut args: Args) -> Result<Self, CreateError> {
        if let Some(Value::String(name)) = args.take_field("mixin_user_b") {
            let kind = mixin_registry().lookup(&name)?;
            args.set_slot(Kind::of::<MixinUserB>(), kind);
        }

        cx.create_and_update_dependencies(&args)?;
        Ok(DynamicallyDeclaresHasCreateDependency)
    }
}

/// Fails in its own create function
#[derive(Debug, Default)]
pub struct Failing;
impl Creatable for Failing {
    fn create(_: &mut Creation<'_>, _: Args) -> Result<Self, CreateError> {
        Err(CreateError::other("no capacity left"))
    }
}

/// Depends on a kind which always fails
#[derive(Debug, Default)]
pub struct DependsOnFailing;
impl Creatable for DependsOnFailing {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Failing>()]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(DependsOnFailing)
    }
}

/// Depends on a base type without naming anything creatable for it
#[derive(Debug, Default)]
pub struct NeedsUnprovidedBase;
impl Creatable for NeedsUnprovidedBase {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required_kind(not_has_create())]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(NeedsUnprovidedBase)
    }
}

pub fn mixin_registry() -> KindRegistry {
    KindRegistry::new()
        .add::<MixinUserA>()
        .add::<MixinUserB>()
        .add::<MixinUserC>()
        .add::<MixinUserD>()
}

pub fn kind<T: Creatable>() -> Kind {
    Kind::of::<T>()
}

/// The instance in the slot declared as `T`, panicking if it is empty
pub fn dependency<T: Creatable>(instance: &Instance) -> Instance {
    instance
        .dependency(&Kind::of::<T>())
        .unwrap_or_else(|| panic!("{instance} has no {}", Kind::of::<T>()))
}

pub fn kw<T: Creatable + Tracked>(instance: &Instance) -> Map<String, Value> {
    instance
        .downcast::<T>()
        .unwrap_or_else(|actual| panic!("expected {}, found {actual}", Kind::of::<T>()))
        .kw()
        .clone()
}

pub fn cleanups<T: Creatable + Tracked>(instance: &Instance) -> usize {
    instance
        .downcast::<T>()
        .unwrap_or_else(|actual| panic!("expected {}, found {actual}", Kind::of::<T>()))
        .cleanups()
}

pub fn json_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, found {other}"),
    }
}

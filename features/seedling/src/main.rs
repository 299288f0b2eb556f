use std::env;

use seedling::{
    page_creation_order, Args, Creatable, CreateError, Creation, Dependency, DynError, Kind,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), DynError> {
    init_tracing();

    let order = page_creation_order(Kind::of::<JobTemplate>(), &[Kind::of::<Credential>()])?;
    for (index, batch) in order.iter().enumerate() {
        println!("batch {index}: {batch:?}");
    }

    let template = seedling::create::<JobTemplate>(
        Args::new()
            .provide::<Credential>(true)
            .field("name", "Demo Job Template"),
    )?;
    println!("{template}: {:?}", template.ds().names());

    let project = template.ds().get("project")?;
    let inventory = template.ds().get("inventory")?;
    println!(
        "project and inventory share their organization: {}",
        project.ds().get("organization")? == inventory.ds().get("organization")?
    );

    template.teardown();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SEEDLING_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "seedling=debug,info"
        } else {
            "seedling=info,warn"
        })
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[derive(Debug)]
struct Organization;
impl Creatable for Organization {
    fn create(_: &mut Creation<'_>, _: Args) -> Result<Self, CreateError> {
        Ok(Organization)
    }

    fn cleanup(&self) {
        println!("deleting organization");
    }
}

#[derive(Debug)]
struct Credential;
impl Creatable for Credential {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::optional::<Organization>()]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(Credential)
    }

    fn cleanup(&self) {
        println!("deleting credential");
    }
}

#[derive(Debug)]
struct Project;
impl Creatable for Project {
    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::required::<Organization>(),
            Dependency::optional::<Credential>(),
        ]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(Project)
    }

    fn cleanup(&self) {
        println!("deleting project");
    }
}

#[derive(Debug)]
struct Inventory;
impl Creatable for Inventory {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required::<Organization>()]
    }

    fn create(cx: &mut Creation<'_>, args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        Ok(Inventory)
    }

    fn cleanup(&self) {
        println!("deleting inventory");
    }
}

#[derive(Debug)]
struct JobTemplate {
    name: String,
}
impl Creatable for JobTemplate {
    fn dependencies() -> Vec<Dependency> {
        vec![
            Dependency::required::<Project>(),
            Dependency::required::<Inventory>(),
            Dependency::optional::<Credential>(),
        ]
    }

    fn create(cx: &mut Creation<'_>, mut args: Args) -> Result<Self, CreateError> {
        cx.create_and_update_dependencies(&args)?;
        let name = match args.take_field("name") {
            Some(serde_json::Value::String(name)) => name,
            _ => String::from("Job Template"),
        };
        Ok(JobTemplate { name })
    }

    fn cleanup(&self) {
        println!("deleting job template '{}'", self.name);
    }
}

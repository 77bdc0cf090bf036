//! Basic example of the Diwan container.
//!
//! Run with `DIWAN_LOG=diwan_container=debug` to see resolution traces.

use std::sync::Arc;

use diwan::prelude::*;
use diwan::value::Native;

// === Native types built by the container ===

struct Database {
    url: String,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        format!("{sql} -> results from {}", self.url)
    }
}

struct UserRepository {
    db: Arc<Database>,
}

// === Class descriptions ===

fn database() -> ClassInfo {
    ClassInfo::new("app::Database")
        .param(Parameter::builtin("url", "string"))
        .build_with(|args| {
            let url = args[0].as_str().ok_or("url must be a string")?;
            Ok(Arc::new(Database { url: url.to_string() }) as Native)
        })
}

fn user_repository() -> ClassInfo {
    ClassInfo::new("app::UserRepository")
        .param(Parameter::typed("db", "app::Database"))
        .build_with(|args| {
            let db = args[0].as_native::<Database>().ok_or("db must be a Database")?;
            Ok(Arc::new(UserRepository { db }) as Native)
        })
}

diwan::submit_class!(database);
diwan::submit_class!(user_repository);

fn main() -> Result<()> {
    init_tracing("info");

    let container = Container::builder()
        .with_environment(MapEnvironment::new().with("DATABASE_HOST", "localhost"))
        .add_definitions([
            ("db.host", Definition::from(env_or("DATABASE_HOST", value("127.0.0.1")))),
            ("db.url", string("postgres://{db.host}/myapp")),
            ("app::Database", create().constructor_parameter("url", get("db.url")).into()),
        ])
        .build()?;

    // UserRepository is not defined anywhere: it is autowired from its
    // constructor parameter type.
    let repository = container.get_native::<UserRepository>("app::UserRepository")?;
    println!("{}", repository.db.query("SELECT * FROM users WHERE id = 1"));

    let again = container.get_native::<UserRepository>("app::UserRepository")?;
    println!("Same repository instance: {}", Arc::ptr_eq(&repository, &again));

    let fresh = container.make(
        "app::Database",
        vec![("url".into(), Value::from("postgres://replica/myapp"))],
    )?;
    println!("Built a fresh database: {}", fresh.as_object().is_some_and(|o| o.has_native()));

    match container.get("app::Mailer") {
        Err(err) => println!("{err}"),
        Ok(value) => println!("unexpected: {value:?}"),
    }

    Ok(())
}

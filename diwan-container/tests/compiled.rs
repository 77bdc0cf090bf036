use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use diwan_container::compiler::{CompileOutcome, CompiledModule, Compiler};
use diwan_container::container::ContainerSettings;
use diwan_container::definition::helpers::*;
use diwan_container::environment::MapEnvironment;
use diwan_container::prelude::*;
use diwan_container::source::{DefinitionArray, DefinitionSource, SourceChain};

/// Counts lookups so tests can tell compiled entries from interpreted ones.
struct CountingSource {
    inner: DefinitionArray,
    lookups: Arc<AtomicUsize>,
}

impl DefinitionSource for CountingSource {
    fn get_definition(&self, name: &str) -> Result<Option<Definition>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_definition(name)
    }

    fn definition_names(&self) -> Vec<String> {
        self.inner.definition_names()
    }
}

fn classes() -> ClassRegistry {
    let mut classes = ClassRegistry::new();
    classes.register(ClassInfo::new("Logger").property("level"));
    classes.register(
        ClassInfo::new("Mailer")
            .param(Parameter::typed("logger", "Logger"))
            .param(Parameter::builtin("host", "string"))
            .param(Parameter::builtin("port", "int").with_default(25))
            .method("addRecipient", vec![Parameter::builtin("address", "string")]),
    );
    classes.register(ClassInfo::new("Report"));
    classes
}

fn definitions() -> DefinitionArray {
    DefinitionArray::from_definitions([
        ("app.name", value("diwan")),
        ("app.debug", value(true)),
        ("app.alias", get("app.name")),
        ("app.title", string("{app.name} ({app.env})")),
        ("app.env", env_or("APP_ENV", value("dev")).into()),
        ("app.secret", env("APP_SECRET").optional().into()),
        ("Logger", create().property("level", "info").into()),
        (
            "Mailer",
            create()
                .constructor_parameter("host", get("mail.host"))
                .method("addRecipient", vec![value("ops@example.com")])
                .into(),
        ),
        ("mail.host", value("smtp.local")),
        (
            "mailer.backup",
            create()
                .class("Mailer")
                .constructor_parameter("host", value("backup.local"))
                .scope(Scope::Prototype)
                .into(),
        ),
        ("Report", create().lazy().into()),
        (
            "listeners",
            array(vec![get("Logger"), create().class("Logger").property("level", "debug").into()]).into(),
        ),
        ("clock", factory(|_| Ok(Value::Int(42))).into()),
    ])
    .unwrap()
}

const COMPILED: &[&str] = &[
    "app.name",
    "app.debug",
    "app.alias",
    "app.title",
    "app.env",
    "app.secret",
    "Logger",
    "Mailer",
    "mail.host",
    "mailer.backup",
    "Report",
    "listeners",
];

fn builder(source: impl DefinitionSource + 'static) -> ContainerBuilder {
    Container::builder()
        .with_classes(classes())
        .with_environment(MapEnvironment::new().with("APP_ENV", "test"))
        .add_source(source)
}

fn interpreted() -> Container {
    builder(definitions()).build().unwrap()
}

fn compiled(dir: &Path) -> Container {
    builder(definitions()).enable_compilation(dir, "AppContainer").build().unwrap()
}

fn forced(value: Value) -> Value {
    value.resolve_lazy().unwrap()
}

#[test]
fn compiled_and_interpreted_agree() {
    let dir = tempfile::tempdir().unwrap();
    let compiled = compiled(dir.path());
    let interpreted = interpreted();

    for name in COMPILED.iter().copied().chain(["clock"]) {
        let expected = forced(interpreted.get(name).unwrap());
        let actual = forced(compiled.get(name).unwrap());
        assert_eq!(actual, expected, "entry {name}");
    }

    assert_eq!(compiled.get("app.title").unwrap(), Value::from("diwan (test)"));
    assert_eq!(compiled.get("app.secret").unwrap(), Value::Null);
}

#[test]
fn module_lists_only_lowerable_entries() {
    let dir = tempfile::tempdir().unwrap();
    compiled(dir.path());

    let path = Compiler::module_path(dir.path(), "AppContainer");
    let module = CompiledModule::load(&path).unwrap();
    assert_eq!(module.name, "AppContainer");
    for name in COMPILED {
        assert!(module.has_entry(name), "{name} should be compiled");
    }
    assert!(!module.has_entry("clock"));
}

#[test]
fn compiled_entries_skip_the_sources() {
    let dir = tempfile::tempdir().unwrap();
    let lookups = Arc::new(AtomicUsize::new(0));
    let source = CountingSource {
        inner: definitions(),
        lookups: lookups.clone(),
    };
    let container = builder(source)
        .enable_compilation(dir.path(), "AppContainer")
        .build()
        .unwrap();

    lookups.store(0, Ordering::SeqCst);
    container.get("Mailer").unwrap();
    container.get("app.title").unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 0);

    assert_eq!(container.get("clock").unwrap(), Value::Int(42));
    assert!(lookups.load(Ordering::SeqCst) > 0);
}

#[test]
fn compiled_scopes() {
    let dir = tempfile::tempdir().unwrap();
    let container = compiled(dir.path());

    let mailer = container.get("Mailer").unwrap();
    assert!(mailer.same(&container.get("Mailer").unwrap()));
    assert!(
        mailer.as_object().unwrap().argument(0).unwrap().same(&container.get("Logger").unwrap())
    );

    let first = container.get("mailer.backup").unwrap();
    let second = container.get("mailer.backup").unwrap();
    assert!(!first.same(&second));
    assert_eq!(first, second);
}

#[test]
fn compiled_lazy_entries() {
    let dir = tempfile::tempdir().unwrap();
    let container = compiled(dir.path());

    let report = container.get("Report").unwrap();
    match &report {
        Value::Lazy(lazy) => assert!(!lazy.is_initialized()),
        other => panic!("Expected lazy value, got: {other:?}"),
    }
    assert_eq!(forced(report).as_object().unwrap().class_name(), "Report");
}

#[test]
fn set_overrides_compiled_entries() {
    let dir = tempfile::tempdir().unwrap();
    let container = compiled(dir.path());

    assert_eq!(container.get("app.name").unwrap(), Value::from("diwan"));
    container.set("app.name", "renamed").unwrap();
    assert_eq!(container.get("app.name").unwrap(), Value::from("renamed"));
    // Compiled routines that reference the entry see the override too.
    assert_eq!(container.get("app.alias").unwrap(), Value::from("renamed"));
}

#[test]
fn compilation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let compiler = Compiler::new(Arc::new(classes()));
    let chain = SourceChain::new(vec![Arc::new(definitions()) as Arc<dyn DefinitionSource>]);

    let first = compiler.compile(&chain, dir.path(), "AppContainer").unwrap();
    let written = std::fs::read(first.path()).unwrap();

    let changed = SourceChain::new(vec![Arc::new(
        DefinitionArray::from_definitions([("app.name", value("changed"))]).unwrap(),
    ) as Arc<dyn DefinitionSource>]);
    let second = compiler.compile(&changed, dir.path(), "AppContainer").unwrap();

    match second {
        CompileOutcome::AlreadyCompiled { path } => assert_eq!(path, first.path()),
        other => panic!("Expected AlreadyCompiled, got: {other:?}"),
    }
    assert_eq!(std::fs::read(first.path()).unwrap(), written);
}

#[test]
fn stale_module_is_served_until_removed() {
    let dir = tempfile::tempdir().unwrap();
    compiled(dir.path());

    let rebuilt = Container::builder()
        .with_classes(classes())
        .add_definitions([("app.name", value("changed"))])
        .enable_compilation(dir.path(), "AppContainer")
        .build()
        .unwrap();
    assert_eq!(rebuilt.get("app.name").unwrap(), Value::from("diwan"));
}

#[test]
fn preloaded_module() {
    let compiler = Compiler::new(Arc::new(classes()));
    let chain = SourceChain::new(vec![Arc::new(definitions()) as Arc<dyn DefinitionSource>]);
    let (module, skipped) = compiler.lower(&chain, "InMemory");
    assert_eq!(skipped, 1);

    let container = builder(definitions()).with_compiled_module(module).build().unwrap();
    assert_eq!(container.get("app.alias").unwrap(), Value::from("diwan"));
    assert!(container.has("Mailer"));
}

#[test]
fn settings_from_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let settings: ContainerSettings = serde_json::from_value(serde_json::json!({
        "declared_dependencies": false,
        "compilation": { "directory": dir.path(), "module_name": "Configured" }
    }))
    .unwrap();

    let container = builder(definitions()).settings(settings).build().unwrap();
    assert_eq!(container.get("app.env").unwrap(), Value::from("test"));
    assert!(Compiler::module_path(dir.path(), "Configured").exists());
}

#[test]
fn compiled_errors_keep_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let container = Container::builder()
        .with_classes(classes())
        .with_environment(MapEnvironment::new())
        .add_definitions([("service", get("db")), ("db", env("DATABASE_URL").into())])
        .enable_compilation(dir.path(), "Failing")
        .build()
        .unwrap();

    match container.get("service") {
        Err(err @ DiError::InvalidDefinition(_)) => assert_eq!(err.path(), ["service", "db"]),
        other => panic!("Expected InvalidDefinition, got: {other:?}"),
    }
}

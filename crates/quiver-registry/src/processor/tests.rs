//! Unit tests for manifest processing.

#![expect(clippy::expect_used, reason = "tests use expect for clarity")]

use std::any::Any;
use std::sync::Arc;

use mockall::mock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::provider::{Provider, ProviderConfig, ProviderFactory, SharedProvider};
use crate::resolver::{ModuleExport, StaticResolver};

struct Backend {
    config: ProviderConfig,
}

impl Provider for Backend {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct BackendFactory;

impl ProviderFactory<()> for BackendFactory {
    fn create(
        &self,
        _application: &(),
        config: &ProviderConfig,
    ) -> Result<SharedProvider, RegistryError> {
        Ok(Arc::new(Backend {
            config: config.clone(),
        }))
    }
}

mock! {
    Resolver {}
    impl ModuleResolver<()> for Resolver {
        fn resolve(&self, name: &str) -> Result<ModuleExport<()>, RegistryError>;
    }
}

/// Observer recording every skipped error's message.
#[derive(Default)]
struct RecordingObserver {
    skipped: Vec<String>,
}

impl ManifestObserver for RecordingObserver {
    fn entry_skipped(&mut self, error: &RegistryError) {
        self.skipped.push(error.to_string());
    }
}

fn known_backends() -> StaticResolver<()> {
    let mut resolver = StaticResolver::new();
    resolver.register("sqlite", Arc::new(BackendFactory));
    resolver.register("mysql", Arc::new(BackendFactory));
    resolver.register("console", Arc::new(BackendFactory));
    resolver
}

#[fixture]
fn registry() -> ProviderRegistry<()> {
    ProviderRegistry::new(Arc::new(()))
}

fn backend_config<A>(registry: &mut ProviderRegistry<A>, group: &str, name: &str) -> ProviderConfig {
    let instance = registry.get_from(group, name).expect("registered provider");
    instance
        .as_any()
        .downcast_ref::<Backend>()
        .expect("concrete backend")
        .config
        .clone()
}

// ---------------------------------------------------------------------------
// Manifest shapes
// ---------------------------------------------------------------------------

#[rstest]
fn name_shape_registers_under_the_key_group(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({"db": ["sqlite"]})).expect("object");

    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    assert!(registry.contains_in("db", "sqlite"));
    assert!(
        backend_config(&mut registry, "db", "sqlite").is_empty(),
        "shape 1 registers with an empty config"
    );
}

#[rstest]
fn name_config_shape_captures_the_config(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest =
        Manifest::from_value(json!({"db": ["sqlite", {"path": "/tmp/x"}]})).expect("object");

    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    let config = backend_config(&mut registry, "db", "sqlite");
    assert_eq!(config.get("path"), Some(&Value::String("/tmp/x".to_owned())));
}

#[rstest]
fn reference_list_registers_every_entry(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({
        "db": [["sqlite"], ["mysql", {"host": "h"}]],
    }))
    .expect("object");

    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    assert!(registry.contains_in("db", "sqlite"));
    assert!(registry.contains_in("db", "mysql"));
    let config = backend_config(&mut registry, "db", "mysql");
    assert_eq!(config.get("host"), Some(&Value::String("h".to_owned())));
}

#[rstest]
fn config_only_shape_uses_the_key_as_name_and_group(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({"sqlite": {"path": "/tmp/x"}})).expect("object");

    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    assert!(registry.contains_in("sqlite", "sqlite"));
    let config = backend_config(&mut registry, "sqlite", "sqlite");
    assert_eq!(config.get("path"), Some(&Value::String("/tmp/x".to_owned())));
}

#[rstest]
fn empty_reference_list_registers_nothing(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({"db": []})).expect("object");

    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("vacuously clean manifest");

    assert!(registry.is_empty());
}

#[rstest]
fn manifest_key_outranks_the_factory_declared_group(mut registry: ProviderRegistry<()>) {
    struct GroupedFactory;

    impl ProviderFactory<()> for GroupedFactory {
        fn group_name(&self) -> Option<&str> {
            Some("declared")
        }

        fn create(
            &self,
            _application: &(),
            config: &ProviderConfig,
        ) -> Result<SharedProvider, RegistryError> {
            Ok(Arc::new(Backend {
                config: config.clone(),
            }))
        }
    }

    let mut resolver = StaticResolver::new();
    resolver.register("sqlite", Arc::new(GroupedFactory));
    let manifest = Manifest::from_value(json!({"db": ["sqlite"]})).expect("object");

    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    assert!(registry.contains_in("db", "sqlite"));
    assert!(!registry.contains_in("declared", "sqlite"));
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[rstest]
fn resolver_is_asked_for_each_referenced_name(mut registry: ProviderRegistry<()>) {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .withf(|name| name == "sqlite")
        .once()
        .returning(|_| Ok(ModuleExport::Direct(Arc::new(BackendFactory))));

    let manifest = Manifest::from_value(json!({"db": ["sqlite"]})).expect("object");
    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    assert!(registry.contains_in("db", "sqlite"));
}

#[rstest]
fn an_empty_default_export_is_module_not_found(mut registry: ProviderRegistry<()>) {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|_| Ok(ModuleExport::DefaultExport(None)));

    let manifest = Manifest::from_value(json!({"db": ["sqlite"]})).expect("object");
    let err = ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect_err("nothing constructible");

    assert!(matches!(err, RegistryError::ModuleNotFound { ref name } if name == "sqlite"));
}

#[rstest]
fn a_wrapped_default_export_is_unwrapped(mut registry: ProviderRegistry<()>) {
    let mut resolver = MockResolver::new();
    resolver
        .expect_resolve()
        .returning(|_| Ok(ModuleExport::DefaultExport(Some(Arc::new(BackendFactory)))));

    let manifest = Manifest::from_value(json!({"db": ["sqlite"]})).expect("object");
    ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect("clean manifest");

    assert!(registry.contains_in("db", "sqlite"));
}

// ---------------------------------------------------------------------------
// Failure isolation
// ---------------------------------------------------------------------------

#[rstest]
fn without_resume_the_first_failure_aborts_later_keys(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({
        "logger": ["console"],
        "db": ["no-such-backend"],
        "cache": ["mysql"],
    }))
    .expect("object");

    let err = ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect_err("unresolvable entry is fatal");

    assert!(matches!(err, RegistryError::ModuleNotFound { .. }));
    assert!(
        registry.contains_in("logger", "console"),
        "registrations before the failure stand"
    );
    assert!(
        !registry.contains_in("cache", "mysql"),
        "keys after the failure are never processed"
    );
}

#[rstest]
fn with_resume_failures_are_skipped_and_reported(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({
        "logger": ["console"],
        "db": ["no-such-backend"],
        "bad": 42,
        "cache": ["mysql"],
    }))
    .expect("object");

    let mut processor = ManifestProcessor::new(&resolver)
        .with_observer(RecordingObserver::default())
        .resume_on_error(true);
    processor
        .process(&mut registry, &manifest)
        .expect("resume mode never fails");

    assert!(registry.contains_in("logger", "console"));
    assert!(
        registry.contains_in("cache", "mysql"),
        "entries after a skipped failure still register"
    );
    assert!(!registry.contains("no-such-backend"));
}

#[rstest]
fn the_observer_sees_each_skipped_error_in_order(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({
        "db": ["no-such-backend"],
        "bad": 42,
        "logger": ["console"],
    }))
    .expect("object");

    let mut processor = ManifestProcessor::new(&resolver)
        .with_observer(RecordingObserver::default())
        .resume_on_error(true);
    processor
        .process(&mut registry, &manifest)
        .expect("resume mode never fails");

    let ManifestProcessor { observer, .. } = processor;
    assert_eq!(observer.skipped.len(), 2);
    assert!(
        observer.skipped.first().expect("first skip").contains("no-such-backend"),
        "resolution failure reported first"
    );
    assert!(
        observer.skipped.get(1).expect("second skip").contains("bad"),
        "classification failure reported second"
    );
}

#[rstest]
fn classification_failures_name_the_offending_key(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({"db": "not-a-shape"})).expect("object");

    let err = ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect_err("bad shape is fatal");

    assert!(matches!(err, RegistryError::InvalidParameter { ref name, .. } if name == "db"));
}

#[rstest]
fn a_failing_element_mid_list_keeps_earlier_elements(mut registry: ProviderRegistry<()>) {
    let resolver = known_backends();
    let manifest = Manifest::from_value(json!({
        "db": [["sqlite"], ["no-such-backend"], ["mysql"]],
    }))
    .expect("object");

    let err = ManifestProcessor::new(&resolver)
        .process(&mut registry, &manifest)
        .expect_err("unresolvable element is fatal");

    assert!(matches!(err, RegistryError::ModuleNotFound { .. }));
    assert!(registry.contains_in("db", "sqlite"));
    assert!(!registry.contains_in("db", "mysql"));
}

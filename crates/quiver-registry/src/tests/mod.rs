//! Crate-level integration tests.
//!
//! Exercises the full flow the crate is built for: a resolver with
//! compiled-in factories, a declarative manifest, an application bound to a
//! context, and provider lookups with singleton and fresh-instance
//! semantics.

#![expect(clippy::expect_used, reason = "tests use expect for clarity")]

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use crate::application::{Application, ApplicationOptions};
use crate::error::RegistryError;
use crate::manifest::Manifest;
use crate::provider::{Provider, ProviderConfig, ProviderFactory, SharedProvider};
use crate::resolver::StaticResolver;

struct AppConfig {
    name: &'static str,
}

struct Connection {
    url: String,
    app_name: &'static str,
}

impl Provider for Connection {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ConnectionFactory {
    constructions: AtomicUsize,
}

impl ConnectionFactory {
    fn new() -> Self {
        Self {
            constructions: AtomicUsize::new(0),
        }
    }
}

impl ProviderFactory<AppConfig> for ConnectionFactory {
    fn create(
        &self,
        application: &AppConfig,
        config: &ProviderConfig,
    ) -> Result<SharedProvider, RegistryError> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        let url = config
            .get("url")
            .and_then(Value::as_str)
            .unwrap_or("sqlite::memory:")
            .to_owned();
        Ok(Arc::new(Connection {
            url,
            app_name: application.name,
        }))
    }
}

struct NullSink;

impl Provider for NullSink {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct NullSinkFactory;

impl ProviderFactory<AppConfig> for NullSinkFactory {
    fn create(
        &self,
        _application: &AppConfig,
        _config: &ProviderConfig,
    ) -> Result<SharedProvider, RegistryError> {
        Ok(Arc::new(NullSink))
    }
}

fn build_resolver() -> (StaticResolver<AppConfig>, Arc<ConnectionFactory>) {
    let connections = Arc::new(ConnectionFactory::new());
    let mut resolver = StaticResolver::new();
    resolver.register("postgres", connections.clone());
    resolver.register("null-sink", Arc::new(NullSinkFactory));
    (resolver, connections)
}

#[test]
fn end_to_end_manifest_to_singleton() {
    let (resolver, connections) = build_resolver();
    let manifest = Manifest::from_value(json!({
        "db": ["postgres", {"url": "postgres://localhost/app"}],
        "logger": ["null-sink"],
    }))
    .expect("object manifest");

    let mut app = Application::new(
        AppConfig { name: "integration" },
        &resolver,
        &manifest,
        ApplicationOptions::default(),
    )
    .expect("manifest registers cleanly");

    // Registration alone constructs nothing.
    assert_eq!(connections.constructions.load(Ordering::SeqCst), 0);

    let db = app.get("db").expect("group lookup");
    let connection = db
        .as_any()
        .downcast_ref::<Connection>()
        .expect("concrete connection");
    assert_eq!(connection.url, "postgres://localhost/app");
    assert_eq!(connection.app_name, "integration");

    // Repeat lookups reuse the memoized instance.
    let again = app.get("db").expect("group lookup");
    assert!(Arc::ptr_eq(&db, &again));
    assert_eq!(connections.constructions.load(Ordering::SeqCst), 1);
}

#[test]
fn fresh_instances_coexist_with_the_singleton() {
    let (resolver, connections) = build_resolver();
    let manifest =
        Manifest::from_value(json!({"db": ["postgres"]})).expect("object manifest");

    let mut app = Application::new(
        AppConfig { name: "integration" },
        &resolver,
        &manifest,
        ApplicationOptions::default(),
    )
    .expect("manifest registers cleanly");

    let mut override_config = ProviderConfig::new();
    override_config.insert(
        "url".to_owned(),
        Value::String("postgres://replica/app".to_owned()),
    );

    let fresh = app
        .registry_mut()
        .get_new_from("db", "postgres", Some(override_config))
        .expect("fresh instance");
    let replica = fresh
        .as_any()
        .downcast_ref::<Connection>()
        .expect("concrete connection");
    assert_eq!(replica.url, "postgres://replica/app");

    let singleton = app.get("db").expect("singleton exists after get_new");
    assert!(!Arc::ptr_eq(&fresh, &singleton));
    assert_eq!(
        connections.constructions.load(Ordering::SeqCst),
        2,
        "one singleton plus one fresh instance"
    );
}

#[test]
fn partial_registration_survives_a_broken_manifest_under_resume() {
    let (resolver, _connections) = build_resolver();
    let manifest = Manifest::from_value(json!({
        "db": ["postgres"],
        "metrics": ["no-such-module"],
        "logger": ["null-sink"],
    }))
    .expect("object manifest");

    let mut skipped = 0_usize;
    let mut app = Application::with_observer(
        AppConfig { name: "integration" },
        &resolver,
        &manifest,
        ApplicationOptions {
            resume_on_error: true,
        },
        CountSkips(&mut skipped),
    )
    .expect("resume mode tolerates the failure");

    assert!(app.get("db").is_ok());
    assert!(app.get("logger").is_ok());
    let err = app.get("metrics").err().expect("skipped entry never registered");
    assert!(matches!(err, RegistryError::ProviderNotFound { .. }));
    assert_eq!(skipped, 1);
}

struct CountSkips<'a>(&'a mut usize);

impl crate::processor::ManifestObserver for CountSkips<'_> {
    fn entry_skipped(&mut self, _error: &RegistryError) {
        *self.0 += 1;
    }
}

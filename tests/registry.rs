//! Tests for the backend registry cache.

use fluentgate::{
    BackendRegistry, Error, Level, LogEvent, MemorySink, MemoryTransportFactory, Mode, Policy,
    Transport,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn registry(sink: &MemorySink) -> (BackendRegistry, Arc<MemoryTransportFactory>) {
    let factory = Arc::new(MemoryTransportFactory::new(sink.clone()));
    let registry = BackendRegistry::builder()
        .shared_transport_factory(factory.clone())
        .build();
    (registry, factory)
}

#[test]
fn same_name_returns_same_backend() {
    let sink = MemorySink::new();
    let (registry, factory) = registry(&sink);

    let first = registry.resolve("X").unwrap();
    let second = registry.resolve("X").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.created(), 1);
}

#[test]
fn different_names_get_different_backends() {
    let sink = MemorySink::new();
    let (registry, factory) = registry(&sink);

    let x = registry.resolve("X").unwrap();
    let y = registry.resolve("Y").unwrap();
    assert!(!Arc::ptr_eq(&x, &y));
    assert_eq!(x.name(), "X");
    assert_eq!(y.name(), "Y");
    assert_eq!(factory.created(), 2);
    assert_eq!(registry.names(), vec!["X".to_string(), "Y".to_string()]);
    assert_eq!(registry.len(), 2);
}

#[test]
fn concurrent_resolve_constructs_once() {
    let sink = MemorySink::new();
    let (registry, factory) = registry(&sink);
    let backends = std::sync::Mutex::new(Vec::new());

    std::thread::scope(|s| {
        for _ in 0..32 {
            s.spawn(|| {
                let backend = registry.resolve("hot").unwrap();
                backends.lock().unwrap().push(backend);
            });
        }
    });

    assert_eq!(factory.created(), 1);
    let backends = backends.into_inner().unwrap();
    assert_eq!(backends.len(), 32);
    assert!(backends.iter().all(|b| Arc::ptr_eq(b, &backends[0])));
}

#[test]
fn construction_failure_is_isolated() {
    let sink = MemorySink::new();
    let good = sink.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let factory = move |name: &str| -> Result<Box<dyn Transport>, Error> {
        counter.fetch_add(1, Ordering::SeqCst);
        if name == "broken" {
            Err(Error::transport(name, "no route"))
        } else {
            Ok(Box::new(good.transport(name)))
        }
    };
    let registry = BackendRegistry::builder().transport_factory(factory).build();

    let ok = registry.resolve("fine").unwrap();
    match registry.resolve("broken") {
        Err(Error::Construction { name, .. }) => assert_eq!(name, "broken"),
        other => panic!("expected construction failure, got {other:?}"),
    }
    assert!(Arc::ptr_eq(&ok, &registry.resolve("fine").unwrap()));
    assert_eq!(registry.names(), vec!["fine".to_string()]);

    // Nothing cached for the failed name, so the next lookup tries again.
    assert!(registry.resolve("broken").is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn transport_failure_keeps_entry() {
    let sink = MemorySink::new();
    let (registry, factory) = registry(&sink);
    let backend = registry.resolve("X").unwrap();

    sink.set_failing(true);
    assert!(matches!(
        backend.emit(&LogEvent::new(Level::Info, "dropped")),
        Err(Error::Transport { .. })
    ));
    sink.set_failing(false);

    let again = registry.resolve("X").unwrap();
    assert!(Arc::ptr_eq(&backend, &again));
    again.emit(&LogEvent::new(Level::Info, "delivered")).unwrap();
    assert_eq!(sink.len(), 1);
    assert_eq!(factory.created(), 1);
}

#[test]
fn resolver_supplies_policy_per_name() {
    let sink = MemorySink::new();
    let resolver = |name: &str| {
        if name == "quiet" {
            Policy::new(Mode::Inclusive)
        } else {
            Policy::unset()
        }
    };
    let registry = BackendRegistry::builder()
        .policy_resolver(ClosureResolver(resolver))
        .transport_factory(MemoryTransportFactory::new(sink))
        .build();

    assert!(!registry.resolve("quiet").unwrap().is_enabled(Level::Severe));
    assert!(registry.resolve("loud").unwrap().is_enabled(Level::Finest));
}

#[test]
fn names_are_rust_paths_in_tags() {
    let sink = MemorySink::new();
    let (registry, _) = registry(&sink);
    registry
        .resolve("shop::billing")
        .unwrap()
        .emit(&LogEvent::new(Level::Info, "charged"))
        .unwrap();
    assert_eq!(sink.records()[0].tag, "shop.billing.INFO");
    registry.flush().unwrap();
}

struct ClosureResolver<F>(F);

impl<F> fluentgate::PolicyResolver for ClosureResolver<F>
where
    F: Fn(&str) -> Policy + Send + Sync,
{
    fn resolve(&self, name: &str) -> Policy {
        (self.0)(name)
    }
}

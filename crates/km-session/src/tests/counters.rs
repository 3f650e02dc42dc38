use super::{FakeDirectory, FakeProvider, authenticated_identity, mint_token, token_set, url};
use crate::{
    MemoryNavigator, MemoryStore, SessionManager, SessionState, SessionStore, StorageKey,
    TenantDetector, TenantResolver,
};

use std::future::Future;
use std::sync::Arc;

use km_auth::ClaimsDecoder;
use km_config::Config;
use metrics_exporter_prometheus::PrometheusBuilder;

const ACME_ID: &str = "11111111-1111-1111-1111-111111111111";

/// Run `future` to completion with a private recorder and return the rendered counters
fn recorded<T>(future: impl Future<Output = T>) -> (T, String) {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let output = metrics::with_local_recorder(&recorder, || runtime.block_on(future));
    (output, handle.render())
}

fn resolver() -> TenantResolver {
    let store = Arc::new(MemoryStore::new());
    let detector = TenantDetector::new(store.clone(), "tenant");
    TenantResolver::new(store, detector, 100)
}

#[test]
fn given_missing_then_found_slug_when_resolved_then_lookup_outcomes_counted() {
    let resolver = resolver();
    let directory = FakeDirectory::default().with_slug("acme", Ok(ACME_ID));
    let identity = authenticated_identity(Some("acme"), 0);
    let extras = ["globex".to_string()];

    let (result, rendered) = recorded(resolver.resolve(
        &identity,
        &url("http://localhost:5173/"),
        &directory,
        &extras,
    ));

    assert_eq!(result.unwrap().tenant.to_string(), ACME_ID);
    assert!(rendered.contains(r#"km_tenant_lookup_total{outcome="not_found"} 1"#));
    assert!(rendered.contains(r#"km_tenant_lookup_total{outcome="found"} 1"#));
    assert!(!rendered.contains("km_tenant_resolution_total"));
}

#[test]
fn given_nothing_matches_when_resolved_then_unresolved_counted() {
    let resolver = resolver();
    let directory = FakeDirectory::default().with_slug("acme", Err(500));
    let identity = authenticated_identity(Some("acme"), 0);

    let (result, rendered) = recorded(resolver.resolve(
        &identity,
        &url("http://localhost:5173/"),
        &directory,
        &[],
    ));

    assert!(result.is_err());
    assert!(rendered.contains(r#"km_tenant_lookup_total{outcome="error"} 1"#));
    assert!(rendered.contains(r#"km_tenant_resolution_total{outcome="unresolved"} 1"#));
}

#[test]
fn given_expiring_stored_token_when_initialized_then_refresh_success_counted() {
    let fresh = mint_token("alice", Some("acme"), 3600);
    let provider = Arc::new(FakeProvider::oidc().on_refresh(Ok(token_set(fresh, None))));
    let store = Arc::new(MemoryStore::new());
    store
        .set(StorageKey::Token, &mint_token("alice", Some("acme"), 30))
        .unwrap();
    store.set(StorageKey::RefreshToken, "r1").unwrap();
    let navigator = Arc::new(MemoryNavigator::new(url("http://localhost:5173/")));

    let (state, rendered) = recorded(async {
        let manager = SessionManager::new(
            &Config::default(),
            provider.clone(),
            ClaimsDecoder::with_hs256(b"test-secret-key-at-least-32-bytes"),
            store.clone(),
            navigator.clone(),
        );
        let state = manager.initialize().await;
        manager.shutdown();
        state
    });

    assert_eq!(state, SessionState::Authenticated);
    assert!(rendered.contains(r#"km_token_refresh_total{outcome="success"} 1"#));
}

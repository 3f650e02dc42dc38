//! End-to-end session and tenant flows against mock identity and API servers

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{EncodingKey, Header, encode};
use km_auth::{ClaimsDecoder, IdentityProvider, OidcProvider};
use km_client::ApiClient;
use km_config::Config;
use km_session::{
    AppContext, MemoryNavigator, MemoryStore, Navigator, ResolutionSource, SessionError,
    SessionState, SessionStore, StorageKey,
};
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

const ACME_ID: &str = "11111111-1111-1111-1111-111111111111";
const INFO_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const TOKEN_PATH: &str = "/realms/kymatic/protocol/openid-connect/token";

struct Setup {
    idp: MockServer,
    api: MockServer,
    app: AppContext,
    store: Arc<MemoryStore>,
    navigator: Arc<MemoryNavigator>,
}

fn token(sub: &str, tenant: Option<&str>, expires_in: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "sub": sub,
        "email": format!("{sub}@acme.test"),
        "exp": now + expires_in,
        "iat": now,
        "realm_access": { "roles": ["user"] },
        "resource_access": { "react-client": { "roles": ["tenant-admin"] } }
    });
    if let Some(tenant) = tenant {
        claims["tenant_id"] = json!(tenant);
    }
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"integration-secret"),
    )
    .unwrap()
}

async fn setup() -> Setup {
    let idp = MockServer::start().await;
    let api = MockServer::start().await;

    let mut config = Config::default();
    config.identity.base_url = idp.uri();
    config.api.base_url = api.uri();

    let provider: Arc<dyn IdentityProvider> =
        Arc::new(OidcProvider::new(&config.identity, Duration::from_secs(5)).unwrap());
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(MemoryNavigator::new(
        Url::parse("http://localhost:5173/").unwrap(),
    ));
    let app = AppContext::new(
        &config,
        provider,
        ClaimsDecoder::unverified(),
        store.clone(),
        navigator.clone(),
        ApiClient::new(&api.uri()),
    );

    Setup {
        idp,
        api,
        app,
        store,
        navigator,
    }
}

async fn mount_startup_fetches(api: &MockServer, info_tenant: Option<&str>) {
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": "ada",
            "username": "ada",
            "email": "ada@acme.test",
            "tenantIdFromJwt": "acme"
        })))
        .mount(api)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tenantId": info_tenant,
            "status": "ACTIVE",
            "active": true
        })))
        .mount(api)
        .await;
}

#[tokio::test]
async fn test_login_callback_and_slug_resolution() {
    let s = setup().await;

    let first = s.app.bootstrap().await;
    assert!(matches!(first.state, SessionState::RedirectPending { .. }));
    let login_url = s.navigator.last_redirect().unwrap();
    assert_eq!(login_url.path(), "/realms/kymatic/protocol/openid-connect/auth");
    let state = login_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(
        login_url
            .query_pairs()
            .any(|(k, v)| k == "code_challenge_method" && v == "S256")
    );

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code-1"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token("ada", Some("acme"), 300),
            "refresh_token": "refresh-1",
            "expires_in": 300,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&s.idp)
        .await;
    mount_startup_fetches(&s.api, None).await;
    Mock::given(method("GET"))
        .and(path("/api/tenants/slug/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tenantId": ACME_ID,
            "tenantName": "Acme Corp",
            "slug": "acme",
            "status": "ACTIVE"
        })))
        .expect(1)
        .mount(&s.api)
        .await;

    s.navigator.set_current(
        Url::parse(&format!(
            "http://localhost:5173/?code=auth-code-1&state={state}"
        ))
        .unwrap(),
    );
    let report = s.app.bootstrap().await;

    assert_eq!(report.state, SessionState::Authenticated);
    assert_eq!(report.error, None);
    let tenant = report.tenant.unwrap();
    assert_eq!(tenant.tenant.to_string(), ACME_ID);
    assert_eq!(tenant.via, ResolutionSource::SlugLookup("acme".to_string()));
    assert_eq!(s.navigator.current_url().as_str(), "http://localhost:5173/");
    assert_eq!(
        s.store.get(StorageKey::TenantId).unwrap().as_deref(),
        Some(ACME_ID)
    );
}

#[tokio::test]
async fn test_authoritative_tenant_info_skips_slug_lookup() {
    let s = setup().await;
    s.store
        .set(StorageKey::Token, &token("ada", Some("acme"), 3600))
        .unwrap();
    mount_startup_fetches(&s.api, Some(INFO_ID)).await;
    Mock::given(method("GET"))
        .and(path("/api/tenants/slug/acme"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&s.api)
        .await;

    let report = s.app.bootstrap().await;

    let tenant = report.tenant.unwrap();
    assert_eq!(tenant.tenant.to_string(), INFO_ID);
    assert_eq!(tenant.via, ResolutionSource::Cached);
}

#[tokio::test]
async fn test_scoped_client_sends_resolved_tenant_header() {
    let s = setup().await;
    s.store
        .set(StorageKey::Token, &token("ada", Some(INFO_ID), 3600))
        .unwrap();
    s.app.session().initialize().await;

    Mock::given(method("GET"))
        .and(path("/api/tenant/current"))
        .and(header("X-Tenant-ID", INFO_ID))
        .respond_with(ResponseTemplate::new(200).set_body_string(INFO_ID))
        .expect(1)
        .mount(&s.api)
        .await;

    let client = s.app.scoped_client().await.unwrap();
    let current = client.current_tenant().await.unwrap();

    assert_eq!(client.tenant(), Some(INFO_ID));
    assert_eq!(current, INFO_ID);
}

#[tokio::test]
async fn test_unresolved_tenant_is_reported_inline() {
    let s = setup().await;
    s.store
        .set(StorageKey::Token, &token("ada", Some("acme"), 3600))
        .unwrap();
    mount_startup_fetches(&s.api, None).await;
    Mock::given(method("GET"))
        .and(path("/api/tenants/slug/acme"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Tenant not found"
        })))
        .mount(&s.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tenants"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&s.api)
        .await;

    let report = s.app.bootstrap().await;

    assert_eq!(report.state, SessionState::Authenticated);
    assert!(report.tenant.is_none());
    let error = report.error.unwrap();
    assert!(error.contains("Tried slugs: acme."));
    assert!(s.app.identity().authenticated);
}

#[tokio::test]
async fn test_expiring_stored_token_refreshed_against_token_endpoint() {
    let s = setup().await;
    s.store
        .set(StorageKey::Token, &token("ada", None, 20))
        .unwrap();
    s.store.set(StorageKey::RefreshToken, "refresh-1").unwrap();
    let fresh = token("ada", None, 3600);

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": fresh,
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&s.idp)
        .await;

    let state = s.app.session().initialize().await;

    assert_eq!(state, SessionState::Authenticated);
    assert_eq!(s.app.identity().token.as_deref(), Some(fresh.as_str()));
    assert_eq!(
        s.store.get(StorageKey::RefreshToken).unwrap().as_deref(),
        Some("refresh-1")
    );
}

#[tokio::test]
async fn test_logout_clears_session_and_visits_end_session() {
    let s = setup().await;
    s.store
        .set(StorageKey::Token, &token("ada", Some(INFO_ID), 3600))
        .unwrap();
    s.app.session().initialize().await;
    s.app.resolve(&[]).await.unwrap();

    s.app.logout().await;

    assert!(s.store.is_empty());
    assert_eq!(s.app.identity().epoch, 1);
    let logout_url = s.navigator.last_redirect().unwrap();
    assert_eq!(
        logout_url.path(),
        "/realms/kymatic/protocol/openid-connect/logout"
    );
    let err = s.app.scoped_client().await.unwrap_err();
    assert!(matches!(err, SessionError::NotAuthenticated { .. }));
}

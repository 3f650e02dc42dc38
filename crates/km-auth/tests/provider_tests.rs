//! Integration tests for the identity providers using wiremock mock servers

use km_auth::{AuthError, IdentityProvider, LocalAuthProvider, OidcProvider, PendingLogin};
use km_config::IdentityConfig;

use std::time::Duration;

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path},
};

const TOKEN_PATH: &str = "/realms/kymatic/protocol/openid-connect/token";

fn oidc_provider(base_url: &str) -> OidcProvider {
    let config = IdentityConfig {
        base_url: base_url.to_string(),
        ..IdentityConfig::default()
    };
    OidcProvider::new(&config, Duration::from_secs(5)).unwrap()
}

fn local_provider(base_url: &str, login_page: Option<&str>) -> LocalAuthProvider {
    LocalAuthProvider::new(base_url, "react-client", login_page, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_oidc_login_url_carries_pkce_parameters() {
    let provider = oidc_provider("http://localhost:8085/");
    let pending = PendingLogin::new("http://localhost:5173/");

    let url = provider.login_url(&pending).unwrap().unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let get = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    assert_eq!(
        url.path(),
        "/realms/kymatic/protocol/openid-connect/auth"
    );
    assert_eq!(get("client_id").as_deref(), Some("react-client"));
    assert_eq!(get("response_type").as_deref(), Some("code"));
    assert_eq!(get("state"), Some(pending.state.clone()));
    assert_eq!(get("code_challenge_method").as_deref(), Some("S256"));
    assert_eq!(
        get("code_challenge"),
        Some(pending.challenge().challenge().to_string())
    );
}

#[tokio::test]
async fn test_oidc_logout_url_points_at_end_session_endpoint() {
    let provider = oidc_provider("http://localhost:8085");

    let url = provider.logout_url().unwrap();

    assert_eq!(url.path(), "/realms/kymatic/protocol/openid-connect/logout");
    assert!(url.query().unwrap().contains("client_id=react-client"));
    assert!(url.query().unwrap().contains("post_logout_redirect_uri="));
}

#[tokio::test]
async fn test_oidc_exchange_code_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("code_verifier=the-verifier"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "expires_in": 300,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = oidc_provider(&mock_server.uri());
    let tokens = provider
        .exchange_code("the-code", "the-verifier")
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(tokens.expires_in, 300);
}

#[tokio::test]
async fn test_oidc_refresh_rejected_surfaces_error_description() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token is not active"
        })))
        .mount(&mock_server)
        .await;

    let provider = oidc_provider(&mock_server.uri());
    let result = provider.refresh("stale").await;

    match result {
        Err(AuthError::Rejected {
            status, message, ..
        }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Token is not active");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_local_password_login_sends_tenant_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("X-Tenant-ID", "acme"))
        .and(body_json(json!({
            "email": "ada@acme.test",
            "password": "secret",
            "tenantId": "acme"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = local_provider(&mock_server.uri(), None);
    let tokens = provider
        .password_login("ada@acme.test", "secret", Some("acme"))
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "access-1");
    assert_eq!(tokens.expires_in, 3600);
}

#[tokio::test]
async fn test_local_password_login_failure_uses_error_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&mock_server)
        .await;

    let provider = local_provider(&mock_server.uri(), None);
    let err = provider
        .password_login("ada@acme.test", "wrong", None)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Authentication error: Invalid credentials");
}

#[tokio::test]
async fn test_local_refresh_posts_refresh_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "expires_in": 900
        })))
        .mount(&mock_server)
        .await;

    let provider = local_provider(&mock_server.uri(), None);
    let tokens = provider.refresh("refresh-1").await.unwrap();

    assert_eq!(tokens.access_token, "access-2");
    assert_eq!(tokens.refresh_token, None);
}

#[tokio::test]
async fn test_local_provider_has_no_code_exchange_and_optional_login_page() {
    let without_page = local_provider("http://localhost:8083", None);
    let with_page = local_provider("http://localhost:8083", Some("http://localhost:5173/login"));
    let pending = PendingLogin::new("http://localhost:5173/");

    assert!(without_page.login_url(&pending).unwrap().is_none());
    assert_eq!(
        with_page.login_url(&pending).unwrap().unwrap().as_str(),
        "http://localhost:5173/login"
    );
    assert!(matches!(
        without_page.exchange_code("c", "v").await,
        Err(AuthError::Unsupported { .. })
    ));
}

mod counters;
mod property_tests;
mod tenant_id;

use crate::{IdentityContext, SessionState, TenantDirectory};

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use jsonwebtoken::{EncodingKey, Header, encode};
use km_auth::{AuthError, Claims, IdentityProvider, PendingLogin, TokenSet};
use km_client::{ClientError, ClientResult, TenantRecord};
use serde_json::json;
use url::Url;

static TOKEN_SERIAL: AtomicUsize = AtomicUsize::new(0);

/// HS256 token for `sub`, expiring `expires_in` seconds from now
pub(crate) fn mint_token(sub: &str, tenant: Option<&str>, expires_in: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "sub": sub,
        "preferred_username": sub,
        "exp": now + expires_in,
        "iat": now,
        "jti": TOKEN_SERIAL.fetch_add(1, Ordering::SeqCst),
        "realm_access": { "roles": ["user"] },
        "resource_access": { "react-client": { "roles": ["tenant-admin"] } }
    });
    if let Some(tenant) = tenant {
        claims["tenant_id"] = json!(tenant);
    }

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret-key-at-least-32-bytes"),
    )
    .unwrap()
}

pub(crate) fn token_set(access_token: String, refresh_token: Option<&str>) -> TokenSet {
    TokenSet {
        access_token,
        refresh_token: refresh_token.map(String::from),
        expires_in: 300,
        token_type: "Bearer".to_string(),
    }
}

pub(crate) fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

pub(crate) fn authenticated_identity(tenant_claim: Option<&str>, epoch: u64) -> IdentityContext {
    let token = mint_token("user-123", tenant_claim, 3600);
    let claims = km_auth::ClaimsDecoder::unverified().decode(&token).unwrap();

    let mut identity = IdentityContext::new(SessionState::Authenticated, epoch);
    identity.token = Some(token);
    identity.tenant = claims.tenant_claim().map(String::from);
    identity.claims = Some(claims);
    identity
}

pub(crate) fn claims_of(identity: &IdentityContext) -> &Claims {
    identity.claims.as_ref().unwrap()
}

/// Scripted identity provider
pub(crate) struct FakeProvider {
    pkce: bool,
    login_page: Option<Url>,
    exchanges: Mutex<VecDeque<Result<TokenSet, u16>>>,
    refreshes: Mutex<VecDeque<Result<TokenSet, u16>>>,
    passwords: Mutex<VecDeque<Result<TokenSet, u16>>>,
    pub(crate) exchange_calls: AtomicUsize,
    pub(crate) refresh_calls: AtomicUsize,
}

impl FakeProvider {
    pub(crate) fn oidc() -> Self {
        Self {
            pkce: true,
            login_page: Some(url("https://idp.test/realms/kymatic/protocol/openid-connect/auth")),
            exchanges: Mutex::new(VecDeque::new()),
            refreshes: Mutex::new(VecDeque::new()),
            passwords: Mutex::new(VecDeque::new()),
            exchange_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn local_without_login_page() -> Self {
        Self {
            pkce: false,
            login_page: None,
            ..Self::oidc()
        }
    }

    pub(crate) fn on_exchange(self, result: Result<TokenSet, u16>) -> Self {
        self.exchanges.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn on_refresh(self, result: Result<TokenSet, u16>) -> Self {
        self.refreshes.lock().unwrap().push_back(result);
        self
    }

    pub(crate) fn on_password(self, result: Result<TokenSet, u16>) -> Self {
        self.passwords.lock().unwrap().push_back(result);
        self
    }

    fn next(queue: &Mutex<VecDeque<Result<TokenSet, u16>>>) -> km_auth::Result<TokenSet> {
        match queue.lock().unwrap().pop_front() {
            Some(Ok(tokens)) => Ok(tokens),
            Some(Err(status)) => Err(AuthError::rejected(status, "Token is not active")),
            None => Err(AuthError::rejected(500, "no scripted response")),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn client_id(&self) -> &str {
        "react-client"
    }

    fn uses_pkce(&self) -> bool {
        self.pkce
    }

    fn login_url(&self, pending: &PendingLogin) -> km_auth::Result<Option<Url>> {
        Ok(self.login_page.clone().map(|mut page| {
            if self.pkce {
                page.query_pairs_mut().append_pair("state", &pending.state);
            }
            page
        }))
    }

    fn logout_url(&self) -> Option<Url> {
        self.pkce
            .then(|| url("https://idp.test/realms/kymatic/protocol/openid-connect/logout"))
    }

    async fn exchange_code(&self, _code: &str, _verifier: &str) -> km_auth::Result<TokenSet> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.exchanges)
    }

    async fn refresh(&self, _refresh_token: &str) -> km_auth::Result<TokenSet> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.refreshes)
    }

    async fn password_login(
        &self,
        _email: &str,
        _password: &str,
        _tenant: Option<&str>,
    ) -> km_auth::Result<TokenSet> {
        Self::next(&self.passwords)
    }
}

/// Tenant backend with canned slug lookups; records every call
#[derive(Default)]
pub(crate) struct FakeDirectory {
    slugs: HashMap<String, Result<String, u16>>,
    listing: Option<Vec<TenantRecord>>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub(crate) fn with_slug(mut self, slug: &str, result: Result<&str, u16>) -> Self {
        self.slugs
            .insert(slug.to_string(), result.map(String::from));
        self
    }

    pub(crate) fn with_listing(mut self, tenants: &[(&str, &str)]) -> Self {
        self.listing = Some(tenants.iter().map(|(id, slug)| record(id, slug)).collect());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub(crate) fn record(id: &str, slug: &str) -> TenantRecord {
    TenantRecord {
        tenant_id: id.to_string(),
        tenant_name: slug.to_uppercase(),
        slug: slug.to_string(),
        status: "ACTIVE".to_string(),
        database_name: None,
        subscription_tier: None,
        created_at: None,
        updated_at: None,
    }
}

#[async_trait]
impl TenantDirectory for FakeDirectory {
    async fn find_by_slug(&self, slug: &str) -> ClientResult<TenantRecord> {
        self.calls.lock().unwrap().push(format!("slug:{slug}"));
        match self.slugs.get(slug) {
            Some(Ok(id)) => Ok(record(id, slug)),
            Some(Err(status)) => Err(ClientError::api_error(*status, "lookup failed")),
            None => Err(ClientError::api_error(404, "Tenant not found")),
        }
    }

    async fn list(&self, page: u32, size: u32) -> ClientResult<Vec<TenantRecord>> {
        self.calls.lock().unwrap().push(format!("list:{page}:{size}"));
        match self.listing {
            Some(ref tenants) => Ok(tenants.clone()),
            None => Err(ClientError::api_error(403, "Forbidden")),
        }
    }
}

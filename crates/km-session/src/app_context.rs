use crate::{
    FileStore, IdentityContext, Navigator, ResolvedTenant, SessionError, SessionManager,
    SessionResult, SessionState, SessionStore, TenantDetector, TenantResolver,
};

use std::sync::Arc;

use km_auth::{ClaimsDecoder, IdentityProvider, build_decoder, build_provider};
use km_client::{ApiClient, TenantCurrentInfo, UserInfo};
use km_config::Config;
use log::{info, warn};
use serde::Serialize;

/// Outcome of [`AppContext::bootstrap`]
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_info: Option<TenantCurrentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<ResolvedTenant>,
    /// Inline tenant or backend error; the session itself is fine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Application root: owns and wires the store, navigator, API client,
/// session manager and tenant resolver.
pub struct AppContext {
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    api: ApiClient,
    session: Arc<SessionManager>,
    resolver: TenantResolver,
}

impl AppContext {
    /// Build the context from configuration with the file-backed store
    pub fn from_config(config: &Config, navigator: Arc<dyn Navigator>) -> SessionResult<Self> {
        let storage_path = config
            .storage_path()
            .map_err(|e| SessionError::configuration(e.to_string()))?;
        let store: Arc<dyn SessionStore> = Arc::new(FileStore::new(storage_path));

        let provider = build_provider(config)?;
        let decoder = build_decoder(config)?;
        let api = ApiClient::with_timeout(&config.api.base_url, config.api.timeout())?;

        Ok(Self::new(config, provider, decoder, store, navigator, api))
    }

    pub fn new(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        decoder: ClaimsDecoder,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        api: ApiClient,
    ) -> Self {
        let session = SessionManager::new(
            config,
            provider,
            decoder,
            Arc::clone(&store),
            Arc::clone(&navigator),
        );
        let detector = TenantDetector::new(Arc::clone(&store), config.tenant.query_param.clone());
        let resolver = TenantResolver::new(
            Arc::clone(&store),
            detector,
            config.tenant.list_page_size,
        );

        Self {
            store,
            navigator,
            api,
            session,
            resolver,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn resolver(&self) -> &TenantResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Backend client with no credentials attached
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn identity(&self) -> IdentityContext {
        self.session.context()
    }

    /// Initialize the session, then (when authenticated) fetch `/api/me` and
    /// `/api/tenant/info` concurrently, prime the resolver and resolve.
    pub async fn bootstrap(&self) -> BootstrapReport {
        let state = self.session.initialize().await;
        let mut report = BootstrapReport {
            state: state.clone(),
            user: None,
            tenant_info: None,
            tenant: None,
            error: None,
        };
        if !state.is_authenticated() {
            return report;
        }

        let identity = self.session.context();
        let client = match self.authenticated_client(&identity) {
            Ok(client) => client,
            Err(e) => {
                report.error = Some(e.user_message());
                return report;
            }
        };

        let (user, tenant_info) = tokio::join!(client.current_user(), client.tenant_info());
        match (user, tenant_info) {
            (Ok(user), Ok(tenant_info)) => {
                self.resolver.prime(
                    identity.epoch,
                    Some(user.clone()),
                    Some(tenant_info.clone()),
                );
                report.user = Some(user);
                report.tenant_info = Some(tenant_info);
            }
            (user, tenant_info) => {
                let error = user
                    .err()
                    .or(tenant_info.err())
                    .map(|e| e.user_message())
                    .unwrap_or_else(|| "Failed to fetch data from tenant service".to_string());
                warn!("Startup fetch failed: {}", error);
                report.error = Some(error);
                return report;
            }
        }

        match self.resolve(&[]).await {
            Ok(resolved) => report.tenant = Some(resolved),
            Err(e) => {
                warn!("Failed to resolve tenant: {}", e);
                report.error = Some(e.user_message());
            }
        }

        report
    }

    /// Resolve the tenant for the current identity
    pub async fn resolve(&self, extras: &[String]) -> SessionResult<ResolvedTenant> {
        let identity = self.session.context();
        let client = self.authenticated_client(&identity)?;

        Ok(self
            .resolver
            .resolve(&identity, &self.navigator.current_url(), &client, extras)
            .await?)
    }

    /// Client carrying both the bearer token and the resolved `X-Tenant-ID`
    pub async fn scoped_client(&self) -> SessionResult<ApiClient> {
        let identity = self.session.context();
        let client = self.authenticated_client(&identity)?;

        let tenant = self
            .resolver
            .resolve_and_validate(&identity, &self.navigator.current_url(), &client)
            .await?;

        Ok(client.with_tenant(tenant.to_string()))
    }

    /// Client carrying the bearer token and, when one is detectable, the
    /// detected tenant header
    pub fn authenticated_client(&self, identity: &IdentityContext) -> SessionResult<ApiClient> {
        let token = match identity.token {
            Some(ref token) if identity.authenticated => token.clone(),
            _ => return Err(SessionError::not_authenticated()),
        };

        let client = self.api.clone().with_token(token);
        Ok(match self.session.detected_tenant() {
            Some(tenant) => client.with_tenant(tenant),
            None => client,
        })
    }

    /// Explicit tenant switch
    pub fn switch_tenant(&self, value: &str) -> SessionResult<()> {
        Ok(self.resolver.switch_tenant(value)?)
    }

    /// Log out and forget the resolved tenant
    pub async fn logout(&self) {
        self.session.logout().await;
        self.resolver.invalidate();
        info!("Session cleared");
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.session.shutdown();
    }
}

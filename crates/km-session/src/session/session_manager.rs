use crate::session::init_guard::InitGuard;
use crate::session::refresh;
use crate::{
    IdentityContext, Navigator, SessionResult, SessionState, SessionStore, StorageKey,
    StoreError, TenantDetector,
};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use km_auth::{
    AuthCallback, AuthError, ClaimsDecoder, Credential, IdentityProvider, PendingLogin,
    clean_callback_url,
};
use km_config::Config;
use log::{debug, info, warn};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;
use url::Url;

/// Owns the authentication lifecycle.
///
/// Consumers read the published [`IdentityContext`] (see [`subscribe`]) and
/// never touch the credential directly.
///
/// [`subscribe`]: SessionManager::subscribe
pub struct SessionManager {
    client_id: String,
    redirect_uri: String,
    refresh_interval: Duration,
    min_validity: Duration,
    provider: Arc<dyn IdentityProvider>,
    decoder: ClaimsDecoder,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    detector: TenantDetector,
    credential: AsyncMutex<Option<Credential>>,
    context_tx: watch::Sender<IdentityContext>,
    initializing: AtomicBool,
    callback_processed: AtomicBool,
    epoch: AtomicU64,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(
        config: &Config,
        provider: Arc<dyn IdentityProvider>,
        decoder: ClaimsDecoder,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let detector = TenantDetector::new(Arc::clone(&store), config.tenant.query_param.clone());
        let (context_tx, _) = watch::channel(IdentityContext::new(SessionState::Uninitialized, 0));

        Arc::new(Self {
            client_id: provider.client_id().to_string(),
            redirect_uri: config.identity.redirect_uri.clone(),
            refresh_interval: config.session.refresh_interval(),
            min_validity: config.session.min_validity(),
            provider,
            decoder,
            store,
            navigator,
            detector,
            credential: AsyncMutex::new(None),
            context_tx,
            initializing: AtomicBool::new(false),
            callback_processed: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            refresh_task: Mutex::new(None),
        })
    }

    // =========================================================================
    // Read side
    // =========================================================================

    pub fn context(&self) -> IdentityContext {
        self.context_tx.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.context_tx.borrow().state.clone()
    }

    /// Receives every published context change
    pub fn subscribe(&self) -> watch::Receiver<IdentityContext> {
        self.context_tx.subscribe()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Realm role or role on the configured client; false when signed out
    pub fn has_role(&self, role: &str) -> bool {
        self.context_tx.borrow().has_role(role, &self.client_id)
    }

    /// Tenant named by the current URL, the persisted override, or the subdomain
    pub fn detected_tenant(&self) -> Option<String> {
        self.detector.detect(&self.navigator.current_url())
    }

    pub fn is_refresh_scheduled(&self) -> bool {
        self.refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Establish a credential: from a callback, from storage, by refresh,
    /// or by redirecting to the identity provider.
    ///
    /// Returns the resulting state. Concurrent calls return immediately
    /// with the current state.
    pub async fn initialize(self: &Arc<Self>) -> SessionState {
        let Some(_guard) = InitGuard::acquire(&self.initializing) else {
            debug!("Session initialization already in progress");
            return self.state();
        };

        if self.state().is_authenticated() {
            return SessionState::Authenticated;
        }

        self.publish(SessionState::Initializing, None, None);

        let url = self.navigator.current_url();
        let detected = self.detector.detect(&url);

        if let Some(callback) = AuthCallback::from_url(&url) {
            if self.callback_processed.swap(true, Ordering::AcqRel) {
                debug!("Authorization code already consumed; ignoring callback parameters");
                self.navigator.replace_url(&clean_callback_url(&url));
            } else {
                return self.process_callback(callback, &url, detected).await;
            }
        }

        self.restore_or_login(detected).await
    }

    /// Clear the error and initialize again
    pub async fn retry(self: &Arc<Self>) -> SessionState {
        info!("Retrying session initialization");
        self.publish(SessionState::Uninitialized, None, None);
        self.initialize().await
    }

    /// Hand control to the identity provider's login page
    pub fn login(&self) -> SessionState {
        let pending = PendingLogin::new(self.redirect_uri.clone());

        let url = match self.provider.login_url(&pending) {
            Ok(Some(url)) => url,
            Ok(None) => {
                return self.fail(
                    "No login page is configured for local sign-in. Use password login instead.",
                );
            }
            Err(e) => return self.fail(e.user_message()),
        };

        if self.provider.uses_pkce() {
            let saved = serde_json::to_string(&pending)
                .map_err(StoreError::from)
                .and_then(|json| self.store.set(StorageKey::PendingLogin, &json));
            if let Err(e) = saved {
                warn!("Failed to persist pending login: {}", e);
                return self.fail(e.recovery_hint());
            }
        }

        let state = SessionState::RedirectPending { url: url.clone() };
        self.publish(state.clone(), None, None);
        self.navigator.redirect(&url);
        state
    }

    /// Credential login without a redirect (local sign-in)
    pub async fn login_with_password(
        self: &Arc<Self>,
        email: &str,
        password: &str,
    ) -> SessionResult<IdentityContext> {
        let detected = self.detected_tenant();

        let credential = match self
            .provider
            .password_login(email, password, detected.as_deref())
            .await
            .and_then(|tokens| Credential::from_token_set(tokens, &self.decoder, None))
        {
            Ok(credential) => credential,
            Err(e) => {
                self.fail(e.user_message());
                return Err(e.into());
            }
        };

        self.establish(credential, detected).await;
        Ok(self.context())
    }

    /// Clear the credential and every persisted session key, then visit the
    /// provider's end-session page when it has one.
    pub async fn logout(&self) {
        self.stop_refresh_timer();
        *self.credential.lock().await = None;

        if let Err(e) = self.store.remove(&StorageKey::ALL) {
            warn!("Failed to clear session store on logout: {}", e);
        }

        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        info!("Logged out (epoch {})", epoch);
        self.publish(SessionState::LoggedOut, None, None);

        if let Some(url) = self.provider.logout_url() {
            self.navigator.redirect(&url);
        }
    }

    /// Refresh now if the credential is inside the validity window.
    ///
    /// Returns whether a refresh happened. A failed refresh forces
    /// re-authentication before the error is returned.
    pub async fn ensure_fresh(self: &Arc<Self>) -> SessionResult<bool> {
        self.refresh_if_needed().await
    }

    /// Stop the refresh timer
    pub fn shutdown(&self) {
        self.stop_refresh_timer();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn process_callback(
        self: &Arc<Self>,
        callback: AuthCallback,
        url: &Url,
        detected: Option<String>,
    ) -> SessionState {
        self.publish(SessionState::ProcessingCallback, None, None);
        let clean = clean_callback_url(url);

        if let Some(message) = callback.error_message() {
            self.discard_pending_login();
            self.navigator.replace_url(&clean);
            return self.fail(format!("Authentication error: {message}"));
        }

        match self.exchange_callback(&callback).await {
            Ok(credential) => {
                self.discard_pending_login();
                self.navigator.replace_url(&clean);
                info!("Authorization code exchanged for {}", credential.claims.display_name());
                self.establish(credential, detected).await;
                SessionState::Authenticated
            }
            Err(e) => {
                warn!("Callback processing failed: {}", e);
                self.fail(e.user_message())
            }
        }
    }

    async fn exchange_callback(&self, callback: &AuthCallback) -> SessionResult<Credential> {
        let code = callback
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_callback("missing authorization code"))?;

        let code_verifier = match self.load_pending_login() {
            Some(pending) => {
                if callback.state.as_deref() != Some(pending.state.as_str()) {
                    return Err(
                        AuthError::invalid_callback("state does not match the login request")
                            .into(),
                    );
                }
                pending.code_verifier
            }
            None if self.provider.uses_pkce() => {
                return Err(
                    AuthError::invalid_callback("no login is in progress for this callback").into(),
                );
            }
            None => String::new(),
        };

        let tokens = self.provider.exchange_code(code, &code_verifier).await?;
        Ok(Credential::from_token_set(tokens, &self.decoder, None)?)
    }

    async fn restore_or_login(self: &Arc<Self>, detected: Option<String>) -> SessionState {
        let refresh_token = self.read_key(StorageKey::RefreshToken);

        if let Some(token) = self.read_key(StorageKey::Token) {
            match Credential::from_stored(token, refresh_token.clone(), &self.decoder) {
                Ok(credential) if !credential.expires_within(self.min_validity, Utc::now()) => {
                    info!("Restored session for {}", credential.claims.display_name());
                    self.establish(credential, detected).await;
                    return SessionState::Authenticated;
                }
                Ok(_) => debug!("Stored token is expiring; attempting refresh"),
                Err(e) => warn!("Discarding unreadable stored token: {}", e),
            }
        }

        if let Some(refresh_token) = refresh_token {
            match self.refresh_with(&refresh_token).await {
                Ok(credential) => {
                    metrics::counter!("km_token_refresh_total", "outcome" => "success")
                        .increment(1);
                    self.establish(credential, detected).await;
                    return SessionState::Authenticated;
                }
                Err(e) => {
                    metrics::counter!("km_token_refresh_total", "outcome" => "failure")
                        .increment(1);
                    warn!("Stored refresh token rejected: {}", e);
                }
            }
        }

        self.clear_credential_keys();
        self.login()
    }

    async fn establish(self: &Arc<Self>, credential: Credential, detected: Option<String>) {
        self.persist_credential(&credential);
        self.persist_tenant_candidate(&credential, detected.as_deref());

        {
            let mut current = self.credential.lock().await;
            self.publish(SessionState::Authenticated, Some(&credential), detected.as_deref());
            *current = Some(credential);
        }

        self.start_refresh_timer();
    }

    async fn refresh_with(&self, refresh_token: &str) -> SessionResult<Credential> {
        let tokens = self.provider.refresh(refresh_token).await?;
        Ok(Credential::from_token_set(
            tokens,
            &self.decoder,
            Some(refresh_token.to_string()),
        )?)
    }

    pub(crate) async fn refresh_if_needed(self: &Arc<Self>) -> SessionResult<bool> {
        if self.initializing.load(Ordering::Acquire) {
            debug!("Initialization in progress; skipping token refresh");
            metrics::counter!("km_token_refresh_total", "outcome" => "skipped").increment(1);
            return Ok(false);
        }

        let mut current = self.credential.lock().await;
        let Some(credential) = current.as_ref() else {
            return Ok(false);
        };
        if !credential.expires_within(self.min_validity, Utc::now()) {
            return Ok(false);
        }

        let refreshed = match credential.refresh_token.clone() {
            Some(refresh_token) => self.refresh_with(&refresh_token).await,
            None => Err(AuthError::invalid_token("no refresh token available").into()),
        };

        match refreshed {
            Ok(credential) => {
                let detected = self.detected_tenant();
                self.persist_credential(&credential);
                self.persist_tenant_candidate(&credential, detected.as_deref());
                self.publish(SessionState::Authenticated, Some(&credential), detected.as_deref());
                *current = Some(credential);

                metrics::counter!("km_token_refresh_total", "outcome" => "success").increment(1);
                info!("Token refreshed");
                Ok(true)
            }
            Err(e) => {
                *current = None;
                drop(current);

                metrics::counter!("km_token_refresh_total", "outcome" => "failure").increment(1);
                warn!("Token refresh failed, forcing re-authentication: {}", e);

                self.clear_credential_keys();
                self.login();
                Err(e)
            }
        }
    }

    fn start_refresh_timer(self: &Arc<Self>) {
        let handle = tokio::spawn(refresh::run(Arc::downgrade(self), self.refresh_interval));

        let previous = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn stop_refresh_timer(&self) {
        let task = self
            .refresh_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    fn publish(
        &self,
        state: SessionState,
        credential: Option<&Credential>,
        detected: Option<&str>,
    ) {
        let mut context = IdentityContext::new(state, self.epoch());

        if let Some(credential) = credential {
            context.token = Some(credential.access_token.clone());
            context.tenant = credential
                .claims
                .tenant_claim()
                .or(detected)
                .map(String::from);
            context.claims = Some(credential.claims.clone());
        }

        self.context_tx.send_replace(context);
    }

    fn fail(&self, message: impl Into<String>) -> SessionState {
        let state = SessionState::Error {
            message: message.into(),
        };
        self.publish(state.clone(), None, None);
        state
    }

    fn read_key(&self, key: StorageKey) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Failed to read '{}' from session store: {}", key, e);
                None
            }
        }
    }

    fn load_pending_login(&self) -> Option<PendingLogin> {
        let json = self.read_key(StorageKey::PendingLogin)?;
        match serde_json::from_str(&json) {
            Ok(pending) => Some(pending),
            Err(e) => {
                warn!("Ignoring unreadable pending login: {}", e);
                None
            }
        }
    }

    fn discard_pending_login(&self) {
        if let Err(e) = self.store.remove(&[StorageKey::PendingLogin]) {
            warn!("Failed to remove pending login: {}", e);
        }
    }

    fn persist_credential(&self, credential: &Credential) {
        let expiry = credential.expires_at.timestamp_millis().to_string();

        let result = self
            .store
            .set(StorageKey::Token, &credential.access_token)
            .and_then(|_| self.store.set(StorageKey::TokenExpiry, &expiry))
            .and_then(|_| match credential.refresh_token {
                Some(ref refresh_token) => self.store.set(StorageKey::RefreshToken, refresh_token),
                None => self.store.remove(&[StorageKey::RefreshToken]),
            });

        if let Err(e) = result {
            warn!("Failed to persist credential: {}", e);
        }
    }

    /// Token claim, else detected tenant, becomes the override; neither clears it
    fn persist_tenant_candidate(&self, credential: &Credential, detected: Option<&str>) {
        let candidate = credential.claims.tenant_claim().or(detected);

        let result = match candidate {
            Some(tenant) => self.store.set(StorageKey::TenantOverride, tenant),
            None => self.store.remove(&[StorageKey::TenantOverride]),
        };

        if let Err(e) = result {
            warn!("Failed to persist tenant override: {}", e);
        }
    }

    fn clear_credential_keys(&self) {
        if let Err(e) = self.store.remove(&StorageKey::CREDENTIAL) {
            warn!("Failed to clear stored credential: {}", e);
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop_refresh_timer();
    }
}

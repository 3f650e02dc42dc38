use crate::{
    CandidateSource, IdentityContext, ResolutionPlan, ResolutionSource, ResolvedTenant,
    SessionStore, StorageKey, TenantCandidate, TenantDetector, TenantDirectory, TenantError,
    TenantId, TenantResult, collect_candidates, plan_resolution,
};

use std::sync::{Arc, Mutex, PoisonError};

use km_client::{TenantCurrentInfo, UserInfo};
use log::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, Copy)]
struct CachedTenant {
    tenant: TenantId,
    epoch: u64,
}

#[derive(Debug, Clone, Default)]
struct PrimedSources {
    epoch: u64,
    user_info: Option<UserInfo>,
    tenant_info: Option<TenantCurrentInfo>,
}

/// Computes the single authoritative tenant for the session.
///
/// Resolution short-circuits: cached value, then any candidate already in
/// UUID form, then sequential slug lookups, then the tenant list. The
/// result is cached until the identity epoch changes or the tenant is
/// switched explicitly.
pub struct TenantResolver {
    store: Arc<dyn SessionStore>,
    detector: TenantDetector,
    list_page_size: u32,
    cache: Mutex<Option<CachedTenant>>,
    primed: Mutex<PrimedSources>,
}

impl TenantResolver {
    pub fn new(
        store: Arc<dyn SessionStore>,
        detector: TenantDetector,
        list_page_size: u32,
    ) -> Self {
        Self {
            store,
            detector,
            list_page_size,
            cache: Mutex::new(None),
            primed: Mutex::new(PrimedSources::default()),
        }
    }

    /// Cached tenant for `epoch`, restoring the persisted one if needed
    pub fn cached(&self, epoch: u64) -> Option<TenantId> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = *cache {
            if cached.epoch == epoch {
                return Some(cached.tenant);
            }
            *cache = None;
        }

        let restored = match self.store.get(StorageKey::TenantId) {
            Ok(value) => value.as_deref().and_then(TenantId::from_backend),
            Err(e) => {
                warn!("Failed to read resolved tenant: {}", e);
                None
            }
        };
        if let Some(tenant) = restored {
            debug!("Restored resolved tenant {}", tenant);
            *cache = Some(CachedTenant { tenant, epoch });
        }
        restored
    }

    /// Record the startup fetches (`/api/me`, `/api/tenant/info`) as candidate sources.
    ///
    /// An authoritative `tenant_info.tenantId` is cached immediately unless a
    /// tenant is already cached for `epoch`.
    pub fn prime(
        &self,
        epoch: u64,
        user_info: Option<UserInfo>,
        tenant_info: Option<TenantCurrentInfo>,
    ) {
        let authoritative = tenant_info
            .as_ref()
            .and_then(|info| info.tenant_id.as_deref())
            .and_then(TenantId::parse);

        *self.primed.lock().unwrap_or_else(PoisonError::into_inner) = PrimedSources {
            epoch,
            user_info,
            tenant_info,
        };

        if let Some(tenant) = authoritative {
            match self.cached(epoch) {
                Some(existing) if existing != tenant => debug!(
                    "Keeping cached tenant {} over tenant info {}",
                    existing, tenant
                ),
                Some(_) => {}
                None => self.remember(tenant, epoch),
            }
        }
    }

    /// Ordered, de-duplicated candidates for `identity`
    pub fn candidates(
        &self,
        identity: &IdentityContext,
        current_url: &Url,
        extras: &[String],
    ) -> Vec<TenantCandidate> {
        let mut raw: Vec<(CandidateSource, Option<String>)> = extras
            .iter()
            .map(|extra| (CandidateSource::Extra, Some(extra.clone())))
            .collect();

        if let Some(ref claims) = identity.claims {
            let mut fields = claims.tenant_fields().into_iter();
            raw.push((CandidateSource::JwtClaim, fields.next().map(String::from)));
            raw.extend(fields.map(|field| (CandidateSource::JwtDerived, Some(field.to_string()))));
        }

        {
            let primed = self.primed.lock().unwrap_or_else(PoisonError::into_inner);
            if primed.epoch == identity.epoch {
                if let Some(ref user) = primed.user_info {
                    raw.push((CandidateSource::JwtDerived, user.tenant_id_from_jwt.clone()));
                    raw.push((CandidateSource::JwtDerived, user.tenant_id.clone()));
                }
                if let Some(ref info) = primed.tenant_info {
                    raw.push((CandidateSource::TenantInfo, info.tenant_id.clone()));
                }
            }
        }

        raw.push((CandidateSource::Detected, self.detector.detect(current_url)));

        collect_candidates(raw)
    }

    /// Resolve the tenant for `identity`.
    ///
    /// `extras` are tried first but never displace a cached tenant.
    pub async fn resolve(
        &self,
        identity: &IdentityContext,
        current_url: &Url,
        directory: &dyn TenantDirectory,
        extras: &[String],
    ) -> TenantResult<ResolvedTenant> {
        if let Some(tenant) = self.cached(identity.epoch) {
            return Ok(ResolvedTenant {
                tenant,
                via: ResolutionSource::Cached,
            });
        }

        if !identity.authenticated {
            return Err(TenantError::unauthenticated());
        }

        let candidates = self.candidates(identity, current_url, extras);
        debug!("Tenant candidates: {:?}", candidates);

        let slugs = match plan_resolution(None, &candidates) {
            ResolutionPlan::Resolved(resolved) => {
                self.remember(resolved.tenant, identity.epoch);
                return Ok(resolved);
            }
            ResolutionPlan::Lookup { slugs } => slugs,
        };

        let resolved = match self.lookup_slugs(directory, &slugs).await {
            Some(resolved) => Some(resolved),
            None => self.list_fallback(directory, &slugs).await,
        };

        match resolved {
            Some(resolved) => {
                info!("Resolved tenant {} via {:?}", resolved.tenant, resolved.via);
                self.remember(resolved.tenant, identity.epoch);
                Ok(resolved)
            }
            None => {
                metrics::counter!("km_tenant_resolution_total", "outcome" => "unresolved")
                    .increment(1);
                Err(TenantError::unresolved(
                    slugs.into_iter().map(|slug| slug.value).collect(),
                ))
            }
        }
    }

    /// Resolve with no extra candidates and return just the identifier
    pub async fn resolve_and_validate(
        &self,
        identity: &IdentityContext,
        current_url: &Url,
        directory: &dyn TenantDirectory,
    ) -> TenantResult<TenantId> {
        self.resolve(identity, current_url, directory, &[])
            .await
            .map(|resolved| resolved.tenant)
    }

    /// Explicit switch: forget the resolved tenant and point the override at `value`
    pub fn switch_tenant(&self, value: &str) -> TenantResult<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(TenantError::invalid_tenant(value));
        }

        self.invalidate();
        self.store.remove(&[StorageKey::TenantId])?;
        self.store.set(StorageKey::TenantOverride, value)?;

        info!("Switched tenant override to '{}'", value);
        Ok(())
    }

    /// Drop the in-memory cache and primed sources
    pub fn invalidate(&self) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.primed.lock().unwrap_or_else(PoisonError::into_inner) = PrimedSources::default();
    }

    fn remember(&self, tenant: TenantId, epoch: u64) {
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(CachedTenant { tenant, epoch });

        if let Err(e) = self.store.set(StorageKey::TenantId, &tenant.to_string()) {
            warn!("Failed to persist resolved tenant: {}", e);
        }
    }

    /// One slug at a time; the first success ends the scan
    async fn lookup_slugs(
        &self,
        directory: &dyn TenantDirectory,
        slugs: &[TenantCandidate],
    ) -> Option<ResolvedTenant> {
        for slug in slugs {
            match directory.find_by_slug(&slug.value).await {
                Ok(record) => match TenantId::from_backend(&record.tenant_id) {
                    Some(tenant) => {
                        metrics::counter!("km_tenant_lookup_total", "outcome" => "found")
                            .increment(1);
                        return Some(ResolvedTenant {
                            tenant,
                            via: ResolutionSource::SlugLookup(slug.value.clone()),
                        });
                    }
                    None => warn!(
                        "Tenant slug \"{}\" mapped to non-UUID id \"{}\"",
                        slug.value, record.tenant_id
                    ),
                },
                Err(e) if e.is_not_found() => {
                    metrics::counter!("km_tenant_lookup_total", "outcome" => "not_found")
                        .increment(1);
                    warn!("Tenant with slug \"{}\" not found in database", slug.value);
                }
                Err(e) => {
                    metrics::counter!("km_tenant_lookup_total", "outcome" => "error")
                        .increment(1);
                    warn!("Failed to resolve tenant slug \"{}\": {}", slug.value, e);
                }
            }
        }

        None
    }

    /// Single visible tenant wins; with several, match one by slug
    async fn list_fallback(
        &self,
        directory: &dyn TenantDirectory,
        slugs: &[TenantCandidate],
    ) -> Option<ResolvedTenant> {
        let tenants = match directory.list(0, self.list_page_size).await {
            Ok(tenants) => tenants,
            Err(e) => {
                warn!("Failed to list tenants as fallback: {}", e);
                return None;
            }
        };

        let tenant = match tenants.as_slice() {
            [only] => TenantId::from_backend(&only.tenant_id),
            [] => None,
            _ => slugs.iter().find_map(|slug| {
                tenants
                    .iter()
                    .find(|tenant| tenant.slug == slug.value)
                    .and_then(|tenant| TenantId::from_backend(&tenant.tenant_id))
            }),
        };

        tenant.map(|tenant| ResolvedTenant {
            tenant,
            via: ResolutionSource::ListFallback,
        })
    }
}

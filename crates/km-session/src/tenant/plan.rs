use crate::{CandidateSource, TenantCandidate, TenantId};

use serde::Serialize;

/// How a tenant was resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ResolutionSource {
    Cached,
    Candidate(CandidateSource),
    SlugLookup(String),
    ListFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTenant {
    pub tenant: TenantId,
    pub via: ResolutionSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    /// Answer known without any I/O
    Resolved(ResolvedTenant),
    /// Slugs to translate through the backend, in order
    Lookup { slugs: Vec<TenantCandidate> },
}

/// Short-circuit part of tenant resolution; never touches the network.
///
/// A cached identifier wins outright. Otherwise the first authoritative
/// candidate wins. Otherwise every candidate becomes a slug to look up.
pub fn plan_resolution(cached: Option<TenantId>, candidates: &[TenantCandidate]) -> ResolutionPlan {
    if let Some(tenant) = cached {
        return ResolutionPlan::Resolved(ResolvedTenant {
            tenant,
            via: ResolutionSource::Cached,
        });
    }

    for candidate in candidates {
        if let Some(tenant) = TenantId::parse(&candidate.value) {
            return ResolutionPlan::Resolved(ResolvedTenant {
                tenant,
                via: ResolutionSource::Candidate(candidate.source),
            });
        }
    }

    ResolutionPlan::Lookup {
        slugs: candidates.to_vec(),
    }
}

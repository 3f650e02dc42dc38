use serde::Serialize;

/// Where a tenant candidate came from, in trust order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Supplied by the caller for this resolution
    Extra,
    /// The token's primary tenant claim
    JwtClaim,
    /// Other tenant fields from the token or the backend's reading of it
    JwtDerived,
    /// `tenantId` from `/api/tenant/info`
    TenantInfo,
    /// URL parameter, persisted override, or subdomain
    Detected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantCandidate {
    pub source: CandidateSource,
    pub value: String,
}

impl TenantCandidate {
    pub fn new(source: CandidateSource, value: impl Into<String>) -> Self {
        Self {
            source,
            value: value.into(),
        }
    }
}

/// Trim values, drop empties, and keep only the first occurrence of each value.
///
/// Input order is preserved; callers list sources in trust order.
pub fn collect_candidates<I, S>(raw: I) -> Vec<TenantCandidate>
where
    I: IntoIterator<Item = (CandidateSource, Option<S>)>,
    S: AsRef<str>,
{
    let mut candidates: Vec<TenantCandidate> = Vec::new();

    for (source, value) in raw {
        let Some(value) = value else { continue };
        let value = value.as_ref().trim();
        if value.is_empty() || candidates.iter().any(|c| c.value == value) {
            continue;
        }
        candidates.push(TenantCandidate::new(source, value));
    }

    candidates
}

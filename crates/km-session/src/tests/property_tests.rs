use super::{FakeDirectory, authenticated_identity, url};
use crate::{
    CandidateSource, MemoryStore, ResolutionPlan, ResolutionSource, TenantCandidate,
    TenantDetector, TenantId, TenantResolver, collect_candidates, plan_resolution,
};

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

const ACME_ID: &str = "11111111-1111-1111-1111-111111111111";

// =========================================================================
// Strategies
// =========================================================================

fn source() -> impl Strategy<Value = CandidateSource> {
    prop_oneof![
        Just(CandidateSource::Extra),
        Just(CandidateSource::JwtClaim),
        Just(CandidateSource::JwtDerived),
        Just(CandidateSource::TenantInfo),
        Just(CandidateSource::Detected),
    ]
}

/// Never long enough to be a UUID
fn slug() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn authoritative_uuid() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}"
}

/// Short, padded values so duplicates and blanks show up often
fn raw_value() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[ ]{0,2}[a-c]{0,2}[ ]{0,2}")
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn resolver() -> TenantResolver {
    let store = Arc::new(MemoryStore::new());
    let detector = TenantDetector::new(store.clone(), "tenant");
    TenantResolver::new(store, detector, 100)
}

// =========================================================================
// Property-Based Tests - Candidates and planning
// =========================================================================

proptest! {
    #[test]
    fn given_raw_sources_when_collected_then_first_occurrences_kept_in_order(
        raw in prop::collection::vec((source(), raw_value()), 0..12)
    ) {
        let candidates = collect_candidates(raw.clone());

        let mut seen = HashSet::new();
        let first_occurrences: Vec<TenantCandidate> = raw
            .iter()
            .filter_map(|(source, value)| {
                let value = value.as_deref()?.trim();
                (!value.is_empty() && seen.insert(value.to_string()))
                    .then(|| TenantCandidate::new(*source, value))
            })
            .collect();

        prop_assert_eq!(candidates, first_occurrences);
    }

    #[test]
    fn given_uuid_among_slugs_when_planned_then_first_uuid_resolves(
        prefix in prop::collection::vec(slug(), 0..5),
        uuid in authoritative_uuid(),
        uuid_source in source(),
        suffix in prop::collection::vec(prop_oneof![slug(), authoritative_uuid()], 0..5),
    ) {
        let raw = prefix
            .iter()
            .map(|value| (CandidateSource::Extra, Some(value.clone())))
            .chain(std::iter::once((uuid_source, Some(uuid.clone()))))
            .chain(suffix.iter().map(|value| (CandidateSource::Detected, Some(value.clone()))));
        let candidates = collect_candidates(raw);

        let plan = plan_resolution(None, &candidates);

        match plan {
            ResolutionPlan::Resolved(resolved) => {
                prop_assert_eq!(Some(resolved.tenant), TenantId::parse(&uuid));
                prop_assert_eq!(resolved.via, ResolutionSource::Candidate(uuid_source));
            }
            ResolutionPlan::Lookup { .. } => prop_assert!(false, "expected a resolved plan"),
        }
    }

    #[test]
    fn given_only_slugs_when_planned_then_every_candidate_looked_up_in_order(
        slugs in prop::collection::vec((source(), slug()), 0..8)
    ) {
        let candidates = collect_candidates(
            slugs.into_iter().map(|(source, value)| (source, Some(value))),
        );

        let plan = plan_resolution(None, &candidates);

        prop_assert_eq!(plan, ResolutionPlan::Lookup { slugs: candidates });
    }

    #[test]
    fn given_cached_tenant_when_planned_then_cache_wins_over_any_candidates(
        values in prop::collection::vec(prop_oneof![slug(), authoritative_uuid()], 0..8)
    ) {
        let cached = TenantId::parse(ACME_ID);
        let candidates = collect_candidates(
            values.into_iter().map(|value| (CandidateSource::Extra, Some(value))),
        );

        let plan = plan_resolution(cached, &candidates);

        match plan {
            ResolutionPlan::Resolved(resolved) => {
                prop_assert_eq!(Some(resolved.tenant), cached);
                prop_assert_eq!(resolved.via, ResolutionSource::Cached);
            }
            ResolutionPlan::Lookup { .. } => prop_assert!(false, "expected the cached tenant"),
        }
    }
}

// =========================================================================
// Property-Based Tests - Resolver
// =========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn given_uuid_in_extras_when_resolved_then_no_backend_calls(
        slugs in prop::collection::vec(slug(), 0..4),
        uuid in authoritative_uuid(),
    ) {
        let resolver = resolver();
        let directory = FakeDirectory::default();
        let identity = authenticated_identity(Some("acme"), 0);
        let mut extras = slugs;
        extras.push(uuid.clone());

        let resolved = runtime()
            .block_on(resolver.resolve(
                &identity,
                &url("http://localhost:5173/"),
                &directory,
                &extras,
            ))
            .unwrap();

        prop_assert_eq!(Some(resolved.tenant), TenantId::parse(&uuid));
        prop_assert!(directory.calls().is_empty());
    }

    #[test]
    fn given_cached_tenant_when_resolved_with_any_extras_then_cache_wins(
        extras in prop::collection::vec(prop_oneof![slug(), authoritative_uuid()], 0..6)
    ) {
        let runtime = runtime();
        let resolver = resolver();
        let directory = FakeDirectory::default().with_slug("acme", Ok(ACME_ID));
        let identity = authenticated_identity(Some("acme"), 0);
        let app_url = url("http://localhost:5173/");
        runtime
            .block_on(resolver.resolve(&identity, &app_url, &directory, &[]))
            .unwrap();

        let resolved = runtime
            .block_on(resolver.resolve(&identity, &app_url, &directory, &extras))
            .unwrap();

        prop_assert_eq!(resolved.tenant.to_string(), ACME_ID);
        prop_assert_eq!(resolved.via, ResolutionSource::Cached);
        prop_assert_eq!(directory.calls(), vec!["slug:acme".to_string()]);
    }
}

pub(crate) mod candidate;
pub(crate) mod detector;
pub(crate) mod directory;
pub(crate) mod error;
pub(crate) mod plan;
pub(crate) mod resolver;
pub(crate) mod tenant_id;

pub use candidate::{CandidateSource, TenantCandidate, collect_candidates};
pub use detector::{TenantDetector, subdomain_tenant};
pub use directory::TenantDirectory;
pub use error::{Result as TenantResult, TenantError};
pub use plan::{ResolutionPlan, ResolutionSource, ResolvedTenant, plan_resolution};
pub use resolver::TenantResolver;
pub use tenant_id::TenantId;

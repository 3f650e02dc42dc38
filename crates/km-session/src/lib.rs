//! km-session library
//!
//! Session lifecycle and tenant resolution for the console, wired together
//! by [`AppContext`].

pub(crate) mod app_context;
pub(crate) mod error;
pub(crate) mod navigator;
pub(crate) mod session;
pub(crate) mod store;
pub(crate) mod tenant;

#[cfg(test)]
mod tests;

pub use app_context::{AppContext, BootstrapReport};
pub use error::{Result as SessionResult, SessionError};
pub use navigator::{MemoryNavigator, Navigator};
pub use session::{IdentityContext, SessionManager, SessionState};
pub use store::{FileStore, MemoryStore, SessionStore, StorageKey, StoreError, StoreResult};
pub use tenant::{
    CandidateSource, ResolutionPlan, ResolutionSource, ResolvedTenant, TenantCandidate,
    TenantDetector, TenantDirectory, TenantError, TenantId, TenantResolver, TenantResult,
    collect_candidates, plan_resolution, subdomain_tenant,
};

use crate::{
    ApiClient, ClientError, ClientResult, CreateTenantRequest, NewTenant, RetryOutcome,
    TenantRecord, normalize_slug, retry_bounded,
};
use crate::models::create_tenant_request::MIN_ADMIN_PASSWORD_LENGTH;

use chrono::Utc;
use km_config::RetryConfig;
use log::info;

impl ApiClient {
    /// Create a tenant, retrying with a timestamp-suffixed slug on conflict.
    pub async fn create_tenant_with_retry(
        &self,
        tenant: &NewTenant,
        policy: &RetryConfig,
    ) -> ClientResult<TenantRecord> {
        if tenant.admin_email.trim().is_empty() {
            return Err(ClientError::invalid_request("Admin email is required"));
        }
        if tenant.admin_password.len() < MIN_ADMIN_PASSWORD_LENGTH {
            return Err(ClientError::invalid_request(format!(
                "Admin password must be at least {} characters",
                MIN_ADMIN_PASSWORD_LENGTH
            )));
        }

        let base_slug = match tenant.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_lowercase(),
            _ => normalize_slug(&tenant.name),
        };
        if base_slug.is_empty() {
            return Err(ClientError::invalid_request(
                "Tenant name must contain at least one letter or digit",
            ));
        }

        let outcome = retry_bounded(
            policy,
            "Create tenant",
            ClientError::is_conflict,
            |attempt| {
                let slug = if attempt == 0 {
                    base_slug.clone()
                } else {
                    format!("{}-{}", base_slug, Utc::now().timestamp_millis())
                };
                let request = CreateTenantRequest::new(tenant, slug);
                async move { self.create_tenant(&request).await }
            },
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                info!(
                    "Created tenant '{}' ({}) after {} attempt(s)",
                    value.slug, value.tenant_id, attempts
                );
                Ok(value)
            }
            RetryOutcome::Exhausted { error, attempts } => {
                Err(ClientError::api_error(
                    error.status().unwrap_or(409),
                    format!(
                        "Tenant \"{}\" already exists. Please choose a different name or slug, \
                         or try again in a moment. ({} attempts)",
                        tenant.name, attempts
                    ),
                ))
            }
            RetryOutcome::Rejected { error, .. } => Err(error),
        }
    }
}

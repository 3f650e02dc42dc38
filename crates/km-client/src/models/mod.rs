pub(crate) mod create_tenant_request;
mod tenant_current_info;
mod tenant_record;
mod user_info;

pub use create_tenant_request::{AdminUser, CreateTenantRequest, NewTenant};
pub use tenant_current_info::TenantCurrentInfo;
pub use tenant_record::TenantRecord;
pub use user_info::UserInfo;

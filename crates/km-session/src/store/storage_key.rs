use std::fmt;

/// Keys of the durable session store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    /// Bearer access token
    Token,
    RefreshToken,
    /// Access token expiry, epoch milliseconds
    TokenExpiry,
    /// Tenant chosen via `?tenant=`, a token claim, or an explicit switch
    TenantOverride,
    /// Last resolved authoritative tenant id
    TenantId,
    /// PKCE state between login redirect and callback
    PendingLogin,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Token,
        StorageKey::RefreshToken,
        StorageKey::TokenExpiry,
        StorageKey::TenantOverride,
        StorageKey::TenantId,
        StorageKey::PendingLogin,
    ];

    /// Keys holding the credential itself
    pub const CREDENTIAL: [StorageKey; 3] = [
        StorageKey::Token,
        StorageKey::RefreshToken,
        StorageKey::TokenExpiry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Token => "token",
            StorageKey::RefreshToken => "refreshToken",
            StorageKey::TokenExpiry => "tokenExpiry",
            StorageKey::TenantOverride => "tenantOverride",
            StorageKey::TenantId => "tenantId",
            StorageKey::PendingLogin => "pendingLogin",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

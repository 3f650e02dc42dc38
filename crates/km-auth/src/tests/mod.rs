
use crate::{Claims, RoleAccess};

use std::collections::HashMap;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

pub(crate) const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

pub(crate) fn create_test_token(claims: &Claims, secret: &[u8]) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .unwrap()
}

pub(crate) fn valid_claims() -> Claims {
    let now = chrono::Utc::now().timestamp();
    Claims {
        sub: "user-123".to_string(),
        email: Some("ada@acme.test".to_string()),
        preferred_username: Some("ada".to_string()),
        name: None,
        tenant_id: Some("acme".to_string()),
        tenant_id_camel: None,
        tenant: None,
        exp: now + 3600,
        iat: Some(now),
        realm_access: RoleAccess {
            roles: vec!["user".to_string()],
        },
        resource_access: HashMap::from([(
            "react-client".to_string(),
            RoleAccess {
                roles: vec!["tenant-admin".to_string()],
            },
        )]),
    }
}

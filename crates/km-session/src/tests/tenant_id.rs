use crate::TenantId;

#[test]
fn given_v4_uuid_when_checked_then_authoritative() {
    assert!(TenantId::is_authoritative("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
}

#[test]
fn given_uppercase_uuid_with_whitespace_when_parsed_then_normalized_lowercase() {
    let tenant = TenantId::parse("  3FA85F64-5717-4562-B3FC-2C963F66AFA6 ").unwrap();

    assert_eq!(tenant.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
}

#[test]
fn given_slug_when_checked_then_not_authoritative() {
    assert!(!TenantId::is_authoritative("acme"));
    assert!(TenantId::parse("not-a-uuid").is_none());
}

#[test]
fn given_uuid_with_invalid_variant_when_checked_then_not_authoritative() {
    assert!(!TenantId::is_authoritative("11111111-1111-1111-1111-111111111111"));
    assert!(!TenantId::is_authoritative("3fa85f64-5717-0562-b3fc-2c963f66afa6"));
}

#[test]
fn given_backend_identifier_when_accepted_then_any_hyphenated_uuid_allowed() {
    let tenant = TenantId::from_backend("11111111-1111-1111-1111-111111111111").unwrap();

    assert_eq!(tenant.to_string(), "11111111-1111-1111-1111-111111111111");
    assert!(TenantId::from_backend("acme").is_none());
    assert!(TenantId::from_backend("3fa85f6457174562b3fc2c963f66afa6").is_none());
}

#[test]
fn given_tenant_id_when_serialized_then_plain_string() {
    let tenant = TenantId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();

    let json = serde_json::to_string(&tenant).unwrap();

    assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
}

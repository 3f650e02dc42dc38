use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};
use uuid::Uuid;

const AUTHORITATIVE_PATTERN: &str =
    r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";

static AUTHORITATIVE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(AUTHORITATIVE_PATTERN));

/// Canonical tenant identifier (a UUID).
///
/// Candidates are only accepted when they match the strict RFC 4122 shape
/// (version 1-5, variant 10xx). Identifiers handed back by the backend are
/// trusted as long as they are hyphenated UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Strict check used to classify untrusted candidates
    pub fn is_authoritative(value: &str) -> bool {
        match *AUTHORITATIVE {
            Ok(ref pattern) => pattern.is_match(value.trim()),
            Err(_) => false,
        }
    }

    /// Parse an untrusted candidate; `None` unless it is authoritative
    pub fn parse(value: &str) -> Option<Self> {
        if !Self::is_authoritative(value) {
            return None;
        }
        Uuid::try_parse(value.trim()).ok().map(Self)
    }

    /// Accept an identifier returned by the backend
    pub fn from_backend(value: &str) -> Option<Self> {
        let value = value.trim();
        // Hyphenated form only; no braces, urn prefix, or simple form
        if value.len() != 36 {
            return None;
        }
        Uuid::try_parse(value).ok().map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for TenantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

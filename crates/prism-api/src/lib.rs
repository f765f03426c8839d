pub mod auth;
pub mod comments;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod posts;
pub mod users;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

/// Ids and timestamps live in SQLite as TEXT. A corrupt value is logged and
/// replaced with a default rather than failing the whole response.
pub(crate) fn parse_id(raw: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}': {}", raw, e);
        Uuid::default()
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>().unwrap_or_else(|e| {
        warn!("Corrupt timestamp '{}': {}", raw, e);
        DateTime::default()
    })
}

/// Server-assigned creation timestamps, RFC 3339 with sub-second precision
/// so insertion order survives the TEXT sort in queries.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

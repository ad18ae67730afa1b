//! The session record persisted on behalf of the authentication library.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

/// An authenticated shop's handshake state.
///
/// One record is created by the authentication library per completed OAuth
/// handshake, read on every authenticated request, and deleted on logout or
/// app uninstall. The `id` is externally generated and unique; storing a
/// session with an existing `id` replaces the previous record.
///
/// Offline sessions carry no expiry and no online-access metadata; online
/// sessions carry both. `access_token` is sensitive and should never be
/// logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Externally generated session identifier, the primary key.
    pub id: String,
    /// The shop (tenant) this session belongs to, e.g. `store.myshopify.com`.
    pub shop: String,
    /// OAuth state nonce, present only mid-handshake.
    pub state: Option<String>,
    /// Whether this is an online (per-user) or offline (per-shop) session.
    pub is_online: bool,
    /// Granted access scopes, serialized as a comma-separated list.
    pub scope: Option<String>,
    /// The API access token issued for this session.
    pub access_token: Option<String>,
    /// Absolute expiry of the access token, if it expires at all.
    pub expires: Option<OffsetDateTime>,
    /// Structured metadata about the associated user for online sessions,
    /// stored as JSON text.
    pub online_access_info: Option<JsonValue>,
}

impl Session {
    /// Creates a session with the required fields; everything else starts
    /// empty and can be filled in before storing.
    pub fn new(id: impl Into<String>, shop: impl Into<String>, is_online: bool) -> Self {
        Self {
            id: id.into(),
            shop: shop.into(),
            state: None,
            is_online,
            scope: None,
            access_token: None,
            expires: None,
            online_access_info: None,
        }
    }
}

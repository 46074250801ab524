//! Outbound query construction.
//!
//! Pure functions, no I/O. The metadata map uses the provider's own
//! RequestInfo field names so it can be merged into the request info header
//! as-is.

use serde_json::{Map, Value};

use crate::identity::new_request_id;
use crate::types::{DEFAULT_QUERY, LocationInfo, UnitPreference};

pub const FIELD_UNIT_PREFERENCE: &str = "UnitPreference";
pub const FIELD_LATITUDE: &str = "Latitude";
pub const FIELD_LONGITUDE: &str = "Longitude";
pub const FIELD_COUNTRY: &str = "Country";

/// One text query, ready to hand to a provider client.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub text: String,
    pub user_id: String,
    pub request_id: String,
    pub metadata: Map<String, Value>,
}

/// Join CLI words with single spaces; fall back to [`DEFAULT_QUERY`] when
/// nothing is left after trimming.
pub fn query_text<S: AsRef<str>>(words: &[S]) -> String {
    let joined = words
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        DEFAULT_QUERY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Assemble a request with a fresh request id.
///
/// `units` is `None` when the unit preference should not be sent at all.
pub fn build_request(
    text: &str,
    user_id: &str,
    units: Option<UnitPreference>,
    location: Option<&LocationInfo>,
) -> QueryRequest {
    let mut metadata = Map::new();

    if let Some(units) = units {
        metadata.insert(
            FIELD_UNIT_PREFERENCE.into(),
            Value::from(units.provider_token()),
        );
    }

    if let Some(loc) = location {
        metadata.insert(FIELD_LATITUDE.into(), Value::from(loc.latitude));
        metadata.insert(FIELD_LONGITUDE.into(), Value::from(loc.longitude));
        metadata.insert(FIELD_COUNTRY.into(), Value::from(loc.country_name.clone()));
    }

    let text = if text.trim().is_empty() {
        DEFAULT_QUERY
    } else {
        text
    };

    QueryRequest {
        text: text.to_string(),
        user_id: user_id.to_string(),
        request_id: new_request_id(),
        metadata,
    }
}

impl QueryRequest {
    /// The `Hound-Request-Info` JSON object: identity fields plus metadata.
    ///
    /// Identity fields win over metadata entries with the same name.
    pub fn request_info(&self, client_id: &str, timestamp: u64) -> Value {
        let mut info = self.metadata.clone();
        info.insert("ClientID".into(), Value::from(client_id));
        info.insert("UserID".into(), Value::from(self.user_id.clone()));
        info.insert("RequestID".into(), Value::from(self.request_id.clone()));
        info.insert("TimeStamp".into(), Value::from(timestamp));
        Value::Object(info)
    }
}

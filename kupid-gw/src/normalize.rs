//! Upstream reply normalization
//!
//! The webhook and edge-function backends answer in several shapes: empty
//! bodies, bare records, records wrapped in `{ "data": ... }`, arrays of
//! either, with or without a `success` flag. A reply is classified once into
//! [`UpstreamReply`] and each route's [`ReplyPolicy`] maps that onto the
//! contract the client relies on.
//!
//! Only called for 2xx upstream replies; non-2xx is forwarded by the handler.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::ApiError;
use kupid_common::ProxyRoute;

/// A JSON object, classified by its `success` flag
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `success: true`
    Found(Map<String, Value>),
    /// `success: false`, with the upstream message if any
    Missing {
        message: Option<String>,
        record: Map<String, Value>,
    },
    /// No boolean `success` flag
    Unflagged(Map<String, Value>),
}

impl Envelope {
    fn classify(record: Map<String, Value>) -> Self {
        match record.get("success").and_then(Value::as_bool) {
            Some(true) => Envelope::Found(record),
            Some(false) => Envelope::Missing {
                message: record
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
                record,
            },
            None => Envelope::Unflagged(record),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Envelope::Found(record)
            | Envelope::Unflagged(record)
            | Envelope::Missing { record, .. } => Value::Object(record),
        }
    }
}

/// One element of an array reply
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `{ "data": { ... }, ... }`; `outer` is the element as sent, `data` included
    Wrapped { inner: Envelope, outer: Envelope },
    /// `{ ... }`
    Bare(Envelope),
    /// Anything that is not an object
    Scalar(Value),
}

impl Item {
    fn classify(value: Value) -> Self {
        match value {
            Value::Object(record) => {
                let inner = match record.get("data") {
                    Some(Value::Object(inner)) => Some(inner.clone()),
                    _ => None,
                };
                match inner {
                    Some(inner) => Item::Wrapped {
                        inner: Envelope::classify(inner),
                        outer: Envelope::classify(record),
                    },
                    None => Item::Bare(Envelope::classify(record)),
                }
            }
            other => Item::Scalar(other),
        }
    }

    /// The element with any `data` wrapper removed
    fn into_inner(self) -> Value {
        match self {
            Item::Wrapped { inner, .. } => inner.into_value(),
            Item::Bare(envelope) => envelope.into_value(),
            Item::Scalar(value) => value,
        }
    }

    /// The element exactly as the upstream sent it
    fn into_original(self) -> Value {
        match self {
            Item::Wrapped { outer, .. } | Item::Bare(outer) => outer.into_value(),
            Item::Scalar(value) => value,
        }
    }
}

/// Parsed shape of a 2xx upstream body
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamReply {
    /// Empty or whitespace-only body
    Empty,
    /// An object without a `data` object
    Record(Envelope),
    /// `{ "data": { ... }, ... }`; `outer` keeps the sibling keys
    Wrapped { inner: Envelope, outer: Envelope },
    /// An array
    List(Vec<Item>),
    /// Any other JSON value (string, number, boolean, null)
    Other(Value),
}

impl UpstreamReply {
    /// Classify a reply body; `Err` carries the body when it is not JSON
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        if text.trim().is_empty() {
            return Ok(UpstreamReply::Empty);
        }
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::classify(value))
    }

    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) => UpstreamReply::List(items.into_iter().map(Item::classify).collect()),
            Value::Object(_) => match Item::classify(value) {
                Item::Wrapped { inner, outer } => UpstreamReply::Wrapped { inner, outer },
                Item::Bare(envelope) => UpstreamReply::Record(envelope),
                Item::Scalar(other) => UpstreamReply::Other(other),
            },
            other => UpstreamReply::Other(other),
        }
    }

    /// The reply exactly as the upstream sent it
    fn into_value(self) -> Value {
        match self {
            UpstreamReply::Empty => Value::Null,
            UpstreamReply::Record(envelope) | UpstreamReply::Wrapped { outer: envelope, .. } => envelope.into_value(),
            UpstreamReply::List(items) => Value::Array(items.into_iter().map(Item::into_original).collect()),
            UpstreamReply::Other(value) => value,
        }
    }
}

/// How a route turns an [`UpstreamReply`] into its client contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPolicy {
    /// Write acknowledgement: empty, `{}` or non-JSON become
    /// `{ success: true, message }`; other JSON is passed through
    Ack { message: &'static str },
    /// Profile lookup returning an array of records
    ProfileList { not_found: &'static str },
    /// Profile lookup returning a single record
    ProfileSingle { not_found: &'static str },
    /// Match search returning `{ matches: [...] }`
    Listing,
    /// Metadata lookup returning an array of records
    Documents,
}

pub const INVALID_UPSTREAM: &str = "Invalid response from upstream";
pub const EMPTY_UPSTREAM: &str = "Empty response from upstream";

/// Policy applied to a route's 2xx replies
pub fn policy_for(route: ProxyRoute) -> ReplyPolicy {
    match route {
        ProxyRoute::AddUser => ReplyPolicy::Ack { message: "User added successfully" },
        ProxyRoute::UpdateUser => ReplyPolicy::Ack { message: "User updated successfully" },
        ProxyRoute::UpdatePreferences => ReplyPolicy::Ack { message: "Preferences updated successfully" },
        ProxyRoute::SendInvite => ReplyPolicy::Ack { message: "Invite sent" },
        ProxyRoute::GetUser => ReplyPolicy::ProfileList { not_found: "User not found" },
        ProxyRoute::GetPreferences => ReplyPolicy::ProfileSingle { not_found: "Preferences not found" },
        ProxyRoute::SearchMatches => ReplyPolicy::Listing,
        ProxyRoute::DocumentToUser => ReplyPolicy::Documents,
    }
}

/// Normalize a 2xx upstream body under `policy`
pub fn normalize(policy: ReplyPolicy, text: &str) -> Result<Value, ApiError> {
    let reply = match UpstreamReply::parse(text) {
        Ok(reply) => reply,
        Err(e) => {
            if let ReplyPolicy::Ack { message } = policy {
                debug!("Upstream returned non-JSON acknowledgement, treating as success");
                return Ok(ack(message));
            }
            warn!(error = %e, body = %truncate(text, 500), "Failed to parse upstream reply");
            return Err(ApiError::InvalidUpstream(INVALID_UPSTREAM.to_string()));
        }
    };

    match policy {
        ReplyPolicy::Ack { message } => Ok(normalize_ack(reply, message)),
        ReplyPolicy::ProfileList { not_found } => normalize_profile_list(reply, not_found),
        ReplyPolicy::ProfileSingle { not_found } => normalize_profile_single(reply, not_found),
        ReplyPolicy::Listing => normalize_listing(reply),
        ReplyPolicy::Documents => normalize_documents(reply),
    }
}

fn ack(message: &str) -> Value {
    json!({ "success": true, "message": message })
}

fn normalize_ack(reply: UpstreamReply, message: &str) -> Value {
    match reply {
        UpstreamReply::Empty => ack(message),
        UpstreamReply::Record(Envelope::Unflagged(record)) if record.is_empty() => ack(message),
        other => other.into_value(),
    }
}

fn normalize_profile_list(reply: UpstreamReply, not_found: &str) -> Result<Value, ApiError> {
    let missing = |message: Option<String>| ApiError::NotFound(message.unwrap_or_else(|| not_found.to_string()));

    match reply {
        UpstreamReply::Empty => Err(missing(None)),
        // A flagged `data` object decides; otherwise the outer object's own flag does
        UpstreamReply::Wrapped { inner: Envelope::Missing { message, .. }, .. } => Err(missing(message)),
        UpstreamReply::Wrapped { inner: Envelope::Found(record), .. } => Ok(Value::Array(vec![Value::Object(record)])),
        UpstreamReply::Wrapped { outer, .. } | UpstreamReply::Record(outer) => match outer {
            Envelope::Found(record) => Ok(Value::Array(vec![Value::Object(record)])),
            Envelope::Missing { message, .. } => Err(missing(message)),
            unflagged => Err(unexpected(&unflagged)),
        },
        UpstreamReply::List(items) => {
            // The first element decides the shape of the whole array
            let (wrapped, found, message) = match items.first() {
                Some(Item::Wrapped { inner: Envelope::Missing { message, .. }, .. }) => {
                    (true, false, Some(message.clone()))
                }
                Some(Item::Wrapped { .. }) => (true, true, None),
                Some(Item::Bare(Envelope::Found(_))) => (false, true, None),
                _ => (false, false, None),
            };
            match (wrapped, found) {
                (true, false) => Err(missing(message.flatten())),
                (true, true) => Ok(Value::Array(items.into_iter().map(Item::into_inner).collect())),
                (false, true) => Ok(Value::Array(items.into_iter().map(Item::into_original).collect())),
                (false, false) => Err(unexpected(&items)),
            }
        }
        other => Err(unexpected(&other)),
    }
}

fn normalize_profile_single(reply: UpstreamReply, not_found: &str) -> Result<Value, ApiError> {
    let record = match reply {
        UpstreamReply::Empty => return Err(ApiError::NotFound(not_found.to_string())),
        UpstreamReply::Wrapped { inner, .. } => inner,
        UpstreamReply::Record(envelope) => envelope,
        other => return Err(unexpected(&other)),
    };
    match record {
        Envelope::Missing { .. } => Err(ApiError::NotFound(not_found.to_string())),
        envelope => Ok(envelope.into_value()),
    }
}

fn normalize_listing(reply: UpstreamReply) -> Result<Value, ApiError> {
    match reply {
        UpstreamReply::Empty => Ok(json!({ "matches": [] })),
        UpstreamReply::List(items) => Ok(json!({
            "matches": items.into_iter().map(Item::into_original).collect::<Vec<_>>()
        })),
        UpstreamReply::Record(outer) | UpstreamReply::Wrapped { outer, .. } if has_matches_array(&outer) => {
            Ok(outer.into_value())
        }
        other => Err(unexpected(&other)),
    }
}

fn has_matches_array(envelope: &Envelope) -> bool {
    let record = match envelope {
        Envelope::Found(record) | Envelope::Unflagged(record) | Envelope::Missing { record, .. } => record,
    };
    record.get("matches").map(Value::is_array).unwrap_or(false)
}

fn normalize_documents(reply: UpstreamReply) -> Result<Value, ApiError> {
    match reply {
        UpstreamReply::Empty => Err(ApiError::InvalidUpstream(EMPTY_UPSTREAM.to_string())),
        UpstreamReply::List(items) => Ok(Value::Array(items.into_iter().map(Item::into_original).collect())),
        record @ (UpstreamReply::Record(_) | UpstreamReply::Wrapped { .. }) => {
            Ok(Value::Array(vec![record.into_value()]))
        }
        other => Err(unexpected(&other)),
    }
}

fn unexpected(reply: &impl std::fmt::Debug) -> ApiError {
    warn!(reply = ?reply, "Unexpected upstream response format");
    ApiError::UnexpectedFormat
}

/// First `max` characters of `text`, for logging
pub fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

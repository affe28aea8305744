//! Types for the approval flow.
//!
//! `ApprovalInfo` is what the parser recovers from a gateway notice,
//! `ApprovalResolution` is what the detector recovers from a follow-up.
//! `SentApproval` belongs to whoever forwards the notice; the core only
//! reads it.

use crate::utils::duration::parse_duration;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One pending exec approval request, as announced by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    /// Correlation key, usually a UUID
    pub id: String,
    /// The command awaiting approval (`"unknown"` if unrecoverable)
    pub command: String,
    pub cwd: String,
    pub host: String,
    pub agent: String,
    pub security: String,
    pub ask: String,
    /// Raw lifetime string, e.g. "120s"
    pub expires: String,
}

impl ApprovalInfo {
    /// The `expires` field as a duration, if it is in a recognizable form.
    pub fn expires_in(&self) -> Option<Duration> {
        parse_duration(&self.expires).ok()
    }
}

/// How a pending request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalAction {
    AllowOnce,
    AllowAlways,
    Deny,
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalAction::AllowOnce => write!(f, "allow-once"),
            ApprovalAction::AllowAlways => write!(f, "allow-always"),
            ApprovalAction::Deny => write!(f, "deny"),
        }
    }
}

/// A detected resolution of a pending request.
/// `id` is always a key of the pending mapping it was detected against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResolution {
    pub id: String,
    pub action: ApprovalAction,
}

/// A request that has been forwarded to the chat platform and is waiting
/// for a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentApproval {
    pub info: ApprovalInfo,
    /// Platform handle of the forwarded message
    pub message_id: i64,
    /// When the message was forwarded
    pub sent_at: DateTime<Utc>,
}

impl SentApproval {
    pub fn new(info: ApprovalInfo, message_id: i64, sent_at: DateTime<Utc>) -> Self {
        Self {
            info,
            message_id,
            sent_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    /// When this request lapses. Falls back to `default_ttl` if the
    /// gateway's `expires` field is not a duration we understand.
    /// Lifetimes past the end of representable time saturate to
    /// `DateTime::<Utc>::MAX_UTC`.
    pub fn expires_at(&self, default_ttl: Duration) -> DateTime<Utc> {
        let ttl = self.info.expires_in().unwrap_or(default_ttl);
        self.sent_at
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

//! Classifies a follow-up message into an approval action.
//!
//! Rules are evaluated **in order** and the first match wins. Keep the most
//! specific phrases first: "allow-always" must be checked before "deny" so
//! that "always allow (previously denied)" is not read as a denial, and
//! "deny" before "allowed" so that "not allowed, denied" stays a denial.

use crate::approval::types::ApprovalAction;
use regex::Regex;
use std::sync::OnceLock;

/// Keyword rules as (any-of phrases, action). Phrases are lowercase and
/// matched as substrings of the lowercased message.
const KEYWORD_RULES: &[(&[&str], ApprovalAction)] = &[
    (&["allow-always", "always allow"], ApprovalAction::AllowAlways),
    (&["deny", "denied", "rejected"], ApprovalAction::Deny),
    (&["allow-once", "allowed"], ApprovalAction::AllowOnce),
    (&["approved"], ApprovalAction::AllowOnce),
];

/// Used when the message names a pending request but no rule matches.
const DEFAULT_ACTION: ApprovalAction = ApprovalAction::AllowOnce;

fn denial_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(?:denied|deny)\b").expect("valid denial regex"))
}

fn timeout_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bapproval[-_ ]timeout\b").expect("valid timeout regex")
    })
}

/// Whether the gateway itself denied the request because nobody answered
/// in time ("Exec denied ... approval-timeout").
pub fn is_gateway_denial(text: &str) -> bool {
    denial_word().is_match(text) && timeout_marker().is_match(text)
}

/// Determine the action a message reports.
///
/// A gateway timeout denial overrides everything else, even if the message
/// also echoes words like "allowed".
pub fn classify_action(text: &str) -> ApprovalAction {
    if is_gateway_denial(text) {
        return ApprovalAction::Deny;
    }

    let lower = text.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(_, action)| *action)
        .unwrap_or(DEFAULT_ACTION)
}

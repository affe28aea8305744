//! Detects whether a follow-up message resolves a pending request.
//!
//! Two ways of referring to a request are recognized:
//! 1. The full UUID. Looked up directly in the pending set.
//! 2. A truncated id: a standalone hex run of 8+ characters, matched as a
//!    prefix against pending ids in their iteration order.
//!
//! Only the first token of each shape is considered. The full-id path
//! always wins; the prefix path is only tried when the message's first
//! UUID (if any) is not pending.

use crate::approval::classifier::classify_action;
use crate::approval::pending::PendingApprovals;
use crate::approval::types::ApprovalResolution;
use regex::Regex;
use std::sync::OnceLock;

fn uuid_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}")
            .expect("valid uuid regex")
    })
}

fn hex_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b[a-f0-9]{8,}\b").expect("valid hex regex"))
}

/// Check whether `text` reports the resolution of one of `pending`.
///
/// Returns `None` when nothing is pending, when the text names no pending
/// id, or when it names one that isn't (or is no longer) pending. The
/// returned id is always a key of `pending`.
pub fn detect_approval_result<P>(text: &str, pending: &P) -> Option<ApprovalResolution>
where
    P: PendingApprovals + ?Sized,
{
    if pending.is_empty() {
        return None;
    }

    let id = match_full_id(text, pending).or_else(|| match_short_id(text, pending))?;
    let action = classify_action(text);

    tracing::debug!(id = %id, action = %action, "detected approval resolution");
    Some(ApprovalResolution { id, action })
}

/// The first UUID in the text, if it is a pending key.
fn match_full_id<P>(text: &str, pending: &P) -> Option<String>
where
    P: PendingApprovals + ?Sized,
{
    let token = uuid_token().find(text)?.as_str();
    pending.contains(token).then(|| token.to_string())
}

/// First pending key that starts with the first hex run in the text, in
/// the pending set's order. Comparison is case-sensitive.
fn match_short_id<P>(text: &str, pending: &P) -> Option<String>
where
    P: PendingApprovals + ?Sized,
{
    let run = hex_run().find(text)?.as_str();
    pending
        .ids()
        .find(|id| id.starts_with(run))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::pending::PendingSet;
    use crate::approval::types::{ApprovalAction, ApprovalInfo, SentApproval};
    use chrono::Utc;

    const ID: &str = "0e9a9d4d-c7e6-4893-972f-2c80d70162c5";

    fn pending(ids: &[&str]) -> PendingSet {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let info = ApprovalInfo {
                    id: id.to_string(),
                    command: "ls".to_string(),
                    cwd: "/tmp".to_string(),
                    host: "gateway".to_string(),
                    agent: "main".to_string(),
                    security: "allowlist".to_string(),
                    ask: "on-miss".to_string(),
                    expires: "120s".to_string(),
                };
                SentApproval::new(info, i as i64 + 1, Utc::now())
            })
            .collect()
    }

    #[test]
    fn test_empty_pending_short_circuits() {
        let set = PendingSet::new();
        assert_eq!(detect_approval_result(ID, &set), None);
        assert_eq!(detect_approval_result("0e9a9d4d allowed", &set), None);
    }

    #[test]
    fn test_full_id_with_actions() {
        let set = pending(&[ID]);
        for (text, action) in [
            (format!("Exec allowed: {}", ID), ApprovalAction::AllowOnce),
            (format!("allow-always for {}", ID), ApprovalAction::AllowAlways),
            (format!("Exec denied: {}", ID), ApprovalAction::Deny),
        ] {
            let result = detect_approval_result(&text, &set).unwrap();
            assert_eq!(result.id, ID);
            assert_eq!(result.action, action, "{}", text);
        }
    }

    #[test]
    fn test_full_id_not_pending() {
        let set = pending(&[ID]);
        let text = "Exec allowed: aaaabbbb-cccc-dddd-eeee-ffffffffffff";
        assert_eq!(detect_approval_result(text, &set), None);
    }

    #[test]
    fn test_only_first_uuid_is_considered() {
        let set = pending(&[ID]);
        let text = format!("stale 11111111-2222-3333-4444-555555555555 then {}", ID);
        assert_eq!(detect_approval_result(&text, &set), None);
    }

    #[test]
    fn test_full_id_beats_prefix() {
        let other = "0e9a9d4d-0000-0000-0000-000000000000";
        let set = pending(&[other, ID]);
        let text = format!("0e9a9d4d ... resolved {}", ID);
        assert_eq!(detect_approval_result(&text, &set).unwrap().id, ID);
    }

    #[test]
    fn test_short_id() {
        let set = pending(&[ID]);
        let result = detect_approval_result("Allowed 0e9a9d4d", &set).unwrap();
        assert_eq!(result.id, ID);
        assert_eq!(result.action, ApprovalAction::AllowOnce);
    }

    #[test]
    fn test_short_id_ambiguity_takes_first_pending() {
        let first = "abcdef12-1111-4111-8111-111111111111";
        let second = "abcdef12-2222-4222-8222-222222222222";
        let set = pending(&[second, first]);
        let result = detect_approval_result("denied abcdef12", &set).unwrap();
        assert_eq!(result.id, second);
        assert_eq!(result.action, ApprovalAction::Deny);
    }

    #[test]
    fn test_short_id_must_be_standalone() {
        let set = pending(&[ID]);
        assert_eq!(detect_approval_result("ref x0e9a9d4d", &set), None);
        assert_eq!(detect_approval_result("ref 0e9a9d4dz", &set), None);
        assert_eq!(detect_approval_result("ref 0e9a9d4", &set), None);
    }

    #[test]
    fn test_short_id_is_case_sensitive() {
        let set = pending(&[ID]);
        assert_eq!(detect_approval_result("Allowed 0E9A9D4D", &set), None);
    }

    #[test]
    fn test_only_first_hex_run_is_considered() {
        let set = pending(&[ID]);
        let result = detect_approval_result("build deadbeef00 ok, 0e9a9d4d approved", &set);
        assert_eq!(result, None);
    }

    #[test]
    fn test_no_match() {
        let set = pending(&[ID]);
        assert_eq!(detect_approval_result("Hello world", &set), None);
        assert_eq!(detect_approval_result("Check abcdef0123456789 status", &set), None);
    }

    #[test]
    fn test_works_on_slices() {
        let set = pending(&[ID]);
        let entries: Vec<SentApproval> = set.into();
        let result = detect_approval_result(&format!("deny {}", ID), entries.as_slice());
        assert_eq!(result.unwrap().action, ApprovalAction::Deny);
    }
}

//! execwatch reads the exec approval notices an automation gateway posts
//! to chat, and spots the follow-up messages that resolve them.
//!
//! The core (`approval`) is pure and synchronous: `parse_approval_text`
//! turns a notice into an `ApprovalInfo`, `detect_approval_result` checks a
//! later message against the caller's pending requests. The binary in
//! `main.rs` wraps both in a small CLI.

pub mod approval;
pub mod cli;
pub mod utils;

pub use approval::{
    classify_action, detect_approval_result, parse_approval_text, ApprovalAction, ApprovalInfo,
    ApprovalResolution, PendingApprovals, PendingSet, SentApproval,
};

//! `execwatch detect`: check one message against a snapshot of pending
//! approvals.

use crate::approval::{detect_approval_result, PendingSet};
use crate::cli::read_input;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Load a pending snapshot: a JSON array of `SentApproval`, oldest first.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<PendingSet> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pending snapshot: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid pending snapshot: {}", path.display()))
}

/// Run the `execwatch detect` command.
/// Returns `false` when the message resolves nothing in the snapshot.
pub fn run_detect(snapshot: &Path, text: Option<&str>) -> Result<bool> {
    let pending = load_snapshot(snapshot)?;
    let text = match text {
        Some(text) => text.to_string(),
        None => read_input(None)?,
    };

    tracing::debug!("checking message against {} pending approvals", pending.len());

    match detect_approval_result(&text, &pending) {
        Some(resolution) => {
            println!("{}", serde_json::to_string(&resolution)?);
            Ok(true)
        }
        None => {
            eprintln!(
                "  {} No pending approval referenced ({} pending).",
                "ℹ".blue(),
                pending.len()
            );
            Ok(false)
        }
    }
}

//! Parser for the gateway's plain-text exec approval notice.
//!
//! # Example notice:
//! ```text
//! 🔒 Exec approval required
//!
//! Agent: main
//! Host: gateway
//! CWD: /home/user/.openclaw/workspace
//!
//! Command: `docker compose logs --tail 50 nginx`
//!
//! Security: allowlist
//! Ask: on-miss
//! Expires in: 120s
//! ID: 0e9a9d4d-c7e6-4893-972f-2c80d70162c5
//! ```
//!
//! The parser is lenient: only the marker phrase and the `ID:` line are
//! required. Everything else falls back to the defaults in `Field`.

use crate::approval::fields::{extract_or_default, is_field_line, Field};
use crate::approval::types::ApprovalInfo;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

/// Maximum number of backticks in a command fence.
const MAX_FENCE: usize = 3;

fn marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)exec\s+approval\s+required").expect("valid marker regex"))
}

fn id_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*ID:[ \t]*([a-f0-9-]+)").expect("valid id regex"))
}

fn command_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*Command:[ \t]*").expect("valid command regex"))
}

/// A command recovered from the notice, with the byte offset where its
/// source text ends.
struct ExtractedCommand {
    command: String,
    end: usize,
}

/// A way of reading the command, given the text and the offset right after
/// the `Command:` label.
type CommandStrategy = fn(&str, usize) -> Option<ExtractedCommand>;

/// Tried in order; the first strategy that yields a non-empty command wins.
const COMMAND_STRATEGIES: &[CommandStrategy] = &[fenced_command, inline_command];

/// Returns true if the text looks like an approval notice at all.
/// Cheap check for rejecting unrelated chat traffic.
pub fn is_approval_notice(text: &str) -> bool {
    marker().is_match(text)
}

/// Parse a gateway approval notice into an `ApprovalInfo`.
///
/// Returns `None` if the marker phrase or the `ID:` line is missing.
/// Missing optional fields never fail the parse.
pub fn parse_approval_text(text: &str) -> Option<ApprovalInfo> {
    if !is_approval_notice(text) {
        tracing::trace!("not an approval notice");
        return None;
    }

    let (command, span) = match locate_command(text) {
        Some((command, span)) => (command, Some(span)),
        None => (Field::Command.default_value().to_string(), None),
    };

    // Fields are read with the command body cut out, so label-like lines
    // inside a multi-line command can't shadow the real ones.
    let fields = match span {
        Some(span) => Cow::Owned(format!("{}\n{}", &text[..span.start], &text[span.end..])),
        None => Cow::Borrowed(text),
    };

    let Some(id) = extract_id(&fields) else {
        tracing::debug!("approval notice without an ID line, ignoring");
        return None;
    };

    let info = ApprovalInfo {
        id,
        command,
        cwd: extract_or_default(&fields, Field::Cwd),
        host: extract_or_default(&fields, Field::Host),
        agent: extract_or_default(&fields, Field::Agent),
        security: extract_or_default(&fields, Field::Security),
        ask: extract_or_default(&fields, Field::Ask),
        expires: extract_or_default(&fields, Field::Expires),
    };

    tracing::debug!(id = %info.id, agent = %info.agent, "parsed approval notice");
    Some(info)
}

fn extract_id(text: &str) -> Option<String> {
    id_line()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .find(|token| token.chars().any(|c| c.is_ascii_hexdigit()))
        .map(str::to_string)
}

/// Find the command and the byte range (label included) it occupies.
fn locate_command(text: &str) -> Option<(String, Range<usize>)> {
    command_label().find_iter(text).find_map(|label| {
        COMMAND_STRATEGIES.iter().find_map(|strategy| {
            strategy(text, label.end())
                .map(|extracted| (extracted.command, label.start()..extracted.end))
        })
    })
}

/// A command wrapped in up to three backticks, e.g. `` `ls` `` or a
/// ```` ``` ```` block spanning several lines. The block may also start on
/// the line after the label. Without a closing fence the block ends at the
/// first blank line or the next `Label:` line.
fn fenced_command(text: &str, start: usize) -> Option<ExtractedCommand> {
    let rest = &text[start..];
    let label_line_end = rest.find('\n').unwrap_or(rest.len());

    // Content may start on the next line when the label line is otherwise empty
    let mut pos = if rest[..label_line_end].trim().is_empty() {
        (label_line_end + 1).min(rest.len())
    } else {
        0
    };
    pos += leading_blanks(&rest[pos..]);

    let fence = rest[pos..]
        .bytes()
        .take_while(|&b| b == b'`')
        .take(MAX_FENCE)
        .count();

    if fence == 0 {
        // Same-line text without a fence is the inline strategy's job
        if pos < label_line_end {
            return None;
        }
        let body_end = pos + unterminated_block_len(&rest[pos..], true);
        return finish(&rest[pos..body_end], start + body_end);
    }

    let body_start = pos + fence;
    let closing = "`".repeat(fence);
    let search_limit = if fence == MAX_FENCE {
        rest.len()
    } else {
        rest[body_start..]
            .find('\n')
            .map_or(rest.len(), |i| body_start + i)
    };

    match rest[body_start..search_limit].find(&closing) {
        Some(i) => {
            let body_end = body_start + i;
            finish(&rest[body_start..body_end], start + body_end + fence)
        }
        // Short fences never span lines
        None if fence < MAX_FENCE => finish(&rest[body_start..search_limit], start + search_limit),
        None => {
            let body_end = body_start + unterminated_block_len(&rest[body_start..], false);
            finish(&rest[body_start..body_end], start + body_end)
        }
    }
}

/// The rest of the `Command:` line, minus any stray backticks.
fn inline_command(text: &str, start: usize) -> Option<ExtractedCommand> {
    let rest = &text[start..];
    let line_end = rest.find('\n').unwrap_or(rest.len());
    finish(rest[..line_end].trim().trim_matches('`'), start + line_end)
}

fn finish(body: &str, end: usize) -> Option<ExtractedCommand> {
    let command = body.trim();
    if command.is_empty() {
        return None;
    }
    Some(ExtractedCommand {
        command: command.to_string(),
        end,
    })
}

fn leading_blanks(s: &str) -> usize {
    s.bytes().take_while(|&b| b == b' ' || b == b'\t').count()
}

/// Length of a block with no closing fence: it runs until a blank line,
/// a notice `Label:` line, or the end of the text. `check_first` is false
/// when the first line is the remainder of an opening fence line.
fn unterminated_block_len(s: &str, check_first: bool) -> usize {
    let mut len = 0;
    for (i, line) in s.split_inclusive('\n').enumerate() {
        if (i > 0 || check_first) && (line.trim().is_empty() || is_field_line(line)) {
            break;
        }
        len += line.len();
    }
    len
}

//! `execwatch watch`: follow a stream of chat messages and keep track of
//! which approval requests are still open.
//!
//! Input is one JSON object per line:
//! ```json
//! {"text": "🔒 Exec approval required\n...", "message_id": 42, "at": "2026-03-01T09:00:00Z"}
//! ```
//! `message_id` defaults to the line number and `at` to the current time.
//! Every state change is written to stdout as a JSON line tagged by
//! `"event"`: `pending`, `resolved` or `expired`.

use crate::approval::{
    detect_approval_result, parse_approval_text, ApprovalAction, ApprovalInfo, PendingSet,
    SentApproval,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Options for the `execwatch watch` command.
#[derive(Debug)]
pub struct WatchOptions {
    /// Message stream to read (default: stdin)
    pub input: Option<PathBuf>,
    /// Lifetime for requests whose `expires` field can't be read
    pub default_ttl: Duration,
    /// Whether to drop requests once they lapse
    pub expire: bool,
    /// Print counters to stderr at the end
    pub summary: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            input: None,
            default_ttl: Duration::seconds(120),
            expire: true,
            summary: false,
        }
    }
}

/// One message from the input stream.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub text: String,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

/// A change to the set of pending approvals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// A new notice was seen and is now pending
    Pending {
        message_id: i64,
        expires_at: DateTime<Utc>,
        info: ApprovalInfo,
    },
    /// A pending request was answered
    Resolved {
        id: String,
        action: ApprovalAction,
        /// The message that announced the request
        message_id: i64,
        command: String,
    },
    /// A pending request lapsed without an answer
    Expired { id: String, message_id: i64 },
}

/// Counters for one run of `execwatch watch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub messages: usize,
    pub skipped: usize,
    pub announced: usize,
    pub resolved: usize,
    pub expired: usize,
    pub still_pending: usize,
}

impl WatchSummary {
    /// Counters in display order, each with its label.
    fn counters(&self) -> [(usize, &'static str); 5] {
        [
            (self.messages, "messages"),
            (self.announced, "announced"),
            (self.resolved, "resolved"),
            (self.expired, "expired"),
            (self.still_pending, "still pending"),
        ]
    }

    pub fn one_line(&self) -> String {
        self.counters()
            .iter()
            .map(|(count, label)| format!("{} {}", count, label))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    fn record(&mut self, event: &WatchEvent) {
        match event {
            WatchEvent::Pending { .. } => self.announced += 1,
            WatchEvent::Resolved { .. } => self.resolved += 1,
            WatchEvent::Expired { .. } => self.expired += 1,
        }
    }
}

/// Owns the pending set and applies each message to it: the part of the
/// system that forwards notices and does the bookkeeping around the parser
/// and detector.
#[derive(Debug)]
pub struct Tracker {
    pending: PendingSet,
    default_ttl: Duration,
    expire: bool,
}

impl Tracker {
    pub fn new(default_ttl: Duration, expire: bool) -> Self {
        Self {
            pending: PendingSet::new(),
            default_ttl,
            expire,
        }
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    /// Apply one message. `fallback_id` is used when the message carries no
    /// id, `now` when it carries no timestamp.
    pub fn handle(
        &mut self,
        message: &IncomingMessage,
        fallback_id: i64,
        now: DateTime<Utc>,
    ) -> Vec<WatchEvent> {
        let at = message.at.unwrap_or(now);
        let message_id = message.message_id.unwrap_or(fallback_id);
        let mut events = Vec::new();

        if self.expire {
            for lapsed in self.pending.expire(at, self.default_ttl) {
                tracing::info!("Approval {} expired unanswered", lapsed.id());
                events.push(WatchEvent::Expired {
                    id: lapsed.info.id,
                    message_id: lapsed.message_id,
                });
            }
        }

        if let Some(info) = parse_approval_text(&message.text) {
            let entry = SentApproval::new(info.clone(), message_id, at);
            let expires_at = entry.expires_at(self.default_ttl);
            if self.pending.insert(entry).is_some() {
                tracing::debug!("Approval {} announced again, replacing", info.id);
            }
            events.push(WatchEvent::Pending {
                message_id,
                expires_at,
                info,
            });
        } else if let Some(resolution) = detect_approval_result(&message.text, &self.pending) {
            if let Some(entry) = self.pending.remove(&resolution.id) {
                tracing::info!("Approval {} resolved: {}", resolution.id, resolution.action);
                events.push(WatchEvent::Resolved {
                    id: resolution.id,
                    action: resolution.action,
                    message_id: entry.message_id,
                    command: entry.info.command,
                });
            }
        }

        events
    }
}

/// Feed a JSON-lines message stream through `tracker`, writing one JSON
/// line per event to `writer`. Malformed lines are logged and skipped.
pub async fn process_stream<R, W>(
    reader: R,
    writer: &mut W,
    tracker: &mut Tracker,
) -> Result<WatchSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = WatchSummary::default();
    let mut lines = reader.lines();
    let mut line_no: i64 = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read message stream")?
    {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: IncomingMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Skipping line {}: invalid message JSON: {}", line_no, e);
                summary.skipped += 1;
                continue;
            }
        };
        summary.messages += 1;

        for event in tracker.handle(&message, line_no, Utc::now()) {
            summary.record(&event);
            let json = serde_json::to_string(&event)?;
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;
    }

    summary.still_pending = tracker.pending().len();
    Ok(summary)
}

/// Run the `execwatch watch` command.
pub async fn run_watch(options: WatchOptions) -> Result<WatchSummary> {
    let mut tracker = Tracker::new(options.default_ttl, options.expire);
    let mut stdout = tokio::io::stdout();

    let summary = match &options.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open message stream: {}", path.display()))?;
            process_stream(BufReader::new(file), &mut stdout, &mut tracker).await?
        }
        None => process_stream(BufReader::new(tokio::io::stdin()), &mut stdout, &mut tracker).await?,
    };

    tracing::info!("Watch finished: {}", summary.one_line());
    if options.summary {
        print_summary(&summary);
    }
    Ok(summary)
}

fn print_summary(summary: &WatchSummary) {
    eprintln!();
    let colors = [
        Color::White,
        Color::Yellow,
        Color::Green,
        Color::Red,
        Color::Cyan,
    ];
    let line = summary
        .counters()
        .iter()
        .zip(colors)
        .map(|((count, label), color)| {
            format!("{} {}", count.to_string().color(color).bold(), label)
        })
        .collect::<Vec<_>>()
        .join(" | ");
    eprintln!("  {}", line);
    if summary.skipped > 0 {
        eprintln!(
            "  {} {} malformed lines skipped",
            "⚠".yellow(),
            summary.skipped
        );
    }
    eprintln!();
}

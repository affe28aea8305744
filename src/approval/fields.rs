//! `Label: value` field extraction for gateway approval notices.
//!
//! Every optional field has one label and one default, kept together in
//! `Field` so the defaults can be audited in one place. Labels only match at
//! the start of a line (after optional indentation), so text like
//! `grep Host: config` inside a command never populates `host`.

use regex::Regex;
use std::sync::OnceLock;

/// The optional labelled fields of an approval notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Command,
    Cwd,
    Host,
    Agent,
    Security,
    Ask,
    Expires,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Command,
        Field::Cwd,
        Field::Host,
        Field::Agent,
        Field::Security,
        Field::Ask,
        Field::Expires,
    ];

    /// The label text as the gateway prints it (without the colon).
    pub fn label(self) -> &'static str {
        match self {
            Field::Command => "Command",
            Field::Cwd => "CWD",
            Field::Host => "Host",
            Field::Agent => "Agent",
            Field::Security => "Security",
            Field::Ask => "Ask",
            Field::Expires => "Expires in",
        }
    }

    /// Value used when the label is missing from the notice.
    pub fn default_value(self) -> &'static str {
        match self {
            Field::Command => "unknown",
            Field::Cwd => "unknown",
            Field::Host => "gateway",
            Field::Agent => "main",
            Field::Security => "allowlist",
            Field::Ask => "on-miss",
            Field::Expires => "120s",
        }
    }

    fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            Field::ALL
                .iter()
                .map(|field| label_pattern(field.label()))
                .collect()
        });
        &patterns[self as usize]
    }
}

/// Build `^<indent>Label:<rest of line>` for a label. Words of a multi-word
/// label may be separated by any run of spaces or tabs.
fn label_pattern(label: &str) -> Regex {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let pattern = format!(r"(?im)^[ \t]*{}:(.*)$", words.join(r"[ \t]+"));
    Regex::new(&pattern).expect("label patterns are built from fixed labels")
}

fn id_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| label_pattern("ID"))
}

/// Return the trimmed value of the first non-empty `Label:` line for `field`.
pub fn extract_field(text: &str, field: Field) -> Option<String> {
    field
        .pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Like `extract_field`, falling back to the field's documented default.
pub fn extract_or_default(text: &str, field: Field) -> String {
    extract_field(text, field).unwrap_or_else(|| field.default_value().to_string())
}

/// Whether `line` is one of the notice's own `Label:` lines (including `ID:`).
pub fn is_field_line(line: &str) -> bool {
    id_label().is_match(line) || Field::ALL.iter().any(|f| f.pattern().is_match(line))
}

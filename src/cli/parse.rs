//! `execwatch parse`: show what a gateway notice says.

use crate::approval::{parse_approval_text, ApprovalInfo};
use crate::cli::read_input;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

/// Run the `execwatch parse` command.
/// Returns `false` when the input is not an approval notice.
pub fn run_parse(input: Option<&Path>, json: bool) -> Result<bool> {
    let text = read_input(input)?;

    let Some(info) = parse_approval_text(&text) else {
        eprintln!(
            "  {} Not an exec approval notice (needs the marker line and an ID).",
            "ℹ".blue()
        );
        return Ok(false);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_card(&info);
    }
    Ok(true)
}

fn print_card(info: &ApprovalInfo) {
    println!();
    println!("  {}  {}", "🔒".bold(), "Exec approval required".yellow().bold());
    println!(
        "  {}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed()
    );
    println!("  ID:       {}", info.id.cyan());
    println!("  Agent:    {}", info.agent);
    println!("  Host:     {}", info.host);
    println!("  CWD:      {}", info.cwd.dimmed());
    println!("  Security: {}", info.security);
    println!("  Ask:      {}", info.ask);
    println!("  Expires:  {}", info.expires);
    println!();

    let mut lines = info.command.lines();
    if let Some(first) = lines.next() {
        println!("  Command:  {}", first.bold());
    }
    for line in lines {
        println!("            {}", line.bold());
    }
    println!();
}

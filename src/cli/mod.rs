pub mod detect;
pub mod parse;
pub mod watch;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Read a whole message from a file, or from stdin when no file (or `-`)
/// is given.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read message file: {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read message from stdin")?;
            Ok(text)
        }
    }
}

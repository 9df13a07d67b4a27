//! Inspect command implementation.

use super::{open_existing, CommandResult};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// File inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// File path.
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    /// Number of `\n` bytes.
    pub line_count: u64,
    /// Whether the last byte is `\n`.
    pub ends_with_newline: bool,
    /// Whether the whole file is valid UTF-8.
    pub utf8: bool,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> CommandResult {
    info!("Inspecting {:?}", path);
    let result = inspect(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Scans the file at `path`.
pub fn inspect(path: &Path) -> CommandResult<InspectResult> {
    let mut store = open_existing(path)?;
    let size = store.size()?;

    let mut line_count = 0;
    while let Some(index) = store.index_of(b'\n')? {
        store.skip(index + 1)?;
        line_count += 1;
    }

    let ends_with_newline = if size > 0 {
        store.seek(size - 1)?;
        store.read_byte()? == b'\n'
    } else {
        false
    };

    store.seek(0)?;
    let utf8 = String::from_utf8(store.read_to_vec()?).is_ok();
    store.close()?;

    Ok(InspectResult {
        path: path.display().to_string(),
        size,
        line_count,
        ends_with_newline,
        utf8,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("bistore File Inspection");
    println!("=======================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("  Size:          {}", format_size(result.size));
    println!("  Lines:         {}", result.line_count);
    println!("  Trailing \\n:   {}", result.ends_with_newline);
    println!("  Valid UTF-8:   {}", result.utf8);
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

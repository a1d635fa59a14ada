// src/csv/writer.rs
use std::collections::HashMap;

use chrono::{NaiveDate, SecondsFormat, TimeZone, Utc};

use crate::entity::{Category, Prompt, Timestamp, UNCATEGORIZED};
use crate::error::{Result, VaultError};

/// Column order of every exported file
pub const HEADERS: [&str; 8] = [
    "Title",
    "Content",
    "Category",
    "Tags",
    "Favorite",
    "IsTemplate",
    "Created Date",
    "Updated Date",
];

const TAG_SEPARATOR: &str = "; ";

/// Which export produced a file; only affects the suggested filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Every prompt in the vault
    Backup,
    /// A user-selected subset
    Selection,
}

/// Suggested filename, e.g. `promptvault-backup-2025-03-01.csv`.
pub fn export_filename(kind: ExportKind, date: NaiveDate) -> String {
    let label = match kind {
        ExportKind::Backup => "backup",
        ExportKind::Selection => "export",
    };
    format!("promptvault-{}-{}.csv", label, date.format("%Y-%m-%d"))
}

/// Double any embedded quotes. The caller wraps the result in quotes.
pub fn escape_cell(value: &str) -> String {
    value.replace('"', "\"\"")
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_cell(value))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Render epoch millis the way browsers print `Date.toISOString()`.
pub fn format_timestamp(millis: Timestamp) -> Result<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or(VaultError::InvalidTimestamp(millis))
}

/// Serialize prompts to CSV text, one header row plus one row per prompt.
///
/// Category ids are resolved to names against `categories`; empty or
/// dangling ids export as `Uncategorized`. Every row ends with `\n`.
pub fn export_prompts_to_csv(prompts: &[Prompt], categories: &[Category]) -> Result<String> {
    let names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    let mut out = String::new();
    let header: Vec<String> = HEADERS.iter().map(|h| quoted(h)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for prompt in prompts {
        let category = names
            .get(prompt.category_id.as_str())
            .copied()
            .unwrap_or(UNCATEGORIZED);

        let row = [
            quoted(&prompt.title),
            quoted(&prompt.content),
            quoted(category),
            quoted(&prompt.tags.join(TAG_SEPARATOR)),
            yes_no(prompt.is_favorite).to_string(),
            yes_no(prompt.is_template).to_string(),
            quoted(&format_timestamp(prompt.created_at)?),
            quoted(&format_timestamp(prompt.updated_at)?),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    Ok(out)
}

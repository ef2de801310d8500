//! Shared output formatting for query commands.

use perinote_core::periodic::PeriodicNoteEntry;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// Formatted entry for JSON output.
#[derive(Debug, Serialize)]
pub struct EntryOutput {
    pub path: String,
    pub granularity: String,
    pub date: String,
    pub source: String,
    pub exact: bool,
}

impl From<&PeriodicNoteEntry> for EntryOutput {
    fn from(entry: &PeriodicNoteEntry) -> Self {
        Self {
            path: entry.file_path.clone(),
            granularity: entry.granularity.to_string(),
            date: entry.canonical_date_key.clone(),
            source: entry.match_source.as_str().to_string(),
            exact: entry.is_exact,
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Granularity")]
    granularity: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Source")]
    source: String,
}

/// Print entries as a table.
pub fn print_entries_table(entries: &[&PeriodicNoteEntry]) {
    if entries.is_empty() {
        println!("(no periodic notes found)");
        return;
    }

    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            granularity: e.granularity.to_string(),
            date: e.canonical_date_key.clone(),
            path: e.file_path.clone(),
            source: e.match_source.as_str().to_string(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// Print entries as a JSON array.
pub fn print_entries_json(entries: &[&PeriodicNoteEntry]) {
    let output: Vec<EntryOutput> = entries.iter().map(|e| EntryOutput::from(*e)).collect();
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}

pub fn print_entries(entries: &[&PeriodicNoteEntry], json: bool) {
    if json {
        print_entries_json(entries);
    } else {
        print_entries_table(entries);
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use dock_core::Message;
use dock_storage::ProjectRecord;

use crate::color;
use crate::table::{Column, Table};

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One progress line for a message seen while following a project.
pub fn event_line(label: &str, message: &Message) -> String {
    format!("{}  {}", color::muted(label), message.log_summary())
}

pub fn event_json(label: &str, message: &Message) -> serde_json::Value {
    serde_json::json!({
        "project": label,
        "type": message.name(),
        "tid": message.tid.as_str(),
        "summary": message.log_summary(),
    })
}

pub fn print_event(format: OutputFormat, label: &str, message: &Message) {
    match format {
        OutputFormat::Text => println!("{}", event_line(label, message)),
        OutputFormat::Json => println!("{}", event_json(label, message)),
    }
}

/// Where a project lives: its remote for managed projects, else its path.
pub fn location(record: &ProjectRecord) -> String {
    match (&record.url, &record.path) {
        (Some(url), _) if record.managed => dock_core::git_url::redact(url),
        (_, Some(path)) => path.display().to_string(),
        (Some(url), None) => dock_core::git_url::redact(url),
        (None, None) => "-".to_string(),
    }
}

pub fn project_table(records: &[ProjectRecord]) -> Table {
    let mut table = Table::new(vec![
        Column::muted("ID"),
        Column::plain("NAME").with_max(40),
        Column::status("STATE"),
        Column::plain("KIND"),
        Column::plain("LOCATION"),
    ]);
    for record in records {
        table.row(project_row(record));
    }
    table
}

pub fn project_row(record: &ProjectRecord) -> Vec<String> {
    vec![
        record.id.short(8).to_string(),
        record.name.clone().unwrap_or_else(|| "-".to_string()),
        record.state.as_str().to_string(),
        if record.managed { "managed" } else { "unmanaged" }.to_string(),
        location(record),
    ]
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Column-aligned rendering for `dock list`.

use std::io::Write;

use crate::color;

/// How a cell's text is styled after padding.
pub enum CellStyle {
    Plain,
    Muted,
    /// Colored by project state.
    Status,
}

pub struct Column {
    pub name: &'static str,
    pub style: CellStyle,
    /// Values longer than this are truncated.
    pub max_width: Option<usize>,
}

impl Column {
    pub fn plain(name: &'static str) -> Self {
        Column { name, style: CellStyle::Plain, max_width: None }
    }

    pub fn muted(name: &'static str) -> Self {
        Column { name, style: CellStyle::Muted, max_width: None }
    }

    pub fn status(name: &'static str) -> Self {
        Column { name, style: CellStyle::Status, max_width: None }
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max_width = Some(max);
        self
    }
}

pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    colorize: bool,
}

const SEP: &str = "  ";

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Table { columns, rows: Vec::new(), colorize: color::should_colorize() }
    }

    #[cfg(test)]
    pub fn plain(columns: Vec<Column>) -> Self {
        Table { columns, rows: Vec::new(), colorize: false }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    /// Header plus rows. The last column is never padded and color is
    /// applied after padding.
    pub fn render(&self, out: &mut impl Write) {
        if self.rows.is_empty() {
            return;
        }
        let widths = self.widths();
        let last = self.columns.len().saturating_sub(1);

        let header: Vec<String> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let text = if i == last { col.name.to_string() } else { pad(col.name, widths[i]) };
                if self.colorize {
                    color::apply_header(&text)
                } else {
                    text
                }
            })
            .collect();
        let _ = writeln!(out, "{}", header.join(SEP).trim_end());

        for row in &self.rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| {
                    let raw = truncate(row.get(i).map(String::as_str).unwrap_or(""), col.max_width);
                    let text = if i == last { raw.to_string() } else { pad(raw, widths[i]) };
                    stylize(&text, &col.style, self.colorize)
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join(SEP).trim_end());
        }
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let data = self
                    .rows
                    .iter()
                    .map(|row| {
                        let len = row.get(i).map(|s| s.chars().count()).unwrap_or(0);
                        col.max_width.map_or(len, |max| len.min(max))
                    })
                    .max()
                    .unwrap_or(0);
                col.name.len().max(data)
            })
            .collect()
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

fn truncate(text: &str, max: Option<usize>) -> &str {
    match max {
        Some(max) => match text.char_indices().nth(max) {
            Some((at, _)) => &text[..at],
            None => text,
        },
        None => text,
    }
}

fn stylize(text: &str, style: &CellStyle, colorize: bool) -> String {
    if !colorize {
        return text.to_string();
    }
    match style {
        CellStyle::Plain => text.to_string(),
        CellStyle::Muted => color::apply_muted(text),
        CellStyle::Status => color::apply_status(text),
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-file entries of a working-copy vs. upstream comparison

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Modified,
    Deleted,
}

impl DiffStatus {
    /// Maps a `git diff --raw` status letter. Renames, copies and type
    /// changes all count as modifications.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'A' => Some(DiffStatus::Added),
            'D' => Some(DiffStatus::Deleted),
            'M' | 'R' | 'C' | 'T' => Some(DiffStatus::Modified),
            _ => None,
        }
    }
}

/// One changed file. `sha` is the local blob, `sha1` the upstream blob,
/// `size` the number of changed lines (0 for binary files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFile {
    pub path: String,
    pub sha: String,
    pub sha1: String,
    pub size: u64,
    pub status: DiffStatus,
    #[serde(default)]
    pub hunks: Vec<String>,
}

/// Parse the combined output of `git diff --raw --numstat`.
///
/// Raw lines (`:100644 100644 <sha> <sha1> M\t<path>`) define the entries;
/// numstat lines (`<added>\t<deleted>\t<path>`) fill in `size`.
pub fn parse_raw_numstat(output: &str) -> Vec<DiffFile> {
    let mut files: Vec<DiffFile> = Vec::new();
    for line in output.lines() {
        if let Some(raw) = line.strip_prefix(':') {
            if let Some(file) = parse_raw_line(raw) {
                files.push(file);
            }
            continue;
        }
        let mut cols = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (cols.next(), cols.next(), cols.next())
        else {
            continue;
        };
        let size = added.parse::<u64>().unwrap_or(0) + deleted.parse::<u64>().unwrap_or(0);
        let path = numstat_path(path);
        if let Some(file) = files.iter_mut().find(|f| f.path == path) {
            file.size = size;
        }
    }
    files
}

fn parse_raw_line(raw: &str) -> Option<DiffFile> {
    let (meta, paths) = raw.split_once('\t')?;
    let mut fields = meta.split_whitespace();
    let _old_mode = fields.next()?;
    let _new_mode = fields.next()?;
    let sha = fields.next()?;
    let sha1 = fields.next()?;
    let status = DiffStatus::from_code(fields.next()?)?;
    // renames and copies list "<from>\t<to>"; the entry is keyed by the destination
    let path = paths.rsplit('\t').next()?;
    Some(DiffFile {
        path: path.to_string(),
        sha: sha.to_string(),
        sha1: sha1.to_string(),
        size: 0,
        status,
        hunks: Vec::new(),
    })
}

/// numstat renders renames as `dir/{old => new}` or `old => new`.
fn numstat_path(path: &str) -> String {
    let Some((head, tail)) = path.split_once(" => ") else {
        return path.to_string();
    };
    match (head.rfind('{'), tail.find('}')) {
        (Some(open), Some(close)) => {
            format!("{}{}{}", &head[..open], &tail[..close], &tail[close + 1..])
        }
        _ => tail.to_string(),
    }
}

/// Attach `@@` hunk headers from a `git diff -U0` patch to the matching entries.
pub fn attach_hunks(files: &mut [DiffFile], patch: &str) {
    let mut current: Option<usize> = None;
    for line in patch.lines() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            let target = rest.rsplit(" b/").next().unwrap_or_default();
            current = files.iter().position(|f| f.path == target);
        } else if line.starts_with("@@") {
            if let Some(index) = current {
                files[index].hunks.push(line.to_string());
            }
        }
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value store with two entries: `projects` and `input`.
//!
//! The whole document is rewritten on save (write to .tmp, fsync, rename).
//! A document that fails to decode is moved aside to a rotating `.bak`
//! file and the store starts empty.

use crate::ProjectRecord;
use chrono::{DateTime, Utc};
use dock_core::codec::{self, CodecError};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

pub const CURRENT_STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("store version {found} is newer than supported version {supported}")]
    TooNew { found: u32, supported: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    /// Last URL typed by the user.
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        StoreDocument {
            version: CURRENT_STORE_VERSION,
            projects: Vec::new(),
            input: String::new(),
            saved_at: None,
        }
    }
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    doc: StoreDocument,
}

impl Store {
    /// Load the store at `path`, or start empty if there is none yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Store, StoreError> {
        let path = path.into();
        let doc = load(&path)?.unwrap_or_default();
        Ok(Store { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[ProjectRecord] {
        &self.doc.projects
    }

    pub fn set_projects(&mut self, projects: Vec<ProjectRecord>) {
        self.doc.projects = projects;
    }

    pub fn input(&self) -> &str {
        &self.doc.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.doc.input = input.into();
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.doc.saved_at
    }

    pub fn document(&self) -> &StoreDocument {
        &self.doc
    }

    /// Write the document atomically.
    pub fn save(&mut self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.doc.version = CURRENT_STORE_VERSION;
        self.doc.saved_at = Some(Utc::now());
        let text = codec::encode_pretty(&self.doc)?;

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn load(path: &Path) -> Result<Option<StoreDocument>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match codec::decode::<StoreDocument>(&text) {
        Ok(doc) if doc.version > CURRENT_STORE_VERSION => {
            Err(StoreError::TooNew { found: doc.version, supported: CURRENT_STORE_VERSION })
        }
        Ok(doc) => Ok(Some(doc)),
        Err(e) => {
            let bak_path = rotate_bak_path(path);
            warn!(
                error = %e,
                path = %path.display(),
                bak = %bak_path.display(),
                "Corrupt store, moving to .bak and starting fresh",
            );
            fs::rename(path, &bak_path)?;
            Ok(None)
        }
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

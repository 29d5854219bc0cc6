// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{Body, Message};
use crate::git_url;

impl Message {
    /// One-line description for tracing: wire tag, short tid and the
    /// fields worth seeing in a log.
    pub fn log_summary(&self) -> String {
        let head = format!("{} tid={}", self.name(), self.tid.short(8));
        let detail = match &self.body {
            Body::AppModulesUnpackError(m) => format!("error={}", m.error),
            Body::AppTaskDeferred(m) => format!("task={}", m.task.name()),
            Body::ProjectStartRequest(m) => format!("open={}", m.open),
            Body::ModulesStartRequest(m) => format!("open={}", m.open),
            Body::ProjectAnalyseResponse(m) => {
                format!("synced={} installed={} diff={}", m.synced, m.installed, m.diff.len())
            }
            Body::ProjectOpenRequest(m) => format!("id={}", m.id),
            Body::ProjectSaveRequest(m) => format!("url={}", git_url::redact(&m.url)),
            Body::ProjectSaveResponse(m) => format!("success={}", m.success),
            Body::ProjectSaveNotification(m) => format!("id={}", m.id),
            Body::ProjectDiscardNotification(m) => format!("id={}", m.id),
            Body::ModulesInstallErrorNotification(m) => format!("error={}", m.error),
            Body::ModulesBuildErrorNotification(m) => format!("error={}", m.error),
            Body::ModulesStartErrorNotification(m) => format!("error={}", m.error),
            Body::ModulesStartPortNotification(m) => format!("port={}", m.port),
            Body::ModulesStartStartedNotification(m) => {
                format!("id={} port={}", m.id, m.instance.port)
            }
            Body::VcsCloneStartNotification(m) => format!("path={}", m.path.display()),
            Body::VcsCloneEndNotification(m) => format!("path={}", m.path.display()),
            Body::VcsFetchEndNotification(m) => format!("commits={}", m.diff.len()),
            Body::VcsAnalyseResponse(m) => format!(
                "exists={} synced={:?} diff={}",
                m.exists,
                m.synced,
                m.diff.len()
            ),
            Body::VcsErrorNotification(m) => format!("error={}", m.error),
            Body::VcsRetryNotification(m) => format!("count={}", m.count),
            Body::VcsRemoveResponse(m) => format!("id={}", m.id),
            Body::VcsProgressNotification(m) => {
                format!("progress={}%", m.transfer_progress.percent())
            }
            Body::VcsCredentialChallenge(m) => format!("url={}", git_url::redact(&m.url)),
            Body::VcsCredentialAnswer(m) => format!("host={}", m.host),
            _ => String::new(),
        };
        if detail.is_empty() {
            head
        } else {
            format!("{head} {detail}")
        }
    }
}

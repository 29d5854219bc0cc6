// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote URL parsing for https, ssh and scp-style git remotes

/// The parts of a remote URL the orchestrator cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    /// `None` for scp-style remotes (`git@host:owner/repo.git`).
    pub scheme: Option<String>,
    pub host: String,
    pub path: String,
}

impl GitUrl {
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        if let Some((scheme, rest)) = url.split_once("://") {
            if scheme.is_empty() || scheme == "file" {
                return None;
            }
            let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
            let host = authority.rsplit('@').next().unwrap_or(authority);
            if host.is_empty() {
                return None;
            }
            return Some(GitUrl {
                scheme: Some(scheme.to_ascii_lowercase()),
                host: host.to_ascii_lowercase(),
                path: path.trim_matches('/').to_string(),
            });
        }

        // scp-like: [user@]host:path, but not a windows drive or a local path
        let (authority, path) = url.split_once(':')?;
        if authority.contains('/') || authority.len() < 2 || path.starts_with('\\') {
            return None;
        }
        let host = authority.rsplit('@').next().unwrap_or(authority);
        if host.is_empty() {
            return None;
        }
        Some(GitUrl {
            scheme: None,
            host: host.to_ascii_lowercase(),
            path: path.trim_matches('/').to_string(),
        })
    }

    pub fn is_https(&self) -> bool {
        self.scheme.as_deref() == Some("https")
    }

    /// `owner/repo`, without a trailing `.git`.
    pub fn full_name(&self) -> String {
        self.path.strip_suffix(".git").unwrap_or(&self.path).to_string()
    }

    /// Last path segment, the usual display name of a project.
    pub fn repo_name(&self) -> Option<String> {
        let full = self.full_name();
        full.rsplit('/').next().filter(|s| !s.is_empty()).map(str::to_string)
    }
}

/// Host of a remote, if it has one.
pub fn host(url: &str) -> Option<String> {
    GitUrl::parse(url).map(|u| u.host)
}

/// Rewrite an http(s) remote so the credential travels as userinfo
/// (`https://oauth2:<token>@host/path`). Other remotes are returned unchanged.
pub fn with_token(url: &str, token: &str) -> String {
    match GitUrl::parse(url) {
        Some(GitUrl { scheme: Some(scheme), host, path })
            if scheme == "https" || scheme == "http" =>
        {
            format!("{scheme}://oauth2:{token}@{host}/{path}")
        }
        _ => url.to_string(),
    }
}

/// Strip any userinfo so tokens never reach logs or persisted records.
pub fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let (authority, path) = match rest.split_once('/') {
        Some((authority, path)) => (authority, Some(path)),
        None => (rest, None),
    };
    let Some((_, host)) = authority.rsplit_once('@') else {
        return url.to_string();
    };
    match path {
        Some(path) => format!("{scheme}://{host}/{path}"),
        None => format!("{scheme}://{host}"),
    }
}

#[cfg(test)]
#[path = "git_url_tests.rs"]
mod tests;

use async_trait::async_trait;
use log::{debug, info};
use serde::Deserialize;
use tokio::sync::OnceCell;

use golink_backend::{Catalog, CatalogError, GoVersion};

pub const DEFAULT_CATALOG_URL: &str = "https://go.dev/dl/?mode=json&include=all";

#[derive(Deserialize)]
struct ReleaseEntry {
    version: String,
}

/// Strip the `go` prefix from a release name such as `go1.21.0`.
///
/// Returns `None` for names that are not releases (`gotip`, `golang`, `go`).
#[must_use]
pub fn release_name(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("go")?;
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        Some(rest)
    } else {
        None
    }
}

/// Release catalog served by the go.dev download page.
///
/// The index is fetched once per instance and reused for later lookups.
pub struct GoDevCatalog {
    client: reqwest::Client,
    url: String,
    versions: OnceCell<Vec<GoVersion>>,
}

impl GoDevCatalog {
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            versions: OnceCell::new(),
        }
    }

    async fn fetch(&self) -> Result<Vec<GoVersion>, CatalogError> {
        info!("Fetching release catalog from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| CatalogError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_snippet = response
                .text()
                .await
                .ok()
                .map(|body| response_snippet(&body, 160))
                .unwrap_or_default();
            return Err(CatalogError::HttpStatus {
                status,
                body_snippet,
            });
        }

        let entries: Vec<ReleaseEntry> = response.json().await.map_err(CatalogError::Parse)?;
        let versions = versions_from_names(entries.iter().map(|entry| entry.version.as_str()));
        debug!("Release catalog lists {} versions", versions.len());

        if versions.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(versions)
    }
}

fn versions_from_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<GoVersion> {
    let mut versions: Vec<GoVersion> = Vec::new();
    for raw in names.filter_map(release_name) {
        if !versions.iter().any(|known| known.as_str() == raw) {
            versions.push(GoVersion::parse(raw));
        }
    }
    versions
}

fn response_snippet(body: &str, max_chars: usize) -> String {
    let snippet: String = body.chars().take(max_chars).collect();
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}

#[async_trait]
impl Catalog for GoDevCatalog {
    async fn list_versions(&self) -> Result<Vec<GoVersion>, CatalogError> {
        self.versions
            .get_or_try_init(|| self.fetch())
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::{ReleaseEntry, release_name, response_snippet, versions_from_names};

    #[test]
    fn release_name_requires_go_prefix_and_digit() {
        assert_eq!(release_name("go1.21.0"), Some("1.21.0"));
        assert_eq!(release_name("go1.22rc1"), Some("1.22rc1"));
        assert_eq!(release_name("gotip"), None);
        assert_eq!(release_name("go"), None);
        assert_eq!(release_name("golang"), None);
        assert_eq!(release_name("internal"), None);
        assert_eq!(release_name("1.21.0"), None);
    }

    #[test]
    fn versions_from_index_json() {
        let json = r#"[
            {"version": "go1.22rc1", "stable": false, "files": []},
            {"version": "go1.21.6", "stable": true, "files": []},
            {"version": "gotip", "stable": false},
            {"version": "go1.21.6", "stable": true}
        ]"#;
        let entries: Vec<ReleaseEntry> = serde_json::from_str(json).expect("index parses");

        let versions = versions_from_names(entries.iter().map(|e| e.version.as_str()));
        let raw: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();

        assert_eq!(raw, ["1.22rc1", "1.21.6"]);
    }

    #[test]
    fn response_snippet_truncates_and_prefixes() {
        assert_eq!(response_snippet("", 10), "");
        assert_eq!(response_snippet("not found here", 9), ": not found");
    }
}

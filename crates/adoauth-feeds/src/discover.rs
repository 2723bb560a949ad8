//! Candidate-file discovery and feed aggregation
//!
//! Reads every candidate config file that exists (matching file names
//! case-insensitively, since package-manager config names vary across
//! platforms) and aggregates the feeds the extractors find. Discovery is
//! best-effort end to end: a missing or unreadable file, or a file the
//! extractor rejects, contributes nothing and never aborts the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use adoauth_core::{NpmFeedEntry, NugetFeedEntry, ado_feeds_from_npmrc, ado_feeds_from_nuget_config};

/// Everything discovered across all candidate files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveredFeeds {
    pub npm_feeds: Vec<NpmFeedEntry>,
    pub nuget_feeds: Vec<NugetFeedEntry>,
    /// Deduplicated union of both lists' index URLs, npm entries first,
    /// first occurrence wins. This is the order credentials are written in.
    pub all_index_urls: Vec<String>,
}

impl DiscoveredFeeds {
    pub fn is_empty(&self) -> bool {
        self.all_index_urls.is_empty()
    }
}

/// Read a candidate file, matching its name case-insensitively within the
/// containing directory. Every failure degrades to `None`.
async fn soft_read(path: &Path) -> Option<String> {
    debug!("processing file: {}", path.display());
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let wanted = path.file_name()?.to_string_lossy().to_lowercase();

    let mut entries = match tokio::fs::read_dir(&directory).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cannot list {}: {e}", directory.display());
            return None;
        }
    };
    let mut matched: Option<PathBuf> = None;
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if entry.file_name().to_string_lossy().to_lowercase() == wanted {
                    matched = Some(entry.path());
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("error listing {}: {e}", directory.display());
                return None;
            }
        }
    }
    let Some(matched) = matched else {
        debug!("file {} does not exist", path.display());
        return None;
    };

    match tokio::fs::read_to_string(&matched).await {
        Ok(content) => Some(content),
        Err(e) => {
            debug!("error reading {}: {e}", matched.display());
            None
        }
    }
}

/// Scan both candidate lists and aggregate the feeds they declare.
///
/// All file reads are issued concurrently; results keep input-list order,
/// file order within each list. Never errors.
pub async fn discover_feeds(npmrc_paths: &[PathBuf], nuget_paths: &[PathBuf]) -> DiscoveredFeeds {
    let npmrc_reads = join_all(npmrc_paths.iter().map(|path| soft_read(path)));
    let nuget_reads = join_all(nuget_paths.iter().map(|path| soft_read(path)));
    let (npmrc_contents, nuget_contents) = tokio::join!(npmrc_reads, nuget_reads);

    let mut npm_feeds: Vec<NpmFeedEntry> = Vec::new();
    for content in npmrc_contents.into_iter().flatten() {
        npm_feeds.extend(ado_feeds_from_npmrc(&content));
    }

    let mut nuget_feeds: Vec<NugetFeedEntry> = Vec::new();
    for (path, content) in nuget_paths.iter().zip(nuget_contents) {
        let Some(content) = content else { continue };
        match ado_feeds_from_nuget_config(&content) {
            Ok(feeds) => nuget_feeds.extend(feeds),
            Err(e) => debug!("skipping {}: {e}", path.display()),
        }
    }

    let mut seen = HashSet::new();
    npm_feeds.retain(|feed| seen.insert(feed.registry_url.clone()));
    let mut seen = HashSet::new();
    nuget_feeds.retain(|feed| seen.insert(feed.index_url.clone()));

    let mut all_index_urls: Vec<String> = Vec::new();
    for url in npm_feeds
        .iter()
        .map(|feed| &feed.index_url)
        .chain(nuget_feeds.iter().map(|feed| &feed.index_url))
    {
        if !all_index_urls.contains(url) {
            all_index_urls.push(url.clone());
        }
    }

    let found: Vec<&str> = all_index_urls.iter().map(String::as_str).collect();
    debug!("found ADO feed URLs: {}", found.join(", "));

    DiscoveredFeeds {
        npm_feeds,
        nuget_feeds,
        all_index_urls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const NPMRC: &str =
        "@scope:registry=https://pkgs.dev.azure.com/org/_packaging/feed/npm/registry/\n";
    const NUGET: &str = r#"<configuration>
  <packageSources>
    <add key="feed" value="https://pkgs.dev.azure.com/org/_packaging/feed/nuget/v3/index.json" />
  </packageSources>
</configuration>"#;

    #[tokio::test]
    async fn empty_inputs_discover_nothing() {
        let feeds = discover_feeds(&[], &[]).await;
        assert!(feeds.is_empty());
    }

    #[tokio::test]
    async fn reads_both_dialects() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".npmrc"), NPMRC).unwrap();
        fs::write(dir.path().join("nuget.config"), NUGET).unwrap();

        let feeds = discover_feeds(
            &[dir.path().join(".npmrc")],
            &[dir.path().join("nuget.config")],
        )
        .await;

        assert_eq!(feeds.npm_feeds.len(), 1);
        assert_eq!(feeds.nuget_feeds.len(), 1);
        // Both files name the same feed; the union holds it once, npm first.
        assert_eq!(
            feeds.all_index_urls,
            vec!["https://pkgs.dev.azure.com/org/_packaging/feed/nuget/v3/index.json"]
        );
    }

    #[tokio::test]
    async fn missing_files_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let feeds = discover_feeds(&[dir.path().join(".npmrc")], &[]).await;
        assert!(feeds.is_empty());
    }

    #[tokio::test]
    async fn matches_file_names_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("NuGet.Config"), NUGET).unwrap();

        let feeds = discover_feeds(&[], &[dir.path().join("nuget.config")]).await;
        assert_eq!(feeds.nuget_feeds.len(), 1);
    }

    #[tokio::test]
    async fn present_but_empty_equals_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".npmrc"), "").unwrap();
        let with_empty = discover_feeds(&[dir.path().join(".npmrc")], &[]).await;

        let other = tempfile::tempdir().unwrap();
        let with_absent = discover_feeds(&[other.path().join(".npmrc")], &[]).await;

        assert!(with_empty.is_empty());
        assert!(with_absent.is_empty());
    }

    #[tokio::test]
    async fn unparsable_nuget_config_is_absorbed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nuget.config"), "<configuration><a>").unwrap();
        let feeds = discover_feeds(&[], &[dir.path().join("nuget.config")]).await;
        assert!(feeds.is_empty());
    }

    #[tokio::test]
    async fn dedupes_across_files_preserving_order() {
        let dir_one = tempfile::tempdir().unwrap();
        let dir_two = tempfile::tempdir().unwrap();
        fs::write(
            dir_one.path().join(".npmrc"),
            "@a:registry=https://pkgs.dev.azure.com/org/_packaging/f1/npm/registry/\n\
             @b:registry=https://pkgs.dev.azure.com/org/_packaging/f2/npm/registry/\n",
        )
        .unwrap();
        fs::write(
            dir_two.path().join(".npmrc"),
            "@c:registry=https://pkgs.dev.azure.com/org/_packaging/f2/npm/registry/\n\
             @d:registry=https://pkgs.dev.azure.com/org/_packaging/f3/npm/registry/\n",
        )
        .unwrap();

        let feeds = discover_feeds(
            &[dir_one.path().join(".npmrc"), dir_two.path().join(".npmrc")],
            &[],
        )
        .await;

        let urls: Vec<&str> = feeds.all_index_urls.iter().map(String::as_str).collect();
        assert_eq!(
            urls,
            vec![
                "https://pkgs.dev.azure.com/org/_packaging/f1/nuget/v3/index.json",
                "https://pkgs.dev.azure.com/org/_packaging/f2/nuget/v3/index.json",
                "https://pkgs.dev.azure.com/org/_packaging/f3/nuget/v3/index.json",
            ]
        );
    }
}

//! User-level .npmrc credential merge engine
//!
//! Writes `//host/path:_authToken=<token>` lines for newly discovered npm
//! feeds into the user npmrc, leaving every unrelated line untouched. The
//! whole merged document is rewritten in one call; nothing is streamed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use adoauth_core::{NpmFeedEntry, NpmrcDocument};

use crate::error::{FeedsError, Result};

/// Environment variable npm reads to locate the user config.
pub const USERCONFIG_ENV_VAR: &str = "NPM_CONFIG_USERCONFIG";

/// Where the user npmrc goes, and whether tools still need to be pointed at
/// it via [`USERCONFIG_ENV_VAR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmrcTarget {
    pub path: PathBuf,
    /// `true` when the location is our temp-dir default rather than an
    /// already-configured user config path.
    pub export_userconfig: bool,
}

/// Resolve the target file: an existing override wins, otherwise a
/// conventional `.npmrc` under the runner temp directory.
pub fn resolve_npmrc_target(userconfig_override: Option<PathBuf>, temp_dir: &Path) -> NpmrcTarget {
    match userconfig_override {
        Some(path) => NpmrcTarget {
            path,
            export_userconfig: false,
        },
        None => NpmrcTarget {
            path: temp_dir.join(".npmrc"),
            export_userconfig: true,
        },
    }
}

/// Credential key for a registry URL: scheme stripped, `:_authToken` suffix.
pub fn auth_token_key(registry_url: &str) -> String {
    let stripped = registry_url
        .strip_prefix("https:")
        .or_else(|| registry_url.strip_prefix("http:"))
        .unwrap_or(registry_url);
    format!("{stripped}:_authToken")
}

/// Merge credentials for `feeds` into the npmrc at `target`.
///
/// Returns `Ok(None)` without touching the filesystem when `feeds` is empty.
/// An absent file starts from an empty document; a present file that cannot
/// be modelled is a hard error.
pub async fn write_npmrc_credentials(
    target: &Path,
    feeds: &[NpmFeedEntry],
    token: &str,
) -> Result<Option<PathBuf>> {
    if feeds.is_empty() {
        return Ok(None);
    }

    let mut document = match tokio::fs::read_to_string(target).await {
        Ok(content) => NpmrcDocument::parse(&content)
            .map_err(|source| FeedsError::existing_config(target.display(), source))?,
        Err(e) if e.kind() == ErrorKind::NotFound => NpmrcDocument::default(),
        Err(e) => return Err(e.into()),
    };

    for feed in feeds {
        let key = auth_token_key(&feed.registry_url);
        if document.contains_key(&key) {
            debug!("credential for {} already present", feed.registry_url);
            continue;
        }
        document.push_pair(key, token);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("could not create {}: {e}", parent.display());
            }
        }
    }
    tokio::fs::write(target, document.to_ini_string()).await?;
    debug!("wrote npm credentials to {}", target.display());
    Ok(Some(target.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn feed(name: &str) -> NpmFeedEntry {
        NpmFeedEntry {
            registry_url: format!(
                "https://pkgs.dev.azure.com/org/_packaging/{name}/npm/registry/"
            ),
            index_url: format!(
                "https://pkgs.dev.azure.com/org/_packaging/{name}/nuget/v3/index.json"
            ),
        }
    }

    #[test]
    fn resolves_override_without_export() {
        let target = resolve_npmrc_target(Some(PathBuf::from("/home/u/.npmrc")), Path::new("/tmp"));
        assert_eq!(target.path, PathBuf::from("/home/u/.npmrc"));
        assert!(!target.export_userconfig);

        let target = resolve_npmrc_target(None, Path::new("/tmp"));
        assert_eq!(target.path, PathBuf::from("/tmp/.npmrc"));
        assert!(target.export_userconfig);
    }

    #[test]
    fn auth_token_key_strips_scheme() {
        assert_eq!(
            auth_token_key("https://pkgs.dev.azure.com/org/_packaging/feed/npm/registry/"),
            "//pkgs.dev.azure.com/org/_packaging/feed/npm/registry/:_authToken"
        );
        assert_eq!(
            auth_token_key("http://pkgs.dev.azure.com/x/npm/registry/"),
            "//pkgs.dev.azure.com/x/npm/registry/:_authToken"
        );
    }

    #[tokio::test]
    async fn empty_feed_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(".npmrc");
        let written = write_npmrc_credentials(&target, &[], "tok").await.unwrap();
        assert_eq!(written, None);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn creates_file_with_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(".npmrc");

        let written = write_npmrc_credentials(&target, &[feed("f1")], "tok")
            .await
            .unwrap();

        assert_eq!(written, Some(target.clone()));
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "//pkgs.dev.azure.com/org/_packaging/f1/npm/registry/:_authToken=tok\n"
        );
    }

    #[tokio::test]
    async fn preserves_unrelated_lines() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(".npmrc");
        fs::write(
            &target,
            "# user settings\nstrict-ssl=true\n@scope:registry=https://registry.npmjs.org/\n",
        )
        .unwrap();

        write_npmrc_credentials(&target, &[feed("f1")], "tok")
            .await
            .unwrap();

        let content = fs::read_to_string(&target).unwrap();
        assert!(content.starts_with("# user settings\nstrict-ssl=true\n"));
        assert!(content.contains("@scope:registry=https://registry.npmjs.org/"));
        assert!(content.contains("/f1/npm/registry/:_authToken=tok"));
    }

    #[tokio::test]
    async fn rerun_does_not_duplicate_or_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(".npmrc");

        write_npmrc_credentials(&target, &[feed("f1")], "first")
            .await
            .unwrap();
        write_npmrc_credentials(&target, &[feed("f1"), feed("f2")], "second")
            .await
            .unwrap();

        let content = fs::read_to_string(&target).unwrap();
        assert_eq!(content.matches(":_authToken=").count(), 2);
        assert!(content.contains("/f1/npm/registry/:_authToken=first"));
        assert!(content.contains("/f2/npm/registry/:_authToken=second"));
    }

    #[tokio::test]
    async fn unmodellable_existing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(".npmrc");
        fs::write(&target, "not a valid line\n").unwrap();

        let result = write_npmrc_credentials(&target, &[feed("f1")], "tok").await;
        assert!(matches!(result, Err(FeedsError::ExistingConfig { .. })));
        // and the file is untouched
        assert_eq!(fs::read_to_string(&target).unwrap(), "not a valid line\n");
    }
}

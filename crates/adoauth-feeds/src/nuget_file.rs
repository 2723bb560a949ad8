//! User-level nuget.config credential merge engine
//!
//! Adds a `<packageSourceCredentials>` section entry per newly discovered
//! feed, keyed by the feed's source name. Pre-existing sections, attributes
//! and their ordering survive the rewrite.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use adoauth_core::{CoreError, Element, NugetFeedEntry, xml};

use crate::endpoints::CREDENTIAL_USERNAME;
use crate::error::{FeedsError, Result};

/// Environment variable overriding the target nuget.config location.
pub const NUGET_CONFIG_ENV_VAR: &str = "ADOAUTH_NUGET_CONFIG";

const CREDENTIALS_SECTION: &str = "packageSourceCredentials";

/// NuGet encodes spaces in credential section names with this reversible
/// placeholder.
const SPACE_PLACEHOLDER: &str = "_x0020_";

/// Resolve the target file: an explicit override wins, otherwise
/// `nuget.config` one directory above the workspace root so it applies to
/// every checkout underneath.
pub fn resolve_nuget_target(override_path: Option<PathBuf>, workspace_root: &Path) -> PathBuf {
    override_path.unwrap_or_else(|| {
        workspace_root
            .parent()
            .unwrap_or(workspace_root)
            .join("nuget.config")
    })
}

/// Credential section element name for a feed's source name.
pub fn credential_element_name(source_name: &str) -> String {
    source_name.replace(' ', SPACE_PLACEHOLDER)
}

/// Merge credentials for `feeds` into the nuget.config at `target`.
///
/// Returns `Ok(None)` without touching the filesystem when `feeds` is empty.
/// An absent or empty file starts from a `<configuration/>` skeleton; a
/// present file that does not parse, or whose root is not `<configuration>`,
/// is a hard error.
pub async fn write_nuget_credentials(
    target: &Path,
    feeds: &[NugetFeedEntry],
    token: &str,
) -> Result<Option<PathBuf>> {
    if feeds.is_empty() {
        return Ok(None);
    }

    let mut root = match tokio::fs::read_to_string(target).await {
        Ok(content) => match xml::parse_document(&content)
            .map_err(|source| FeedsError::existing_config(target.display(), source))?
        {
            Some(root) if root.name == "configuration" => root,
            Some(root) => {
                return Err(FeedsError::existing_config(
                    target.display(),
                    CoreError::invalid_document(format!(
                        "root element is <{}>, expected <configuration>",
                        root.name
                    )),
                ));
            }
            None => Element::new("configuration"),
        },
        Err(e) if e.kind() == ErrorKind::NotFound => Element::new("configuration"),
        Err(e) => return Err(e.into()),
    };

    let credentials = root.ensure_child(CREDENTIALS_SECTION);
    for feed in feeds {
        let name = credential_element_name(&feed.source_name);
        if credentials.child(&name).is_some() {
            debug!("credential for source \"{}\" already present", feed.source_name);
            continue;
        }
        let mut section = Element::new(&name);
        section.push_element(
            Element::new("add")
                .with_attr("key", "Username")
                .with_attr("value", CREDENTIAL_USERNAME),
        );
        section.push_element(
            Element::new("add")
                .with_attr("key", "ClearTextPassword")
                .with_attr("value", token),
        );
        credentials.push_element(section);
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!("could not create {}: {e}", parent.display());
            }
        }
    }
    tokio::fs::write(target, xml::to_xml_string(&root)).await?;
    debug!("wrote NuGet credentials to {}", target.display());
    Ok(Some(target.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn feed(name: &str) -> NugetFeedEntry {
        NugetFeedEntry {
            source_name: name.to_string(),
            index_url: format!(
                "https://pkgs.dev.azure.com/org/_packaging/{name}/nuget/v3/index.json"
            ),
        }
    }

    #[test]
    fn resolves_override_then_workspace_parent() {
        assert_eq!(
            resolve_nuget_target(Some(PathBuf::from("/etc/nuget.config")), Path::new("/w/repo")),
            PathBuf::from("/etc/nuget.config")
        );
        assert_eq!(
            resolve_nuget_target(None, Path::new("/w/repo")),
            PathBuf::from("/w/nuget.config")
        );
    }

    #[test]
    fn spaces_in_source_names_are_encoded() {
        assert_eq!(credential_element_name("my feed"), "my_x0020_feed");
        assert_eq!(credential_element_name("plain"), "plain");
    }

    #[tokio::test]
    async fn empty_feed_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nuget.config");
        let written = write_nuget_credentials(&target, &[], "tok").await.unwrap();
        assert_eq!(written, None);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn creates_skeleton_with_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nuget.config");

        write_nuget_credentials(&target, &[feed("f1")], "tok")
            .await
            .unwrap();

        let content = fs::read_to_string(&target).unwrap();
        let root = xml::parse_document(&content).unwrap().unwrap();
        let section = root
            .child(CREDENTIALS_SECTION)
            .and_then(|c| c.child("f1"))
            .unwrap();
        let adds: Vec<_> = section.children_named("add").collect();
        assert_eq!(adds[0].attr("key"), Some("Username"));
        assert_eq!(adds[0].attr("value"), Some(CREDENTIAL_USERNAME));
        assert_eq!(adds[1].attr("key"), Some("ClearTextPassword"));
        assert_eq!(adds[1].attr("value"), Some("tok"));
    }

    #[tokio::test]
    async fn preserves_existing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nuget.config");
        fs::write(
            &target,
            r#"<configuration>
  <packageSources>
    <clear />
    <add key="f1" value="https://pkgs.dev.azure.com/org/_packaging/f1/nuget/v3/index.json" protocolVersion="3" />
  </packageSources>
  <config>
    <add key="repositoryPath" value="packages" />
  </config>
</configuration>"#,
        )
        .unwrap();

        write_nuget_credentials(&target, &[feed("f1")], "tok")
            .await
            .unwrap();

        let root = xml::parse_document(&fs::read_to_string(&target).unwrap())
            .unwrap()
            .unwrap();
        // original sections intact, in order, attributes preserved
        let names: Vec<&str> = root.child_elements().map(|el| el.name.as_str()).collect();
        assert_eq!(names, vec!["packageSources", "config", CREDENTIALS_SECTION]);
        let add = root.child("packageSources").unwrap().child("add").unwrap();
        assert_eq!(add.attr("protocolVersion"), Some("3"));
        assert_eq!(add.attr("key"), Some("f1"));
    }

    #[tokio::test]
    async fn rerun_keeps_existing_credential_sections() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nuget.config");

        write_nuget_credentials(&target, &[feed("f1")], "first")
            .await
            .unwrap();
        write_nuget_credentials(&target, &[feed("f1"), feed("f2")], "second")
            .await
            .unwrap();

        let root = xml::parse_document(&fs::read_to_string(&target).unwrap())
            .unwrap()
            .unwrap();
        let credentials = root.child(CREDENTIALS_SECTION).unwrap();
        assert_eq!(credentials.child_elements().count(), 2);
        let f1_password = credentials
            .child("f1")
            .unwrap()
            .children_named("add")
            .find(|add| add.attr("key") == Some("ClearTextPassword"))
            .unwrap();
        assert_eq!(f1_password.attr("value"), Some("first"));
    }

    #[tokio::test]
    async fn unparsable_existing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nuget.config");
        fs::write(&target, "<configuration><packageSources>").unwrap();

        let result = write_nuget_credentials(&target, &[feed("f1")], "tok").await;
        assert!(matches!(result, Err(FeedsError::ExistingConfig { .. })));
    }

    #[tokio::test]
    async fn foreign_root_element_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nuget.config");
        fs::write(&target, "<settings />").unwrap();

        let result = write_nuget_credentials(&target, &[feed("f1")], "tok").await;
        assert!(matches!(result, Err(FeedsError::ExistingConfig { .. })));
    }
}

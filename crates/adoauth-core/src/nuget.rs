//! NuGet configuration document extractor
//!
//! Walks every section under `<configuration>` for `<add>` entries and keeps
//! the ones whose `value` attribute is an Azure DevOps feed. Sections other
//! than `packageSources` are scanned too; `defaultPushSource` declarations in
//! `<config>` name feeds the same way.

use serde::Serialize;

use crate::error::Result;
use crate::provider;
use crate::xml;

/// One classified `<add>` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NugetFeedEntry {
    /// The declaration's `key` attribute, used verbatim to name the
    /// credential section written for this feed.
    pub source_name: String,
    /// The NuGet v3 service index URL from the `value` attribute.
    pub index_url: String,
}

/// Extract the Azure DevOps feeds declared in nuget.config text.
///
/// Unparsable markup is an error; a well-formed document without a
/// `<configuration>` root (including empty input) is an empty result.
/// Entries are deduplicated by index URL in first-seen order.
pub fn ado_feeds_from_nuget_config(content: &str) -> Result<Vec<NugetFeedEntry>> {
    let Some(root) = xml::parse_document(content)? else {
        return Ok(Vec::new());
    };
    if root.name != "configuration" {
        return Ok(Vec::new());
    }

    let mut entries: Vec<NugetFeedEntry> = Vec::new();
    for section in root.child_elements() {
        for add in section.children_named("add") {
            let Some(value) = add.attr("value") else {
                continue;
            };
            if !provider::is_ado_feed(value) {
                continue;
            }
            let Some(source_name) = add.attr("key") else {
                continue;
            };
            if entries.iter().any(|entry| entry.index_url == value) {
                continue;
            }
            entries.push(NugetFeedEntry {
                source_name: source_name.to_string(),
                index_url: value.to_string(),
            });
        }
    }
    Ok(entries)
}

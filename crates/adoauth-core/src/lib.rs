//! adoauth core - feed classification and config-dialect parsing
//!
//! This crate holds the pure, IO-free half of adoauth:
//! - `provider`: Azure DevOps feed classification and URL derivation
//! - `npmrc`: npm's INI-like dialect (tolerant extraction + lossless merge model)
//! - `nuget`: NuGet configuration document extraction
//! - `xml`: the attribute-preserving XML tree both NuGet paths share

pub mod error;
pub mod npmrc;
pub mod nuget;
pub mod provider;
pub mod xml;

pub use error::{CoreError, Result};
pub use npmrc::{NpmFeedEntry, NpmrcDocument, ado_feeds_from_npmrc};
pub use nuget::{NugetFeedEntry, ado_feeds_from_nuget_config};
pub use provider::{is_ado_feed, npm_registry_to_index_url};
pub use xml::{Element, Node};

//! Azure DevOps feed classification
//!
//! A URL belongs to Azure DevOps Artifacts when it contains one of the
//! provider host markers. Classification is plain substring containment,
//! case-sensitive, no wildcard semantics.

/// Host fragments identifying Azure DevOps Artifacts endpoints.
pub const ADO_FEED_MARKERS: [&str; 2] = [".pkgs.visualstudio.com", "pkgs.dev.azure.com"];

/// Path segment used by npm registry URLs for an ADO feed.
pub const NPM_REGISTRY_SEGMENT: &str = "/npm/registry/";

/// Path segment of the NuGet v3 service index for the same feed.
pub const NUGET_INDEX_SEGMENT: &str = "/nuget/v3/index.json";

/// Returns `true` when `url` points at an Azure DevOps Artifacts endpoint.
pub fn is_ado_feed(url: &str) -> bool {
    ADO_FEED_MARKERS.iter().any(|marker| url.contains(marker))
}

/// Derive the NuGet v3 service index URL from an npm registry URL.
///
/// Returns `None` when the registry path segment is absent rather than
/// echoing the input back, so callers cannot accidentally persist a URL
/// that was never rewritten.
pub fn npm_registry_to_index_url(registry_url: &str) -> Option<String> {
    if !registry_url.contains(NPM_REGISTRY_SEGMENT) {
        return None;
    }
    Some(registry_url.replace(NPM_REGISTRY_SEGMENT, NUGET_INDEX_SEGMENT))
}

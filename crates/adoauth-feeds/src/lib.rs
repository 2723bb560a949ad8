//! adoauth feed discovery and credential persistence
//!
//! The IO half of adoauth:
//!
//! - **Discovery**: scan candidate `.npmrc` / `nuget.config` files for Azure
//!   DevOps feeds, best-effort and concurrent
//! - **Endpoint store**: the JSON credential blob NuGet's credential
//!   provider reads from the environment
//! - **Merge engines**: idempotent credential injection into user-level
//!   npmrc and nuget.config files, preserving unrelated content
//! - **Token source**: short-lived tokens from the `az` CLI
//!
//! All merge logic operates on values; only the caller touches the process
//! environment.

pub mod discover;
pub mod endpoints;
pub mod error;
pub mod npmrc_file;
pub mod nuget_file;
pub mod token;

pub use discover::{DiscoveredFeeds, discover_feeds};
pub use endpoints::{CREDENTIAL_USERNAME, ENDPOINTS_ENV_VAR, EndpointCredential, EndpointStore};
pub use error::{FeedsError, Result};
pub use npmrc_file::{
    NpmrcTarget, USERCONFIG_ENV_VAR, auth_token_key, resolve_npmrc_target, write_npmrc_credentials,
};
pub use nuget_file::{
    NUGET_CONFIG_ENV_VAR, credential_element_name, resolve_nuget_target, write_nuget_credentials,
};
pub use token::{ADO_TOKEN_SCOPE, AzCliTokenSource, TokenSource};

//! Feed login: discover, acquire a token, inject credentials

use std::path::PathBuf;

use console::style;
use tracing::{debug, info};

use adoauth_feeds::{
    AzCliTokenSource, ENDPOINTS_ENV_VAR, EndpointStore, NUGET_CONFIG_ENV_VAR, TokenSource,
    USERCONFIG_ENV_VAR, discover_feeds, resolve_npmrc_target, resolve_nuget_target,
    write_npmrc_credentials, write_nuget_credentials,
};

use crate::error::Result;
use crate::output;
use crate::util::{env_path, normalize_list};

pub async fn run(
    npmrc: &[String],
    nuget: &[String],
    login_urls: &[String],
    skip_npmrc_credentials: bool,
    skip_nuget_credentials: bool,
) -> Result<()> {
    // Explicit-URL mode: no discovery, no file rewriting, env store only.
    let login_urls = normalize_list(login_urls);
    if !login_urls.is_empty() {
        let token = acquire_token().await?;
        publish_endpoint_credentials(&login_urls, &token)?;
        println!(
            "{} credentials published for {} endpoint(s)",
            style("✓").green(),
            login_urls.len()
        );
        return Ok(());
    }

    let npmrc_paths: Vec<PathBuf> = normalize_list(npmrc).into_iter().map(PathBuf::from).collect();
    let nuget_paths: Vec<PathBuf> = normalize_list(nuget).into_iter().map(PathBuf::from).collect();

    let feeds = discover_feeds(&npmrc_paths, &nuget_paths).await;
    if feeds.is_empty() {
        info!("no Azure DevOps feed URLs found in the provided files, skipping login");
        println!("No Azure DevOps feed URLs found. Nothing to do.");
        return Ok(());
    }

    let token = acquire_token().await?;
    publish_endpoint_credentials(&feeds.all_index_urls, &token)?;

    let npmrc_target = resolve_npmrc_target(env_path(USERCONFIG_ENV_VAR), &runner_temp_dir());
    let nuget_target = resolve_nuget_target(env_path(NUGET_CONFIG_ENV_VAR), &workspace_root());

    // The two engines target distinct files and run concurrently.
    let (npmrc_written, nuget_written) = tokio::join!(
        async {
            if skip_npmrc_credentials {
                Ok(None)
            } else {
                write_npmrc_credentials(&npmrc_target.path, &feeds.npm_feeds, &token).await
            }
        },
        async {
            if skip_nuget_credentials {
                Ok(None)
            } else {
                write_nuget_credentials(&nuget_target, &feeds.nuget_feeds, &token).await
            }
        },
    );

    if let Some(path) = npmrc_written? {
        let path = path.display().to_string();
        if npmrc_target.export_userconfig {
            output::export_variable(USERCONFIG_ENV_VAR, &path);
        }
        output::set_output("npmrc-path", &path);
        println!("{} npm credentials written to {path}", style("✓").green());
    }
    if let Some(path) = nuget_written? {
        let path = path.display().to_string();
        output::set_output("nuget-config-path", &path);
        println!("{} NuGet credentials written to {path}", style("✓").green());
    }
    Ok(())
}

async fn acquire_token() -> Result<String> {
    let token = AzCliTokenSource.acquire().await?;
    output::add_mask(&token);
    Ok(token)
}

/// Read-modify-republish the endpoint credential store.
fn publish_endpoint_credentials(urls: &[String], token: &str) -> Result<()> {
    let raw = std::env::var(ENDPOINTS_ENV_VAR).ok();
    let mut store = EndpointStore::from_env_value(raw.as_deref());
    debug!("building {ENDPOINTS_ENV_VAR} with URLs: {}", urls.join(", "));
    let added = store.merge(urls, token);
    output::export_variable(ENDPOINTS_ENV_VAR, &store.to_env_value()?);
    info!("published credentials for {added} new endpoint(s)");
    Ok(())
}

fn runner_temp_dir() -> PathBuf {
    env_path("RUNNER_TEMP").unwrap_or_else(std::env::temp_dir)
}

fn workspace_root() -> PathBuf {
    env_path("GITHUB_WORKSPACE")
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

//! List discovered feeds without writing anything

use std::path::PathBuf;

use console::style;

use adoauth_feeds::discover_feeds;

use crate::error::{CliError, Result};
use crate::util::normalize_list;

pub async fn run(npmrc: &[String], nuget: &[String], json: bool) -> Result<()> {
    let npmrc_paths: Vec<PathBuf> = normalize_list(npmrc).into_iter().map(PathBuf::from).collect();
    let nuget_paths: Vec<PathBuf> = normalize_list(nuget).into_iter().map(PathBuf::from).collect();

    let feeds = discover_feeds(&npmrc_paths, &nuget_paths).await;

    if json {
        let rendered = serde_json::to_string_pretty(&feeds)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    if feeds.is_empty() {
        println!("No Azure DevOps feeds found.");
        return Ok(());
    }

    if !feeds.npm_feeds.is_empty() {
        println!("{}", style("npm registries").bold());
        for feed in &feeds.npm_feeds {
            println!("  {} -> {}", feed.registry_url, feed.index_url);
        }
    }
    if !feeds.nuget_feeds.is_empty() {
        println!("{}", style("NuGet sources").bold());
        for feed in &feeds.nuget_feeds {
            println!("  {} ({})", feed.source_name, feed.index_url);
        }
    }
    println!(
        "{} feed(s) across both dialects",
        style(feeds.all_index_urls.len()).bold()
    );
    Ok(())
}

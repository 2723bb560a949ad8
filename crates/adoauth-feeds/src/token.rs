//! Access-token acquisition via the Azure CLI
//!
//! The token source is a trait so orchestration can be exercised without a
//! live `az` login. Acquisition failure is fatal to the run and is never
//! retried.

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::error::{FeedsError, Result};

/// Azure DevOps resource ID; tokens requested with this scope are accepted
/// by Artifacts feeds.
pub const ADO_TOKEN_SCOPE: &str = "499b84ac-1321-427f-aa17-267ca6975798/.default";

/// An opaque source of short-lived access tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn acquire(&self) -> Result<String>;
}

/// Acquires tokens by shelling out to `az account get-access-token`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzCliTokenSource;

#[async_trait]
impl TokenSource for AzCliTokenSource {
    async fn acquire(&self) -> Result<String> {
        debug!("getting token from the az CLI");
        let output = Command::new("az")
            .args(["account", "get-access-token", "--scope", ADO_TOKEN_SCOPE, "-o", "json"])
            .output()
            .await
            .map_err(|e| FeedsError::token(format!("could not run az: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(FeedsError::token(format!(
                "az exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_token_output(&stdout).map_err(|message| {
            debug!("az stdout: {stdout}");
            debug!("az stderr: {stderr}");
            FeedsError::token(message)
        })
    }
}

/// Pull the `accessToken` string out of the CLI's JSON output.
fn parse_token_output(stdout: &str) -> std::result::Result<String, String> {
    let value: Value =
        serde_json::from_str(stdout).map_err(|e| format!("az output is not valid JSON: {e}"))?;
    if !value.is_object() {
        return Err("az output is not a JSON object".to_string());
    }
    match value.get("accessToken").and_then(Value::as_str) {
        Some(token) => Ok(token.to_string()),
        None => Err("no accessToken field in az output".to_string()),
    }
}

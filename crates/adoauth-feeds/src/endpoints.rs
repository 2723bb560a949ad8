//! The external-feed-endpoints credential store
//!
//! NuGet's credential provider reads a JSON document from the
//! `VSS_NUGET_EXTERNAL_FEED_ENDPOINTS` environment variable. The store is
//! modelled as a plain value: loading and merging never touch the process
//! environment, the orchestrator owns reading and republishing the variable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::Result;

/// Environment variable the NuGet credential provider reads.
pub const ENDPOINTS_ENV_VAR: &str = "VSS_NUGET_EXTERNAL_FEED_ENDPOINTS";

/// Username recorded next to every token; ADO ignores it but the endpoint
/// format requires one.
pub const CREDENTIAL_USERNAME: &str = "adoauth";

/// One endpoint's credential record.
///
/// Only `endpoint` is required of pre-existing entries; anything else they
/// carry is kept and re-serialized unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCredential {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EndpointCredential {
    fn new(endpoint: &str, token: &str) -> Self {
        EndpointCredential {
            endpoint: endpoint.to_string(),
            username: Some(CREDENTIAL_USERNAME.to_string()),
            password: Some(token.to_string()),
            extra: Map::new(),
        }
    }
}

/// The full persisted store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStore {
    pub endpoint_credentials: Vec<EndpointCredential>,
}

impl EndpointStore {
    /// Build the store from the raw environment-variable value.
    ///
    /// An unset variable is an empty store. A value that fails validation is
    /// corrupted prior state: it is logged and discarded, never fatal.
    pub fn from_env_value(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match Self::validate(raw) {
            Ok(store) => store,
            Err(reason) => {
                error!("existing feed credentials are unusable, discarding them");
                debug!("credential validation failure: {reason}");
                Self::default()
            }
        }
    }

    /// Structural validation of the persisted JSON shape.
    fn validate(raw: &str) -> std::result::Result<Self, String> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| format!("not valid JSON: {e}"))?;
        if !value.is_object() {
            return Err("not a JSON object".to_string());
        }
        let credentials = value
            .get("endpointCredentials")
            .ok_or_else(|| "missing endpointCredentials".to_string())?;
        let items = credentials
            .as_array()
            .ok_or_else(|| "endpointCredentials is not an array".to_string())?;
        if items
            .iter()
            .any(|item| item.get("endpoint").and_then(Value::as_str).is_none())
        {
            return Err("an entry is missing a string endpoint field".to_string());
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    /// Append a credential for every URL not already present.
    ///
    /// Existing entries win; a URL that is already there is skipped with a
    /// warning so its password is never overwritten. Returns the number of
    /// entries appended. Applying the same URL set twice appends nothing.
    pub fn merge(&mut self, urls: &[String], token: &str) -> usize {
        let mut present: HashSet<String> = self
            .endpoint_credentials
            .iter()
            .map(|credential| credential.endpoint.clone())
            .collect();

        let mut added = 0;
        for url in urls {
            if present.contains(url) {
                warn!(
                    "not adding \"{url}\" to the credentials because it is already there; \
                     the existing value is kept"
                );
                continue;
            }
            present.insert(url.clone());
            self.endpoint_credentials
                .push(EndpointCredential::new(url, token));
            added += 1;
        }
        added
    }

    /// Single-line JSON suitable for republishing to the environment.
    pub fn to_env_value(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

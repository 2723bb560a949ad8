//! CI-facing output signaling
//!
//! The environment-variable store and the resolved credential file paths
//! have to reach whatever runs after us. Under GitHub Actions that is the
//! `GITHUB_ENV` / `GITHUB_OUTPUT` file protocol; anywhere else, exported
//! variables are printed as shell `export` lines for `eval`.

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::Write;

use tracing::{debug, warn};

/// Publish an environment variable to the steps that follow this one.
pub fn export_variable(name: &str, value: &str) {
    match std::env::var_os("GITHUB_ENV") {
        Some(env_file) => {
            if let Err(e) = append_line(&env_file, &format!("{name}={value}")) {
                warn!("could not write {name} to GITHUB_ENV: {e}");
            }
        }
        None => println!("export {name}='{value}'"),
    }
}

/// Publish a named step output.
pub fn set_output(name: &str, value: &str) {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(output_file) => {
            if let Err(e) = append_line(&output_file, &format!("{name}={value}")) {
                warn!("could not write {name} to GITHUB_OUTPUT: {e}");
            }
        }
        None => debug!("output {name}={value}"),
    }
}

/// Keep a secret out of workflow logs. A no-op outside GitHub Actions.
pub fn add_mask(value: &str) {
    if std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true") {
        println!("::add-mask::{value}");
    }
}

fn append_line(path: &OsStr, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "{line}")
}

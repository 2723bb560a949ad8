//! adoauth CLI - Azure DevOps Artifacts feed login

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod exit_codes;
mod output;
mod util;

#[derive(Parser)]
#[command(name = "adoauth")]
#[command(version)]
#[command(
    about = "Log in to Azure DevOps Artifacts feeds discovered in npm and NuGet configuration",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover feeds, acquire a token and inject credentials
    Login {
        /// Candidate .npmrc files to scan (comma/newline separated)
        #[arg(long = "npmrc", env = "ADOAUTH_NPMRC", value_delimiter = ',')]
        npmrc: Vec<String>,

        /// Candidate nuget.config files to scan (comma/newline separated)
        #[arg(long = "nuget", env = "ADOAUTH_NUGET", value_delimiter = ',')]
        nuget: Vec<String>,

        /// Explicit feed index URLs; skips discovery and file rewriting
        #[arg(long = "login-url", env = "ADOAUTH_LOGIN_URLS", value_delimiter = ',')]
        login_urls: Vec<String>,

        /// Do not write npm credentials to the user .npmrc
        #[arg(long)]
        skip_npmrc_credentials: bool,

        /// Do not write NuGet credentials to nuget.config
        #[arg(long)]
        skip_nuget_credentials: bool,
    },

    /// List discovered feeds without writing anything
    Discover {
        /// Candidate .npmrc files to scan (comma/newline separated)
        #[arg(long = "npmrc", env = "ADOAUTH_NPMRC", value_delimiter = ',')]
        npmrc: Vec<String>,

        /// Candidate nuget.config files to scan (comma/newline separated)
        #[arg(long = "nuget", env = "ADOAUTH_NUGET", value_delimiter = ',')]
        nuget: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Login {
            npmrc,
            nuget,
            login_urls,
            skip_npmrc_credentials,
            skip_nuget_credentials,
        } => {
            commands::login::run(
                &npmrc,
                &nuget,
                &login_urls,
                skip_npmrc_credentials,
                skip_nuget_credentials,
            )
            .await
        }

        Commands::Discover { npmrc, nuget, json } => {
            commands::discover::run(&npmrc, &nuget, json).await
        }
    };

    if let Err(error) = result {
        let code = error.exit_code();
        eprintln!("{:?}", miette::Report::new(error));
        std::process::exit(code);
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_login_with_lists_and_flags() {
        let cli = Cli::parse_from([
            "adoauth",
            "login",
            "--npmrc",
            ".npmrc,packages/.npmrc",
            "--nuget",
            "nuget.config",
            "--skip-nuget-credentials",
        ]);
        match cli.command {
            Commands::Login {
                npmrc,
                nuget,
                login_urls,
                skip_npmrc_credentials,
                skip_nuget_credentials,
            } => {
                assert_eq!(npmrc, vec![".npmrc", "packages/.npmrc"]);
                assert_eq!(nuget, vec!["nuget.config"]);
                assert!(login_urls.is_empty());
                assert!(!skip_npmrc_credentials);
                assert!(skip_nuget_credentials);
            }
            _ => panic!("expected login command"),
        }
    }
}

//! snowdeploy - Deploy only the Snowpark projects that changed in a monorepo.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use snowdeploy::cli::output;
use snowdeploy::cli::{execute, Cli};
use snowdeploy::core::constants::LOG_ENV;
use snowdeploy::error::{DispatchError, Error, KeyError, SecretError};

fn main() {
    // Usage errors exit 1 like every other failure; help and version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("snowdeploy=debug")
        } else {
            EnvFilter::new("snowdeploy=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match execute(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            let suggestion = match &e {
                Error::Secret(SecretError::Fetch(_)) => {
                    Some("check AWS credentials, or pass --secrets-file")
                }
                Error::Secret(SecretError::AwsUnavailable) => Some("pass --secrets-file"),
                Error::Dispatch(DispatchError::CliNotFound(_)) => {
                    Some("install the Snowflake CLI or pass --snow-bin")
                }
                Error::Target(_) => Some("example: acme_prod"),
                Error::Key(KeyError::UnsupportedAlgorithm(_)) => {
                    Some("re-encrypt with: openssl pkcs8 -topk8 -v2 aes256")
                }
                _ => None,
            };

            output::error(&e.to_string());
            if let Some(hint) = suggestion {
                output::hint(hint);
            }
            std::process::exit(1);
        }
    }
}

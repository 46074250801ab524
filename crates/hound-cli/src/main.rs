//! hound CLI — ask Houndify a question, print the written answer.
//!
//! ```text
//! hound [-v] [-units metric|imperial] [--locate] [--no-units] [--config PATH] words...
//! hound -units imperial what is the weather
//! ```
//!
//! Credentials come from `HOUNDIFY_CLIENT_ID` / `HOUNDIFY_CLIENT_KEY` (and
//! `IPSTACK_ACCESS_KEY` with `--locate`) or the matching config entries.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hound_lib::config::env_user;
use hound_lib::hound_core::types::APP_NAME;
use hound_lib::{ConfigStore, Dispatcher, HoundifyClient, IpGeolocator, QueryOptions};

use crate::cli::{Cli, normalize_args};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("hound: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only the answer.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,hound={level},hound_lib={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> hound_lib::Result<()> {
    let mut store = match &cli.config {
        Some(path) => ConfigStore::load_from(path, env_user().as_deref())?,
        None => ConfigStore::load(APP_NAME)?,
    };
    tracing::debug!(path = %store.path().display(), "using config");

    let mut features = store.features();
    features.geolocation |= cli.locate;
    if cli.no_units {
        features.units = false;
    }

    let opts = QueryOptions {
        words: cli.query,
        units: cli.units,
        features,
    };
    opts.persist_override(&mut store)?;

    let client = HoundifyClient::from_env(store.credentials()?, cli.verbose);
    let mut dispatcher: Dispatcher<_, IpGeolocator> = Dispatcher::new(client);
    if opts.features.geolocation {
        dispatcher = dispatcher.with_locator(IpGeolocator::from_env(store.ipstack_access_key()?));
    }

    let mut stdout = std::io::stdout().lock();
    dispatcher.run(&mut store, &opts, &mut stdout).await?;
    Ok(())
}

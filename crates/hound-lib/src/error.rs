//! Error type for the houndify CLI engine.

use std::path::PathBuf;

use hound_core::response::ResponseError;
use hound_core::types::UnknownUnits;
use thiserror::Error;

/// Result alias using [`HoundError`].
pub type Result<T> = std::result::Result<T, HoundError>;

/// Everything that can abort a run. None of these are retried.
#[derive(Error, Debug)]
pub enum HoundError {
    /// Config file could not be located or created
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file is not valid YAML
    #[error("fatal error in config file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading or writing the config file failed
    #[error("config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `Units` holds something other than metric or imperial
    #[error("invalid Units in {}: {source}", path.display())]
    InvalidUnits {
        path: PathBuf,
        #[source]
        source: UnknownUnits,
    },

    /// A required credential is neither in the environment nor in config
    #[error("missing credential: set {env} or {key} in {}", path.display())]
    MissingCredential {
        env: &'static str,
        key: &'static str,
        path: PathBuf,
    },

    /// Transport failure or non-2xx from a lookup service
    #[error("{service} request failed: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    /// Provider answered with a non-success HTTP status
    #[error("unable to talk to houndify ({status}):\n{body}")]
    Provider { status: u16, body: String },

    /// Provider payload could not be turned into display text
    #[error("failed to understand houndify's response ({reason}):\n{payload}")]
    Response {
        #[source]
        reason: ResponseError,
        payload: String,
    },

    /// Writing the answer to the output failed
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}

impl HoundError {
    pub(crate) fn network(service: &'static str, err: impl std::fmt::Display) -> Self {
        HoundError::Network {
            service,
            message: err.to_string(),
        }
    }
}

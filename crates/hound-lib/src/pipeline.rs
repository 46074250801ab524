//! Query pipeline — config → (location) → request → provider → stdout → config.
//!
//! ```text
//! unit override? ──► store.set_units + save
//!        │
//! geolocation? ────► locator.locate()        (abort on any failure)
//!        │
//! build_request(text, user, units token, location)
//!        │
//! client.text_search ──► parse_written_response ──► print once
//!        │
//! store.save
//! ```
//!
//! Strictly sequential: each step finishes before the next begins, and the
//! first error ends the run.

use std::io::Write;

use tracing::debug;

use hound_core::request::{QueryRequest, build_request, query_text};
use hound_core::response::parse_written_response;
use hound_core::types::{Features, UnitPreference};

use crate::client::QueryClient;
use crate::config::ConfigStore;
use crate::error::{HoundError, Result};
use crate::geolocate::Locator;

/// Per-invocation inputs.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Free-form query words, joined with single spaces.
    pub words: Vec<String>,
    /// Unit system from the command line; persisted before the call.
    pub units: Option<UnitPreference>,
    pub features: Features,
}

impl QueryOptions {
    /// Store and save a command-line unit override. Callers run this before
    /// anything that can fail on credentials or the network.
    pub fn persist_override(&self, store: &mut ConfigStore) -> Result<()> {
        if let Some(units) = self.units {
            store.set_units(units);
            store.save()?;
        }
        Ok(())
    }
}

/// Runs queries against a provider client, optionally enriched with location.
pub struct Dispatcher<C, L> {
    client: C,
    locator: Option<L>,
}

impl<C: QueryClient, L: Locator> Dispatcher<C, L> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            locator: None,
        }
    }

    pub fn with_locator(mut self, locator: L) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Build the outbound request, performing the location lookup if enabled.
    pub async fn build_request(
        &self,
        words: &[String],
        user: &str,
        units: UnitPreference,
        features: Features,
    ) -> Result<QueryRequest> {
        let location = if features.geolocation {
            let locator = self.locator.as_ref().ok_or_else(|| {
                HoundError::Config("geolocation enabled but no locator configured".into())
            })?;
            Some(locator.locate().await?)
        } else {
            None
        };

        let text = query_text(words);
        Ok(build_request(
            &text,
            user,
            features.units.then_some(units),
            location.as_ref(),
        ))
    }

    /// Send the request and turn the reply into display text.
    pub async fn dispatch(&self, req: &QueryRequest) -> Result<String> {
        let payload = self.client.text_search(req).await?;
        parse_written_response(&payload).map_err(|reason| HoundError::Response { reason, payload })
    }

    /// The whole run: apply overrides, query, print the answer, save config.
    pub async fn run(
        &self,
        store: &mut ConfigStore,
        opts: &QueryOptions,
        out: &mut impl Write,
    ) -> Result<String> {
        opts.persist_override(store)?;

        let units = store.units()?;
        let user = store.user()?;

        let req = self.build_request(&opts.words, &user, units, opts.features).await?;
        debug!(text = %req.text, metadata = ?req.metadata, "built request");

        let answer = self.dispatch(&req).await?;
        writeln!(out, "{answer}")?;
        out.flush()?;

        store.save()?;
        Ok(answer)
    }
}

//! Provider client — one signed text query per call.
//!
//! Stands in for the vendor SDK: builds the three `Hound-*` headers, sends
//! `GET /v1/text?query=...`, and hands back the raw body. Turning the body
//! into display text is [`hound_core::response::parse_written_response`]'s
//! job.

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, info};

use hound_core::request::QueryRequest;

use crate::config::Credentials;
use crate::error::{HoundError, Result};

pub const HOUNDIFY_TEXT_URL: &str = "https://api.houndify.com/v1/text";

/// Override the provider text endpoint.
pub const ENV_HOUNDIFY_TEXT_URL: &str = "HOUNDIFY_TEXT_URL";

const USER_AGENT: &str = concat!("hound-cli/", env!("CARGO_PKG_VERSION"));

/// Client keys are URL-safe base64, sometimes without padding.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Sends a query and returns the provider's raw response body.
#[allow(async_fn_in_trait)]
pub trait QueryClient {
    async fn text_search(&self, req: &QueryRequest) -> Result<String>;
}

/// HTTP client for the Houndify text endpoint.
#[derive(Debug, Clone)]
pub struct HoundifyClient {
    http: reqwest::Client,
    text_url: String,
    credentials: Credentials,
    verbose: bool,
}

impl HoundifyClient {
    pub fn new(credentials: Credentials, verbose: bool) -> Self {
        Self {
            http: reqwest::Client::new(),
            text_url: HOUNDIFY_TEXT_URL.into(),
            credentials,
            verbose,
        }
    }

    /// Like [`HoundifyClient::new`], honouring `HOUNDIFY_TEXT_URL`.
    pub fn from_env(credentials: Credentials, verbose: bool) -> Self {
        let client = Self::new(credentials, verbose);
        match env::var(ENV_HOUNDIFY_TEXT_URL) {
            Ok(url) => client.with_text_url(url),
            Err(_) => client,
        }
    }

    pub fn with_text_url(mut self, url: impl Into<String>) -> Self {
        self.text_url = url.into();
        self
    }
}

impl QueryClient for HoundifyClient {
    async fn text_search(&self, req: &QueryRequest) -> Result<String> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let request_auth = format!("{};{}", req.user_id, req.request_id);
        let signature = sign(
            &self.credentials.client_key,
            &req.user_id,
            &req.request_id,
            timestamp,
        )?;
        let client_auth = format!("{};{timestamp};{signature}", self.credentials.client_id);
        let request_info = ascii_json(&req.request_info(&self.credentials.client_id, timestamp));

        if self.verbose {
            info!(query = %req.text, %request_info, "sending houndify request");
        } else {
            debug!(query = %req.text, request_id = %req.request_id, "sending houndify request");
        }

        let resp = self
            .http
            .get(&self.text_url)
            .query(&[("query", req.text.as_str())])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("Hound-Request-Authentication", request_auth)
            .header("Hound-Client-Authentication", client_auth)
            .header("Hound-Request-Info", request_info)
            .send()
            .await
            .map_err(|e| HoundError::network("houndify", e))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| HoundError::network("houndify", format!("response read error: {e}")))?;

        if self.verbose {
            info!(%status, %body, "houndify response");
        }

        if !status.is_success() {
            return Err(HoundError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// Request signature: URL-safe base64 of HMAC-SHA256 over
/// `<user>;<request><timestamp>`, keyed with the decoded client key.
pub fn sign(client_key: &str, user_id: &str, request_id: &str, timestamp: u64) -> Result<String> {
    let normalized: String = client_key
        .trim()
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    let key = KEY_ENGINE
        .decode(normalized)
        .map_err(|e| HoundError::Config(format!("ClientKey is not valid base64: {e}")))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&key)
        .map_err(|e| HoundError::Config(format!("ClientKey rejected: {e}")))?;
    mac.update(format!("{user_id};{request_id}{timestamp}").as_bytes());

    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// Serialize JSON with every non-ASCII char escaped, so it fits in a header.
fn ascii_json(value: &serde_json::Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

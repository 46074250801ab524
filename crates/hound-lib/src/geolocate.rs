//! Caller geolocation — public IP lookup, then IP → location.
//!
//! Two sequential requests, no retry, no caching. Any transport error,
//! non-2xx status or non-JSON body aborts. Missing or null fields in the
//! replies are read as zero values.

use std::env;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use hound_core::types::LocationInfo;

use crate::error::{HoundError, Result};

pub const IPIFY_URL: &str = "https://api.ipify.org?format=json";
pub const IPSTACK_URL: &str = "http://api.ipstack.com";

/// Override the public IP endpoint.
pub const ENV_IPIFY_URL: &str = "IPIFY_URL";
/// Override the geolocation base URL.
pub const ENV_IPSTACK_URL: &str = "IPSTACK_URL";

/// Something that can work out where the caller is.
#[allow(async_fn_in_trait)]
pub trait Locator {
    async fn locate(&self) -> Result<LocationInfo>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExternalIp {
    #[serde(alias = "IP")]
    ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeoReply {
    latitude: Option<f64>,
    longitude: Option<f64>,
    country_name: Option<String>,
}

/// ipify + ipstack backed [`Locator`].
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    client: reqwest::Client,
    ip_url: String,
    geo_url: String,
    access_key: String,
}

impl IpGeolocator {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            ip_url: IPIFY_URL.into(),
            geo_url: IPSTACK_URL.into(),
            access_key: access_key.into(),
        }
    }

    /// Like [`IpGeolocator::new`], honouring `IPIFY_URL` / `IPSTACK_URL`.
    pub fn from_env(access_key: impl Into<String>) -> Self {
        let mut geo = Self::new(access_key);
        if let Ok(url) = env::var(ENV_IPIFY_URL) {
            geo.ip_url = url;
        }
        if let Ok(url) = env::var(ENV_IPSTACK_URL) {
            geo.geo_url = url;
        }
        geo
    }

    pub fn with_urls(mut self, ip_url: impl Into<String>, geo_url: impl Into<String>) -> Self {
        self.ip_url = ip_url.into();
        self.geo_url = geo_url.into();
        self
    }

    /// Lookup #1: the caller's public IP address.
    pub async fn public_ip(&self) -> Result<String> {
        let reply: ExternalIp = self.get_json("public ip", self.client.get(&self.ip_url)).await?;
        let ip = reply.ip.unwrap_or_default();
        if ip.is_empty() {
            warn!("public ip lookup returned no address");
        }
        Ok(ip)
    }

    /// Lookup #2: location for an IP address.
    pub async fn lookup(&self, ip: &str) -> Result<LocationInfo> {
        let url = format!("{}/{}", self.geo_url.trim_end_matches('/'), ip);
        let req = self
            .client
            .get(url)
            .query(&[("access_key", self.access_key.as_str())]);
        let reply: GeoReply = self.get_json("geolocation", req).await?;

        Ok(LocationInfo {
            latitude: reply.latitude.unwrap_or_default(),
            longitude: reply.longitude.unwrap_or_default(),
            country_name: reply.country_name.unwrap_or_default(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        req: reqwest::RequestBuilder,
    ) -> Result<T> {
        let resp = req.send().await.map_err(|e| HoundError::network(service, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(HoundError::network(service, format!("status {status}: {body}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| HoundError::network(service, format!("response read error: {e}")))?;
        debug!(service, %body, "lookup reply");

        serde_json::from_str(&body)
            .map_err(|e| HoundError::network(service, format!("invalid JSON: {e}; raw={body}")))
    }
}

impl Locator for IpGeolocator {
    async fn locate(&self) -> Result<LocationInfo> {
        let ip = self.public_ip().await?;
        let location = self.lookup(&ip).await?;
        debug!(%ip, ?location, "resolved location");
        Ok(location)
    }
}

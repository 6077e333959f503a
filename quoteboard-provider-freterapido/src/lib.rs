//! Provider implementation for the Frete Rápido freight quotation API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::debug;

use quoteboard_core::{
    model::{ProviderId, ProviderMeta, Quote, ShipmentRequest},
    ports::{PortError, RatePort},
};

pub mod transform;
pub mod wire;

use crate::wire::{SimulateRequest, SimulateResponse};

/// Production endpoint of the quote simulation API.
pub const DEFAULT_API_URL: &str = "https://sp.freterapido.com/api/v3/quote/simulate";

// Longest response body excerpt kept in a rejection error.
const ERROR_BODY_LIMIT: usize = 1024;

/// Shipper credentials and request flags sent with every simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreteRapidoConfig {
    /// Simulate endpoint URL.
    pub api_url: String,
    /// CNPJ of the shipper, also used as the dispatcher.
    pub registered_number: String,
    /// API token.
    pub token: String,
    /// Platform code issued by Frete Rápido.
    pub platform_code: String,
    /// Postal code the volumes are dispatched from.
    pub dispatcher_zipcode: u32,
    /// Simulation modes, `0` being a plain quotation.
    pub simulation_types: Vec<u8>,
}

impl FreteRapidoConfig {
    /// Configuration for the production endpoint with a plain quotation.
    #[must_use]
    pub fn new<R, T, P>(registered_number: R, token: T, platform_code: P, dispatcher_zipcode: u32) -> Self
    where
        R: Into<String>,
        T: Into<String>,
        P: Into<String>,
    {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            registered_number: registered_number.into(),
            token: token.into(),
            platform_code: platform_code.into(),
            dispatcher_zipcode,
            simulation_types: vec![0],
        }
    }

    /// Point the adapter at another endpoint, e.g. a sandbox.
    #[must_use]
    pub fn with_api_url<S: Into<String>>(mut self, api_url: S) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Replace the requested simulation modes.
    #[must_use]
    pub fn with_simulation_types(mut self, simulation_types: Vec<u8>) -> Self {
        self.simulation_types = simulation_types;
        self
    }
}

/// Rate port backed by the Frete Rápido simulate endpoint.
pub struct FreteRapidoRatePort {
    client: Client,
    config: FreteRapidoConfig,
    meta: ProviderMeta,
}

impl FreteRapidoRatePort {
    /// Create a new rate port bound to the given HTTP client and credentials.
    #[must_use]
    pub fn new(client: Client, config: FreteRapidoConfig) -> Self {
        Self {
            client,
            config,
            meta: provider_meta(),
        }
    }
}

#[async_trait]
impl RatePort for FreteRapidoRatePort {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn quote(&self, request: &ShipmentRequest) -> Result<Quote, PortError> {
        let body = SimulateRequest::build(&self.config, request)?;
        let payload = serde_json::to_vec(&body)
            .map_err(|err| PortError::Internal(format!("Failed to encode request: {err}")))?;

        debug!(
            url = %self.config.api_url,
            volumes = request.volumes.len(),
            "requesting freight simulation"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Rejected {
                status: status.as_u16(),
                body: body_excerpt(response).await,
            });
        }

        let bytes = response.bytes().await?;
        let decoded: SimulateResponse = serde_json::from_slice(&bytes)?;

        debug!(
            dispatchers = decoded.dispatchers.len(),
            "freight simulation received"
        );
        Ok(transform::to_quote(decoded))
    }
}

/// Build a shared rate port for the Frete Rápido provider.
#[must_use]
pub fn rate_port(client: Client, config: FreteRapidoConfig) -> Arc<dyn RatePort> {
    Arc::new(FreteRapidoRatePort::new(client, config))
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId(String::from("freterapido")),
        name: String::from("Frete Rápido"),
    }
}

// Reads at most ERROR_BODY_LIMIT bytes; a body that fails mid-read keeps what arrived.
async fn body_excerpt(mut response: Response) -> String {
    let mut excerpt = Vec::with_capacity(ERROR_BODY_LIMIT);

    while excerpt.len() < ERROR_BODY_LIMIT {
        let Ok(Some(chunk)) = response.chunk().await else {
            break;
        };
        let take = chunk.len().min(ERROR_BODY_LIMIT - excerpt.len());
        excerpt.extend(chunk.iter().take(take));
    }

    String::from_utf8_lossy(&excerpt).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_production_plain_quotation() {
        let config = FreteRapidoConfig::new("25438296000158", "token", "5AKVkHqCn", 29_161_376);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.simulation_types, [0]);
    }

    #[test]
    fn config_overrides_apply() {
        let config = FreteRapidoConfig::new("1", "2", "3", 4)
            .with_api_url("http://localhost:9000/simulate")
            .with_simulation_types(vec![0, 1]);
        assert_eq!(config.api_url, "http://localhost:9000/simulate");
        assert_eq!(config.simulation_types, [0, 1]);
    }

    #[test]
    fn port_reports_provider_meta() {
        let port = FreteRapidoRatePort::new(
            Client::new(),
            FreteRapidoConfig::new("1", "2", "3", 4),
        );
        assert_eq!(port.provider().id, ProviderId("freterapido".to_owned()));
    }
}

//! Traits describing rate provider and quote store capabilities.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{ProviderMeta, Quote, QuoteRecord, ShipmentRequest, ValidationError};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while quoting shipments or touching the quote history.
pub enum PortError {
    /// The outbound call could not be made or timed out.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The provider answered with a non-success status.
    #[error("Provider rejected the request with status {status}: {body}")]
    Rejected {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Bounded excerpt of the response body.
        body: String,
    },
    /// The provider response could not be parsed into the expected schema.
    #[error("Decode error: {0}")]
    Decode(#[from] JsonError),
    /// The quote store failed.
    #[error("Persistence error during {operation}: {reason}")]
    Persistence {
        /// Store operation that failed.
        operation: &'static str,
        /// Underlying cause.
        reason: String,
    },
    /// The shipment request failed validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortError {
    /// Build a persistence error for the given store operation.
    #[must_use]
    pub fn persistence(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Persistence {
            operation,
            reason: reason.into(),
        }
    }
}

#[async_trait]
/// Trait for provider-specific shipping rate backends.
pub trait RatePort: Send + Sync {
    /// Metadata describing the provider behind this port.
    fn provider(&self) -> &ProviderMeta;

    /// Quote a shipment with a single outbound call.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the call fails, the provider rejects the request
    /// or its response cannot be decoded.
    async fn quote(&self, request: &ShipmentRequest) -> Result<Quote, PortError>;
}

#[async_trait]
/// Trait for quote history backends.
pub trait QuoteStore: Send + Sync {
    /// Append a quote record to the history.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Persistence`] when the record cannot be stored.
    async fn save(&self, record: &QuoteRecord) -> Result<(), PortError>;

    /// Return at most `limit` records, newest first, ties broken by descending id.
    /// A `limit` of zero returns the whole history.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Persistence`] when the history cannot be read.
    async fn recent(&self, limit: usize) -> Result<Vec<QuoteRecord>, PortError>;
}

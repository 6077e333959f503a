//! High-level service facade combining a rate provider and the quote history.

use std::sync::Arc;

use tracing::{info, warn};

use crate::metrics::{AggregationStrategy, aggregate_with};
use crate::model::{MetricsReport, ProviderMeta, QuoteRecord, ShipmentRequest};
use crate::ports::{PortError, QuoteStore, RatePort};

/// Public entry point for quoting shipments and reporting on past quotes.
pub struct QuoteService {
    rates: Arc<dyn RatePort>,
    store: Arc<dyn QuoteStore>,
    strategy: AggregationStrategy,
}

impl QuoteService {
    /// Create a new service bound to the given provider and store.
    #[must_use]
    pub fn new(rates: Arc<dyn RatePort>, store: Arc<dyn QuoteStore>) -> Self {
        Self {
            rates,
            store,
            strategy: AggregationStrategy::default(),
        }
    }

    /// Use the given strategy when computing metrics.
    #[must_use]
    pub fn with_strategy(mut self, strategy: AggregationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Metadata of the rate provider in use.
    #[must_use]
    pub fn provider(&self) -> &ProviderMeta {
        self.rates.provider()
    }

    /// Quote a shipment and append the result to the history.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::InvalidRequest`] for a malformed shipment, the provider's
    /// error if quoting fails (nothing is saved then), or the store's error if the
    /// record cannot be saved.
    pub async fn quote(&self, request: ShipmentRequest) -> Result<QuoteRecord, PortError> {
        request.validate()?;

        let provider = &self.rates.provider().id;
        let quote = self.rates.quote(&request).await.inspect_err(|err| {
            warn!(%provider, error = %err, "shipping quotation failed");
        })?;

        let record = QuoteRecord::new(quote);
        self.store.save(&record).await?;

        info!(
            %provider,
            quote_id = %record.id,
            offers = record.carriers.len(),
            "shipping quotation saved"
        );
        Ok(record)
    }

    /// Most recent quotes, newest first. A `limit` of zero returns everything.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the store cannot be read.
    pub async fn recent_quotes(&self, limit: usize) -> Result<Vec<QuoteRecord>, PortError> {
        self.store.recent(limit).await
    }

    /// Compute the metrics report over the last `last_quotes` quotes, or over the
    /// whole history when `last_quotes` is zero.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the store cannot be read.
    pub async fn metrics(&self, last_quotes: usize) -> Result<MetricsReport, PortError> {
        let window = self.store.recent(last_quotes).await?;
        let report = aggregate_with(&window, self.strategy);

        info!(
            last_quotes,
            window = window.len(),
            carriers = report.carrier_metrics.len(),
            cheapest = report.cheapest_and_most_expensive.cheapest_shipping,
            most_expensive = report.cheapest_and_most_expensive.most_expensive_shipping,
            "metrics computed"
        );
        Ok(report)
    }
}

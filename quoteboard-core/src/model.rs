//! Domain data structures for shipments, carrier quotes, and metrics reports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a rate provider known to quoteboard.
pub struct ProviderId(pub String);

impl fmt::Display for ProviderId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a rate provider and its human-friendly name.
pub struct ProviderMeta {
    /// Unique identifier.
    pub id: ProviderId,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single volume (package line) of a shipment.
pub struct Volume {
    /// Product category code.
    pub category: u32,
    /// Number of items in this volume.
    pub amount: u32,
    /// Weight of one item in kilograms.
    pub unitary_weight: f64,
    /// Commercial value of one item.
    pub price: f64,
    /// Stock keeping unit.
    pub sku: String,
    /// Height in meters.
    pub height: f64,
    /// Width in meters.
    pub width: f64,
    /// Length in meters.
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Normalized description of a shipment to be quoted.
pub struct ShipmentRequest {
    /// Postal code of the recipient.
    pub recipient_zipcode: String,
    /// Volumes to be shipped, in the order given by the caller.
    pub volumes: Vec<Volume>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a shipment request is rejected before it reaches a provider.
pub enum ValidationError {
    /// Recipient postal code is missing.
    #[error("Zipcode cannot be empty for field recipient.zipcode")]
    EmptyZipcode,
    /// Recipient postal code is not numeric.
    #[error("Zipcode must be numeric for field recipient.zipcode: {0}")]
    NonNumericZipcode(String),
    /// The request carries no volumes.
    #[error("At least one volume is required for field volumes")]
    NoVolumes,
    /// A volume attribute is out of range.
    #[error("Invalid value for field {field}: {reason}")]
    InvalidVolume {
        /// Path of the offending field, e.g. `volumes[0].height`.
        field: String,
        /// What the value must satisfy.
        reason: &'static str,
    },
}

impl ShipmentRequest {
    /// Construct a new shipment request.
    #[must_use]
    pub fn new<S: Into<String>>(recipient_zipcode: S, volumes: Vec<Volume>) -> Self {
        Self {
            recipient_zipcode: recipient_zipcode.into(),
            volumes,
        }
    }

    /// Check the request against the shipment invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking the zipcode first and the
    /// volumes in order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recipient_zipcode.trim().is_empty() {
            return Err(ValidationError::EmptyZipcode);
        }
        if self.volumes.is_empty() {
            return Err(ValidationError::NoVolumes);
        }

        for (index, volume) in self.volumes.iter().enumerate() {
            volume.validate(index)?;
        }

        Ok(())
    }
}

impl Volume {
    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let invalid = |name: &str, reason: &'static str| ValidationError::InvalidVolume {
            field: format!("volumes[{index}].{name}"),
            reason,
        };

        if self.amount == 0 {
            return Err(invalid("amount", "must be at least 1"));
        }
        if !is_positive(self.unitary_weight) {
            return Err(invalid("unitary_weight", "must be greater than zero"));
        }
        if !is_non_negative(self.price) {
            return Err(invalid("price", "must not be negative"));
        }

        let dimensions = [
            ("height", self.height),
            ("width", self.width),
            ("length", self.length),
        ];
        for (name, value) in dimensions {
            if !is_positive(value) {
                return Err(invalid(name, "must be greater than zero"));
            }
        }

        Ok(())
    }
}

// NaN fails both checks.
fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One carrier's priced proposal within a quote.
pub struct CarrierOffer {
    /// Carrier name as reported by the provider.
    pub name: String,
    /// Service label, e.g. "Rodoviário".
    pub service: String,
    /// Delivery lead time as a decimal day count.
    pub deadline: String,
    /// Final shipping price.
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Canonical quote returned by a rate provider before it is persisted.
pub struct Quote {
    /// Offers in provider emission order.
    pub carriers: Vec<CarrierOffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a persisted quote. Time ordered, so later quotes compare greater.
pub struct QuoteId(pub Uuid);

impl QuoteId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for QuoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A quote as kept in the quote history.
pub struct QuoteRecord {
    /// Unique identifier.
    pub id: QuoteId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Offers in provider emission order. May be empty.
    pub carriers: Vec<CarrierOffer>,
}

impl QuoteRecord {
    /// Stamp a provider quote with a fresh identity and the current time.
    #[must_use]
    pub fn new(quote: Quote) -> Self {
        Self {
            id: QuoteId::new(),
            created_at: Utc::now(),
            carriers: quote.carriers,
        }
    }

    /// Rebuild a record from stored parts.
    #[must_use]
    pub fn from_parts(id: QuoteId, created_at: DateTime<Utc>, carriers: Vec<CarrierOffer>) -> Self {
        Self {
            id,
            created_at,
            carriers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Aggregated figures for one carrier across a quote window.
pub struct CarrierMetrics {
    /// Carrier name, unique within a report.
    pub carrier_name: String,
    /// Number of offers made by the carrier.
    pub total_quotes: u64,
    /// Sum of the carrier's offer prices.
    pub total_shipping_price: f64,
    /// Mean offer price, zero when there are no offers.
    pub average_shipping_price: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// Global price extremes across a quote window.
pub struct PriceExtremes {
    /// Lowest offer price, zero when nothing was observed.
    pub cheapest_shipping: f64,
    /// Highest offer price, zero when nothing was observed.
    pub most_expensive_shipping: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Aggregate report over a window of quotes.
pub struct MetricsReport {
    /// Per-carrier figures sorted by carrier name (byte order).
    pub carrier_metrics: Vec<CarrierMetrics>,
    /// Cheapest and most expensive offer prices.
    pub cheapest_and_most_expensive: PriceExtremes,
}

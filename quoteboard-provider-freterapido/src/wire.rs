//! Request and response schema of the Frete Rápido `quote/simulate` endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use quoteboard_core::model::{ShipmentRequest, ValidationError, Volume};

use crate::FreteRapidoConfig;

const RECIPIENT_COUNTRY: &str = "BRA";
// 0 = natural person
const RECIPIENT_TYPE: u8 = 0;

/// Body posted to the simulate endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulateRequest {
    /// Shipper credentials.
    pub shipper: Shipper,
    /// Destination of the shipment.
    pub recipient: Recipient,
    /// Origins; quoteboard always sends exactly one.
    pub dispatchers: Vec<DispatcherRequest>,
    /// Simulation modes requested from the provider.
    pub simulation_type: Vec<u8>,
    /// Optional sections the provider should echo back.
    pub returns: Returns,
}

/// Shipper credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shipper {
    /// CNPJ of the shipper.
    pub registered_number: String,
    /// API token.
    pub token: String,
    /// Platform code issued by the provider.
    pub platform_code: String,
}

/// Recipient section of the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// Recipient kind.
    #[serde(rename = "type")]
    pub kind: u8,
    /// ISO 3166 alpha-3 country code.
    pub country: String,
    /// Numeric postal code.
    pub zipcode: u32,
}

/// One origin and the volumes leaving from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatcherRequest {
    /// CNPJ of the dispatcher.
    pub registered_number: String,
    /// Origin postal code.
    pub zipcode: u32,
    /// Volumes shipped from this origin.
    pub volumes: Vec<VolumeRequest>,
}

/// A volume as the provider expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeRequest {
    /// Item count.
    pub amount: u32,
    /// Category code rendered as a string.
    pub category: String,
    /// Stock keeping unit.
    pub sku: String,
    /// Height in meters.
    pub height: f64,
    /// Width in meters.
    pub width: f64,
    /// Length in meters.
    pub length: f64,
    /// Commercial value of one item.
    pub unitary_price: f64,
    /// Weight of one item in kilograms.
    pub unitary_weight: f64,
}

/// Flags controlling the optional parts of the response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Returns {
    /// Echo the freight composition.
    pub composition: bool,
    /// Echo the volumes.
    pub volumes: bool,
    /// Echo the applied pricing rules.
    pub applied_rules: bool,
}

impl SimulateRequest {
    /// Build the provider request for a shipment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonNumericZipcode`] when the recipient zipcode cannot
    /// be sent as a number.
    pub fn build(
        config: &FreteRapidoConfig,
        request: &ShipmentRequest,
    ) -> Result<Self, ValidationError> {
        let zipcode = parse_zipcode(&request.recipient_zipcode)?;

        Ok(Self {
            shipper: Shipper {
                registered_number: config.registered_number.clone(),
                token: config.token.clone(),
                platform_code: config.platform_code.clone(),
            },
            recipient: Recipient {
                kind: RECIPIENT_TYPE,
                country: RECIPIENT_COUNTRY.to_owned(),
                zipcode,
            },
            dispatchers: vec![DispatcherRequest {
                registered_number: config.registered_number.clone(),
                zipcode: config.dispatcher_zipcode,
                volumes: request.volumes.iter().map(VolumeRequest::from).collect(),
            }],
            simulation_type: config.simulation_types.clone(),
            returns: Returns::default(),
        })
    }
}

impl From<&Volume> for VolumeRequest {
    fn from(volume: &Volume) -> Self {
        Self {
            amount: volume.amount,
            category: volume.category.to_string(),
            sku: volume.sku.clone(),
            height: volume.height,
            width: volume.width,
            length: volume.length,
            unitary_price: volume.price,
            unitary_weight: volume.unitary_weight,
        }
    }
}

/// Parse a Brazilian CEP, accepting the usual `01311-000` punctuation.
///
/// # Errors
///
/// Returns [`ValidationError::NonNumericZipcode`] for anything but digits, spaces,
/// dots and hyphens, or for values that do not fit a `u32`.
pub fn parse_zipcode(raw: &str) -> Result<u32, ValidationError> {
    let digits: String = raw
        .chars()
        .filter(|character| !matches!(character, '-' | '.' | ' '))
        .collect();

    if digits.is_empty() || !digits.chars().all(|character| character.is_ascii_digit()) {
        return Err(ValidationError::NonNumericZipcode(raw.to_owned()));
    }

    digits
        .parse()
        .map_err(|_err| ValidationError::NonNumericZipcode(raw.to_owned()))
}

/// Successful response of the simulate endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulateResponse {
    /// Quoted origins.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dispatchers: Vec<DispatcherResponse>,
}

/// Offers quoted for one origin. Identifiers and zipcodes are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DispatcherResponse {
    /// Carrier offers, in provider order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub offers: Vec<OfferResponse>,
}

/// A single carrier offer. Pricing breakdown, weights and expiration are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OfferResponse {
    /// Carrier offering the service.
    pub carrier: CarrierResponse,
    /// Service label.
    pub service: String,
    /// Quoted delivery time.
    pub delivery_time: DeliveryTime,
    /// Price charged to the shipper.
    pub final_price: f64,
}

/// Carrier identification inside an offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CarrierResponse {
    /// Carrier name.
    pub name: String,
}

/// Delivery time inside an offer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeliveryTime {
    /// Business days until delivery.
    pub days: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

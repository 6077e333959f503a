//! Mapping from the provider response to the canonical quote.

use quoteboard_core::model::{CarrierOffer, Quote};

use crate::wire::{OfferResponse, SimulateResponse};

/// Flatten every dispatcher's offers into one canonical quote, keeping provider order.
#[must_use]
pub fn to_quote(response: SimulateResponse) -> Quote {
    let carriers = response
        .dispatchers
        .into_iter()
        .flat_map(|dispatcher| dispatcher.offers)
        .map(to_offer)
        .collect();

    Quote { carriers }
}

fn to_offer(offer: OfferResponse) -> CarrierOffer {
    CarrierOffer {
        name: offer.carrier.name,
        service: offer.service,
        deadline: offer.delivery_time.days.to_string(),
        price: offer.final_price,
    }
}

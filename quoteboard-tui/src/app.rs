use std::str::FromStr;
use std::sync::Arc;

use quoteboard_core::{
    model::{MetricsReport, QuoteRecord, ShipmentRequest, Volume},
    service::QuoteService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Shipment,
    Offers,
    Metrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Zipcode,
    Category,
    Amount,
    UnitaryWeight,
    Price,
    Sku,
    Height,
    Width,
    Length,
}

impl FormField {
    pub(crate) const ALL: [Self; 9] = [
        Self::Zipcode,
        Self::Category,
        Self::Amount,
        Self::UnitaryWeight,
        Self::Price,
        Self::Sku,
        Self::Height,
        Self::Width,
        Self::Length,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Zipcode => "Recipient zipcode",
            Self::Category => "Category",
            Self::Amount => "Amount",
            Self::UnitaryWeight => "Unit weight (kg)",
            Self::Price => "Unit price",
            Self::Sku => "SKU",
            Self::Height => "Height (m)",
            Self::Width => "Width (m)",
            Self::Length => "Length (m)",
        }
    }
}

/// Text inputs of the shipment screen plus the volumes added so far.
#[derive(Debug, Clone)]
pub(crate) struct ShipmentForm {
    pub zipcode: String,
    pub category: String,
    pub amount: String,
    pub unitary_weight: String,
    pub price: String,
    pub sku: String,
    pub height: String,
    pub width: String,
    pub length: String,
    pub volumes: Vec<Volume>,
}

impl Default for ShipmentForm {
    fn default() -> Self {
        Self {
            zipcode: "01311000".to_owned(),
            category: "7".to_owned(),
            amount: "1".to_owned(),
            unitary_weight: "5.0".to_owned(),
            price: "349.90".to_owned(),
            sku: "abc-teste-123".to_owned(),
            height: "0.2".to_owned(),
            width: "0.2".to_owned(),
            length: "0.2".to_owned(),
            volumes: Vec::new(),
        }
    }
}

impl ShipmentForm {
    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Zipcode => &self.zipcode,
            FormField::Category => &self.category,
            FormField::Amount => &self.amount,
            FormField::UnitaryWeight => &self.unitary_weight,
            FormField::Price => &self.price,
            FormField::Sku => &self.sku,
            FormField::Height => &self.height,
            FormField::Width => &self.width,
            FormField::Length => &self.length,
        }
    }

    pub(crate) fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Zipcode => &mut self.zipcode,
            FormField::Category => &mut self.category,
            FormField::Amount => &mut self.amount,
            FormField::UnitaryWeight => &mut self.unitary_weight,
            FormField::Price => &mut self.price,
            FormField::Sku => &mut self.sku,
            FormField::Height => &mut self.height,
            FormField::Width => &mut self.width,
            FormField::Length => &mut self.length,
        }
    }

    /// Parse the volume inputs without touching the volume list.
    pub(crate) fn current_volume(&self) -> Result<Volume, String> {
        Ok(Volume {
            category: self.parse(FormField::Category)?,
            amount: self.parse(FormField::Amount)?,
            unitary_weight: self.parse(FormField::UnitaryWeight)?,
            price: self.parse(FormField::Price)?,
            sku: self.sku.trim().to_owned(),
            height: self.parse(FormField::Height)?,
            width: self.parse(FormField::Width)?,
            length: self.parse(FormField::Length)?,
        })
    }

    pub(crate) fn add_volume(&mut self) -> Result<(), String> {
        let volume = self.current_volume()?;
        self.volumes.push(volume);
        Ok(())
    }

    /// Request for the added volumes, or for the volume being edited when none were added.
    pub(crate) fn to_request(&self) -> Result<ShipmentRequest, String> {
        let volumes = if self.volumes.is_empty() {
            vec![self.current_volume()?]
        } else {
            self.volumes.clone()
        };
        Ok(ShipmentRequest::new(self.zipcode.trim(), volumes))
    }

    fn parse<T: FromStr>(&self, field: FormField) -> Result<T, String> {
        let raw = self.value(field).trim();
        // accept decimal commas as typed on Brazilian keyboards
        raw.replace(',', ".")
            .parse()
            .map_err(|_err| format!("{} is not a valid number: {raw:?}", field.label()))
    }
}

pub(crate) struct App {
    pub service: Arc<QuoteService>,

    pub screen: Screen,
    pub form: ShipmentForm,
    pub field_index: usize,

    pub last_quote: Option<QuoteRecord>,

    pub metrics_window: usize,
    pub report: Option<MetricsReport>,
    pub recent_quotes: Vec<QuoteRecord>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<QuoteService>, metrics_window: usize) -> Self {
        Self {
            service,
            screen: Screen::Shipment,
            form: ShipmentForm::default(),
            field_index: 0,
            last_quote: None,
            metrics_window,
            report: None,
            recent_quotes: Vec::new(),
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn focused_field(&self) -> FormField {
        FormField::ALL
            .get(self.field_index)
            .copied()
            .unwrap_or(FormField::Zipcode)
    }

    pub(crate) fn focus_next(&mut self) {
        self.field_index = (self.field_index + 1) % FormField::ALL.len();
    }

    pub(crate) fn focus_previous(&mut self) {
        self.field_index = self
            .field_index
            .checked_sub(1)
            .unwrap_or(FormField::ALL.len() - 1);
    }

    pub(crate) fn window_label(&self) -> String {
        if self.metrics_window == 0 {
            "all quotes".to_owned()
        } else {
            format!("last {} quotes", self.metrics_window)
        }
    }
}

//! Raw customer attributes as supplied by the input form.

use serde::{Deserialize, Serialize};

/// Categorical fields of [`RawAttributes`], in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalField {
    Gender,
    Partner,
    Dependents,
    PhoneService,
    InternetService,
    Contract,
    PaperlessBilling,
    OnlineSecurity,
    DeviceProtection,
    PaymentMethod,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 10] = [
        CategoricalField::Gender,
        CategoricalField::Partner,
        CategoricalField::Dependents,
        CategoricalField::PhoneService,
        CategoricalField::InternetService,
        CategoricalField::Contract,
        CategoricalField::PaperlessBilling,
        CategoricalField::OnlineSecurity,
        CategoricalField::DeviceProtection,
        CategoricalField::PaymentMethod,
    ];

    /// Form field name, used in error messages and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Gender => "gender",
            CategoricalField::Partner => "partner",
            CategoricalField::Dependents => "dependents",
            CategoricalField::PhoneService => "phone",
            CategoricalField::InternetService => "internet",
            CategoricalField::Contract => "contract",
            CategoricalField::PaperlessBilling => "paperless",
            CategoricalField::OnlineSecurity => "online_sec",
            CategoricalField::DeviceProtection => "device_prot",
            CategoricalField::PaymentMethod => "payment",
        }
    }
}

/// One customer's form input.
///
/// Categorical fields hold the label the form offered (e.g. `"Fiber optic"`).
/// Domain membership is checked by [`crate::encoder::encode`]; numeric ranges
/// by [`crate::input::check_ranges`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAttributes {
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: u8,
    pub tenure: u32,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
    pub gender: String,
    pub partner: String,
    pub dependents: String,
    pub phone: String,
    pub internet: String,
    pub contract: String,
    pub paperless: String,
    pub online_sec: String,
    pub device_prot: String,
    pub payment: String,
}

impl RawAttributes {
    /// Selected label for a categorical field.
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Partner => &self.partner,
            CategoricalField::Dependents => &self.dependents,
            CategoricalField::PhoneService => &self.phone,
            CategoricalField::InternetService => &self.internet,
            CategoricalField::Contract => &self.contract,
            CategoricalField::PaperlessBilling => &self.paperless,
            CategoricalField::OnlineSecurity => &self.online_sec,
            CategoricalField::DeviceProtection => &self.device_prot,
            CategoricalField::PaymentMethod => &self.payment,
        }
    }

    pub fn set_category(&mut self, field: CategoricalField, value: impl Into<String>) {
        let slot = match field {
            CategoricalField::Gender => &mut self.gender,
            CategoricalField::Partner => &mut self.partner,
            CategoricalField::Dependents => &mut self.dependents,
            CategoricalField::PhoneService => &mut self.phone,
            CategoricalField::InternetService => &mut self.internet,
            CategoricalField::Contract => &mut self.contract,
            CategoricalField::PaperlessBilling => &mut self.paperless,
            CategoricalField::OnlineSecurity => &mut self.online_sec,
            CategoricalField::DeviceProtection => &mut self.device_prot,
            CategoricalField::PaymentMethod => &mut self.payment,
        };
        *slot = value.into();
    }
}

/// Initial selections of the input form.
impl Default for RawAttributes {
    fn default() -> Self {
        Self {
            senior_citizen: 0,
            tenure: 1,
            monthly_charges: 50.0,
            total_charges: 100.0,
            gender: "Female".to_string(),
            partner: "No".to_string(),
            dependents: "No".to_string(),
            phone: "No".to_string(),
            internet: "DSL".to_string(),
            contract: "Month-to-month".to_string(),
            paperless: "No".to_string(),
            online_sec: "No".to_string(),
            device_prot: "No".to_string(),
            payment: "Credit card (automatic)".to_string(),
        }
    }
}

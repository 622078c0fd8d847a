use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::NewCafe;

/// Field name -> message, sorted so the rendered form is stable.
pub type FieldErrors = BTreeMap<String, String>;

pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Render metadata for one input of the "add cafe" form.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
}

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "name", label: "Name", placeholder: "e.g., Starbucks", required: true },
    FieldSpec { name: "map_url", label: "Map URL", placeholder: "Google Maps URL", required: true },
    FieldSpec { name: "img_url", label: "Image URL", placeholder: "Google Image URL", required: true },
    FieldSpec { name: "location", label: "City", placeholder: "e.g., Los Angeles", required: true },
    FieldSpec { name: "seats", label: "Number of Seats", placeholder: "e.g., 10-20 or 20+", required: true },
    FieldSpec { name: "toilet", label: "Bathrooms?", placeholder: "True or False", required: true },
    FieldSpec { name: "wifi", label: "WiFi?", placeholder: "True or False", required: true },
    FieldSpec { name: "sockets", label: "Power Outlets?", placeholder: "True or False", required: true },
    FieldSpec { name: "calls", label: "Takes Calls?", placeholder: "True or False", required: true },
    FieldSpec { name: "price", label: "Price", placeholder: "e.g. $2.13 or €2.97", required: false },
];

// Пустая строка и строка из пробелов считаются отсутствующим значением
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(REQUIRED_MESSAGE)));
    }
    Ok(())
}

/// The "add cafe" submission. Absent fields deserialize as empty strings so that
/// they are reported by validation instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CafeForm {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(custom(function = "not_blank"))]
    pub map_url: String,
    #[validate(custom(function = "not_blank"))]
    pub img_url: String,
    #[validate(custom(function = "not_blank"))]
    pub location: String,
    #[validate(custom(function = "not_blank"))]
    pub seats: String,
    #[validate(custom(function = "not_blank"))]
    pub toilet: String,
    #[validate(custom(function = "not_blank"))]
    pub wifi: String,
    #[validate(custom(function = "not_blank"))]
    pub sockets: String,
    #[validate(custom(function = "not_blank"))]
    pub calls: String,
    pub price: String,
    pub csrf_token: String,
}

fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| REQUIRED_MESSAGE.to_string());
            (field.to_string(), message)
        })
        .collect()
}

impl CafeForm {
    /// Current value of a form input by its field name.
    pub fn value(&self, field: &str) -> &str {
        match field {
            "name" => self.name.as_str(),
            "map_url" => self.map_url.as_str(),
            "img_url" => self.img_url.as_str(),
            "location" => self.location.as_str(),
            "seats" => self.seats.as_str(),
            "toilet" => self.toilet.as_str(),
            "wifi" => self.wifi.as_str(),
            "sockets" => self.sockets.as_str(),
            "calls" => self.calls.as_str(),
            "price" => self.price.as_str(),
            _ => "",
        }
    }

    /// Presence check. On success the amenity flags are uppercased and an empty
    /// price becomes `None`.
    pub fn to_new_cafe(&self) -> Result<NewCafe, FieldErrors> {
        self.validate().map_err(|errors| collect_field_errors(&errors))?;

        Ok(NewCafe {
            name: self.name.clone(),
            map_url: self.map_url.clone(),
            img_url: self.img_url.clone(),
            location: self.location.clone(),
            seats: self.seats.clone(),
            has_toilet: self.toilet.to_uppercase(),
            has_wifi: self.wifi.to_uppercase(),
            has_sockets: self.sockets.to_uppercase(),
            can_take_calls: self.calls.to_uppercase(),
            coffee_price: if self.price.trim().is_empty() {
                None
            } else {
                Some(self.price.clone())
            },
        })
    }
}

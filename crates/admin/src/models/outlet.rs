//! Bakery outlet as managed in the back-office.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use cooskie_core::OutletId;
use cooskie_core::catalog::maps_url;

use super::form::{FormError, optional, optional_number, required};

#[derive(Debug, Clone, PartialEq)]
pub struct Outlet {
    pub id: OutletId,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub hours: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Outlet {
    #[must_use]
    pub fn maps_url(&self) -> Option<String> {
        Some(maps_url(self.lat?, self.lng?))
    }

    /// Form prefilled for editing.
    #[must_use]
    pub fn to_form(&self) -> OutletForm {
        OutletForm {
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone().unwrap_or_default(),
            hours: self.hours.clone().unwrap_or_default(),
            lat: self.lat.map(|v| v.to_string()).unwrap_or_default(),
            lng: self.lng.map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

/// Raw text fields of the outlet form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutletForm {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub lat: String,
    pub lng: String,
}

/// A validated outlet, ready to insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct OutletInput {
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub hours: Option<String>,
    pub coordinates: Option<(f64, f64)>,
}

impl OutletForm {
    /// Set a field by its form name. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "address" => self.address = value,
            "phone" => self.phone = value,
            "hours" => self.hours = value,
            "lat" => self.lat = value,
            "lng" => self.lng = value,
            _ => {}
        }
    }

    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] naming the first invalid field.
    pub fn validate(&self) -> Result<OutletInput, FormError> {
        let name = required(&self.name, "Name")?;
        let address = required(&self.address, "Address")?;

        let lat = optional_number::<f64>(&self.lat, "Latitude")?;
        let lng = optional_number::<f64>(&self.lng, "Longitude")?;
        let coordinates = match (lat, lng) {
            (None, None) => None,
            (Some(lat), Some(lng)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(FormError::OutOfRange("Latitude"));
                }
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(FormError::OutOfRange("Longitude"));
                }
                Some((lat, lng))
            }
            _ => return Err(FormError::PartialCoordinates),
        };

        Ok(OutletInput {
            name,
            address,
            phone: optional(&self.phone),
            hours: optional(&self.hours),
            coordinates,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> OutletForm {
        OutletForm {
            name: "Cooskie Kemang".to_string(),
            address: "Jl. Kemang Raya 10".to_string(),
            lat: "-6.2607".to_string(),
            lng: "106.8137".to_string(),
            ..OutletForm::default()
        }
    }

    #[test]
    fn test_valid_outlet() {
        let input = form().validate().unwrap();
        assert_eq!(input.coordinates, Some((-6.2607, 106.8137)));
        assert_eq!(input.phone, None);
    }

    #[test]
    fn test_address_is_required() {
        let mut form = form();
        form.address.clear();
        assert_eq!(form.validate(), Err(FormError::Required("Address")));
    }

    #[test]
    fn test_coordinates_come_in_pairs() {
        let mut form = form();
        form.lng.clear();
        assert_eq!(form.validate(), Err(FormError::PartialCoordinates));

        form.lat.clear();
        assert_eq!(form.validate().unwrap().coordinates, None);
    }

    #[test]
    fn test_latitude_range() {
        let mut form = form();
        form.lat = "96".to_string();
        assert_eq!(form.validate(), Err(FormError::OutOfRange("Latitude")));
    }
}

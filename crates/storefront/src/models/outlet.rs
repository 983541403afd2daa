//! Bakery outlet (pickup point).

use cooskie_core::OutletId;
use cooskie_core::catalog::maps_url;

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
}

impl Outlet {
    /// Google Maps link when coordinates are known.
    #[must_use]
    pub fn maps_url(&self) -> Option<String> {
        Some(maps_url(self.lat?, self.lng?))
    }
}

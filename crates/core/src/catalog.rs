//! Catalog helpers shared by the storefront and back-office.

use serde::Deserialize;

use crate::types::ProductCategory;

/// Category filter on the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Cookies,
    Dessert,
}

impl CategoryFilter {
    /// Every filter tab, in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Cookies, Self::Dessert];

    /// The category to restrict to, if any.
    #[must_use]
    pub const fn category(&self) -> Option<ProductCategory> {
        match self {
            Self::All => None,
            Self::Cookies => Some(ProductCategory::Cookies),
            Self::Dessert => Some(ProductCategory::Dessert),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Cookies => "cookies",
            Self::Dessert => "dessert",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Cookies => "Cookies",
            Self::Dessert => "Dessert",
        }
    }
}

/// Derive a URL slug from a product name.
///
/// Lowercases ASCII letters and digits, turns every other run of characters
/// into a single `-`, and trims dashes from both ends.
///
/// ```
/// use cooskie_core::catalog::slugify;
///
/// assert_eq!(slugify("Choco Chip  Cookies!"), "choco-chip-cookies");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Google Maps search link for a coordinate pair.
#[must_use]
pub fn maps_url(lat: f64, lng: f64) -> String {
    format!("https://www.google.com/maps/search/?api=1&query={lat},{lng}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Red Velvet"), "red-velvet");
        assert_eq!(slugify("  Matcha -- Latte  "), "matcha-latte");
        assert_eq!(slugify("Crème Brûlée"), "cr-me-br-l-e");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_category_filter() {
        assert_eq!(CategoryFilter::All.category(), None);
        assert_eq!(
            CategoryFilter::Dessert.category(),
            Some(ProductCategory::Dessert)
        );
    }

    #[test]
    fn test_maps_url() {
        assert_eq!(
            maps_url(-6.9175, 107.6191),
            "https://www.google.com/maps/search/?api=1&query=-6.9175,107.6191"
        );
    }
}

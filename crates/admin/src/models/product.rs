//! Catalog product as managed in the back-office.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use cooskie_core::catalog::slugify;
use cooskie_core::{Price, ProductCategory, ProductId};

use super::form::{FormError, optional, optional_number, required};

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Price,
    pub description: String,
    pub category: ProductCategory,
    pub image_url: Option<String>,
    pub stock: i32,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Form prefilled for editing.
    #[must_use]
    pub fn to_form(&self) -> ProductForm {
        ProductForm {
            name: self.name.clone(),
            slug: self.slug.clone(),
            price: self.price.as_rupiah().to_string(),
            description: self.description.clone(),
            category: self.category.as_str().to_owned(),
            stock: self.stock.to_string(),
        }
    }
}

/// Raw text fields of the product form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub slug: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub stock: String,
}

/// A validated product, ready to insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub price: Price,
    pub description: String,
    pub category: ProductCategory,
    pub stock: i32,
}

impl ProductForm {
    /// Set a field by its form name. Unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "slug" => self.slug = value,
            "price" => self.price = value,
            "description" => self.description = value,
            "category" => self.category = value,
            "stock" => self.stock = value,
            _ => {}
        }
    }

    /// Validate the form.
    ///
    /// An empty slug is derived from the name; stock defaults to 0.
    ///
    /// # Errors
    ///
    /// Returns [`FormError`] naming the first invalid field.
    pub fn validate(&self) -> Result<ProductInput, FormError> {
        let name = required(&self.name, "Name")?;
        let slug = optional(&self.slug).map_or_else(|| slugify(&name), |s| slugify(&s));
        if slug.is_empty() {
            return Err(FormError::Required("Slug"));
        }

        let price = optional_number::<i64>(&self.price, "Price")?
            .ok_or(FormError::Required("Price"))?;
        if price < 0 {
            return Err(FormError::OutOfRange("Price"));
        }

        let stock = optional_number::<i32>(&self.stock, "Stock")?.unwrap_or(0);
        if stock < 0 {
            return Err(FormError::OutOfRange("Stock"));
        }

        let category = match optional(&self.category) {
            None => ProductCategory::default(),
            Some(raw) => raw
                .parse()
                .map_err(|_| FormError::InvalidChoice("Category"))?,
        };

        Ok(ProductInput {
            name,
            slug,
            price: Price::from_rupiah(price),
            description: self.description.trim().to_owned(),
            category,
            stock,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Choco Chip Cookies".to_string(),
            price: "15000".to_string(),
            category: "cookies".to_string(),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_blank_slug_is_derived_from_name() {
        let input = form().validate().unwrap();
        assert_eq!(input.slug, "choco-chip-cookies");
        assert_eq!(input.stock, 0);
        assert_eq!(input.price, Price::from_rupiah(15_000));
    }

    #[test]
    fn test_given_slug_is_normalised() {
        let mut form = form();
        form.slug = "Best Seller!".to_string();
        assert_eq!(form.validate().unwrap().slug, "best-seller");
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let mut missing_name = form();
        missing_name.name = " ".to_string();
        assert_eq!(missing_name.validate(), Err(FormError::Required("Name")));

        let mut missing_price = form();
        missing_price.price.clear();
        assert_eq!(missing_price.validate(), Err(FormError::Required("Price")));
    }

    #[test]
    fn test_negative_values_are_refused() {
        let mut form = form();
        form.stock = "-1".to_string();
        assert_eq!(form.validate(), Err(FormError::OutOfRange("Stock")));
    }

    #[test]
    fn test_unknown_category_is_refused() {
        let mut form = form();
        form.category = "bread".to_string();
        assert_eq!(form.validate(), Err(FormError::InvalidChoice("Category")));
    }

    #[test]
    fn test_set_by_field_name() {
        let mut form = ProductForm::default();
        form.set("stock", "12".to_string());
        form.set("image", "ignored".to_string());
        assert_eq!(form.stock, "12");
    }
}

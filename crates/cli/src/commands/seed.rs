//! Seed the catalog from a YAML file.
//!
//! Products are upserted by slug; outlets are inserted unless one with the
//! same name exists, so the command can be re-run safely. Every entry goes
//! through the same validation as the back-office forms and the whole file is
//! checked before connecting.
//!
//! ```yaml
//! products:
//!   - name: Choco Chip Cookies
//!     price: 15000
//!     category: cookies
//!     stock: 40
//! outlets:
//!   - name: Cooskie Kemang
//!     address: Jl. Kemang Raya No. 10, Jakarta Selatan
//!     lat: -6.2607
//!     lng: 106.8137
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use cooskie_admin::db::{OutletRepository, ProductRepository};
use cooskie_admin::models::{FormError, OutletForm, OutletInput, ProductForm, ProductInput};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogFile {
    products: Vec<ProductEntry>,
    outlets: Vec<OutletEntry>,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    name: String,
    #[serde(default)]
    slug: Option<String>,
    price: i64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    stock: Option<i32>,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutletEntry {
    name: String,
    address: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    hours: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    image_url: Option<String>,
}

impl ProductEntry {
    fn validate(&self) -> Result<ProductInput, FormError> {
        ProductForm {
            name: self.name.clone(),
            slug: self.slug.clone().unwrap_or_default(),
            price: self.price.to_string(),
            description: self.description.clone().unwrap_or_default(),
            category: self.category.clone().unwrap_or_default(),
            stock: self.stock.map(|s| s.to_string()).unwrap_or_default(),
        }
        .validate()
    }
}

impl OutletEntry {
    fn validate(&self) -> Result<OutletInput, FormError> {
        OutletForm {
            name: self.name.clone(),
            address: self.address.clone(),
            phone: self.phone.clone().unwrap_or_default(),
            hours: self.hours.clone().unwrap_or_default(),
            lat: self.lat.map(|v| v.to_string()).unwrap_or_default(),
            lng: self.lng.map(|v| v.to_string()).unwrap_or_default(),
        }
        .validate()
    }
}

type Validated<'a> = (
    Vec<(ProductInput, Option<&'a str>)>,
    Vec<(OutletInput, Option<&'a str>)>,
);

/// Validate every entry, collecting all problems.
fn validate_catalog(catalog: &CatalogFile) -> Result<Validated<'_>, Vec<String>> {
    let mut errors = Vec::new();

    let products = catalog
        .products
        .iter()
        .filter_map(|entry| match entry.validate() {
            Ok(input) => Some((input, entry.image_url.as_deref())),
            Err(e) => {
                errors.push(format!("product {:?}: {e}", entry.name));
                None
            }
        })
        .collect();

    let outlets = catalog
        .outlets
        .iter()
        .filter_map(|entry| match entry.validate() {
            Ok(input) => Some((input, entry.image_url.as_deref())),
            Err(e) => {
                errors.push(format!("outlet {:?}: {e}", entry.name));
                None
            }
        })
        .collect();

    if errors.is_empty() {
        Ok((products, outlets))
    } else {
        Err(errors)
    }
}

/// Seed products and outlets from `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or a database write fails.
pub async fn catalog(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let (products, outlets) = match validate_catalog(&catalog) {
        Ok(valid) => valid,
        Err(errors) => {
            error!("Catalog validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };
    info!(
        products = products.len(),
        outlets = outlets.len(),
        "Catalog validated"
    );

    let pool = super::connect().await?;

    let product_repo = ProductRepository::new(&pool);
    for (input, image_url) in &products {
        let id = product_repo.upsert_by_slug(input, *image_url).await?;
        info!(product_id = %id, slug = %input.slug, "Product seeded");
    }

    let outlet_repo = OutletRepository::new(&pool);
    let mut inserted = 0usize;
    for (input, image_url) in &outlets {
        if outlet_repo.create_if_absent(input, *image_url).await? {
            inserted += 1;
        } else {
            info!(name = %input.name, "Outlet already exists, skipped");
        }
    }

    info!("Seeding complete!");
    info!("  Products upserted: {}", products.len());
    info!("  Outlets inserted: {inserted}");
    info!("  Outlets skipped: {}", outlets.len() - inserted);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
products:
  - name: Choco Chip Cookies
    price: 15000
    category: cookies
    stock: 40
  - name: Tiramisu Jar
    slug: tiramisu
    price: 35000
    category: dessert
outlets:
  - name: Cooskie Kemang
    address: Jl. Kemang Raya No. 10
    lat: -6.2607
    lng: 106.8137
";

    #[test]
    fn test_sample_catalog_validates() {
        let catalog: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        let (products, outlets) = validate_catalog(&catalog).unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].0.slug, "choco-chip-cookies");
        assert_eq!(products[1].0.slug, "tiramisu");
        assert_eq!(products[1].0.stock, 0);
        assert_eq!(outlets[0].0.coordinates, Some((-6.2607, 106.8137)));
    }

    #[test]
    fn test_all_invalid_entries_are_reported() {
        let yaml = r"
products:
  - name: Mystery
    price: -1
  - name: Bread
    price: 10000
    category: bread
outlets:
  - name: Half Pin
    address: Somewhere
    lat: -6.2
";
        let catalog: CatalogFile = serde_yaml::from_str(yaml).unwrap();
        let errors = validate_catalog(&catalog).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[2].contains("Half Pin"));
    }

    #[test]
    fn test_empty_file_is_an_empty_catalog() {
        let catalog: CatalogFile = serde_yaml::from_str("{}").unwrap();
        let (products, outlets) = validate_catalog(&catalog).unwrap();
        assert!(products.is_empty() && outlets.is_empty());
    }

    #[test]
    fn test_bundled_catalog_validates() {
        let content = include_str!("../../../../data/catalog.yaml");
        let catalog: CatalogFile = serde_yaml::from_str(content).unwrap();
        assert!(validate_catalog(&catalog).is_ok());
    }
}

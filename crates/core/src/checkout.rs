//! Checkout validation and order construction.
//!
//! The storefront parses the submitted form into a [`CheckoutForm`], calls
//! [`CheckoutForm::validate`], checks the chosen outlet exists, then builds a
//! [`NewOrder`] from the cart snapshot. Prices always come from the cart, never
//! from the live catalog.

use serde::Deserialize;

use crate::cart::{Cart, MAX_LINE_QUANTITY};
use crate::tracking::TrackingCode;
use crate::types::{
    DeliveryType, Email, EmailError, OutletId, PhoneError, PhoneNumber, Price, ProductId,
};

/// Why a checkout submission was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,
    #[error("please enter your name")]
    MissingName,
    #[error("invalid phone number: {0}")]
    Phone(#[from] PhoneError),
    #[error("invalid email address: {0}")]
    Email(#[from] EmailError),
    #[error("please choose an outlet for pickup")]
    MissingOutlet,
    #[error("the selected outlet does not exist")]
    UnknownOutlet,
    #[error("please enter a delivery address")]
    MissingAddress,
    #[error("at most {max} of {product} can be ordered at once")]
    QuantityTooLarge { product: String, max: u32 },
}

/// The checkout form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    /// Empty when no outlet is selected.
    #[serde(default)]
    pub outlet_id: String,
    #[serde(default)]
    pub address: String,
}

/// Where the order goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    Pickup(OutletId),
    Delivery { address: String },
}

impl Fulfillment {
    #[must_use]
    pub const fn delivery_type(&self) -> DeliveryType {
        match self {
            Self::Pickup(_) => DeliveryType::Pickup,
            Self::Delivery { .. } => DeliveryType::Delivery,
        }
    }

    #[must_use]
    pub const fn outlet_id(&self) -> Option<OutletId> {
        match self {
            Self::Pickup(id) => Some(*id),
            Self::Delivery { .. } => None,
        }
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Pickup(_) => None,
            Self::Delivery { address } => Some(address),
        }
    }
}

/// Contact and fulfillment details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCheckout {
    pub name: String,
    pub phone: PhoneNumber,
    pub email: Email,
    pub fulfillment: Fulfillment,
}

impl CheckoutForm {
    /// Validate the form. Outlet existence is checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] found, in form order.
    pub fn validate(&self) -> Result<ValidCheckout, CheckoutError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CheckoutError::MissingName);
        }
        let phone = PhoneNumber::parse(&self.phone)?;
        let email = Email::parse(&self.email)?;

        let fulfillment = match self.delivery_type {
            DeliveryType::Pickup => {
                let id = self
                    .outlet_id
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| CheckoutError::MissingOutlet)?;
                Fulfillment::Pickup(OutletId::new(id))
            }
            DeliveryType::Delivery => {
                let address = self.address.trim();
                if address.is_empty() {
                    return Err(CheckoutError::MissingAddress);
                }
                Fulfillment::Delivery {
                    address: address.to_owned(),
                }
            }
        };

        Ok(ValidCheckout {
            name: name.to_owned(),
            phone,
            email,
            fulfillment,
        })
    }
}

/// A line item ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}

/// An order header plus its items, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub tracking_code: TrackingCode,
    pub customer: ValidCheckout,
    pub total: Price,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build an order from the cart snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart has no lines and
    /// [`CheckoutError::QuantityTooLarge`] when a line exceeds
    /// [`MAX_LINE_QUANTITY`].
    pub fn from_cart(
        customer: ValidCheckout,
        cart: &Cart,
        tracking_code: TrackingCode,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if let Some(item) = cart
            .items()
            .iter()
            .find(|item| item.quantity > MAX_LINE_QUANTITY)
        {
            return Err(CheckoutError::QuantityTooLarge {
                product: item.product.name.clone(),
                max: MAX_LINE_QUANTITY,
            });
        }
        let items = cart
            .items()
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product.id,
                quantity: item.quantity,
                unit_price: item.product.price,
            })
            .collect();
        Ok(Self {
            tracking_code,
            customer,
            total: cart.total(),
            items,
        })
    }

    /// Swap in a fresh tracking code after a collision.
    #[must_use]
    pub fn with_tracking_code(mut self, code: TrackingCode) -> Self {
        self.tracking_code = code;
        self
    }

    /// Total number of units ordered.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, ProductSnapshot};
    use crate::types::ProductCategory;

    fn pickup_form() -> CheckoutForm {
        CheckoutForm {
            name: " Sari ".into(),
            phone: "0812 3456 7890".into(),
            email: "Sari@Example.com".into(),
            delivery_type: DeliveryType::Pickup,
            outlet_id: "2".into(),
            address: "ignored".into(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::default();
        let product = ProductSnapshot {
            id: ProductId::new(1),
            name: "Choco Chip".into(),
            slug: "choco-chip".into(),
            price: Price::from_rupiah(15_000),
            image_url: None,
            category: ProductCategory::Cookies,
        };
        cart.add(product.clone());
        cart.add(product);
        cart.add(ProductSnapshot {
            id: ProductId::new(2),
            name: "Tiramisu".into(),
            slug: "tiramisu".into(),
            price: Price::from_rupiah(45_000),
            image_url: None,
            category: ProductCategory::Dessert,
        });
        cart
    }

    #[test]
    fn test_valid_pickup() {
        let valid = pickup_form().validate().unwrap();
        assert_eq!(valid.name, "Sari");
        assert_eq!(valid.email.as_str(), "sari@example.com");
        assert_eq!(valid.fulfillment, Fulfillment::Pickup(OutletId::new(2)));
        assert_eq!(valid.fulfillment.address(), None);
    }

    #[test]
    fn test_delivery_requires_address() {
        let mut form = pickup_form();
        form.delivery_type = DeliveryType::Delivery;
        form.address = "   ".into();
        assert_eq!(form.validate(), Err(CheckoutError::MissingAddress));

        form.address = "Jl. Merdeka 10, Bandung".into();
        let valid = form.validate().unwrap();
        assert_eq!(valid.fulfillment.outlet_id(), None);
        assert_eq!(valid.fulfillment.address(), Some("Jl. Merdeka 10, Bandung"));
    }

    #[test]
    fn test_pickup_requires_outlet() {
        let mut form = pickup_form();
        form.outlet_id = String::new();
        assert_eq!(form.validate(), Err(CheckoutError::MissingOutlet));
        form.outlet_id = "abc".into();
        assert_eq!(form.validate(), Err(CheckoutError::MissingOutlet));
        assert_eq!(
            CheckoutError::MissingOutlet.to_string(),
            "please choose an outlet for pickup"
        );
    }

    #[test]
    fn test_contact_fields_required() {
        let mut form = pickup_form();
        form.name = " ".into();
        assert_eq!(form.validate(), Err(CheckoutError::MissingName));

        let mut form = pickup_form();
        form.email = "not-an-email".into();
        assert!(matches!(form.validate(), Err(CheckoutError::Email(_))));

        let mut form = pickup_form();
        form.phone = "123".into();
        assert!(matches!(form.validate(), Err(CheckoutError::Phone(_))));
    }

    #[test]
    fn test_total_is_sum_of_snapshot_lines() {
        let order = NewOrder::from_cart(
            pickup_form().validate().unwrap(),
            &cart(),
            TrackingCode::generate(),
        )
        .unwrap();
        assert_eq!(order.total, Price::from_rupiah(75_000));
        let recomputed: Price = order
            .items
            .iter()
            .map(|i| i.unit_price.times(i.quantity))
            .sum();
        assert_eq!(order.total, recomputed);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_oversize_line_refused() {
        let cart = Cart::from_items_unchecked(vec![CartItem {
            product: cart().items().first().unwrap().product.clone(),
            quantity: u32::MAX,
        }]);
        let result = NewOrder::from_cart(
            pickup_form().validate().unwrap(),
            &cart,
            TrackingCode::generate(),
        );
        assert_eq!(
            result,
            Err(CheckoutError::QuantityTooLarge {
                product: "Choco Chip".into(),
                max: MAX_LINE_QUANTITY,
            })
        );
    }

    #[test]
    fn test_empty_cart_refused() {
        let result = NewOrder::from_cart(
            pickup_form().validate().unwrap(),
            &Cart::default(),
            TrackingCode::generate(),
        );
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }
}

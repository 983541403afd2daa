//! Cart to order: what the customer sees in the cart is what gets stored.

use chrono::Utc;

use cooskie_core::Price;
use cooskie_core::cart::{Cart, ORDER_HISTORY_LIMIT, OrderHistory, OrderHistoryEntry};
use cooskie_core::checkout::{CheckoutError, CheckoutForm, Fulfillment, NewOrder};
use cooskie_core::tracking::TrackingCode;
use cooskie_core::{DeliveryType, OutletId, ProductId};
use cooskie_integration_tests::snapshot;

fn pickup_form() -> CheckoutForm {
    CheckoutForm {
        name: "  Sari Wulandari ".to_string(),
        phone: "0812-3456-7890".to_string(),
        email: "Sari@Example.com".to_string(),
        delivery_type: DeliveryType::Pickup,
        outlet_id: "2".to_string(),
        address: String::new(),
    }
}

fn filled_cart() -> Cart {
    let mut cart = Cart::default();
    cart.add(snapshot(1, "Choco Chip Cookies", 15_000));
    cart.add(snapshot(1, "Choco Chip Cookies", 15_000));
    cart.add(snapshot(2, "Tiramisu Jar", 35_000));
    cart
}

#[test]
fn test_order_total_matches_cart() {
    let cart = filled_cart();
    assert_eq!(cart.count(), 3);
    assert_eq!(cart.total(), Price::from_rupiah(65_000));

    let customer = pickup_form().validate().expect("valid checkout");
    let order = NewOrder::from_cart(customer, &cart, TrackingCode::generate()).expect("order");

    assert_eq!(order.total, cart.total());
    assert_eq!(order.item_count(), 3);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_id, ProductId::new(1));
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.customer.name, "Sari Wulandari");
    assert_eq!(order.customer.email.as_str(), "sari@example.com");
    assert_eq!(order.customer.fulfillment, Fulfillment::Pickup(OutletId::new(2)));
}

#[test]
fn test_unit_price_is_taken_when_added() {
    let mut cart = Cart::default();
    cart.add(snapshot(1, "Choco Chip Cookies", 15_000));
    // The catalog price changes; the line keeps its original price.
    cart.add(snapshot(1, "Choco Chip Cookies", 18_000));

    assert_eq!(cart.items()[0].product.price, Price::from_rupiah(15_000));
    assert_eq!(cart.total(), Price::from_rupiah(30_000));
}

#[test]
fn test_quantity_never_drops_below_one() {
    let mut cart = filled_cart();
    assert_eq!(cart.update_qty(ProductId::new(2), -5), Some(1));
    assert_eq!(cart.update_qty(ProductId::new(9), 1), None);
    assert!(cart.remove(ProductId::new(2)));
    assert_eq!(cart.total(), Price::from_rupiah(30_000));
}

#[test]
fn test_empty_cart_cannot_be_ordered() {
    let customer = pickup_form().validate().expect("valid checkout");
    assert_eq!(
        NewOrder::from_cart(customer, &Cart::default(), TrackingCode::generate()),
        Err(CheckoutError::EmptyCart)
    );
}

#[test]
fn test_fulfillment_requires_matching_detail() {
    let mut form = pickup_form();
    form.outlet_id.clear();
    assert_eq!(form.validate(), Err(CheckoutError::MissingOutlet));

    form.delivery_type = DeliveryType::Delivery;
    assert_eq!(form.validate(), Err(CheckoutError::MissingAddress));

    form.address = " Jl. Melati 3, Jakarta ".to_string();
    let valid = form.validate().expect("delivery checkout");
    assert_eq!(valid.fulfillment.address(), Some("Jl. Melati 3, Jakarta"));
    assert_eq!(valid.fulfillment.outlet_id(), None);
}

#[test]
fn test_cart_survives_session_storage() {
    let cart = filled_cart();
    let stored = serde_json::to_value(&cart).expect("serialize");
    assert!(stored.is_array());

    let restored: Cart = serde_json::from_value(stored).expect("deserialize");
    assert_eq!(restored, cart);

    // Anything unreadable is treated as an empty cart by callers.
    assert!(serde_json::from_str::<Cart>(r#"{"not":"a cart"}"#).is_err());
}

#[test]
fn test_history_keeps_most_recent_orders() {
    let mut history = OrderHistory::default();
    for i in 0..=ORDER_HISTORY_LIMIT {
        history.record(OrderHistoryEntry {
            tracking_code: format!("CSK-TEST-{i:04}"),
            total: Price::from_rupiah(15_000),
            item_count: 1,
            created_at: Utc::now(),
        });
    }

    let entries = history.entries();
    assert_eq!(entries.len(), ORDER_HISTORY_LIMIT);
    assert_eq!(entries[0].tracking_code, format!("CSK-TEST-{ORDER_HISTORY_LIMIT:04}"));
    assert!(entries.iter().all(|e| e.tracking_code != "CSK-TEST-0000"));
}

#[test]
fn test_tracking_codes_accept_what_customers_type() {
    let code = TrackingCode::generate();
    let typed = format!("  {}  ", code.as_str().to_ascii_lowercase());
    assert_eq!(TrackingCode::parse(&typed).expect("parse"), code);
    assert!(TrackingCode::parse("CSK-12").is_err());
}

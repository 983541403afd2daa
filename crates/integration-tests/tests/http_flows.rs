//! End-to-end flows over HTTP.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (`ck-cli migrate && ck-cli seed catalog`)
//! - The storefront running (cargo run -p cooskie-storefront)
//! - The back-office running (cargo run -p cooskie-admin)
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` for a login made with `ck-cli admin create`
//!
//! Run with: cargo test -p cooskie-integration-tests -- --ignored

use reqwest::{Client, Response, StatusCode, header};

use cooskie_integration_tests::{admin_base_url, browser, storefront_base_url};

fn location(resp: &Response) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// First `value="..."` after `name="{field}"` in `html`.
fn hidden_value(html: &str, field: &str) -> Option<String> {
    let marker = format!("name=\"{field}\" value=\"");
    let start = html.find(&marker)? + marker.len();
    let rest = html.get(start..)?;
    rest.find('"').and_then(|end| rest.get(..end)).map(str::to_string)
}

/// Put the first listed product in the cart and check out for pickup at the
/// first outlet. Returns the tracking page path.
async fn place_pickup_order(client: &Client) -> String {
    let base = storefront_base_url();

    let products = client
        .get(format!("{base}/products"))
        .send()
        .await
        .expect("Failed to list products")
        .text()
        .await
        .expect("Failed to read products page");
    let product_id = hidden_value(&products, "product_id").expect("seeded catalog has a product");

    let resp = client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", product_id.as_str())])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let checkout = client
        .get(format!("{base}/checkout"))
        .send()
        .await
        .expect("Failed to open checkout");
    assert_eq!(checkout.status(), StatusCode::OK);
    let checkout = checkout.text().await.expect("Failed to read checkout");
    let outlet_id = checkout
        .split("<option value=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .find(|value| !value.is_empty())
        .expect("seeded catalog has an outlet")
        .to_string();

    let resp = client
        .post(format!("{base}/checkout"))
        .form(&[
            ("name", "Integration Test"),
            ("phone", "0812-0000-0000"),
            ("email", "integration@example.com"),
            ("delivery_type", "pickup"),
            ("outlet_id", outlet_id.as_str()),
        ])
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let tracking = location(&resp);
    assert!(tracking.starts_with("/tracking/CSK-"), "got {tracking}");
    tracking
}

async fn admin_client() -> Client {
    let client = browser().expect("Failed to create HTTP client");
    let email = std::env::var("TEST_ADMIN_EMAIL").expect("TEST_ADMIN_EMAIL not set");
    let password = std::env::var("TEST_ADMIN_PASSWORD").expect("TEST_ADMIN_PASSWORD not set");

    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    client
}

// ============================================================================
// Storefront
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_storefront_health() {
    let client = browser().expect("Failed to create HTTP client");
    let resp = client
        .get(format!("{}/health", storefront_base_url()))
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and a seeded database"]
async fn test_checkout_clears_cart_and_shows_tracking_page() {
    let client = browser().expect("Failed to create HTTP client");
    let base = storefront_base_url();
    let tracking = place_pickup_order(&client).await;

    let page = client
        .get(format!("{base}{tracking}"))
        .send()
        .await
        .expect("Failed to open tracking page");
    assert_eq!(page.status(), StatusCode::OK);
    let body = page.text().await.expect("Failed to read tracking page");
    assert!(body.contains("Waiting for payment verification"));

    // Checking out again with the now-empty cart bounces back to the cart.
    let resp = client
        .get(format!("{base}/checkout"))
        .send()
        .await
        .expect("Failed to open checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/cart"));
}

#[tokio::test]
#[ignore = "Requires running storefront and a seeded database"]
async fn test_payment_proof_upload_then_second_upload_refused() {
    let client = browser().expect("Failed to create HTTP client");
    let base = storefront_base_url();
    let tracking = place_pickup_order(&client).await;

    let upload = || {
        let part = reqwest::multipart::Part::bytes(b"\x89PNG\r\n\x1a\n-proof".to_vec())
            .file_name("transfer.png")
            .mime_str("image/png")
            .expect("valid mime type");
        client
            .post(format!("{base}{tracking}/payment"))
            .multipart(reqwest::multipart::Form::new().part("proof", part))
            .send()
    };

    let resp = upload().await.expect("Failed to upload proof");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).contains("notice="), "got {}", location(&resp));

    let page = client
        .get(format!("{base}{tracking}"))
        .send()
        .await
        .expect("Failed to open tracking page")
        .text()
        .await
        .expect("Failed to read tracking page");
    assert!(page.contains("Awaiting review"));
    assert!(page.contains("Waiting for payment verification"));

    let resp = upload().await.expect("Failed to upload again");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).contains("error="));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_unknown_tracking_code_is_not_found() {
    let client = browser().expect("Failed to create HTTP client");
    let resp = client
        .get(format!("{}/tracking/CSK-ZZZZ-0000", storefront_base_url()))
        .send()
        .await
        .expect("Failed to open tracking page");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_malformed_tracking_lookup_is_rejected() {
    let client = browser().expect("Failed to create HTTP client");
    let resp = client
        .get(format!("{}/tracking?code=not-a-code", storefront_base_url()))
        .send()
        .await
        .expect("Failed to look up code");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Back-office
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_pages_require_login() {
    let client = browser().expect("Failed to create HTTP client");
    for path in ["/", "/orders", "/products", "/outlets"] {
        let resp = client
            .get(format!("{}{path}", admin_base_url()))
            .send()
            .await
            .expect("Failed to reach admin");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/auth/login");
    }
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_admin_bad_password_stays_on_login() {
    let client = browser().expect("Failed to create HTTP client");
    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", "nobody@cooskie.id"), ("password", "wrong password")])
        .send()
        .await
        .expect("Failed to post login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/auth/login?"));
}

#[tokio::test]
#[ignore = "Requires running storefront, admin server, seeded database and admin login"]
async fn test_admin_cancels_new_order() {
    let shopper = browser().expect("Failed to create HTTP client");
    let tracking = place_pickup_order(&shopper).await;
    let code = tracking.trim_start_matches("/tracking/");

    let admin = admin_client().await;
    let base = admin_base_url();

    let list = admin
        .get(format!("{base}/orders?status=waiting_verification"))
        .send()
        .await
        .expect("Failed to list orders")
        .text()
        .await
        .expect("Failed to read orders");
    let marker = format!("\">{code}</a>");
    let before = list.find(&marker).expect("new order is listed");
    let order_path = list
        .get(..before)
        .and_then(|head| head.rsplit("href=\"").next())
        .expect("order link")
        .to_string();

    let resp = admin
        .post(format!("{base}{order_path}/status"))
        .form(&[("action", "cancel")])
        .send()
        .await
        .expect("Failed to cancel");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).contains("notice="));

    // A second cancel is refused rather than applied twice.
    let resp = admin
        .post(format!("{base}{order_path}/status"))
        .form(&[("action", "cancel")])
        .send()
        .await
        .expect("Failed to cancel again");
    assert!(location(&resp).contains("error="));

    let page = shopper
        .get(format!("{}{tracking}", storefront_base_url()))
        .send()
        .await
        .expect("Failed to open tracking page")
        .text()
        .await
        .expect("Failed to read tracking page");
    assert!(page.contains("Cancelled"));
}

//! Order tracking and payment-proof upload.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cooskie_core::cart::OrderHistory;
use cooskie_core::payment::can_upload;
use cooskie_core::tracking::TrackingCode;

use super::{Flash, Nav, redirect_with_error, redirect_with_notice};
use crate::config::PaymentInstructions;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::TrackedOrder;
use crate::services::client_state;
use crate::state::AppState;

/// Multipart field carrying the proof image.
pub const PROOF_FIELD: &str = "proof";

/// Lookup query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub code: Option<String>,
}

/// Tracking lookup template.
#[derive(Template, WebTemplate)]
#[template(path = "tracking/lookup.html")]
pub struct TrackingLookupTemplate {
    pub nav: Nav,
    pub history: OrderHistory,
    pub code: String,
    pub error: Option<String>,
}

/// Order status template.
#[derive(Template, WebTemplate)]
#[template(path = "tracking/show.html")]
pub struct TrackingShowTemplate {
    pub nav: Nav,
    pub order: TrackedOrder,
    pub can_upload: bool,
    pub payment_info: Option<PaymentInstructions>,
    pub max_upload_mb: usize,
    pub flash: Flash,
}

async fn lookup_page(
    session: &Session,
    code: String,
    error: Option<String>,
) -> TrackingLookupTemplate {
    TrackingLookupTemplate {
        nav: Nav::load(session).await,
        history: client_state::load_orders(session).await,
        code,
        error,
    }
}

/// Show the lookup form, or jump to the order when a code is given.
#[instrument(skip(session))]
pub async fn lookup(session: Session, Query(query): Query<LookupQuery>) -> Response {
    let input = query.code.unwrap_or_default();
    if input.trim().is_empty() {
        return lookup_page(&session, String::new(), None)
            .await
            .into_response();
    }

    match TrackingCode::parse(&input) {
        Ok(code) => Redirect::to(&format!("/tracking/{code}")).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            lookup_page(&session, input, Some(e.to_string())).await,
        )
            .into_response(),
    }
}

/// Display an order's status, items and payment-proof state.
///
/// An unknown code renders the lookup page with a not-found message.
#[instrument(skip(state, session, flash))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(code): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Response> {
    let order = match TrackingCode::parse(&code) {
        Ok(parsed) => {
            OrderRepository::new(state.pool())
                .get_by_tracking_code(parsed.as_str())
                .await?
        }
        Err(_) => None,
    };

    let Some(order) = order else {
        let message = format!("No order found for {code}");
        let page = lookup_page(&session, code, Some(message)).await;
        return Ok((StatusCode::NOT_FOUND, page).into_response());
    };

    let can_upload = can_upload(order.status, order.payment.as_ref().map(|p| p.status));
    let page = TrackingShowTemplate {
        nav: Nav::load(&session).await,
        can_upload,
        payment_info: state.config().payment.clone(),
        max_upload_mb: state.uploads().max_bytes() / (1024 * 1024),
        order,
        flash,
    };
    Ok(page.into_response())
}

/// Accept a transfer-proof upload for the order.
#[instrument(skip(state, multipart), fields(tracking_code = %code))]
pub async fn upload_payment(
    State(state): State<AppState>,
    Path(code): Path<String>,
    mut multipart: Multipart,
) -> Result<Redirect> {
    let code = TrackingCode::parse(&code)
        .map_err(|_| AppError::NotFound(format!("order {code}")))?;
    let page = format!("/tracking/{code}");

    let mut proof = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Ok(redirect_with_error(&page, &e.body_text())),
        };
        if field.name() != Some(PROOF_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        match field.bytes().await {
            Ok(bytes) => proof = Some((content_type, bytes)),
            Err(e) => return Ok(redirect_with_error(&page, &e.body_text())),
        }
    }

    let Some((content_type, bytes)) = proof else {
        return Ok(redirect_with_error(&page, "Please choose a file to upload"));
    };

    match state
        .orders()
        .upload_payment_proof(&code, content_type.as_deref(), &bytes)
        .await
    {
        Ok(_) => Ok(redirect_with_notice(
            &page,
            "Payment proof uploaded. We will verify it shortly.",
        )),
        Err(e) if e.is_user_facing() => Ok(redirect_with_error(&page, &e.to_string())),
        Err(e) => Err(e.into()),
    }
}

//! Login and logout.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::{Flash, redirect_with_error, render};
use crate::error::Result;
use crate::filters;
use crate::middleware::auth::LOGIN_PATH;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub flash: Flash,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub notice: Option<String>,
    pub email: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// GET /auth/login
async fn login_page(session: Session, Query(query): Query<LoginQuery>) -> Result<Response> {
    if session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?
        .is_some()
    {
        return Ok(Redirect::to("/").into_response());
    }

    let template = LoginTemplate {
        flash: Flash {
            error: query.error,
            notice: query.notice,
        },
        email: query.email.unwrap_or_default(),
    };
    Ok(render(&template)?.into_response())
}

/// POST /auth/login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    match state.auth().login(form.email.trim(), &form.password).await {
        Ok(user) => {
            set_current_admin(&session, &CurrentAdmin::from(&user)).await?;
            Ok(Redirect::to("/"))
        }
        Err(e) if e.is_user_facing() => {
            let back = format!(
                "{LOGIN_PATH}?email={}",
                urlencoding::encode(form.email.trim())
            );
            Ok(redirect_with_error(&back, &e.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    sentry::configure_scope(|scope| scope.set_user(None));
    super::redirect_with_notice(LOGIN_PATH, "You have been logged out")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_keeps_email() {
        let html = LoginTemplate {
            flash: Flash::error("invalid email or password"),
            email: "owner@cooskie.id".to_string(),
        }
        .render()
        .unwrap_or_default();
        assert!(html.contains("owner@cooskie.id"));
        assert!(html.contains("invalid email or password"));
    }
}

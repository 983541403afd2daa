//! Static pages and the outlet list.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::Nav;
use crate::db::OutletRepository;
use crate::error::Result;
use crate::filters;
use crate::models::Outlet;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub nav: Nav,
}

/// Outlet list template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/outlets.html")]
pub struct OutletsTemplate {
    pub nav: Nav,
    pub outlets: Vec<Outlet>,
}

/// Display the about page.
pub async fn about(session: Session) -> AboutTemplate {
    AboutTemplate {
        nav: Nav::load(&session).await,
    }
}

/// Display every outlet with its hours and a maps link.
#[instrument(skip(state, session))]
pub async fn outlets(State(state): State<AppState>, session: Session) -> Result<OutletsTemplate> {
    let outlets = OutletRepository::new(state.pool()).list().await?;
    Ok(OutletsTemplate {
        nav: Nav::load(&session).await,
        outlets,
    })
}

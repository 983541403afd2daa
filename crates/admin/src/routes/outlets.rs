//! Outlet management.

use askama::Template;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::instrument;

use cooskie_core::OutletId;
use cooskie_core::storage::ImageFolder;

use super::{
    AdminView, Flash, SearchQuery, max_upload_mb, read_multipart, redirect_with_notice, render,
    store_image,
};
use crate::db::{OutletRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Outlet, OutletForm};
use crate::services::StorageError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "outlets/index.html")]
pub struct OutletsIndexTemplate {
    pub admin: AdminView,
    pub outlets: Vec<Outlet>,
    pub search: String,
    pub flash: Flash,
}

#[derive(Template)]
#[template(path = "outlets/form.html")]
pub struct OutletFormTemplate {
    pub admin: AdminView,
    pub form: OutletForm,
    pub outlet: Option<Outlet>,
    pub error: Option<String>,
    pub max_upload_mb: usize,
}

fn form_page(
    state: &AppState,
    admin: &CurrentAdmin,
    form: OutletForm,
    outlet: Option<Outlet>,
    error: Option<String>,
) -> Result<Response> {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let html = render(&OutletFormTemplate {
        admin: AdminView::new(admin, "outlets"),
        form,
        outlet,
        error,
        max_upload_mb: max_upload_mb(state),
    })?;
    Ok((status, html).into_response())
}

async fn find(state: &AppState, id: OutletId) -> Result<Outlet> {
    OutletRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("outlet {id}")))
}

/// GET /outlets
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>> {
    let outlets = OutletRepository::new(state.pool())
        .list(query.term())
        .await?;

    render(&OutletsIndexTemplate {
        admin: AdminView::new(&admin, "outlets"),
        outlets,
        search: query.term().unwrap_or_default().to_owned(),
        flash: query.flash(),
    })
}

/// GET /outlets/new
pub async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Response> {
    form_page(&state, &admin, OutletForm::default(), None, None)
}

/// POST /outlets
#[instrument(skip_all)]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response> {
    let (form, image) = read_multipart::<OutletForm>(&mut multipart).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return form_page(&state, &admin, form, None, Some(e.to_string())),
    };

    let image_url = match store_image(&state, ImageFolder::Outlets, image.as_ref()).await {
        Ok(url) => url,
        Err(AppError::Storage(StorageError::Rejected(e))) => {
            return form_page(&state, &admin, form, None, Some(e.to_string()));
        }
        Err(e) => return Err(e),
    };

    let id = OutletRepository::new(state.pool())
        .create(&input, image_url.as_deref())
        .await?;

    tracing::info!(outlet_id = %id, "Outlet created");
    Ok(redirect_with_notice("/outlets", &format!("{} created", input.name)).into_response())
}

/// GET /outlets/{id}/edit
#[instrument(skip(admin, state))]
pub async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OutletId>,
) -> Result<Response> {
    let outlet = find(&state, id).await?;
    form_page(&state, &admin, outlet.to_form(), Some(outlet), None)
}

/// POST /outlets/{id}
#[instrument(skip(admin, state, multipart))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OutletId>,
    mut multipart: Multipart,
) -> Result<Response> {
    let outlet = find(&state, id).await?;
    let (form, image) = read_multipart::<OutletForm>(&mut multipart).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return form_page(&state, &admin, form, Some(outlet), Some(e.to_string())),
    };

    let image_url = match store_image(&state, ImageFolder::Outlets, image.as_ref()).await {
        Ok(url) => url,
        Err(AppError::Storage(StorageError::Rejected(e))) => {
            return form_page(&state, &admin, form, Some(outlet), Some(e.to_string()));
        }
        Err(e) => return Err(e),
    };

    OutletRepository::new(state.pool())
        .update(id, &input, image_url.as_deref())
        .await?;

    if image_url.is_some()
        && let Some(old) = &outlet.image_url
    {
        state.uploads().remove_quietly(old).await;
    }

    tracing::info!(outlet_id = %id, "Outlet updated");
    Ok(redirect_with_notice("/outlets", &format!("{} saved", input.name)).into_response())
}

/// POST /outlets/{id}/delete
#[instrument(skip(_admin, state))]
pub async fn delete(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OutletId>,
) -> Result<Redirect> {
    let image_url = match OutletRepository::new(state.pool()).delete(id).await {
        Ok(url) => url,
        Err(RepositoryError::NotFound) => {
            return Err(AppError::NotFound(format!("outlet {id}")));
        }
        Err(e) => return Err(e.into()),
    };
    if let Some(url) = image_url {
        state.uploads().remove_quietly(&url).await;
    }

    tracing::info!(outlet_id = %id, "Outlet deleted");
    Ok(redirect_with_notice("/outlets", "Outlet deleted"))
}

//! Panel page and its form actions.
//!
//! Successful actions redirect back to the page. Failed actions render the
//! page again with the submitted form kept and an alert banner.

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DeleteForm, IndexQuery, RowsQuery};
use crate::form::HospitalForm;
use crate::panel::PanelError;

fn alert_text(action: &str, err: &PanelError) -> String {
    match err {
        PanelError::Validation(e) => e.to_string(),
        PanelError::NotConfirmed => "Delete was not confirmed.".to_string(),
        other => format!("{action} failed: {other}"),
    }
}

/// Re-render the page after a failed action, with the status code the
/// JSON API would use for the same error.
fn failed_page(
    ctx: &ApiContext,
    form: &HospitalForm,
    action: &str,
    err: PanelError,
) -> Result<Response, ApiError> {
    let alert = alert_text(action, &err);
    let status = ApiError::from(err).status();
    let page = ctx.panel.render_page("", form, Some(&alert))?;
    Ok((status, Html(page)).into_response())
}

/// `GET /`: the panel. `edit` fills the form from the cached record.
pub async fn index(
    State(ctx): State<ApiContext>,
    Query(query): Query<IndexQuery>,
) -> Result<Html<String>, ApiError> {
    let form = match query.edit.as_deref() {
        Some(id) => ctx.panel.edit_form(id)?.unwrap_or_else(HospitalForm::blank),
        None => HospitalForm::blank(),
    };
    Ok(Html(ctx.panel.render_page(&query.q, &form, None)?))
}

/// `GET /rows?q=`: `<tbody>` content for search-as-you-type.
pub async fn rows(
    State(ctx): State<ApiContext>,
    Query(query): Query<RowsQuery>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(ctx.panel.render_rows(&query.q)?))
}

/// `POST /hospitals/save`: create or update from the form.
pub async fn save(
    State(ctx): State<ApiContext>,
    Form(form): Form<HospitalForm>,
) -> Result<Response, ApiError> {
    match ctx.panel.submit(&form).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => failed_page(&ctx, &form, "Save", e),
    }
}

/// `POST /hospitals/delete`: row delete, once confirmed.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Form(form): Form<DeleteForm>,
) -> Result<Response, ApiError> {
    match ctx.panel.delete_confirmed(&form.id, form.is_confirmed()).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(e) => failed_page(&ctx, &HospitalForm::blank(), "Delete", e),
    }
}

/// `POST /refresh`: the Refresh control.
pub async fn refresh(State(ctx): State<ApiContext>) -> Result<Response, ApiError> {
    match ctx.panel.refresh().await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => failed_page(&ctx, &HospitalForm::blank(), "Refresh", e),
    }
}
